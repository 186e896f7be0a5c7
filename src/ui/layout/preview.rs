use super::header::hint_line;
use super::{center_vertically, fit_aspect, truncate};
use crate::app::App;
use crate::ui::theme::Palette;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use ratatui_image::StatefulImage;

pub(super) fn draw_preview(f: &mut Frame, app: &mut App, area: Rect, theme: &Palette) {
    let Some(record) = app.preview.current().cloned() else {
        return;
    };

    f.render_widget(Clear, area);
    let title = Line::from(vec![
        Span::styled(
            format!(" {} ", truncate(&record.name, area.width.saturating_sub(20) as usize)),
            Style::default()
                .fg(theme.highlight)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{} ", app.preview.counter_text()),
            Style::default().fg(theme.accent),
        ),
    ]);
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused))
        .style(Style::default().bg(theme.bg));
    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.height < 3 {
        return;
    }

    let stage = Rect::new(inner.x, inner.y, inner.width, inner.height - 1);
    let footer = Rect::new(inner.x, inner.bottom() - 1, inner.width, 1);

    let hints = hint_line(&[("←/→", " browse"), ("Esc", " close")], theme);
    f.render_widget(Paragraph::new(hints).alignment(Alignment::Center), footer);

    if let Some(error) = app.preview.error() {
        let text = Paragraph::new(error.to_string())
            .style(Style::default().fg(theme.error))
            .alignment(Alignment::Center);
        f.render_widget(text, center_vertically(stage, 1));
        return;
    }

    // The previous image stays up until its successor has decoded.
    let showing = app.preview.displayed_source().is_some();
    let loading = app.preview.is_loading();
    match app.thumbnails.preview_image.as_mut() {
        Some(protocol) if showing => {
            let (w, h) = fit_aspect(stage.width, stage.height, record.width, record.height);
            let image_area = Rect::new(
                stage.x + stage.width.saturating_sub(w) / 2,
                stage.y + stage.height.saturating_sub(h) / 2,
                w,
                h,
            );
            f.render_stateful_widget(StatefulImage::new(None), image_area, protocol);
            if loading {
                let badge = Paragraph::new("loading…")
                    .style(Style::default().fg(theme.fg_muted))
                    .alignment(Alignment::Right);
                f.render_widget(badge, Rect::new(stage.x, stage.y, stage.width, 1));
            }
        }
        _ => {
            let text = if loading { "Loading…" } else { "No image" };
            let label = Paragraph::new(text)
                .style(Style::default().fg(theme.fg_secondary))
                .alignment(Alignment::Center);
            f.render_widget(label, center_vertically(stage, 1));
        }
    }
}
