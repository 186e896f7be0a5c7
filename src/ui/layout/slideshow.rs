use super::{center_vertically, fit_aspect, truncate};
use crate::app::App;
use crate::slideshow::{Direction as SlideDirection, EMPTY_PLACEHOLDER};
use crate::ui::theme::Palette;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use ratatui_image::StatefulImage;

pub(super) fn draw_slideshow(f: &mut Frame, app: &mut App, area: Rect, theme: &Palette) {
    let Some(slide) = app.slideshow.current().cloned() else {
        let empty = Paragraph::new(EMPTY_PLACEHOLDER)
            .style(Style::default().fg(theme.fg_muted))
            .alignment(Alignment::Center);
        f.render_widget(empty, center_vertically(area, 1));
        return;
    };

    // Neighbours first so a step in either direction lands on a warm cache.
    let len = app.slideshow.slides().len();
    let cursor = app.slideshow.cursor();
    for offset in [1, len.saturating_sub(1)] {
        let neighbour = app
            .slideshow
            .slides()
            .get((cursor + offset) % len)
            .map(|s| s.record.clone());
        if let Some(record) = neighbour {
            app.request_thumbnail(&record);
        }
    }
    app.request_thumbnail(&slide.record);

    let arrow_width = 3;
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(arrow_width),
            Constraint::Min(10),
            Constraint::Length(arrow_width),
        ])
        .split(area);

    // The list is cyclic, both arrows are always live.
    for (chunk, arrow) in [(chunks[0], "❮"), (chunks[2], "❯")] {
        let widget = Paragraph::new(arrow)
            .style(Style::default().fg(theme.accent))
            .alignment(Alignment::Center);
        f.render_widget(widget, center_vertically(chunk, 1));
    }

    let stage = chunks[1];
    let (frame_w, frame_h) = fit_aspect(
        stage.width.saturating_sub(2),
        stage.height.saturating_sub(3),
        slide.record.width,
        slide.record.height,
    );
    if frame_w < 3 || frame_h < 3 {
        return;
    }
    let frame_x = stage.x + (stage.width.saturating_sub(frame_w)) / 2;
    let frame_y = stage.y + (stage.height.saturating_sub(frame_h + 1)) / 2;
    let frame_area = Rect::new(frame_x, frame_y, frame_w, frame_h);

    // The flushed entry state stays visible until the outgoing slide settles.
    let entering = app
        .frames
        .last_entry
        .filter(|(index, _)| *index == cursor && app.slideshow.pending_cleanups() > 0)
        .map(|(_, direction)| direction);
    let border_color = if entering.is_some() {
        theme.accent_alt
    } else {
        theme.highlight
    };

    f.render_widget(Clear, frame_area);
    let title = match entering {
        Some(SlideDirection::Forward) => {
            format!(" {} {} ", slide.style.style_class(), SlideDirection::Forward.arrow())
        }
        Some(SlideDirection::Backward) => {
            format!(" {} {} ", SlideDirection::Backward.arrow(), slide.style.style_class())
        }
        None => format!(" {} ", slide.style.style_class()),
    };
    let block = Block::default()
        .title(title)
        .title_style(Style::default().fg(theme.fg_muted))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(theme.bg));
    let inner = block.inner(frame_area);
    f.render_widget(block, frame_area);

    let key = slide.record.id.as_str().to_string();
    let is_loading = app.is_loading(&key);
    if let Some(protocol) = app.get_thumbnail(&key) {
        f.render_stateful_widget(StatefulImage::new(None), inner, protocol);
    } else {
        let text = if is_loading {
            "...".to_string()
        } else {
            truncate(&slide.record.name, inner.width as usize)
        };
        let label = Paragraph::new(text)
            .style(Style::default().fg(theme.fg_secondary))
            .alignment(Alignment::Center);
        f.render_widget(label, center_vertically(inner, 1));
    }

    if frame_area.bottom() < stage.bottom() {
        let caption_area = Rect::new(stage.x, frame_area.bottom(), stage.width, 1);
        let caption = Line::from(vec![
            Span::styled(
                truncate(&slide.record.name, stage.width.saturating_sub(16) as usize),
                Style::default()
                    .fg(theme.fg_primary)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}x{}", slide.record.width, slide.record.height),
                Style::default().fg(theme.fg_muted),
            ),
        ]);
        f.render_widget(Paragraph::new(caption).alignment(Alignment::Center), caption_area);
    }
}
