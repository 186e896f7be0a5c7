use super::{center_vertically, fit_aspect, truncate};
use crate::app::App;
use crate::ui::theme::Palette;
use crate::wall::{Band, WallItem};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use ratatui_image::StatefulImage;

const EMPTY_WALL: &str = "No portrait wallpapers yet. Import some with :import <path>";

/// Banded items in display order: previous, active, next.
fn visible_bands(items: &[WallItem]) -> Vec<WallItem> {
    [Band::Prev, Band::Active, Band::Next]
        .into_iter()
        .filter_map(|band| items.iter().find(|item| item.band == Some(band)).cloned())
        .collect()
}

pub(super) fn draw_wall(f: &mut Frame, app: &mut App, area: Rect, theme: &Palette) {
    if app.wall.is_empty() {
        let empty = Paragraph::new(EMPTY_WALL)
            .style(Style::default().fg(theme.fg_muted))
            .alignment(Alignment::Center);
        f.render_widget(empty, center_vertically(area, 1));
        return;
    }

    let shown = visible_bands(app.wall.items());
    for item in &shown {
        app.request_thumbnail(&item.record);
    }

    // Posters are 2:3. The active one gets the full height, its neighbours 3/4.
    let slot_w = area.width / 3;
    let (active_w, active_h) = fit_aspect(slot_w.saturating_sub(2), area.height.saturating_sub(2), 2, 3);
    let (side_w, side_h) = (active_w * 3 / 4, active_h * 3 / 4);
    if side_w < 3 || side_h < 3 {
        return;
    }

    let slot_of = |band: Band| match band {
        Band::Prev => 0,
        Band::Active => 1,
        Band::Next => 2,
    };

    for item in shown {
        let Some(band) = item.band else {
            continue;
        };
        let (w, h) = if band == Band::Active {
            (active_w, active_h)
        } else {
            (side_w, side_h)
        };
        let slot_x = area.x + slot_w * slot_of(band);
        let poster = Rect::new(
            slot_x + slot_w.saturating_sub(w) / 2,
            area.y + area.height.saturating_sub(h + 1) / 2,
            w,
            h,
        );

        let (border, title_style) = if band == Band::Active {
            (
                theme.highlight,
                Style::default()
                    .fg(theme.highlight)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            (theme.border, Style::default().fg(theme.fg_muted))
        };

        f.render_widget(Clear, poster);
        let block = Block::default()
            .title(format!(" {} ", truncate(&item.record.name, w.saturating_sub(4) as usize)))
            .title_style(title_style)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(theme.bg));
        let inner = block.inner(poster);
        f.render_widget(block, poster);

        let key = item.record.id.as_str();
        let is_loading = app.is_loading(key);
        if let Some(protocol) = app.get_thumbnail(key) {
            f.render_stateful_widget(StatefulImage::new(None), inner, protocol);
        } else {
            let text = if is_loading { "..." } else { item.style.style_class() };
            let label = Paragraph::new(text)
                .style(Style::default().fg(theme.fg_secondary))
                .alignment(Alignment::Center);
            f.render_widget(label, center_vertically(inner, 1));
        }

        if band == Band::Active && poster.bottom() < area.bottom() {
            let marker = Paragraph::new(format!("▲ {}", item.style.style_class()))
                .style(Style::default().fg(theme.highlight))
                .alignment(Alignment::Center);
            f.render_widget(marker, Rect::new(slot_x, poster.bottom(), slot_w, 1));
        }
    }
}
