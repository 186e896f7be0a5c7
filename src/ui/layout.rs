use crate::app::{App, View};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Borders},
    Frame,
};

mod header;
mod popups;
mod preview;
mod settings;
mod slideshow;
mod wall;

use header::{draw_footer, draw_header, draw_status};
use popups::{draw_help_popup, draw_image_placeholder};

pub fn draw(f: &mut Frame, app: &mut App) {
    let theme = app.ui.theme.clone();
    let area = f.area();

    // The overlay owns the whole frame while it is open.
    if app.preview.is_open() {
        preview::draw_preview(f, app, area, &theme);
        return;
    }

    // ratatui-image writes straight to the terminal, bypassing widget z-order,
    // so no images may be drawn under a popup.
    let popup_active = app.ui.show_help || app.ui.command_mode;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused))
        .style(Style::default().bg(theme.bg));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let has_status = app.ui.status_message.is_some();
    let constraints = if has_status {
        vec![
            Constraint::Length(2), // Header
            Constraint::Length(1), // Status
            Constraint::Min(8),    // View
            Constraint::Length(2), // Footer
        ]
    } else {
        vec![
            Constraint::Length(2),
            Constraint::Min(9),
            Constraint::Length(2),
        ]
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let mut chunk_idx = 0;
    draw_header(f, app, chunks[chunk_idx], &theme);
    chunk_idx += 1;

    if has_status {
        draw_status(f, app, chunks[chunk_idx], &theme);
        chunk_idx += 1;
    }

    let body = chunks[chunk_idx];
    match app.ui.view {
        View::Settings => settings::draw_settings(f, app, body, &theme),
        _ if popup_active => draw_image_placeholder(f, body, &theme),
        View::Slideshow => slideshow::draw_slideshow(f, app, body, &theme),
        View::Wall => wall::draw_wall(f, app, body, &theme),
    }
    chunk_idx += 1;

    draw_footer(f, app, chunks[chunk_idx], &theme);

    if app.ui.show_help {
        draw_help_popup(f, area, &theme);
    }
}

fn center_vertically(area: Rect, height: u16) -> Rect {
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(area.x, y, area.width, height.min(area.height))
}

/// Largest `aspect_w:aspect_h` box inside `max_w` x `max_h` cells. Terminal
/// cells are about twice as tall as wide, so the height is halved.
fn fit_aspect(max_w: u16, max_h: u16, aspect_w: u32, aspect_h: u32) -> (u16, u16) {
    if max_w == 0 || max_h == 0 || aspect_w == 0 || aspect_h == 0 {
        return (0, 0);
    }

    // Record dimensions are not validated, so stay in u64 until the result fits.
    let (aspect_w, aspect_h) = (u64::from(aspect_w), u64::from(aspect_h));
    let width_limited_h = u64::from(max_w) * aspect_h / (aspect_w * 2);
    if width_limited_h <= u64::from(max_h) {
        let height = u16::try_from(width_limited_h).unwrap_or(max_h);
        (max_w, height.max(1))
    } else {
        let width = u64::from(max_h) * aspect_w * 2 / aspect_h;
        let width = u16::try_from(width).unwrap_or(u16::MAX);
        (width.clamp(1, max_w), max_h)
    }
}

/// `area` shrunk to a centered box of at most `w` x `h`
fn centered(area: Rect, w: u16, h: u16) -> Rect {
    let w = w.min(area.width);
    let h = h.min(area.height);
    Rect::new(
        area.x + (area.width - w) / 2,
        area.y + (area.height - h) / 2,
        w,
        h,
    )
}

/// Shorten to `max_chars`, marking the cut with an ellipsis.
fn truncate(text: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_aspect_respects_both_bounds() {
        let (w, h) = fit_aspect(80, 40, 16, 9);
        assert!(w <= 80 && h <= 40);
        assert_eq!((w, h), (80, 22));

        let (w, h) = fit_aspect(80, 10, 16, 9);
        assert_eq!(h, 10);
        assert!(w < 80);
    }

    #[test]
    fn fit_aspect_thin_strip_is_height_limited() {
        let (w, h) = fit_aspect(80, 40, 1, 1639);
        assert_eq!(h, 40);
        assert!(w < 80);
        assert_eq!(w, 1);
    }

    #[test]
    fn fit_aspect_survives_huge_dimensions() {
        assert_eq!(fit_aspect(80, 40, u32::MAX, u32::MAX), (80, 40));
        assert_eq!(fit_aspect(80, 40, u32::MAX, 1), (80, 1));
        assert_eq!(fit_aspect(80, 40, 1, u32::MAX), (1, 40));
    }

    #[test]
    fn fit_aspect_zero_sized() {
        assert_eq!(fit_aspect(0, 10, 16, 9), (0, 0));
        assert_eq!(fit_aspect(10, 10, 0, 9), (0, 0));
    }

    #[test]
    fn centered_never_exceeds_area() {
        let area = Rect::new(2, 3, 10, 4);
        let inner = centered(area, 20, 2);
        assert_eq!(inner, Rect::new(2, 4, 10, 2));
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("poster", 10), "poster");
        assert_eq!(truncate("poster-wall", 6), "poste…");
        assert_eq!(truncate("x", 0), "");
    }
}
