use super::center_vertically;
use crate::ui::theme::Palette;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

pub(super) fn draw_image_placeholder(f: &mut Frame, area: Rect, theme: &Palette) {
    let text = Paragraph::new("(popup active)")
        .style(Style::default().fg(theme.fg_muted))
        .alignment(Alignment::Center);
    f.render_widget(text, center_vertically(area, 1));
}

const HELP_SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Views",
        &[
            ("Tab     ", "Slideshow → poster wall → animations"),
            ("←/→ h/l ", "Previous / next"),
            ("Space   ", "Play / pause the slideshow"),
            ("Enter   ", "Open preview (save on animations)"),
        ],
    ),
    (
        "Preview",
        &[("←/→     ", "Browse the opened list"), ("Esc     ", "Close")],
    ),
    (
        "Animations",
        &[
            ("↑/↓     ", "Switch category"),
            ("←/→     ", "Cycle transition style"),
        ],
    ),
    (
        "Commands (:)",
        &[
            (":import <path>", " Add a file or folder"),
            (":play / :stop ", " Slideshow autoplay"),
            (":clear        ", " Remove every wallpaper"),
            (":q            ", " Quit"),
        ],
    ),
];

pub(super) fn draw_help_popup(f: &mut Frame, area: Rect, theme: &Palette) {
    let popup_width = 56.min(area.width.saturating_sub(4));
    let popup_height = 24.min(area.height.saturating_sub(4));
    let popup_x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" PosterWall Help ")
        .title_style(
            Style::default()
                .fg(theme.highlight)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent))
        .style(Style::default().bg(theme.bg));
    let inner = block.inner(popup_area);
    f.render_widget(block, popup_area);

    let mut lines = Vec::new();
    for (i, (title, entries)) in HELP_SECTIONS.iter().enumerate() {
        if i > 0 {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            *title,
            Style::default()
                .fg(theme.highlight)
                .add_modifier(Modifier::BOLD),
        )));
        for (key, label) in entries.iter() {
            lines.push(Line::from(vec![
                Span::styled(format!("  {}", key), Style::default().fg(theme.accent)),
                Span::styled(*label, Style::default().fg(theme.fg_secondary)),
            ]));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  q/Esc   ", Style::default().fg(theme.accent)),
        Span::styled("Quit", Style::default().fg(theme.fg_secondary)),
    ]));

    f.render_widget(Paragraph::new(lines), inner);
}
