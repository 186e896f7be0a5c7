use crate::app::{App, View};
use crate::ui::theme::Palette;
use crate::wallpaper::Orientation;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use ratatui_image::picker::ProtocolType;

pub(super) fn draw_status(f: &mut Frame, app: &App, area: Rect, theme: &Palette) {
    if let Some(message) = &app.ui.status_message {
        let line = Line::from(vec![
            Span::styled("• ", Style::default().fg(theme.warning)),
            Span::styled(message, Style::default().fg(theme.warning)),
        ]);
        f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
    }
}

pub(super) fn draw_header(f: &mut Frame, app: &App, area: Rect, theme: &Palette) {
    let sep = || Span::styled(" │ ", Style::default().fg(theme.fg_muted));

    let counter = match app.ui.view {
        View::Slideshow => app.slideshow.counter_text().to_string(),
        View::Wall => app.wall.counter_text(),
        View::Settings => app.settings.category.display_name().to_string(),
    };

    let (play_label, play_color) = if app.slideshow.is_playing() {
        ("▶ playing", theme.success)
    } else {
        ("❚❚ paused", theme.fg_muted)
    };

    let mut spans = vec![
        Span::styled(
            " PosterWall ",
            Style::default()
                .fg(theme.highlight)
                .add_modifier(Modifier::BOLD),
        ),
        sep(),
        Span::styled(
            app.ui.view.title(),
            Style::default()
                .fg(theme.fg_primary)
                .add_modifier(Modifier::BOLD),
        ),
        sep(),
        Span::styled(counter, Style::default().fg(theme.accent)),
        sep(),
        Span::styled(
            format!(
                "{} landscape · {} portrait",
                app.store.landscape_count(),
                app.store.portrait_count()
            ),
            Style::default().fg(theme.fg_secondary),
        ),
        sep(),
        Span::styled(play_label, Style::default().fg(play_color)),
    ];

    let style = match app.ui.view {
        View::Wall => app.animations.style_for(Orientation::Portrait),
        _ => app.animations.style_for(Orientation::Landscape),
    };
    spans.push(Span::styled(" ", Style::default()));
    spans.push(Span::styled(
        format!("[{}]", style.id()),
        Style::default().fg(theme.accent_alt),
    ));
    spans.push(Span::styled(" ", Style::default()));
    spans.push(Span::styled(
        format!("[img:{}]", protocol_label(app)),
        Style::default().fg(theme.fg_secondary),
    ));

    f.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        area,
    );
}

pub(super) fn draw_footer(f: &mut Frame, app: &App, area: Rect, theme: &Palette) {
    if app.ui.command_mode {
        let cmd_line = Line::from(vec![
            Span::styled(
                ":",
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(&app.ui.command_buffer, Style::default().fg(theme.fg_primary)),
            Span::styled("█", Style::default().fg(theme.accent)),
        ]);
        f.render_widget(Paragraph::new(cmd_line), area);
        return;
    }

    let hints: &[(&str, &str)] = match app.ui.view {
        View::Slideshow => &[
            ("←/→", " slide"),
            ("Space", " play"),
            ("Enter", " preview"),
            ("Tab", " view"),
            (":", " cmd"),
            ("?", " help"),
            ("q", " quit"),
        ],
        View::Wall => &[
            ("←/→", " browse"),
            ("Enter", " preview"),
            ("Tab", " view"),
            (":", " cmd"),
            ("?", " help"),
            ("q", " quit"),
        ],
        View::Settings => &[
            ("↑/↓", " category"),
            ("←/→", " style"),
            ("Enter", " save"),
            ("Tab", " view"),
            ("q", " quit"),
        ],
    };

    f.render_widget(
        Paragraph::new(hint_line(hints, theme)).alignment(Alignment::Center),
        area,
    );
}

pub(super) fn hint_line<'a>(hints: &[(&'a str, &'a str)], theme: &Palette) -> Line<'a> {
    let mut spans = Vec::with_capacity(hints.len() * 3);
    for (i, (key, label)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" │ ", Style::default().fg(theme.fg_muted)));
        }
        spans.push(Span::styled(*key, Style::default().fg(theme.accent)));
        spans.push(Span::styled(*label, Style::default().fg(theme.fg_muted)));
    }
    Line::from(spans)
}

pub(super) fn protocol_label(app: &App) -> &'static str {
    app.thumbnails
        .image_picker
        .as_ref()
        .map(|p| match p.protocol_type {
            ProtocolType::Halfblocks => "HB",
            ProtocolType::Sixel => "SIX",
            ProtocolType::Kitty => "KTY",
            ProtocolType::Iterm2 => "IT2",
        })
        .unwrap_or("N/A")
}
