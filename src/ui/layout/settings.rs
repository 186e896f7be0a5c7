use super::{centered, truncate};
use crate::animation::{AnimationRegistry, AnimationStyle};
use crate::app::{App, PREVIEW_LOOP};
use crate::slideshow::DEFAULT_SETTLE_DELAY;
use crate::ui::theme::Palette;
use crate::wallpaper::Orientation;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::time::Instant;

/// One frame of the looping style demo
#[derive(Debug, Clone, Copy, PartialEq)]
struct DemoFrame {
    card: Rect,
    fill: char,
}

/// Fraction of the loop spent animating; the remainder holds the settled card.
fn animated_share() -> f32 {
    DEFAULT_SETTLE_DELAY.as_millis() as f32 / PREVIEW_LOOP.as_millis() as f32
}

fn ease_out(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

fn bounce(t: f32) -> f32 {
    if t < 0.6 {
        ease_out(t / 0.6)
    } else {
        let rebound = (t - 0.6) / 0.4;
        1.0 - 0.15 * (rebound * std::f32::consts::PI).sin()
    }
}

/// Lay out the demo card for `style` at `progress` (0..1 of the loop) inside `stage`.
/// Every style converges on the same centered card.
fn demo_frame(style: AnimationStyle, progress: f32, stage: Rect) -> DemoFrame {
    let t = (progress / animated_share()).clamp(0.0, 1.0);
    let e = ease_out(t);
    let target = centered(stage, stage.width / 2, stage.height / 2);

    let scaled = |fx: f32, fy: f32| {
        let w = ((target.width as f32) * fx).round().max(1.0) as u16;
        let h = ((target.height as f32) * fy).round().max(1.0) as u16;
        centered(target, w, h)
    };

    let full = '█';
    match style {
        AnimationStyle::Slide => {
            let travel = (stage.right() - target.x) as f32;
            let x = target.x + ((1.0 - e) * travel) as u16;
            let width = target.width.min(stage.right().saturating_sub(x));
            DemoFrame {
                card: Rect::new(x, target.y, width, target.height),
                fill: full,
            }
        }
        AnimationStyle::Fade => DemoFrame {
            card: target,
            fill: shade(e),
        },
        AnimationStyle::Zoom => DemoFrame {
            card: scaled(0.2 + 0.8 * e, 0.2 + 0.8 * e),
            fill: full,
        },
        AnimationStyle::Flip => {
            // Edge-on at the midpoint of the flip.
            let fx = (1.0 - 2.0 * e).abs();
            DemoFrame {
                card: scaled(if t >= 1.0 { 1.0 } else { fx }, 1.0),
                fill: if e < 0.5 { '▒' } else { full },
            }
        }
        AnimationStyle::Rotate => DemoFrame {
            card: scaled(0.5 + 0.5 * e, 1.0 - 0.5 * (1.0 - e)),
            fill: ['◢', '◣', '◤', '◥', full][((e * 4.0) as usize).min(4)],
        },
        AnimationStyle::Blur => DemoFrame {
            card: target,
            fill: if t >= 1.0 { full } else { ['░', '▒', '▓'][((e * 3.0) as usize).min(2)] },
        },
        AnimationStyle::Cube => {
            let width = (((target.width as f32) * e).round().max(1.0) as u16).min(target.width);
            DemoFrame {
                card: Rect::new(target.right() - width, target.y, width, target.height),
                fill: full,
            }
        }
        AnimationStyle::Bounce => {
            let b = bounce(t);
            let top = stage.y as f32;
            let y = top + (target.y as f32 - top) * b;
            let y = (y.round() as u16).min(stage.bottom().saturating_sub(target.height));
            DemoFrame {
                card: Rect::new(target.x, y, target.width, target.height),
                fill: full,
            }
        }
    }
}

fn shade(level: f32) -> char {
    match level {
        l if l < 0.25 => ' ',
        l if l < 0.5 => '░',
        l if l < 0.75 => '▒',
        l if l < 1.0 => '▓',
        _ => '█',
    }
}

pub(super) fn draw_settings(f: &mut Frame, app: &App, area: Rect, theme: &Palette) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    draw_catalog(f, app, columns[0], theme);

    let style = app.animations.style_for(app.settings.category);
    let block = Block::default()
        .title(format!(" Preview · {} ", style.display_name()))
        .title_style(
            Style::default()
                .fg(theme.highlight)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .style(Style::default().bg(theme.bg));
    let stage = block.inner(columns[1]);
    f.render_widget(block, columns[1]);
    if stage.width < 4 || stage.height < 4 {
        return;
    }

    let frame = demo_frame(style, app.settings.preview_progress(Instant::now()), stage);
    let row: String = std::iter::repeat(frame.fill).take(frame.card.width as usize).collect();
    let card_lines: Vec<Line> = (0..frame.card.height)
        .map(|_| Line::from(Span::styled(row.clone(), Style::default().fg(theme.accent))))
        .collect();
    f.render_widget(Paragraph::new(card_lines), frame.card.intersection(stage));
}

fn draw_catalog(f: &mut Frame, app: &App, area: Rect, theme: &Palette) {
    let focused = app.settings.category;

    let mut lines = Vec::new();
    for category in Orientation::ALL {
        let selected = app.animations.style_for(category);
        let is_focused = category == focused;
        let marker = if is_focused { "▶ " } else { "  " };
        lines.push(Line::from(vec![
            Span::styled(marker, Style::default().fg(theme.highlight)),
            Span::styled(
                format!("{:<10}", category.display_name()),
                if is_focused {
                    Style::default()
                        .fg(theme.fg_primary)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(theme.fg_secondary)
                },
            ),
            Span::styled(selected.display_name(), Style::default().fg(theme.accent_alt)),
        ]));
    }
    lines.push(Line::from(""));

    let current = app.animations.style_for(focused);
    let width = area.width.saturating_sub(16) as usize;
    for style in AnimationRegistry::catalog() {
        let is_current = *style == current;
        lines.push(Line::from(vec![
            Span::styled(
                if is_current { " ● " } else { " ○ " },
                Style::default().fg(if is_current { theme.highlight } else { theme.fg_muted }),
            ),
            Span::styled(
                format!("{:<9}", style.display_name()),
                Style::default().fg(if is_current { theme.fg_primary } else { theme.fg_secondary }),
            ),
            Span::styled(
                truncate(style.description(), width),
                Style::default().fg(theme.fg_muted),
            ),
        ]));
    }

    if app.settings.dirty {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            " unsaved · Enter to save",
            Style::default().fg(theme.warning),
        )));
    }

    let block = Block::default()
        .title(" Transitions ")
        .title_style(Style::default().fg(theme.highlight))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused));
    f.render_widget(
        Paragraph::new(lines).block(block).alignment(Alignment::Left),
        area,
    );
}
