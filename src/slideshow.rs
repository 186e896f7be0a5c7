//! Landscape slideshow: cyclic cursor, auto-advance and the slide transition lifecycle.

use crate::animation::AnimationStyle;
use crate::preview::OpenPreview;
use crate::wallpaper::{Snapshot, WallpaperRecord};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(5000);
/// Matches the declared animation duration of every style.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(800);

pub const EMPTY_PLACEHOLDER: &str = "No landscape wallpapers yet. Import some with :import <path>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn arrow(&self) -> &'static str {
        match self {
            Direction::Forward => "❯",
            Direction::Backward => "❮",
        }
    }
}

/// Transient marker carried by a slide while a transition is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionMarker {
    EnterFrom(Direction),
    ExitTo(Direction),
}

#[derive(Debug, Clone)]
pub struct SlideView {
    pub record: WallpaperRecord,
    pub style: AnimationStyle,
    pub active: bool,
    pub marker: Option<TransitionMarker>,
    /// Bumped on every marker change; stale cleanups compare against it.
    token: u64,
}

/// Presentation surface that can be forced to commit the current slide state.
pub trait LayoutSurface {
    fn flush(&mut self, slides: &[SlideView]);
}

/// Surface that discards flushes
#[cfg(test)]
pub struct NoopSurface;

#[cfg(test)]
impl LayoutSurface for NoopSurface {
    fn flush(&mut self, _slides: &[SlideView]) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Idle,
    Playing { next_advance: Instant },
}

#[derive(Debug, Clone, Copy)]
struct PendingCleanup {
    slide: usize,
    token: u64,
    due: Instant,
}

pub struct SlideshowController {
    list: Snapshot,
    slides: Vec<SlideView>,
    cursor: usize,
    style: AnimationStyle,
    play: PlayState,
    interval: Duration,
    settle_delay: Duration,
    pending: Vec<PendingCleanup>,
    counter: String,
    next_token: u64,
}

impl SlideshowController {
    pub fn new(interval: Duration, settle_delay: Duration) -> Self {
        Self {
            list: Arc::from(Vec::new()),
            slides: Vec::new(),
            cursor: 0,
            style: AnimationStyle::default(),
            play: PlayState::Idle,
            interval,
            settle_delay,
            pending: Vec::new(),
            counter: counter_text(0, 0),
            next_token: 0,
        }
    }

    /// Rebuild every slide from the landscape list and start over at the first one.
    pub fn render(&mut self, list: Snapshot) {
        self.slides = list
            .iter()
            .enumerate()
            .map(|(i, record)| SlideView {
                record: record.clone(),
                style: self.style,
                active: i == 0,
                marker: None,
                token: 0,
            })
            .collect();
        self.list = list;
        self.cursor = 0;
        self.pending.clear();
        self.counter = counter_text(self.cursor, self.slides.len());
        debug!(slides = self.slides.len(), "slideshow rebuilt");
    }

    /// Style used by the next transition. In-flight transitions keep theirs.
    pub fn set_style(&mut self, style: AnimationStyle) {
        self.style = style;
    }

    pub fn next(&mut self, now: Instant, surface: &mut dyn LayoutSurface) {
        self.step(Direction::Forward, now, surface);
    }

    pub fn prev(&mut self, now: Instant, surface: &mut dyn LayoutSurface) {
        self.step(Direction::Backward, now, surface);
    }

    fn step(&mut self, direction: Direction, now: Instant, surface: &mut dyn LayoutSurface) {
        let len = self.slides.len();
        if len <= 1 {
            return;
        }

        let outgoing = self.cursor;
        self.cursor = match direction {
            Direction::Forward => (self.cursor + 1) % len,
            Direction::Backward => (self.cursor + len - 1) % len,
        };
        let incoming = self.cursor;

        self.transition(outgoing, incoming, direction, now, surface);
        self.counter = counter_text(self.cursor, len);
    }

    fn bump_token(&mut self) -> u64 {
        self.next_token += 1;
        self.next_token
    }

    fn transition(
        &mut self,
        outgoing: usize,
        incoming: usize,
        direction: Direction,
        now: Instant,
        surface: &mut dyn LayoutSurface,
    ) {
        let style = self.style;

        let out_token = self.bump_token();
        let out = &mut self.slides[outgoing];
        out.style = style;
        out.active = false;
        out.marker = Some(TransitionMarker::ExitTo(direction));
        out.token = out_token;

        let in_token = self.bump_token();
        let inc = &mut self.slides[incoming];
        inc.style = style;
        inc.active = true;
        inc.marker = Some(TransitionMarker::EnterFrom(direction));
        inc.token = in_token;

        // The entry state must be committed before settling, or the surface
        // collapses start and end into a single frame.
        surface.flush(&self.slides);

        self.slides[incoming].marker = None;
        self.pending.push(PendingCleanup {
            slide: outgoing,
            token: out_token,
            due: now + self.settle_delay,
        });
    }

    /// Run due cleanups and the auto-advance timer. Returns true when anything changed.
    pub fn tick(&mut self, now: Instant, surface: &mut dyn LayoutSurface) -> bool {
        let mut changed = false;

        let slides = &mut self.slides;
        self.pending.retain(|cleanup| {
            if cleanup.due > now {
                return true;
            }
            if let Some(slide) = slides.get_mut(cleanup.slide) {
                if slide.token == cleanup.token && slide.marker.is_some() {
                    slide.marker = None;
                    changed = true;
                }
            }
            false
        });

        if let PlayState::Playing { next_advance } = self.play {
            if now >= next_advance {
                self.play = PlayState::Playing {
                    next_advance: now + self.interval,
                };
                self.next(now, surface);
                changed = true;
            }
        }

        changed
    }

    /// Flip between idle and playing. Returns whether playback is now on.
    pub fn toggle_play(&mut self, now: Instant) -> bool {
        if self.is_playing() {
            self.stop();
        } else {
            self.start(now);
        }
        self.is_playing()
    }

    pub fn start(&mut self, now: Instant) {
        if !self.is_playing() {
            self.play = PlayState::Playing {
                next_advance: now + self.interval,
            };
        }
    }

    /// Cancel auto-advance. Safe to call repeatedly.
    pub fn stop(&mut self) {
        self.play = PlayState::Idle;
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.play, PlayState::Playing { .. })
    }

    pub fn play_state(&self) -> PlayState {
        self.play
    }

    pub fn slides(&self) -> &[SlideView] {
        &self.slides
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<&SlideView> {
        self.slides.get(self.cursor)
    }

    pub fn counter_text(&self) -> &str {
        &self.counter
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn pending_cleanups(&self) -> usize {
        self.pending.len()
    }

    /// Request to open the preview at the active slide.
    pub fn open_active(&self) -> Option<OpenPreview> {
        if self.list.is_empty() {
            return None;
        }
        Some(OpenPreview {
            index: self.cursor,
            snapshot: Arc::clone(&self.list),
        })
    }
}

fn counter_text(cursor: usize, len: usize) -> String {
    if len == 0 {
        "0 / 0".to_string()
    } else {
        format!("{} / {}", cursor + 1, len)
    }
}
