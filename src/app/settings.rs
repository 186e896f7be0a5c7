//! Animation settings view: category selection and the looping style preview.

use super::App;
use crate::wallpaper::Orientation;
use std::time::{Duration, Instant};

/// The demo transition restarts on this period while the view is open.
pub const PREVIEW_LOOP: Duration = Duration::from_millis(1200);

pub struct SettingsState {
    pub category: Orientation,
    pub dirty: bool,
    loop_started: Instant,
}

impl SettingsState {
    pub fn new(now: Instant) -> Self {
        Self {
            category: Orientation::Landscape,
            dirty: false,
            loop_started: now,
        }
    }

    pub fn restart_preview(&mut self, now: Instant) {
        self.loop_started = now;
    }

    /// Position within the current demo loop, in `[0, 1)`.
    pub fn preview_progress(&self, now: Instant) -> f32 {
        let period = PREVIEW_LOOP.as_millis();
        let elapsed = now.saturating_duration_since(self.loop_started).as_millis();
        (elapsed % period) as f32 / period as f32
    }

    pub fn toggle_category(&mut self) {
        self.category = match self.category {
            Orientation::Landscape => Orientation::Portrait,
            Orientation::Portrait => Orientation::Landscape,
        };
    }
}

impl App {
    /// Step the highlighted category's style. Applies at once, saved on confirm.
    pub fn cycle_animation(&mut self, step: i32) {
        let category = self.settings.category;
        let style = self.animations.cycle(category, step);
        self.apply_animation_styles();
        self.settings.dirty = true;
        self.settings.restart_preview(Instant::now());
        self.ui.status_message = Some(format!(
            "{} transition: {}",
            category.display_name(),
            style.display_name()
        ));
    }

    pub fn switch_settings_category(&mut self) {
        self.settings.toggle_category();
        self.settings.restart_preview(Instant::now());
    }

    pub fn save_animation_settings(&mut self) {
        self.animations.persist();
        self.settings.dirty = false;
        self.ui.status_message = Some("Animation settings saved".to_string());
    }
}
