//! Transition style catalog and the per-category selection.

use crate::storage::{StorageGateway, ANIMATION_SETTINGS_KEY};
use crate::wallpaper::Orientation;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Named transition style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnimationStyle {
    #[default]
    Slide,
    Fade,
    Zoom,
    Flip,
    Rotate,
    Blur,
    Cube,
    Bounce,
}

impl AnimationStyle {
    pub const ALL: [AnimationStyle; 8] = [
        AnimationStyle::Slide,
        AnimationStyle::Fade,
        AnimationStyle::Zoom,
        AnimationStyle::Flip,
        AnimationStyle::Rotate,
        AnimationStyle::Blur,
        AnimationStyle::Cube,
        AnimationStyle::Bounce,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            AnimationStyle::Slide => "slide",
            AnimationStyle::Fade => "fade",
            AnimationStyle::Zoom => "zoom",
            AnimationStyle::Flip => "flip",
            AnimationStyle::Rotate => "rotate",
            AnimationStyle::Blur => "blur",
            AnimationStyle::Cube => "cube",
            AnimationStyle::Bounce => "bounce",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AnimationStyle::Slide => "Slide",
            AnimationStyle::Fade => "Fade",
            AnimationStyle::Zoom => "Zoom",
            AnimationStyle::Flip => "Flip",
            AnimationStyle::Rotate => "Rotate",
            AnimationStyle::Blur => "Blur",
            AnimationStyle::Cube => "Cube",
            AnimationStyle::Bounce => "Bounce",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AnimationStyle::Slide => "Slides in from the side it was navigated towards",
            AnimationStyle::Fade => "Cross-fades between images",
            AnimationStyle::Zoom => "Grows in from the center while the old image shrinks away",
            AnimationStyle::Flip => "Flips over on the vertical axis",
            AnimationStyle::Rotate => "Spins in with a quarter turn",
            AnimationStyle::Blur => "Sharpens out of a blur",
            AnimationStyle::Cube => "Rotates like the face of a cube",
            AnimationStyle::Bounce => "Drops in with an elastic bounce",
        }
    }

    /// Marker class applied to every slide or wall item using this style
    pub fn style_class(&self) -> &'static str {
        match self {
            AnimationStyle::Slide => "anim-slide",
            AnimationStyle::Fade => "anim-fade",
            AnimationStyle::Zoom => "anim-zoom",
            AnimationStyle::Flip => "anim-flip",
            AnimationStyle::Rotate => "anim-rotate",
            AnimationStyle::Blur => "anim-blur",
            AnimationStyle::Cube => "anim-cube",
            AnimationStyle::Bounce => "anim-bounce",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        let id = id.trim().to_lowercase();
        Self::ALL.into_iter().find(|s| s.id() == id)
    }

    /// Step through the catalog, wrapping at both ends.
    pub fn cycle(&self, step: i32) -> Self {
        let len = Self::ALL.len() as i32;
        let idx = Self::ALL.iter().position(|s| s == self).unwrap_or(0) as i32;
        Self::ALL[(idx + step).rem_euclid(len) as usize]
    }
}

/// Current selection per category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AnimationSettings {
    pub landscape: AnimationStyle,
    pub portrait: AnimationStyle,
}

impl AnimationSettings {
    pub fn get(&self, category: Orientation) -> AnimationStyle {
        match category {
            Orientation::Landscape => self.landscape,
            Orientation::Portrait => self.portrait,
        }
    }

    fn set(&mut self, category: Orientation, style: AnimationStyle) {
        match category {
            Orientation::Landscape => self.landscape = style,
            Orientation::Portrait => self.portrait = style,
        }
    }
}

/// On-disk shape: plain ids, each optional so partial or stale files still load
#[derive(Debug, Default, Deserialize)]
struct StoredSettings {
    landscape: Option<String>,
    portrait: Option<String>,
}

/// Style catalog plus the user's selection
pub struct AnimationRegistry {
    storage: StorageGateway,
    settings: AnimationSettings,
}

impl AnimationRegistry {
    pub fn new(storage: StorageGateway) -> Self {
        Self {
            storage,
            settings: AnimationSettings::default(),
        }
    }

    pub fn catalog() -> &'static [AnimationStyle] {
        &AnimationStyle::ALL
    }

    /// Merge the persisted selection over the defaults.
    pub fn load(&mut self) {
        let stored: StoredSettings = self.storage.get(ANIMATION_SETTINGS_KEY, StoredSettings::default());
        let mut merged = AnimationSettings::default();

        for (category, id) in [
            (Orientation::Landscape, stored.landscape),
            (Orientation::Portrait, stored.portrait),
        ] {
            let Some(id) = id else { continue };
            match AnimationStyle::from_id(&id) {
                Some(style) => merged.set(category, style),
                None => warn!(category = ?category, style = %id, "unknown animation style ignored"),
            }
        }

        debug!(?merged, "animation settings loaded");
        self.settings = merged;
    }

    /// Change the in-memory selection only.
    pub fn select(&mut self, category: Orientation, style: AnimationStyle) {
        self.settings.set(category, style);
    }

    /// Step the selection for one category through the catalog.
    pub fn cycle(&mut self, category: Orientation, step: i32) -> AnimationStyle {
        let next = self.settings.get(category).cycle(step);
        self.select(category, next);
        next
    }

    pub fn persist(&self) {
        self.storage.set(ANIMATION_SETTINGS_KEY, &self.settings);
    }

    pub fn style_for(&self, category: Orientation) -> AnimationStyle {
        self.settings.get(category)
    }

    pub fn settings(&self) -> AnimationSettings {
        self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Backend, MemoryBackend};
    use std::sync::Arc;

    fn registry() -> (AnimationRegistry, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::default());
        (AnimationRegistry::new(StorageGateway::new(backend.clone())), backend)
    }

    #[test]
    fn catalog_has_eight_distinct_styles() {
        let catalog = AnimationRegistry::catalog();
        assert_eq!(catalog.len(), 8);
        let classes: std::collections::HashSet<_> =
            catalog.iter().map(|s| s.style_class()).collect();
        assert_eq!(classes.len(), 8);
    }

    #[test]
    fn defaults_to_slide_when_nothing_persisted() {
        let (mut reg, _) = registry();
        reg.load();
        assert_eq!(reg.style_for(Orientation::Landscape), AnimationStyle::Slide);
        assert_eq!(reg.style_for(Orientation::Portrait), AnimationStyle::Slide);
    }

    #[test]
    fn select_and_persist_round_trips() {
        let (mut reg, backend) = registry();
        reg.load();
        reg.select(Orientation::Landscape, AnimationStyle::Zoom);
        reg.persist();

        let mut reloaded = AnimationRegistry::new(StorageGateway::new(backend));
        reloaded.load();
        assert_eq!(
            reloaded.settings(),
            AnimationSettings {
                landscape: AnimationStyle::Zoom,
                portrait: AnimationStyle::Slide,
            }
        );
    }

    #[test]
    fn select_does_not_write_until_persist() {
        let (mut reg, backend) = registry();
        reg.select(Orientation::Portrait, AnimationStyle::Cube);
        assert_eq!(backend.write_count(), 0);
        reg.persist();
        assert_eq!(backend.write_count(), 1);
    }

    #[test]
    fn partial_and_unknown_values_fall_back_to_defaults() {
        let (mut reg, backend) = registry();
        backend
            .write(ANIMATION_SETTINGS_KEY, r#"{"portrait":"fade","landscape":"wobble"}"#)
            .expect("memory write");
        reg.load();
        assert_eq!(reg.style_for(Orientation::Landscape), AnimationStyle::Slide);
        assert_eq!(reg.style_for(Orientation::Portrait), AnimationStyle::Fade);
    }

    #[test]
    fn cycle_wraps_both_ways() {
        assert_eq!(AnimationStyle::Slide.cycle(-1), AnimationStyle::Bounce);
        assert_eq!(AnimationStyle::Bounce.cycle(1), AnimationStyle::Slide);
        assert_eq!(AnimationStyle::Fade.cycle(2), AnimationStyle::Flip);
    }

    #[test]
    fn persisted_blob_uses_plain_ids() {
        let (mut reg, backend) = registry();
        reg.select(Orientation::Landscape, AnimationStyle::Zoom);
        reg.persist();
        let raw = backend
            .read(ANIMATION_SETTINGS_KEY)
            .expect("read")
            .expect("present");
        assert!(raw.contains("\"landscape\": \"zoom\""));
        assert!(raw.contains("\"portrait\": \"slide\""));
    }
}
