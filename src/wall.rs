//! Poster wall over the portrait sub-list.

use crate::animation::AnimationStyle;
use crate::preview::OpenPreview;
use crate::wallpaper::{Snapshot, WallpaperRecord};
use std::sync::Arc;
use tracing::debug;

/// Visual band of a wall item relative to the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Prev,
    Active,
    Next,
}

#[derive(Debug, Clone)]
pub struct WallItem {
    pub record: WallpaperRecord,
    pub band: Option<Band>,
    pub style: AnimationStyle,
}

#[derive(Debug)]
pub struct WallNavigator {
    list: Snapshot,
    items: Vec<WallItem>,
    cursor: usize,
    style: AnimationStyle,
}

impl Default for WallNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl WallNavigator {
    pub fn new() -> Self {
        Self {
            list: Arc::from(Vec::new()),
            items: Vec::new(),
            cursor: 0,
            style: AnimationStyle::default(),
        }
    }

    /// Rebuild from a fresh portrait snapshot; the cursor returns to the first item.
    pub fn render(&mut self, snapshot: Snapshot) {
        self.items = snapshot
            .iter()
            .map(|record| WallItem {
                record: record.clone(),
                band: None,
                style: self.style,
            })
            .collect();
        self.list = snapshot;
        self.cursor = 0;
        self.apply_bands();
    }

    pub fn set_style(&mut self, style: AnimationStyle) {
        self.style = style;
        for item in &mut self.items {
            item.style = style;
        }
    }

    /// Move the cursor by `step` (±1), wrapping. No-op on an empty wall.
    pub fn navigate(&mut self, step: isize) {
        let len = self.items.len();
        if len == 0 {
            return;
        }
        self.cursor = (self.cursor as isize + step).rem_euclid(len as isize) as usize;
        debug!(cursor = self.cursor, len, "wall navigate");
        self.apply_bands();
    }

    fn apply_bands(&mut self) {
        let len = self.items.len();
        if len == 0 {
            return;
        }
        let prev = (self.cursor + len - 1) % len;
        let next = (self.cursor + 1) % len;
        let style = self.style;

        for (i, item) in self.items.iter_mut().enumerate() {
            // Active wins over prev, prev over next, so two items never share a band.
            item.band = if i == self.cursor {
                Some(Band::Active)
            } else if i == prev {
                Some(Band::Prev)
            } else if i == next {
                Some(Band::Next)
            } else {
                None
            };
            item.style = style;
        }
    }

    /// Request the preview at `index` within the wall's snapshot.
    pub fn activate(&self, index: usize) -> Option<OpenPreview> {
        if index >= self.list.len() {
            return None;
        }
        Some(OpenPreview {
            index,
            snapshot: self.list.clone(),
        })
    }

    pub fn open_active(&self) -> Option<OpenPreview> {
        self.activate(self.cursor)
    }

    pub fn items(&self) -> &[WallItem] {
        &self.items
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn counter_text(&self) -> String {
        if self.items.is_empty() {
            "0 / 0".to_string()
        } else {
            format!("{} / {}", self.cursor + 1, self.items.len())
        }
    }
}
