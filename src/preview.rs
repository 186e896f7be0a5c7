//! Full-screen preview overlay shared by the slideshow and the poster wall.
//!
//! The overlay is opened with an explicit [`OpenPreview`] request and browses
//! only the snapshot it was handed. It never reads the collection store, so
//! imports that land while it is open do not change what it cycles through.

use crate::wallpaper::{Snapshot, WallpaperRecord};
use crossterm::event::KeyCode;
use std::fmt::Display;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Request to open the overlay at `index` within `snapshot`
#[derive(Debug, Clone)]
pub struct OpenPreview {
    pub index: usize,
    pub snapshot: Snapshot,
}

/// Image decode the overlay wants done off the event loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub generation: u64,
    pub path: PathBuf,
}

/// What a key press did while the overlay had focus
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResponse {
    NotOpen,
    Ignored,
    Closed,
    Load(LoadRequest),
}

#[derive(Debug)]
struct Session {
    snapshot: Snapshot,
    cursor: usize,
    displayed: Option<PathBuf>,
    loading: bool,
    error: Option<String>,
}

#[derive(Debug, Default)]
pub struct PreviewOverlay {
    session: Option<Session>,
    generation: u64,
    scroll_suspended: bool,
}

impl PreviewOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open at `request.index` (clamped). Ignored for an empty snapshot.
    pub fn open(&mut self, request: OpenPreview) -> Option<LoadRequest> {
        let OpenPreview { index, snapshot } = request;
        if snapshot.is_empty() {
            debug!("preview open ignored for empty list");
            return None;
        }

        let cursor = index.min(snapshot.len() - 1);
        // Reopening keeps whatever image was on screen until the new one decodes.
        let displayed = self.session.take().and_then(|s| s.displayed);
        self.session = Some(Session {
            snapshot,
            cursor,
            displayed,
            loading: false,
            error: None,
        });
        self.scroll_suspended = true;
        self.request_load()
    }

    pub fn close(&mut self) {
        if self.session.take().is_none() {
            return;
        }
        // Results still in flight for this session become stale.
        self.generation = self.generation.wrapping_add(1);
        self.scroll_suspended = false;
    }

    pub fn next(&mut self) -> Option<LoadRequest> {
        self.step(1)
    }

    pub fn prev(&mut self) -> Option<LoadRequest> {
        self.step(-1)
    }

    /// Decode the current image again, e.g. after the terminal was resized.
    pub fn reload(&mut self) -> Option<LoadRequest> {
        if !self.is_open() {
            return None;
        }
        self.request_load()
    }

    fn step(&mut self, delta: isize) -> Option<LoadRequest> {
        let session = self.session.as_mut()?;
        let len = session.snapshot.len();
        if len <= 1 {
            return None;
        }
        session.cursor = (session.cursor as isize + delta).rem_euclid(len as isize) as usize;
        self.request_load()
    }

    fn request_load(&mut self) -> Option<LoadRequest> {
        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;
        let session = self.session.as_mut()?;
        let record = session.snapshot.get(session.cursor)?;
        session.loading = true;
        session.error = None;
        Some(LoadRequest {
            generation,
            path: record.source_ref.clone(),
        })
    }

    /// Apply a finished decode. Returns the payload when it should replace the
    /// displayed image; stale or failed results return `None`.
    pub fn finish_load<T, E: Display>(
        &mut self,
        generation: u64,
        path: PathBuf,
        result: Result<T, E>,
    ) -> Option<T> {
        if generation != self.generation {
            debug!(generation, current = self.generation, "dropping stale preview load");
            return None;
        }
        let session = self.session.as_mut()?;
        session.loading = false;

        match result {
            Ok(image) => {
                session.displayed = Some(path);
                session.error = None;
                Some(image)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "preview decode failed");
                session.error = Some(format!("Could not load {}: {e}", path.display()));
                None
            }
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> KeyResponse {
        if !self.is_open() {
            return KeyResponse::NotOpen;
        }
        match code {
            KeyCode::Esc => {
                self.close();
                KeyResponse::Closed
            }
            KeyCode::Left => self.prev().map_or(KeyResponse::Ignored, KeyResponse::Load),
            KeyCode::Right => self.next().map_or(KeyResponse::Ignored, KeyResponse::Load),
            _ => KeyResponse::Ignored,
        }
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Underlying views must not scroll while this is set.
    pub fn scroll_suspended(&self) -> bool {
        self.scroll_suspended
    }

    pub fn cursor(&self) -> Option<usize> {
        self.session.as_ref().map(|s| s.cursor)
    }

    pub fn current(&self) -> Option<&WallpaperRecord> {
        let session = self.session.as_ref()?;
        session.snapshot.get(session.cursor)
    }

    pub fn snapshot_len(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.snapshot.len())
    }

    pub fn is_loading(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.loading)
    }

    pub fn displayed_source(&self) -> Option<&PathBuf> {
        self.session.as_ref().and_then(|s| s.displayed.as_ref())
    }

    pub fn error(&self) -> Option<&str> {
        self.session.as_ref().and_then(|s| s.error.as_deref())
    }

    pub fn counter_text(&self) -> String {
        match &self.session {
            Some(s) => format!("{} / {}", s.cursor + 1, s.snapshot.len()),
            None => String::new(),
        }
    }
}
