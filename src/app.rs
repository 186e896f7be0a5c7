use crate::animation::AnimationRegistry;
use crate::ingest::ImageIngest;
use crate::preview::{LoadRequest, PreviewOverlay};
use crate::slideshow::{Direction, LayoutSurface, SlideView, SlideshowController, TransitionMarker};
use crate::storage::StorageGateway;
use crate::thumbnail::ThumbnailCache;
use crate::wall::WallNavigator;
use crate::wallpaper::{CollectionChanged, CollectionStore, Orientation};
use crossterm::event;
use lru::LruCache;
use ratatui_image::{picker::Picker, protocol::StatefulProtocol};
use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, SyncSender, TryRecvError};
use std::time::Instant;
use tracing::debug;

mod commands;
mod config;
mod navigation;
mod runtime;
mod settings;
mod thumbnails;

pub use config::{AppPaths, Config};
pub use runtime::run_tui;
pub use settings::{SettingsState, PREVIEW_LOOP};

/// Request to load a cached thumbnail in background
pub struct ThumbnailRequest {
    pub key: String,
    pub thumb_path: PathBuf,
    pub source_path: PathBuf,
    pub generation: u64,
}

/// Response from thumbnail loading
pub struct ThumbnailResponse {
    pub key: String,
    pub image: image::DynamicImage,
    pub generation: u64,
}

/// Full-size decode for the preview overlay
pub struct PreviewResponse {
    pub generation: u64,
    pub path: PathBuf,
    pub result: Result<image::DynamicImage, String>,
}

/// Work handed to the image worker thread
pub enum WorkerRequest {
    Thumbnail(ThumbnailRequest),
    Preview(LoadRequest),
}

/// Events from background threads
pub enum AppEvent {
    Key(event::KeyEvent),
    ThumbnailReady(ThumbnailResponse),
    PreviewReady(PreviewResponse),
    Resize,
    Tick,
}

/// Decoded thumbnails kept as terminal image protocols.
const THUMBNAIL_CACHE_CAPACITY: usize = 96;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Slideshow,
    Wall,
    Settings,
}

impl View {
    pub fn next(self) -> Self {
        match self {
            View::Slideshow => View::Wall,
            View::Wall => View::Settings,
            View::Settings => View::Slideshow,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Slideshow => "Slideshow",
            View::Wall => "Poster wall",
            View::Settings => "Animations",
        }
    }
}

/// UI-related transient state (popups, command mode, errors).
pub struct UiState {
    pub should_quit: bool,
    pub show_help: bool,
    pub command_mode: bool,
    pub command_buffer: String,
    pub status_message: Option<String>,
    pub view: View,
    pub theme: crate::ui::theme::Palette,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            should_quit: false,
            show_help: false,
            command_mode: false,
            command_buffer: String::new(),
            status_message: None,
            view: View::Slideshow,
            theme: crate::ui::theme::palette(),
        }
    }
}

/// Thumbnail and preview rendering state.
pub struct ThumbnailState {
    pub image_picker: Option<Picker>,
    pub cache: LruCache<String, Box<dyn StatefulProtocol>>,
    pub loading: HashSet<String>,
    pub preview_image: Option<Box<dyn StatefulProtocol>>,
    request_tx: Option<SyncSender<WorkerRequest>>,
    generation: u64,
    /// Protocols created by the current picker. Each one took a Kitty image id.
    issued_ids: usize,
}

impl ThumbnailState {
    fn new(image_picker: Option<Picker>) -> Self {
        Self {
            image_picker,
            cache: LruCache::new(
                NonZeroUsize::new(THUMBNAIL_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN),
            ),
            loading: HashSet::new(),
            preview_image: None,
            request_tx: None,
            generation: 0,
            issued_ids: 0,
        }
    }
}

/// Layout surface backed by the terminal frame. Records which slide was
/// committed in its entry state so the view can draw where it came from.
#[derive(Debug, Default)]
pub struct TransitionFrames {
    pub flushes: u64,
    pub last_entry: Option<(usize, Direction)>,
}

impl LayoutSurface for TransitionFrames {
    fn flush(&mut self, slides: &[SlideView]) {
        self.flushes += 1;
        self.last_entry = slides.iter().enumerate().find_map(|(i, slide)| match slide.marker {
            Some(TransitionMarker::EnterFrom(direction)) => Some((i, direction)),
            _ => None,
        });
    }
}

pub struct App {
    pub config: Config,
    pub paths: AppPaths,
    pub store: CollectionStore,
    pub ingest: ImageIngest,
    pub thumb_cache: ThumbnailCache,
    pub animations: AnimationRegistry,
    pub slideshow: SlideshowController,
    pub wall: WallNavigator,
    pub preview: PreviewOverlay,
    pub settings: SettingsState,
    pub ui: UiState,
    pub thumbnails: ThumbnailState,
    pub frames: TransitionFrames,
    changes: Receiver<CollectionChanged>,
}

impl App {
    /// Load persisted state and derive the initial views.
    pub fn new(config: Config, paths: AppPaths) -> Self {
        Self::with_picker(config, paths, detect_picker())
    }

    pub(crate) fn with_picker(config: Config, paths: AppPaths, image_picker: Option<Picker>) -> Self {
        let storage = StorageGateway::in_dir(&paths.data_dir);
        let thumb_cache = ThumbnailCache::in_dir(paths.thumbnail_dir(), config.thumbnails.quality);

        let mut store = CollectionStore::new(storage.clone(), config.import_options());
        let changes = store.subscribe();
        store.load();

        let mut animations = AnimationRegistry::new(storage);
        animations.load();

        let mut app = Self {
            slideshow: SlideshowController::new(config.slide_interval(), config.settle_delay()),
            wall: WallNavigator::new(),
            preview: PreviewOverlay::new(),
            settings: SettingsState::new(Instant::now()),
            ui: UiState::default(),
            thumbnails: ThumbnailState::new(image_picker),
            frames: TransitionFrames::default(),
            ingest: ImageIngest::new(thumb_cache.clone()),
            thumb_cache,
            store,
            animations,
            config,
            paths,
            changes,
        };

        app.apply_animation_styles();
        app.refresh_lists();
        if app.config.slideshow.autoplay {
            app.slideshow.start(Instant::now());
        }
        app
    }

    /// Rebuild the slideshow and wall from the store's current partition.
    pub fn refresh_lists(&mut self) {
        self.slideshow.render(self.store.landscape());
        self.wall.render(self.store.portrait());
        self.frames.last_entry = None;
    }

    /// Drain render signals from the store. Returns true when the views were rebuilt.
    pub fn sync_collection(&mut self) -> bool {
        let mut latest = None;
        loop {
            match self.changes.try_recv() {
                Ok(change) => latest = Some(change),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        let Some(change) = latest else {
            return false;
        };
        debug!(
            total = change.total,
            landscape = change.landscape,
            portrait = change.portrait,
            "collection changed, rebuilding views"
        );
        self.refresh_lists();
        true
    }

    pub fn apply_animation_styles(&mut self) {
        self.slideshow
            .set_style(self.animations.style_for(Orientation::Landscape));
        self.wall
            .set_style(self.animations.style_for(Orientation::Portrait));
    }
}

/// Query the terminal for font size and graphics protocol, falling back to halfblocks.
fn detect_picker() -> Option<Picker> {
    Picker::from_termios()
        .ok()
        .map(|mut p| {
            p.guess_protocol();
            p
        })
        .or_else(|| Some(Picker::new((8, 16))))
}
