use super::{
    App, AppEvent, AppPaths, Config, PreviewResponse, ThumbnailRequest, ThumbnailResponse, View,
    WorkerRequest,
};
use crate::preview::{KeyResponse, LoadRequest};
use crate::thumbnail::ThumbnailCache;
use crate::ui;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use image::DynamicImage;
use lru::LruCache;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::collections::HashMap;
use std::io;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const WORKER_QUEUE_CAPACITY: usize = 256;
const APP_EVENT_QUEUE_CAPACITY: usize = 1024;
const INPUT_POLL: Duration = Duration::from_millis(50);
/// Larger previews are downscaled before they reach the terminal encoder.
const PREVIEW_MAX_EDGE: u32 = 2560;

pub async fn run_tui(config: Config, paths: AppPaths) -> Result<()> {
    let mut app = App::new(config, paths);
    info!(
        landscape = app.store.landscape_count(),
        portrait = app.store.portrait_count(),
        "tui starting"
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Bounded queues keep rapid navigation from building an unbounded backlog.
    let (work_tx, work_rx) = mpsc::sync_channel::<WorkerRequest>(WORKER_QUEUE_CAPACITY);
    let (event_tx, event_rx) = mpsc::sync_channel::<AppEvent>(APP_EVENT_QUEUE_CAPACITY);

    app.set_worker_channel(work_tx);

    let event_tx_worker = event_tx.clone();
    let thumbs = app.thumb_cache.clone();
    let thumb_size = (app.config.thumbnails.width, app.config.thumbnails.height);
    let preview_cache_size = app.config.preview.cache_size;
    thread::spawn(move || {
        image_worker(work_rx, event_tx_worker, thumbs, thumb_size, preview_cache_size);
    });

    let event_tx_input = event_tx.clone();
    thread::spawn(move || {
        input_worker(event_tx_input);
    });

    let res = run_app(&mut terminal, &mut app, event_rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if app.settings.dirty {
        debug!("discarding unsaved animation changes");
    }
    info!("tui stopped");

    res
}

/// Background thread decoding thumbnails and preview images.
fn image_worker(
    rx: Receiver<WorkerRequest>,
    tx: SyncSender<AppEvent>,
    thumbs: ThumbnailCache,
    thumb_size: (u32, u32),
    preview_cache_size: usize,
) {
    let capacity = NonZeroUsize::new(preview_cache_size).unwrap_or(NonZeroUsize::MIN);
    let mut decoded: LruCache<PathBuf, DynamicImage> = LruCache::new(capacity);

    while let Ok(first_request) = rx.recv() {
        let (preview, thumbnails) = collect_latest_requests(first_request, &rx);

        // The overlay is what the user is looking at; it goes first.
        if let Some(load) = preview {
            let result = match decoded.get(&load.path) {
                Some(image) => Ok(image.clone()),
                None => decode_preview(&load.path).inspect(|image| {
                    decoded.put(load.path.clone(), image.clone());
                }),
            };
            let response = PreviewResponse {
                generation: load.generation,
                path: load.path,
                result,
            };
            if tx.send(AppEvent::PreviewReady(response)).is_err() {
                return;
            }
        }

        for request in thumbnails {
            match thumbs.load(&request.thumb_path, &request.source_path, thumb_size.0, thumb_size.1) {
                Ok(image) => {
                    let response = ThumbnailResponse {
                        key: request.key,
                        image,
                        generation: request.generation,
                    };
                    if !send_thumbnail_ready(&tx, response) {
                        return;
                    }
                }
                Err(e) => {
                    warn!(
                        source = %request.source_path.display(),
                        error = %e,
                        "thumbnail failed"
                    );
                }
            }
        }
    }
}

fn decode_preview(path: &Path) -> Result<DynamicImage, String> {
    let image = image::open(path).map_err(|e| e.to_string())?;
    if image.width() > PREVIEW_MAX_EDGE || image.height() > PREVIEW_MAX_EDGE {
        return Ok(image.thumbnail(PREVIEW_MAX_EDGE, PREVIEW_MAX_EDGE));
    }
    Ok(image)
}

fn send_thumbnail_ready(tx: &SyncSender<AppEvent>, response: ThumbnailResponse) -> bool {
    tx.send(AppEvent::ThumbnailReady(response)).is_ok()
}

/// Drain queued work. Only the newest preview survives; thumbnails keep the
/// newest generation, deduplicated by key.
fn collect_latest_requests(
    first_request: WorkerRequest,
    rx: &Receiver<WorkerRequest>,
) -> (Option<LoadRequest>, Vec<ThumbnailRequest>) {
    let mut preview: Option<LoadRequest> = None;
    let mut latest_generation: Option<u64> = None;
    let mut latest_by_key: HashMap<String, ThumbnailRequest> = HashMap::new();

    let mut accept = |request: WorkerRequest| match request {
        WorkerRequest::Preview(load) => {
            if preview.as_ref().map_or(true, |p| load.generation > p.generation) {
                preview = Some(load);
            }
        }
        WorkerRequest::Thumbnail(request) => {
            match latest_generation {
                Some(current) if request.generation < current => return,
                Some(current) if request.generation > current => latest_by_key.clear(),
                _ => {}
            }
            latest_generation = Some(request.generation);
            latest_by_key.insert(request.key.clone(), request);
        }
    };

    accept(first_request);
    while let Ok(request) = rx.try_recv() {
        accept(request);
    }

    (preview, latest_by_key.into_values().collect())
}

/// Background thread that polls for input events.
fn input_worker(tx: SyncSender<AppEvent>) {
    loop {
        if event::poll(INPUT_POLL).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => {
                    if tx.send(AppEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(Event::Resize(_, _)) => {
                    if tx.send(AppEvent::Resize).is_err() {
                        break;
                    }
                }
                _ => {}
            }
        } else {
            match tx.try_send(AppEvent::Tick) {
                Ok(()) | Err(TrySendError::Full(_)) => {}
                Err(TrySendError::Disconnected(_)) => break,
            }
        }
    }
}

fn coalesce_thumbnail_events(events: Vec<AppEvent>) -> Vec<AppEvent> {
    let mut coalesced = Vec::with_capacity(events.len());
    let mut latest_generation: Option<u64> = None;
    let mut latest_by_key: HashMap<String, ThumbnailResponse> = HashMap::new();

    for event in events {
        match event {
            AppEvent::ThumbnailReady(response) => {
                match latest_generation {
                    None => latest_generation = Some(response.generation),
                    Some(current) if response.generation > current => {
                        latest_generation = Some(response.generation);
                        latest_by_key.clear();
                    }
                    Some(current) if response.generation < current => continue,
                    Some(_) => {}
                }
                latest_by_key.insert(response.key.clone(), response);
            }
            other => coalesced.push(other),
        }
    }

    if !latest_by_key.is_empty() {
        let mut thumbnails: Vec<_> = latest_by_key.into_values().collect();
        thumbnails.sort_by(|a, b| a.key.cmp(&b.key));
        coalesced.extend(thumbnails.into_iter().map(AppEvent::ThumbnailReady));
    }

    coalesced
}

/// Route one key press. The preview overlay, then popups, then the focused view.
pub(super) fn handle_key(app: &mut App, code: KeyCode) {
    match app.preview.handle_key(code) {
        KeyResponse::NotOpen => {}
        KeyResponse::Closed => {
            app.thumbnails.preview_image = None;
            return;
        }
        KeyResponse::Load(load) => {
            app.dispatch_preview_load(load);
            return;
        }
        KeyResponse::Ignored => return,
    }

    if app.ui.show_help {
        if matches!(code, KeyCode::Char('?') | KeyCode::Esc | KeyCode::Enter) {
            app.ui.show_help = false;
        }
        return;
    }

    if app.ui.command_mode {
        match code {
            KeyCode::Esc => app.exit_command_mode(),
            KeyCode::Enter => app.execute_command(),
            KeyCode::Backspace => app.command_backspace(),
            KeyCode::Char(c) => app.command_input(c),
            _ => {}
        }
        return;
    }

    let kb = &app.config.keybindings;

    // Arrow keys always work next to the configurable bindings.
    if kb.matches(code, &kb.quit) || code == KeyCode::Esc {
        app.ui.should_quit = true;
    } else if kb.matches(code, &kb.next) || code == KeyCode::Right {
        app.next_item();
    } else if kb.matches(code, &kb.prev) || code == KeyCode::Left {
        app.prev_item();
    } else if kb.matches(code, &kb.toggle_play) {
        app.toggle_play();
    } else if kb.matches(code, &kb.open) {
        app.open_active();
    } else {
        match code {
            KeyCode::Tab => app.switch_view(),
            KeyCode::Up | KeyCode::Down if app.ui.view == View::Settings => {
                app.switch_settings_category()
            }
            KeyCode::Char(':') => app.enter_command_mode(),
            KeyCode::Char('?') => app.ui.show_help = true,
            _ => {}
        }
    }
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event_rx: Receiver<AppEvent>,
) -> Result<()> {
    let mut needs_redraw = true;

    loop {
        if needs_redraw {
            terminal.draw(|f| ui::draw(f, app))?;
            needs_redraw = false;
        }

        let events: Vec<AppEvent> = match event_rx.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => {
                let mut events = vec![event];
                while let Ok(e) = event_rx.try_recv() {
                    events.push(e);
                }
                coalesce_thumbnail_events(events)
            }
            Err(mpsc::RecvTimeoutError::Timeout) => vec![AppEvent::Tick],
            Err(mpsc::RecvTimeoutError::Disconnected) => return Ok(()),
        };

        for event in events {
            match event {
                AppEvent::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    handle_key(app, key.code);
                    needs_redraw = true;
                }
                AppEvent::ThumbnailReady(response) => {
                    app.handle_thumbnail_ready(response);
                    needs_redraw = true;
                }
                AppEvent::PreviewReady(response) => {
                    app.handle_preview_ready(response);
                    needs_redraw = true;
                }
                AppEvent::Resize => {
                    app.handle_resize();
                    terminal.clear()?;
                    needs_redraw = true;
                }
                AppEvent::Tick => {
                    needs_redraw |= app.tick(Instant::now());
                }
            }
        }

        if app.ui.should_quit {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{coalesce_thumbnail_events, collect_latest_requests, handle_key, send_thumbnail_ready};
    use crate::app::{App, AppEvent, AppPaths, Config, ThumbnailRequest, ThumbnailResponse, View, WorkerRequest};
    use crate::preview::LoadRequest;
    use crate::wallpaper::test_record;
    use crossterm::event::KeyCode;
    use std::sync::mpsc;

    fn thumb(key: &str, generation: u64) -> WorkerRequest {
        WorkerRequest::Thumbnail(ThumbnailRequest {
            key: key.to_string(),
            thumb_path: format!("/tmp/thumbs/{key}.jpg").into(),
            source_path: format!("/tmp/{key}.png").into(),
            generation,
        })
    }

    fn preview(generation: u64) -> WorkerRequest {
        WorkerRequest::Preview(LoadRequest {
            generation,
            path: format!("/tmp/preview-{generation}.png").into(),
        })
    }

    fn response(key: &str, generation: u64) -> ThumbnailResponse {
        ThumbnailResponse {
            key: key.to_string(),
            image: image::DynamicImage::new_rgba8(1, 1),
            generation,
        }
    }

    #[test]
    fn collect_keeps_newest_thumbnail_generation_and_preview() {
        let (tx, rx) = mpsc::sync_channel(16);
        tx.send(thumb("a", 1)).expect("send");
        tx.send(preview(3)).expect("send");
        tx.send(thumb("b", 2)).expect("send");
        tx.send(preview(5)).expect("send");
        tx.send(thumb("c", 2)).expect("send");
        tx.send(preview(4)).expect("send");

        let first = rx.recv().expect("recv first");
        let (preview, mut thumbs) = collect_latest_requests(first, &rx);
        thumbs.sort_by(|a, b| a.key.cmp(&b.key));

        assert_eq!(preview.map(|p| p.generation), Some(5));
        let keys: Vec<_> = thumbs.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(keys, vec!["b", "c"]);
    }

    #[test]
    fn collect_deduplicates_keys() {
        let (tx, rx) = mpsc::sync_channel(16);
        tx.send(thumb("same", 4)).expect("send");
        tx.send(thumb("same", 4)).expect("send");

        let first = rx.recv().expect("recv first");
        let (preview, thumbs) = collect_latest_requests(first, &rx);
        assert!(preview.is_none());
        assert_eq!(thumbs.len(), 1);
    }

    #[test]
    fn send_thumbnail_ready_returns_false_when_receiver_is_gone() {
        let (tx, rx) = mpsc::sync_channel(1);
        drop(rx);
        assert!(!send_thumbnail_ready(&tx, response("k", 9)));
    }

    #[test]
    fn coalesce_keeps_latest_generation_and_other_events() {
        let events = vec![
            AppEvent::ThumbnailReady(response("a", 1)),
            AppEvent::Tick,
            AppEvent::ThumbnailReady(response("b", 2)),
            AppEvent::ThumbnailReady(response("b", 2)),
            AppEvent::ThumbnailReady(response("c", 2)),
        ];

        let mut kept = Vec::new();
        let mut saw_tick = false;
        for event in coalesce_thumbnail_events(events) {
            match event {
                AppEvent::ThumbnailReady(r) => kept.push((r.key, r.generation)),
                AppEvent::Tick => saw_tick = true,
                _ => {}
            }
        }

        assert!(saw_tick);
        assert_eq!(kept, vec![("b".to_string(), 2), ("c".to_string(), 2)]);
    }

    fn app() -> (App, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = AppPaths::resolve(Some(dir.path().to_path_buf()));
        let mut app = App::with_picker(Config::default(), paths, None);
        app.store.replace_all(vec![
            test_record("w1", 1920, 1080),
            test_record("w2", 1920, 1080),
            test_record("w3", 1920, 1080),
        ]);
        app.sync_collection();
        (app, dir)
    }

    #[test]
    fn overlay_takes_arrow_keys_while_open() {
        let (mut app, _dir) = app();
        handle_key(&mut app, KeyCode::Enter);
        assert!(app.preview.is_open());

        handle_key(&mut app, KeyCode::Right);
        assert_eq!(app.preview.cursor(), Some(1));
        assert_eq!(app.slideshow.cursor(), 0);

        handle_key(&mut app, KeyCode::Esc);
        assert!(!app.preview.is_open());
        assert!(!app.ui.should_quit);

        handle_key(&mut app, KeyCode::Right);
        assert_eq!(app.slideshow.cursor(), 1);
    }

    #[test]
    fn space_toggles_autoplay_and_tab_cycles_views() {
        let (mut app, _dir) = app();
        handle_key(&mut app, KeyCode::Char(' '));
        assert!(app.slideshow.is_playing());
        handle_key(&mut app, KeyCode::Char(' '));
        assert!(!app.slideshow.is_playing());

        handle_key(&mut app, KeyCode::Tab);
        handle_key(&mut app, KeyCode::Tab);
        assert_eq!(app.ui.view, View::Settings);
        handle_key(&mut app, KeyCode::Tab);
        assert_eq!(app.ui.view, View::Slideshow);
    }

    #[test]
    fn command_mode_collects_input() {
        let (mut app, _dir) = app();
        handle_key(&mut app, KeyCode::Char(':'));
        for c in "play".chars() {
            handle_key(&mut app, KeyCode::Char(c));
        }
        handle_key(&mut app, KeyCode::Enter);
        assert!(!app.ui.command_mode);
        assert!(app.slideshow.is_playing());
    }
}
