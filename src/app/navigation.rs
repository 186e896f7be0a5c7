use super::{App, View, WorkerRequest};
use crate::preview::{LoadRequest, OpenPreview};
use std::sync::mpsc::TrySendError;
use std::time::Instant;
use tracing::warn;

impl App {
    /// Advance the focused view. Suspended while the preview overlay is up.
    pub fn next_item(&mut self) {
        if self.preview.scroll_suspended() {
            return;
        }
        match self.ui.view {
            View::Slideshow => self.slideshow.next(Instant::now(), &mut self.frames),
            View::Wall => self.wall.navigate(1),
            View::Settings => self.cycle_animation(1),
        }
    }

    pub fn prev_item(&mut self) {
        if self.preview.scroll_suspended() {
            return;
        }
        match self.ui.view {
            View::Slideshow => self.slideshow.prev(Instant::now(), &mut self.frames),
            View::Wall => self.wall.navigate(-1),
            View::Settings => self.cycle_animation(-1),
        }
    }

    pub fn switch_view(&mut self) {
        self.ui.view = self.ui.view.next();
        if self.ui.view == View::Settings {
            self.settings.restart_preview(Instant::now());
        }
    }

    pub fn toggle_play(&mut self) {
        let playing = self.slideshow.toggle_play(Instant::now());
        self.ui.status_message = Some(if playing {
            "Slideshow playing".to_string()
        } else {
            "Slideshow paused".to_string()
        });
    }

    /// Enter on the focused view: open the preview at its cursor.
    pub fn open_active(&mut self) {
        let request = match self.ui.view {
            View::Slideshow => self.slideshow.open_active(),
            View::Wall => self.wall.open_active(),
            View::Settings => {
                self.save_animation_settings();
                return;
            }
        };
        if let Some(request) = request {
            self.open_preview(request);
        }
    }

    pub fn open_preview(&mut self, request: OpenPreview) {
        if let Some(load) = self.preview.open(request) {
            self.dispatch_preview_load(load);
        }
    }

    pub fn close_preview(&mut self) {
        self.preview.close();
        self.thumbnails.preview_image = None;
    }

    /// Hand a decode to the worker. A full queue counts as a failed load.
    pub fn dispatch_preview_load(&mut self, load: LoadRequest) {
        let Some(tx) = &self.thumbnails.request_tx else {
            return;
        };
        let LoadRequest { generation, path } = load.clone();
        match tx.try_send(WorkerRequest::Preview(load)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {
                warn!(path = %path.display(), "preview worker unavailable");
                self.preview
                    .finish_load(generation, path, Err::<(), _>("image worker busy"));
            }
        }
    }

    /// One timer step: settles transitions, runs auto-advance, drives the settings demo.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = self.slideshow.tick(now, &mut self.frames);
        changed |= self.sync_collection();
        changed |= self.ui.view == View::Settings && !self.preview.is_open();
        changed |= self.preview.is_loading();
        changed
    }
}

#[cfg(test)]
mod tests {
    use crate::app::{App, AppPaths, Config, View};
    use crate::wallpaper::{test_record, WallpaperRecord};

    fn app_with(records: Vec<WallpaperRecord>) -> (App, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = AppPaths::resolve(Some(dir.path().to_path_buf()));
        let mut app = App::with_picker(Config::default(), paths, None);
        app.store.replace_all(records);
        app.sync_collection();
        (app, dir)
    }

    fn mixed() -> Vec<WallpaperRecord> {
        vec![
            test_record("wide-a", 1920, 1080),
            test_record("tall-a", 1080, 1920),
            test_record("wide-b", 1600, 900),
            test_record("tall-b", 900, 1600),
        ]
    }

    #[test]
    fn views_follow_store_partition() {
        let (app, _dir) = app_with(mixed());
        assert_eq!(app.slideshow.slides().len(), 2);
        assert_eq!(app.wall.items().len(), 2);
    }

    #[test]
    fn navigation_targets_focused_view() {
        let (mut app, _dir) = app_with(mixed());
        app.next_item();
        assert_eq!(app.slideshow.cursor(), 1);
        assert_eq!(app.wall.cursor(), 0);
        assert_eq!(app.frames.flushes, 1);

        app.switch_view();
        assert_eq!(app.ui.view, View::Wall);
        app.prev_item();
        assert_eq!(app.wall.cursor(), 1);
        assert_eq!(app.slideshow.cursor(), 1);
    }

    #[test]
    fn open_preview_suspends_underlying_navigation() {
        let (mut app, _dir) = app_with(mixed());
        app.switch_view();
        app.open_active();
        assert!(app.preview.is_open());

        app.next_item();
        assert_eq!(app.wall.cursor(), 0);

        app.close_preview();
        app.next_item();
        assert_eq!(app.wall.cursor(), 1);
    }

    #[test]
    fn preview_from_wall_browses_portrait_only() {
        let (mut app, _dir) = app_with(mixed());
        app.switch_view();
        app.open_active();
        assert_eq!(app.preview.snapshot_len(), 2);
        assert_eq!(app.preview.current().map(|r| r.name.as_str()), Some("tall-a"));
    }

    #[test]
    fn open_preview_keeps_its_list_when_store_changes() {
        let (mut app, _dir) = app_with(mixed());
        app.switch_view();
        app.open_active();
        assert_eq!(app.preview.snapshot_len(), 2);

        app.store.replace_all(vec![
            test_record("tall-x", 900, 1600),
            test_record("tall-y", 900, 1600),
            test_record("tall-z", 900, 1600),
        ]);
        assert!(app.sync_collection());
        assert_eq!(app.wall.items().len(), 3);

        assert_eq!(app.preview.snapshot_len(), 2);
        app.preview.next();
        assert_eq!(app.preview.current().map(|r| r.name.as_str()), Some("tall-b"));
        app.preview.next();
        assert_eq!(app.preview.current().map(|r| r.name.as_str()), Some("tall-a"));
        app.preview.prev();
        assert_eq!(app.preview.current().map(|r| r.name.as_str()), Some("tall-b"));
    }

    #[test]
    fn import_signal_rebuilds_views() {
        let (mut app, _dir) = app_with(mixed());
        assert!(!app.sync_collection());
        app.store.replace_all(vec![test_record("solo", 10, 5)]);
        assert!(app.sync_collection());
        assert_eq!(app.slideshow.slides().len(), 1);
        assert!(app.wall.is_empty());
    }
}
