use super::{App, PreviewResponse, ThumbnailRequest, ThumbnailResponse, WorkerRequest};
use crate::wallpaper::WallpaperRecord;
use ratatui_image::{picker::Picker, protocol::StatefulProtocol};
use std::sync::mpsc::SyncSender;
use tracing::debug;

const THUMBNAIL_MAX_IN_FLIGHT: usize = 12;
/// ratatui-image hands every protocol a u8 id and never deletes the terminal
/// side image when the protocol drops. Recycle well before the ids wrap.
const IMAGE_ID_BUDGET: usize = 200;

impl App {
    /// Request a thumbnail to be loaded in background.
    pub fn request_thumbnail(&mut self, record: &WallpaperRecord) {
        let key = record.id.as_str();
        if self.thumbnails.cache.contains(key) || self.thumbnails.loading.contains(key) {
            return;
        }
        if self.thumbnails.loading.len() >= THUMBNAIL_MAX_IN_FLIGHT {
            return;
        }

        if let Some(tx) = &self.thumbnails.request_tx {
            let request = ThumbnailRequest {
                key: key.to_string(),
                thumb_path: record.thumbnail.clone(),
                source_path: record.source_ref.clone(),
                generation: self.thumbnails.generation,
            };
            if tx.try_send(WorkerRequest::Thumbnail(request)).is_ok() {
                self.thumbnails.loading.insert(key.to_string());
            }
        }
    }

    fn new_thumbnail_picker() -> Picker {
        let mut picker = Picker::from_termios().unwrap_or_else(|_| Picker::new((8, 16)));
        picker.guess_protocol();
        picker
    }

    /// Clear in-memory image state and purge terminal-side image ids.
    pub(super) fn reset_thumbnail_cache(&mut self) {
        Self::clear_terminal_images();
        self.thumbnails.cache.clear();
        self.thumbnails.loading.clear();
        self.thumbnails.preview_image = None;
        self.thumbnails.generation = self.thumbnails.generation.wrapping_add(1);
    }

    /// Purge the terminal and start a fresh picker so image ids restart at zero.
    fn recycle_image_ids(&mut self) {
        self.reset_thumbnail_cache();
        if self.thumbnails.image_picker.is_some() {
            self.thumbnails.image_picker = Some(Self::new_thumbnail_picker());
        }
        self.thumbnails.issued_ids = 0;
    }

    /// Encode `image` for the terminal. Returns whether the terminal was purged
    /// first, which drops every protocol created before.
    fn new_protocol(
        &mut self,
        image: image::DynamicImage,
    ) -> (Option<Box<dyn StatefulProtocol>>, bool) {
        let recycled = self.thumbnails.issued_ids >= IMAGE_ID_BUDGET;
        if recycled {
            debug!(issued = self.thumbnails.issued_ids, "recycling terminal image ids");
            self.recycle_image_ids();
        }
        let Some(picker) = &mut self.thumbnails.image_picker else {
            return (None, recycled);
        };
        self.thumbnails.issued_ids += 1;
        (Some(picker.new_resize_protocol(image)), recycled)
    }

    pub fn handle_thumbnail_ready(&mut self, response: ThumbnailResponse) {
        if response.generation != self.thumbnails.generation {
            return;
        }
        self.thumbnails.loading.remove(&response.key);

        let (protocol, recycled) = self.new_protocol(response.image);
        if let Some(protocol) = protocol {
            self.thumbnails.cache.put(response.key, protocol);
        }
        // The purge also removed the preview image from the terminal.
        if recycled {
            if let Some(load) = self.preview.reload() {
                self.dispatch_preview_load(load);
            }
        }
    }

    /// Swap in a decoded preview unless the overlay moved on or closed.
    pub fn handle_preview_ready(&mut self, response: PreviewResponse) {
        let PreviewResponse {
            generation,
            path,
            result,
        } = response;
        let Some(image) = self.preview.finish_load(generation, path, result) else {
            return;
        };
        let (protocol, _) = self.new_protocol(image);
        self.thumbnails.preview_image = protocol;
    }

    /// Purge all Kitty graphics protocol images from the terminal.
    ///
    /// Sends `APC G a=d,d=A ST`, ignored by terminals without the protocol.
    fn clear_terminal_images() {
        let is_kitty = std::env::var("TERM").is_ok_and(|t| t.contains("kitty"))
            || std::env::var("KITTY_WINDOW_ID").is_ok();
        if !is_kitty {
            return;
        }
        use std::io::Write;
        let _ = std::io::stdout().write_all(b"\x1b_Ga=d,d=A\x1b\\");
        let _ = std::io::stdout().flush();
    }

    /// Thumbnail protocol for a record, marking it most recently used.
    pub fn get_thumbnail(&mut self, key: &str) -> Option<&mut Box<dyn StatefulProtocol>> {
        self.thumbnails.cache.get_mut(key)
    }

    pub fn is_loading(&self, key: &str) -> bool {
        self.thumbnails.loading.contains(key)
    }

    pub fn set_worker_channel(&mut self, tx: SyncSender<WorkerRequest>) {
        self.thumbnails.request_tx = Some(tx);
    }

    /// Protocols are sized for the old terminal and render garbled after a resize.
    pub fn handle_resize(&mut self) {
        self.recycle_image_ids();
        // Font metrics may have changed even when no picker was detected at startup.
        if self.thumbnails.image_picker.is_none() {
            self.thumbnails.image_picker = Some(Self::new_thumbnail_picker());
        }
        if let Some(load) = self.preview.reload() {
            self.dispatch_preview_load(load);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::app::{App, AppPaths, Config, ThumbnailResponse, WorkerRequest};
    use crate::wallpaper::test_record;
    use ratatui_image::picker::Picker;
    use std::sync::mpsc;

    fn test_app() -> (App, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = AppPaths::resolve(Some(dir.path().to_path_buf()));
        (App::with_picker(Config::default(), paths, None), dir)
    }

    #[test]
    fn in_flight_requests_are_bounded() {
        let (mut app, _dir) = test_app();
        let (tx, _rx) = mpsc::sync_channel(64);
        app.set_worker_channel(tx);

        let records: Vec<_> = (0..20).map(|i| test_record(&format!("t{i}"), 4, 3)).collect();
        for record in &records {
            app.request_thumbnail(record);
        }
        assert_eq!(app.thumbnails.loading.len(), super::THUMBNAIL_MAX_IN_FLIGHT);
        assert!(!app.is_loading(records[19].id.as_str()));
    }

    #[test]
    fn full_queue_does_not_mark_loading() {
        let (mut app, _dir) = test_app();
        let (tx, rx) = mpsc::sync_channel(1);
        app.set_worker_channel(tx);

        let first = test_record("first", 4, 3);
        let second = test_record("second", 4, 3);
        app.request_thumbnail(&first);
        app.request_thumbnail(&second);
        assert!(app.is_loading(first.id.as_str()));
        assert!(!app.is_loading(second.id.as_str()));

        match rx.try_recv() {
            Ok(WorkerRequest::Thumbnail(req)) => assert_eq!(req.key, first.id.as_str()),
            _ => panic!("expected a thumbnail request"),
        }
    }

    #[test]
    fn stale_thumbnail_generation_is_ignored() {
        let (mut app, _dir) = test_app();
        app.thumbnails.generation = 2;
        app.thumbnails.loading.insert("k".to_string());

        app.handle_thumbnail_ready(ThumbnailResponse {
            key: "k".to_string(),
            image: image::DynamicImage::new_rgba8(1, 1),
            generation: 1,
        });

        assert!(app.is_loading("k"));
        assert!(app.thumbnails.cache.is_empty());
    }

    #[test]
    fn current_generation_clears_loading() {
        let (mut app, _dir) = test_app();
        app.thumbnails.generation = 7;
        app.thumbnails.loading.insert("k".to_string());

        app.handle_thumbnail_ready(ThumbnailResponse {
            key: "k".to_string(),
            image: image::DynamicImage::new_rgba8(1, 1),
            generation: 7,
        });

        assert!(!app.is_loading("k"));
    }

    fn ready(key: &str, generation: u64) -> ThumbnailResponse {
        ThumbnailResponse {
            key: key.to_string(),
            image: image::DynamicImage::new_rgba8(1, 1),
            generation,
        }
    }

    #[test]
    fn image_ids_are_recycled_before_they_wrap() {
        let (mut app, _dir) = test_app();
        app.thumbnails.image_picker = Some(Picker::new((8, 16)));

        for i in 0..super::IMAGE_ID_BUDGET {
            app.handle_thumbnail_ready(ready(&format!("k{i}"), 0));
        }
        assert_eq!(app.thumbnails.issued_ids, super::IMAGE_ID_BUDGET);
        assert_eq!(app.thumbnails.cache.len(), crate::app::THUMBNAIL_CACHE_CAPACITY);
        assert_eq!(app.thumbnails.generation, 0);

        app.handle_thumbnail_ready(ready("last", 0));
        assert_eq!(app.thumbnails.issued_ids, 1);
        assert_eq!(app.thumbnails.cache.len(), 1);
        assert!(app.get_thumbnail("last").is_some());
        assert_eq!(app.thumbnails.generation, 1);
    }

    #[test]
    fn recycling_ids_reloads_open_preview() {
        let (mut app, _dir) = test_app();
        app.thumbnails.image_picker = Some(Picker::new((8, 16)));
        let (tx, rx) = mpsc::sync_channel(8);
        app.set_worker_channel(tx);
        app.store.replace_all(vec![test_record("tall-a", 9, 16), test_record("tall-b", 9, 16)]);
        app.sync_collection();
        app.switch_view();
        app.open_active();

        let first = match rx.try_recv() {
            Ok(WorkerRequest::Preview(load)) => load,
            _ => panic!("expected a preview load"),
        };

        app.thumbnails.issued_ids = super::IMAGE_ID_BUDGET;
        app.handle_thumbnail_ready(ready("late", 0));

        match rx.try_recv() {
            Ok(WorkerRequest::Preview(load)) => {
                assert_eq!(load.path, first.path);
                assert!(load.generation > first.generation);
            }
            _ => panic!("expected the preview to be reloaded"),
        }
    }
}
