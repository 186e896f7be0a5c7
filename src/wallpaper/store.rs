use super::model::{Orientation, Snapshot, WallpaperId, WallpaperRecord};
use crate::ingest::{ImportSource, IngestError, MediaIngest};
use crate::storage::{StorageGateway, WALLPAPERS_KEY};
use crate::utils;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Render signal emitted after the collection changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionChanged {
    pub total: usize,
    pub landscape: usize,
    pub portrait: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CollectionStats {
    pub total: usize,
    pub landscape: usize,
    pub portrait: usize,
}

/// Outcome of one batch import
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub added: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Importer knobs taken from the config
#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub accepted_extensions: Vec<String>,
    pub thumb_width: u32,
    pub thumb_height: u32,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            accepted_extensions: utils::IMAGE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            thumb_width: 400,
            thumb_height: 300,
        }
    }
}

/// Canonical wallpaper list plus its landscape/portrait partition.
pub struct CollectionStore {
    storage: StorageGateway,
    options: ImportOptions,
    wallpapers: Vec<WallpaperRecord>,
    landscape: Snapshot,
    portrait: Snapshot,
    listeners: Vec<Sender<CollectionChanged>>,
}

impl CollectionStore {
    pub fn new(storage: StorageGateway, options: ImportOptions) -> Self {
        Self {
            storage,
            options,
            wallpapers: Vec::new(),
            landscape: Arc::from(Vec::new()),
            portrait: Arc::from(Vec::new()),
            listeners: Vec::new(),
        }
    }

    /// Read the persisted collection and rebuild the partition.
    pub fn load(&mut self) {
        let loaded: Vec<WallpaperRecord> = self.storage.get(WALLPAPERS_KEY, Vec::new());

        // Drop duplicate ids left behind by hand-edited files, keeping the first.
        let mut seen = HashSet::new();
        self.wallpapers = loaded
            .into_iter()
            .filter(|wp| seen.insert(wp.id.clone()))
            .collect();

        self.reclassify();
        info!(
            total = self.wallpapers.len(),
            landscape = self.landscape.len(),
            portrait = self.portrait.len(),
            "collection loaded"
        );
    }

    pub fn save(&self) {
        self.storage.set(WALLPAPERS_KEY, &self.wallpapers);
    }

    /// Register for render signals.
    pub fn subscribe(&mut self) -> Receiver<CollectionChanged> {
        let (tx, rx) = mpsc::channel();
        self.listeners.push(tx);
        rx
    }

    fn notify(&mut self) {
        let event = CollectionChanged {
            total: self.wallpapers.len(),
            landscape: self.landscape.len(),
            portrait: self.portrait.len(),
        };
        // Dropped receivers unsubscribe themselves.
        self.listeners.retain(|tx| tx.send(event).is_ok());
    }

    fn reclassify(&mut self) {
        let (landscape, portrait): (Vec<_>, Vec<_>) = self
            .wallpapers
            .iter()
            .cloned()
            .partition(WallpaperRecord::is_landscape);
        self.landscape = Arc::from(landscape);
        self.portrait = Arc::from(portrait);
    }

    fn accepts(&self, source: &ImportSource) -> bool {
        utils::has_accepted_extension(&source.path, &self.options.accepted_extensions)
    }

    fn fresh_id(&self) -> WallpaperId {
        loop {
            let id = WallpaperId::generate();
            if !self.wallpapers.iter().any(|wp| wp.id == id) {
                return id;
            }
        }
    }

    /// Import one file. Returns `Ok(None)` for unsupported extensions.
    ///
    /// Does not persist or signal; batch callers do that once at the end.
    pub async fn add<I: MediaIngest>(
        &mut self,
        ingest: &I,
        source: &ImportSource,
    ) -> Result<Option<WallpaperRecord>, IngestError> {
        if !self.accepts(source) {
            debug!(name = %source.name, "skipping unsupported file");
            return Ok(None);
        }

        let dims = ingest.decode_dimensions(source).await?;
        let thumbnail = ingest
            .make_thumbnail(source, self.options.thumb_width, self.options.thumb_height)
            .await?;

        let record = WallpaperRecord {
            id: self.fresh_id(),
            name: source.name.clone(),
            byte_size: source.byte_size,
            width: dims.width,
            height: dims.height,
            mime_type: source.mime_type().to_string(),
            thumbnail,
            source_ref: source.path.clone(),
            imported_at: Utc::now(),
            tags: Vec::new(),
        };

        self.wallpapers.push(record.clone());
        self.reclassify();
        Ok(Some(record))
    }

    /// Import sources one after another, then persist and signal once.
    pub async fn import_batch<I: MediaIngest>(
        &mut self,
        ingest: &I,
        sources: &[ImportSource],
    ) -> ImportReport {
        let mut report = ImportReport::default();

        for source in sources {
            match self.add(ingest, source).await {
                Ok(Some(record)) => {
                    debug!(id = %record.id, name = %record.name, "imported");
                    report.added += 1;
                }
                Ok(None) => report.skipped += 1,
                Err(e) => {
                    warn!(name = %source.name, error = %e, "import failed");
                    report.failed += 1;
                }
            }
        }

        self.save();
        self.notify();
        info!(
            added = report.added,
            skipped = report.skipped,
            failed = report.failed,
            "batch import finished"
        );
        report
    }

    /// Replace the whole collection, then persist and signal once.
    pub fn replace_all(&mut self, records: Vec<WallpaperRecord>) {
        let mut seen = HashSet::new();
        self.wallpapers = records
            .into_iter()
            .filter(|wp| seen.insert(wp.id.clone()))
            .collect();
        self.reclassify();
        self.save();
        self.notify();
    }

    /// Search hook. Filtering is not implemented; the whole collection comes back.
    pub fn search(&self, query: &str) -> Snapshot {
        debug!(query, "search requested, returning unfiltered collection");
        Arc::from(self.wallpapers.clone())
    }

    pub fn records(&self) -> &[WallpaperRecord] {
        &self.wallpapers
    }

    pub fn landscape(&self) -> Snapshot {
        Arc::clone(&self.landscape)
    }

    pub fn portrait(&self) -> Snapshot {
        Arc::clone(&self.portrait)
    }

    pub fn list(&self, orientation: Orientation) -> Snapshot {
        match orientation {
            Orientation::Landscape => self.landscape(),
            Orientation::Portrait => self.portrait(),
        }
    }

    pub fn total(&self) -> usize {
        self.wallpapers.len()
    }

    pub fn landscape_count(&self) -> usize {
        self.landscape.len()
    }

    pub fn portrait_count(&self) -> usize {
        self.portrait.len()
    }

    pub fn stats(&self) -> CollectionStats {
        CollectionStats {
            total: self.total(),
            landscape: self.landscape_count(),
            portrait: self.portrait_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::Dimensions;
    use crate::storage::MemoryBackend;
    use crate::wallpaper::model::test_record;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Ingest double: dimensions by file name, decode failure for unknown names.
    #[derive(Default)]
    struct FakeIngest {
        sizes: HashMap<String, (u32, u32)>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeIngest {
        fn with(sizes: &[(&str, u32, u32)]) -> Self {
            Self {
                sizes: sizes
                    .iter()
                    .map(|(n, w, h)| (n.to_string(), (*w, *h)))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl MediaIngest for FakeIngest {
        async fn decode_dimensions(&self, source: &ImportSource) -> Result<Dimensions, IngestError> {
            self.calls.lock().expect("calls").push(source.name.clone());
            self.sizes
                .get(&source.name)
                .map(|&(width, height)| Dimensions { width, height })
                .ok_or_else(|| IngestError::Thumbnail(format!("cannot decode {}", source.name)))
        }

        async fn make_thumbnail(
            &self,
            source: &ImportSource,
            _max_w: u32,
            _max_h: u32,
        ) -> Result<PathBuf, IngestError> {
            Ok(PathBuf::from(format!("/thumbs/{}.jpg", source.name)))
        }
    }

    fn source(name: &str) -> ImportSource {
        ImportSource {
            path: PathBuf::from(format!("/pics/{name}")),
            name: name.to_string(),
            byte_size: 1024,
        }
    }

    fn store_with_backend() -> (CollectionStore, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::default());
        let store = CollectionStore::new(
            StorageGateway::new(backend.clone()),
            ImportOptions::default(),
        );
        (store, backend)
    }

    #[tokio::test]
    async fn scenario_partition_matches_expected_lists() {
        let (mut store, _) = store_with_backend();
        let ingest = FakeIngest::with(&[
            ("a.jpg", 800, 600),
            ("b.jpg", 600, 800),
            ("c.jpg", 1000, 500),
        ]);
        let sources = [source("a.jpg"), source("b.jpg"), source("c.jpg")];
        store.import_batch(&ingest, &sources).await;

        let landscape: Vec<_> = store.landscape().iter().map(|r| r.name.clone()).collect();
        let portrait: Vec<_> = store.portrait().iter().map(|r| r.name.clone()).collect();
        assert_eq!(landscape, vec!["a.jpg", "c.jpg"]);
        assert_eq!(portrait, vec!["b.jpg"]);
    }

    #[tokio::test]
    async fn partition_is_total_without_duplicates() {
        let (mut store, _) = store_with_backend();
        let ingest = FakeIngest::with(&[
            ("1.png", 10, 10),
            ("2.png", 11, 10),
            ("3.png", 10, 11),
            ("4.png", 0, 0),
        ]);
        let sources: Vec<_> = ["1.png", "2.png", "3.png", "4.png"]
            .into_iter()
            .map(source)
            .collect();
        store.import_batch(&ingest, &sources).await;

        assert_eq!(store.landscape_count() + store.portrait_count(), store.total());
        let mut ids: Vec<_> = store
            .landscape()
            .iter()
            .chain(store.portrait().iter())
            .map(|r| r.id.clone())
            .collect();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[tokio::test]
    async fn batch_isolates_failures_and_persists_once() {
        let (mut store, backend) = store_with_backend();
        let rx = store.subscribe();
        let ingest = FakeIngest::with(&[("one.jpg", 800, 600), ("three.jpg", 600, 800)]);
        let sources = [source("one.jpg"), source("two.jpg"), source("three.jpg")];

        let report = store.import_batch(&ingest, &sources).await;

        assert_eq!(
            report,
            ImportReport {
                added: 2,
                skipped: 0,
                failed: 1
            }
        );
        let names: Vec<_> = store.records().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["one.jpg", "three.jpg"]);
        assert_eq!(backend.write_count(), 1);
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[tokio::test]
    async fn batch_is_sequential_in_submission_order() {
        let (mut store, _) = store_with_backend();
        let ingest = FakeIngest::with(&[("x.png", 1, 2), ("y.png", 2, 1), ("z.png", 3, 3)]);
        let sources = [source("x.png"), source("y.png"), source("z.png")];
        store.import_batch(&ingest, &sources).await;
        assert_eq!(
            *ingest.calls.lock().expect("calls"),
            vec!["x.png", "y.png", "z.png"]
        );
    }

    #[tokio::test]
    async fn unsupported_extension_is_skipped_without_decoding() {
        let (mut store, _) = store_with_backend();
        let ingest = FakeIngest::with(&[("anim.gif", 10, 10)]);
        let result = store.add(&ingest, &source("anim.gif")).await.expect("no error");
        assert!(result.is_none());
        assert!(ingest.calls.lock().expect("calls").is_empty());
        assert_eq!(store.total(), 0);
    }

    #[tokio::test]
    async fn add_propagates_decode_failure() {
        let (mut store, _) = store_with_backend();
        let ingest = FakeIngest::default();
        assert!(store.add(&ingest, &source("bad.png")).await.is_err());
        assert_eq!(store.total(), 0);
    }

    #[tokio::test]
    async fn load_restores_saved_collection() {
        let (mut store, backend) = store_with_backend();
        let ingest = FakeIngest::with(&[("a.webp", 300, 100)]);
        store.import_batch(&ingest, &[source("a.webp")]).await;

        let mut reopened = CollectionStore::new(
            StorageGateway::new(backend.clone()),
            ImportOptions::default(),
        );
        reopened.load();
        assert_eq!(reopened.total(), 1);
        assert_eq!(reopened.landscape_count(), 1);
        assert_eq!(reopened.records()[0].mime_type, "image/webp");
    }

    #[test]
    fn load_with_nothing_persisted_is_empty() {
        let (mut store, _) = store_with_backend();
        store.load();
        assert_eq!(store.stats(), CollectionStats::default());
    }

    #[test]
    fn snapshots_are_insulated_from_later_mutation() {
        let (mut store, _) = store_with_backend();
        store.replace_all(vec![test_record("p1", 100, 200)]);
        let before = store.portrait();

        store.replace_all(vec![
            test_record("p1", 100, 200),
            test_record("p2", 100, 300),
        ]);

        assert_eq!(before.len(), 1);
        assert_eq!(store.portrait_count(), 2);
    }

    #[test]
    fn replace_all_drops_duplicate_ids_and_signals_once() {
        let (mut store, backend) = store_with_backend();
        let rx = store.subscribe();
        let record = test_record("dup", 10, 5);
        store.replace_all(vec![record.clone(), record]);
        assert_eq!(store.total(), 1);
        assert_eq!(backend.write_count(), 1);
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[test]
    fn search_hook_returns_everything() {
        let (mut store, _) = store_with_backend();
        store.replace_all(vec![test_record("a", 1, 2), test_record("b", 2, 1)]);
        assert_eq!(store.search("sunset").len(), 2);
    }
}
