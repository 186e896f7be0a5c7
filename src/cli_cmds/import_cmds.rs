use anyhow::{bail, Result};
use std::path::PathBuf;

use crate::app::{AppPaths, Config};
use crate::ingest::{self, ImageIngest};
use crate::storage::StorageGateway;
use crate::thumbnail::ThumbnailCache;
use crate::wallpaper::CollectionStore;

pub async fn cmd_import(
    config: &Config,
    paths: &AppPaths,
    inputs: &[PathBuf],
    recursive: bool,
) -> Result<()> {
    let recursive = recursive || config.library.recursive;
    let sources = ingest::collect_sources(inputs, recursive, &config.library.extensions);
    if sources.is_empty() {
        bail!("no importable files found");
    }

    let storage = StorageGateway::in_dir(&paths.data_dir);
    let mut store = CollectionStore::new(storage, config.import_options());
    store.load();

    let thumbs = ThumbnailCache::in_dir(paths.thumbnail_dir(), config.thumbnails.quality);
    let ingest = ImageIngest::new(thumbs);

    println!("Importing {} file(s)...", sources.len());
    let report = store.import_batch(&ingest, &sources).await;

    println!(
        "✓ Imported {} (skipped {}, failed {})",
        report.added, report.skipped, report.failed
    );
    let stats = store.stats();
    println!(
        "  Collection: {} landscape, {} portrait",
        stats.landscape, stats.portrait
    );

    Ok(())
}
