use anyhow::{anyhow, Result};

use crate::app::{AppPaths, Config};
use crate::storage::StorageGateway;
use crate::wallpaper::{CollectionStore, Orientation, WallpaperRecord};

fn open_store(config: &Config, paths: &AppPaths) -> CollectionStore {
    let storage = StorageGateway::in_dir(&paths.data_dir);
    let mut store = CollectionStore::new(storage, config.import_options());
    store.load();
    store
}

pub fn cmd_stats(config: &Config, paths: &AppPaths) {
    let stats = open_store(config, paths).stats();

    println!("Wallpapers: {}", stats.total);
    println!("  Landscape: {}", stats.landscape);
    println!("  Portrait:  {}", stats.portrait);
}

fn format_record(record: &WallpaperRecord) -> String {
    format!(
        "{}  {:<9} {:>5}x{:<5} {}",
        record.id,
        record.orientation().display_name(),
        record.width,
        record.height,
        record.name
    )
}

pub fn cmd_list(
    config: &Config,
    paths: &AppPaths,
    category: Option<&str>,
    query: Option<&str>,
) -> Result<()> {
    let store = open_store(config, paths);

    let orientation = category
        .map(|raw| {
            Orientation::parse(raw)
                .ok_or_else(|| anyhow!("unknown category '{}' (use landscape or portrait)", raw))
        })
        .transpose()?;

    let records: Vec<WallpaperRecord> = match (query, orientation) {
        (Some(query), _) => store
            .search(query)
            .iter()
            .filter(|wp| orientation.map_or(true, |o| wp.orientation() == o))
            .cloned()
            .collect(),
        (None, Some(orientation)) => store.list(orientation).to_vec(),
        (None, None) => store.records().to_vec(),
    };

    if records.is_empty() {
        println!("No wallpapers.");
        return Ok(());
    }

    for record in &records {
        println!("{}", format_record(record));
    }

    Ok(())
}

pub fn cmd_clear(config: &Config, paths: &AppPaths) {
    let mut store = open_store(config, paths);
    let removed = store.total();
    store.replace_all(Vec::new());
    println!("✓ Removed {} wallpaper(s)", removed);
}
