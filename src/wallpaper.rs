mod model;
mod store;

#[cfg(test)]
pub(crate) use model::test_record;
pub use model::{Orientation, Snapshot, WallpaperId, WallpaperRecord};
pub use store::{CollectionChanged, CollectionStats, CollectionStore, ImportOptions, ImportReport};
