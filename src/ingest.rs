//! Media ingest: reads dimensions and produces thumbnails for raw image files.

use crate::thumbnail::ThumbnailCache;
use crate::utils;
use std::future::Future;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("thumbnail generation failed: {0}")]
    Thumbnail(String),
    #[error("decode task aborted: {0}")]
    Task(String),
}

/// A raw local image handed to the importer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSource {
    pub path: PathBuf,
    pub name: String,
    pub byte_size: u64,
}

impl ImportSource {
    /// Describe a file on disk. Size falls back to 0 when metadata is unreadable.
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let byte_size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        let path = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        Self {
            path,
            name,
            byte_size,
        }
    }

    pub fn extension(&self) -> Option<String> {
        utils::extension_of(&self.path)
    }

    pub fn mime_type(&self) -> &'static str {
        self.extension()
            .map(|ext| utils::mime_for_extension(&ext))
            .unwrap_or("application/octet-stream")
    }
}

/// Expand files and directories into import sources, in a stable order.
///
/// Files named explicitly are passed through untouched so the store can
/// report unsupported ones as skipped. Directory contents are filtered by
/// `accepted` extensions and sorted by path.
pub fn collect_sources(paths: &[PathBuf], recursive: bool, accepted: &[String]) -> Vec<ImportSource> {
    let mut sources = Vec::new();

    for path in paths {
        if path.is_dir() {
            let max_depth = if recursive { usize::MAX } else { 1 };
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .max_depth(max_depth)
                .follow_links(true)
                .into_iter()
                .filter_map(|entry| match entry {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        warn!(error = %e, "skipping unreadable directory entry");
                        None
                    }
                })
                .filter(|entry| entry.file_type().is_file())
                .map(|entry| entry.into_path())
                .filter(|p| utils::has_accepted_extension(p, accepted))
                .collect();
            found.sort();
            sources.extend(found.iter().map(|p| ImportSource::from_path(p)));
        } else if path.exists() {
            sources.push(ImportSource::from_path(path));
        } else {
            warn!(path = %path.display(), "import path does not exist");
        }
    }

    sources
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Asynchronous decoder used by the collection store.
pub trait MediaIngest {
    fn decode_dimensions(
        &self,
        source: &ImportSource,
    ) -> impl Future<Output = Result<Dimensions, IngestError>> + Send;

    fn make_thumbnail(
        &self,
        source: &ImportSource,
        max_w: u32,
        max_h: u32,
    ) -> impl Future<Output = Result<PathBuf, IngestError>> + Send;
}

/// Decodes with the `image` crate on tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct ImageIngest {
    thumbs: ThumbnailCache,
}

impl ImageIngest {
    pub fn new(thumbs: ThumbnailCache) -> Self {
        Self { thumbs }
    }
}

impl MediaIngest for ImageIngest {
    async fn decode_dimensions(&self, source: &ImportSource) -> Result<Dimensions, IngestError> {
        let path = source.path.clone();
        tokio::task::spawn_blocking(move || {
            // Header-only read, no full decode.
            image::image_dimensions(&path)
                .map(|(width, height)| Dimensions { width, height })
                .map_err(|source| IngestError::Decode { path, source })
        })
        .await
        .map_err(|e| IngestError::Task(e.to_string()))?
    }

    async fn make_thumbnail(
        &self,
        source: &ImportSource,
        max_w: u32,
        max_h: u32,
    ) -> Result<PathBuf, IngestError> {
        let path = source.path.clone();
        let thumbs = self.thumbs.clone();
        tokio::task::spawn_blocking(move || thumbs.create(&path, max_w, max_h))
            .await
            .map_err(|e| IngestError::Task(e.to_string()))?
    }
}
