//! Failure-tolerant JSON key-value storage.
//!
//! Every logical key maps to one JSON blob. Reads return the caller's default
//! on a miss or on any failure, writes swallow their errors. Both log.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
#[cfg(test)]
use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
    sync::Mutex,
};
use thiserror::Error;
use tracing::{debug, warn};

/// Collection of imported wallpapers
pub const WALLPAPERS_KEY: &str = "wallpapers.json";
/// Per-category animation selection
pub const ANIMATION_SETTINGS_KEY: &str = "animation_settings.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON stored under '{key}': {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Raw string persistence behind the gateway
pub trait Backend: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, data: &str) -> Result<(), StorageError>;
}

/// One file per key inside a directory
pub struct DirBackend {
    root: PathBuf,
}

impl DirBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Backend for DirBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.root.join(key);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|source| StorageError::Io {
                key: key.to_string(),
                source,
            })
    }

    fn write(&self, key: &str, data: &str) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            key: key.to_string(),
            source,
        };
        fs::create_dir_all(&self.root).map_err(io_err)?;
        // Write-then-rename so a crash never leaves a half-written blob.
        let tmp = self.root.join(format!("{key}.tmp"));
        fs::write(&tmp, data).map_err(io_err)?;
        fs::rename(&tmp, self.root.join(key)).map_err(io_err)
    }
}

/// In-memory backend; counts writes so callers can assert batching.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
}

#[cfg(test)]
impl MemoryBackend {
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
impl Backend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, data: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), data.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Shared handle to the key-value store
#[derive(Clone)]
pub struct StorageGateway {
    backend: Arc<dyn Backend>,
}

impl StorageGateway {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    pub fn in_dir(root: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(DirBackend::new(root)))
    }

    /// Read `key`, falling back to `default` on a miss or any failure.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.try_get(key) {
            Ok(Some(value)) => value,
            Ok(None) => {
                debug!(key, "storage miss, using default");
                default
            }
            Err(e) => {
                warn!(key, error = %e, "storage read failed, using default");
                default
            }
        }
    }

    fn try_get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.backend.read(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StorageError::Json {
                key: key.to_string(),
                source,
            })
    }

    /// Write `value` under `key`. Failures are logged and dropped.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let result = serde_json::to_string_pretty(value)
            .map_err(|source| StorageError::Json {
                key: key.to_string(),
                source,
            })
            .and_then(|data| self.backend.write(key, &data));

        if let Err(e) = result {
            warn!(key, error = %e, "storage write dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenBackend;

    impl Backend for BrokenBackend {
        fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Io {
                key: key.to_string(),
                source: std::io::Error::other("disk on fire"),
            })
        }

        fn write(&self, key: &str, _data: &str) -> Result<(), StorageError> {
            Err(StorageError::Io {
                key: key.to_string(),
                source: std::io::Error::other("disk on fire"),
            })
        }
    }

    #[test]
    fn miss_returns_default() {
        let gateway = StorageGateway::new(Arc::new(MemoryBackend::default()));
        let value: Vec<u32> = gateway.get("nothing.json", vec![7]);
        assert_eq!(value, vec![7]);
    }

    #[test]
    fn set_then_get_round_trips() {
        let gateway = StorageGateway::new(Arc::new(MemoryBackend::default()));
        gateway.set("numbers.json", &vec![1u32, 2, 3]);
        let value: Vec<u32> = gateway.get("numbers.json", Vec::new());
        assert_eq!(value, vec![1, 2, 3]);
    }

    #[test]
    fn corrupt_blob_returns_default() {
        let backend = Arc::new(MemoryBackend::default());
        backend.write("numbers.json", "{not json").expect("memory write");
        let gateway = StorageGateway::new(backend);
        let value: Vec<u32> = gateway.get("numbers.json", vec![9]);
        assert_eq!(value, vec![9]);
    }

    #[test]
    fn failing_backend_never_reaches_caller() {
        let gateway = StorageGateway::new(Arc::new(BrokenBackend));
        gateway.set("x.json", &1u8);
        assert_eq!(gateway.get("x.json", 5u8), 5);
    }

    #[test]
    fn dir_backend_persists_to_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let gateway = StorageGateway::in_dir(dir.path());
        gateway.set(WALLPAPERS_KEY, &vec!["a".to_string()]);
        assert!(dir.path().join(WALLPAPERS_KEY).exists());

        let reopened = StorageGateway::in_dir(dir.path());
        let value: Vec<String> = reopened.get(WALLPAPERS_KEY, Vec::new());
        assert_eq!(value, vec!["a".to_string()]);
    }
}
