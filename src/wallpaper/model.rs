use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Immutable shared list of records captured at a point in time
pub type Snapshot = Arc<[WallpaperRecord]>;

/// Opaque unique token assigned at import time
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WallpaperId(String);

impl WallpaperId {
    /// Millisecond timestamp plus 32 random bits, hex encoded.
    pub fn generate() -> Self {
        let millis = Utc::now().timestamp_millis().max(0) as u64;
        let salt: u32 = rand::thread_rng().gen();
        Self(format!("{millis:x}-{salt:08x}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WallpaperId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which presentation surface a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
}

impl Orientation {
    pub const ALL: [Orientation; 2] = [Orientation::Landscape, Orientation::Portrait];

    /// Landscape iff strictly wider than tall. Squares (and zero sizes) are portrait.
    pub fn classify(width: u32, height: u32) -> Self {
        if width > height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Orientation::Landscape => "Landscape",
            Orientation::Portrait => "Portrait",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "landscape" | "l" => Some(Orientation::Landscape),
            "portrait" | "p" => Some(Orientation::Portrait),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallpaperRecord {
    pub id: WallpaperId,
    pub name: String,
    pub byte_size: u64,
    pub width: u32,
    pub height: u32,
    pub mime_type: String,
    /// Cached downscaled JPEG rendering
    pub thumbnail: PathBuf,
    /// Full-resolution source file
    pub source_ref: PathBuf,
    pub imported_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl WallpaperRecord {
    pub fn orientation(&self) -> Orientation {
        Orientation::classify(self.width, self.height)
    }

    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }

    pub fn is_portrait(&self) -> bool {
        self.height >= self.width
    }
}

#[cfg(test)]
pub(crate) fn test_record(name: &str, width: u32, height: u32) -> WallpaperRecord {
    WallpaperRecord {
        id: WallpaperId::generate(),
        name: name.to_string(),
        byte_size: 0,
        width,
        height,
        mime_type: "image/png".to_string(),
        thumbnail: PathBuf::from(format!("/tmp/thumbs/{name}.jpg")),
        source_ref: PathBuf::from(format!("/tmp/{name}.png")),
        imported_at: Utc::now(),
        tags: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_landscape_and_portrait() {
        assert_eq!(Orientation::classify(1920, 1080), Orientation::Landscape);
        assert_eq!(Orientation::classify(1080, 1920), Orientation::Portrait);
    }

    #[test]
    fn square_goes_to_portrait() {
        assert_eq!(Orientation::classify(1000, 1000), Orientation::Portrait);
    }

    #[test]
    fn malformed_dimensions_follow_tie_rule() {
        assert_eq!(Orientation::classify(0, 0), Orientation::Portrait);
        assert_eq!(Orientation::classify(0, 10), Orientation::Portrait);
        assert_eq!(Orientation::classify(10, 0), Orientation::Landscape);
    }

    #[test]
    fn predicates_are_exclusive_and_total() {
        for (w, h) in [(1, 2), (2, 1), (5, 5), (0, 0), (3000, 2999)] {
            let r = test_record("x", w, h);
            assert!(r.is_landscape() ^ r.is_portrait(), "{w}x{h}");
        }
    }

    #[test]
    fn generated_ids_are_distinct() {
        let a = WallpaperId::generate();
        let b = WallpaperId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn orientation_parse() {
        assert_eq!(Orientation::parse("Landscape"), Some(Orientation::Landscape));
        assert_eq!(Orientation::parse(" p "), Some(Orientation::Portrait));
        assert_eq!(Orientation::parse("square"), None);
    }
}
