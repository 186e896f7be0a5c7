use crate::utils;
use crate::wallpaper::ImportOptions;
use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

const CONFIG_FILE: &str = "config.toml";

/// Where config, persisted state and caches live.
///
/// With `--data-dir` everything is relocated under that directory so a
/// session never touches the user's real profile.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub data_dir: PathBuf,
    pub config_file: PathBuf,
    pub cache_dir: PathBuf,
}

impl AppPaths {
    pub fn resolve(data_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = data_dir {
            return Self {
                config_file: dir.join(CONFIG_FILE),
                cache_dir: dir.join("cache"),
                data_dir: dir,
            };
        }

        match directories::ProjectDirs::from("com", "posterwall", "posterwall") {
            Some(dirs) => Self {
                data_dir: dirs.data_dir().to_path_buf(),
                config_file: dirs.config_dir().join(CONFIG_FILE),
                cache_dir: dirs.cache_dir().to_path_buf(),
            },
            None => {
                let fallback = PathBuf::from("/tmp/posterwall");
                Self {
                    config_file: fallback.join(CONFIG_FILE),
                    cache_dir: fallback.join("cache"),
                    data_dir: fallback,
                }
            }
        }
    }

    pub fn thumbnail_dir(&self) -> PathBuf {
        self.cache_dir.join("thumbs")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub library: LibraryConfig,
    #[serde(default)]
    pub slideshow: SlideshowConfig,
    #[serde(default)]
    pub thumbnails: ThumbnailConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LibraryConfig {
    pub extensions: Vec<String>,
    pub recursive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SlideshowConfig {
    pub interval_ms: u64,
    pub settle_ms: u64,
    /// Start auto-advance as soon as the TUI opens
    #[serde(default)]
    pub autoplay: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThumbnailConfig {
    pub width: u32,
    pub height: u32,
    pub quality: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreviewConfig {
    /// Decoded full-size images kept in memory by the worker
    pub cache_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeybindingsConfig {
    pub next: String,
    pub prev: String,
    pub toggle_play: String,
    pub open: String,
    pub quit: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            extensions: utils::IMAGE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            recursive: false,
        }
    }
}

impl Default for SlideshowConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5000,
            settle_ms: 800,
            autoplay: false,
        }
    }
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 300,
            quality: 85,
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self { cache_size: 8 }
    }
}

impl Default for KeybindingsConfig {
    fn default() -> Self {
        Self {
            next: "l".to_string(),
            prev: "h".to_string(),
            toggle_play: "Space".to_string(),
            open: "Enter".to_string(),
            quit: "q".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl KeybindingsConfig {
    /// Parse a keybinding string into a KeyCode
    pub fn parse_key(s: &str) -> Option<KeyCode> {
        let s = s.trim();

        if s.chars().count() == 1 {
            return s.chars().next().map(KeyCode::Char);
        }

        match s.to_lowercase().as_str() {
            "enter" | "return" => Some(KeyCode::Enter),
            "esc" | "escape" => Some(KeyCode::Esc),
            "tab" => Some(KeyCode::Tab),
            "backtab" | "shift+tab" => Some(KeyCode::BackTab),
            "space" => Some(KeyCode::Char(' ')),
            "backspace" => Some(KeyCode::Backspace),
            "home" => Some(KeyCode::Home),
            "end" => Some(KeyCode::End),
            "pageup" | "pgup" => Some(KeyCode::PageUp),
            "pagedown" | "pgdn" => Some(KeyCode::PageDown),
            "up" => Some(KeyCode::Up),
            "down" => Some(KeyCode::Down),
            "left" => Some(KeyCode::Left),
            "right" => Some(KeyCode::Right),
            _ => None,
        }
    }

    pub fn matches(&self, key: KeyCode, binding: &str) -> bool {
        Self::parse_key(binding) == Some(key)
    }
}

impl Config {
    /// Load config from `path`, creating defaults if missing or corrupt.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Config::default();
            config.save(path)?;
            return Ok(config);
        }

        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        match toml::from_str::<Config>(&data) {
            Ok(config) => Ok(config),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "config unparsable, using defaults");
                let config = Config::default();
                config.save(path)?;
                Ok(config)
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let data = toml::to_string_pretty(self)?;
        fs::write(path, data).with_context(|| format!("failed to write config {}", path.display()))?;
        Ok(())
    }

    pub fn slide_interval(&self) -> Duration {
        Duration::from_millis(self.slideshow.interval_ms.max(1))
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.slideshow.settle_ms)
    }

    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            accepted_extensions: self.library.extensions.clone(),
            thumb_width: self.thumbnails.width.max(1),
            thumb_height: self.thumbnails.height.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_is_created_with_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let config = Config::load(&path).expect("load");
        assert_eq!(config, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn partial_config_fills_missing_sections() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            "[slideshow]\ninterval_ms = 2500\nsettle_ms = 300\n",
        )
        .expect("write");

        let config = Config::load(&path).expect("load");
        assert_eq!(config.slide_interval(), Duration::from_millis(2500));
        assert_eq!(config.settle_delay(), Duration::from_millis(300));
        assert!(!config.slideshow.autoplay);
        assert_eq!(config.thumbnails, ThumbnailConfig::default());
    }

    #[test]
    fn corrupt_config_is_replaced() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "this is = = not toml").expect("write");

        let config = Config::load(&path).expect("load");
        assert_eq!(config, Config::default());
        let rewritten = fs::read_to_string(&path).expect("read");
        assert!(rewritten.contains("[slideshow]"));
    }

    #[test]
    fn parse_named_and_single_keys() {
        assert_eq!(KeybindingsConfig::parse_key("Space"), Some(KeyCode::Char(' ')));
        assert_eq!(KeybindingsConfig::parse_key("enter"), Some(KeyCode::Enter));
        assert_eq!(KeybindingsConfig::parse_key("l"), Some(KeyCode::Char('l')));
        assert_eq!(KeybindingsConfig::parse_key("hyper"), None);

        let kb = KeybindingsConfig::default();
        assert!(kb.matches(KeyCode::Char(' '), &kb.toggle_play));
        assert!(!kb.matches(KeyCode::Char('x'), &kb.quit));
    }

    #[test]
    fn data_dir_override_relocates_everything() {
        let paths = AppPaths::resolve(Some(PathBuf::from("/srv/posters")));
        assert_eq!(paths.config_file, PathBuf::from("/srv/posters/config.toml"));
        assert_eq!(paths.thumbnail_dir(), PathBuf::from("/srv/posters/cache/thumbs"));
    }
}
