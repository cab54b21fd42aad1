//! # Configuration
//!
//! Snipjar configuration is managed by [`clapfig`], which handles layered loading
//! from TOML files and compiled defaults.
//!
//! ## Storage Hierarchy
//!
//! Configuration is resolved in priority order:
//! 1. **Data Dir Config**: `<data>/snipjar.toml`, next to the items it describes.
//! 2. **Global Config**: OS-appropriate config directory (via `directories` crate).
//! 3. **Compiled Defaults**: Built-in fallbacks via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `items_dir` | `<data>/items` | Where content files live |
//! | `thumbs_dir` | `<data>/thumbs` | Where thumbnails live |
//! | `thumbnail_program` | `ffmpeg` | Thumbnail tool; empty disables thumbnails |
//! | `thumbnail_width` | `160` | Thumbnail width in pixels, aspect preserved |
//! | `thumbnail_timeout_secs` | `10` | Kill the tool after this long |
//! | `excerpt_chars` | `50` | Length of text previews |
//!
//! Relative directories are resolved against the data directory.

use crate::catalog::DEFAULT_EXCERPT_CHARS;
use crate::thumbnail;
use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for snipjar, stored in `snipjar.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SnipConfig {
    /// Directory holding item content files.
    pub items_dir: Option<PathBuf>,

    /// Directory holding thumbnails.
    pub thumbs_dir: Option<PathBuf>,

    /// Program used to render thumbnails. Empty disables thumbnailing.
    #[config(default = "ffmpeg")]
    pub thumbnail_program: String,

    #[config(default = 160)]
    pub thumbnail_width: u32,

    #[config(default = 10)]
    pub thumbnail_timeout_secs: u64,

    /// Characters kept in a text preview.
    #[config(default = 50)]
    pub excerpt_chars: usize,
}

impl Default for SnipConfig {
    fn default() -> Self {
        Self {
            items_dir: None,
            thumbs_dir: None,
            thumbnail_program: thumbnail::DEFAULT_PROGRAM.to_string(),
            thumbnail_width: thumbnail::DEFAULT_WIDTH,
            thumbnail_timeout_secs: thumbnail::DEFAULT_TIMEOUT.as_secs(),
            excerpt_chars: DEFAULT_EXCERPT_CHARS,
        }
    }
}

impl SnipConfig {
    pub fn items_dir(&self, data_dir: &Path) -> PathBuf {
        resolve(data_dir, self.items_dir.as_deref(), "items")
    }

    pub fn thumbs_dir(&self, data_dir: &Path) -> PathBuf {
        resolve(data_dir, self.thumbs_dir.as_deref(), "thumbs")
    }

    pub fn thumbnail_timeout(&self) -> Duration {
        Duration::from_secs(self.thumbnail_timeout_secs)
    }

    /// Effective settings as `(key, value)` pairs, for display.
    pub fn entries(&self, data_dir: &Path) -> Vec<(&'static str, String)> {
        vec![
            ("items_dir", self.items_dir(data_dir).display().to_string()),
            ("thumbs_dir", self.thumbs_dir(data_dir).display().to_string()),
            ("thumbnail_program", self.thumbnail_program.clone()),
            ("thumbnail_width", self.thumbnail_width.to_string()),
            (
                "thumbnail_timeout_secs",
                self.thumbnail_timeout_secs.to_string(),
            ),
            ("excerpt_chars", self.excerpt_chars.to_string()),
        ]
    }
}

fn resolve(data_dir: &Path, configured: Option<&Path>, default: &str) -> PathBuf {
    match configured {
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) => data_dir.join(path),
        None => data_dir.join(default),
    }
}
