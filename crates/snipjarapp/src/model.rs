//! # Domain Model: Items and Their Files
//!
//! An [`Item`] is one captured snippet. It has no record anywhere except the
//! file that holds its content: the filename stem is the item's [`ItemId`] and
//! the extension decides its [`ItemKind`].
//!
//! ```text
//! items/
//!   3f2a...e1.md        # Text item
//!   9bc0...4d.png       # Image item
//! thumbs/
//!   9bc0...4d_thumb.jpg # Optional preview of the image item
//! ```
//!
//! ## Kind Classification
//!
//! Kinds are never persisted. They are sniffed from the extension every time
//! the directory is scanned:
//!
//! - `.png`, `.jpg`, `.jpeg`, `.bmp` (any case) → [`ItemKind::Image`]
//! - anything else, including no extension → [`ItemKind::Text`]
//!
//! New items always use the canonical extension of their kind (`.md` or `.png`).
//!
//! ## Thumbnails Are Derived
//!
//! `thumbnail_path` is a best-effort artifact. An image item without a thumbnail
//! is still a complete item; the UI previews the full image instead
//! (see [`Item::preview_image`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Opaque identifier of an item, embedded in its filenames.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 8 characters, for display.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }

    /// Whether this id can name a file inside the store directories.
    ///
    /// Rejects empty ids, hidden names and anything with a path separator, so
    /// a user-supplied id can never address a file outside `items/`.
    pub fn is_well_formed(&self) -> bool {
        !self.0.is_empty()
            && !self.0.starts_with('.')
            && !self.0.contains(['/', '\\'])
            && self.0 != ".."
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Text,
    Image,
}

impl ItemKind {
    /// Extensions that mark a content file as an image.
    pub const IMAGE_EXTENSIONS: [&'static str; 4] = ["png", "jpg", "jpeg", "bmp"];

    /// Classify a content file by its extension.
    pub fn from_path(path: &Path) -> Self {
        let is_image = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                Self::IMAGE_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            });
        if is_image {
            ItemKind::Image
        } else {
            ItemKind::Text
        }
    }

    /// Extension (without dot) used for newly captured items of this kind.
    pub fn canonical_ext(self) -> &'static str {
        match self {
            ItemKind::Text => "md",
            ItemKind::Image => "png",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ItemKind::Text => "text",
            ItemKind::Image => "image",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub id: ItemId,
    pub kind: ItemKind,
    pub content_path: PathBuf,
    pub thumbnail_path: Option<PathBuf>,
    /// Modification time of the content file, when the backend knows it.
    pub captured_at: Option<DateTime<Utc>>,
}

impl Item {
    pub fn is_image(&self) -> bool {
        self.kind == ItemKind::Image
    }

    /// The image to show for this item: its thumbnail, or the full image when
    /// no thumbnail exists. `None` for text items.
    pub fn preview_image(&self) -> Option<&Path> {
        match self.kind {
            ItemKind::Text => None,
            ItemKind::Image => Some(
                self.thumbnail_path
                    .as_deref()
                    .unwrap_or(self.content_path.as_path()),
            ),
        }
    }
}
