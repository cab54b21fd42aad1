//! # Storage Layer
//!
//! This module defines the storage abstraction for snipjar. The [`DataStore`]
//! trait is what the rest of the library talks to; [`backend::StorageBackend`]
//! is the raw I/O underneath it.
//!
//! ## Files Are the Database
//!
//! There is no index file. Each item is exactly one file in `items/`, and the
//! directory listing *is* the item list:
//!
//! - **Existence**: an item exists iff a content file with its id as stem exists.
//! - **Kind**: sniffed from the extension on every scan.
//! - **Thumbnail**: `thumbs/<id>_thumb.jpg`, derived and optional. Its presence
//!   or absence never decides whether an item exists.
//!
//! Only the backend knows this naming convention. Everything above it works
//! with [`ItemId`]s and [`Item`]s.
//!
//! ## Write Ordering
//!
//! Capturing an image writes the content file (atomically) first and asks for a
//! thumbnail second. If the process dies in between, the item is complete and
//! merely lacks a preview, which `doctor` can regenerate.
//!
//! Deleting removes the thumbnail first and the content second, so a failure
//! part-way leaves a whole item (possibly without a preview) rather than a
//! preview without an item. Missing files are never an error.
//!
//! ## Implementations
//!
//! - [`FileStore`]: production store over [`fs_backend::FsBackend`] with an
//!   external thumbnail tool.
//! - [`InMemoryStore`]: for testing logic without filesystem I/O.
//!
//! ## Storage Layout
//!
//! ```text
//! <data>/
//! ├── snipjar.toml          # Optional configuration
//! ├── items/
//! │   ├── <id>.md           # Text item
//! │   └── <id>.png          # Image item
//! └── thumbs/
//!     └── <id>_thumb.jpg    # Image thumbnail (optional)
//! ```

use crate::error::Result;
use crate::model::{Item, ItemId};
use crate::thumbnail::{ExternalThumbnailer, NoThumbnails};
use std::path::PathBuf;

pub mod backend;
pub mod fs_backend;
pub mod item_store;
pub mod mem_backend;

pub use item_store::ItemStore;

pub type FileStore = ItemStore<fs_backend::FsBackend, ExternalThumbnailer>;
pub type InMemoryStore = ItemStore<mem_backend::MemBackend, NoThumbnails>;

/// Report from the `doctor` operation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DoctorReport {
    /// Image items that had no thumbnail and now do, with the new path.
    pub regenerated_thumbnails: Vec<(ItemId, PathBuf)>,
    /// Image items still without a thumbnail after a regeneration attempt.
    pub failed_thumbnails: usize,
    pub removed_orphan_thumbnails: usize,
    pub removed_temp_files: usize,
}

impl DoctorReport {
    pub fn is_clean(&self) -> bool {
        self.regenerated_thumbnails.is_empty()
            && self.failed_thumbnails == 0
            && self.removed_orphan_thumbnails == 0
            && self.removed_temp_files == 0
    }
}

/// Abstract interface for item storage.
pub trait DataStore {
    /// Persist a text snippet as a new item.
    fn put_text(&mut self, content: &[u8]) -> Result<Item>;

    /// Persist an image snippet as a new item and try to thumbnail it.
    fn put_image(&mut self, content: &[u8]) -> Result<Item>;

    /// Remove an item and its thumbnail. Unknown ids succeed silently.
    fn delete(&mut self, id: &ItemId) -> Result<()>;

    /// Raw content bytes of an item.
    fn read(&self, id: &ItemId) -> Result<Vec<u8>>;

    /// Resolve a single item.
    fn get(&self, id: &ItemId) -> Result<Item>;

    /// All items, in file name order.
    fn list(&self) -> Result<Vec<Item>>;

    /// Repair derived state: thumbnails and temp files.
    fn doctor(&mut self) -> Result<DoctorReport>;
}
