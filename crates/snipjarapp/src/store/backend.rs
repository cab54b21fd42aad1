use crate::error::Result;
use crate::model::{ItemId, ItemKind};
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// One content file found in storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentEntry {
    pub id: ItemId,
    pub kind: ItemKind,
    pub path: PathBuf,
    pub mtime: Option<DateTime<Utc>>,
}

/// Abstract interface for raw storage I/O.
/// This trait handles the "how" of storage (filesystem vs memory) and owns the
/// filename convention, while ItemStore handles the "what" (capture, thumbnails,
/// idempotent delete, doctor).
pub trait StorageBackend {
    // --- Content Operations ---

    /// Write a new content file for `id` with the canonical extension of `kind`.
    /// MUST be atomic (e.g. write to tmp then rename) so a failed write leaves
    /// no visible file.
    fn write_content(&self, id: &ItemId, kind: ItemKind, content: &[u8]) -> Result<ContentEntry>;

    /// Read raw content bytes.
    /// Returns Ok(None) if no content file carries this id.
    fn read_content(&self, id: &ItemId) -> Result<Option<Vec<u8>>>;

    /// Remove every content file carrying this id.
    /// Returns Ok(false) when there was nothing to remove.
    fn delete_content(&self, id: &ItemId) -> Result<bool>;

    /// Locate the content file for an id.
    fn find_content(&self, id: &ItemId) -> Result<Option<ContentEntry>>;

    /// All content files, sorted by file name.
    fn list_content(&self) -> Result<Vec<ContentEntry>>;

    // --- Thumbnail Operations ---

    /// Where the thumbnail for `id` lives (whether or not it exists).
    fn thumbnail_path(&self, id: &ItemId) -> PathBuf;

    fn thumbnail_exists(&self, id: &ItemId) -> bool;

    /// Returns Ok(false) when there was nothing to remove.
    fn delete_thumbnail(&self, id: &ItemId) -> Result<bool>;

    /// Ids of every thumbnail present, including ones whose item is gone.
    fn list_thumbnail_ids(&self) -> Result<Vec<ItemId>>;

    // --- Maintenance ---

    /// Remove temp files left behind by interrupted writes. Returns the count.
    fn remove_temp_files(&self) -> Result<usize>;
}
