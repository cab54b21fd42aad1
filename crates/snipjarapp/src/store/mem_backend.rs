use super::backend::{ContentEntry, StorageBackend};
use crate::error::{Result, SnipError};
use crate::model::{ItemId, ItemKind};
use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

#[derive(Clone)]
struct StoredContent {
    kind: ItemKind,
    bytes: Vec<u8>,
    mtime: DateTime<Utc>,
}

/// In-memory storage backend for testing.
///
/// Uses `RefCell` for interior mutability since the store has a single writer.
/// Paths are virtual (`/mem/items/<id>.<ext>`) and never touch the filesystem.
pub struct MemBackend {
    content: RefCell<BTreeMap<ItemId, StoredContent>>,
    thumbnails: RefCell<BTreeSet<ItemId>>,
    simulate_write_error: RefCell<bool>,
}

impl Default for MemBackend {
    fn default() -> Self {
        Self {
            content: RefCell::new(BTreeMap::new()),
            thumbnails: RefCell::new(BTreeSet::new()),
            simulate_write_error: RefCell::new(false),
        }
    }
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    /// Test helper standing in for a thumbnail tool writing its output.
    pub fn insert_thumbnail(&self, id: &ItemId) {
        self.thumbnails.borrow_mut().insert(id.clone());
    }

    /// Test helper standing in for a file dropped into `items/` by hand.
    pub fn insert_raw(&self, id: &ItemId, kind: ItemKind, bytes: &[u8]) {
        self.content.borrow_mut().insert(
            id.clone(),
            StoredContent {
                kind,
                bytes: bytes.to_vec(),
                mtime: Utc::now(),
            },
        );
    }

    fn virtual_path(id: &ItemId, kind: ItemKind) -> PathBuf {
        PathBuf::from(format!("/mem/items/{}.{}", id, kind.canonical_ext()))
    }

    fn entry(id: &ItemId, stored: &StoredContent) -> ContentEntry {
        ContentEntry {
            id: id.clone(),
            kind: stored.kind,
            path: Self::virtual_path(id, stored.kind),
            mtime: Some(stored.mtime),
        }
    }
}

impl StorageBackend for MemBackend {
    fn write_content(&self, id: &ItemId, kind: ItemKind, bytes: &[u8]) -> Result<ContentEntry> {
        if *self.simulate_write_error.borrow() {
            return Err(SnipError::Io(std::io::Error::other("Simulated write error")));
        }
        let stored = StoredContent {
            kind,
            bytes: bytes.to_vec(),
            mtime: Utc::now(),
        };
        let entry = Self::entry(id, &stored);
        self.content.borrow_mut().insert(id.clone(), stored);
        Ok(entry)
    }

    fn read_content(&self, id: &ItemId) -> Result<Option<Vec<u8>>> {
        Ok(self.content.borrow().get(id).map(|c| c.bytes.clone()))
    }

    fn delete_content(&self, id: &ItemId) -> Result<bool> {
        Ok(self.content.borrow_mut().remove(id).is_some())
    }

    fn find_content(&self, id: &ItemId) -> Result<Option<ContentEntry>> {
        Ok(self
            .content
            .borrow()
            .get(id)
            .map(|stored| Self::entry(id, stored)))
    }

    fn list_content(&self) -> Result<Vec<ContentEntry>> {
        let mut entries: Vec<ContentEntry> = self
            .content
            .borrow()
            .iter()
            .map(|(id, stored)| Self::entry(id, stored))
            .collect();
        entries.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
        Ok(entries)
    }

    fn thumbnail_path(&self, id: &ItemId) -> PathBuf {
        PathBuf::from(format!("/mem/thumbs/{}_thumb.jpg", id))
    }

    fn thumbnail_exists(&self, id: &ItemId) -> bool {
        self.thumbnails.borrow().contains(id)
    }

    fn delete_thumbnail(&self, id: &ItemId) -> Result<bool> {
        Ok(self.thumbnails.borrow_mut().remove(id))
    }

    fn list_thumbnail_ids(&self) -> Result<Vec<ItemId>> {
        Ok(self.thumbnails.borrow().iter().cloned().collect())
    }

    fn remove_temp_files(&self) -> Result<usize> {
        Ok(0)
    }
}
