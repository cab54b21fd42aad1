use super::backend::{ContentEntry, StorageBackend};
use super::{DataStore, DoctorReport};
use crate::error::{Result, SnipError};
use crate::identity::new_id;
use crate::model::{Item, ItemId, ItemKind};
use crate::thumbnail::{ThumbnailOutcome, Thumbnailer};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub struct ItemStore<B: StorageBackend, T: Thumbnailer> {
    /// The underlying storage backend.
    /// Exposed as pub(crate) for testing and internal access only.
    pub(crate) backend: B,
    thumbnailer: T,
}

impl<B: StorageBackend, T: Thumbnailer> ItemStore<B, T> {
    pub fn new(backend: B, thumbnailer: T) -> Self {
        Self {
            backend,
            thumbnailer,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn thumbnailer(&self) -> &T {
        &self.thumbnailer
    }

    fn item_from_entry(&self, entry: ContentEntry) -> Item {
        let thumbnail_path = (entry.kind == ItemKind::Image
            && self.backend.thumbnail_exists(&entry.id))
        .then(|| self.backend.thumbnail_path(&entry.id));
        Item {
            id: entry.id,
            kind: entry.kind,
            content_path: entry.path,
            thumbnail_path,
            captured_at: entry.mtime,
        }
    }

    /// Ask the thumbnailer for a preview of `entry`. Failure only means "no thumbnail".
    fn make_thumbnail(&self, entry: &ContentEntry) -> Option<PathBuf> {
        let dest = self.backend.thumbnail_path(&entry.id);
        match self.thumbnailer.generate(&entry.path, &dest) {
            ThumbnailOutcome::Generated => Some(dest),
            ThumbnailOutcome::Unavailable(reason) => {
                warn!(id = %entry.id, %reason, "no thumbnail for image item");
                None
            }
        }
    }
}

impl<B: StorageBackend, T: Thumbnailer> DataStore for ItemStore<B, T> {
    fn put_text(&mut self, content: &[u8]) -> Result<Item> {
        let id = new_id();
        let entry = self.backend.write_content(&id, ItemKind::Text, content)?;
        debug!(%id, "text item captured");
        Ok(self.item_from_entry(entry))
    }

    fn put_image(&mut self, content: &[u8]) -> Result<Item> {
        let id = new_id();
        // 1. Content first: the item exists from here on
        let entry = self.backend.write_content(&id, ItemKind::Image, content)?;
        debug!(%id, "image item captured");

        // 2. Best-effort thumbnail
        let thumbnail_path = self.make_thumbnail(&entry);

        Ok(Item {
            id: entry.id,
            kind: entry.kind,
            content_path: entry.path,
            thumbnail_path,
            captured_at: entry.mtime,
        })
    }

    fn delete(&mut self, id: &ItemId) -> Result<()> {
        let had_thumbnail = self.backend.delete_thumbnail(id)?;
        let had_content = self.backend.delete_content(id)?;
        if !had_content {
            debug!(%id, had_thumbnail, "delete of absent item ignored");
        }
        Ok(())
    }

    fn read(&self, id: &ItemId) -> Result<Vec<u8>> {
        self.backend
            .read_content(id)?
            .ok_or_else(|| SnipError::ItemNotFound(id.clone()))
    }

    fn get(&self, id: &ItemId) -> Result<Item> {
        let entry = self
            .backend
            .find_content(id)?
            .ok_or_else(|| SnipError::ItemNotFound(id.clone()))?;
        Ok(self.item_from_entry(entry))
    }

    fn list(&self) -> Result<Vec<Item>> {
        Ok(self
            .backend
            .list_content()?
            .into_iter()
            .map(|entry| self.item_from_entry(entry))
            .collect())
    }

    fn doctor(&mut self) -> Result<DoctorReport> {
        let mut report = DoctorReport {
            removed_temp_files: self.backend.remove_temp_files()?,
            ..Default::default()
        };

        let entries = self.backend.list_content()?;
        let live: HashSet<&ItemId> = entries.iter().map(|e| &e.id).collect();

        // 1. Thumbnails whose item is gone
        for id in self.backend.list_thumbnail_ids()? {
            if !live.contains(&id) && self.backend.delete_thumbnail(&id)? {
                report.removed_orphan_thumbnails += 1;
            }
        }

        // 2. Image items missing their thumbnail
        for entry in entries.iter().filter(|e| e.kind == ItemKind::Image) {
            if self.backend.thumbnail_exists(&entry.id) {
                continue;
            }
            match self.make_thumbnail(entry) {
                Some(path) => report.regenerated_thumbnails.push((entry.id.clone(), path)),
                None => report.failed_thumbnails += 1,
            }
        }

        if !report.is_clean() {
            info!(
                regenerated = report.regenerated_thumbnails.len(),
                failed = report.failed_thumbnails,
                orphans = report.removed_orphan_thumbnails,
                temp_files = report.removed_temp_files,
                "store repaired"
            );
        }
        Ok(report)
    }
}
