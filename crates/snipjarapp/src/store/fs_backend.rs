use super::backend::{ContentEntry, StorageBackend};
use crate::error::{Result, SnipError};
use crate::model::{ItemId, ItemKind};
use chrono::{DateTime, Utc};
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Suffix appended to an item id to name its thumbnail.
pub const THUMB_SUFFIX: &str = "_thumb.jpg";

pub struct FsBackend {
    items_dir: PathBuf,
    thumbs_dir: PathBuf,
}

impl FsBackend {
    pub fn new(items_dir: PathBuf, thumbs_dir: PathBuf) -> Self {
        Self {
            items_dir,
            thumbs_dir,
        }
    }

    pub fn items_dir(&self) -> &Path {
        &self.items_dir
    }

    pub fn thumbs_dir(&self) -> &Path {
        &self.thumbs_dir
    }

    /// Create both store directories if they are missing.
    pub fn ensure_dirs(&self) -> Result<()> {
        ensure_dir(&self.items_dir)?;
        ensure_dir(&self.thumbs_dir)
    }

    fn content_filename(id: &ItemId, kind: ItemKind) -> String {
        format!("{}.{}", id, kind.canonical_ext())
    }

    /// Content files whose stem is exactly `id`, sorted by name.
    fn matching_content_files(&self, id: &ItemId) -> Result<Vec<PathBuf>> {
        if !id.is_well_formed() {
            return Ok(Vec::new());
        }
        Ok(self
            .scan_items()?
            .into_iter()
            .filter(|(stem, _)| stem == id.as_str())
            .map(|(_, path)| path)
            .collect())
    }

    /// Every visible regular file in `items/` as (stem, path), sorted by file name.
    fn scan_items(&self) -> Result<Vec<(String, PathBuf)>> {
        let mut found = Vec::new();
        for path in visible_files(&self.items_dir)? {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                warn!(path = %path.display(), "skipping item with non UTF-8 name");
                continue;
            };
            found.push((stem.to_string(), path.clone()));
        }
        found.sort_by(|a, b| a.1.file_name().cmp(&b.1.file_name()));
        Ok(found)
    }

    fn entry_for(id: ItemId, path: PathBuf) -> ContentEntry {
        ContentEntry {
            id,
            kind: ItemKind::from_path(&path),
            mtime: file_mtime(&path),
            path,
        }
    }
}

impl StorageBackend for FsBackend {
    fn write_content(&self, id: &ItemId, kind: ItemKind, content: &[u8]) -> Result<ContentEntry> {
        if !id.is_well_formed() {
            return Err(SnipError::Store(format!("Invalid item id: {:?}", id.as_str())));
        }
        ensure_dir(&self.items_dir)?;

        let target_path = self.items_dir.join(Self::content_filename(id, kind));

        // Atomic Write
        let tmp_path = self.items_dir.join(format!(".item-{}.tmp", Uuid::new_v4()));
        if let Err(e) = write_synced(&tmp_path, content) {
            let _ = fs::remove_file(&tmp_path);
            return Err(SnipError::Io(e));
        }
        if let Err(e) = fs::rename(&tmp_path, &target_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(SnipError::Io(e));
        }
        debug!(path = %target_path.display(), bytes = content.len(), "content written");

        Ok(Self::entry_for(id.clone(), target_path))
    }

    fn read_content(&self, id: &ItemId) -> Result<Option<Vec<u8>>> {
        match self.find_content(id)? {
            Some(entry) => match fs::read(&entry.path) {
                Ok(bytes) => Ok(Some(bytes)),
                // Deleted between the scan and the read
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(e) => Err(SnipError::Io(e)),
            },
            None => Ok(None),
        }
    }

    fn delete_content(&self, id: &ItemId) -> Result<bool> {
        let mut removed = false;
        for path in self.matching_content_files(id)? {
            if remove_if_present(&path)? {
                debug!(path = %path.display(), "content removed");
                removed = true;
            }
        }
        Ok(removed)
    }

    fn find_content(&self, id: &ItemId) -> Result<Option<ContentEntry>> {
        let files = self.matching_content_files(id)?;
        // Prefer the canonical filenames when several files share a stem
        let preferred = [ItemKind::Text, ItemKind::Image]
            .iter()
            .map(|kind| self.items_dir.join(Self::content_filename(id, *kind)))
            .find(|candidate| files.contains(candidate));
        let path = preferred.or_else(|| files.into_iter().next());
        Ok(path.map(|p| Self::entry_for(id.clone(), p)))
    }

    fn list_content(&self) -> Result<Vec<ContentEntry>> {
        let found = self.scan_items()?;
        for stem in shared_stems(&found) {
            warn!(
                id = %stem,
                "several content files share this id; reads and copies use the text file"
            );
        }
        Ok(found
            .into_iter()
            .map(|(stem, path)| Self::entry_for(ItemId::new(stem), path))
            .collect())
    }

    fn thumbnail_path(&self, id: &ItemId) -> PathBuf {
        self.thumbs_dir.join(format!("{}{}", id, THUMB_SUFFIX))
    }

    fn thumbnail_exists(&self, id: &ItemId) -> bool {
        id.is_well_formed() && self.thumbnail_path(id).is_file()
    }

    fn delete_thumbnail(&self, id: &ItemId) -> Result<bool> {
        if !id.is_well_formed() {
            return Ok(false);
        }
        let path = self.thumbnail_path(id);
        let removed = remove_if_present(&path)?;
        if removed {
            debug!(path = %path.display(), "thumbnail removed");
        }
        Ok(removed)
    }

    fn list_thumbnail_ids(&self) -> Result<Vec<ItemId>> {
        let mut ids: Vec<ItemId> = visible_files(&self.thumbs_dir)?
            .iter()
            .filter_map(|path| path.file_name().and_then(|n| n.to_str()))
            .filter_map(|name| name.strip_suffix(THUMB_SUFFIX))
            .filter(|stem| !stem.is_empty())
            .map(ItemId::from)
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn remove_temp_files(&self) -> Result<usize> {
        let mut removed = 0;
        for dir in [&self.items_dir, &self.thumbs_dir] {
            if !dir.exists() {
                continue;
            }
            for entry in fs::read_dir(dir)? {
                let path = entry?.path();
                let is_temp = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(is_temp_name);
                if is_temp && path.is_file() && remove_if_present(&path)? {
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }
}

/// Stems carried by more than one content file, in order, each once.
fn shared_stems(found: &[(String, PathBuf)]) -> Vec<&str> {
    let mut shared: Vec<&str> = Vec::new();
    for (i, (stem, _)) in found.iter().enumerate() {
        let repeated = found[i + 1..].iter().any(|(other, _)| other == stem);
        if repeated && !shared.contains(&stem.as_str()) {
            shared.push(stem);
        }
    }
    shared
}

/// Temp files are hidden and carry a `.tmp` marker: `.item-<uuid>.tmp`,
/// `.<uuid>.tmp.jpg`.
fn is_temp_name(name: &str) -> bool {
    name.starts_with('.') && name.contains(".tmp")
}

fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(SnipError::Io)?;
    }
    Ok(())
}

fn write_synced(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content)?;
    file.sync_all()
}

/// Remove a file, treating "already gone" as success. Returns whether a file
/// was actually removed.
fn remove_if_present(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(SnipError::Io(e)),
    }
}

/// Regular files in `dir` whose names do not start with a dot.
/// A missing directory has no files.
fn visible_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let hidden = path
            .file_name()
            .map(|n| n.to_string_lossy().starts_with('.'))
            .unwrap_or(true);
        if !hidden && path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}

fn file_mtime(path: &Path) -> Option<DateTime<Utc>> {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .ok()
        .map(DateTime::<Utc>::from)
}
