//! # Item Catalog
//!
//! The catalog is the ordered, in-memory list of items that a UI shows. It is a
//! projection of the store, not a second source of truth.
//!
//! ## Three Ways In
//!
//! The view only changes through these operations:
//!
//! - [`Catalog::reload`]: throw everything away and rebuild from
//!   [`DataStore::list`] (file name order). Used at startup.
//! - [`Catalog::on_created`]: append one item. Items captured during a session
//!   therefore appear in capture order, after everything loaded at startup.
//! - [`Catalog::on_deleted`]: remove one item; unknown ids are a no-op.
//!
//! Plus one late update: [`Catalog::on_thumbnail_ready`] swaps the preview of an
//! existing entry once its thumbnail exists. It never adds an entry.
//!
//! ## Previews
//!
//! Every entry carries a [`Preview`]: the image to draw (thumbnail, falling back
//! to the full image) or a short text excerpt. An item whose text cannot be
//! read still gets an entry, with an empty excerpt.
//!
//! ## Listeners
//!
//! UIs [`subscribe`](Catalog::subscribe) to re-render. Each applied change emits
//! exactly one [`CatalogEvent`]; no-ops emit nothing.

use crate::error::Result;
use crate::model::{Item, ItemId, ItemKind};
use crate::store::DataStore;
use serde::Serialize;
use std::path::PathBuf;
use tracing::warn;

pub const DEFAULT_EXCERPT_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "type", content = "value")]
pub enum Preview {
    /// Truncated, single-line text.
    Excerpt(String),
    /// Image to draw, scaled by the UI.
    Image(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub item: Item,
    pub preview: Preview,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEvent {
    Reloaded,
    Created(ItemId),
    Deleted(ItemId),
    ThumbnailReady(ItemId),
}

type Listener = Box<dyn FnMut(&CatalogEvent)>;

pub struct Catalog {
    entries: Vec<CatalogEntry>,
    excerpt_chars: usize,
    listeners: Vec<Listener>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(DEFAULT_EXCERPT_CHARS)
    }
}

impl Catalog {
    pub fn new(excerpt_chars: usize) -> Self {
        Self {
            entries: Vec::new(),
            excerpt_chars,
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&CatalogEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.entries.iter().map(|e| &e.item)
    }

    pub fn get(&self, id: &ItemId) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| &e.item.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rebuild the view from the store. On error the current view is kept.
    pub fn reload<S: DataStore>(&mut self, store: &S) -> Result<()> {
        let items = store.list()?;
        self.entries = items
            .into_iter()
            .map(|item| self.entry_for(store, item))
            .collect();
        self.emit(CatalogEvent::Reloaded);
        Ok(())
    }

    /// Append a freshly created item. An id already in view is left alone.
    pub fn on_created<S: DataStore>(&mut self, store: &S, item: Item) -> bool {
        if self.get(&item.id).is_some() {
            warn!(id = %item.id, "item already in catalog");
            return false;
        }
        let id = item.id.clone();
        let entry = self.entry_for(store, item);
        self.entries.push(entry);
        self.emit(CatalogEvent::Created(id));
        true
    }

    /// Drop the entry for `id`, if present.
    pub fn on_deleted(&mut self, id: &ItemId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| &e.item.id != id);
        let removed = self.entries.len() != before;
        if removed {
            self.emit(CatalogEvent::Deleted(id.clone()));
        }
        removed
    }

    /// Attach a thumbnail that became available after the entry was created.
    pub fn on_thumbnail_ready(&mut self, id: &ItemId, thumbnail: PathBuf) -> bool {
        let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| &e.item.id == id && e.item.kind == ItemKind::Image)
        else {
            return false;
        };
        entry.preview = Preview::Image(thumbnail.clone());
        entry.item.thumbnail_path = Some(thumbnail);
        self.emit(CatalogEvent::ThumbnailReady(id.clone()));
        true
    }

    fn entry_for<S: DataStore>(&self, store: &S, item: Item) -> CatalogEntry {
        let preview = match item.preview_image() {
            Some(path) => Preview::Image(path.to_path_buf()),
            None => match store.read(&item.id) {
                Ok(bytes) => {
                    let text = String::from_utf8_lossy(&bytes);
                    Preview::Excerpt(excerpt(&text, self.excerpt_chars))
                }
                Err(e) => {
                    warn!(id = %item.id, error = %e, "could not read text item for preview");
                    Preview::Excerpt(String::new())
                }
            },
        };
        CatalogEntry { item, preview }
    }

    fn emit(&mut self, event: CatalogEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }
}

/// Single-line excerpt of at most `max_chars` characters, with `...` appended
/// when the text was cut.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", flat[..idx].trim_end()),
        None => flat,
    }
}
