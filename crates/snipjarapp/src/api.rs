//! # API Facade
//!
//! The API layer is the single entry point for snipjar operations, whatever UI
//! sits on top. It keeps the store and the catalog in step: every mutation goes
//! to the store first and is then reflected into the catalog, so a UI holding
//! the API never sees an item the store does not have.
//!
//! ## What the API Does NOT Do
//!
//! - **I/O to the user**: no stdout, stderr or prompts
//! - **Clipboard access**: callers hand in bytes, the API stores them
//! - **Formatting**: returns [`Item`]s and [`CatalogEntry`]s, not strings
//!
//! ## Id Prefixes
//!
//! Ids are 32 hex characters, which nobody wants to type. [`SnipApi::resolve_id`]
//! accepts any unique prefix, the way git accepts short hashes.
//!
//! ## Generic Over DataStore
//!
//! `SnipApi<S: DataStore>` is generic over the storage backend:
//! - Production: `SnipApi<FileStore>`
//! - Testing: `SnipApi<InMemoryStore>`

use crate::catalog::{Catalog, CatalogEntry, CatalogEvent};
use crate::error::{Result, SnipError};
use crate::model::{Item, ItemId};
use crate::store::{DataStore, DoctorReport};
use std::path::PathBuf;
use tracing::info;

/// Where a store lives on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnipPaths {
    pub data_dir: PathBuf,
    pub items_dir: PathBuf,
    pub thumbs_dir: PathBuf,
}

pub struct SnipApi<S: DataStore> {
    store: S,
    catalog: Catalog,
    paths: SnipPaths,
}

impl<S: DataStore> SnipApi<S> {
    /// Wrap a store and load the catalog from it.
    pub fn new(store: S, catalog: Catalog, paths: SnipPaths) -> Result<Self> {
        let mut api = Self {
            store,
            catalog,
            paths,
        };
        api.reload()?;
        Ok(api)
    }

    pub fn capture_text(&mut self, text: &str) -> Result<Item> {
        let item = self.store.put_text(text.as_bytes())?;
        info!(id = %item.id, chars = text.chars().count(), "captured text");
        self.catalog.on_created(&self.store, item.clone());
        Ok(item)
    }

    pub fn capture_image(&mut self, bytes: &[u8]) -> Result<Item> {
        let item = self.store.put_image(bytes)?;
        info!(
            id = %item.id,
            bytes = bytes.len(),
            thumbnail = item.thumbnail_path.is_some(),
            "captured image"
        );
        self.catalog.on_created(&self.store, item.clone());
        Ok(item)
    }

    pub fn delete_item(&mut self, id: &ItemId) -> Result<()> {
        self.store.delete(id)?;
        if self.catalog.on_deleted(id) {
            info!(%id, "deleted item");
        }
        Ok(())
    }

    pub fn read_content(&self, id: &ItemId) -> Result<Vec<u8>> {
        self.store.read(id)
    }

    pub fn get_item(&self, id: &ItemId) -> Result<Item> {
        self.store.get(id)
    }

    /// Items in catalog order.
    pub fn list_items(&self) -> Vec<Item> {
        self.catalog.items().cloned().collect()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        self.catalog.entries()
    }

    /// Turn a full id or a unique id prefix into the id of an existing item.
    pub fn resolve_id(&self, input: &str) -> Result<ItemId> {
        let input = input.trim();
        let items = self.store.list()?;
        if let Some(exact) = items.iter().find(|item| item.id.as_str() == input) {
            return Ok(exact.id.clone());
        }
        if input.is_empty() {
            return Err(SnipError::ItemNotFound(ItemId::from(input)));
        }

        let mut matches: Vec<ItemId> = items
            .into_iter()
            .filter(|item| item.id.as_str().starts_with(input))
            .map(|item| item.id)
            .collect();
        matches.dedup();
        match matches.len() {
            0 => Err(SnipError::ItemNotFound(ItemId::from(input))),
            1 => Ok(matches.remove(0)),
            n => Err(SnipError::AmbiguousId(input.to_string(), n)),
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&CatalogEvent) + 'static) {
        self.catalog.subscribe(listener);
    }

    /// Rebuild the catalog from the store.
    pub fn reload(&mut self) -> Result<()> {
        self.catalog.reload(&self.store)
    }

    /// Repair the store and show regenerated thumbnails in the catalog.
    pub fn doctor(&mut self) -> Result<DoctorReport> {
        let report = self.store.doctor()?;
        for (id, path) in &report.regenerated_thumbnails {
            self.catalog.on_thumbnail_ready(id, path.clone());
        }
        Ok(report)
    }

    pub fn paths(&self) -> &SnipPaths {
        &self.paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Preview;
    use crate::model::ItemKind;
    use crate::store::mem_backend::MemBackend;
    use crate::store::{InMemoryStore, ItemStore};
    use crate::thumbnail::tests::MockThumbnailer;
    use crate::thumbnail::NoThumbnails;

    fn paths() -> SnipPaths {
        SnipPaths {
            data_dir: PathBuf::from("/mem"),
            items_dir: PathBuf::from("/mem/items"),
            thumbs_dir: PathBuf::from("/mem/thumbs"),
        }
    }

    fn api() -> SnipApi<InMemoryStore> {
        SnipApi::new(
            ItemStore::new(MemBackend::new(), NoThumbnails),
            Catalog::default(),
            paths(),
        )
        .unwrap()
    }

    fn seeded(ids: &[&str]) -> SnipApi<InMemoryStore> {
        let backend = MemBackend::new();
        for id in ids {
            backend.insert_raw(&ItemId::from(*id), ItemKind::Text, id.as_bytes());
        }
        SnipApi::new(
            ItemStore::new(backend, NoThumbnails),
            Catalog::default(),
            paths(),
        )
        .unwrap()
    }

    #[test]
    fn new_loads_existing_items() {
        let api = seeded(&["b", "a"]);
        let ids: Vec<String> = api.list_items().iter().map(|i| i.id.to_string()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn capture_text_appends_to_catalog() {
        let mut api = seeded(&["zzz"]);
        let item = api.capture_text("fresh").unwrap();

        let items = api.list_items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].id, item.id);
        assert_eq!(api.entries()[1].preview, Preview::Excerpt("fresh".into()));
    }

    #[test]
    fn capture_image_appends_with_image_preview() {
        let mut api = api();
        let item = api.capture_image(b"\x89PNG").unwrap();

        assert_eq!(item.kind, ItemKind::Image);
        assert_eq!(
            api.entries()[0].preview,
            Preview::Image(item.content_path.clone())
        );
    }

    #[test]
    fn delete_removes_from_store_and_catalog() {
        let mut api = api();
        let item = api.capture_text("gone soon").unwrap();

        api.delete_item(&item.id).unwrap();
        api.delete_item(&item.id).unwrap();

        assert!(api.list_items().is_empty());
        assert!(matches!(
            api.read_content(&item.id),
            Err(SnipError::ItemNotFound(_))
        ));
    }

    #[test]
    fn failed_capture_leaves_catalog_untouched() {
        let backend = MemBackend::new();
        backend.set_simulate_write_error(true);
        let mut api = SnipApi::new(
            ItemStore::new(backend, NoThumbnails),
            Catalog::default(),
            paths(),
        )
        .unwrap();

        assert!(api.capture_text("nope").is_err());
        assert!(api.entries().is_empty());
    }

    #[test]
    fn resolve_id_accepts_unique_prefix() {
        let api = seeded(&["abc123", "abd456", "ffff"]);

        assert_eq!(api.resolve_id("ff").unwrap(), ItemId::from("ffff"));
        assert_eq!(api.resolve_id("abc").unwrap(), ItemId::from("abc123"));
        assert_eq!(api.resolve_id("abd456").unwrap(), ItemId::from("abd456"));
    }

    #[test]
    fn resolve_id_reports_ambiguous_and_missing() {
        let api = seeded(&["abc123", "abd456"]);

        assert!(matches!(
            api.resolve_id("ab"),
            Err(SnipError::AmbiguousId(_, 2))
        ));
        assert!(matches!(
            api.resolve_id("x"),
            Err(SnipError::ItemNotFound(_))
        ));
        assert!(matches!(
            api.resolve_id(""),
            Err(SnipError::ItemNotFound(_))
        ));
    }

    #[test]
    fn doctor_updates_catalog_previews() {
        let backend = MemBackend::new();
        let id = ItemId::from("img");
        backend.insert_raw(&id, ItemKind::Image, b"img");
        let mut api = SnipApi::new(
            ItemStore::new(backend, MockThumbnailer::succeeding()),
            Catalog::default(),
            paths(),
        )
        .unwrap();
        assert_eq!(
            api.entries()[0].preview,
            Preview::Image(PathBuf::from("/mem/items/img.png"))
        );

        let report = api.doctor().unwrap();

        assert_eq!(report.regenerated_thumbnails.len(), 1);
        assert_eq!(
            api.entries()[0].preview,
            Preview::Image(PathBuf::from("/mem/thumbs/img_thumb.jpg"))
        );
    }

    #[test]
    fn subscribers_see_captures() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let mut api = api();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        api.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        let item = api.capture_text("hi").unwrap();

        assert_eq!(*seen.borrow(), vec![CatalogEvent::Created(item.id)]);
    }
}
