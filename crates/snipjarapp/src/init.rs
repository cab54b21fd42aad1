//! # Where the Jar Lives
//!
//! A snipjar store is one directory, the data directory, holding `items/`,
//! `thumbs/` and an optional `snipjar.toml`.
//!
//! ## Data Directory Resolution
//!
//! [`data_dir`] picks the first of:
//! 1. The explicit override (the CLI's `--data` flag).
//! 2. The `SNIPJAR_DATA` environment variable.
//! 3. The OS-appropriate data directory (via the `directories` crate).
//!
//! ## Config Resolution
//!
//! [`initialize`] loads [`SnipConfig`] with clapfig from, in increasing priority,
//! the global config directory and the data directory. The global directory can
//! be moved with `SNIPJAR_CONFIG_DIR`, which keeps tests away from the user's
//! real configuration. Environment variables of the form
//! `SNIPJAR__THUMBNAIL_PROGRAM` override both files.

use crate::api::{SnipApi, SnipPaths};
use crate::catalog::Catalog;
use crate::config::SnipConfig;
use crate::error::{Result, SnipError};
use crate::store::fs_backend::FsBackend;
use crate::store::{FileStore, ItemStore};
use crate::thumbnail::ExternalThumbnailer;
use clapfig::{Clapfig, SearchMode, SearchPath};
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing::{debug, warn};

pub const APP_NAME: &str = "snipjar";
pub const CONFIG_FILE: &str = "snipjar.toml";
pub const DATA_ENV: &str = "SNIPJAR_DATA";
pub const CONFIG_DIR_ENV: &str = "SNIPJAR_CONFIG_DIR";

pub struct SnipContext {
    pub api: SnipApi<FileStore>,
    pub config: SnipConfig,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", APP_NAME, APP_NAME)
}

/// Resolve the data directory. Fails only when no override is given and the OS
/// has no notion of a home directory.
pub fn data_dir(data_override: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = data_override {
        return Ok(path);
    }
    if let Some(path) = std::env::var_os(DATA_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| SnipError::Config("Could not determine a data directory".to_string()))
}

/// Global config directory, if any.
pub fn global_config_dir() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(path));
    }
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

/// Config search paths, lowest priority first.
pub fn config_search_paths(data_dir: &std::path::Path) -> Vec<SearchPath> {
    let mut paths = Vec::new();
    if let Some(global) = global_config_dir() {
        paths.push(SearchPath::Path(global));
    }
    paths.push(SearchPath::Path(data_dir.to_path_buf()));
    paths
}

pub fn load_config(data_dir: &std::path::Path) -> SnipConfig {
    Clapfig::builder::<SnipConfig>()
        .app_name(APP_NAME)
        .file_name(CONFIG_FILE)
        .search_paths(config_search_paths(data_dir))
        .search_mode(SearchMode::Merge)
        .load()
        .unwrap_or_else(|e| {
            warn!(error = %e, "could not load configuration, using defaults");
            SnipConfig::default()
        })
}

/// Resolve paths, load config, create the store directories and load the catalog.
pub fn initialize(data_override: Option<PathBuf>) -> Result<SnipContext> {
    let data_dir = data_dir(data_override)?;
    let config = load_config(&data_dir);

    let paths = SnipPaths {
        items_dir: config.items_dir(&data_dir),
        thumbs_dir: config.thumbs_dir(&data_dir),
        data_dir,
    };
    debug!(
        data = %paths.data_dir.display(),
        items = %paths.items_dir.display(),
        thumbs = %paths.thumbs_dir.display(),
        "store location"
    );

    let backend = FsBackend::new(paths.items_dir.clone(), paths.thumbs_dir.clone());
    backend.ensure_dirs()?;
    let thumbnailer = ExternalThumbnailer::new(&config.thumbnail_program)
        .with_width(config.thumbnail_width)
        .with_timeout(config.thumbnail_timeout());

    let store = ItemStore::new(backend, thumbnailer);
    let api = SnipApi::new(store, Catalog::new(config.excerpt_chars), paths)?;

    Ok(SnipContext { api, config })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_data_override_wins() {
        let temp = TempDir::new().unwrap();
        let dir = data_dir(Some(temp.path().to_path_buf())).unwrap();
        assert_eq!(dir, temp.path());
    }

    #[test]
    fn test_initialize_creates_store_dirs() {
        let temp = TempDir::new().unwrap();
        let data = temp.path().join("jar");

        let ctx = initialize(Some(data.clone())).unwrap();

        assert_eq!(ctx.api.paths().data_dir, data);
        assert!(data.join("items").is_dir());
        assert!(data.join("thumbs").is_dir());
        assert!(ctx.api.list_items().is_empty());
    }

    #[test]
    fn test_initialize_reads_config_from_data_dir() {
        let temp = TempDir::new().unwrap();
        let data = temp.path().to_path_buf();
        fs::write(
            data.join(CONFIG_FILE),
            "items_dir = \"clips\"\nexcerpt_chars = 5\nthumbnail_program = \"\"\n",
        )
        .unwrap();

        let ctx = initialize(Some(data.clone())).unwrap();

        assert_eq!(ctx.config.excerpt_chars, 5);
        assert_eq!(ctx.config.thumbnail_program, "");
        assert_eq!(ctx.api.paths().items_dir, data.join("clips"));
        assert!(data.join("clips").is_dir());
    }

    #[test]
    fn test_initialize_loads_existing_items() {
        let temp = TempDir::new().unwrap();
        let items = temp.path().join("items");
        fs::create_dir_all(&items).unwrap();
        fs::write(items.join("one.md"), "first").unwrap();
        fs::write(items.join("two.png"), b"\x89PNG").unwrap();

        let ctx = initialize(Some(temp.path().to_path_buf())).unwrap();

        let ids: Vec<String> = ctx
            .api
            .list_items()
            .iter()
            .map(|i| i.id.to_string())
            .collect();
        assert_eq!(ids, vec!["one", "two"]);
    }
}
