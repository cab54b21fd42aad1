//! # Snipjar Architecture
//!
//! Snipjar keeps clipboard snippets, text and images, as plain files and hands
//! them back on demand. Like any UI-agnostic library, it is the library that
//! owns the behavior; the `snipjar` binary is one client of it.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Client (the snipjar CLI, or any UI)                        │
//! │  - Clipboard access, terminal I/O, exit codes               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Store first, then catalog                                │
//! │  - Id prefix resolution                                     │
//! └─────────────────────────────────────────────────────────────┘
//!                 │                              │
//!                 ▼                              ▼
//! ┌───────────────────────────────┐  ┌──────────────────────────┐
//! │  Storage Layer (store/)       │  │  Catalog (catalog.rs)    │
//! │  - DataStore trait            │  │  - Ordered view + events │
//! │  - FileStore, InMemoryStore   │  │  - Previews              │
//! └───────────────────────────────┘  └──────────────────────────┘
//!                 │
//!                 ▼
//! ┌───────────────────────────────┐
//! │  Thumbnails (thumbnail.rs)    │
//! │  - External tool, best effort │
//! └───────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! Code in this crate:
//! - Takes bytes and ids, returns [`model::Item`]s and `Result`s
//! - **Never** writes to stdout/stderr (diagnostics go through `tracing`)
//! - **Never** touches the system clipboard
//!
//! ## Testing Strategy
//!
//! - **Store and catalog**: unit tests over `MemBackend` with a recording
//!   thumbnailer, no filesystem involved.
//! - **Filesystem and thumbnail tool**: integration tests in `tests/` against
//!   temp directories.
//! - **CLI**: end-to-end tests in the `snipjar` crate.

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod identity;
pub mod init;
pub mod model;
pub mod store;
pub mod thumbnail;
