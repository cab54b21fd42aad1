//! # Snipjar CLI
//!
//! The binary is intentionally thin: the CLI lives in `src/cli/`, clipboard
//! access in `src/clipboard.rs`, and this file only invokes `cli::run()` and
//! handles process termination.
//!
//! ## Workspace Structure
//!
//! - `crates/snipjarapp/`: the library. Store, thumbnails, catalog, config.
//! - `crates/snipjar/`: this CLI, one client of the library.
//!
//! ## Layering
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/snipjar/src/cli/)                        │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - Logging setup + dispatch (commands.rs)                   │
//! │  - Terminal rendering (render.rs)                           │
//! │  - System clipboard via platform tools (clipboard.rs)       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (crates/snipjarapp/src/api.rs)                   │
//! │  - Resolves id prefixes                                     │
//! │  - Keeps store and catalog in step                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything from `api.rs` inward is UI agnostic. The CLI owns every
//! user-facing concern: arguments, stdin, the clipboard, stdout and exit codes.

mod cli;
mod clipboard;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
