//! # CLI Behavior
//!
//! This is **one possible UI client** for snipjar, not the application itself.
//!
//! ## Naked Execution (`snipjar`)
//!
//! Running `snipjar` with no arguments lists the jar.
//!
//! ## Smart Add (`snipjar add`)
//!
//! Priority order for content source:
//!
//! 1. **Argument**: `snipjar add "some text"`
//! 2. **Piped Input**: `echo foo | snipjar add`
//! 3. **Clipboard**: `snipjar add` with nothing piped. Text is preferred; if the
//!    clipboard holds no text, an image on it is captured instead.
//!
//! Blank text is never stored.
//!
//! ## Ids
//!
//! Every command taking an id accepts any unique prefix of it, as shown by
//! `snipjar list`.
//!
//! ## Module Structure
//!
//! - `commands`: logging setup, context creation, per-command handlers
//! - `render`: output formatting
//! - `setup`: argument parsing via clap

mod commands;
mod render;
pub mod setup;

pub use commands::run;
