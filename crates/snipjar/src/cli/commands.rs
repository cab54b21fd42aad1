//! # CLI Layer
//!
//! The only place in snipjar that:
//! - Knows about terminal I/O (stdin, stdout, stderr)
//! - Talks to the system clipboard
//! - Installs a log subscriber
//!
//! ## Responsibilities
//!
//! 1. **Argument Parsing**: clap, see `setup.rs`
//! 2. **Logging**: `tracing-subscriber` filtered by `SNIPJAR_LOG`, to stderr
//! 3. **Context Setup**: [`initialize`] resolves the data dir and loads config
//! 4. **Dispatch**: one small handler per command, each a thin call into the API
//! 5. **Output**: strings built in `render.rs`

use super::render;
use super::setup::{Cli, Commands};
use crate::clipboard;
use anyhow::{bail, Context, Result};
use clap::Parser;
use console::Term;
use snipjarapp::api::SnipApi;
use snipjarapp::config::SnipConfig;
use snipjarapp::error::SnipError;
use snipjarapp::init::{initialize, SnipContext};
use snipjarapp::model::{Item, ItemKind};
use snipjarapp::store::FileStore;
use std::io::{IsTerminal, Read};
use std::path::Path;
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "SNIPJAR_LOG";

type Api = SnipApi<FileStore>;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let SnipContext { mut api, config } = initialize(cli.data.clone())?;
    debug!(command = ?cli.command, "dispatching");

    match cli.command {
        None => handle_list(&api, false),
        Some(Commands::Add { text }) => handle_add(&mut api, text),
        Some(Commands::AddImage { path }) => handle_add_image(&mut api, &path),
        Some(Commands::PasteImage) => handle_paste_image(&mut api),
        Some(Commands::List { json }) => handle_list(&api, json),
        Some(Commands::View { id }) => handle_view(&api, &id),
        Some(Commands::Copy { id }) => handle_copy(&api, &id),
        Some(Commands::Delete { ids }) => handle_delete(&mut api, &ids),
        Some(Commands::Doctor) => handle_doctor(&mut api),
        Some(Commands::Paths) => {
            print!("{}", render::render_paths(api.paths()));
            Ok(())
        }
        Some(Commands::Config { key }) => handle_config(&api, &config, key.as_deref()),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // A subscriber may already be installed when embedded in tests
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Where `add` takes its content from.
#[derive(Debug, PartialEq, Eq)]
enum AddSource {
    Text(String),
    Image(Vec<u8>),
}

fn handle_add(api: &mut Api, text: Option<String>) -> Result<()> {
    let source = match text {
        Some(text) => AddSource::Text(text),
        None => match read_piped_stdin()? {
            Some(text) => AddSource::Text(text),
            None => read_clipboard_source()?,
        },
    };

    let item = match source {
        AddSource::Text(text) => {
            if text.trim().is_empty() {
                bail!("Nothing to add: text is empty");
            }
            api.capture_text(&text)?
        }
        AddSource::Image(bytes) => api.capture_image(&bytes)?,
    };
    print_added(&item);
    Ok(())
}

/// Piped stdin, if any and not blank.
fn read_piped_stdin() -> Result<Option<String>> {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }
    let mut text = String::new();
    stdin
        .lock()
        .read_to_string(&mut text)
        .context("Failed to read stdin")?;
    Ok((!text.trim().is_empty()).then_some(text))
}

/// Clipboard text, falling back to a clipboard image.
fn read_clipboard_source() -> Result<AddSource> {
    if let Some(text) = clipboard::paste_text()?.filter(|t| !t.trim().is_empty()) {
        return Ok(AddSource::Text(text));
    }
    match clipboard::paste_image()? {
        Some(bytes) => Ok(AddSource::Image(bytes)),
        None => bail!("Nothing to add: the clipboard is empty"),
    }
}

fn handle_add_image(api: &mut Api, path: &Path) -> Result<()> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    if bytes.is_empty() {
        bail!("{} is empty", path.display());
    }
    let item = api.capture_image(&bytes)?;
    print_added(&item);
    Ok(())
}

fn handle_paste_image(api: &mut Api) -> Result<()> {
    let Some(bytes) = clipboard::paste_image()? else {
        bail!("The clipboard holds no image");
    };
    let item = api.capture_image(&bytes)?;
    print_added(&item);
    Ok(())
}

fn print_added(item: &Item) {
    match (item.kind, &item.thumbnail_path) {
        (ItemKind::Image, None) => println!("Added image {} (no thumbnail)", item.id.short()),
        (kind, _) => println!("Added {} {}", kind.label(), item.id.short()),
    }
}

fn handle_list(api: &Api, json: bool) -> Result<()> {
    if json {
        print!("{}", render::render_json(api.entries())?);
    } else {
        let width = Term::stdout()
            .size_checked()
            .map(|(_, cols)| cols as usize)
            .unwrap_or(render::DEFAULT_LINE_WIDTH);
        print!("{}", render::render_list(api.entries(), width));
    }
    Ok(())
}

fn handle_view(api: &Api, id: &str) -> Result<()> {
    let item = api.get_item(&api.resolve_id(id)?)?;
    match item.kind {
        ItemKind::Text => {
            let bytes = api.read_content(&item.id)?;
            print!("{}", String::from_utf8_lossy(&bytes));
        }
        ItemKind::Image => println!("{}", item.content_path.display()),
    }
    Ok(())
}

fn handle_copy(api: &Api, id: &str) -> Result<()> {
    let item = api.get_item(&api.resolve_id(id)?)?;
    match item.kind {
        ItemKind::Text => {
            let bytes = api.read_content(&item.id)?;
            clipboard::copy_text(&String::from_utf8_lossy(&bytes))?;
        }
        ItemKind::Image => clipboard::copy_image(&item.content_path)?,
    }
    println!("Copied {} {} to the clipboard", item.kind.label(), item.id.short());
    Ok(())
}

fn handle_delete(api: &mut Api, ids: &[String]) -> Result<()> {
    for input in ids {
        match api.resolve_id(input) {
            Ok(id) => {
                api.delete_item(&id)?;
                println!("Deleted {}", id.short());
            }
            // Deleting something that is already gone is not an error
            Err(SnipError::ItemNotFound(_)) => println!("No snippet matches {}", input),
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

fn handle_doctor(api: &mut Api) -> Result<()> {
    let report = api.doctor()?;
    print!("{}", render::render_doctor(&report));
    Ok(())
}

fn handle_config(api: &Api, config: &SnipConfig, key: Option<&str>) -> Result<()> {
    let entries = config.entries(&api.paths().data_dir);
    match key {
        None => {
            for (k, v) in &entries {
                println!("{} = {}", k, v);
            }
        }
        Some(key) => match entries.iter().find(|(k, _)| *k == key) {
            Some((_, v)) => println!("{}", v),
            None => bail!("Unknown config key: {}", key),
        },
    }
    Ok(())
}
