use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "snipjar",
    bin_name = "snipjar",
    version,
    disable_help_subcommand = true
)]
#[command(about = "Keep text and image snippets at hand", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Data directory (defaults to $SNIPJAR_DATA, then the OS data directory)
    #[arg(long, global = true, value_name = "DIR", help_heading = "Options")]
    pub data: Option<PathBuf>,

    /// Verbose output, same as SNIPJAR_LOG=debug
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add text from the argument, stdin or the clipboard
    #[command(alias = "a", display_order = 1)]
    Add {
        /// Text to store
        text: Option<String>,
    },

    /// Add an image file
    #[command(display_order = 2)]
    AddImage {
        /// Image file to store
        path: PathBuf,
    },

    /// Add the image currently on the clipboard
    #[command(display_order = 3)]
    PasteImage,

    /// List snippets
    #[command(alias = "ls", display_order = 4)]
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print a snippet (image snippets print their file path)
    #[command(alias = "v", display_order = 5)]
    View {
        /// Id or unique id prefix
        id: String,
    },

    /// Copy a snippet back to the clipboard
    #[command(alias = "cp", display_order = 6)]
    Copy {
        /// Id or unique id prefix
        id: String,
    },

    /// Delete snippets
    #[command(alias = "rm", display_order = 7)]
    Delete {
        /// Ids or unique id prefixes
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Regenerate missing thumbnails and clean up leftovers
    #[command(display_order = 20)]
    Doctor,

    /// Show where snippets are stored
    #[command(display_order = 21)]
    Paths,

    /// Show configuration
    #[command(display_order = 22)]
    Config {
        /// Show only this key
        key: Option<String>,
    },
}
