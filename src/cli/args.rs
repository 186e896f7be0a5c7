use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "posterwall")]
#[command(author = "MrMattias")]
#[command(version)]
#[command(about = "Landscape slideshow and portrait poster wall for your image collection")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Option<Commands>,

    /// Keep config, collection and thumbnails under this directory
    #[arg(short, long, global = true)]
    pub(crate) data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Import image files or directories into the collection
    Import {
        /// Files or directories to import
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,
    },
    /// Show collection totals per category
    Stats,
    /// List wallpapers in the collection
    List {
        /// Only list one category (landscape or portrait)
        #[arg(short, long)]
        category: Option<String>,
        /// Search query handed to the collection's search hook
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Remove every wallpaper from the collection
    Clear,
    /// Inspect or change transition styles
    Animation {
        #[command(subcommand)]
        action: AnimationAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum AnimationAction {
    /// List available transition styles
    List,
    /// Show the style selected for each category
    Show,
    /// Select the style for a category
    Set {
        /// Category (landscape or portrait)
        category: String,
        /// Style id (see `animation list`)
        style: String,
    },
}
