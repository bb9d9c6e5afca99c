use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "trailforge")]
#[command(author, version, about = "Finds and fetches missing trailers in a media library")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Which half of the library a command operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindFilter {
    Movies,
    Tv,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List media folders that have no trailer
    Scan {
        /// Limit to movies or TV shows
        #[arg(long, value_enum)]
        kind: Option<KindFilter>,

        /// Re-list directories even when a fresh cache entry exists
        #[arg(long)]
        force: bool,

        /// Skip the persisted cache entirely for this run
        #[arg(long)]
        no_cache: bool,
    },

    /// Download trailers for media folders that have none
    Fetch {
        /// Limit to movies or TV shows
        #[arg(long, value_enum)]
        kind: Option<KindFilter>,

        /// Re-list directories even when a fresh cache entry exists
        #[arg(long)]
        force: bool,

        /// Stop after attempting this many items
        #[arg(short, long)]
        limit: Option<usize>,

        /// Show what would be downloaded without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Delete the persisted scan cache
    ClearCache,

    /// Rename trailer files saved with a stray extension
    FixExtensions {
        /// Show what would be renamed without touching files
        #[arg(long)]
        dry_run: bool,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
