//! CLI argument parsing for feedsim
//!
//! Global flags: --db, --config, --format, --quiet, --verbose, --log-level,
//! --log-json

pub mod format;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use output::OutputFormat;

/// Feedsim - near-duplicate detection for feed entries
#[derive(Parser, Debug)]
#[command(name = "feedsim")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// SQLite database path
    #[arg(long, global = true, env = "FEEDSIM_DB", default_value = "feedsim.db")]
    pub db: PathBuf,

    /// Similarity configuration file (TOML)
    #[arg(long, global = true, env = "FEEDSIM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Log level or filter directives (e.g. "info", "feedsim_core::pool=trace")
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the database schema
    Init,

    /// Load users, feeds and entries from a JSON file
    Import {
        /// JSON file with `users`, `feeds` and `entries` arrays
        file: PathBuf,
    },

    /// Find near-duplicate entries for every user and store the edges
    CalcSimilarity {
        /// Minimum cosine similarity for an edge (0.0 to 1.0)
        #[arg(long, short)]
        threshold: Option<f64>,

        /// Number of worker threads
        #[arg(long, short)]
        workers: Option<usize>,

        /// Compare entries only within the same feed
        #[arg(long)]
        per_feed: bool,
    },

    /// List stored similarity edges touching an entry
    Similar {
        /// Entry ID
        entry_id: i64,
    },
}
