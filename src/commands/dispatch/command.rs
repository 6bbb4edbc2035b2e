//! Command trait and context for dispatching commands

use std::time::Instant;

use crate::cli::Cli;
use feedsim_core::config::SimilarityConfig;
use feedsim_core::db::Database;
use feedsim_core::error::Result;

/// Shared context for command execution
pub struct CommandContext<'a> {
    pub cli: &'a Cli,
    pub start: Instant,
}

impl<'a> CommandContext<'a> {
    pub fn new(cli: &'a Cli, start: Instant) -> Self {
        Self { cli, start }
    }

    /// Open the database named by `--db`; it must already exist
    pub fn open_database(&self) -> Result<Database> {
        let db = Database::open(&self.cli.db)?;
        tracing::debug!(elapsed = ?self.start.elapsed(), path = %self.cli.db.display(), "open_database");
        Ok(db)
    }

    /// Load `--config` when given, otherwise defaults
    pub fn load_config(&self) -> Result<SimilarityConfig> {
        SimilarityConfig::load_or_default(self.cli.config.as_deref())
    }
}

/// Trait for commands that can be executed
pub trait Command {
    fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

/// No-op command (when no subcommand is provided)
pub struct NoCommand;

impl Command for NoCommand {
    fn execute(&self, _ctx: &CommandContext) -> Result<()> {
        println!("feedsim {}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Near-duplicate detection for feed entries.");
        println!();
        println!("Run `feedsim --help` for usage information.");
        Ok(())
    }
}
