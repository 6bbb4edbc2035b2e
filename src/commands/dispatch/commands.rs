//! Command implementations for all feedsim commands

use crate::cli::Commands;
use crate::commands::dispatch::command::{Command, CommandContext};
use crate::commands::{calc_similarity, import, init, similar};
use feedsim_core::error::Result;

impl Command for Commands {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        match self {
            Commands::Init => init::execute(ctx.cli),
            Commands::Import { file } => import::execute(ctx, file),
            Commands::CalcSimilarity {
                threshold,
                workers,
                per_feed,
            } => calc_similarity::execute(
                ctx,
                calc_similarity::Overrides {
                    threshold: *threshold,
                    workers: *workers,
                    per_feed: *per_feed,
                },
            ),
            Commands::Similar { entry_id } => similar::execute(ctx, *entry_id),
        }
    }
}
