//! `feedsim calc-similarity` command - run one similarity pass
//!
//! Every user is processed even when an earlier one fails; the command then
//! exits with the first failure. Ctrl-C stops the pass between users.

use crate::commands::dispatch::CommandContext;
use crate::commands::format::{output_by_format_result, print_json};
use feedsim_core::config::{Scope, SimilarityConfig};
use feedsim_core::db::Database;
use feedsim_core::error::Result;
use feedsim_core::similarity::{run_similarity_pass, CancelFlag, PassReport};

/// Flag values that take precedence over the config file
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub threshold: Option<f64>,
    pub workers: Option<usize>,
    pub per_feed: bool,
}

impl Overrides {
    pub fn apply(&self, config: &mut SimilarityConfig) {
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if self.per_feed {
            config.scope = Scope::Feed;
        }
    }
}

pub fn execute(ctx: &CommandContext, overrides: Overrides) -> Result<()> {
    let mut config = ctx.load_config()?;
    overrides.apply(&mut config);
    config.validate()?;

    let db: Database = ctx.open_database()?;

    let cancel = CancelFlag::new();
    let handler_flag = cancel.clone();
    let _ = ctrlc::set_handler(move || {
        handler_flag.cancel();
    });

    let report = run_similarity_pass(&db, &config, &cancel)?;
    tracing::debug!(elapsed = ?ctx.start.elapsed(), "calc_similarity");

    output_by_format_result!(ctx.cli.format,
        json => { print_json(&report_json(&config, &report)) },
        human => { print_human(ctx, &report); }
    )?;

    match report.into_first_error() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn report_json(config: &SimilarityConfig, report: &PassReport) -> serde_json::Value {
    serde_json::json!({
        "threshold": config.threshold,
        "scope": config.scope,
        "total_created": report.total_created(),
        "failed_users": report.failed_users(),
        "skipped_users": report.skipped_users,
        "interrupted": report.interrupted,
        "users": report.users,
    })
}

fn print_human(ctx: &CommandContext, report: &PassReport) {
    for user in &report.users {
        match &user.error {
            Some(err) => println!("{} ({}): failed: {}", user.username, user.user_id, err),
            None if !ctx.cli.quiet => println!(
                "{} ({}): {} new edge(s), {} already stored, {} entries",
                user.username, user.user_id, user.created, user.skipped_existing, user.entries
            ),
            None => {}
        }
    }
    if !ctx.cli.quiet {
        println!("Created {} similarity edge(s)", report.total_created());
        if report.interrupted {
            println!("Interrupted: {} user(s) not processed", report.skipped_users);
        }
    }
}
