//! `feedsim init` command - create the database
//!
//! Idempotent: running it against an existing database only verifies the
//! schema version.

use crate::cli::Cli;
use crate::commands::format::{output_by_format_result, print_json_status};
use feedsim_core::db::Database;
use feedsim_core::error::Result;

/// Execute the init command
pub fn execute(cli: &Cli) -> Result<()> {
    let db = Database::create(&cli.db)?;
    let version = db.get_schema_version()?;

    output_by_format_result!(cli.format,
        json => {
            print_json_status(
                "ok",
                Some("Database initialized"),
                &[
                    ("database", serde_json::json!(cli.db.display().to_string())),
                    ("schema_version", serde_json::json!(version)),
                ],
            )
        },
        human => {
            if !cli.quiet {
                println!("Initialized feedsim database at {}", cli.db.display());
            }
        }
    )
}
