//! `feedsim import` command - load users, feeds and entries from JSON

use std::path::Path;

use crate::commands::dispatch::CommandContext;
use crate::commands::format::{output_by_format_result, print_json};
use feedsim_core::db::ImportFile;
use feedsim_core::error::Result;

pub fn execute(ctx: &CommandContext, file: &Path) -> Result<()> {
    let db = ctx.open_database()?;
    let import = ImportFile::load(file)?;
    let summary = db.import(&import)?;

    output_by_format_result!(ctx.cli.format,
        json => { print_json(&summary) },
        human => {
            if !ctx.cli.quiet {
                println!(
                    "Imported {} user(s), {} feed(s), {} entry(ies) from {}",
                    summary.users,
                    summary.feeds,
                    summary.entries,
                    file.display()
                );
            }
        }
    )
}
