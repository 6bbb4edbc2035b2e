//! `feedsim similar` command - show stored edges for one entry

use crate::commands::dispatch::CommandContext;
use crate::commands::format::{output_by_format_result, print_json};
use feedsim_core::error::Result;

pub fn execute(ctx: &CommandContext, entry_id: i64) -> Result<()> {
    let db = ctx.open_database()?;
    let similar = db.similar_entries(entry_id)?;

    output_by_format_result!(ctx.cli.format,
        json => {
            print_json(&serde_json::json!({
                "entry_id": entry_id,
                "similar": similar,
            }))
        },
        human => {
            if similar.is_empty() {
                if !ctx.cli.quiet {
                    println!("No similar entries for {}", entry_id);
                }
            } else {
                for s in &similar {
                    println!("{}\t{:.3}\t{}\t{}", s.entry_id, s.similarity, s.title, s.url);
                }
            }
        }
    )
}
