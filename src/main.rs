//! Feedsim - batch near-duplicate detection for feed entries
//!
//! Scores every pair of a user's entries with TF-IDF cosine similarity and
//! records the pairs above a threshold as similarity edges.

mod cli;
mod commands;

use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use cli::{Cli, OutputFormat};
use feedsim_core::error::FeedsimError;
use feedsim_core::logging;

fn main() -> ExitCode {
    let start = Instant::now();
    let args: Vec<String> = std::env::args().collect();

    let cli = match Cli::try_parse_from(&args) {
        Ok(cli) => cli,
        // Help and version print to stdout and exit 0
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) if wants_json(&args) => {
            return fail(&FeedsimError::UsageError(err.to_string()), OutputFormat::Json, false);
        }
        Err(err) => err.exit(),
    };

    if let Err(e) = logging::init_tracing(cli.verbose, cli.log_level.as_deref(), cli.log_json) {
        eprintln!("warning: logging disabled: {}", e);
    }
    tracing::debug!(elapsed = ?start.elapsed(), command = ?cli.command, "parsed arguments");

    match commands::dispatch::run(&cli, start) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&e, cli.format, cli.quiet),
    }
}

/// Report `error` on stderr in the requested format and map it to an exit code
fn fail(error: &FeedsimError, format: OutputFormat, quiet: bool) -> ExitCode {
    match format {
        OutputFormat::Json => eprintln!("{}", error.to_json()),
        OutputFormat::Human if !quiet => eprintln!("error: {}", error),
        OutputFormat::Human => {}
    }
    ExitCode::from(error.exit_code() as u8)
}

/// `--format json` as seen on the raw command line, for errors raised before
/// clap has produced a `Cli`
fn wants_json(args: &[String]) -> bool {
    args.iter().any(|a| a == "--format=json")
        || args
            .windows(2)
            .any(|pair| pair[0] == "--format" && pair[1] == "json")
}
