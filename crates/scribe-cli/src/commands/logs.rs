//! Logs command implementation.

use anyhow::Result;
use clap::Args;
use scribe_core::AuditLogger;
use tracing::info;

use crate::render;

/// Arguments for the logs command.
#[derive(Args)]
pub struct LogsArgs {
    /// Entity key
    pub key: String,

    /// Print changes as JSON
    #[arg(long)]
    pub json: bool,
}

/// Runs the logs command.
pub fn run(args: &LogsArgs, logger: &AuditLogger) -> Result<()> {
    let changes = logger.logs(&args.key);

    info!(key = %args.key, count = changes.len(), "Reconstructing history");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&changes)?);
    } else if changes.is_empty() {
        println!("No history for {}", args.key);
    } else {
        print!("{}", render::changes(&changes));
    }

    Ok(())
}
