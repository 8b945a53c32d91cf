//! Clear command implementation.

use anyhow::Result;
use clap::Args;
use scribe_core::AuditLogger;
use tracing::warn;

/// Arguments for the clear command.
#[derive(Args)]
pub struct ClearArgs {
    /// Entity key whose history is deleted
    pub key: String,
}

/// Runs the clear command.
pub fn run(args: &ClearArgs, logger: &AuditLogger) -> Result<()> {
    if !logger.has(&args.key) {
        warn!(key = %args.key, "No history to clear");
        println!("No history for {}", args.key);
        return Ok(());
    }

    logger.clear(&args.key);
    println!("Cleared history for {}", args.key);
    Ok(())
}
