//! Events command implementation.

use anyhow::Result;
use clap::Args;
use scribe_core::AuditLogger;
use tracing::info;

use crate::render;

/// Arguments for the events command.
#[derive(Args)]
pub struct EventsArgs {
    /// Entity key
    pub key: String,

    /// Only show events touching this field (repeatable)
    #[arg(short, long = "field", value_name = "FIELD")]
    pub fields: Vec<String>,

    /// Print events as JSON
    #[arg(long)]
    pub json: bool,
}

/// Runs the events command.
pub fn run(args: &EventsArgs, logger: &AuditLogger) -> Result<()> {
    let fields: Vec<&str> = args.fields.iter().map(String::as_str).collect();
    let events = logger.events(&args.key, &fields);

    info!(key = %args.key, count = events.len(), "Listing events");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&events)?);
    } else if events.is_empty() {
        println!("No events for {}", args.key);
    } else {
        print!("{}", render::events(&events));
    }

    Ok(())
}
