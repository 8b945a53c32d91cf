//! Record command implementation.

use anyhow::{bail, Result};
use clap::{Args, ValueEnum};
use scribe_core::{Action, AuditLogger, Payload, Value};
use tracing::info;

/// Arguments for the record command.
#[derive(Args)]
pub struct RecordArgs {
    /// Entity key, e.g. `order:123`
    pub key: String,

    /// Lifecycle action
    #[arg(short, long, value_enum, default_value = "create")]
    pub action: ActionArg,

    /// Who performed the change
    #[arg(long, env = "SCRIBE_AUTHOR", default_value = "system")]
    pub author: String,

    /// Human-readable summary of the change
    #[arg(short, long)]
    pub description: String,

    /// Field assignment `field=value`; values are parsed as JSON, falling
    /// back to a plain string
    #[arg(short, long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
    pub fields: Vec<(String, serde_json::Value)>,

    /// Field whose value is sensitive and must only be recorded as hidden
    #[arg(long = "hide", value_name = "FIELD")]
    pub hidden: Vec<String>,
}

/// Action accepted on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ActionArg {
    /// Entity was created
    Create,
    /// Entity was updated
    Update,
    /// Entity was deleted
    Delete,
}

impl From<ActionArg> for Action {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::Create => Self::Create,
            ActionArg::Update => Self::Update,
            ActionArg::Delete => Self::Delete,
        }
    }
}

/// Parses a `field=value` assignment.
fn parse_assignment(text: &str) -> Result<(String, serde_json::Value), String> {
    let Some((field, raw)) = text.split_once('=') else {
        return Err(format!("expected FIELD=VALUE, got '{text}'"));
    };
    if field.is_empty() {
        return Err("field name must not be empty".to_string());
    }

    let value = serde_json::from_str(raw)
        .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
    Ok((field.to_string(), value))
}

/// Builds the event payload from the assignments and hidden fields.
fn build_payload(args: &RecordArgs) -> Result<Payload> {
    let mut payload = Payload::new();
    for (field, value) in &args.fields {
        if args.hidden.contains(field) {
            bail!("Field '{field}' is both set and hidden");
        }
        payload.insert(field.clone(), Value::plain(value.clone()));
    }
    for field in &args.hidden {
        payload.insert(field.clone(), Value::hidden());
    }
    Ok(payload)
}

/// Runs the record command.
pub fn run(args: &RecordArgs, logger: &AuditLogger) -> Result<()> {
    let payload = build_payload(args)?;
    let action = Action::from(args.action);

    info!(key = %args.key, %action, fields = payload.len(), "Recording event");
    logger.log_change(&args.key, action, &args.author, &args.description, payload);

    println!("Recorded {action} event for {}", args.key);
    Ok(())
}
