//! Replay command implementation.
//!
//! A scenario is a YAML list of writes:
//!
//! ```yaml
//! - key: order:1
//!   author: user
//!   description: Order created
//!   payload:
//!     status: pending
//!     total: 99.99
//! - key: order:1
//!   action: update
//!   author: payment
//!   description: Payment received
//!   payload:
//!     status: paid
//!   hidden: [card_number]
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use scribe_core::{Action, AuditLogger, Change, Payload, Value};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::render;

/// Arguments for the replay command.
#[derive(Args)]
pub struct ReplayArgs {
    /// Path to the scenario YAML file
    pub scenario: PathBuf,

    /// Print the resulting histories as JSON
    #[arg(long)]
    pub json: bool,
}

/// One write of a scenario.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    /// Entity key
    pub key: String,

    /// Lifecycle action
    #[serde(default)]
    pub action: Action,

    /// Who performed the change
    #[serde(default = "default_author")]
    pub author: String,

    /// Human-readable summary
    #[serde(default)]
    pub description: String,

    /// Visible field values
    #[serde(default)]
    pub payload: BTreeMap<String, serde_json::Value>,

    /// Fields recorded as hidden
    #[serde(default)]
    pub hidden: Vec<String>,
}

fn default_author() -> String {
    "system".to_string()
}

impl Step {
    fn payload(&self) -> Payload {
        let mut payload: Payload = self
            .payload
            .iter()
            .map(|(field, value)| (field.clone(), Value::plain(value.clone())))
            .collect();
        for field in &self.hidden {
            payload.insert(field.clone(), Value::hidden());
        }
        payload
    }
}

/// Reconstructed history of one key touched by a scenario.
#[derive(Debug, Serialize)]
pub struct KeyHistory {
    /// Entity key
    pub key: String,
    /// Changes in event order
    pub changes: Vec<Change>,
}

/// Parses a scenario document.
pub fn parse_scenario(text: &str) -> Result<Vec<Step>> {
    serde_yaml::from_str(text).context("Invalid scenario")
}

/// Applies every step and returns the history of each touched key, in the
/// order keys were first written.
pub fn apply(steps: &[Step], logger: &AuditLogger) -> Vec<KeyHistory> {
    let mut touched: Vec<&str> = Vec::new();
    for step in steps {
        logger.log_change(
            &step.key,
            step.action,
            &step.author,
            &step.description,
            step.payload(),
        );
        if !touched.contains(&step.key.as_str()) {
            touched.push(&step.key);
        }
    }

    touched
        .into_iter()
        .map(|key| KeyHistory {
            key: key.to_string(),
            changes: logger.logs(key),
        })
        .collect()
}

/// Runs the replay command.
pub fn run(args: &ReplayArgs, logger: &AuditLogger) -> Result<()> {
    let text = fs::read_to_string(&args.scenario)
        .with_context(|| format!("Failed to read scenario {}", args.scenario.display()))?;
    let steps = parse_scenario(&text)?;

    info!(scenario = %args.scenario.display(), steps = steps.len(), "Replaying scenario");
    let histories = apply(&steps, logger);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&histories)?);
        return Ok(());
    }

    for history in &histories {
        println!("== {} ==", history.key);
        print!("{}", render::changes(&history.changes));
        println!();
    }

    Ok(())
}
