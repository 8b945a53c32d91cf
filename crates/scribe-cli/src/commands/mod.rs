//! CLI commands and argument parsing.

pub mod clear;
pub mod events;
pub mod logs;
pub mod record;
pub mod replay;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scribe_core::AuditLogger;

use crate::storage::JsonFileStorage;

/// Scribe - Audit trail recorder for entity changes
#[derive(Parser)]
#[command(name = "scribe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the JSON event store
    #[arg(
        long,
        global = true,
        env = "SCRIBE_STORE",
        default_value = "audit_events.json"
    )]
    pub store: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Record an audit event for an entity
    Record(record::RecordArgs),

    /// Show the raw events of an entity
    Events(events::EventsArgs),

    /// Show the field-level change history of an entity
    Logs(logs::LogsArgs),

    /// Delete the history of an entity
    Clear(clear::ClearArgs),

    /// Apply a YAML scenario of writes and print the resulting history
    Replay(replay::ReplayArgs),

    /// Print version information
    Version,
}

/// Opens the event store at `path` and wraps it in an audit logger.
pub fn open_logger(path: &Path) -> Result<AuditLogger> {
    let storage = JsonFileStorage::open(path)
        .with_context(|| format!("Failed to open event store {}", path.display()))?;
    Ok(AuditLogger::new(Arc::new(storage)))
}
