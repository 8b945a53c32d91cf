//! Error types for audit layer construction.

use thiserror::Error;

/// Errors raised while building an [`AuditLayer`](crate::AuditLayer).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No rule was given to resolve the entity key of a record.
    #[error("audit layer requires a key extractor")]
    MissingKeyExtractor,
}
