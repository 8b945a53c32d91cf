//! Error types for scribe core operations.
//!
//! Recording and reading history never fails; errors only arise when
//! converting caller data into payload values or events into JSON.

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in scribe core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
