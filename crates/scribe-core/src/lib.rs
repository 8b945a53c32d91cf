//! Field-level audit trail engine.
//!
//! This crate records lifecycle events (create, update, delete) against named
//! entities and turns the stored event stream back into a readable history:
//! - Append-only, per-key event storage behind the [`Storage`] trait
//! - Filtering of events down to selected payload fields
//! - Field-level change history with before/after values
//! - Hidden values that are masked as `***` and never remembered
//!
//! # Example
//!
//! ```rust
//! use scribe_core::{payload, AuditLogger, Value};
//! use serde_json::json;
//!
//! let logger = AuditLogger::in_memory();
//!
//! logger.create("user:123", "admin", "User created", payload! {
//!     "email" => Value::plain("user@example.com"),
//!     "password" => Value::hidden(),
//! });
//! logger.update("user:123", "admin", "Email changed", payload! {
//!     "email" => Value::plain("new@example.com"),
//! });
//!
//! let logs = logger.logs("user:123");
//! let email = logs[1].field("email").unwrap();
//! assert_eq!(email.from, Some(json!("user@example.com")));
//! assert_eq!(email.to, json!("new@example.com"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
mod event;
pub mod history;
mod logger;
mod storage;


pub use error::{Error, Result};
pub use event::{Action, Change, ChangeField, Event, Payload, Value, HIDE_TEXT};
pub use logger::AuditLogger;
pub use storage::{InMemoryStorage, Storage};
