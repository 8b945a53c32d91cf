//! Structured-log ingestion for the scribe audit trail.
//!
//! [`AuditLayer`] is a [`tracing_subscriber::Layer`] that turns tracing
//! events carrying an entity key into audit events, so existing log
//! statements double as audit records:
//!
//! - The entity key comes from a required key extractor (usually
//!   [`attr_extractor`]`("entity")`); events without a key are skipped
//! - The action, author and payload default to the `action`, `author`/`user`
//!   and remaining fields of the event and its spans
//! - The event message becomes the change description
//!
//! # Example
//!
//! ```rust
//! use scribe_core::AuditLogger;
//! use scribe_tracing::{attr_extractor, AuditLayer};
//! use tracing_subscriber::layer::SubscriberExt;
//!
//! let logger = AuditLogger::in_memory();
//! let layer = AuditLayer::builder(logger.clone())
//!     .key_extractor(attr_extractor("entity"))
//!     .hide_field("password")
//!     .build()
//!     .expect("key extractor is set");
//!
//! let subscriber = tracing_subscriber::registry().with(layer);
//! tracing::subscriber::with_default(subscriber, || {
//!     tracing::info!(entity = "user:123", author = "admin", email = "a@b.com", "User created");
//! });
//!
//! let events = logger.events("user:123", &[]);
//! assert_eq!(events[0].author, "admin");
//! assert_eq!(events[0].description, "User created");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod attr;
mod error;
mod extract;
mod layer;

pub use attr::Attr;
pub use error::ConfigError;
pub use extract::{
    attr_extractor, default_action_extractor, default_author_extractor,
    default_payload_extractor, ATTR_ACTION, ATTR_AUTHOR, ATTR_ENTITY, ATTR_USER, DEFAULT_AUTHOR,
};
pub use layer::{
    ActionExtractor, AuditFilter, AuditLayer, AuditLayerBuilder, AuthorExtractor, KeyExtractor,
    PayloadExtractor,
};
