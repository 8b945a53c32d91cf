//! Audit event definitions.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::{Timestamp, Uuid};

use crate::error::Result;

/// Redaction marker shown in place of hidden values.
pub const HIDE_TEXT: &str = "***";

/// Field-name to value mapping carried by one event.
///
/// Keys are unique and iterate in lexical order.
pub type Payload = BTreeMap<String, Value>;

/// Generates a new v7 UUID for audit events.
fn new_event_id() -> Uuid {
    let ts = Timestamp::now(uuid::NoContext);
    Uuid::new_v7(ts)
}

/// Lifecycle action recorded by an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Entity was created
    #[default]
    Create,
    /// Entity was updated
    Update,
    /// Entity was deleted
    Delete,
}

impl Action {
    /// Returns the wire literal for this action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Parses an action literal, falling back to [`Action::Create`] for
    /// anything unrecognised.
    #[must_use]
    pub fn parse_or_default(text: &str) -> Self {
        match text {
            "update" => Self::Update,
            "delete" => Self::Delete,
            _ => Self::Create,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single payload datum.
///
/// Hidden values carry no data at all: the engine only ever records that
/// the field was touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum Value {
    /// Visible data, shown verbatim in change history
    Plain(serde_json::Value),
    /// Sensitive data, masked as [`HIDE_TEXT`]
    Hidden,
}

impl Value {
    /// Creates a visible value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use scribe_core::Value;
    ///
    /// let status = Value::plain("pending");
    /// assert_eq!(status.data(), Some(&serde_json::json!("pending")));
    /// ```
    #[must_use]
    pub fn plain(data: impl Into<serde_json::Value>) -> Self {
        Self::Plain(data.into())
    }

    /// Creates a hidden value for passwords, tokens and similar secrets.
    #[must_use]
    pub const fn hidden() -> Self {
        Self::Hidden
    }

    /// Creates a visible value from any serializable data.
    ///
    /// Composite data is stored in its canonical JSON form (object keys
    /// sorted), so two structurally equal values always compare equal.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` cannot be represented as JSON.
    pub fn serialized<T: Serialize + ?Sized>(data: &T) -> Result<Self> {
        Ok(Self::Plain(serde_json::to_value(data)?))
    }

    /// Returns true for hidden values.
    #[must_use]
    pub const fn is_hidden(&self) -> bool {
        matches!(self, Self::Hidden)
    }

    /// Returns the visible data, or `None` for hidden values.
    #[must_use]
    pub const fn data(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Plain(data) => Some(data),
            Self::Hidden => None,
        }
    }
}

/// An immutable fact about an action taken on an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique event ID
    pub id: Uuid,

    /// Event timestamp
    pub timestamp: DateTime<Utc>,

    /// Lifecycle action
    pub action: Action,

    /// Actor who triggered the event
    pub author: String,

    /// Human-readable summary
    pub description: String,

    /// Field values carried by the event
    #[serde(default)]
    pub payload: Payload,
}

impl Event {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn new(
        action: Action,
        author: impl Into<String>,
        description: impl Into<String>,
        payload: Payload,
    ) -> Self {
        Self {
            id: new_event_id(),
            timestamp: Utc::now(),
            action,
            author: author.into(),
            description: description.into(),
            payload,
        }
    }

    /// Returns a copy of this event whose payload keeps only the fields
    /// accepted by `keep`.
    #[must_use]
    pub fn with_filtered_payload(&self, mut keep: impl FnMut(&str) -> bool) -> Self {
        Self {
            id: self.id,
            timestamp: self.timestamp,
            action: self.action,
            author: self.author.clone(),
            description: self.description.clone(),
            payload: self
                .payload
                .iter()
                .filter(|(field, _)| keep(field))
                .map(|(field, value)| (field.clone(), value.clone()))
                .collect(),
        }
    }
}

/// Before/after values of one field within a [`Change`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeField {
    /// Field name
    pub field: String,

    /// Previous visible value; `None` when there was none
    pub from: Option<serde_json::Value>,

    /// New value
    pub to: serde_json::Value,
}

impl ChangeField {
    /// Creates the masked record emitted for a hidden field.
    #[must_use]
    pub fn masked(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            from: Some(serde_json::Value::from(HIDE_TEXT)),
            to: serde_json::Value::from(HIDE_TEXT),
        }
    }
}

/// Per-event view of the fields whose visible state changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    /// Changed fields, in lexical field order
    pub fields: Vec<ChangeField>,

    /// Description copied from the source event
    pub description: String,

    /// Author copied from the source event
    pub author: String,

    /// Timestamp copied from the source event
    pub timestamp: DateTime<Utc>,
}

impl Change {
    /// Returns the change record for `field`, if the field changed.
    #[must_use]
    pub fn field(&self, field: &str) -> Option<&ChangeField> {
        self.fields.iter().find(|f| f.field == field)
    }
}

/// Builds a [`Payload`] from `field => value` pairs.
///
/// ```rust
/// use scribe_core::{payload, Value};
///
/// let p = payload! {
///     "email" => Value::plain("a@b.com"),
///     "password" => Value::hidden(),
/// };
/// assert_eq!(p.len(), 2);
/// ```
#[macro_export]
macro_rules! payload {
    () => {
        $crate::Payload::new()
    };
    ($($field:expr => $value:expr),+ $(,)?) => {{
        let mut payload = $crate::Payload::new();
        $(
            payload.insert(::std::string::String::from($field), $value);
        )+
        payload
    }};
}
