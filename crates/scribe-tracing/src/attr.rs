//! Recorded tracing fields.

use std::borrow::Cow;
use std::fmt;

use tracing::field::{Field, Visit};

/// Name of the field tracing uses for an event's formatted message.
pub(crate) const MESSAGE_FIELD: &str = "message";

/// One field recorded on a span or event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    /// Field name
    pub key: String,

    /// Recorded value
    pub value: serde_json::Value,
}

impl Attr {
    /// Creates an attribute.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Returns the value as text: strings verbatim, anything else as JSON.
    #[must_use]
    pub fn as_text(&self) -> Cow<'_, str> {
        match &self.value {
            serde_json::Value::String(s) => Cow::Borrowed(s),
            other => Cow::Owned(other.to_string()),
        }
    }
}

/// Span extension holding the fields recorded on that span so far.
#[derive(Debug, Default)]
pub(crate) struct SpanAttrs(pub(crate) Vec<Attr>);

/// Visitor collecting fields into [`Attr`]s, keeping the message apart.
#[derive(Debug, Default)]
pub(crate) struct AttrVisitor {
    pub(crate) message: Option<String>,
    pub(crate) attrs: Vec<Attr>,
}

impl AttrVisitor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, field: &Field, value: serde_json::Value) {
        self.attrs.push(Attr::new(field.name(), value));
    }
}

impl Visit for AttrVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == MESSAGE_FIELD {
            self.message = Some(value.to_string());
        } else {
            self.push(field, serde_json::Value::from(value));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push(field, serde_json::Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push(field, serde_json::Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push(field, serde_json::Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        // NaN and infinities have no JSON form
        let value = serde_json::Number::from_f64(value)
            .map_or_else(|| serde_json::Value::from(value.to_string()), Into::into);
        self.push(field, value);
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == MESSAGE_FIELD {
            self.message = Some(format!("{value:?}"));
        } else {
            self.push(field, serde_json::Value::from(format!("{value:?}")));
        }
    }
}
