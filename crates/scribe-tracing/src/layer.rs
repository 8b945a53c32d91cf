//! The audit layer and its builder.

use std::collections::BTreeSet;
use std::fmt;

use scribe_core::{Action, AuditLogger, Payload, Value};
use tracing::span::{Attributes, Id, Record};
use tracing::{trace, Event, Metadata, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use crate::attr::{Attr, AttrVisitor, SpanAttrs};
use crate::error::ConfigError;
use crate::extract::{default_action_extractor, default_author_extractor, default_payload_extractor};

/// Decides whether an event is audited at all.
pub type AuditFilter = Box<dyn Fn(&Metadata<'_>) -> bool + Send + Sync>;

/// Resolves the entity key; `None` skips the event.
pub type KeyExtractor = Box<dyn Fn(&[Attr]) -> Option<String> + Send + Sync>;

/// Resolves the action of the change.
pub type ActionExtractor = Box<dyn Fn(&[Attr]) -> Action + Send + Sync>;

/// Resolves the author of the change.
pub type AuthorExtractor = Box<dyn Fn(&[Attr]) -> String + Send + Sync>;

/// Builds the payload of the change.
pub type PayloadExtractor = Box<dyn Fn(&[Attr]) -> Payload + Send + Sync>;

/// Crate targets whose events are engine diagnostics, never audit records.
const INTERNAL_TARGETS: [&str; 2] = ["scribe_core", "scribe_tracing"];

/// Layer that records matching tracing events in an [`AuditLogger`].
///
/// Attributes are collected from every span in the event's scope, root
/// first, followed by the event's own fields. The event message becomes the
/// change description. The layer never influences other layers: an event
/// that is not audited is still formatted and exported by them as usual.
pub struct AuditLayer {
    logger: AuditLogger,
    should_audit: Option<AuditFilter>,
    key_extractor: KeyExtractor,
    action_extractor: ActionExtractor,
    author_extractor: AuthorExtractor,
    payload_extractor: PayloadExtractor,
    hidden_fields: BTreeSet<String>,
}

impl fmt::Debug for AuditLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditLayer")
            .field("logger", &self.logger)
            .field("filtered", &self.should_audit.is_some())
            .field("hidden_fields", &self.hidden_fields)
            .finish_non_exhaustive()
    }
}

impl AuditLayer {
    /// Creates a builder writing to `logger`.
    #[must_use]
    pub fn builder(logger: AuditLogger) -> AuditLayerBuilder {
        AuditLayerBuilder::new(logger)
    }

    /// Returns the logger audit records are written to.
    #[must_use]
    pub const fn logger(&self) -> &AuditLogger {
        &self.logger
    }

    /// Turns the attributes of one event into an audit record, if they
    /// resolve to an entity key.
    fn audit(&self, attrs: &[Attr], description: &str) {
        let Some(key) = (self.key_extractor)(attrs) else {
            trace!(attrs = attrs.len(), "No entity key, skipping audit");
            return;
        };

        let action = (self.action_extractor)(attrs);
        let author = (self.author_extractor)(attrs);
        let mut payload = (self.payload_extractor)(attrs);
        for field in &self.hidden_fields {
            if let Some(value) = payload.get_mut(field) {
                *value = Value::hidden();
            }
        }

        self.logger
            .log_change(&key, action, &author, description, payload);
    }
}

fn is_internal(metadata: &Metadata<'_>) -> bool {
    let target = metadata.target();
    INTERNAL_TARGETS.iter().any(|internal| {
        target
            .strip_prefix(internal)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
    })
}

impl<S> Layer<S> for AuditLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };
        let mut visitor = AttrVisitor::new();
        attrs.record(&mut visitor);
        span.extensions_mut().insert(SpanAttrs(visitor.attrs));
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };
        let mut visitor = AttrVisitor::new();
        values.record(&mut visitor);

        let mut extensions = span.extensions_mut();
        if let Some(span_attrs) = extensions.get_mut::<SpanAttrs>() {
            span_attrs.0.extend(visitor.attrs);
        } else {
            extensions.insert(SpanAttrs(visitor.attrs));
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if is_internal(metadata) {
            return;
        }
        if let Some(should_audit) = &self.should_audit {
            if !should_audit(metadata) {
                return;
            }
        }

        let mut attrs = Vec::new();
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope.from_root() {
                if let Some(span_attrs) = span.extensions().get::<SpanAttrs>() {
                    attrs.extend(span_attrs.0.iter().cloned());
                }
            }
        }

        let mut visitor = AttrVisitor::new();
        event.record(&mut visitor);
        attrs.extend(visitor.attrs);

        self.audit(&attrs, visitor.message.as_deref().unwrap_or_default());
    }
}

/// Builder for configuring an [`AuditLayer`].
///
/// A key extractor is mandatory; every other rule has a default.
pub struct AuditLayerBuilder {
    logger: AuditLogger,
    should_audit: Option<AuditFilter>,
    key_extractor: Option<KeyExtractor>,
    action_extractor: Option<ActionExtractor>,
    author_extractor: Option<AuthorExtractor>,
    payload_extractor: Option<PayloadExtractor>,
    hidden_fields: BTreeSet<String>,
}

impl fmt::Debug for AuditLayerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditLayerBuilder")
            .field("logger", &self.logger)
            .field("has_key_extractor", &self.key_extractor.is_some())
            .field("hidden_fields", &self.hidden_fields)
            .finish_non_exhaustive()
    }
}

impl AuditLayerBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new(logger: AuditLogger) -> Self {
        Self {
            logger,
            should_audit: None,
            key_extractor: None,
            action_extractor: None,
            author_extractor: None,
            payload_extractor: None,
            hidden_fields: BTreeSet::new(),
        }
    }

    /// Audits only events accepted by `filter`. By default every event is
    /// considered.
    #[must_use]
    pub fn should_audit<F>(mut self, filter: F) -> Self
    where
        F: Fn(&Metadata<'_>) -> bool + Send + Sync + 'static,
    {
        self.should_audit = Some(Box::new(filter));
        self
    }

    /// Sets the rule resolving the entity key. Required.
    #[must_use]
    pub fn key_extractor<F>(mut self, extractor: F) -> Self
    where
        F: Fn(&[Attr]) -> Option<String> + Send + Sync + 'static,
    {
        self.key_extractor = Some(Box::new(extractor));
        self
    }

    /// Sets the rule resolving the action. Defaults to
    /// [`default_action_extractor`].
    #[must_use]
    pub fn action_extractor<F>(mut self, extractor: F) -> Self
    where
        F: Fn(&[Attr]) -> Action + Send + Sync + 'static,
    {
        self.action_extractor = Some(Box::new(extractor));
        self
    }

    /// Sets the rule resolving the author. Defaults to
    /// [`default_author_extractor`].
    #[must_use]
    pub fn author_extractor<F>(mut self, extractor: F) -> Self
    where
        F: Fn(&[Attr]) -> String + Send + Sync + 'static,
    {
        self.author_extractor = Some(Box::new(extractor));
        self
    }

    /// Sets the rule building the payload. Defaults to
    /// [`default_payload_extractor`].
    #[must_use]
    pub fn payload_extractor<F>(mut self, extractor: F) -> Self
    where
        F: Fn(&[Attr]) -> Payload + Send + Sync + 'static,
    {
        self.payload_extractor = Some(Box::new(extractor));
        self
    }

    /// Records `field` as a hidden value whenever it appears in a payload.
    #[must_use]
    pub fn hide_field(mut self, field: impl Into<String>) -> Self {
        self.hidden_fields.insert(field.into());
        self
    }

    /// Builds the audit layer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingKeyExtractor`] if no key extractor was
    /// set.
    pub fn build(self) -> Result<AuditLayer, ConfigError> {
        let key_extractor = self
            .key_extractor
            .ok_or(ConfigError::MissingKeyExtractor)?;

        Ok(AuditLayer {
            logger: self.logger,
            should_audit: self.should_audit,
            key_extractor,
            action_extractor: self
                .action_extractor
                .unwrap_or_else(|| Box::new(default_action_extractor)),
            author_extractor: self
                .author_extractor
                .unwrap_or_else(|| Box::new(default_author_extractor)),
            payload_extractor: self
                .payload_extractor
                .unwrap_or_else(|| Box::new(default_payload_extractor)),
            hidden_fields: self.hidden_fields,
        })
    }
}
