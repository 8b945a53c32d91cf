//! Audit logger implementation.

use std::sync::Arc;

use tracing::{debug, info};

use crate::event::{Action, Change, Event, Payload};
use crate::history;
use crate::storage::{InMemoryStorage, Storage};

/// Records audit events and reconstructs field-level change history.
///
/// The logger holds no state besides its storage handle; every read replays
/// the stored events. Clones share the same storage.
#[derive(Debug, Clone)]
pub struct AuditLogger {
    storage: Arc<dyn Storage>,
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl AuditLogger {
    /// Creates a logger on top of the given storage.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Creates a logger backed by a fresh [`InMemoryStorage`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStorage::new()))
    }

    /// Returns the storage this logger writes to.
    #[must_use]
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Records an event for `key` stamped with the current time.
    ///
    /// This is the generic write used by [`create`](Self::create),
    /// [`update`](Self::update) and [`delete`](Self::delete).
    pub fn log_change(
        &self,
        key: &str,
        action: Action,
        author: &str,
        description: &str,
        payload: Payload,
    ) {
        debug!(
            key,
            %action,
            author,
            fields = payload.len(),
            backend = self.storage.name(),
            "Recording audit event"
        );

        let event = Event::new(action, author, description, payload);
        self.storage.store(key, event);
    }

    /// Records a `create` event.
    pub fn create(&self, key: &str, author: &str, description: &str, payload: Payload) {
        self.log_change(key, Action::Create, author, description, payload);
    }

    /// Records an `update` event.
    pub fn update(&self, key: &str, author: &str, description: &str, payload: Payload) {
        self.log_change(key, Action::Update, author, description, payload);
    }

    /// Records a `delete` event. The payload may be empty.
    pub fn delete(&self, key: &str, author: &str, description: &str, payload: Payload) {
        self.log_change(key, Action::Delete, author, description, payload);
    }

    /// Returns the events recorded for `key`, optionally restricted to
    /// payload fields.
    ///
    /// With an empty `fields` slice every event is returned in full. Otherwise
    /// only events touching at least one of `fields` are returned, with their
    /// payloads narrowed to those fields.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use scribe_core::{payload, AuditLogger, Value};
    ///
    /// let logger = AuditLogger::in_memory();
    /// logger.create("order:1", "user", "Order created", payload! {
    ///     "status" => Value::plain("pending"),
    ///     "total" => Value::plain(10),
    /// });
    /// logger.update("order:1", "user", "Total changed", payload! {
    ///     "total" => Value::plain(12),
    /// });
    ///
    /// let statuses = logger.events("order:1", &["status"]);
    /// assert_eq!(statuses.len(), 1);
    /// assert_eq!(statuses[0].payload.len(), 1);
    /// ```
    #[must_use]
    pub fn events(&self, key: &str, fields: &[&str]) -> Vec<Event> {
        history::filter_events(&self.storage.get(key), fields)
    }

    /// Returns the change history of `key`, one [`Change`] per event.
    ///
    /// Hidden fields appear as `***` on both sides and are never remembered.
    #[must_use]
    pub fn logs(&self, key: &str) -> Vec<Change> {
        history::reconstruct(&self.storage.get(key))
    }

    /// Returns true if any event is recorded for `key`.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.storage.has(key)
    }

    /// Removes the whole history of `key`.
    pub fn clear(&self, key: &str) {
        info!(key, backend = self.storage.name(), "Clearing audit history");
        self.storage.clear(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{ChangeField, Value};
    use crate::payload;
    use parking_lot::Mutex;
    use serde_json::json;

    /// Storage double that records every call it receives.
    #[derive(Debug, Default)]
    struct RecordingStorage {
        inner: InMemoryStorage,
        calls: Mutex<Vec<String>>,
    }

    impl Storage for RecordingStorage {
        fn store(&self, key: &str, event: Event) {
            self.calls.lock().push(format!("store:{key}"));
            self.inner.store(key, event);
        }

        fn get(&self, key: &str) -> Vec<Event> {
            self.calls.lock().push(format!("get:{key}"));
            self.inner.get(key)
        }

        fn has(&self, key: &str) -> bool {
            self.calls.lock().push(format!("has:{key}"));
            self.inner.has(key)
        }

        fn clear(&self, key: &str) {
            self.calls.lock().push(format!("clear:{key}"));
            self.inner.clear(key);
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    #[test]
    fn test_logger_with_custom_storage() {
        let storage = Arc::new(RecordingStorage::default());
        let logger = AuditLogger::new(storage.clone());

        logger.create("user:1", "admin", "Created", Payload::new());
        let _ = logger.events("user:1", &[]);
        let _ = logger.logs("user:1");
        assert!(logger.has("user:1"));
        logger.clear("user:1");

        assert_eq!(
            *storage.calls.lock(),
            vec![
                "store:user:1",
                "get:user:1",
                "get:user:1",
                "has:user:1",
                "clear:user:1"
            ]
        );
        assert_eq!(logger.storage().name(), "recording");
    }

    #[test]
    fn test_write_actions() {
        let logger = AuditLogger::in_memory();
        logger.create("item:1", "a", "created", Payload::new());
        logger.update("item:1", "b", "updated", Payload::new());
        logger.delete("item:1", "c", "deleted", Payload::new());
        logger.log_change("item:1", Action::Update, "d", "generic", Payload::new());

        let actions: Vec<Action> = logger
            .events("item:1", &[])
            .iter()
            .map(|e| e.action)
            .collect();
        assert_eq!(
            actions,
            vec![Action::Create, Action::Update, Action::Delete, Action::Update]
        );
    }

    #[test]
    fn test_order_lifecycle_history() {
        let logger = AuditLogger::in_memory();
        logger.create(
            "order:1",
            "user",
            "Order created",
            payload! { "status" => Value::plain("pending") },
        );
        logger.update(
            "order:1",
            "admin",
            "Order approved",
            payload! { "status" => Value::plain("approved") },
        );

        let logs = logger.logs("order:1");
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].author, "user");
        assert_eq!(
            logs[0].fields,
            vec![ChangeField {
                field: "status".to_string(),
                from: None,
                to: json!("pending"),
            }]
        );
        assert_eq!(logs[1].description, "Order approved");
        assert_eq!(
            logs[1].fields,
            vec![ChangeField {
                field: "status".to_string(),
                from: Some(json!("pending")),
                to: json!("approved"),
            }]
        );
    }

    #[test]
    fn test_hidden_fields_are_masked() {
        let logger = AuditLogger::in_memory();
        logger.create(
            "user:1",
            "admin",
            "Created",
            payload! {
                "email" => Value::plain("a@b.com"),
                "password" => Value::hidden(),
            },
        );

        let logs = logger.logs("user:1");
        assert_eq!(logs[0].fields.len(), 2);
        assert_eq!(
            logs[0].field("password"),
            Some(&ChangeField::masked("password"))
        );
        let email = logs[0].field("email").unwrap();
        assert_eq!(email.from, None);
        assert_eq!(email.to, json!("a@b.com"));
    }

    #[test]
    fn test_delete_with_empty_payload() {
        let logger = AuditLogger::in_memory();
        logger.create(
            "item:1",
            "admin",
            "Item created",
            payload! { "name" => Value::plain("widget") },
        );
        logger.delete("item:1", "admin", "Item deleted", Payload::new());

        let events = logger.events("item:1", &[]);
        assert_eq!(events.len(), 2);
        assert_eq!(events.last().map(|e| e.action), Some(Action::Delete));

        let logs = logger.logs("item:1");
        assert_eq!(logs.len(), 2);
        assert!(logs[1].fields.is_empty());
    }

    #[test]
    fn test_unknown_key() {
        let logger = AuditLogger::in_memory();
        assert!(logger.events("missing", &[]).is_empty());
        assert!(logger.events("missing", &["field"]).is_empty());
        assert!(logger.logs("missing").is_empty());
        assert!(!logger.has("missing"));
    }

    #[test]
    fn test_returned_events_are_copies() {
        let logger = AuditLogger::in_memory();
        logger.create(
            "key",
            "admin",
            "Created",
            payload! { "a" => Value::plain(1) },
        );

        let mut events = logger.events("key", &[]);
        events[0].payload.insert("b".to_string(), Value::plain(2));
        events.clear();

        let stored = logger.events("key", &[]);
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].payload.len(), 1);
    }

    #[test]
    fn test_clones_share_storage() {
        let logger = AuditLogger::default();
        let clone = logger.clone();
        clone.create("key", "admin", "Created", Payload::new());
        assert!(logger.has("key"));
    }

    #[test]
    fn test_clear_then_write_starts_fresh_history() {
        let logger = AuditLogger::in_memory();
        logger.create(
            "key",
            "admin",
            "Created",
            payload! { "status" => Value::plain("a") },
        );
        logger.clear("key");
        assert!(!logger.has("key"));

        logger.update(
            "key",
            "admin",
            "Updated",
            payload! { "status" => Value::plain("b") },
        );
        let logs = logger.logs("key");
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].field("status").unwrap().from, None);
    }
}
