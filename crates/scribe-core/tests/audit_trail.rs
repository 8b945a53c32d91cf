//! Integration tests for the audit trail engine.
//!
//! These tests drive the public API end to end: writes through
//! [`AuditLogger`], reads through `events` and `logs`, concurrency across
//! threads, and a caller-supplied storage backend.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use parking_lot::RwLock;
use scribe_core::{payload, Action, AuditLogger, ChangeField, Event, Payload, Storage, Value};
use serde_json::json;

#[test]
fn order_status_history() {
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
    assert_eq!(
        logs[0].fields,
        vec![ChangeField {
            field: "status".into(),
            from: None,
            to: json!("pending"),
        }]
    );
    assert_eq!(
        logs[1].fields,
        vec![ChangeField {
            field: "status".into(),
            from: Some(json!("pending")),
            to: json!("approved"),
        }]
    );
}

#[test]
fn user_with_hidden_password() {
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

    let fields = &logger.logs("user:1")[0].fields;
    assert!(fields.contains(&ChangeField {
        field: "password".into(),
        from: Some(json!("***")),
        to: json!("***"),
    }));
    assert!(fields.contains(&ChangeField {
        field: "email".into(),
        from: None,
        to: json!("a@b.com"),
    }));
}

#[test]
fn item_deleted_with_empty_payload() {
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
    assert_eq!(events[1].action, Action::Delete);
}

#[test]
fn full_order_timeline() {
    let logger = AuditLogger::in_memory();
    logger.create(
        "order:12345",
        "john.doe",
        "Order created",
        payload! {
            "status" => Value::plain("pending"),
            "total" => Value::plain(99.99),
            "payment_token" => Value::hidden(),
        },
    );
    logger.update(
        "order:12345",
        "jane.smith",
        "Order approved",
        payload! { "status" => Value::plain("approved") },
    );
    logger.update(
        "order:12345",
        "john.doe",
        "Shipping address updated",
        payload! {
            "address" => Value::plain(json!({"street": "123 Main St", "city": "Springfield"})),
        },
    );
    logger.update(
        "order:12345",
        "warehouse.system",
        "Order shipped",
        payload! {
            "status" => Value::plain("shipped"),
            "tracking_number" => Value::plain("TRK123456789"),
        },
    );

    let statuses: Vec<serde_json::Value> = logger
        .events("order:12345", &["status"])
        .into_iter()
        .filter_map(|e| e.payload.get("status").and_then(Value::data).cloned())
        .collect();
    assert_eq!(
        statuses,
        vec![json!("pending"), json!("approved"), json!("shipped")]
    );

    let logs = logger.logs("order:12345");
    assert_eq!(logs.len(), 4);
    assert_eq!(logs[0].fields.len(), 3);
    assert_eq!(
        logs[2].field("address").map(|f| &f.to),
        Some(&json!({"city": "Springfield", "street": "123 Main St"}))
    );
    assert_eq!(logs[3].field("status").unwrap().from, Some(json!("approved")));
}

#[test]
fn filtering_by_multiple_fields() {
    let logger = AuditLogger::in_memory();
    logger.create(
        "key",
        "a",
        "one",
        payload! { "f1" => Value::plain(1), "f3" => Value::plain(3) },
    );
    logger.update("key", "a", "two", payload! { "f3" => Value::plain(4) });
    logger.update(
        "key",
        "a",
        "three",
        payload! { "f2" => Value::plain(2), "f4" => Value::plain(5) },
    );

    let events = logger.events("key", &["f1", "f2"]);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].description, "one");
    assert_eq!(events[0].payload.keys().collect::<Vec<_>>(), vec!["f1"]);
    assert_eq!(events[1].description, "three");
    assert_eq!(events[1].payload.keys().collect::<Vec<_>>(), vec!["f2"]);

    assert!(logger.events("key", &["never"]).is_empty());
}

#[test]
fn concurrent_writers_on_distinct_keys() {
    let logger = AuditLogger::in_memory();
    let writers = 10;
    let per_writer = 100;

    let handles: Vec<_> = (0..writers)
        .map(|w| {
            let logger = logger.clone();
            thread::spawn(move || {
                let key = format!("entity:{w}");
                for i in 0..per_writer {
                    logger.update(
                        &key,
                        "writer",
                        &format!("write {i}"),
                        payload! { "counter" => Value::plain(i) },
                    );
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let mut total = 0;
    for w in 0..writers {
        let events = logger.events(&format!("entity:{w}"), &[]);
        assert_eq!(events.len(), per_writer);
        for (i, event) in events.iter().enumerate() {
            assert_eq!(event.description, format!("write {i}"));
        }
        total += events.len();
    }
    assert_eq!(total, writers * per_writer);
}

#[test]
fn concurrent_reads_during_writes() {
    let logger = AuditLogger::in_memory();

    let writer = {
        let logger = logger.clone();
        thread::spawn(move || {
            for i in 0..200 {
                logger.update(
                    "shared",
                    "writer",
                    "tick",
                    payload! { "n" => Value::plain(i) },
                );
            }
        })
    };
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let logger = logger.clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    let logs = logger.logs("shared");
                    for (i, change) in logs.iter().enumerate() {
                        assert_eq!(change.field("n").map(|f| &f.to), Some(&json!(i)));
                    }
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(logger.logs("shared").len(), 200);
}

/// Minimal caller-defined backend to check the storage contract is enough
/// for the engine.
#[derive(Debug, Default)]
struct MapStorage {
    events: RwLock<HashMap<String, Vec<Event>>>,
}

impl Storage for MapStorage {
    fn store(&self, key: &str, event: Event) {
        self.events
            .write()
            .entry(key.to_owned())
            .or_default()
            .push(event);
    }

    fn get(&self, key: &str) -> Vec<Event> {
        self.events.read().get(key).cloned().unwrap_or_default()
    }

    fn has(&self, key: &str) -> bool {
        self.events.read().contains_key(key)
    }

    fn clear(&self, key: &str) {
        self.events.write().remove(key);
    }

    fn name(&self) -> &'static str {
        "map"
    }
}

#[test]
fn custom_storage_backend() {
    let storage = Arc::new(MapStorage::default());
    let logger = AuditLogger::new(storage.clone());

    logger.create(
        "user:1",
        "admin",
        "User account created",
        payload! { "role" => Value::plain("editor") },
    );
    logger.update(
        "user:1",
        "admin",
        "Role updated",
        payload! { "role" => Value::plain("admin") },
    );

    assert_eq!(storage.get("user:1").len(), 2);
    assert_eq!(
        logger.logs("user:1")[1].field("role").unwrap().from,
        Some(json!("editor"))
    );

    logger.clear("user:1");
    assert!(!storage.has("user:1"));
}
