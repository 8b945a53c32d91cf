//! Event storage contract and the default in-memory backend.

use std::collections::HashMap;
use std::fmt::Debug;

use parking_lot::RwLock;

use crate::event::Event;

/// Backend trait for audit event storage.
///
/// Implementations keep one append-only sequence of events per key and must
/// be safe for concurrent access: appends to a key are serialized, readers
/// never observe a partially stored event, and the sequence returned by
/// [`Storage::get`] is a snapshot unaffected by later appends.
pub trait Storage: Send + Sync + Debug {
    /// Appends an event to the sequence for `key`.
    fn store(&self, key: &str, event: Event);

    /// Returns every event stored for `key`, in append order.
    ///
    /// Unknown keys yield an empty vector.
    fn get(&self, key: &str) -> Vec<Event>;

    /// Returns true if at least one event is stored for `key`.
    fn has(&self, key: &str) -> bool;

    /// Removes the whole history of `key`. No-op for unknown keys.
    fn clear(&self, key: &str);

    /// Returns the backend name for identification.
    fn name(&self) -> &'static str;
}

/// Thread-safe in-memory storage backed by a map.
///
/// Readers share the lock; appends and clears take it exclusively.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    events: RwLock<HashMap<String, Vec<Event>>>,
}

impl InMemoryStorage {
    /// Creates a new, empty in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of keys with a stored history.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if no key has a stored history.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Returns every key with a stored history, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.events.read().keys().cloned().collect();
        keys.sort_unstable();
        keys
    }
}

impl Storage for InMemoryStorage {
    fn store(&self, key: &str, event: Event) {
        self.events
            .write()
            .entry(key.to_string())
            .or_default()
            .push(event);
    }

    fn get(&self, key: &str) -> Vec<Event> {
        self.events.read().get(key).cloned().unwrap_or_default()
    }

    fn has(&self, key: &str) -> bool {
        self.events
            .read()
            .get(key)
            .is_some_and(|events| !events.is_empty())
    }

    fn clear(&self, key: &str) {
        self.events.write().remove(key);
    }

    fn name(&self) -> &'static str {
        "in_memory"
    }
}
