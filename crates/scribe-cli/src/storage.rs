//! JSON file storage backend.
//!
//! The whole history lives in one JSON document mapping each key to its
//! ordered event list. The document is loaded once on open and rewritten
//! after every mutation.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use scribe_core::{Event, Storage};
use tracing::{debug, error};

type EventMap = BTreeMap<String, Vec<Event>>;

/// Errors that can occur while opening or saving a storage file.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error on the storage file
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path of the storage file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The storage file does not hold a valid event document
    #[error("Malformed storage file {path}: {source}")]
    Malformed {
        /// Path of the storage file.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

/// Storage persisting every key's events to a single JSON file.
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    events: RwLock<EventMap>,
}

impl JsonFileStorage {
    /// Opens the storage file at `path`. A missing file starts an empty
    /// history; it is created on the first write.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let events = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => EventMap::new(),
            Ok(text) => serde_json::from_str(&text).map_err(|source| StorageError::Malformed {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => EventMap::new(),
            Err(source) => return Err(StorageError::Io { path, source }),
        };

        debug!(path = %path.display(), keys = events.len(), "Opened storage file");
        Ok(Self {
            path,
            events: RwLock::new(events),
        })
    }

    /// Returns the path of the storage file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `events` to a sibling temporary file, then moves it over the
    /// storage file.
    fn save(&self, events: &EventMap) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };

        let json = serde_json::to_string_pretty(events).map_err(|source| {
            StorageError::Malformed {
                path: self.path.clone(),
                source,
            }
        })?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }

    fn persist(&self, events: &EventMap) {
        if let Err(e) = self.save(events) {
            error!(error = %e, "Failed to persist audit events");
        }
    }
}

impl Storage for JsonFileStorage {
    fn store(&self, key: &str, event: Event) {
        let mut events = self.events.write();
        events.entry(key.to_string()).or_default().push(event);
        self.persist(&events);
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
        let mut events = self.events.write();
        if events.remove(key).is_some() {
            self.persist(&events);
        }
    }

    fn name(&self) -> &'static str {
        "json_file"
    }
}
