//! Field filtering and change-history reconstruction over event sequences.

use std::collections::{HashMap, HashSet};

use crate::event::{Change, ChangeField, Event, Value};

/// Restricts `events` to the requested payload fields.
///
/// With no fields every event is returned unchanged. Otherwise an event is
/// kept iff its payload holds at least one requested field, and its payload
/// is narrowed to those fields. Order is preserved.
#[must_use]
pub fn filter_events(events: &[Event], fields: &[&str]) -> Vec<Event> {
    if fields.is_empty() {
        return events.to_vec();
    }

    let wanted: HashSet<&str> = fields.iter().copied().collect();

    events
        .iter()
        .filter(|event| event.payload.keys().any(|f| wanted.contains(f.as_str())))
        .map(|event| event.with_filtered_payload(|f| wanted.contains(f)))
        .collect()
}

/// Replays `events` in order and derives one [`Change`] per event.
///
/// A visible field is reported only when its value differs from the last
/// visible value seen for it; the first visible write reports `from: None`.
/// A hidden field is reported on every occurrence as [`ChangeField::masked`]
/// and never enters the replay state, so the next visible write to it again
/// starts from `None`.
#[must_use]
pub fn reconstruct(events: &[Event]) -> Vec<Change> {
    let mut state: HashMap<&str, &serde_json::Value> = HashMap::new();
    let mut changes = Vec::with_capacity(events.len());

    for event in events {
        let mut fields = Vec::with_capacity(event.payload.len());

        for (field, value) in &event.payload {
            match value {
                Value::Hidden => fields.push(ChangeField::masked(field.as_str())),
                Value::Plain(data) => {
                    let old = state.get(field.as_str()).copied();
                    if old == Some(data) {
                        continue;
                    }
                    fields.push(ChangeField {
                        field: field.clone(),
                        from: old.cloned(),
                        to: data.clone(),
                    });
                    state.insert(field.as_str(), data);
                }
            }
        }

        changes.push(Change {
            fields,
            description: event.description.clone(),
            author: event.author.clone(),
            timestamp: event.timestamp,
        });
    }

    changes
}
