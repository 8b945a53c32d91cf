//! Plain-text rendering of events and changes.

use std::fmt::Write;

use scribe_core::{Change, Event, Value, HIDE_TEXT};

/// Placeholder printed for an absent previous value.
const NIL: &str = "nil";

/// Formats a JSON value for display. Strings are printed bare.
pub fn value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn optional(from: Option<&serde_json::Value>) -> String {
    from.map_or_else(|| NIL.to_string(), value)
}

/// Renders events as numbered blocks, one payload field per line.
pub fn events(events: &[Event]) -> String {
    let mut out = String::new();
    for (i, event) in events.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. [{}] {} (by {} at {})",
            i + 1,
            event.action,
            event.description,
            event.author,
            event.timestamp.to_rfc3339()
        );
        for (field, v) in &event.payload {
            let shown = match v {
                Value::Plain(data) => value(data),
                Value::Hidden => HIDE_TEXT.to_string(),
            };
            let _ = writeln!(out, "   {field} = {shown}");
        }
    }
    out
}

/// Renders changes as numbered blocks with `field: from -> to` lines.
pub fn changes(changes: &[Change]) -> String {
    let mut out = String::new();
    for (i, change) in changes.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} (by {} at {})",
            i + 1,
            change.description,
            change.author,
            change.timestamp.to_rfc3339()
        );
        if change.fields.is_empty() {
            let _ = writeln!(out, "   (no changes)");
        }
        for field in &change.fields {
            let _ = writeln!(
                out,
                "   {}: {} -> {}",
                field.field,
                optional(field.from.as_ref()),
                value(&field.to)
            );
        }
    }
    out
}
