//! Event log loading
//!
//! Accepts either a bare JSON array of events or an object wrapping the array
//! under an `events` key. Individual events are not validated: anything that
//! is not an object, or lacks a field, simply reads as an event with that
//! field absent.

use crate::error::{AnalysisError, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Event name recorded when a session is assigned to a variant
pub const ASSIGNED: &str = "ab_test_assigned";
/// Event name recorded when an assigned session converts
pub const CONVERSION: &str = "ab_test_conversion";
/// Event name recorded when a session ends
pub const SESSION_END: &str = "session_end";

/// Kind of analytics event, derived from the `name` field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Assigned,
    Conversion,
    SessionEnd,
    /// Any other event name (or no name at all)
    Other(Option<String>),
}

impl EventKind {
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some(ASSIGNED) => EventKind::Assigned,
            Some(CONVERSION) => EventKind::Conversion,
            Some(SESSION_END) => EventKind::SessionEnd,
            other => EventKind::Other(other.map(str::to_string)),
        }
    }
}

/// A single analytics event
///
/// Only the fields consumed by the aggregator are kept. Every identifier is
/// optional because the input is free-form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub experiment_id: Option<String>,
    pub variant_id: Option<String>,
    pub variant_name: Option<String>,
    pub session_id: Option<String>,
}

impl Event {
    /// Build an event from an arbitrary JSON value
    ///
    /// Strings are taken as-is and numbers use their JSON text, so
    /// `"sessionId": 42` and `"sessionId": "42"` name the same session.
    pub fn from_value(value: &Value) -> Self {
        Self {
            kind: EventKind::from_name(field(value, "name").as_deref()),
            experiment_id: field(value, "experimentId"),
            variant_id: field(value, "variantId"),
            variant_name: field(value, "variantName"),
            session_id: field(value, "sessionId"),
        }
    }

    /// Convenience constructor for assignment events
    pub fn assigned(experiment: &str, variant: &str, name: &str, session: &str) -> Self {
        Self {
            kind: EventKind::Assigned,
            experiment_id: Some(experiment.to_string()),
            variant_id: Some(variant.to_string()),
            variant_name: Some(name.to_string()),
            session_id: Some(session.to_string()),
        }
    }

    /// Convenience constructor for conversion events
    pub fn conversion(experiment: &str, variant: &str, session: &str) -> Self {
        Self {
            kind: EventKind::Conversion,
            experiment_id: Some(experiment.to_string()),
            variant_id: Some(variant.to_string()),
            variant_name: None,
            session_id: Some(session.to_string()),
        }
    }
}

fn field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse events from JSON text
pub fn parse_events(contents: &str) -> Result<Vec<Event>> {
    let root: Value = serde_json::from_str(contents)?;

    let events = match root {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("events") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(AnalysisError::UnexpectedFormat(format!(
                    "`events` must be an array, found {}",
                    json_type(&other)
                )))
            }
            None => {
                return Err(AnalysisError::UnexpectedFormat(
                    "expected an array of events or an object with an `events` key".to_string(),
                ))
            }
        },
        other => {
            return Err(AnalysisError::UnexpectedFormat(format!(
                "expected an array or object at top level, found {}",
                json_type(&other)
            )))
        }
    };

    Ok(events.iter().map(Event::from_value).collect())
}

/// Load events from a JSON file
pub fn load_events<P: AsRef<Path>>(path: P) -> Result<Vec<Event>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let events = parse_events(&contents)?;
    tracing::info!(path = %path.display(), count = events.len(), "loaded events");
    Ok(events)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
