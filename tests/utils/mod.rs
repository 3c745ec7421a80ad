// Integration test utilities
//
// Helpers for building analytics event logs on disk

#![allow(dead_code)] // not every test binary uses every helper

use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Builder for an analytics event log
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<Value>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `users` distinct sessions to a variant and convert the first
    /// `conversions` of them
    pub fn variant(
        mut self,
        experiment: &str,
        variant: &str,
        name: &str,
        users: usize,
        conversions: usize,
    ) -> Self {
        for i in 0..users {
            self.events.push(json!({
                "name": "ab_test_assigned",
                "experimentId": experiment,
                "variantId": variant,
                "variantName": name,
                "sessionId": format!("{experiment}-{variant}-{i}"),
            }));
        }
        for i in 0..conversions {
            self.events.push(json!({
                "name": "ab_test_conversion",
                "experimentId": experiment,
                "variantId": variant,
                "sessionId": format!("{experiment}-{variant}-{i}"),
            }));
        }
        self
    }

    /// Append an arbitrary event
    pub fn event(mut self, event: Value) -> Self {
        self.events.push(event);
        self
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// `{"events": [...]}` document
    pub fn wrapped(&self) -> String {
        json!({ "events": self.events }).to_string()
    }

    /// Bare array document
    pub fn bare(&self) -> String {
        Value::Array(self.events.clone()).to_string()
    }

    /// Write the wrapped document into `dir` and return its path
    pub fn write_to(&self, dir: &TempDir) -> PathBuf {
        let path = dir.path().join("analytics_data.json");
        fs::write(&path, self.wrapped()).unwrap();
        path
    }
}

/// Two-variant landing page experiment (5.0% vs 6.5%) plus a single-variant
/// experiment and some unrelated traffic
pub fn landing_page_log() -> EventLog {
    EventLog::new()
        .variant("landing_style", "control", "Classic", 1000, 50)
        .variant("landing_style", "bold", "Bold Hero", 1000, 65)
        .variant("cta_color", "green", "Green Button", 40, 2)
        .event(json!({"name": "page_view", "sessionId": "landing_style-control-0"}))
        .event(json!({"name": "session_end", "sessionId": "landing_style-bold-3", "duration": 42}))
}
