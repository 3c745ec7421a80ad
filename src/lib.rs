//! abtest - offline A/B test analysis
//!
//! This library aggregates analytics event logs into per-variant user and
//! conversion counts, tests treatment variants against a control with a
//! chi-square test, estimates required sample sizes, and renders text or
//! JSON reports.
//!
//! ```
//! use abtest::analyzer::{Analyzer, ControlSelection};
//! use abtest::config::AnalysisConfig;
//! use abtest::events::Event;
//! use abtest::significance::StatsCapability;
//!
//! let events = vec![
//!     Event::assigned("hero", "a", "Control", "s1"),
//!     Event::assigned("hero", "b", "Bold", "s2"),
//!     Event::conversion("hero", "b", "s2"),
//! ];
//! let analyzer =
//!     Analyzer::new(&events, AnalysisConfig::default(), StatsCapability::detect()).unwrap();
//! let report = analyzer.generate_report("hero", &ControlSelection::FirstSeen).unwrap();
//! assert!(report.contains("A/B TEST REPORT: hero"));
//! ```

pub mod aggregate;
pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod json_output;
pub mod report;
pub mod significance;
