//! JSON output format for experiment reports
//!
//! Experiments and variants are keyed by id. Variant entries carry the same
//! fields as [`VariantResults`], so user and conversion counts read back
//! exactly as they were aggregated.

use crate::aggregate::VariantResults;
use crate::analyzer::ExperimentAnalysis;
use crate::report::Recommendation;
use crate::significance::{SignificanceOutcome, SignificanceResult, UnavailableReason};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Format name written to every document
pub const FORMAT: &str = "abtest-json-v1";

/// Whether an experiment could be fully analyzed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JsonExperimentStatus {
    Complete,
    InsufficientData,
    ControlNotFound,
}

/// Significance test outcome, tagged by `status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JsonSignificance {
    Computed(SignificanceResult),
    Unavailable { reason: UnavailableReason },
}

impl From<&SignificanceOutcome> for JsonSignificance {
    fn from(outcome: &SignificanceOutcome) -> Self {
        match outcome {
            SignificanceOutcome::Computed(result) => JsonSignificance::Computed(result.clone()),
            SignificanceOutcome::Unavailable(reason) => {
                JsonSignificance::Unavailable { reason: *reason }
            }
        }
    }
}

/// A treatment variant compared against the control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonComparison {
    /// Treatment variant id
    pub variant_id: String,
    pub significance: JsonSignificance,
    /// Present whenever the counts could be judged, including degenerate
    /// tables
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_size_adequate: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Recommendation>,
}

/// Results for a single experiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonExperiment {
    pub status: JsonExperimentStatus,
    /// Control variant id (the requested one when it was not found)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control: Option<String>,
    /// Variant id -> aggregated results
    pub variants: BTreeMap<String, VariantResults>,
    pub comparisons: Vec<JsonComparison>,
}

impl From<&ExperimentAnalysis> for JsonExperiment {
    fn from(analysis: &ExperimentAnalysis) -> Self {
        let variants = analysis
            .results()
            .iter()
            .map(|v| (v.variant_id.clone(), v.clone()))
            .collect();

        match analysis {
            ExperimentAnalysis::InsufficientData { .. } => Self {
                status: JsonExperimentStatus::InsufficientData,
                control: None,
                variants,
                comparisons: Vec::new(),
            },
            ExperimentAnalysis::ControlNotFound { control, .. } => Self {
                status: JsonExperimentStatus::ControlNotFound,
                control: Some(control.clone()),
                variants,
                comparisons: Vec::new(),
            },
            ExperimentAnalysis::Complete(report) => Self {
                status: JsonExperimentStatus::Complete,
                control: Some(report.control.variant_id.clone()),
                variants,
                comparisons: report
                    .comparisons
                    .iter()
                    .map(|c| JsonComparison {
                        variant_id: c.treatment.variant_id.clone(),
                        significance: JsonSignificance::from(&c.outcome),
                        sample_size_adequate: c.sample_size_adequate,
                        recommendation: c.recommendation.clone(),
                    })
                    .collect(),
            },
        }
    }
}

/// Root JSON output structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonReport {
    /// Crate version that produced the document
    pub version: String,
    /// Format name
    pub format: String,
    /// Experiment id -> results
    pub experiments: BTreeMap<String, JsonExperiment>,
}

impl JsonReport {
    pub fn from_analyses(analyses: &[ExperimentAnalysis]) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: FORMAT.to_string(),
            experiments: analyses
                .iter()
                .map(|a| (a.experiment_id().to_string(), JsonExperiment::from(a)))
                .collect(),
        }
    }

    /// Serialize as pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
