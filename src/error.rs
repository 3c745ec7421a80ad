//! Error types for A/B test analysis
//!
//! Loading and computation failures surface as [`AnalysisError`]. Tolerated
//! conditions (unknown events, conversions before assignment, missing
//! statistics support) are not errors and never reach this type.

use thiserror::Error;

/// Errors that can occur while loading events or computing statistics
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected data format: {0}")]
    UnexpectedFormat(String),

    #[error(
        "Effect size is zero (baseline rate {baseline_rate}%, minimum detectable effect \
         {minimum_detectable_effect}%): no finite sample size can detect it"
    )]
    ZeroEffectSize {
        baseline_rate: f64,
        minimum_detectable_effect: f64,
    },

    #[error("Conversion rate out of range: {name} = {value} (expected [0, 1])")]
    RateOutOfRange { name: &'static str, value: f64 },

    #[error("Invalid probability: {name} = {value} (expected a value in (0, 1))")]
    InvalidProbability { name: &'static str, value: f64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Distribution error: {0}")]
    Distribution(String),
}

/// Result type for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;
