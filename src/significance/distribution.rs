// Distribution functions backing the significance engine
//
// statrs is an optional dependency behind the `statistics` feature. The
// capability is detected once at startup and threaded through the analyzer;
// the functions below additionally return `Ok(None)` when the feature is
// compiled out, so a hand-built `StatsCapability::Available` can never
// produce fabricated numbers.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Whether hypothesis testing and power analysis can run in this build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsCapability {
    Available,
    Unavailable,
}

impl StatsCapability {
    /// Check for statistics support in the current build
    pub fn detect() -> Self {
        if cfg!(feature = "statistics") {
            StatsCapability::Available
        } else {
            tracing::warn!(
                "statistics support not compiled in; significance tests are unavailable"
            );
            StatsCapability::Unavailable
        }
    }

    pub fn is_available(self) -> bool {
        self == StatsCapability::Available
    }
}

/// Upper-tail probability of the chi-square distribution
#[cfg(feature = "statistics")]
pub(crate) fn chi_square_survival(statistic: f64, freedom: f64) -> Result<Option<f64>> {
    use crate::error::AnalysisError;
    use statrs::distribution::{ChiSquared, ContinuousCDF};

    let dist = ChiSquared::new(freedom).map_err(|e| AnalysisError::Distribution(e.to_string()))?;
    Ok(Some(dist.sf(statistic)))
}

#[cfg(not(feature = "statistics"))]
pub(crate) fn chi_square_survival(_statistic: f64, _freedom: f64) -> Result<Option<f64>> {
    Ok(None)
}

/// Inverse CDF of the standard normal distribution
#[cfg(feature = "statistics")]
pub(crate) fn standard_normal_quantile(q: f64) -> Result<Option<f64>> {
    use crate::error::AnalysisError;
    use statrs::distribution::{ContinuousCDF, Normal};

    let dist = Normal::new(0.0, 1.0).map_err(|e| AnalysisError::Distribution(e.to_string()))?;
    Ok(Some(dist.inverse_cdf(q)))
}

#[cfg(not(feature = "statistics"))]
pub(crate) fn standard_normal_quantile(_q: f64) -> Result<Option<f64>> {
    Ok(None)
}
