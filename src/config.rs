//! Analysis thresholds
//!
//! The defaults reproduce the fixed rules of thumb used for landing-page
//! experiments: 95% confidence, at least 100 users and 5 conversions per
//! variant, and a 10% relative effect when estimating how much longer a test
//! has to run.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for significance testing and recommendations
///
/// # Example
/// ```
/// use abtest::config::AnalysisConfig;
///
/// let config = AnalysisConfig::default();
/// assert_eq!(config.significance_level, 0.05);
/// assert_eq!(config.min_users, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Significance level (alpha): p-values below it are significant
    pub significance_level: f64,

    /// Minimum users per variant before a result is trusted
    pub min_users: u64,

    /// Minimum conversions per variant before a result is trusted
    pub min_conversions: u64,

    /// Relative effect (percent) used to estimate the sample size still
    /// needed when a test is underpowered
    pub recommendation_mde: f64,

    /// Statistical power for sample-size estimates
    pub power: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            significance_level: 0.05,
            min_users: 100,
            min_conversions: 5,
            recommendation_mde: 10.0,
            power: 0.8,
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from a TOML file; missing keys keep their defaults
    ///
    /// ```no_run
    /// use abtest::config::AnalysisConfig;
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let config = AnalysisConfig::from_file("abtest.toml")?;
    /// println!("alpha = {}", config.significance_level);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::AnalysisError;

        if !(self.significance_level > 0.0 && self.significance_level < 1.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "significance_level must be in (0, 1), got {}",
                self.significance_level
            )));
        }

        if !(self.power > 0.0 && self.power < 1.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "power must be in (0, 1), got {}",
                self.power
            )));
        }

        if !(self.recommendation_mde > 0.0 && self.recommendation_mde.is_finite()) {
            return Err(AnalysisError::InvalidConfig(format!(
                "recommendation_mde must be a positive percentage, got {}",
                self.recommendation_mde
            )));
        }

        Ok(())
    }
}
