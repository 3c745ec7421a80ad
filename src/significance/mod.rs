// Significance testing and sample-size planning for conversion experiments
//
// Two operations:
// - Pairwise comparison of a control and a treatment variant using a
//   chi-square test of independence on the 2x2 conversion table
// - Required per-variant sample size from Cohen's h and the normal
//   approximation (two-tailed alpha, one-tailed power)
//
// Both depend on distribution functions from statrs. When the crate is built
// without the `statistics` feature the capability check fails once at startup
// and every result comes back as an explicit `Unavailable` value instead of a
// number.

mod contingency;
mod distribution;
mod power;

pub use contingency::ContingencyTable;
pub use distribution::StatsCapability;
pub use power::{calculate_sample_size_needed, cohens_h, SampleSizeEstimate};

use crate::aggregate::VariantResults;
use crate::config::AnalysisConfig;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a statistic could not be computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    /// Built without hypothesis-testing support
    StatisticsDisabled,
    /// A row or column of the contingency table is empty, so an expected
    /// frequency is zero and the test statistic is undefined
    DegenerateTable,
    /// A variant reports more conversions than users
    InconsistentCounts,
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnavailableReason::StatisticsDisabled => {
                write!(
                    f,
                    "statistics support not available (built without the `statistics` feature)"
                )
            }
            UnavailableReason::DegenerateTable => {
                write!(f, "contingency table has an empty row or column")
            }
            UnavailableReason::InconsistentCounts => {
                write!(f, "a variant has more conversions than users")
            }
        }
    }
}

/// Outcome of comparing a treatment variant against the control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignificanceResult {
    /// Two-tailed p-value of the chi-square test (1 degree of freedom)
    pub p_value: f64,
    /// p_value below the configured significance level
    pub significant: bool,
    /// (1 - p_value) * 100
    pub confidence_level: f64,
    /// Treatment rate minus control rate, in percentage points
    pub rate_difference: f64,
    /// Rate difference relative to the control rate, in percent
    /// (0 when the control rate is 0)
    pub relative_lift: f64,
    /// Chi-square statistic with Yates' continuity correction
    pub chi_square: f64,
    /// Both variants reached the minimum user and conversion counts
    pub sample_size_adequate: bool,
}

/// A computed comparison, or the reason none could be computed
#[derive(Debug, Clone, PartialEq)]
pub enum SignificanceOutcome {
    Computed(SignificanceResult),
    Unavailable(UnavailableReason),
}

impl SignificanceOutcome {
    pub fn computed(&self) -> Option<&SignificanceResult> {
        match self {
            SignificanceOutcome::Computed(result) => Some(result),
            SignificanceOutcome::Unavailable(_) => None,
        }
    }
}

/// Rule-of-thumb adequacy check: both variants need `min_users` users and
/// `min_conversions` conversions
pub fn sample_size_adequate(
    control: &VariantResults,
    treatment: &VariantResults,
    config: &AnalysisConfig,
) -> bool {
    [control, treatment]
        .iter()
        .all(|v| v.total_users >= config.min_users && v.conversions >= config.min_conversions)
}

/// Relative lift of the treatment over the control, in percent
pub fn relative_lift(control: &VariantResults, treatment: &VariantResults) -> f64 {
    if control.conversion_rate > 0.0 {
        (treatment.conversion_rate - control.conversion_rate) / control.conversion_rate * 100.0
    } else {
        0.0
    }
}

/// Compare a treatment variant against the control
///
/// # Example
/// ```
/// use abtest::aggregate::VariantResults;
/// use abtest::config::AnalysisConfig;
/// use abtest::significance::{calculate_significance, StatsCapability};
///
/// let control = VariantResults::from_counts("a", 1000, 50);
/// let treatment = VariantResults::from_counts("b", 1000, 65);
/// let outcome = calculate_significance(
///     &control,
///     &treatment,
///     &AnalysisConfig::default(),
///     StatsCapability::detect(),
/// )
/// .unwrap();
///
/// if let Some(result) = outcome.computed() {
///     assert!((result.relative_lift - 30.0).abs() < 1e-9);
/// }
/// ```
pub fn calculate_significance(
    control: &VariantResults,
    treatment: &VariantResults,
    config: &AnalysisConfig,
    capability: StatsCapability,
) -> Result<SignificanceOutcome> {
    if !capability.is_available() {
        return Ok(SignificanceOutcome::Unavailable(
            UnavailableReason::StatisticsDisabled,
        ));
    }

    if control.conversions > control.total_users || treatment.conversions > treatment.total_users {
        tracing::warn!(
            control = %control.variant_id,
            treatment = %treatment.variant_id,
            "conversions exceed users, skipping chi-square test"
        );
        return Ok(SignificanceOutcome::Unavailable(
            UnavailableReason::InconsistentCounts,
        ));
    }

    let table = ContingencyTable::from_variants(control, treatment);
    let Some(chi_square) = table.yates_statistic() else {
        return Ok(SignificanceOutcome::Unavailable(
            UnavailableReason::DegenerateTable,
        ));
    };

    let freedom = table.degrees_of_freedom();
    let Some(p_value) = distribution::chi_square_survival(chi_square, freedom)? else {
        return Ok(SignificanceOutcome::Unavailable(
            UnavailableReason::StatisticsDisabled,
        ));
    };

    tracing::debug!(
        control = %control.variant_id,
        treatment = %treatment.variant_id,
        chi_square,
        p_value,
        "chi-square test"
    );

    Ok(SignificanceOutcome::Computed(SignificanceResult {
        p_value,
        significant: p_value < config.significance_level,
        confidence_level: (1.0 - p_value) * 100.0,
        rate_difference: treatment.conversion_rate - control.conversion_rate,
        relative_lift: relative_lift(control, treatment),
        chi_square,
        sample_size_adequate: sample_size_adequate(control, treatment, config),
    }))
}
