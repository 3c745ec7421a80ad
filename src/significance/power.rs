// Required sample size for detecting a relative lift in conversion rate
//
// n = (z_{1-alpha/2} + z_{power})^2 / h^2
//
// where h = 2 * (asin(sqrt(p2)) - asin(sqrt(p1))) is Cohen's effect size for
// two proportions, p1 the baseline proportion and p2 = p1 * (1 + mde / 100).
// The alpha quantile is two-tailed, the power quantile one-tailed. The result
// is rounded up and applies per variant.

use super::distribution::{standard_normal_quantile, StatsCapability};
use super::UnavailableReason;
use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};

/// Required per-variant sample size, or why it could not be computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SampleSizeEstimate {
    Required { users_per_variant: u64 },
    Unavailable { reason: UnavailableReason },
}

impl SampleSizeEstimate {
    pub fn users_per_variant(&self) -> Option<u64> {
        match self {
            SampleSizeEstimate::Required { users_per_variant } => Some(*users_per_variant),
            SampleSizeEstimate::Unavailable { .. } => None,
        }
    }
}

/// Cohen's h between two proportions
pub fn cohens_h(p1: f64, p2: f64) -> f64 {
    2.0 * (p2.sqrt().asin() - p1.sqrt().asin())
}

fn check_probability(name: &'static str, value: f64) -> Result<()> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(AnalysisError::InvalidProbability { name, value })
    }
}

fn check_proportion(name: &'static str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(AnalysisError::RateOutOfRange { name, value })
    }
}

/// Per-variant sample size needed to detect `minimum_detectable_effect`
///
/// `baseline_rate` is a percentage (5.0 means 5%) and
/// `minimum_detectable_effect` a relative change in percent (20 means the
/// treatment converts 20% better than the baseline). A zero effect size
/// (zero baseline or zero effect) is an error rather than an infinite or
/// meaningless count.
///
/// # Example
/// ```
/// use abtest::significance::{calculate_sample_size_needed, StatsCapability};
///
/// let estimate =
///     calculate_sample_size_needed(5.0, 20.0, 0.05, 0.8, StatsCapability::detect()).unwrap();
/// if let Some(n) = estimate.users_per_variant() {
///     assert_eq!(n, 4072);
/// }
/// ```
pub fn calculate_sample_size_needed(
    baseline_rate: f64,
    minimum_detectable_effect: f64,
    alpha: f64,
    power: f64,
    capability: StatsCapability,
) -> Result<SampleSizeEstimate> {
    check_probability("alpha", alpha)?;
    check_probability("power", power)?;

    let p1 = baseline_rate / 100.0;
    let p2 = p1 * (1.0 + minimum_detectable_effect / 100.0);
    check_proportion("baseline proportion", p1)?;
    check_proportion("target proportion", p2)?;

    let effect_size = cohens_h(p1, p2);
    if effect_size == 0.0 {
        return Err(AnalysisError::ZeroEffectSize {
            baseline_rate,
            minimum_detectable_effect,
        });
    }

    if !capability.is_available() {
        return Ok(SampleSizeEstimate::Unavailable {
            reason: UnavailableReason::StatisticsDisabled,
        });
    }

    let (Some(z_alpha), Some(z_beta)) = (
        standard_normal_quantile(1.0 - alpha / 2.0)?,
        standard_normal_quantile(power)?,
    ) else {
        return Ok(SampleSizeEstimate::Unavailable {
            reason: UnavailableReason::StatisticsDisabled,
        });
    };

    let n = (z_alpha + z_beta).powi(2) / effect_size.powi(2);
    tracing::debug!(p1, p2, effect_size, z_alpha, z_beta, n, "sample size");

    Ok(SampleSizeEstimate::Required {
        users_per_variant: n.ceil() as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimate(baseline: f64, mde: f64, alpha: f64, power: f64) -> Result<SampleSizeEstimate> {
        calculate_sample_size_needed(baseline, mde, alpha, power, StatsCapability::Available)
    }

    #[test]
    fn test_cohens_h_known_value() {
        let h = cohens_h(0.05, 0.06);
        let expected = 2.0 * (0.06_f64.sqrt().asin() - 0.05_f64.sqrt().asin());
        assert_eq!(h, expected);
        assert!(h > 0.0);
        assert!(cohens_h(0.06, 0.05) < 0.0);
    }

    #[test]
    fn test_zero_baseline_is_an_error() {
        let err = estimate(0.0, 10.0, 0.05, 0.8).unwrap_err();
        assert!(matches!(err, AnalysisError::ZeroEffectSize { .. }));
    }

    #[test]
    fn test_zero_effect_is_an_error() {
        let err = estimate(5.0, 0.0, 0.05, 0.8).unwrap_err();
        assert!(matches!(err, AnalysisError::ZeroEffectSize { .. }));
    }

    #[test]
    fn test_target_rate_above_one_is_an_error() {
        let err = estimate(60.0, 100.0, 0.05, 0.8).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::RateOutOfRange {
                name: "target proportion",
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_alpha_and_power() {
        let err = estimate(5.0, 10.0, 0.0, 0.8).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidProbability { name: "alpha", .. }));
        let err = estimate(5.0, 10.0, 0.05, 1.0).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidProbability { name: "power", .. }));
    }

    #[test]
    fn test_unavailable_without_capability() {
        let capability = StatsCapability::Unavailable;
        let result = calculate_sample_size_needed(5.0, 20.0, 0.05, 0.8, capability).unwrap();
        assert_eq!(
            result,
            SampleSizeEstimate::Unavailable {
                reason: UnavailableReason::StatisticsDisabled
            }
        );
        assert_eq!(result.users_per_variant(), None);
    }

    #[cfg(feature = "statistics")]
    #[test]
    fn test_known_sample_sizes() {
        let n = |baseline, mde| {
            estimate(baseline, mde, 0.05, 0.8)
                .unwrap()
                .users_per_variant()
        };
        // 7.8489 / 0.043906^2 = 4071.31
        assert_eq!(n(5.0, 20.0), Some(4072));
        // 15608.75
        assert_eq!(n(5.0, 10.0), Some(15609));
        // Negative lifts are detectable too
        assert_eq!(n(5.0, -20.0), Some(3363));
    }

    #[cfg(feature = "statistics")]
    #[test]
    fn test_stricter_alpha_needs_more_users() {
        let at = |alpha| estimate(5.0, 20.0, alpha, 0.8).unwrap().users_per_variant();
        assert!(at(0.01) > at(0.05));
        assert!(at(0.05) > at(0.10));
    }
}
