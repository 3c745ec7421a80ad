//! Text report rendering and the recommendation policy

use crate::analyzer::{Comparison, ExperimentAnalysis, ExperimentReport};
use crate::error::Result;
use crate::significance::{SampleSizeEstimate, SignificanceOutcome, SignificanceResult};
use serde::{Deserialize, Serialize};

const WIDTH: usize = 80;

/// What to do with a treatment variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Recommendation {
    /// Too little data: keep the test running
    ContinueTest {
        /// Users per variant needed to detect the configured effect
        users_per_variant: Option<u64>,
        /// Why no sample size could be given
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
    /// Significant improvement over the control
    Implement,
    /// Significant decline against the control
    Reject,
    NoClearWinner,
}

/// Pick a recommendation, checking sample adequacy before significance
///
/// `sample_size` is only evaluated when the test is underpowered.
pub fn recommend<F>(result: &SignificanceResult, sample_size: F) -> Recommendation
where
    F: FnOnce() -> Result<SampleSizeEstimate>,
{
    if !result.sample_size_adequate {
        return continue_test(sample_size());
    }

    if result.significant && result.relative_lift > 0.0 {
        Recommendation::Implement
    } else if result.significant && result.relative_lift < 0.0 {
        Recommendation::Reject
    } else {
        Recommendation::NoClearWinner
    }
}

/// Keep the test running, with the sample size still needed when it is known
pub fn continue_test(sample_size: Result<SampleSizeEstimate>) -> Recommendation {
    match sample_size {
        Ok(SampleSizeEstimate::Required { users_per_variant }) => Recommendation::ContinueTest {
            users_per_variant: Some(users_per_variant),
            note: None,
        },
        Ok(SampleSizeEstimate::Unavailable { reason }) => Recommendation::ContinueTest {
            users_per_variant: None,
            note: Some(reason.to_string()),
        },
        Err(e) => Recommendation::ContinueTest {
            users_per_variant: None,
            note: Some(e.to_string()),
        },
    }
}

/// Format an integer with comma thousands separators
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn flag(value: bool) -> &'static str {
    if value {
        "✓ YES"
    } else {
        "✗ NO"
    }
}

/// Render an analysis as a fixed-width text report
pub fn render_text(analysis: &ExperimentAnalysis) -> String {
    match analysis {
        ExperimentAnalysis::InsufficientData { results } => {
            format!(
                "Insufficient data for experiment: {}",
                results.experiment_id
            )
        }
        ExperimentAnalysis::ControlNotFound { results, control } => format!(
            "Control variant {} not found for experiment: {}",
            control, results.experiment_id
        ),
        ExperimentAnalysis::Complete(report) => render_complete(report),
    }
}

fn render_complete(report: &ExperimentReport) -> String {
    let rule = "=".repeat(WIDTH);
    let thin = "-".repeat(WIDTH);
    let mut lines = vec![
        rule.clone(),
        format!("A/B TEST REPORT: {}", report.results.experiment_id),
        rule.clone(),
        String::new(),
        "VARIANT PERFORMANCE".to_string(),
        thin.clone(),
    ];

    for variant in report.results.iter() {
        lines.push(format!("\n{} ({}):", variant.variant_name, variant.variant_id));
        lines.push(format!(
            "  Total Users:       {}",
            group_thousands(variant.total_users)
        ));
        lines.push(format!(
            "  Conversions:       {}",
            group_thousands(variant.conversions)
        ));
        lines.push(format!(
            "  Conversion Rate:   {:.2}%",
            variant.conversion_rate
        ));
        lines.push(format!(
            "  Avg Session:       {:.1}s",
            variant.avg_session_duration
        ));
        lines.push(format!(
            "  Avg Interactions:  {:.1}",
            variant.avg_interactions
        ));
    }

    lines.push(format!("\n{rule}"));
    lines.push("STATISTICAL ANALYSIS".to_string());
    lines.push(rule.clone());

    for comparison in &report.comparisons {
        lines.push(format!(
            "\n{} vs {}:",
            comparison.treatment.variant_name, report.control.variant_name
        ));
        lines.push(thin.clone());
        render_comparison(&mut lines, comparison);
    }

    lines.push(format!("\n{rule}"));
    lines.join("\n")
}

fn render_comparison(lines: &mut Vec<String>, comparison: &Comparison) {
    match &comparison.outcome {
        SignificanceOutcome::Computed(result) => {
            lines.push(format!(
                "  Conversion Rate Difference: {:+.2}%",
                result.rate_difference
            ));
            lines.push(format!(
                "  Relative Lift:              {:+.2}%",
                result.relative_lift
            ));
            lines.push(format!("  P-value:                    {:.4}", result.p_value));
            lines.push(format!(
                "  Confidence Level:           {:.2}%",
                result.confidence_level
            ));
            lines.push(format!(
                "  Statistically Significant:  {}",
                flag(result.significant)
            ));
            lines.push(adequacy_line(result.sample_size_adequate));
        }
        SignificanceOutcome::Unavailable(reason) => {
            lines.push(format!("  Significance unavailable: {reason}"));
            // Adequacy only needs counts, so it survives a degenerate table
            if let Some(adequate) = comparison.sample_size_adequate {
                lines.push(adequacy_line(adequate));
            }
        }
    }

    if let Some(recommendation) = &comparison.recommendation {
        lines.push("\n  Recommendation:".to_string());
        lines.push(recommendation_line(
            recommendation,
            &comparison.treatment.variant_name,
        ));
    }
}

fn adequacy_line(adequate: bool) -> String {
    format!("  Sample Size Adequate:       {}", flag(adequate))
}

fn recommendation_line(recommendation: &Recommendation, name: &str) -> String {
    match recommendation {
        Recommendation::ContinueTest {
            users_per_variant: Some(n),
            ..
        } => format!(
            "    Continue test - need ~{} users per variant",
            group_thousands(*n)
        ),
        Recommendation::ContinueTest { note, .. } => format!(
            "    Continue test - required sample size unknown ({})",
            note.as_deref().unwrap_or("not computed")
        ),
        Recommendation::Implement => {
            format!("    ✓ IMPLEMENT {name} - Shows significant improvement")
        }
        Recommendation::Reject => format!("    ✗ REJECT {name} - Shows significant decline"),
        Recommendation::NoClearWinner => {
            "    = NO CLEAR WINNER - Consider running longer or testing other variables".to_string()
        }
    }
}
