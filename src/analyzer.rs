//! Experiment analysis facade
//!
//! An [`Analyzer`] owns the aggregation of one event log together with the
//! analysis thresholds and the statistics capability detected at startup.
//! Reports are computed on demand; nothing is cached between calls.

use crate::aggregate::{Aggregator, ExperimentResults, VariantResults};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::events::Event;
use crate::json_output::JsonReport;
use crate::report::{self, Recommendation};
use crate::significance::{
    self, SampleSizeEstimate, SignificanceOutcome, StatsCapability, UnavailableReason,
};

/// Which variant of an experiment is the control
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ControlSelection {
    /// The variant whose first assignment appears earliest in the log
    #[default]
    FirstSeen,
    /// An explicitly named variant id
    Variant(String),
}

impl ControlSelection {
    pub fn from_option(control: Option<String>) -> Self {
        control.map_or(ControlSelection::FirstSeen, ControlSelection::Variant)
    }
}

/// A treatment variant compared against the control
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub treatment: VariantResults,
    pub outcome: SignificanceOutcome,
    /// Minimum user and conversion counts reached (absent without
    /// statistics support)
    pub sample_size_adequate: Option<bool>,
    /// Absent without statistics support, or when an adequate sample still
    /// could not be tested
    pub recommendation: Option<Recommendation>,
}

/// Full analysis of an experiment with at least two variants
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentReport {
    pub results: ExperimentResults,
    pub control: VariantResults,
    /// One entry per non-control variant, in first-seen order
    pub comparisons: Vec<Comparison>,
}

/// Analysis of a single experiment
#[derive(Debug, Clone, PartialEq)]
pub enum ExperimentAnalysis {
    /// Fewer than two variants were assigned (or the experiment is unknown)
    InsufficientData { results: ExperimentResults },
    /// The requested control variant is not part of the experiment
    ControlNotFound {
        results: ExperimentResults,
        control: String,
    },
    Complete(ExperimentReport),
}

impl ExperimentAnalysis {
    pub fn results(&self) -> &ExperimentResults {
        match self {
            ExperimentAnalysis::InsufficientData { results }
            | ExperimentAnalysis::ControlNotFound { results, .. } => results,
            ExperimentAnalysis::Complete(report) => &report.results,
        }
    }

    pub fn experiment_id(&self) -> &str {
        &self.results().experiment_id
    }
}

/// Analyzes A/B test results for every experiment in an event log
#[derive(Debug)]
pub struct Analyzer {
    aggregator: Aggregator,
    config: AnalysisConfig,
    capability: StatsCapability,
}

impl Analyzer {
    /// Aggregate `events` and prepare for analysis
    pub fn new(
        events: &[Event],
        config: AnalysisConfig,
        capability: StatsCapability,
    ) -> Result<Self> {
        Self::from_aggregator(Aggregator::from_events(events), config, capability)
    }

    pub fn from_aggregator(
        aggregator: Aggregator,
        config: AnalysisConfig,
        capability: StatsCapability,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            aggregator,
            config,
            capability,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn capability(&self) -> StatsCapability {
        self.capability
    }

    /// Experiment ids in first-seen order
    pub fn experiment_ids(&self) -> &[String] {
        self.aggregator.experiment_ids()
    }

    pub fn variant_results(&self, experiment_id: &str) -> ExperimentResults {
        self.aggregator.variant_results(experiment_id)
    }

    /// Compare `treatment` against `control` using the configured thresholds
    pub fn calculate_significance(
        &self,
        control: &VariantResults,
        treatment: &VariantResults,
    ) -> Result<SignificanceOutcome> {
        significance::calculate_significance(control, treatment, &self.config, self.capability)
    }

    /// Per-variant sample size for arbitrary parameters
    pub fn calculate_sample_size_needed(
        &self,
        baseline_rate: f64,
        minimum_detectable_effect: f64,
        alpha: f64,
        power: f64,
    ) -> Result<SampleSizeEstimate> {
        significance::calculate_sample_size_needed(
            baseline_rate,
            minimum_detectable_effect,
            alpha,
            power,
            self.capability,
        )
    }

    /// Sample size used when recommending that an underpowered test continue
    pub fn recommended_sample_size(&self, baseline_rate: f64) -> Result<SampleSizeEstimate> {
        self.calculate_sample_size_needed(
            baseline_rate,
            self.config.recommendation_mde,
            self.config.significance_level,
            self.config.power,
        )
    }

    /// Analyze one experiment against the selected control
    pub fn analyze(
        &self,
        experiment_id: &str,
        control: &ControlSelection,
    ) -> Result<ExperimentAnalysis> {
        let results = self.variant_results(experiment_id);

        if results.len() < 2 {
            tracing::info!(
                experiment = experiment_id,
                variants = results.len(),
                "insufficient data"
            );
            return Ok(ExperimentAnalysis::InsufficientData { results });
        }

        let control = match control {
            ControlSelection::FirstSeen => results.variants[0].clone(),
            ControlSelection::Variant(id) => match results.get(id) {
                Some(variant) => variant.clone(),
                None => {
                    tracing::warn!(
                        experiment = experiment_id,
                        control = %id,
                        "control variant not found"
                    );
                    return Ok(ExperimentAnalysis::ControlNotFound {
                        results,
                        control: id.clone(),
                    });
                }
            },
        };

        let control_id = control.variant_id.as_str();
        let mut comparisons = Vec::with_capacity(results.len() - 1);
        for treatment in results.iter().filter(|v| v.variant_id != control_id) {
            comparisons.push(self.compare(&control, treatment)?);
        }

        Ok(ExperimentAnalysis::Complete(ExperimentReport {
            results,
            control,
            comparisons,
        }))
    }

    fn compare(&self, control: &VariantResults, treatment: &VariantResults) -> Result<Comparison> {
        let outcome = self.calculate_significance(control, treatment)?;
        let sample_size = || self.recommended_sample_size(control.conversion_rate);

        let (sample_size_adequate, recommendation) = match &outcome {
            SignificanceOutcome::Computed(result) => (
                Some(result.sample_size_adequate),
                Some(report::recommend(result, sample_size)),
            ),
            SignificanceOutcome::Unavailable(UnavailableReason::StatisticsDisabled) => (None, None),
            // The counts still say whether the test has run long enough
            SignificanceOutcome::Unavailable(_) => {
                let adequate = significance::sample_size_adequate(control, treatment, &self.config);
                let recommendation = (!adequate).then(|| report::continue_test(sample_size()));
                (Some(adequate), recommendation)
            }
        };

        Ok(Comparison {
            treatment: treatment.clone(),
            outcome,
            sample_size_adequate,
            recommendation,
        })
    }

    /// Human-readable report for one experiment
    pub fn generate_report(
        &self,
        experiment_id: &str,
        control: &ControlSelection,
    ) -> Result<String> {
        Ok(report::render_text(&self.analyze(experiment_id, control)?))
    }

    /// Structured report for a set of experiments
    pub fn json_report(
        &self,
        experiment_ids: &[String],
        control: &ControlSelection,
    ) -> Result<JsonReport> {
        let analyses = experiment_ids
            .iter()
            .map(|id| self.analyze(id, control))
            .collect::<Result<Vec<_>>>()?;
        Ok(JsonReport::from_analyses(&analyses))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events() -> Vec<Event> {
        let mut events = Vec::new();
        for i in 0..200 {
            events.push(Event::assigned("hero", "a", "Control", &format!("a{i}")));
            events.push(Event::assigned("hero", "b", "Bold", &format!("b{i}")));
            events.push(Event::assigned("hero", "c", "Minimal", &format!("c{i}")));
        }
        for i in 0..10 {
            events.push(Event::conversion("hero", "a", &format!("a{i}")));
        }
        for i in 0..12 {
            events.push(Event::conversion("hero", "b", &format!("b{i}")));
        }
        for i in 0..8 {
            events.push(Event::conversion("hero", "c", &format!("c{i}")));
        }
        events.push(Event::assigned("solo", "only", "Only", "s1"));
        events
    }

    fn analyzer(capability: StatsCapability) -> Analyzer {
        Analyzer::new(&events(), AnalysisConfig::default(), capability).unwrap()
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = AnalysisConfig {
            power: 2.0,
            ..AnalysisConfig::default()
        };
        assert!(Analyzer::new(&events(), config, StatsCapability::Available).is_err());
    }

    #[test]
    fn test_experiment_ids_in_first_seen_order() {
        assert_eq!(
            analyzer(StatsCapability::Available).experiment_ids(),
            ["hero", "solo"]
        );
    }

    #[test]
    fn test_first_seen_control() {
        let analysis = analyzer(StatsCapability::Unavailable)
            .analyze("hero", &ControlSelection::FirstSeen)
            .unwrap();
        let ExperimentAnalysis::Complete(report) = analysis else {
            panic!("expected complete analysis");
        };
        assert_eq!(report.control.variant_id, "a");
        let treatments: Vec<_> = report
            .comparisons
            .iter()
            .map(|c| c.treatment.variant_id.as_str())
            .collect();
        assert_eq!(treatments, ["b", "c"]);
    }

    #[test]
    fn test_explicit_control() {
        let analysis = analyzer(StatsCapability::Unavailable)
            .analyze("hero", &ControlSelection::Variant("c".to_string()))
            .unwrap();
        let ExperimentAnalysis::Complete(report) = analysis else {
            panic!("expected complete analysis");
        };
        assert_eq!(report.control.variant_id, "c");
        assert_eq!(report.comparisons.len(), 2);
        for comparison in &report.comparisons {
            assert_ne!(comparison.treatment.variant_id, "c");
        }
    }

    #[test]
    fn test_unknown_control() {
        let analysis = analyzer(StatsCapability::Available)
            .analyze("hero", &ControlSelection::Variant("zzz".to_string()))
            .unwrap();
        assert!(matches!(
            analysis,
            ExperimentAnalysis::ControlNotFound { ref control, .. } if control == "zzz"
        ));
    }

    #[test]
    fn test_single_variant_is_insufficient() {
        let analysis = analyzer(StatsCapability::Available)
            .analyze("solo", &ControlSelection::FirstSeen)
            .unwrap();
        assert_eq!(analysis.experiment_id(), "solo");
        let ExperimentAnalysis::InsufficientData { results } = analysis else {
            panic!("expected insufficient data");
        };
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_unavailable_statistics_skip_recommendations() {
        let analysis = analyzer(StatsCapability::Unavailable)
            .analyze("hero", &ControlSelection::FirstSeen)
            .unwrap();
        let ExperimentAnalysis::Complete(report) = analysis else {
            panic!("expected complete analysis");
        };
        for comparison in &report.comparisons {
            assert!(comparison.outcome.computed().is_none());
            assert_eq!(comparison.sample_size_adequate, None);
            assert!(comparison.recommendation.is_none());
        }
    }

    #[test]
    fn test_control_selection_from_option() {
        assert_eq!(
            ControlSelection::from_option(None),
            ControlSelection::FirstSeen
        );
        assert_eq!(
            ControlSelection::from_option(Some("b".to_string())),
            ControlSelection::Variant("b".to_string())
        );
    }

    fn no_conversions(users: usize) -> Vec<Event> {
        (0..users)
            .flat_map(|i| {
                [
                    Event::assigned("hero", "a", "Control", &format!("a{i}")),
                    Event::assigned("hero", "b", "Bold", &format!("b{i}")),
                ]
            })
            .collect()
    }

    fn only_comparison(analyzer: &Analyzer) -> Comparison {
        let analysis = analyzer.analyze("hero", &ControlSelection::FirstSeen);
        let ExperimentAnalysis::Complete(mut report) = analysis.unwrap() else {
            panic!("expected complete analysis");
        };
        assert_eq!(report.comparisons.len(), 1);
        report.comparisons.remove(0)
    }

    #[test]
    fn test_degenerate_table_still_recommends_continuing() {
        let analyzer = Analyzer::new(
            &no_conversions(150),
            AnalysisConfig::default(),
            StatsCapability::Available,
        )
        .unwrap();
        let comparison = only_comparison(&analyzer);

        assert_eq!(
            comparison.outcome,
            SignificanceOutcome::Unavailable(UnavailableReason::DegenerateTable)
        );
        assert_eq!(comparison.sample_size_adequate, Some(false));
        // A 0% baseline has no finite sample size
        let Some(Recommendation::ContinueTest {
            users_per_variant: None,
            note: Some(note),
        }) = comparison.recommendation
        else {
            panic!("expected continue recommendation without a number");
        };
        assert!(note.contains("Effect size is zero"));
    }

    #[test]
    fn test_adequate_degenerate_table_has_no_recommendation() {
        let config = AnalysisConfig {
            min_conversions: 0,
            ..AnalysisConfig::default()
        };
        let analyzer =
            Analyzer::new(&no_conversions(150), config, StatsCapability::Available).unwrap();
        let comparison = only_comparison(&analyzer);

        assert_eq!(comparison.sample_size_adequate, Some(true));
        assert_eq!(comparison.recommendation, None);
    }

    #[test]
    fn test_inconsistent_counts_keep_adequacy() {
        let mut events = no_conversions(120);
        for _ in 0..130 {
            events.push(Event::conversion("hero", "b", "b0"));
        }
        for i in 0..6 {
            events.push(Event::conversion("hero", "a", &format!("a{i}")));
        }
        let analyzer = Analyzer::new(
            &events,
            AnalysisConfig::default(),
            StatsCapability::Available,
        )
        .unwrap();
        let comparison = only_comparison(&analyzer);

        assert_eq!(
            comparison.outcome,
            SignificanceOutcome::Unavailable(UnavailableReason::InconsistentCounts)
        );
        assert_eq!(comparison.sample_size_adequate, Some(true));
        assert_eq!(comparison.recommendation, None);
    }

    #[cfg(feature = "statistics")]
    #[test]
    fn test_recommendation_present_when_computed() {
        let analysis = analyzer(StatsCapability::Available)
            .analyze("hero", &ControlSelection::FirstSeen)
            .unwrap();
        let ExperimentAnalysis::Complete(report) = analysis else {
            panic!("expected complete analysis");
        };
        for comparison in &report.comparisons {
            assert!(comparison.outcome.computed().is_some());
            assert!(comparison.recommendation.is_some());
        }
    }

    #[cfg(feature = "statistics")]
    #[test]
    fn test_recommended_sample_size_uses_config() {
        let analyzer = analyzer(StatsCapability::Available);
        let estimate = analyzer.recommended_sample_size(5.0).unwrap();
        assert_eq!(estimate.users_per_variant(), Some(15609));
    }
}
