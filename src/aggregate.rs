//! Per-variant aggregation of assignment and conversion events
//!
//! A single pass over the event log builds an [`Aggregator`] holding one
//! [`VariantAccumulator`] per (experiment, variant). Experiments and variants
//! keep their first-seen order so listings and reports are deterministic.

use crate::events::{Event, EventKind};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Mutable state for one variant of one experiment
#[derive(Debug, Clone, Default)]
pub struct VariantAccumulator {
    /// Display name (variantName of the first assignment, else the variant id)
    pub name: String,
    /// Distinct sessions assigned to this variant. `None` is the anonymous
    /// session shared by every assignment that carried no session id.
    pub sessions: HashSet<Option<String>>,
    /// Conversion events attributed to this variant
    pub conversions: u64,
    /// Session durations in seconds (not populated: `session_end` events
    /// carry no variant assignment to join on)
    pub session_durations: Vec<f64>,
    /// Interaction counts per session (not populated, see above)
    pub interactions: Vec<f64>,
}

impl VariantAccumulator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Snapshot the accumulator into immutable results
    pub fn finalize(&self, variant_id: &str) -> VariantResults {
        VariantResults::new(
            variant_id,
            &self.name,
            self.sessions.len() as u64,
            self.conversions,
            mean(&self.session_durations),
            mean(&self.interactions),
        )
    }
}

fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        0.0
    } else {
        samples.iter().sum::<f64>() / samples.len() as f64
    }
}

/// Finalized results for a single variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantResults {
    pub variant_id: String,
    pub variant_name: String,
    pub total_users: u64,
    pub conversions: u64,
    /// Conversions per user, as a percentage (0 when there are no users)
    pub conversion_rate: f64,
    pub avg_session_duration: f64,
    pub avg_interactions: f64,
}

impl VariantResults {
    /// Build results, deriving the conversion rate from the counts
    pub fn new(
        variant_id: &str,
        variant_name: &str,
        total_users: u64,
        conversions: u64,
        avg_session_duration: f64,
        avg_interactions: f64,
    ) -> Self {
        let conversion_rate = if total_users > 0 {
            conversions as f64 / total_users as f64 * 100.0
        } else {
            0.0
        };

        Self {
            variant_id: variant_id.to_string(),
            variant_name: variant_name.to_string(),
            total_users,
            conversions,
            conversion_rate,
            avg_session_duration,
            avg_interactions,
        }
    }

    /// Conversion and user counts only, with no session metrics
    pub fn from_counts(variant_id: &str, total_users: u64, conversions: u64) -> Self {
        Self::new(variant_id, variant_id, total_users, conversions, 0.0, 0.0)
    }

    /// Users that did not convert (saturating: conversions can exceed users
    /// when a session converts more than once)
    pub fn non_conversions(&self) -> u64 {
        self.total_users.saturating_sub(self.conversions)
    }
}

/// Finalized results for every variant of one experiment, in first-seen order
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentResults {
    pub experiment_id: String,
    pub variants: Vec<VariantResults>,
}

impl ExperimentResults {
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn get(&self, variant_id: &str) -> Option<&VariantResults> {
        self.variants.iter().find(|v| v.variant_id == variant_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariantResults> {
        self.variants.iter()
    }
}

#[derive(Debug, Default)]
struct ExperimentAccumulator {
    variants: HashMap<String, VariantAccumulator>,
    order: Vec<String>,
}

/// Groups events by experiment and variant
#[derive(Debug, Default)]
pub struct Aggregator {
    experiments: HashMap<String, ExperimentAccumulator>,
    order: Vec<String>,
    ignored: u64,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregate a full event log in input order
    pub fn from_events(events: &[Event]) -> Self {
        let mut aggregator = Self::new();
        for event in events {
            aggregator.ingest(event);
        }
        tracing::info!(
            events = events.len(),
            experiments = aggregator.order.len(),
            ignored = aggregator.ignored,
            "aggregated events"
        );
        aggregator
    }

    /// Apply a single event
    ///
    /// Assignments and conversions missing `experimentId` or `variantId` are
    /// dropped and counted in [`Aggregator::ignored_events`] rather than
    /// grouped under an unnamed experiment or variant.
    pub fn ingest(&mut self, event: &Event) {
        match event.kind {
            EventKind::Assigned => self.record_assignment(event),
            EventKind::Conversion => self.record_conversion(event),
            // Durations would need a session -> variant join that the log
            // does not provide, so session metrics stay empty.
            EventKind::SessionEnd => {}
            EventKind::Other(_) => self.ignored += 1,
        }
    }

    fn record_assignment(&mut self, event: &Event) {
        let (Some(experiment_id), Some(variant_id)) = (&event.experiment_id, &event.variant_id)
        else {
            tracing::debug!(?event, "assignment without experiment or variant id");
            self.ignored += 1;
            return;
        };

        if !self.experiments.contains_key(experiment_id) {
            self.order.push(experiment_id.clone());
        }
        let experiment = self.experiments.entry(experiment_id.clone()).or_default();

        if !experiment.variants.contains_key(variant_id) {
            experiment.order.push(variant_id.clone());
        }
        let display_name = event.variant_name.as_deref().unwrap_or(variant_id.as_str());
        let variant = experiment
            .variants
            .entry(variant_id.clone())
            .or_insert_with(|| VariantAccumulator::new(display_name));

        variant.sessions.insert(event.session_id.clone());
    }

    fn record_conversion(&mut self, event: &Event) {
        let variant = match (&event.experiment_id, &event.variant_id) {
            (Some(experiment_id), Some(variant_id)) => self
                .experiments
                .get_mut(experiment_id)
                .and_then(|e| e.variants.get_mut(variant_id)),
            _ => None,
        };

        match variant {
            Some(variant) => variant.conversions += 1,
            None => {
                tracing::debug!(?event, "conversion for unassigned variant dropped");
                self.ignored += 1;
            }
        }
    }

    /// Experiment ids in the order they first appeared
    pub fn experiment_ids(&self) -> &[String] {
        &self.order
    }

    /// Events that were skipped (unknown names, unkeyed or orphan events)
    pub fn ignored_events(&self) -> u64 {
        self.ignored
    }

    /// Raw accumulator for one variant
    pub fn accumulator(
        &self,
        experiment_id: &str,
        variant_id: &str,
    ) -> Option<&VariantAccumulator> {
        self.experiments
            .get(experiment_id)?
            .variants
            .get(variant_id)
    }

    /// Finalized results for an experiment (empty when the id is unknown)
    pub fn variant_results(&self, experiment_id: &str) -> ExperimentResults {
        let variants = self
            .experiments
            .get(experiment_id)
            .map(|experiment| {
                experiment
                    .order
                    .iter()
                    .filter_map(|id| experiment.variants.get(id).map(|acc| acc.finalize(id)))
                    .collect()
            })
            .unwrap_or_default();

        ExperimentResults {
            experiment_id: experiment_id.to_string(),
            variants,
        }
    }
}
