//! Buy-to-let deal appraisal.
//!
//! Raw [`DealInputs`] flow one way: optional scenario perturbation, then [`compute_metrics`],
//! then per-metric band resolution through the [`ThresholdCascade`], then scoring. Every step is
//! a pure function of the deal and an immutable [`EvaluationContext`], so one appraiser can be
//! shared across threads and called on every keystroke.

pub mod bands;
pub mod context;
pub mod domain;
pub mod finance;
pub mod inputs;
pub mod metrics;
pub mod region;
pub mod rules;
pub mod scenario;
pub mod scoring;
pub mod sdlt;

#[cfg(test)]
mod tests;

pub use bands::{
    harden_band, resolve_bands, BandResolver, DefaultTableResolver, LenderRuleResolver,
    RegionTableResolver, ThresholdCascade, UserTargetResolver,
};
pub use context::{EvaluationContext, SelectedLender};
pub use domain::{Band, BandSource, BandSpec, Colour, MetricKey, Product, Region, TaxBand, Tenancy};
pub use inputs::{DealInputs, DealSubmission, LooseValue};
pub use metrics::{compute_metrics, compute_metrics_with_region, Metrics};
pub use region::region_from_postcode;
pub use rules::{
    LenderProduct, LenderRule, PreferencesError, RuleBook, RuleBookError, UserPreferences,
};
pub use scenario::{apply_scenario, confidence_bump, list_scenarios, ScenarioDef, ScenarioKey};
pub use scoring::{
    bandify, composite, points, worst_of, CompositeScore, HeadlineWorstOf, MetricResult, Rating,
    Scorer, WeightedComposite,
};
pub use sdlt::compute_sdlt;

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Stateless appraiser holding the read-only tables every evaluation consults.
pub struct DealAppraiser {
    rules: RuleBook,
    preferences: UserPreferences,
    cascade: ThresholdCascade,
    composite: WeightedComposite,
    headline: HeadlineWorstOf,
}

impl DealAppraiser {
    pub fn new(rules: RuleBook, preferences: UserPreferences) -> Self {
        Self {
            rules,
            preferences,
            cascade: ThresholdCascade::standard(),
            composite: WeightedComposite::standard(),
            headline: HeadlineWorstOf::standard(),
        }
    }

    /// Built-in rulebook with default preferences.
    pub fn standard() -> Self {
        Self::new(RuleBook::standard(), UserPreferences::default())
    }

    pub fn with_cascade(mut self, cascade: ThresholdCascade) -> Self {
        self.cascade = cascade;
        self
    }

    pub fn preferences(&self) -> &UserPreferences {
        &self.preferences
    }

    pub fn cascade(&self) -> &ThresholdCascade {
        &self.cascade
    }

    pub fn context<'a>(&'a self, inputs: &DealInputs) -> EvaluationContext<'a> {
        EvaluationContext::build(inputs, &self.rules, &self.preferences)
    }

    pub fn appraise(&self, inputs: &DealInputs) -> DealAppraisal {
        let ctx = self.context(inputs);
        let metrics = compute_metrics(inputs, &ctx);

        let results: Vec<MetricResult> = MetricKey::ordered()
            .into_iter()
            .map(|metric| {
                let band = self.cascade.resolve(metric, &ctx);
                let weight = ctx.weights.get(&metric).copied();
                MetricResult::new(metric, metrics.value(metric), band, weight)
            })
            .collect();

        let composite = self.composite.score(&results);
        let headline = self.headline.rate(&results).overall;

        debug!(
            region = %metrics.region,
            lender = ctx.lender.map(|lender| lender.lender_id),
            score = composite.score,
            overall = %composite.overall,
            headline = %headline,
            "deal appraised"
        );

        DealAppraisal {
            metrics,
            results,
            composite,
            headline,
            product: ctx.product,
            lender: ctx.lender.map(|lender| lender.name.to_string()),
        }
    }

    pub fn appraise_scenario(&self, inputs: &DealInputs, key: ScenarioKey) -> ScenarioOutcome {
        let perturbed = apply_scenario(inputs, key);
        let appraisal = self.appraise(&perturbed);

        trace!(
            scenario = %key,
            score = appraisal.composite.score,
            overall = %appraisal.composite.overall,
            "scenario scored"
        );

        ScenarioOutcome {
            key,
            label: key.label(),
            inputs: perturbed,
            appraisal,
        }
    }

    /// Runs every scenario from the same base deal and summarises them.
    pub fn analyse(&self, inputs: &DealInputs) -> ScenarioAnalysis {
        let outcomes: Vec<ScenarioOutcome> = ScenarioKey::ALL
            .into_iter()
            .map(|key| self.appraise_scenario(inputs, key))
            .collect();

        let by_scenario = overall_by_scenario(&outcomes);
        let bump = confidence_bump(&by_scenario);
        let explainer = explain(&outcomes, &by_scenario, bump);

        ScenarioAnalysis {
            outcomes,
            confidence_bump: bump,
            explainer,
        }
    }
}

impl Default for DealAppraiser {
    fn default() -> Self {
        Self::standard()
    }
}

/// Result of appraising one deal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DealAppraisal {
    pub metrics: Metrics,
    pub results: Vec<MetricResult>,
    pub composite: CompositeScore,
    /// Worst colour among gross yield, ICR and cash-on-cash.
    pub headline: Colour,
    /// Product the debt service was modelled on.
    pub product: Product,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lender: Option<String>,
}

impl DealAppraisal {
    pub fn result(&self, metric: MetricKey) -> Option<&MetricResult> {
        self.results.iter().find(|result| result.metric == metric)
    }

    /// One line per metric stating its value, colour and the band that decided it.
    pub fn explain(&self) -> Vec<String> {
        self.results.iter().map(MetricResult::explain).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioOutcome {
    pub key: ScenarioKey,
    pub label: &'static str,
    pub inputs: DealInputs,
    pub appraisal: DealAppraisal,
}

/// All five scenarios with the advisory confidence bump.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioAnalysis {
    pub outcomes: Vec<ScenarioOutcome>,
    /// Not applied to any score; hosts decide how to show it.
    pub confidence_bump: i8,
    pub explainer: Vec<String>,
}

impl ScenarioAnalysis {
    pub fn outcome(&self, key: ScenarioKey) -> Option<&ScenarioOutcome> {
        self.outcomes.iter().find(|outcome| outcome.key == key)
    }

    pub fn base(&self) -> Option<&ScenarioOutcome> {
        self.outcome(ScenarioKey::Base)
    }

    pub fn overall_by_scenario(&self) -> BTreeMap<ScenarioKey, Colour> {
        overall_by_scenario(&self.outcomes)
    }
}

fn overall_by_scenario(outcomes: &[ScenarioOutcome]) -> BTreeMap<ScenarioKey, Colour> {
    outcomes
        .iter()
        .map(|outcome| (outcome.key, outcome.appraisal.composite.overall))
        .collect()
}

fn explain(
    outcomes: &[ScenarioOutcome],
    by_scenario: &BTreeMap<ScenarioKey, Colour>,
    bump: i8,
) -> Vec<String> {
    let Some(base) = outcomes.iter().find(|outcome| outcome.key == ScenarioKey::Base) else {
        return Vec::new();
    };
    let appraisal = &base.appraisal;

    let mut lines = vec![format!(
        "Composite {}/100 {}; headline {}",
        appraisal.composite.score, appraisal.composite.overall, appraisal.headline
    )];
    lines.extend(appraisal.explain());

    let greens = by_scenario
        .values()
        .filter(|colour| **colour == Colour::Green)
        .count();
    lines.push(format!(
        "Confidence {bump:+}: {greens} of {} scenarios GREEN",
        by_scenario.len()
    ));

    lines
}
