use super::domain::{Band, Colour, MetricKey};
use super::rules::default_weights;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const GREEN_SCORE: u8 = 75;
pub const AMBER_SCORE: u8 = 60;

/// A scored metric, with the band that produced its colour for explainer output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    pub metric: MetricKey,
    pub value: f64,
    pub colour: Colour,
    pub points: u8,
    pub band: Band,
    /// Per-item weight; `None` defers to the composite's fallback table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl MetricResult {
    pub fn new(metric: MetricKey, value: f64, band: Band, weight: Option<f64>) -> Self {
        let colour = bandify(value, &band);
        Self {
            metric,
            value,
            colour,
            points: points(colour),
            band,
            weight,
        }
    }

    /// One-line explanation, e.g. `Net Yield 5.00% GREEN (USER: green 4.50%, amber 3.00%)`.
    pub fn explain(&self) -> String {
        let direction = if self.band.invert {
            ", lower is better"
        } else {
            ""
        };
        format!(
            "{} {} {} ({}: green {}, amber {}{})",
            self.metric.label(),
            self.metric.format_value(self.value),
            self.colour,
            self.band.source.label(),
            self.metric.format_value(self.band.green),
            self.metric.format_value(self.band.amber),
            direction
        )
    }
}

/// Traffic-lights a value. A value that is not a number is `Red`.
pub fn bandify(value: f64, band: &Band) -> Colour {
    if value.is_nan() {
        return Colour::Red;
    }

    if band.invert {
        if value <= band.green {
            Colour::Green
        } else if value <= band.amber {
            Colour::Amber
        } else {
            Colour::Red
        }
    } else if value >= band.green {
        Colour::Green
    } else if value >= band.amber {
        Colour::Amber
    } else {
        Colour::Red
    }
}

pub const fn points(colour: Colour) -> u8 {
    colour.points()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeScore {
    pub score: u8,
    pub overall: Colour,
}

pub fn overall_for_score(score: u8) -> Colour {
    if score >= GREEN_SCORE {
        Colour::Green
    } else if score >= AMBER_SCORE {
        Colour::Amber
    } else {
        Colour::Red
    }
}

/// Weighted average of points on a 0-100 scale.
///
/// Items without their own weight use `fallback_weights`; non-positive weights are skipped.
/// With no usable weight at all the score is 0.
pub fn composite(
    results: &[MetricResult],
    fallback_weights: &BTreeMap<MetricKey, f64>,
) -> CompositeScore {
    let mut raw = 0.0;
    let mut total = 0.0;

    for result in results {
        let weight = result
            .weight
            .or_else(|| fallback_weights.get(&result.metric).copied())
            .filter(|weight| weight.is_finite())
            .unwrap_or(0.0);
        if weight <= 0.0 {
            continue;
        }
        raw += f64::from(result.points) * weight;
        total += weight;
    }

    let average = if total > 0.0 { raw / total } else { 0.0 };
    let score = average.round().clamp(0.0, 100.0) as u8;

    CompositeScore {
        score,
        overall: overall_for_score(score),
    }
}

/// The worst colour among `metrics`. Metrics missing from `results` are ignored.
pub fn worst_of(results: &[MetricResult], metrics: &[MetricKey]) -> Colour {
    results
        .iter()
        .filter(|result| metrics.contains(&result.metric))
        .map(|result| result.colour)
        .max()
        .unwrap_or(Colour::Green)
}

/// An overall rating. Only the weighted strategy produces a numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub overall: Colour,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
}

/// A strategy for collapsing per-metric results into one rating.
pub trait Scorer: Send + Sync {
    fn name(&self) -> &'static str;

    fn rate(&self, results: &[MetricResult]) -> Rating;
}

/// Weighted points across every scored metric.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedComposite {
    fallback_weights: BTreeMap<MetricKey, f64>,
}

impl WeightedComposite {
    pub fn new(fallback_weights: BTreeMap<MetricKey, f64>) -> Self {
        Self { fallback_weights }
    }

    pub fn standard() -> Self {
        Self::new(default_weights())
    }

    pub fn score(&self, results: &[MetricResult]) -> CompositeScore {
        composite(results, &self.fallback_weights)
    }
}

impl Scorer for WeightedComposite {
    fn name(&self) -> &'static str {
        "weighted_composite"
    }

    fn rate(&self, results: &[MetricResult]) -> Rating {
        let CompositeScore { score, overall } = self.score(results);
        Rating {
            overall,
            score: Some(score),
        }
    }
}

/// The most conservative colour across the headline metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlineWorstOf {
    metrics: Vec<MetricKey>,
}

impl HeadlineWorstOf {
    pub fn new(metrics: Vec<MetricKey>) -> Self {
        Self { metrics }
    }

    /// Gross yield, ICR and cash-on-cash.
    pub fn standard() -> Self {
        Self::new(MetricKey::headline().to_vec())
    }
}

impl Scorer for HeadlineWorstOf {
    fn name(&self) -> &'static str {
        "headline_worst_of"
    }

    fn rate(&self, results: &[MetricResult]) -> Rating {
        Rating {
            overall: worst_of(results, &self.metrics),
            score: None,
        }
    }
}
