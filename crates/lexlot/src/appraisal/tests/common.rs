use crate::appraisal::domain::{Band, BandSource, MetricKey};
use crate::appraisal::inputs::DealInputs;
use crate::appraisal::rules::{RuleBook, UserPreferences};
use crate::appraisal::scoring::MetricResult;

pub(super) const EPSILON: f64 = 1e-9;

pub(super) fn close(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < EPSILON
}

/// A Birmingham flat on an interest-only loan.
pub(super) fn england_deal() -> DealInputs {
    DealInputs {
        price: Some(200_000.0),
        rent_monthly: Some(1_000.0),
        loan: Some(150_000.0),
        rate: Some(5.0),
        term_years: Some(25),
        costs_annual: Some(1_200.0),
        postcode: "B3 2JR".to_string(),
        ..DealInputs::default()
    }
}

pub(super) fn deal_in(postcode: &str, lender: &str) -> DealInputs {
    DealInputs {
        postcode: postcode.to_string(),
        lender: lender.to_string(),
        ..england_deal()
    }
}

pub(super) fn rules() -> RuleBook {
    RuleBook::standard()
}

pub(super) fn preferences() -> UserPreferences {
    UserPreferences::default()
}

pub(super) fn band(green: f64, amber: f64, invert: bool) -> Band {
    Band {
        green,
        amber,
        invert,
        source: BandSource::Default,
    }
}

pub(super) fn result(
    metric: MetricKey,
    value: f64,
    band: Band,
    weight: Option<f64>,
) -> MetricResult {
    MetricResult::new(metric, value, band, weight)
}
