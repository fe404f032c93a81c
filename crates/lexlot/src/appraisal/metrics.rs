use super::context::EvaluationContext;
use super::domain::{MetricKey, Product, Region};
use super::finance::{self, RoiInputs};
use super::inputs::DealInputs;
use super::rules::{RuleBook, UserPreferences};
use super::sdlt;
use serde::Serialize;
use std::sync::OnceLock;

/// Term assumed when the deal leaves it blank.
pub const DEFAULT_TERM_YEARS: u32 = 25;
/// Cash invested never drops below one currency unit.
pub const MIN_CASH_INVESTED: f64 = 1.0;

/// Derived figures for one deal. Fields ending in `_pct` are percent units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub region: Region,
    pub gross_yield_pct: f64,
    pub net_yield_pct: f64,
    pub icr: f64,
    pub stress_used_pct: f64,
    pub monthly_debt_service: f64,
    pub annual_debt_service: f64,
    pub annual_cashflow: f64,
    pub cash_invested: f64,
    pub coc_pct: f64,
    pub roi5_pct: f64,
    pub break_even_occ_pct: f64,
    pub ltv_pct: f64,
    pub sdlt_amount: f64,
    pub sdlt_impact_pct: f64,
    /// Unscaled values as scored, so thresholds compare without a percent round trip.
    #[serde(skip)]
    scored: ScoredValues,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ScoredValues {
    gross: f64,
    net: f64,
    coc: f64,
    icr: f64,
    roi5: f64,
    breakeven: f64,
    ltv: f64,
    sdlt: f64,
}

impl Metrics {
    /// The value scored for `metric`: a fraction, or the raw multiple for ICR.
    pub fn value(&self, metric: MetricKey) -> f64 {
        let scored = &self.scored;
        match metric {
            MetricKey::GrossYield => scored.gross,
            MetricKey::NetYield => scored.net,
            MetricKey::CashOnCash => scored.coc,
            MetricKey::Icr => scored.icr,
            MetricKey::Roi5 => scored.roi5,
            MetricKey::BreakEvenOccupancy => scored.breakeven,
            MetricKey::Ltv => scored.ltv,
            MetricKey::SdltImpact => scored.sdlt,
        }
    }
}

/// Metrics against the built-in rulebook and default preferences.
pub fn compute_metrics_with_region(inputs: &DealInputs) -> Metrics {
    let (rules, prefs) = standard_tables();
    let ctx = EvaluationContext::build(inputs, rules, prefs);
    compute_metrics(inputs, &ctx)
}

fn standard_tables() -> &'static (RuleBook, UserPreferences) {
    static TABLES: OnceLock<(RuleBook, UserPreferences)> = OnceLock::new();
    TABLES.get_or_init(|| (RuleBook::standard(), UserPreferences::default()))
}

pub fn compute_metrics(inputs: &DealInputs, ctx: &EvaluationContext<'_>) -> Metrics {
    let price = amount(inputs.price);
    let rent_monthly = amount(inputs.rent_monthly);
    let loan = amount(inputs.loan);
    let rate_pct = amount(inputs.rate);
    let costs_annual = amount(inputs.costs_annual);
    let upfront_costs = amount(inputs.upfront_costs);
    let term_years = f64::from(inputs.term_years.unwrap_or(DEFAULT_TERM_YEARS));

    let rent_annual = finance::to_annual(rent_monthly);
    let rate_annual = rate_pct / 100.0;

    let monthly_debt_service = match ctx.product {
        Product::InterestOnly => finance::io_monthly(rate_annual, loan),
        Product::Repayment => finance::pmt_monthly(rate_annual, term_years, loan),
    };
    let annual_debt_service = finance::to_annual(monthly_debt_service);

    let stress_used_pct = ctx.stress_rate_pct(rate_pct);
    let stressed_monthly = finance::io_monthly(stress_used_pct / 100.0, loan);

    let sdlt_amount = sdlt::compute_sdlt(price, ctx.region, true);
    let annual_cashflow = rent_annual - costs_annual - annual_debt_service;

    let equity = (price - loan).max(0.0);
    let sdlt_paid = if inputs.include_sdlt { sdlt_amount } else { 0.0 };
    let cash_invested = (equity + upfront_costs + sdlt_paid).max(MIN_CASH_INVESTED);

    let roi5 = finance::roi_5_years(RoiInputs {
        annual_net_cash: annual_cashflow,
        monthly_payment: match ctx.product {
            Product::InterestOnly => 0.0,
            Product::Repayment => monthly_debt_service,
        },
        rate_annual,
        term_years,
        loan,
        price,
        growth_annual: ctx.growth_annual,
        cash_invested,
    });

    let scored = ScoredValues {
        gross: finite(finance::gross_yield(price, rent_annual)),
        net: finite(finance::net_yield(price, rent_annual, costs_annual)),
        coc: finite(finance::cash_on_cash(annual_cashflow, cash_invested)),
        icr: finite(finance::icr(rent_monthly, stressed_monthly)),
        roi5: finite(roi5),
        breakeven: finite(finance::break_even_occupancy(
            costs_annual,
            annual_debt_service,
            rent_annual,
        )),
        ltv: finite(finance::ltv(loan, price)),
        sdlt: finite(sdlt::sdlt_impact(price, sdlt_amount)),
    };

    Metrics {
        region: ctx.region,
        gross_yield_pct: percent(scored.gross),
        net_yield_pct: percent(scored.net),
        icr: scored.icr,
        stress_used_pct,
        monthly_debt_service: finite(monthly_debt_service),
        annual_debt_service: finite(annual_debt_service),
        annual_cashflow: finite(annual_cashflow),
        cash_invested,
        coc_pct: percent(scored.coc),
        roi5_pct: percent(scored.roi5),
        break_even_occ_pct: percent(scored.breakeven),
        ltv_pct: percent(scored.ltv),
        sdlt_amount,
        sdlt_impact_pct: percent(scored.sdlt),
        scored,
    }
}

fn amount(value: Option<f64>) -> f64 {
    value.filter(|value| value.is_finite()).unwrap_or(0.0)
}

fn finite(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn percent(fraction: f64) -> f64 {
    finite(fraction * 100.0)
}
