use super::domain::{BandSpec, MetricKey, Product, Region, TaxBand};
use super::inputs::DealInputs;
use super::region::region_from_postcode;
use super::rules::{DefaultBands, LenderProduct, RuleBook, UserPreferences};
use std::collections::BTreeMap;
use tracing::debug;

/// The lender product that applies to the deal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectedLender<'a> {
    pub lender_id: &'a str,
    pub name: &'a str,
    pub product: LenderProduct,
}

/// Configuration resolved for one evaluation. Borrowed from the rulebook and preferences,
/// never mutated.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub region: Region,
    pub tax_band: TaxBand,
    /// The deal's product, else the preferred one.
    pub product: Product,
    pub lender: Option<SelectedLender<'a>>,
    pub targets: &'a BTreeMap<MetricKey, Option<f64>>,
    pub region_bands: Option<&'a BTreeMap<MetricKey, BandSpec>>,
    pub defaults: &'a DefaultBands,
    pub weights: &'a BTreeMap<MetricKey, f64>,
    pub growth_annual: f64,
    /// Stress floor in percent for this region and lender.
    pub stress_floor_pct: f64,
}

impl<'a> EvaluationContext<'a> {
    /// Resolves region and lender for the deal against the supplied tables.
    pub fn build(inputs: &DealInputs, rules: &'a RuleBook, prefs: &'a UserPreferences) -> Self {
        let region = region_from_postcode(&inputs.postcode);
        let product = inputs.product.unwrap_or(prefs.product);
        let lender = select_lender(rules, &inputs.lender, product);

        let stress_floor_pct = match &lender {
            Some(selected) => selected.product.stress_rate_pct,
            None => rules.stress_floors.for_region(region),
        };

        Self {
            region,
            tax_band: prefs.tax_band,
            product,
            lender,
            targets: &prefs.targets,
            region_bands: rules.region_bands(region),
            defaults: &rules.defaults,
            weights: &prefs.weights,
            growth_annual: prefs.growth_annual,
            stress_floor_pct,
        }
    }

    pub fn target(&self, metric: MetricKey) -> Option<f64> {
        self.targets.get(&metric).copied().flatten()
    }

    pub fn region_band(&self, metric: MetricKey) -> Option<BandSpec> {
        self.region_bands
            .and_then(|bands| bands.get(&metric))
            .copied()
    }

    /// Stress rate in percent actually used for ICR: never below the deal's own rate.
    pub fn stress_rate_pct(&self, deal_rate_pct: f64) -> f64 {
        deal_rate_pct.max(self.stress_floor_pct)
    }
}

fn select_lender<'a>(
    rules: &'a RuleBook,
    query: &str,
    product: Product,
) -> Option<SelectedLender<'a>> {
    if query.trim().is_empty() {
        return None;
    }

    let Some(rule) = rules.lender(query) else {
        debug!(lender = query, "lender not recognised; using regional stress floor");
        return None;
    };

    rule.product(Some(product)).map(|selected| SelectedLender {
        lender_id: &rule.lender_id,
        name: &rule.name,
        product: *selected,
    })
}
