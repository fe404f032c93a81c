//! Read-only rule tables the host supplies: lender products, regional bands, defaults,
//! stress floors, and the user's preferences.

use super::domain::{BandSpec, MetricKey, Product, Region, TaxBand, Tenancy};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::warn;

/// Floor applied when neither a lender nor a regional floor is known, in percent.
pub const GENERIC_STRESS_FLOOR_PCT: f64 = 5.5;

/// Capital growth assumed by the five-year ROI when preferences do not say otherwise.
pub const DEFAULT_GROWTH_ANNUAL: f64 = 0.02;

/// One mortgage product's affordability rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LenderProduct {
    pub code: Product,
    pub max_ltv: f64,
    pub icr_basic: f64,
    pub icr_higher: f64,
    /// Stress rate in percent units, e.g. `7.0`.
    #[serde(alias = "stressRate")]
    pub stress_rate_pct: f64,
}

impl LenderProduct {
    /// ICR floor for the borrower's tax band. Additional-rate payers use the higher floor.
    pub fn icr_floor(&self, tax_band: TaxBand) -> f64 {
        match tax_band {
            TaxBand::Basic => self.icr_basic,
            TaxBand::Higher | TaxBand::Additional => self.icr_higher,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LenderRule {
    pub lender_id: String,
    pub name: String,
    pub products: Vec<LenderProduct>,
}

impl LenderRule {
    /// Case-insensitive match against the id or the display name.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        !query.is_empty()
            && (self.lender_id.eq_ignore_ascii_case(query) || self.name.eq_ignore_ascii_case(query))
    }

    /// The product for `preferred`, else the first listed product.
    pub fn product(&self, preferred: Option<Product>) -> Option<&LenderProduct> {
        preferred
            .and_then(|code| self.products.iter().find(|product| product.code == code))
            .or_else(|| self.products.first())
    }
}

/// Default bands, one field per metric so the table is complete by construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DefaultBands {
    pub gross: BandSpec,
    pub net: BandSpec,
    pub coc: BandSpec,
    pub icr: BandSpec,
    pub roi5: BandSpec,
    pub breakeven: BandSpec,
    pub ltv: BandSpec,
    pub sdlt: BandSpec,
}

impl DefaultBands {
    pub const fn standard() -> Self {
        Self {
            gross: BandSpec::new(0.07, 0.05),
            net: BandSpec::new(0.045, 0.03),
            coc: BandSpec::new(0.10, 0.07),
            icr: BandSpec::new(1.45, 1.25),
            roi5: BandSpec::new(0.50, 0.30),
            breakeven: BandSpec::inverted(0.80, 0.90),
            ltv: BandSpec::inverted(0.75, 0.80),
            sdlt: BandSpec::inverted(0.03, 0.05),
        }
    }

    pub const fn get(&self, metric: MetricKey) -> BandSpec {
        match metric {
            MetricKey::GrossYield => self.gross,
            MetricKey::NetYield => self.net,
            MetricKey::CashOnCash => self.coc,
            MetricKey::Icr => self.icr,
            MetricKey::Roi5 => self.roi5,
            MetricKey::BreakEvenOccupancy => self.breakeven,
            MetricKey::Ltv => self.ltv,
            MetricKey::SdltImpact => self.sdlt,
        }
    }
}

impl Default for DefaultBands {
    fn default() -> Self {
        Self::standard()
    }
}

pub type RegionBandTable = BTreeMap<Region, BTreeMap<MetricKey, BandSpec>>;

/// Stress-rate floors in percent for deals without a recognised lender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StressFloors {
    pub generic_pct: f64,
    pub by_region: BTreeMap<Region, f64>,
}

impl StressFloors {
    pub fn standard() -> Self {
        let by_region = Region::ordered()
            .into_iter()
            .map(|region| {
                let floor = match region {
                    Region::Scotland => 6.0,
                    _ => GENERIC_STRESS_FLOOR_PCT,
                };
                (region, floor)
            })
            .collect();
        Self {
            generic_pct: GENERIC_STRESS_FLOOR_PCT,
            by_region,
        }
    }

    pub fn for_region(&self, region: Region) -> f64 {
        self.by_region
            .get(&region)
            .copied()
            .unwrap_or(self.generic_pct)
    }
}

impl Default for StressFloors {
    fn default() -> Self {
        Self::standard()
    }
}

/// All static thresholds the engine consults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuleBook {
    pub lenders: Vec<LenderRule>,
    pub region_bands: RegionBandTable,
    pub defaults: DefaultBands,
    pub stress_floors: StressFloors,
}

impl RuleBook {
    pub fn standard() -> Self {
        Self {
            lenders: standard_lenders(),
            region_bands: standard_region_bands(),
            defaults: DefaultBands::standard(),
            stress_floors: StressFloors::standard(),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RuleBookError> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RuleBookError> {
        let book: Self = serde_json::from_reader(reader)?;
        book.validate()?;
        Ok(book)
    }

    /// Rejects tables that would make lender lookups ambiguous or unusable.
    pub fn validate(&self) -> Result<(), RuleBookError> {
        let mut seen = HashSet::new();
        for lender in &self.lenders {
            if lender.products.is_empty() {
                return Err(RuleBookError::LenderWithoutProducts(lender.lender_id.clone()));
            }
            if !seen.insert(lender.lender_id.to_ascii_lowercase()) {
                return Err(RuleBookError::DuplicateLender(lender.lender_id.clone()));
            }
            for product in &lender.products {
                let values = [
                    product.max_ltv,
                    product.icr_basic,
                    product.icr_higher,
                    product.stress_rate_pct,
                ];
                if values.iter().any(|value| !value.is_finite()) {
                    return Err(RuleBookError::NonFinite {
                        lender_id: lender.lender_id.clone(),
                    });
                }
            }
        }

        for (region, bands) in &self.region_bands {
            for (metric, spec) in bands {
                if !spec.green.is_finite() || !spec.amber.is_finite() {
                    warn!(
                        %region,
                        %metric,
                        "regional band is not finite; hardening will repair it"
                    );
                }
            }
        }

        Ok(())
    }

    pub fn lender(&self, query: &str) -> Option<&LenderRule> {
        self.lenders.iter().find(|lender| lender.matches(query))
    }

    pub fn region_bands(&self, region: Region) -> Option<&BTreeMap<MetricKey, BandSpec>> {
        self.region_bands.get(&region)
    }
}

impl Default for RuleBook {
    fn default() -> Self {
        Self::standard()
    }
}

/// The investor's own settings: scoring weights, per-metric targets and tax position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreferences {
    pub tenancy: Tenancy,
    pub tax_band: TaxBand,
    pub product: Product,
    pub weights: BTreeMap<MetricKey, f64>,
    /// A `null` target means the metric has none.
    pub targets: BTreeMap<MetricKey, Option<f64>>,
    pub growth_annual: f64,
}

impl UserPreferences {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PreferencesError> {
        let file = File::open(path.as_ref())?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    pub fn target(&self, metric: MetricKey) -> Option<f64> {
        self.targets.get(&metric).copied().flatten()
    }

    pub fn with_target(mut self, metric: MetricKey, target: f64) -> Self {
        self.targets.insert(metric, Some(target));
        self
    }
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            tenancy: Tenancy::Single,
            tax_band: TaxBand::Basic,
            product: Product::InterestOnly,
            weights: default_weights(),
            targets: BTreeMap::new(),
            growth_annual: DEFAULT_GROWTH_ANNUAL,
        }
    }
}

/// Composite weights used when an item carries none of its own.
pub fn default_weights() -> BTreeMap<MetricKey, f64> {
    BTreeMap::from([
        (MetricKey::NetYield, 18.0),
        (MetricKey::CashOnCash, 18.0),
        (MetricKey::Icr, 16.0),
        (MetricKey::Roi5, 14.0),
        (MetricKey::BreakEvenOccupancy, 10.0),
        (MetricKey::Ltv, 10.0),
        (MetricKey::GrossYield, 6.0),
        (MetricKey::SdltImpact, 4.0),
    ])
}

#[derive(Debug, thiserror::Error)]
pub enum RuleBookError {
    #[error("failed to read rulebook: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid rulebook JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("lender {0} lists no products")]
    LenderWithoutProducts(String),
    #[error("lender {0} is listed more than once")]
    DuplicateLender(String),
    #[error("lender {lender_id} has a non-finite product value")]
    NonFinite { lender_id: String },
}

#[derive(Debug, thiserror::Error)]
pub enum PreferencesError {
    #[error("failed to read preferences: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid preferences JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn lender(id: &str, name: &str, max_ltv: f64, stress_rate_pct: f64) -> LenderRule {
    LenderRule {
        lender_id: id.to_string(),
        name: name.to_string(),
        products: vec![
            LenderProduct {
                code: Product::InterestOnly,
                max_ltv,
                icr_basic: 1.25,
                icr_higher: 1.45,
                stress_rate_pct,
            },
            LenderProduct {
                code: Product::Repayment,
                max_ltv,
                icr_basic: 1.25,
                icr_higher: 1.45,
                stress_rate_pct,
            },
        ],
    }
}

fn standard_lenders() -> Vec<LenderRule> {
    vec![
        lender("natwest", "NatWest", 0.75, 7.0),
        lender("barclays", "Barclays", 0.75, 6.75),
        lender("bm-solutions", "BM Solutions", 0.75, 7.0),
        lender("skipton", "Skipton", 0.80, 6.5),
        lender("tsb", "TSB", 0.75, 6.75),
        lender("generic", "Generic", 0.75, GENERIC_STRESS_FLOOR_PCT),
    ]
}

fn standard_region_bands() -> RegionBandTable {
    let devolved = |gross: BandSpec| {
        BTreeMap::from([
            (MetricKey::GrossYield, gross),
            (MetricKey::NetYield, BandSpec::new(0.05, 0.035)),
        ])
    };

    BTreeMap::from([
        (Region::Wales, devolved(BandSpec::new(0.075, 0.055))),
        (Region::Scotland, devolved(BandSpec::new(0.075, 0.055))),
        (Region::NorthernIreland, devolved(BandSpec::new(0.08, 0.06))),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lender_lookup_ignores_case_and_accepts_names() {
        let book = RuleBook::standard();
        assert_eq!(
            book.lender("NATWEST").map(|rule| rule.name.as_str()),
            Some("NatWest")
        );
        assert_eq!(
            book.lender("bm solutions").map(|rule| rule.lender_id.as_str()),
            Some("bm-solutions")
        );
        assert!(book.lender("").is_none());
        assert!(book.lender("Monzo").is_none());
    }

    #[test]
    fn product_selection_falls_back_to_first() {
        let mut rule = lender("x", "X", 0.7, 6.0);
        rule.products.truncate(1);
        let product = rule.product(Some(Product::Repayment)).expect("fallback");
        assert_eq!(product.code, Product::InterestOnly);
    }

    #[test]
    fn rulebook_parses_short_band_keys() {
        let json = r#"{
            "lenders": [{"lenderId": "acme", "name": "Acme", "products": [
                {"code": "BTL_IO", "maxLtv": 0.7, "icrBasic": 1.3, "icrHigher": 1.5, "stressRate": 6.25}
            ]}],
            "regionBands": {"Scotland": {"gross": {"g": 0.08, "a": 0.06}}}
        }"#;
        let book = RuleBook::from_reader(json.as_bytes()).expect("rulebook parses");
        let acme = book.lender("acme").expect("lender present");
        assert_eq!(acme.products[0].stress_rate_pct, 6.25);
        let scotland = book.region_bands(Region::Scotland).expect("bands present");
        assert_eq!(scotland[&MetricKey::GrossYield].green, 0.08);
        assert_eq!(book.defaults, DefaultBands::standard());
    }

    #[test]
    fn rulebook_rejects_lender_without_products() {
        let json = r#"{"lenders": [{"lenderId": "empty", "name": "Empty", "products": []}]}"#;
        match RuleBook::from_reader(json.as_bytes()) {
            Err(RuleBookError::LenderWithoutProducts(id)) => assert_eq!(id, "empty"),
            other => panic!("expected missing products error, got {other:?}"),
        }
    }

    #[test]
    fn rulebook_rejects_duplicate_lenders() {
        let mut book = RuleBook::standard();
        book.lenders.push(lender("NatWest", "NatWest again", 0.7, 7.0));
        assert!(matches!(
            book.validate(),
            Err(RuleBookError::DuplicateLender(_))
        ));
    }

    #[test]
    fn preferences_default_weights_cover_every_metric() {
        let prefs = UserPreferences::default();
        for metric in MetricKey::ordered() {
            assert!(prefs.weights.contains_key(&metric), "{metric} missing");
        }
        assert!(prefs.targets.is_empty());
    }

    #[test]
    fn preferences_parse_partial_json() {
        let prefs: UserPreferences =
            serde_json::from_str(r#"{"taxBand": "higher", "targets": {"net": 0.06}}"#)
                .expect("preferences parse");
        assert_eq!(prefs.tax_band, TaxBand::Higher);
        assert_eq!(prefs.target(MetricKey::NetYield), Some(0.06));
        assert_eq!(prefs.weights, default_weights());
    }

    #[test]
    fn null_target_means_no_target() {
        let prefs: UserPreferences =
            serde_json::from_str(r#"{"targets": {"net": null, "coc": 0.12}}"#)
                .expect("preferences parse");
        assert_eq!(prefs.target(MetricKey::NetYield), None);
        assert_eq!(prefs.target(MetricKey::CashOnCash), Some(0.12));
    }
}
