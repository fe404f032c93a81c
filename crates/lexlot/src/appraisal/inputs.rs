//! Deal inputs and the coercion step that turns loosely typed form values into them.

use super::domain::Product;
use serde::{Deserialize, Serialize};

pub const MIN_TERM_YEARS: u32 = 1;
pub const MAX_TERM_YEARS: u32 = 50;

/// The subject deal. Numeric fields stay optional so partially completed forms still evaluate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DealInputs {
    pub price: Option<f64>,
    pub rent_monthly: Option<f64>,
    pub loan: Option<f64>,
    /// Annual interest rate in percent units, e.g. `5.5`.
    pub rate: Option<f64>,
    pub term_years: Option<u32>,
    pub costs_annual: Option<f64>,
    /// One-off purchase costs (legal fees, refurbishment) added to cash invested.
    pub upfront_costs: Option<f64>,
    pub product: Option<Product>,
    pub postcode: String,
    pub lender: String,
    pub include_sdlt: bool,
    pub scenario: Option<String>,
}

/// A value as it arrives from a form field or JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseValue {
    Number(f64),
    Flag(bool),
    Text(String),
}

impl From<&str> for LooseValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for LooseValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for LooseValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for LooseValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

/// Uncoerced deal form. Unknown keys are ignored so stray UI state never blocks evaluation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DealSubmission {
    pub price: Option<LooseValue>,
    #[serde(alias = "rent")]
    pub rent_monthly: Option<LooseValue>,
    pub loan: Option<LooseValue>,
    pub rate: Option<LooseValue>,
    #[serde(alias = "term")]
    pub term_years: Option<LooseValue>,
    #[serde(alias = "costs")]
    pub costs_annual: Option<LooseValue>,
    pub upfront_costs: Option<LooseValue>,
    pub product: Option<String>,
    pub postcode: Option<String>,
    pub lender: Option<String>,
    pub include_sdlt: Option<LooseValue>,
    pub scenario: Option<String>,
}

impl DealSubmission {
    pub fn coerce(&self) -> DealInputs {
        DealInputs {
            price: non_negative(self.price.as_ref().and_then(money)),
            rent_monthly: non_negative(self.rent_monthly.as_ref().and_then(money)),
            loan: non_negative(self.loan.as_ref().and_then(money)),
            rate: non_negative(self.rate.as_ref().and_then(percent)),
            term_years: self.term_years.as_ref().and_then(money).map(clamp_term),
            costs_annual: Some(floor_zero(self.costs_annual.as_ref().and_then(money))),
            upfront_costs: Some(floor_zero(self.upfront_costs.as_ref().and_then(money))),
            product: self.product.as_deref().and_then(parse_product),
            postcode: self
                .postcode
                .as_deref()
                .map(normalise_postcode)
                .unwrap_or_default(),
            lender: self
                .lender
                .as_deref()
                .map(|lender| lender.trim().to_string())
                .unwrap_or_default(),
            include_sdlt: self.include_sdlt.as_ref().map(flag).unwrap_or(false),
            scenario: self
                .scenario
                .as_deref()
                .map(str::trim)
                .filter(|label| !label.is_empty())
                .map(str::to_string),
        }
    }
}

/// Parses currency-formatted text such as `"£250,000"` or `"1_100"`.
pub fn parse_money(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, '£' | ',' | '_') && !ch.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Parses `"6.25%"` or `"6.25"` into percent units (`6.25`).
pub fn parse_percent(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_end_matches('%')
        .chars()
        .filter(|ch| *ch != ',')
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Accepts `true/false`, `1/0` and `yes/no`; anything else is `false`.
pub fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

pub fn parse_product(raw: &str) -> Option<Product> {
    let key: String = raw
        .trim()
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    match key.as_str() {
        "io" | "btlio" | "interestonly" => Some(Product::InterestOnly),
        "repay" | "repayment" | "btlrepay" => Some(Product::Repayment),
        _ => None,
    }
}

/// Uppercases, collapses whitespace, strips punctuation and inserts the inward-code space.
///
/// `"b3   2jr"` and `"b32jr"` both become `"B3 2JR"`.
pub fn normalise_postcode(raw: &str) -> String {
    let upper = raw.to_uppercase();
    let collapsed = upper.split_whitespace().collect::<Vec<_>>().join(" ");
    let cleaned: String = collapsed
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == ' ')
        .collect();
    let cleaned = cleaned.trim().to_string();

    if !cleaned.contains(' ') && cleaned.len() > 3 {
        let split = cleaned.len() - 3;
        return format!("{} {}", &cleaned[..split], &cleaned[split..]);
    }
    cleaned
}

fn money(value: &LooseValue) -> Option<f64> {
    match value {
        LooseValue::Number(number) if number.is_finite() => Some(*number),
        LooseValue::Number(_) | LooseValue::Flag(_) => None,
        LooseValue::Text(text) => parse_money(text),
    }
}

fn percent(value: &LooseValue) -> Option<f64> {
    match value {
        LooseValue::Number(number) if number.is_finite() => Some(*number),
        LooseValue::Number(_) | LooseValue::Flag(_) => None,
        LooseValue::Text(text) => parse_percent(text),
    }
}

fn flag(value: &LooseValue) -> bool {
    match value {
        LooseValue::Flag(flag) => *flag,
        LooseValue::Number(number) => *number == 1.0,
        LooseValue::Text(text) => parse_flag(text),
    }
}

fn non_negative(value: Option<f64>) -> Option<f64> {
    value.map(|number| number.max(0.0))
}

fn floor_zero(value: Option<f64>) -> f64 {
    value.unwrap_or(0.0).max(0.0)
}

fn clamp_term(years: f64) -> u32 {
    let rounded = years.round().clamp(MIN_TERM_YEARS as f64, MAX_TERM_YEARS as f64);
    rounded as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerces_formatted_strings_and_clamps() {
        let submission = DealSubmission {
            price: Some("£250,000".into()),
            rent_monthly: Some("1,100".into()),
            loan: Some("200000".into()),
            rate: Some("6.25%".into()),
            term_years: Some(120.0.into()),
            costs_annual: Some("-5".into()),
            product: Some("IO".to_string()),
            postcode: Some("b3   2jr".to_string()),
            include_sdlt: Some("true".into()),
            ..DealSubmission::default()
        };

        let inputs = submission.coerce();

        assert_eq!(inputs.price, Some(250_000.0));
        assert_eq!(inputs.rent_monthly, Some(1_100.0));
        assert_eq!(inputs.loan, Some(200_000.0));
        assert_eq!(inputs.rate, Some(6.25));
        assert_eq!(inputs.term_years, Some(50));
        assert_eq!(inputs.costs_annual, Some(0.0));
        assert_eq!(inputs.product, Some(Product::InterestOnly));
        assert_eq!(inputs.postcode, "B3 2JR");
        assert!(inputs.include_sdlt);
    }

    #[test]
    fn term_is_raised_to_one_year() {
        let submission = DealSubmission {
            term_years: Some("0.2".into()),
            ..DealSubmission::default()
        };
        assert_eq!(submission.coerce().term_years, Some(1));
    }

    #[test]
    fn unparseable_numbers_become_missing() {
        let submission = DealSubmission {
            price: Some("about two hundred".into()),
            rate: Some("%".into()),
            ..DealSubmission::default()
        };
        let inputs = submission.coerce();
        assert_eq!(inputs.price, None);
        assert_eq!(inputs.rate, None);
        assert_eq!(inputs.costs_annual, Some(0.0));
    }

    #[test]
    fn postcode_gets_inward_space() {
        assert_eq!(normalise_postcode("cf101aa"), "CF10 1AA");
        assert_eq!(normalise_postcode("  eh1 1aa "), "EH1 1AA");
        assert_eq!(normalise_postcode(""), "");
        assert_eq!(normalise_postcode("bt1"), "BT1");
    }

    #[test]
    fn flags_accept_common_spellings() {
        assert!(parse_flag("Yes"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("no"));
        assert!(!parse_flag("maybe"));
    }

    #[test]
    fn submission_deserializes_mixed_json() {
        let submission: DealSubmission = serde_json::from_str(
            r#"{"price":"£180,000","rent":950,"rate":"5.5%","term":25,"product":"Repay","includeSdlt":1,"patch":"ignored"}"#,
        )
        .expect("submission parses");
        let inputs = submission.coerce();
        assert_eq!(inputs.price, Some(180_000.0));
        assert_eq!(inputs.rent_monthly, Some(950.0));
        assert_eq!(inputs.term_years, Some(25));
        assert_eq!(inputs.product, Some(Product::Repayment));
        assert!(inputs.include_sdlt);
    }
}
