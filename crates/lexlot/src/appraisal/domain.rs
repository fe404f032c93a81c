use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse UK jurisdiction used for transaction tax and default thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Region {
    England,
    Wales,
    Scotland,
    #[serde(rename = "Northern Ireland")]
    NorthernIreland,
    Unknown,
}

impl Region {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::England,
            Self::Wales,
            Self::Scotland,
            Self::NorthernIreland,
            Self::Unknown,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::England => "England",
            Self::Wales => "Wales",
            Self::Scotland => "Scotland",
            Self::NorthernIreland => "Northern Ireland",
            Self::Unknown => "Unknown",
        }
    }

    /// Name of the transaction tax levied in the jurisdiction.
    pub const fn transaction_tax(self) -> &'static str {
        match self {
            Self::Wales => "LTT",
            Self::Scotland => "LBTT",
            Self::England | Self::NorthernIreland | Self::Unknown => "SDLT",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Mortgage product shape. An unset product is modelled as `Option<Product>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Product {
    #[serde(rename = "IO", alias = "io", alias = "BTL_IO")]
    InterestOnly,
    #[serde(rename = "REPAY", alias = "Repay", alias = "repay", alias = "BTL_Repay")]
    Repayment,
}

impl Product {
    pub const fn label(self) -> &'static str {
        match self {
            Self::InterestOnly => "Interest only",
            Self::Repayment => "Repayment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxBand {
    #[default]
    Basic,
    Higher,
    Additional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tenancy {
    #[default]
    Single,
    Hmo,
}

/// The eight scored metrics. Serialized with the short keys used in rule tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MetricKey {
    #[serde(rename = "gross")]
    GrossYield,
    #[serde(rename = "net")]
    NetYield,
    #[serde(rename = "coc")]
    CashOnCash,
    #[serde(rename = "icr")]
    Icr,
    #[serde(rename = "roi5")]
    Roi5,
    #[serde(rename = "breakeven")]
    BreakEvenOccupancy,
    #[serde(rename = "ltv")]
    Ltv,
    #[serde(rename = "sdlt")]
    SdltImpact,
}

impl MetricKey {
    pub const fn ordered() -> [Self; 8] {
        [
            Self::GrossYield,
            Self::NetYield,
            Self::CashOnCash,
            Self::Icr,
            Self::Roi5,
            Self::BreakEvenOccupancy,
            Self::Ltv,
            Self::SdltImpact,
        ]
    }

    /// Metrics the worst-of rating looks at.
    pub const fn headline() -> [Self; 3] {
        [Self::GrossYield, Self::Icr, Self::CashOnCash]
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::GrossYield => "gross",
            Self::NetYield => "net",
            Self::CashOnCash => "coc",
            Self::Icr => "icr",
            Self::Roi5 => "roi5",
            Self::BreakEvenOccupancy => "breakeven",
            Self::Ltv => "ltv",
            Self::SdltImpact => "sdlt",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::GrossYield => "Gross Yield",
            Self::NetYield => "Net Yield",
            Self::CashOnCash => "Cash-on-Cash",
            Self::Icr => "ICR (Stress)",
            Self::Roi5 => "ROI (5y)",
            Self::BreakEvenOccupancy => "Break-even Occupancy",
            Self::Ltv => "LTV",
            Self::SdltImpact => "SDLT Impact",
        }
    }

    /// `true` when smaller values are better.
    pub const fn inverted(self) -> bool {
        matches!(
            self,
            Self::BreakEvenOccupancy | Self::Ltv | Self::SdltImpact
        )
    }

    /// ICR is a raw multiple; every other metric is a fraction.
    pub const fn is_percentage(self) -> bool {
        !matches!(self, Self::Icr)
    }

    pub fn format_value(self, value: f64) -> String {
        match self {
            Self::Icr => format!("{value:.2}×"),
            Self::Ltv | Self::BreakEvenOccupancy => format!("{:.1}%", value * 100.0),
            _ => format!("{:.2}%", value * 100.0),
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Traffic-light outcome for a metric or an overall rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Colour {
    Green,
    Amber,
    Red,
}

impl Colour {
    pub const fn points(self) -> u8 {
        match self {
            Self::Green => 100,
            Self::Amber => 70,
            Self::Red => 40,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Green => "GREEN",
            Self::Amber => "AMBER",
            Self::Red => "RED",
        }
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Provenance of a resolved band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BandSource {
    User,
    Lender,
    Region,
    Default,
}

impl BandSource {
    pub const fn label(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Lender => "LENDER",
            Self::Region => "REGION",
            Self::Default => "DEFAULT",
        }
    }
}

/// Green/amber thresholds with direction and provenance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub green: f64,
    pub amber: f64,
    pub invert: bool,
    pub source: BandSource,
}

/// Threshold pair as written in rule tables; `invert` falls back to the metric's direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandSpec {
    #[serde(alias = "g")]
    pub green: f64,
    #[serde(alias = "a")]
    pub amber: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invert: Option<bool>,
}

impl BandSpec {
    pub const fn new(green: f64, amber: f64) -> Self {
        Self {
            green,
            amber,
            invert: None,
        }
    }

    pub const fn inverted(green: f64, amber: f64) -> Self {
        Self {
            green,
            amber,
            invert: Some(true),
        }
    }

    pub fn to_band(self, metric: MetricKey, source: BandSource) -> Band {
        Band {
            green: self.green,
            amber: self.amber,
            invert: self.invert.unwrap_or(metric.inverted()),
            source,
        }
    }
}
