//! Named stress scenarios. Each one perturbs the base deal independently; scenarios never chain.

use super::domain::Colour;
use super::inputs::DealInputs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ScenarioKey {
    #[serde(rename = "BASE")]
    Base,
    #[serde(rename = "RATE_UP_200")]
    RateUp200,
    #[serde(rename = "VOID_2M")]
    Void2m,
    #[serde(rename = "COSTS_UP_15")]
    CostsUp15,
    #[serde(rename = "RENT_DOWN_10")]
    RentDown10,
}

impl ScenarioKey {
    pub const ALL: [Self; 5] = [
        Self::Base,
        Self::RateUp200,
        Self::Void2m,
        Self::CostsUp15,
        Self::RentDown10,
    ];

    pub const fn code(self) -> &'static str {
        match self {
            Self::Base => "BASE",
            Self::RateUp200 => "RATE_UP_200",
            Self::Void2m => "VOID_2M",
            Self::CostsUp15 => "COSTS_UP_15",
            Self::RentDown10 => "RENT_DOWN_10",
        }
    }

    pub fn definition(self) -> &'static ScenarioDef {
        // SCENARIOS is indexed in ALL order.
        &SCENARIOS[self as usize]
    }

    pub fn label(self) -> &'static str {
        self.definition().label
    }
}

impl fmt::Display for ScenarioKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown scenario `{0}`")]
pub struct UnknownScenario(pub String);

impl FromStr for ScenarioKey {
    type Err = UnknownScenario;

    /// Accepts codes in any case, with `-` or `_`, or the display label.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let wanted = trimmed.replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|key| {
                key.code().eq_ignore_ascii_case(&wanted)
                    || key.label().eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| UnknownScenario(raw.to_string()))
    }
}

/// How a scenario changes the deal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Perturbation {
    Identity,
    /// Adds percentage points to the rate; a missing rate counts as zero.
    RateShift(f64),
    RentScale(f64),
    /// Scales annual costs and rounds to whole currency units.
    CostsScale(f64),
}

impl Perturbation {
    pub fn apply(self, inputs: &DealInputs) -> DealInputs {
        let mut next = inputs.clone();
        match self {
            Self::Identity => {}
            Self::RateShift(points) => {
                next.rate = Some(inputs.rate.unwrap_or(0.0) + points);
            }
            Self::RentScale(factor) => {
                next.rent_monthly = inputs.rent_monthly.map(|rent| rent * factor);
            }
            Self::CostsScale(factor) => {
                next.costs_annual = inputs.costs_annual.map(|costs| (costs * factor).round());
            }
        }
        next
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioDef {
    pub key: ScenarioKey,
    pub label: &'static str,
    pub perturbation: Perturbation,
}

const SCENARIOS: [ScenarioDef; 5] = [
    ScenarioDef {
        key: ScenarioKey::Base,
        label: "Base",
        perturbation: Perturbation::Identity,
    },
    ScenarioDef {
        key: ScenarioKey::RateUp200,
        label: "+200bps",
        perturbation: Perturbation::RateShift(2.0),
    },
    ScenarioDef {
        key: ScenarioKey::Void2m,
        label: "Void +2m",
        perturbation: Perturbation::RentScale(10.0 / 12.0),
    },
    ScenarioDef {
        key: ScenarioKey::CostsUp15,
        label: "Costs +15%",
        perturbation: Perturbation::CostsScale(1.15),
    },
    ScenarioDef {
        key: ScenarioKey::RentDown10,
        label: "Rent −10%",
        perturbation: Perturbation::RentScale(0.9),
    },
];

pub fn list_scenarios() -> &'static [ScenarioDef] {
    &SCENARIOS
}

pub fn apply_scenario(inputs: &DealInputs, key: ScenarioKey) -> DealInputs {
    key.definition().perturbation.apply(inputs)
}

pub const CONFIDENCE_BUMP: i8 = 5;

/// `+5` when three or more scenarios rate GREEN, `-5` when one or none do, else `0`.
pub fn confidence_bump(outcomes: &BTreeMap<ScenarioKey, Colour>) -> i8 {
    let greens = outcomes
        .values()
        .filter(|colour| **colour == Colour::Green)
        .count();
    match greens {
        0 | 1 => -CONFIDENCE_BUMP,
        2 => 0,
        _ => CONFIDENCE_BUMP,
    }
}
