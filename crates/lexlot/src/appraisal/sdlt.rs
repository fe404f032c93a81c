//! Property transaction tax for investment purchases.
//!
//! England and Northern Ireland levy SDLT with the additional-property surcharge, Wales levies
//! LTT at the higher residential rates and Scotland levies LBTT with the ADS folded into the
//! bands. Only investor schedules are modelled.

use super::domain::Region;

/// One marginal slice: price up to `up_to` is taxed at `rate_pct`. `None` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateBand {
    pub up_to: Option<f64>,
    pub rate_pct: f64,
}

const fn band(up_to: f64, rate_pct: f64) -> RateBand {
    RateBand {
        up_to: Some(up_to),
        rate_pct,
    }
}

const fn top(rate_pct: f64) -> RateBand {
    RateBand {
        up_to: None,
        rate_pct,
    }
}

pub const ENGLAND_NI_INVESTOR: &[RateBand] = &[
    band(250_000.0, 3.0),
    band(925_000.0, 8.0),
    band(1_500_000.0, 13.0),
    top(15.0),
];

pub const WALES_LTT_INVESTOR: &[RateBand] = &[
    band(180_000.0, 4.0),
    band(250_000.0, 7.5),
    band(400_000.0, 9.0),
    band(750_000.0, 11.5),
    band(1_500_000.0, 14.0),
    top(16.0),
];

pub const SCOTLAND_LBTT_INVESTOR: &[RateBand] = &[
    band(145_000.0, 6.0),
    band(250_000.0, 8.0),
    band(325_000.0, 11.0),
    band(750_000.0, 16.0),
    top(18.0),
];

/// Investor schedule for a region. Unknown postcodes fall back to England.
pub fn schedule_for(region: Region) -> &'static [RateBand] {
    match region {
        Region::Wales => WALES_LTT_INVESTOR,
        Region::Scotland => SCOTLAND_LBTT_INVESTOR,
        Region::England | Region::NorthernIreland | Region::Unknown => ENGLAND_NI_INVESTOR,
    }
}

/// Applies a marginal schedule, rounding to whole pounds.
pub fn tax_for_bands(price: f64, bands: &[RateBand]) -> f64 {
    let mut remaining = price;
    let mut lower = 0.0;
    let mut tax = 0.0;

    for slice_band in bands {
        if remaining <= 0.0 {
            break;
        }
        let cap = slice_band.up_to.unwrap_or(f64::INFINITY);
        let slice = remaining.min(cap - lower).max(0.0);
        tax += slice * slice_band.rate_pct / 100.0;
        remaining -= slice;
        lower = cap;
    }

    tax.round().max(0.0)
}

/// Transaction tax on an investment purchase; zero for main residences or empty prices.
pub fn compute_sdlt(price: f64, region: Region, second_home: bool) -> f64 {
    if !second_home || !price.is_finite() || price <= 0.0 {
        return 0.0;
    }
    tax_for_bands(price, schedule_for(region))
}

/// Tax as a fraction of the purchase price.
pub fn sdlt_impact(price: f64, tax: f64) -> f64 {
    if price > 0.0 {
        tax / price
    } else {
        0.0
    }
}
