//! Threshold cascade: USER, then LENDER, then REGION, then DEFAULT.
//!
//! Each source is a [`BandResolver`] that either produces a band for a metric or declines.
//! The cascade walks its resolvers in order and the first band produced wins, optionally
//! passing through [`harden_band`] so that downstream scoring always sees sane thresholds.

use super::context::EvaluationContext;
use super::domain::{Band, BandSource, BandSpec, MetricKey};
use super::rules::DefaultBands;
use tracing::{debug, trace};

/// Amber sits this far below a user's target on higher-is-better metrics.
pub const USER_AMBER_FACTOR: f64 = 0.85;
/// Amber sits this far above a user's target on lower-is-better metrics.
pub const USER_AMBER_FACTOR_INVERTED: f64 = 1.10;
pub const LENDER_LTV_AMBER_MARGIN: f64 = 0.05;
pub const LENDER_ICR_AMBER_FACTOR: f64 = 0.95;
/// Percentage thresholds above this were almost certainly typed as whole numbers.
pub const WHOLE_PERCENT_THRESHOLD: f64 = 1.5;

/// One configuration source in the cascade.
pub trait BandResolver: Send + Sync {
    fn source(&self) -> BandSource;

    /// A band for `metric`, or `None` to let the next source decide.
    fn resolve(&self, metric: MetricKey, ctx: &EvaluationContext<'_>) -> Option<Band>;
}

/// Explicit per-metric targets from the user's preferences.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserTargetResolver;

impl BandResolver for UserTargetResolver {
    fn source(&self) -> BandSource {
        BandSource::User
    }

    fn resolve(&self, metric: MetricKey, ctx: &EvaluationContext<'_>) -> Option<Band> {
        let target = ctx.target(metric)?;
        let invert = metric.inverted();

        if !target.is_finite() || target < 0.0 {
            let fallback = fallback_spec(metric, ctx.defaults);
            return Some(fallback.to_band(metric, BandSource::User));
        }

        let amber = if invert {
            target * USER_AMBER_FACTOR_INVERTED
        } else {
            (target * USER_AMBER_FACTOR).max(0.0)
        };

        Some(Band {
            green: target,
            amber,
            invert,
            source: BandSource::User,
        })
    }
}

/// Lender affordability rules. Only ICR and LTV, and only when a lender is selected.
#[derive(Debug, Clone, Copy, Default)]
pub struct LenderRuleResolver;

impl BandResolver for LenderRuleResolver {
    fn source(&self) -> BandSource {
        BandSource::Lender
    }

    fn resolve(&self, metric: MetricKey, ctx: &EvaluationContext<'_>) -> Option<Band> {
        let lender = ctx.lender.as_ref()?;

        match metric {
            MetricKey::Ltv => Some(Band {
                green: lender.product.max_ltv,
                amber: lender.product.max_ltv + LENDER_LTV_AMBER_MARGIN,
                invert: true,
                source: BandSource::Lender,
            }),
            MetricKey::Icr => {
                let floor = lender.product.icr_floor(ctx.tax_band);
                Some(Band {
                    green: floor,
                    amber: floor * LENDER_ICR_AMBER_FACTOR,
                    invert: false,
                    source: BandSource::Lender,
                })
            }
            _ => None,
        }
    }
}

/// Bands published for the deal's region.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegionTableResolver;

impl BandResolver for RegionTableResolver {
    fn source(&self) -> BandSource {
        BandSource::Region
    }

    fn resolve(&self, metric: MetricKey, ctx: &EvaluationContext<'_>) -> Option<Band> {
        ctx.region_band(metric)
            .map(|spec| spec.to_band(metric, BandSource::Region))
    }
}

/// The always-complete default table. Never declines.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTableResolver;

impl BandResolver for DefaultTableResolver {
    fn source(&self) -> BandSource {
        BandSource::Default
    }

    fn resolve(&self, metric: MetricKey, ctx: &EvaluationContext<'_>) -> Option<Band> {
        Some(ctx.defaults.get(metric).to_band(metric, BandSource::Default))
    }
}

/// The standard resolution order.
pub const STANDARD_ORDER: [&dyn BandResolver; 4] = [
    &UserTargetResolver,
    &LenderRuleResolver,
    &RegionTableResolver,
    &DefaultTableResolver,
];

/// An ordered list of resolvers plus the hardening switch.
pub struct ThresholdCascade {
    resolvers: Vec<Box<dyn BandResolver>>,
    harden: bool,
}

impl ThresholdCascade {
    /// USER, LENDER, REGION, DEFAULT with hardening enabled.
    pub fn standard() -> Self {
        Self::new(
            vec![
                Box::new(UserTargetResolver) as Box<dyn BandResolver>,
                Box::new(LenderRuleResolver),
                Box::new(RegionTableResolver),
                Box::new(DefaultTableResolver),
            ],
            true,
        )
    }

    pub fn new(resolvers: Vec<Box<dyn BandResolver>>, harden: bool) -> Self {
        Self { resolvers, harden }
    }

    pub fn with_hardening(mut self, harden: bool) -> Self {
        self.harden = harden;
        self
    }

    pub fn hardening(&self) -> bool {
        self.harden
    }

    /// Sources in the order they are consulted.
    pub fn sources(&self) -> Vec<BandSource> {
        self.resolvers
            .iter()
            .map(|resolver| resolver.source())
            .collect()
    }

    pub fn resolve(&self, metric: MetricKey, ctx: &EvaluationContext<'_>) -> Band {
        walk(
            self.resolvers.iter().map(|resolver| &**resolver),
            metric,
            ctx,
            self.harden,
        )
    }
}

impl Default for ThresholdCascade {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for ThresholdCascade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThresholdCascade")
            .field("sources", &self.sources())
            .field("harden", &self.harden)
            .finish()
    }
}

/// Resolves a hardened band through the standard order without allocating.
pub fn resolve_bands(metric: MetricKey, ctx: &EvaluationContext<'_>) -> Band {
    walk(STANDARD_ORDER.iter().copied(), metric, ctx, true)
}

fn walk<'r, R>(
    mut resolvers: impl Iterator<Item = &'r R>,
    metric: MetricKey,
    ctx: &EvaluationContext<'_>,
    harden: bool,
) -> Band
where
    R: BandResolver + ?Sized + 'r,
{
    let band = resolvers
        .find_map(|resolver| resolver.resolve(metric, ctx))
        .unwrap_or_else(|| {
            fallback_spec(metric, ctx.defaults).to_band(metric, BandSource::Default)
        });

    trace!(%metric, source = band.source.label(), "band resolved");

    if harden {
        harden_band(metric, band, ctx.defaults)
    } else {
        band
    }
}

/// The configured default for a metric, or the built-in one if that is unusable.
fn fallback_spec(metric: MetricKey, defaults: &DefaultBands) -> BandSpec {
    let configured = defaults.get(metric);
    if configured.green.is_finite() && configured.amber.is_finite() {
        configured
    } else {
        DefaultBands::standard().get(metric)
    }
}

/// Repairs a band so it is finite, non-negative, on a fraction scale for percentage metrics,
/// and has amber on the non-preferred side of green.
pub fn harden_band(metric: MetricKey, band: Band, defaults: &DefaultBands) -> Band {
    let fallback = fallback_spec(metric, defaults);
    let invert = band.invert;

    let mut green = if band.green.is_finite() {
        band.green
    } else {
        fallback.green
    };
    let mut amber = if band.amber.is_finite() {
        band.amber
    } else {
        fallback.amber
    };

    green = green.max(0.0);
    amber = amber.max(0.0);

    if metric.is_percentage() {
        if green > WHOLE_PERCENT_THRESHOLD {
            green /= 100.0;
        }
        if amber > WHOLE_PERCENT_THRESHOLD {
            amber /= 100.0;
        }
    }

    if invert {
        if amber < green {
            amber = green * 1.10;
        } else if amber == green {
            amber = green * 1.05;
        }
    } else if amber > green {
        amber = green * 0.85;
    } else if amber == green {
        amber = green * 0.95;
    }

    let hardened = Band {
        green,
        amber,
        invert,
        source: band.source,
    };

    if hardened != band {
        debug!(
            %metric,
            source = band.source.label(),
            from_green = band.green,
            from_amber = band.amber,
            green,
            amber,
            "band repaired"
        );
    }

    hardened
}
