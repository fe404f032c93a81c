use clap::Args;
use lexlot::appraisal::{DealAppraiser, RuleBook, TaxBand, UserPreferences};
use lexlot::config::{parse_growth_rate, AppConfig};
use lexlot::error::AppError;
use std::path::PathBuf;
use tracing::info;

/// Rule table and preference overrides shared by every command.
#[derive(Args, Debug, Default)]
pub(crate) struct TableArgs {
    /// JSON rulebook (overrides LEXLOT_RULEBOOK)
    #[arg(long, global = true)]
    pub(crate) rulebook: Option<PathBuf>,
    /// JSON preferences (overrides LEXLOT_PREFERENCES)
    #[arg(long, global = true)]
    pub(crate) preferences: Option<PathBuf>,
    /// Annual capital growth for the five-year ROI, e.g. `0.03` or `3%`
    #[arg(long, global = true)]
    pub(crate) growth: Option<String>,
    /// Score ICR against the higher-rate taxpayer floor
    #[arg(long, global = true)]
    pub(crate) higher_rate: bool,
}

pub(crate) fn load_appraiser(
    config: &AppConfig,
    overrides: &TableArgs,
) -> Result<DealAppraiser, AppError> {
    let rules = match overrides
        .rulebook
        .as_ref()
        .or(config.appraisal.rulebook_path.as_ref())
    {
        Some(path) => {
            let rules = RuleBook::from_path(path)?;
            info!(path = %path.display(), lenders = rules.lenders.len(), "rulebook loaded");
            rules
        }
        None => RuleBook::standard(),
    };

    let mut preferences = match overrides
        .preferences
        .as_ref()
        .or(config.appraisal.preferences_path.as_ref())
    {
        Some(path) => {
            let preferences = UserPreferences::from_path(path)?;
            info!(
                path = %path.display(),
                targets = preferences.targets.len(),
                "preferences loaded"
            );
            preferences
        }
        None => UserPreferences::default(),
    };

    let growth = match overrides.growth.as_deref() {
        Some(raw) => Some(parse_growth_rate(raw)?),
        None => config.appraisal.growth_annual,
    };
    if let Some(growth) = growth {
        preferences.growth_annual = growth;
    }
    if overrides.higher_rate {
        preferences.tax_band = TaxBand::Higher;
    }

    Ok(DealAppraiser::new(rules, preferences))
}
