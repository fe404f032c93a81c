use crate::infra::{load_appraiser, TableArgs};
use clap::Args;
use lexlot::appraisal::scenario::list_scenarios;
use lexlot::appraisal::{DealInputs, DealSubmission, LooseValue, ScenarioAnalysis};
use lexlot::config::AppConfig;
use lexlot::error::AppError;

/// Deal fields as typed on the command line; coerced the same way form input is.
#[derive(Args, Debug, Default)]
pub(crate) struct DealArgs {
    /// Purchase price, e.g. `250000` or `£250,000`
    #[arg(long)]
    pub(crate) price: Option<String>,
    /// Monthly rent
    #[arg(long)]
    pub(crate) rent: Option<String>,
    /// Loan amount
    #[arg(long)]
    pub(crate) loan: Option<String>,
    /// Annual interest rate in percent, e.g. `5.25` or `5.25%`
    #[arg(long)]
    pub(crate) rate: Option<String>,
    /// Mortgage term in years (clamped to 1..=50)
    #[arg(long)]
    pub(crate) term: Option<String>,
    /// Annual operating costs
    #[arg(long)]
    pub(crate) costs: Option<String>,
    /// One-off purchase costs added to cash invested
    #[arg(long)]
    pub(crate) upfront: Option<String>,
    /// `IO` or `REPAY`
    #[arg(long)]
    pub(crate) product: Option<String>,
    #[arg(long)]
    pub(crate) postcode: Option<String>,
    /// Lender id or name, e.g. `natwest`
    #[arg(long)]
    pub(crate) lender: Option<String>,
    /// Pay transaction tax out of cash invested
    #[arg(long)]
    pub(crate) include_sdlt: bool,
}

impl DealArgs {
    pub(crate) fn submission(&self) -> DealSubmission {
        let loose = |value: &Option<String>| value.as_deref().map(LooseValue::from);
        DealSubmission {
            price: loose(&self.price),
            rent_monthly: loose(&self.rent),
            loan: loose(&self.loan),
            rate: loose(&self.rate),
            term_years: loose(&self.term),
            costs_annual: loose(&self.costs),
            upfront_costs: loose(&self.upfront),
            product: self.product.clone(),
            postcode: self.postcode.clone(),
            lender: self.lender.clone(),
            include_sdlt: Some(LooseValue::Flag(self.include_sdlt)),
            scenario: None,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    #[command(flatten)]
    pub(crate) deal: DealArgs,
    /// Print the full analysis as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Pay transaction tax out of cash invested
    #[arg(long)]
    pub(crate) include_sdlt: bool,
    /// Print the full analysis as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_evaluate(
    config: &AppConfig,
    tables: &TableArgs,
    args: EvaluateArgs,
) -> Result<(), AppError> {
    let appraiser = load_appraiser(config, tables)?;
    let inputs = args.deal.submission().coerce();
    let analysis = appraiser.analyse(&inputs);
    print_analysis(&inputs, &analysis, args.json)
}

pub(crate) fn run_demo(
    config: &AppConfig,
    tables: &TableArgs,
    args: DemoArgs,
) -> Result<(), AppError> {
    let appraiser = load_appraiser(config, tables)?;
    let inputs = DealInputs {
        include_sdlt: args.include_sdlt,
        ..sample_deal()
    };
    if !args.json {
        println!("Sample deal appraisal");
    }
    let analysis = appraiser.analyse(&inputs);
    print_analysis(&inputs, &analysis, args.json)
}

pub(crate) fn run_list_scenarios() {
    for scenario in list_scenarios() {
        println!(
            "- {} ({}): {:?}",
            scenario.key, scenario.label, scenario.perturbation
        );
    }
}

fn sample_deal() -> DealInputs {
    DealSubmission {
        price: Some("£185,000".into()),
        rent_monthly: Some("1,050".into()),
        loan: Some("138,750".into()),
        rate: Some("5.29%".into()),
        term_years: Some(25.0.into()),
        costs_annual: Some("1,600".into()),
        upfront_costs: Some("2,500".into()),
        product: Some("IO".to_string()),
        postcode: Some("ls61ab".to_string()),
        lender: Some("NatWest".to_string()),
        ..DealSubmission::default()
    }
    .coerce()
}

fn print_analysis(
    inputs: &DealInputs,
    analysis: &ScenarioAnalysis,
    json: bool,
) -> Result<(), AppError> {
    if json {
        println!("{}", serde_json::to_string_pretty(analysis)?);
        return Ok(());
    }
    for line in render_analysis(inputs, analysis) {
        println!("{line}");
    }
    Ok(())
}

pub(crate) fn render_analysis(inputs: &DealInputs, analysis: &ScenarioAnalysis) -> Vec<String> {
    let mut lines = Vec::new();
    let Some(base) = analysis.base() else {
        return lines;
    };
    let metrics = &base.appraisal.metrics;

    lines.push(format!(
        "Deal: {} ({}) | lender {}",
        if inputs.postcode.is_empty() {
            "no postcode"
        } else {
            inputs.postcode.as_str()
        },
        metrics.region,
        base.appraisal.lender.as_deref().unwrap_or("not selected")
    ));
    lines.push(format!(
        "- {} at {:.2}% | LTV {:.1}%",
        base.appraisal.product.label(),
        inputs.rate.unwrap_or_default(),
        metrics.ltv_pct
    ));
    lines.push(format!(
        "- Debt service £{:.2}/month | cashflow £{:.0}/year | cash invested £{:.0}",
        metrics.monthly_debt_service, metrics.annual_cashflow, metrics.cash_invested
    ));
    lines.push(format!(
        "- Stress rate {:.2}% | {} £{:.0} ({:.2}% of price)",
        metrics.stress_used_pct,
        metrics.region.transaction_tax(),
        metrics.sdlt_amount,
        metrics.sdlt_impact_pct
    ));

    lines.push("Why this rating:".to_string());
    lines.extend(analysis.explainer.iter().map(|line| format!("  {line}")));

    lines.push("Scenarios:".to_string());
    for outcome in &analysis.outcomes {
        lines.push(format!(
            "  - {:<11} {:>3}/100 {:<5} headline {}",
            outcome.label,
            outcome.appraisal.composite.score,
            outcome.appraisal.composite.overall,
            outcome.appraisal.headline
        ));
    }

    lines
}
