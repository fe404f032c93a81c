use crate::demo::{run_demo, run_evaluate, run_list_scenarios, DemoArgs, EvaluateArgs};
use crate::infra::TableArgs;
use clap::{Parser, Subcommand};
use lexlot::config::AppConfig;
use lexlot::error::AppError;
use lexlot::telemetry;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "lexlot",
    about = "Appraise buy-to-let deals against lender, regional and personal thresholds",
    version
)]
struct Cli {
    #[command(flatten)]
    tables: TableArgs,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate one deal across every stress scenario
    Evaluate(EvaluateArgs),
    /// List the stress scenarios and what they change
    Scenarios,
    /// Evaluate a sample deal (default command)
    Demo(DemoArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    debug!(environment = ?config.environment, "configuration loaded");

    let command = cli
        .command
        .unwrap_or_else(|| Command::Demo(DemoArgs::default()));

    match command {
        Command::Evaluate(args) => run_evaluate(&config, &cli.tables, args),
        Command::Scenarios => {
            run_list_scenarios();
            Ok(())
        }
        Command::Demo(args) => run_demo(&config, &cli.tables, args),
    }
}
