//! Experiment command implementation
//!
//! Runs the rebalance-interval x cost-rate grid on shared simulated paths.

use pricer_core::types::OptionSpec;
use pricer_models::analytical::BlackScholesEngine;
use pricer_risk::hedging::{EngineDelta, ExperimentCell, HedgingExperiment};
use serde::Serialize;
use tracing::info;

use super::{describe, Context, ContractArgs};
use crate::output::{self, num, Table};
use crate::Result;

/// Command-line arguments of the experiment command.
#[derive(Debug, Clone, Default)]
pub struct ExperimentArgs {
    pub contract: ContractArgs,
    pub paths: Option<usize>,
    pub steps: Option<usize>,
    pub seed: Option<u64>,
    pub path_vol: Option<f64>,
    pub intervals: Vec<usize>,
    pub cost_rates: Vec<f64>,
    pub confidence: Option<f64>,
}

/// Result of the experiment command.
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentReport {
    pub contract: OptionSpec,
    pub experiment: HedgingExperiment,
    pub cells: Vec<ExperimentCell>,
}

/// Run the experiment command
pub fn run(ctx: &Context, args: &ExperimentArgs) -> Result<()> {
    let report = build_report(ctx, args)?;
    output::emit(ctx.format, &report, tables)
}

fn build_report(ctx: &Context, args: &ExperimentArgs) -> Result<ExperimentReport> {
    let spec = args.contract.resolve(&ctx.config)?;
    let hedging = &ctx.config.hedging;

    let intervals = if args.intervals.is_empty() {
        hedging.rebalance_intervals.clone()
    } else {
        args.intervals.clone()
    };
    let cost_rates = if args.cost_rates.is_empty() {
        hedging.cost_rates.clone()
    } else {
        args.cost_rates.clone()
    };

    let mut experiment = HedgingExperiment::new(
        args.paths.unwrap_or(hedging.n_paths),
        args.steps.unwrap_or(hedging.n_steps),
        args.seed.unwrap_or(ctx.config.engines.seed),
    )
    .with_grid(intervals, cost_rates)
    .with_confidence(args.confidence.unwrap_or(hedging.confidence));
    if let Some(vol) = args.path_vol {
        experiment = experiment.with_path_volatility(vol);
    }

    info!(
        "Hedging experiment on {}: {} intervals x {} cost rates",
        describe(&spec),
        experiment.rebalance_intervals.len(),
        experiment.cost_rates.len()
    );
    let engine = BlackScholesEngine::default();
    let cells = experiment.run(&spec, &EngineDelta::new(&engine))?;

    Ok(ExperimentReport {
        contract: spec,
        experiment,
        cells,
    })
}

fn tables(report: &ExperimentReport) -> Vec<Table> {
    let confidence = report.experiment.confidence;
    let mut table = Table::new([
        "Every".to_string(),
        "Cost rate".to_string(),
        "Trades".to_string(),
        "Costs".to_string(),
        "Mean".to_string(),
        "Std dev".to_string(),
        format!("VaR {}", confidence),
        format!("CVaR {}", confidence),
    ])
    .with_title(format!(
        "Hedging error: {} paths x {} steps ({})",
        report.experiment.n_paths,
        report.experiment.n_steps,
        describe(&report.contract)
    ));
    for cell in &report.cells {
        let s = &cell.summary;
        table.row([
            cell.rebalance_every.to_string(),
            cell.cost_rate.to_string(),
            num(cell.mean_trades, 1),
            num(cell.mean_costs, 4),
            num(s.mean, 4),
            num(s.std_dev, 4),
            num(s.value_at_risk, 4),
            num(s.conditional_value_at_risk, 4),
        ]);
    }
    vec![table]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::output::OutputFormat;

    fn context() -> Context {
        Context {
            config: AppConfig::default(),
            format: OutputFormat::Table,
        }
    }

    #[test]
    fn test_flags_replace_configured_grid() {
        let args = ExperimentArgs {
            paths: Some(100),
            steps: Some(21),
            intervals: vec![1, 7],
            cost_rates: vec![0.0, 0.002],
            ..ExperimentArgs::default()
        };
        let report = build_report(&context(), &args).unwrap();
        assert_eq!(report.cells.len(), 4);
        assert_eq!(report.cells[2].rebalance_every, 7);
        assert_eq!(report.cells[1].cost_rate, 0.002);
        assert!(report.cells[1].summary.mean < report.cells[0].summary.mean);
    }

    #[test]
    fn test_configured_grid_used_by_default() {
        let mut ctx = context();
        ctx.config.hedging.rebalance_intervals = vec![1, 21];
        ctx.config.hedging.cost_rates = vec![0.0];
        ctx.config.hedging.n_paths = 300;
        let report = build_report(&ctx, &ExperimentArgs::default()).unwrap();
        assert_eq!(report.cells.len(), 2);
        assert!(report.cells[0].summary.std_dev < report.cells[1].summary.std_dev);

        let rendered = tables(&report)[0].render();
        assert!(rendered.contains("VaR 0.95"));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let args = ExperimentArgs {
            paths: Some(10),
            intervals: vec![0],
            ..ExperimentArgs::default()
        };
        assert!(build_report(&context(), &args).is_err());
    }
}
