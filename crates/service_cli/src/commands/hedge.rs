//! Hedge command implementation
//!
//! Delta-hedges a short option either across simulated GBM paths or along
//! one historical price path read from CSV.

use std::path::Path;

use clap::ValueEnum;
use pricer_core::market_data::TRADING_DAYS_PER_YEAR;
use pricer_core::traits::PricingEngine;
use pricer_core::types::OptionSpec;
use pricer_models::analytical::BlackScholesEngine;
use pricer_models::lattice::BinomialTreeEngine;
use pricer_models::pde::FiniteDifferenceEngine;
use pricer_risk::hedging::{
    simulate, simulate_paths, EngineDelta, HedgingExperiment, HedgingOutcome, ProportionalCost,
    RebalanceSchedule,
};
use pricer_risk::metrics::{mean, RiskSummary};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{describe, Context, ContractArgs};
use crate::config::AppConfig;
use crate::data::load_price_series;
use crate::output::{self, num, Table};
use crate::{CliError, Result};

/// Engine supplying the hedge ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DeltaEngine {
    /// Closed-form Black-Scholes delta
    #[default]
    BlackScholes,
    /// CRR binomial tree delta
    Binomial,
    /// Finite-difference delta
    Pde,
}

impl DeltaEngine {
    fn build(&self, config: &AppConfig) -> Box<dyn PricingEngine> {
        match self {
            DeltaEngine::BlackScholes => Box::new(BlackScholesEngine::default()),
            DeltaEngine::Binomial => Box::new(BinomialTreeEngine::new(config.engines.tree_steps)),
            DeltaEngine::Pde => Box::new(FiniteDifferenceEngine::new(config.engines.pde())),
        }
    }
}

/// Settings of one hedge run after merging flags and configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HedgeSettings {
    pub delta_engine: DeltaEngine,
    pub schedule: RebalanceSchedule,
    pub cost_rate: f64,
    pub fixed_cost: f64,
}

/// Result over simulated paths.
#[derive(Debug, Clone, Serialize)]
pub struct SimulatedHedgeReport {
    pub contract: OptionSpec,
    pub settings: HedgeSettings,
    pub n_paths: usize,
    pub n_steps: usize,
    pub seed: u64,
    pub path_volatility: Option<f64>,
    pub premium: f64,
    pub mean_trades: f64,
    pub mean_costs: f64,
    pub summary: RiskSummary,
}

/// Result along a historical path.
#[derive(Debug, Clone, Serialize)]
pub struct HistoricalHedgeReport {
    pub source: String,
    pub contract: OptionSpec,
    pub settings: HedgeSettings,
    pub outcome: HedgingOutcome,
}

/// Command-line arguments of the hedge command.
#[derive(Debug, Clone)]
pub struct HedgeArgs {
    pub contract: ContractArgs,
    pub prices: Option<String>,
    pub paths: Option<usize>,
    pub steps: Option<usize>,
    pub seed: Option<u64>,
    pub path_vol: Option<f64>,
    pub rebalance_every: usize,
    pub static_hedge: bool,
    pub cost_rate: f64,
    pub fixed_cost: f64,
    pub delta_engine: DeltaEngine,
}

impl HedgeArgs {
    fn settings(&self) -> Result<HedgeSettings> {
        if self.rebalance_every == 0 {
            return Err(CliError::invalid_argument("--rebalance-every must be at least 1"));
        }
        let schedule = match (self.static_hedge, self.rebalance_every) {
            (true, _) => RebalanceSchedule::Static,
            (false, 1) => RebalanceSchedule::EveryStep,
            (false, n) => RebalanceSchedule::Every(n),
        };
        Ok(HedgeSettings {
            delta_engine: self.delta_engine,
            schedule,
            cost_rate: self.cost_rate,
            fixed_cost: self.fixed_cost,
        })
    }
}

/// Run the hedge command
pub fn run(ctx: &Context, args: &HedgeArgs) -> Result<()> {
    match &args.prices {
        Some(file) => {
            let report = historical(ctx, args, Path::new(file))?;
            output::emit(ctx.format, &report, historical_tables)
        }
        None => {
            let report = simulated(ctx, args)?;
            output::emit(ctx.format, &report, simulated_tables)
        }
    }
}

fn simulated(ctx: &Context, args: &HedgeArgs) -> Result<SimulatedHedgeReport> {
    let spec = args.contract.resolve(&ctx.config)?;
    let settings = args.settings()?;
    let cost = ProportionalCost::new(settings.cost_rate, settings.fixed_cost)?;
    let hedging = &ctx.config.hedging;

    let mut experiment = HedgingExperiment::new(
        args.paths.unwrap_or(hedging.n_paths),
        args.steps.unwrap_or(hedging.n_steps),
        args.seed.unwrap_or(ctx.config.engines.seed),
    )
    .with_confidence(hedging.confidence);
    if let Some(vol) = args.path_vol {
        experiment = experiment.with_path_volatility(vol);
    }
    experiment.validate()?;

    info!(
        "Hedging {} over {} paths x {} steps",
        describe(&spec),
        experiment.n_paths,
        experiment.n_steps
    );
    let engine = settings.delta_engine.build(&ctx.config);
    let delta_fn = EngineDelta::new(engine.as_ref());
    let paths = experiment.generate_paths(&spec)?;
    let outcomes = simulate_paths(&spec, &delta_fn, &paths, &settings.schedule, &cost)?;

    let errors: Vec<f64> = outcomes.iter().map(|o| o.hedging_error).collect();
    let trades: Vec<f64> = outcomes.iter().map(|o| o.n_trades as f64).collect();
    let costs: Vec<f64> = outcomes.iter().map(|o| o.total_costs).collect();

    Ok(SimulatedHedgeReport {
        contract: spec,
        premium: outcomes.first().map_or(0.0, |o| o.premium),
        n_paths: experiment.n_paths,
        n_steps: experiment.n_steps,
        seed: experiment.seed,
        path_volatility: experiment.path_volatility,
        mean_trades: mean(&trades)?,
        mean_costs: mean(&costs)?,
        summary: RiskSummary::from_outcomes(&errors, hedging.confidence)?,
        settings,
    })
}

/// The option runs from the first to the last observation; unless given,
/// the strike is set at the money.
fn historical(ctx: &Context, args: &HedgeArgs, file: &Path) -> Result<HistoricalHedgeReport> {
    let series = load_price_series(file)?;
    series.ensure_ready(None, 2, ctx.config.data.max_gap_days)?;
    let prices = series.prices();
    let n_steps = prices.len() - 1;
    if args.steps.is_some_and(|steps| steps != n_steps) {
        warn!("--steps ignored: the price file defines {} steps", n_steps);
    }

    let inception = prices[0];
    let contract = ContractArgs {
        spot: Some(inception),
        strike: Some(args.contract.strike.unwrap_or(inception)),
        maturity: Some(n_steps as f64 / TRADING_DAYS_PER_YEAR),
        ..args.contract.clone()
    };
    let spec = contract.resolve(&ctx.config)?;
    let settings = args.settings()?;
    let cost = ProportionalCost::new(settings.cost_rate, settings.fixed_cost)?;

    info!("Hedging {} along {}", describe(&spec), file.display());
    let engine = settings.delta_engine.build(&ctx.config);
    let delta_fn = EngineDelta::new(engine.as_ref());
    let outcome = simulate(&spec, &delta_fn, &prices, &settings.schedule, &cost)?;

    Ok(HistoricalHedgeReport {
        source: file.display().to_string(),
        contract: spec,
        settings,
        outcome,
    })
}

fn settings_rows(settings: &HedgeSettings) -> [(&'static str, String); 4] {
    [
        ("delta engine", format!("{:?}", settings.delta_engine)),
        ("schedule", format!("{:?}", settings.schedule)),
        ("cost rate", settings.cost_rate.to_string()),
        ("fixed cost", settings.fixed_cost.to_string()),
    ]
}

fn simulated_tables(report: &SimulatedHedgeReport) -> Vec<Table> {
    let s = &report.summary;
    let mut rows: Vec<(&str, String)> = settings_rows(&report.settings).to_vec();
    rows.extend([
        ("paths", report.n_paths.to_string()),
        ("steps", report.n_steps.to_string()),
        ("premium", num(report.premium, 4)),
        ("mean trades", num(report.mean_trades, 2)),
        ("mean costs", num(report.mean_costs, 4)),
        ("mean error", num(s.mean, 4)),
        ("std error", num(s.std_dev, 4)),
        ("median", num(s.median, 4)),
        ("min", num(s.min, 4)),
        ("max", num(s.max, 4)),
        (
            "VaR",
            format!("{} @ {}", num(s.value_at_risk, 4), s.confidence),
        ),
        ("CVaR", num(s.conditional_value_at_risk, 4)),
    ]);
    vec![Table::key_values(
        &format!("Hedging error ({})", describe(&report.contract)),
        rows,
    )]
}

fn historical_tables(report: &HistoricalHedgeReport) -> Vec<Table> {
    let o = &report.outcome;
    let mut rows: Vec<(&str, String)> = settings_rows(&report.settings).to_vec();
    rows.extend([
        ("observations", (o.deltas.len() + 1).to_string()),
        ("premium", num(o.premium, 4)),
        ("payoff", num(o.payoff, 4)),
        ("final portfolio", num(o.final_portfolio, 4)),
        ("hedging error", num(o.hedging_error, 4)),
        ("trades", o.n_trades.to_string()),
        ("costs", num(o.total_costs, 4)),
    ]);
    vec![Table::key_values(
        &format!("Historical hedge of {} ({})", report.source, describe(&report.contract)),
        rows,
    )]
}
