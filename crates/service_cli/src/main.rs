//! hedgekit - Command Line Operations for Option Pricing and Hedging Studies
//!
//! This is the operational entry point for the hedgekit pricing toolkit.
//!
//! # Commands
//!
//! - `hedgekit price` - Price one contract with every engine, compared to Black-Scholes
//! - `hedgekit implied-vol --market-price <p>` - Invert a quoted price
//! - `hedgekit hedge` - Delta-hedge a short option on simulated or historical paths
//! - `hedgekit experiment` - Rebalance interval x transaction cost grid
//! - `hedgekit smile` - Heston smile and model risk against a flat volatility
//! - `hedgekit convergence` - Binomial, finite-difference and SDE convergence tables
//! - `hedgekit overlay` - Budget-constrained protective put overlay
//! - `hedgekit data-check <file>` - Integrity report for a `date,price` CSV file
//! - `hedgekit check` - Print the resolved configuration
//!
//! # Architecture
//!
//! As the service layer, this crate orchestrates the pricer crates
//! (core, models, pricing, risk) behind a single command-line interface.
//! Logs go to stderr; results go to stdout as tables or JSON.

use std::path::PathBuf;

use anyhow::Context as _;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod data;
mod error;
mod output;

pub use error::{CliError, Result};

use commands::convergence::ConvergenceArgs;
use commands::data_check::DataCheckArgs;
use commands::experiment::ExperimentArgs;
use commands::hedge::{DeltaEngine, HedgeArgs};
use commands::overlay::OverlayArgs;
use commands::{parse_grid, Context, ContractArgs};
use config::{AppConfig, LogLevel};
use output::OutputFormat;

/// Option pricing, delta-hedging simulation and risk reporting
#[derive(Parser)]
#[command(name = "hedgekit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path [default: hedgekit.toml, if present]
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format [default: from configuration, else table]
    #[arg(short, long, global = true, value_enum)]
    format: Option<OutputFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price one contract with every engine and compare against Black-Scholes
    Price {
        #[command(flatten)]
        contract: ContractArgs,

        /// Also price American exercise on the binomial tree
        #[arg(long)]
        american: bool,

        /// Add the Heston Monte Carlo cross-check
        #[arg(long)]
        heston_mc: bool,
    },

    /// Black-Scholes implied volatility of a quoted price
    ImpliedVol {
        #[command(flatten)]
        contract: ContractArgs,

        /// Quoted option price
        #[arg(short = 'p', long)]
        market_price: f64,
    },

    /// Delta-hedge a short option on simulated GBM paths or a CSV price path
    Hedge {
        #[command(flatten)]
        contract: ContractArgs,

        /// Historical `date,price` CSV file to hedge along
        #[arg(long)]
        prices: Option<String>,

        /// Number of simulated paths
        #[arg(long)]
        paths: Option<usize>,

        /// Time steps per path
        #[arg(long)]
        steps: Option<usize>,

        /// Path generator seed
        #[arg(long)]
        seed: Option<u64>,

        /// Volatility of the simulated paths (default: the contract's)
        #[arg(long)]
        path_vol: Option<f64>,

        /// Rebalance every N steps
        #[arg(long, default_value_t = 1)]
        rebalance_every: usize,

        /// Hold the inception hedge to expiry
        #[arg(long = "static")]
        static_hedge: bool,

        /// Proportional transaction cost rate
        #[arg(long, default_value_t = 0.0)]
        cost_rate: f64,

        /// Fixed cost per trade
        #[arg(long, default_value_t = 0.0)]
        fixed_cost: f64,

        /// Engine supplying the hedge ratio
        #[arg(long, value_enum, default_value_t = DeltaEngine::BlackScholes)]
        delta_engine: DeltaEngine,
    },

    /// Hedging error statistics over rebalance intervals x cost rates
    Experiment {
        #[command(flatten)]
        contract: ContractArgs,

        /// Number of simulated paths
        #[arg(long)]
        paths: Option<usize>,

        /// Time steps per path
        #[arg(long)]
        steps: Option<usize>,

        /// Path generator seed
        #[arg(long)]
        seed: Option<u64>,

        /// Volatility of the simulated paths (default: the contract's)
        #[arg(long)]
        path_vol: Option<f64>,

        /// Rebalance intervals in steps, comma separated
        #[arg(long, value_delimiter = ',')]
        intervals: Vec<usize>,

        /// Proportional cost rates, comma separated
        #[arg(long, value_delimiter = ',')]
        cost_rates: Vec<f64>,

        /// VaR / CVaR confidence level
        #[arg(long)]
        confidence: Option<f64>,
    },

    /// Heston implied-volatility smile and model risk
    Smile {
        #[command(flatten)]
        contract: ContractArgs,

        /// Strikes, comma separated (default: 80% to 120% of spot)
        #[arg(long, value_delimiter = ',')]
        strikes: Vec<f64>,
    },

    /// Convergence of the tree, the PDE grid and the Euler scheme
    Convergence {
        #[command(flatten)]
        contract: ContractArgs,

        /// Binomial step counts, comma separated
        #[arg(long, value_delimiter = ',')]
        tree_steps: Vec<usize>,

        /// PDE grids as PRICExTIME, comma separated
        #[arg(long, value_delimiter = ',', value_parser = parse_grid)]
        grids: Vec<(usize, usize)>,

        /// Euler-Maruyama step counts, comma separated
        #[arg(long, value_delimiter = ',')]
        sde_steps: Vec<usize>,

        /// Paths per Euler-Maruyama step count
        #[arg(long)]
        sde_paths: Option<usize>,
    },

    /// Protective put overlay on a long position
    Overlay {
        #[command(flatten)]
        contract: ContractArgs,

        /// Overlay horizon in years (default: the contract maturity)
        #[arg(long)]
        horizon: Option<f64>,

        /// Portfolio notional
        #[arg(long)]
        notional: Option<f64>,

        /// Put strike as a fraction of spot
        #[arg(long)]
        strike_pct: Option<f64>,

        /// Put maturity in years
        #[arg(long)]
        put_maturity: Option<f64>,

        /// Premium budget as a fraction of notional
        #[arg(long)]
        budget: Option<f64>,

        /// Number of simulated paths
        #[arg(long)]
        paths: Option<usize>,

        /// Time steps per path
        #[arg(long)]
        steps: Option<usize>,

        /// Path generator seed
        #[arg(long)]
        seed: Option<u64>,

        /// Historical `date,price` CSV file instead of simulation
        #[arg(long)]
        prices: Option<String>,
    },

    /// Integrity report for a `date,price` CSV file
    DataCheck {
        /// Price file
        file: String,

        /// Minimum number of observations
        #[arg(long)]
        min_obs: Option<usize>,

        /// Largest tolerated calendar gap in days
        #[arg(long)]
        max_gap_days: Option<i64>,

        /// Requested start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Fail unless the file is ready for use
        #[arg(long)]
        strict: bool,
    },

    /// Check and print the resolved configuration
    Check,
}

/// `--verbose` wins, then `RUST_LOG`, then the configured level.
fn init_tracing(verbose: bool, level: LogLevel) {
    let filter = if verbose {
        EnvFilter::new(LogLevel::Debug.as_filter_str())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter_str()))
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    init_tracing(cli.verbose, config.log_level);
    debug!("Resolved configuration: {:?}", config);

    let ctx = Context {
        format: cli.format.unwrap_or(config.format),
        config,
    };
    dispatch(&ctx, cli.command)?;
    Ok(())
}

fn dispatch(ctx: &Context, command: Commands) -> Result<()> {
    match command {
        Commands::Price {
            contract,
            american,
            heston_mc,
        } => commands::price::run(ctx, &contract, american, heston_mc),
        Commands::ImpliedVol {
            contract,
            market_price,
        } => commands::implied_vol::run(ctx, &contract, market_price),
        Commands::Hedge {
            contract,
            prices,
            paths,
            steps,
            seed,
            path_vol,
            rebalance_every,
            static_hedge,
            cost_rate,
            fixed_cost,
            delta_engine,
        } => commands::hedge::run(
            ctx,
            &HedgeArgs {
                contract,
                prices,
                paths,
                steps,
                seed,
                path_vol,
                rebalance_every,
                static_hedge,
                cost_rate,
                fixed_cost,
                delta_engine,
            },
        ),
        Commands::Experiment {
            contract,
            paths,
            steps,
            seed,
            path_vol,
            intervals,
            cost_rates,
            confidence,
        } => commands::experiment::run(
            ctx,
            &ExperimentArgs {
                contract,
                paths,
                steps,
                seed,
                path_vol,
                intervals,
                cost_rates,
                confidence,
            },
        ),
        Commands::Smile { contract, strikes } => commands::smile::run(ctx, &contract, &strikes),
        Commands::Convergence {
            contract,
            tree_steps,
            grids,
            sde_steps,
            sde_paths,
        } => commands::convergence::run(
            ctx,
            &ConvergenceArgs {
                contract,
                tree_steps,
                grids,
                sde_steps,
                sde_paths,
            },
        ),
        Commands::Overlay {
            contract,
            horizon,
            notional,
            strike_pct,
            put_maturity,
            budget,
            paths,
            steps,
            seed,
            prices,
        } => commands::overlay::run(
            ctx,
            &OverlayArgs {
                contract,
                horizon,
                notional,
                strike_pct,
                put_maturity,
                budget,
                paths,
                steps,
                seed,
                prices,
            },
        ),
        Commands::DataCheck {
            file,
            min_obs,
            max_gap_days,
            start,
            strict,
        } => commands::data_check::run(
            ctx,
            &DataCheckArgs {
                file,
                min_obs,
                max_gap_days,
                start,
                strict,
            },
        ),
        Commands::Check => commands::check::run(ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pricer_core::types::OptionType;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::try_parse_from(["hedgekit", "check", "--format", "json", "-v"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert!(matches!(cli.command, Commands::Check));
    }

    #[test]
    fn test_contract_flags_parse() {
        let cli = Cli::try_parse_from([
            "hedgekit", "price", "-t", "put", "--spot", "105", "-k", "100", "--vol", "0.25",
        ])
        .unwrap();
        match cli.command {
            Commands::Price { contract, american, .. } => {
                assert_eq!(contract.option_type, Some(OptionType::Put));
                assert_eq!(contract.spot, Some(105.0));
                assert_eq!(contract.volatility, Some(0.25));
                assert_eq!(contract.rate, None);
                assert!(!american);
            }
            _ => panic!("expected price"),
        }
    }

    #[test]
    fn test_list_arguments() {
        let cli = Cli::try_parse_from([
            "hedgekit",
            "convergence",
            "--tree-steps",
            "50,100",
            "--grids",
            "100x100,200x200",
        ])
        .unwrap();
        match cli.command {
            Commands::Convergence { tree_steps, grids, sde_steps, .. } => {
                assert_eq!(tree_steps, vec![50, 100]);
                assert_eq!(grids, vec![(100, 100), (200, 200)]);
                assert!(sde_steps.is_empty());
            }
            _ => panic!("expected convergence"),
        }
    }

    #[test]
    fn test_hedge_defaults() {
        let cli = Cli::try_parse_from(["hedgekit", "hedge", "--delta-engine", "binomial"]).unwrap();
        match cli.command {
            Commands::Hedge {
                rebalance_every,
                cost_rate,
                delta_engine,
                static_hedge,
                ..
            } => {
                assert_eq!(rebalance_every, 1);
                assert_eq!(cost_rate, 0.0);
                assert_eq!(delta_engine, DeltaEngine::Binomial);
                assert!(!static_hedge);
            }
            _ => panic!("expected hedge"),
        }
    }

    #[test]
    fn test_bad_option_type_rejected() {
        assert!(Cli::try_parse_from(["hedgekit", "price", "-t", "straddle"]).is_err());
        assert!(Cli::try_parse_from(["hedgekit", "implied-vol"]).is_err());
    }
}
