//! CLI command implementations
//!
//! Each submodule implements a specific CLI command. Commands receive the
//! resolved [`AppConfig`] and the output format through [`Context`]; their
//! own flags override the configuration for that run only.

pub mod check;
pub mod convergence;
pub mod data_check;
pub mod experiment;
pub mod hedge;
pub mod implied_vol;
pub mod overlay;
pub mod price;
pub mod smile;

use clap::Args;
use pricer_core::types::{OptionSpec, OptionType};

use crate::config::AppConfig;
use crate::output::OutputFormat;
use crate::{CliError, Result};

/// Everything a command needs besides its own arguments.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: AppConfig,
    pub format: OutputFormat,
}

/// Contract flags shared by the pricing commands; unset flags fall back to
/// the `[contract]` configuration section.
#[derive(Args, Debug, Clone, Default)]
pub struct ContractArgs {
    /// Option type (call or put)
    #[arg(short = 't', long)]
    pub option_type: Option<OptionType>,

    /// Spot price
    #[arg(long)]
    pub spot: Option<f64>,

    /// Strike price
    #[arg(short = 'k', long)]
    pub strike: Option<f64>,

    /// Maturity in years
    #[arg(short = 'm', long)]
    pub maturity: Option<f64>,

    /// Continuously compounded risk-free rate
    #[arg(short = 'r', long)]
    pub rate: Option<f64>,

    /// Continuous dividend yield
    #[arg(short = 'q', long)]
    pub dividend_yield: Option<f64>,

    /// Black-Scholes volatility
    #[arg(long = "vol")]
    pub volatility: Option<f64>,
}

impl ContractArgs {
    /// Merges the flags over the configured contract and validates it.
    pub fn resolve(&self, config: &AppConfig) -> Result<OptionSpec> {
        let base = &config.contract;
        let spec = OptionSpec::new(
            self.option_type.unwrap_or(base.option_type),
            self.spot.unwrap_or(base.spot),
            self.strike.unwrap_or(base.strike),
            self.maturity.unwrap_or(base.maturity),
            self.rate.unwrap_or(base.rate),
            self.volatility.unwrap_or(base.volatility),
        )
        .with_dividend_yield(self.dividend_yield.unwrap_or(base.dividend_yield));
        spec.validate()?;
        Ok(spec)
    }
}

/// Parses `100x100` into a `(price_steps, time_steps)` pair.
pub fn parse_grid(text: &str) -> std::result::Result<(usize, usize), String> {
    let (price, time) = text
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected PRICExTIME, got '{}'", text))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<usize>()
            .map_err(|e| format!("invalid grid size '{}': {}", part, e))
    };
    Ok((parse(price)?, parse(time)?))
}

/// Rejects an empty list argument.
pub fn require_non_empty<T>(name: &str, values: &[T]) -> Result<()> {
    if values.is_empty() {
        return Err(CliError::invalid_argument(format!("{} needs at least one value", name)));
    }
    Ok(())
}

/// Human-readable label for a contract.
pub fn describe(spec: &OptionSpec) -> String {
    format!(
        "{} {:?} S={} K={} T={} r={} q={} vol={}",
        spec.option_type,
        spec.exercise,
        spec.spot,
        spec.strike,
        spec.maturity,
        spec.rate,
        spec.dividend_yield,
        spec.volatility.map_or_else(|| "-".to_string(), |v| v.to_string()),
    )
}
