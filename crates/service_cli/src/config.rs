//! CLI configuration management
//!
//! Settings are layered, lowest priority first:
//! 1. Built-in defaults
//! 2. `hedgekit.toml` (or the file given with `--config`)
//! 3. `HEDGEKIT_*` environment variables, nested keys separated by `__`
//!    (e.g. `HEDGEKIT_CONTRACT__SPOT=105`)
//! 4. Command-line flags, applied per command
//!
//! The merged configuration is validated before any command runs.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use config::{Config, Environment, File, FileFormat};
use pricer_core::market_data::{DEFAULT_MAX_GAP_DAYS, DEFAULT_MIN_OBSERVATIONS};
use pricer_core::types::{OptionSpec, OptionType};
use pricer_models::lattice::DEFAULT_TREE_STEPS;
use pricer_models::models::{
    HestonParams, DEFAULT_KAPPA, DEFAULT_RHO, DEFAULT_THETA, DEFAULT_V0, DEFAULT_XI,
};
use pricer_models::pde::{
    PdeConfig, Scheme, DEFAULT_PRICE_STEPS, DEFAULT_RANNACHER_STEPS, DEFAULT_S_MAX_MULTIPLIER,
    DEFAULT_TIME_STEPS,
};
use pricer_pricing::mc::{MonteCarloConfig, DEFAULT_PATHS, DEFAULT_SEED, DEFAULT_STEPS};
use pricer_risk::hedging::{
    DEFAULT_COST_RATES, DEFAULT_HEDGE_PATHS, DEFAULT_HEDGE_STEPS, DEFAULT_REBALANCE_INTERVALS,
};
use pricer_risk::metrics::DEFAULT_CONFIDENCE;
use pricer_risk::model_risk::DEFAULT_MODEL_TOLERANCE;
use pricer_risk::overlay::OverlayConfig;
use serde::{Deserialize, Serialize};

use crate::error::{CliError, Result};
use crate::output::OutputFormat;

/// Configuration file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "hedgekit.toml";

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "HEDGEKIT";

/// Default spot price.
pub const DEFAULT_SPOT: f64 = 100.0;

/// Default strike.
pub const DEFAULT_STRIKE: f64 = 100.0;

/// Default maturity in years.
pub const DEFAULT_MATURITY: f64 = 1.0;

/// Default continuously compounded risk-free rate.
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.02;

/// Default continuous dividend yield.
pub const DEFAULT_DIVIDEND_YIELD: f64 = 0.0;

/// Default Black-Scholes volatility.
pub const DEFAULT_VOLATILITY: f64 = 0.2;

/// Log levels accepted in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(CliError::invalid_config(format!(
                "unknown log level '{}': expected trace, debug, info, warn or error",
                other
            ))),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_filter_str())
    }
}

/// Default contract priced when a command gets no contract flags.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    pub option_type: OptionType,
    pub spot: f64,
    pub strike: f64,
    pub maturity: f64,
    pub rate: f64,
    pub dividend_yield: f64,
    pub volatility: f64,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            option_type: OptionType::Call,
            spot: DEFAULT_SPOT,
            strike: DEFAULT_STRIKE,
            maturity: DEFAULT_MATURITY,
            rate: DEFAULT_RISK_FREE_RATE,
            dividend_yield: DEFAULT_DIVIDEND_YIELD,
            volatility: DEFAULT_VOLATILITY,
        }
    }
}

impl ContractConfig {
    /// European option described by this section.
    pub fn to_spec(&self) -> OptionSpec {
        OptionSpec::new(
            self.option_type,
            self.spot,
            self.strike,
            self.maturity,
            self.rate,
            self.volatility,
        )
        .with_dividend_yield(self.dividend_yield)
    }
}

/// Resolution of the numerical engines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Binomial tree steps.
    pub tree_steps: usize,
    /// Monte Carlo paths.
    pub mc_paths: usize,
    /// Monte Carlo time steps (Euler scheme and Heston simulation).
    pub mc_steps: usize,
    /// Seed shared by every stochastic computation.
    pub seed: u64,
    pub antithetic: bool,
    pub control_variate: bool,
    pub pde_price_steps: usize,
    pub pde_time_steps: usize,
    pub pde_s_max_multiplier: f64,
    pub pde_scheme: Scheme,
    pub pde_rannacher_steps: usize,
    /// Price gap to Black-Scholes above which an engine is flagged.
    pub model_tolerance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tree_steps: DEFAULT_TREE_STEPS,
            mc_paths: DEFAULT_PATHS,
            mc_steps: DEFAULT_STEPS,
            seed: DEFAULT_SEED,
            antithetic: true,
            control_variate: false,
            pde_price_steps: DEFAULT_PRICE_STEPS,
            pde_time_steps: DEFAULT_TIME_STEPS,
            pde_s_max_multiplier: DEFAULT_S_MAX_MULTIPLIER,
            pde_scheme: Scheme::CrankNicolson,
            pde_rannacher_steps: DEFAULT_RANNACHER_STEPS,
            model_tolerance: DEFAULT_MODEL_TOLERANCE,
        }
    }
}

impl EngineConfig {
    /// Finite-difference settings.
    pub fn pde(&self) -> PdeConfig {
        PdeConfig {
            price_steps: self.pde_price_steps,
            time_steps: self.pde_time_steps,
            s_max_multiplier: self.pde_s_max_multiplier,
            scheme: self.pde_scheme,
            rannacher_steps: self.pde_rannacher_steps,
        }
    }

    /// Monte Carlo settings, validated by the builder.
    pub fn monte_carlo(&self) -> Result<MonteCarloConfig> {
        MonteCarloConfig::builder()
            .n_paths(self.mc_paths)
            .n_steps(self.mc_steps)
            .seed(self.seed)
            .antithetic(self.antithetic)
            .control_variate(self.control_variate)
            .build()
            .map_err(|e| CliError::invalid_config(format!("engines: {}", e)))
    }
}

/// Heston variance dynamics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HestonConfig {
    pub v0: f64,
    pub kappa: f64,
    pub theta: f64,
    pub xi: f64,
    pub rho: f64,
}

impl Default for HestonConfig {
    fn default() -> Self {
        Self {
            v0: DEFAULT_V0,
            kappa: DEFAULT_KAPPA,
            theta: DEFAULT_THETA,
            xi: DEFAULT_XI,
            rho: DEFAULT_RHO,
        }
    }
}

impl HestonConfig {
    /// Validated model parameters.
    pub fn params(&self) -> Result<HestonParams> {
        Ok(HestonParams::new(self.v0, self.kappa, self.theta, self.xi, self.rho)?)
    }
}

/// Hedging simulation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HedgingConfig {
    pub n_paths: usize,
    pub n_steps: usize,
    pub rebalance_intervals: Vec<usize>,
    pub cost_rates: Vec<f64>,
    /// Level of VaR and CVaR in every report.
    pub confidence: f64,
}

impl Default for HedgingConfig {
    fn default() -> Self {
        Self {
            n_paths: DEFAULT_HEDGE_PATHS,
            n_steps: DEFAULT_HEDGE_STEPS,
            rebalance_intervals: DEFAULT_REBALANCE_INTERVALS.to_vec(),
            cost_rates: DEFAULT_COST_RATES.to_vec(),
            confidence: DEFAULT_CONFIDENCE,
        }
    }
}

/// Thresholds for historical price files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub min_observations: usize,
    pub max_gap_days: i64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            min_observations: DEFAULT_MIN_OBSERVATIONS,
            max_gap_days: DEFAULT_MAX_GAP_DAYS,
        }
    }
}

/// Fully resolved hedgekit configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Used when `RUST_LOG` is unset.
    pub log_level: LogLevel,
    /// Used when `--format` is not given.
    pub format: OutputFormat,
    pub contract: ContractConfig,
    pub engines: EngineConfig,
    pub heston: HestonConfig,
    pub hedging: HedgingConfig,
    pub overlay: OverlayConfig,
    pub data: DataConfig,
}

impl AppConfig {
    /// Loads defaults, the configuration file and `HEDGEKIT_*` variables.
    ///
    /// With `path = None` the default file is optional; an explicit path
    /// must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::FileNotFound(path.display().to_string()));
                }
                File::from(path).required(true)
            }
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("hedging.rebalance_intervals")
                    .with_list_parse_key("hedging.cost_rates"),
            )
            .build()?;
        Self::from_settings(settings)
    }

    /// Parses TOML text on top of the defaults, without environment overrides.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()?;
        Self::from_settings(settings)
    }

    fn from_settings(settings: Config) -> Result<Self> {
        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every section eagerly so commands can rely on it.
    pub fn validate(&self) -> Result<()> {
        self.contract
            .to_spec()
            .validate()
            .map_err(|e| CliError::invalid_config(format!("contract: {}", e)))?;

        let engines = &self.engines;
        if engines.tree_steps == 0 {
            return Err(CliError::invalid_config("engines.tree_steps must be at least 1"));
        }
        engines.monte_carlo()?;
        if !(engines.model_tolerance >= 0.0 && engines.model_tolerance.is_finite()) {
            return Err(CliError::invalid_config(format!(
                "engines.model_tolerance = {} (must be non-negative)",
                engines.model_tolerance
            )));
        }

        self.heston
            .params()
            .map_err(|e| CliError::invalid_config(format!("heston: {}", e)))?;

        let hedging = &self.hedging;
        if hedging.n_paths < 2 || hedging.n_steps == 0 {
            return Err(CliError::invalid_config(
                "hedging needs n_paths >= 2 and n_steps >= 1",
            ));
        }
        if hedging.rebalance_intervals.is_empty() || hedging.rebalance_intervals.contains(&0) {
            return Err(CliError::invalid_config(
                "hedging.rebalance_intervals must be non-empty and positive",
            ));
        }
        if hedging.cost_rates.is_empty()
            || hedging.cost_rates.iter().any(|r| !(*r >= 0.0 && r.is_finite()))
        {
            return Err(CliError::invalid_config(
                "hedging.cost_rates must be non-empty and non-negative",
            ));
        }
        if !(hedging.confidence > 0.0 && hedging.confidence < 1.0) {
            return Err(CliError::invalid_config(format!(
                "hedging.confidence = {} (must lie in (0, 1))",
                hedging.confidence
            )));
        }

        self.overlay
            .validate()
            .map_err(|e| CliError::invalid_config(format!("overlay: {}", e)))?;

        if self.data.max_gap_days < 1 {
            return Err(CliError::invalid_config("data.max_gap_days must be at least 1"));
        }
        Ok(())
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Defaults
    // ========================================================================

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.format, OutputFormat::Table);
        assert_eq!(config.contract.spot, 100.0);
        assert_eq!(config.contract.rate, 0.02);
        assert_eq!(config.engines.tree_steps, 200);
        assert_eq!(config.engines.mc_paths, 200_000);
        assert_eq!(config.engines.seed, 42);
        assert_eq!(config.hedging.rebalance_intervals, vec![1, 2, 5, 10, 21]);
        assert_eq!(config.overlay.budget_fraction, 0.02);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
        assert_eq!(LogLevel::from_str("DEBUG").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("Warn").unwrap(), LogLevel::Warn);
        assert!(LogLevel::from_str("verbose").is_err());
        assert_eq!(LogLevel::Error.to_string(), "error");
    }

    #[test]
    fn test_contract_to_spec() {
        let spec = ContractConfig::default().to_spec();
        assert_eq!(spec.option_type, OptionType::Call);
        assert_eq!(spec.volatility, Some(0.2));
        assert_eq!(spec.dividend_yield, 0.0);
    }

    // ========================================================================
    // TOML Loading
    // ========================================================================

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            log_level = "debug"
            format = "json"

            [contract]
            option_type = "put"
            strike = 95.0

            [hedging]
            rebalance_intervals = [1, 5]
            "#,
        )
        .unwrap();

        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.contract.option_type, OptionType::Put);
        assert_eq!(config.contract.strike, 95.0);
        assert_eq!(config.contract.spot, DEFAULT_SPOT);
        assert_eq!(config.hedging.rebalance_intervals, vec![1, 5]);
        assert_eq!(config.hedging.n_paths, DEFAULT_HEDGE_PATHS);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let negative_spot = AppConfig::from_toml_str("[contract]\nspot = -5.0\n");
        assert!(matches!(negative_spot, Err(CliError::InvalidConfig(_))));

        let zero_interval = AppConfig::from_toml_str("[hedging]\nrebalance_intervals = [0]\n");
        assert!(matches!(zero_interval, Err(CliError::InvalidConfig(_))));

        let bad_rho = AppConfig::from_toml_str("[heston]\nrho = 1.5\n");
        assert!(matches!(bad_rho, Err(CliError::InvalidConfig(_))));

        let bad_budget = AppConfig::from_toml_str("[overlay]\nbudget_fraction = -0.1\n");
        assert!(matches!(bad_budget, Err(CliError::InvalidConfig(_))));
    }

    #[test]
    fn test_unknown_log_level_is_config_error() {
        let result = AppConfig::from_toml_str("log_level = \"loud\"\n");
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_explicit_missing_file() {
        let result = AppConfig::load(Some(Path::new("/nonexistent/hedgekit.toml")));
        assert!(matches!(result, Err(CliError::FileNotFound(_))));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AppConfig::default();
        let text = config.to_toml().unwrap();
        assert!(text.contains("[contract]"));
        assert_eq!(AppConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_example_file_matches_defaults() {
        let example = AppConfig::from_toml_str(include_str!("../hedgekit.example.toml")).unwrap();
        assert_eq!(example, AppConfig::default());
    }
}
