//! Hedging experiments over many simulated paths.
//!
//! [`simulate_paths`] fans one hedging configuration out over a [`PathSet`]
//! on the rayon pool. [`HedgingExperiment`] generates a seeded set of GBM
//! paths once and reuses it for every cell of a rebalance-interval x
//! cost-rate grid, so cells differ only by their hedging settings.

use pricer_core::types::{OptionSpec, PricingError};
use pricer_pricing::mc::{generate_gbm_paths, Discretisation, GbmParams, PathSet, DEFAULT_SEED};
use pricer_pricing::rng::PricerRng;
use rayon::prelude::*;

use super::cost::{CostModel, ProportionalCost};
use super::simulator::{simulate, DeltaFn, HedgingOutcome, RebalanceSchedule};
use crate::metrics::{mean, RiskSummary, DEFAULT_CONFIDENCE};

/// Rebalance intervals, in steps, swept by default.
pub const DEFAULT_REBALANCE_INTERVALS: [usize; 5] = [1, 2, 5, 10, 21];

/// Proportional cost rates swept by default.
pub const DEFAULT_COST_RATES: [f64; 3] = [0.0, 0.0005, 0.001];

/// Default number of hedged paths.
pub const DEFAULT_HEDGE_PATHS: usize = 2_000;

/// Default number of observations per path after inception (daily for a year).
pub const DEFAULT_HEDGE_STEPS: usize = 252;

/// Hedges every path of `paths` in parallel.
///
/// Outcomes are returned in path order.
///
/// # Errors
/// `InvalidPath` if the path grid does not span `spec.maturity`; otherwise
/// the first error raised by [`simulate`].
pub fn simulate_paths<D, C>(
    spec: &OptionSpec,
    delta_fn: &D,
    paths: &PathSet,
    schedule: &RebalanceSchedule,
    cost_model: &C,
) -> Result<Vec<HedgingOutcome>, PricingError>
where
    D: DeltaFn + ?Sized,
    C: CostModel + ?Sized,
{
    let horizon = paths.dt() * paths.n_steps() as f64;
    if (horizon - spec.maturity).abs() > 1e-9 * spec.maturity.max(1.0) {
        return Err(PricingError::InvalidPath(format!(
            "paths span {} years but the option matures in {}",
            horizon, spec.maturity
        )));
    }

    (0..paths.n_paths())
        .into_par_iter()
        .map(|i| simulate(spec, delta_fn, paths.path(i), schedule, cost_model))
        .collect()
}

/// One cell of a hedging experiment grid.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExperimentCell {
    /// Rebalance interval in steps.
    pub rebalance_every: usize,
    /// Proportional cost rate.
    pub cost_rate: f64,
    /// Average number of trades per path.
    pub mean_trades: f64,
    /// Average trading cost per path.
    pub mean_costs: f64,
    /// Statistics of the hedging errors.
    pub summary: RiskSummary,
}

/// Grid of delta-hedging simulations on seeded GBM paths.
///
/// # Examples
///
/// ```rust
/// use pricer_core::types::OptionSpec;
/// use pricer_models::analytical::BlackScholesEngine;
/// use pricer_risk::hedging::{EngineDelta, HedgingExperiment};
///
/// let spec = OptionSpec::european_call(100.0, 100.0, 1.0, 0.02, 0.2);
/// let engine = BlackScholesEngine::default();
/// let cells = HedgingExperiment::new(200, 50, 42)
///     .with_grid(vec![1, 10], vec![0.0])
///     .run(&spec, &EngineDelta::new(&engine))
///     .unwrap();
/// assert_eq!(cells.len(), 2);
/// assert!(cells[0].summary.std_dev < cells[1].summary.std_dev);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HedgingExperiment {
    /// Number of simulated paths.
    pub n_paths: usize,
    /// Observations per path after inception.
    pub n_steps: usize,
    /// Seed of the path generator.
    pub seed: u64,
    /// Volatility of the simulated paths; `None` uses the option's
    /// volatility, i.e. the hedging model is correctly specified.
    pub path_volatility: Option<f64>,
    /// Rebalance intervals in steps.
    pub rebalance_intervals: Vec<usize>,
    /// Proportional cost rates.
    pub cost_rates: Vec<f64>,
    /// Level for VaR and CVaR.
    pub confidence: f64,
}

impl Default for HedgingExperiment {
    fn default() -> Self {
        Self {
            n_paths: DEFAULT_HEDGE_PATHS,
            n_steps: DEFAULT_HEDGE_STEPS,
            seed: DEFAULT_SEED,
            path_volatility: None,
            rebalance_intervals: DEFAULT_REBALANCE_INTERVALS.to_vec(),
            cost_rates: DEFAULT_COST_RATES.to_vec(),
            confidence: DEFAULT_CONFIDENCE,
        }
    }
}

impl HedgingExperiment {
    /// Experiment with the default grid.
    pub fn new(n_paths: usize, n_steps: usize, seed: u64) -> Self {
        Self {
            n_paths,
            n_steps,
            seed,
            ..Self::default()
        }
    }

    /// Replaces the rebalance-interval and cost-rate grid.
    pub fn with_grid(mut self, rebalance_intervals: Vec<usize>, cost_rates: Vec<f64>) -> Self {
        self.rebalance_intervals = rebalance_intervals;
        self.cost_rates = cost_rates;
        self
    }

    /// Simulates paths with `volatility` instead of the option's.
    pub fn with_path_volatility(mut self, volatility: f64) -> Self {
        self.path_volatility = Some(volatility);
        self
    }

    /// Sets the VaR/CVaR level.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Checks counts and the grid.
    ///
    /// # Errors
    /// `InsufficientSamples` for fewer than two paths; `InvalidParameter` for
    /// zero steps, an empty grid, a zero interval or an invalid cost rate.
    pub fn validate(&self) -> Result<(), PricingError> {
        if self.n_paths < 2 {
            return Err(PricingError::InsufficientSamples {
                got: self.n_paths,
                need: 2,
            });
        }
        if self.n_steps == 0 {
            return Err(PricingError::InvalidParameter(
                "hedging experiment needs at least one step".to_string(),
            ));
        }
        if self.rebalance_intervals.is_empty() || self.cost_rates.is_empty() {
            return Err(PricingError::InvalidParameter(
                "hedging experiment grid is empty".to_string(),
            ));
        }
        if self.rebalance_intervals.contains(&0) {
            return Err(PricingError::InvalidParameter(
                "rebalance interval must be at least one step".to_string(),
            ));
        }
        for &rate in &self.cost_rates {
            ProportionalCost::proportional(rate)?;
        }
        Ok(())
    }

    /// Simulates the shared path set under the risk-neutral drift of `spec`.
    ///
    /// # Errors
    /// `InvalidParameter` if `spec` has no volatility and none is configured
    /// for the paths, or the GBM parameters are invalid.
    pub fn generate_paths(&self, spec: &OptionSpec) -> Result<PathSet, PricingError> {
        let volatility = match self.path_volatility {
            Some(v) => v,
            None => spec.require_volatility()?,
        };
        let params = GbmParams::new(
            spec.spot,
            spec.rate,
            spec.dividend_yield,
            volatility,
            spec.maturity,
        );
        let mut rng = PricerRng::from_seed(self.seed);
        generate_gbm_paths(&params, self.n_paths, self.n_steps, Discretisation::Exact, &mut rng)
    }

    /// Runs every grid cell, intervals outermost, in grid order.
    ///
    /// # Errors
    /// Any error from [`HedgingExperiment::validate`], path generation or
    /// the simulator.
    pub fn run<D: DeltaFn + ?Sized>(
        &self,
        spec: &OptionSpec,
        delta_fn: &D,
    ) -> Result<Vec<ExperimentCell>, PricingError> {
        self.validate()?;
        let paths = self.generate_paths(spec)?;
        tracing::info!(
            n_paths = self.n_paths,
            n_steps = self.n_steps,
            cells = self.rebalance_intervals.len() * self.cost_rates.len(),
            "running hedging experiment"
        );

        let mut cells = Vec::with_capacity(self.rebalance_intervals.len() * self.cost_rates.len());
        for &every in &self.rebalance_intervals {
            let schedule = RebalanceSchedule::Every(every);
            for &rate in &self.cost_rates {
                let cost = ProportionalCost::proportional(rate)?;
                let outcomes = simulate_paths(spec, delta_fn, &paths, &schedule, &cost)?;
                let errors: Vec<f64> = outcomes.iter().map(|o| o.hedging_error).collect();
                let trades: Vec<f64> = outcomes.iter().map(|o| o.n_trades as f64).collect();
                let costs: Vec<f64> = outcomes.iter().map(|o| o.total_costs).collect();
                let cell = ExperimentCell {
                    rebalance_every: every,
                    cost_rate: rate,
                    mean_trades: mean(&trades)?,
                    mean_costs: mean(&costs)?,
                    summary: RiskSummary::from_outcomes(&errors, self.confidence)?,
                };
                tracing::debug!(
                    rebalance_every = every,
                    cost_rate = rate,
                    mean_error = cell.summary.mean,
                    std_error = cell.summary.std_dev,
                    "hedging cell done"
                );
                cells.push(cell);
            }
        }
        Ok(cells)
    }
}
