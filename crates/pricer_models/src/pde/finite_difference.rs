//! Implicit and Crank-Nicolson schemes for the Black-Scholes PDE.
//!
//! With τ = T - t the equation reads
//!
//! ```text
//! ∂V/∂τ = ½σ²S²·∂²V/∂S² + (r - q)S·∂V/∂S - rV
//! ```
//!
//! On node `S_i = i·dS` the spatial operator has coefficients
//! α_i = ½σ²i² and β_i = ½(r - q)i:
//!
//! ```text
//! (LV)_i = (α_i - β_i)V_{i-1} - (2α_i + r)V_i + (α_i + β_i)V_{i+1}
//! ```
//!
//! Each time step solves one tridiagonal system. Crank-Nicolson is started
//! with a few fully implicit steps (Rannacher) to damp the payoff kink.

use pricer_core::math::tridiagonal::TridiagonalSystem;
use pricer_core::traits::PricingEngine;
use pricer_core::types::{
    ExerciseStyle, Greeks, OptionSpec, OptionType, PricingError, PricingResult,
};

use super::grid::PriceGrid;

/// Default number of price intervals.
pub const DEFAULT_PRICE_STEPS: usize = 400;
/// Default number of time intervals.
pub const DEFAULT_TIME_STEPS: usize = 400;
/// Default `S_max / max(S, K)`.
pub const DEFAULT_S_MAX_MULTIPLIER: f64 = 3.0;
/// Default number of implicit start-up steps for Crank-Nicolson.
pub const DEFAULT_RANNACHER_STEPS: usize = 2;
/// Tolerated breach of the no-arbitrage bounds, as a fraction of the strike.
pub const BOUND_TOLERANCE_FRACTION: f64 = 1e-3;

/// Time-stepping scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Scheme {
    /// Backward Euler, first order in time.
    Implicit,
    /// Trapezoidal rule, second order in time.
    #[default]
    CrankNicolson,
}

/// Grid and scheme settings.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PdeConfig {
    /// Price intervals M (at least 3).
    pub price_steps: usize,
    /// Time intervals N (at least 1).
    pub time_steps: usize,
    /// `S_max = multiplier · max(S, K)`, must exceed 1.
    pub s_max_multiplier: f64,
    /// Time-stepping scheme.
    pub scheme: Scheme,
    /// Implicit steps taken first when `scheme` is Crank-Nicolson.
    pub rannacher_steps: usize,
}

impl Default for PdeConfig {
    fn default() -> Self {
        Self {
            price_steps: DEFAULT_PRICE_STEPS,
            time_steps: DEFAULT_TIME_STEPS,
            s_max_multiplier: DEFAULT_S_MAX_MULTIPLIER,
            scheme: Scheme::CrankNicolson,
            rannacher_steps: DEFAULT_RANNACHER_STEPS,
        }
    }
}

impl PdeConfig {
    /// Config with the given grid resolution and default scheme settings.
    pub fn with_grid(price_steps: usize, time_steps: usize) -> Self {
        Self {
            price_steps,
            time_steps,
            ..Self::default()
        }
    }

    /// Returns a copy using `scheme`.
    pub fn with_scheme(self, scheme: Scheme) -> Self {
        Self { scheme, ..self }
    }

    fn validate(&self) -> Result<(), PricingError> {
        if self.price_steps < 3 || self.time_steps < 1 {
            return Err(PricingError::InvalidParameter(format!(
                "grid needs price_steps >= 3 and time_steps >= 1, got {} x {}",
                self.price_steps, self.time_steps
            )));
        }
        if !(self.s_max_multiplier > 1.0 && self.s_max_multiplier.is_finite()) {
            return Err(PricingError::InvalidParameter(format!(
                "s_max_multiplier = {} (must be finite and > 1)",
                self.s_max_multiplier
            )));
        }
        Ok(())
    }
}

/// A row of a grid convergence study.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridConvergenceRow {
    /// Price intervals.
    pub price_steps: usize,
    /// Time intervals.
    pub time_steps: usize,
    /// Grid price.
    pub price: f64,
    /// |price - reference|.
    pub abs_error: f64,
}

/// Finite-difference engine for European options.
///
/// # Examples
/// ```
/// use pricer_core::traits::PricingEngine;
/// use pricer_core::types::OptionSpec;
/// use pricer_models::pde::{FiniteDifferenceEngine, PdeConfig};
///
/// let spec = OptionSpec::european_call(100.0, 100.0, 1.0, 0.05, 0.2);
/// let engine = FiniteDifferenceEngine::new(PdeConfig::with_grid(200, 200));
/// let price = engine.price(&spec).unwrap().price;
/// assert!((price - 10.4506).abs() < 0.02);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FiniteDifferenceEngine {
    /// Grid and scheme settings.
    pub config: PdeConfig,
}

/// Dirichlet values `(V(0, τ), V(S_max, τ))`.
fn boundary_values(spec: &OptionSpec, s_max: f64, tau: f64) -> (f64, f64) {
    let pv_strike = spec.strike * (-spec.rate * tau).exp();
    match spec.option_type {
        OptionType::Call => (0.0, s_max * (-spec.dividend_yield * tau).exp() - pv_strike),
        OptionType::Put => (pv_strike, 0.0),
    }
}

/// Bands of `I + θ·dt·(-L)` on the interior nodes `1..M`.
fn operator_bands(spec: &OptionSpec, vol: f64, m: usize, theta_dt: f64) -> [Vec<f64>; 3] {
    let interior = m - 1;
    let mut lower = vec![0.0; interior];
    let mut diag = vec![0.0; interior];
    let mut upper = vec![0.0; interior];
    for k in 0..interior {
        let i = (k + 1) as f64;
        let alpha = 0.5 * vol * vol * i * i;
        let beta = 0.5 * (spec.rate - spec.dividend_yield) * i;
        lower[k] = -theta_dt * (alpha - beta);
        diag[k] = 1.0 + theta_dt * (2.0 * alpha + spec.rate);
        upper[k] = -theta_dt * (alpha + beta);
    }
    [lower, diag, upper]
}

fn ensure_finite(row: &[f64], time_index: usize) -> Result<(), PricingError> {
    match row.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(PricingError::GridInstability(format!(
            "non-finite value at time step {}, node {}",
            time_index, i
        ))),
        None => Ok(()),
    }
}

/// Fails with `GridInstability` on non-finite values or a bound breach.
fn check_row(
    spec: &OptionSpec,
    nodes: &[f64],
    row: &[f64],
    tau: f64,
    time_index: usize,
) -> Result<(), PricingError> {
    ensure_finite(row, time_index)?;
    let tol = BOUND_TOLERANCE_FRACTION * spec.strike;
    let pv_strike = spec.strike * (-spec.rate * tau).exp();
    let q_disc = (-spec.dividend_yield * tau).exp();
    for (&s, &v) in nodes.iter().zip(row) {
        let pv_spot = s * q_disc;
        let (lo, hi) = match spec.option_type {
            OptionType::Call => ((pv_spot - pv_strike).max(0.0), pv_spot),
            OptionType::Put => ((pv_strike - pv_spot).max(0.0), pv_strike),
        };
        if v < lo - tol || v > hi + tol {
            return Err(PricingError::GridInstability(format!(
                "value {} at S = {} breaks the no-arbitrage range [{}, {}] at time step {}",
                v, s, lo, hi, time_index
            )));
        }
    }
    Ok(())
}

impl FiniteDifferenceEngine {
    /// Engine with explicit grid settings.
    pub fn new(config: PdeConfig) -> Self {
        Self { config }
    }

    /// Solves the PDE and returns the full value grid.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` for an invalid spec/config, an expired option or
    ///   American exercise (lattice only)
    /// - `GridInstability` if the scheme produces non-finite or out-of-bounds values
    pub fn solve(&self, spec: &OptionSpec) -> Result<PriceGrid, PricingError> {
        spec.validate()?;
        let vol = spec.require_volatility()?;
        self.config.validate()?;
        if spec.exercise == ExerciseStyle::American {
            return Err(PricingError::InvalidParameter(
                "the finite-difference engine prices European exercise only".to_string(),
            ));
        }
        if spec.is_expired() {
            return Err(PricingError::InvalidParameter(
                "cannot build a time grid for an expired option".to_string(),
            ));
        }

        let m = self.config.price_steps;
        let n_t = self.config.time_steps;
        let s_max = self.config.s_max_multiplier * spec.spot.max(spec.strike);
        let mut grid = PriceGrid::new(m, n_t, s_max, spec.maturity);
        let dt = grid.dt();
        let nodes = grid.spot_nodes();

        for (v, &s) in grid.row_mut(n_t).iter_mut().zip(&nodes) {
            *v = spec.payoff(s);
        }

        let [lo_imp, di_imp, up_imp] = operator_bands(spec, vol, m, dt);
        let (imp_lower_0, imp_upper_last) = (lo_imp[0], up_imp[m - 2]);
        let mut implicit = TridiagonalSystem::new(lo_imp, di_imp, up_imp)?;

        let [lo_cn, di_cn, up_cn] = operator_bands(spec, vol, m, 0.5 * dt);
        let (cn_lower_0, cn_upper_last) = (lo_cn[0], up_cn[m - 2]);
        let mut crank_nicolson = TridiagonalSystem::new(lo_cn, di_cn, up_cn)?;
        // Explicit half: I + ½dt·L
        let [lo_ex, di_ex, up_ex] = operator_bands(spec, vol, m, -0.5 * dt);
        let explicit = TridiagonalSystem::new(lo_ex, di_ex, up_ex)?;

        let interior = m - 1;
        let mut rhs = vec![0.0; interior];
        let mut solution = vec![0.0; interior];

        for n in (0..n_t).rev() {
            let step = n_t - 1 - n;
            let tau_old = spec.maturity - (n + 1) as f64 * dt;
            let tau_new = spec.maturity - n as f64 * dt;
            let (left_old, right_old) = boundary_values(spec, s_max, tau_old);
            let (left_new, right_new) = boundary_values(spec, s_max, tau_new);
            let previous = grid.row(n + 1);

            let use_cn = self.config.scheme == Scheme::CrankNicolson
                && step >= self.config.rannacher_steps;
            if use_cn {
                explicit.multiply(&previous[1..m], &mut rhs);
                rhs[0] -= cn_lower_0 * left_old;
                rhs[interior - 1] -= cn_upper_last * right_old;
                rhs[0] -= cn_lower_0 * left_new;
                rhs[interior - 1] -= cn_upper_last * right_new;
                crank_nicolson.solve(&rhs, &mut solution)?;
            } else {
                rhs.copy_from_slice(&previous[1..m]);
                rhs[0] -= imp_lower_0 * left_new;
                rhs[interior - 1] -= imp_upper_last * right_new;
                implicit.solve(&rhs, &mut solution)?;
            }

            let row = grid.row_mut(n);
            row[0] = left_new;
            row[m] = right_new;
            row[1..m].copy_from_slice(&solution);
            ensure_finite(row, n)?;
        }

        check_row(spec, &nodes, grid.row(0), spec.maturity, 0)?;
        Ok(grid)
    }
}

impl PricingEngine for FiniteDifferenceEngine {
    fn name(&self) -> &str {
        "pde-fd"
    }

    fn price(&self, spec: &OptionSpec) -> Result<PricingResult, PricingError> {
        if spec.is_expired() {
            spec.validate()?;
            let intrinsic = spec.intrinsic(spec.spot);
            let delta = if intrinsic > 0.0 { spec.option_type.sign() } else { 0.0 };
            return Ok(PricingResult::new(intrinsic).with_greeks(Greeks::delta_only(delta)));
        }
        let grid = self.solve(spec)?;
        let reading = grid.read_at(spec.spot)?;

        tracing::debug!(
            price_steps = self.config.price_steps,
            time_steps = self.config.time_steps,
            scheme = ?self.config.scheme,
            price = reading.price,
            "finite-difference grid solved"
        );

        Ok(PricingResult::new(reading.price).with_greeks(Greeks {
            delta: Some(reading.delta),
            gamma: Some(reading.gamma),
            ..Greeks::default()
        }))
    }
}

/// Grid prices for each `(price_steps, time_steps)` pair against a reference.
pub fn convergence_table(
    spec: &OptionSpec,
    base: PdeConfig,
    grids: &[(usize, usize)],
    reference: f64,
) -> Result<Vec<GridConvergenceRow>, PricingError> {
    grids
        .iter()
        .map(|&(price_steps, time_steps)| {
            let config = PdeConfig {
                price_steps,
                time_steps,
                ..base
            };
            let price = FiniteDifferenceEngine::new(config).price(spec)?.price;
            Ok(GridConvergenceRow {
                price_steps,
                time_steps,
                price,
                abs_error: (price - reference).abs(),
            })
        })
        .collect()
}
