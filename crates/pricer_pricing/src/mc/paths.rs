//! Path generation for Monte Carlo simulation and hedging studies.
//!
//! Geometric Brownian motion under the risk-neutral measure,
//!
//! ```text
//! dS = (r - q)·S·dt + σ·S·dW
//! ```
//!
//! discretised either with Euler-Maruyama or with the exact lognormal
//! transition.
//!
//! # Memory Layout
//!
//! [`PathSet`] stores paths in row-major order:
//! `values[path_idx * (n_steps + 1) + step_idx]`, where `step_idx = 0`
//! holds the initial spot.

use pricer_core::types::{OptionSpec, PricingError};

use super::config::Discretisation;
use crate::rng::PricerRng;

/// Parameters of a risk-neutral GBM.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::GbmParams;
///
/// let params = GbmParams::new(100.0, 0.05, 0.0, 0.2, 1.0);
/// assert!(params.validate().is_ok());
/// assert!((params.expected_terminal() - 100.0 * 0.05_f64.exp()).abs() < 1e-12);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GbmParams {
    /// Initial spot price (S₀).
    pub spot: f64,
    /// Risk-free rate (r), annualised.
    pub rate: f64,
    /// Continuous dividend yield (q), annualised.
    pub dividend_yield: f64,
    /// Volatility (σ), annualised.
    pub volatility: f64,
    /// Horizon in years (T).
    pub maturity: f64,
}

impl GbmParams {
    /// Creates new GBM parameters.
    #[inline]
    pub fn new(spot: f64, rate: f64, dividend_yield: f64, volatility: f64, maturity: f64) -> Self {
        Self {
            spot,
            rate,
            dividend_yield,
            volatility,
            maturity,
        }
    }

    /// Dynamics implied by an option contract.
    ///
    /// # Errors
    /// `InvalidParameter` when `spec` is invalid or has no volatility.
    pub fn from_spec(spec: &OptionSpec) -> Result<Self, PricingError> {
        spec.validate()?;
        let params = Self::new(
            spec.spot,
            spec.rate,
            spec.dividend_yield,
            spec.require_volatility()?,
            spec.maturity,
        );
        params.validate()?;
        Ok(params)
    }

    /// Validates positivity and finiteness.
    ///
    /// # Errors
    /// `InvalidParameter` naming the first offending field.
    pub fn validate(&self) -> Result<(), PricingError> {
        if !(self.spot > 0.0 && self.spot.is_finite()) {
            return Err(PricingError::invalid("spot", self.spot));
        }
        if !(self.volatility > 0.0 && self.volatility.is_finite()) {
            return Err(PricingError::invalid("volatility", self.volatility));
        }
        if !(self.maturity > 0.0 && self.maturity.is_finite()) {
            return Err(PricingError::invalid("maturity", self.maturity));
        }
        if !self.rate.is_finite() || !self.dividend_yield.is_finite() {
            return Err(PricingError::InvalidParameter(format!(
                "rates must be finite: r = {}, q = {}",
                self.rate, self.dividend_yield
            )));
        }
        Ok(())
    }

    /// Risk-neutral drift `r - q`.
    #[inline]
    pub fn drift(&self) -> f64 {
        self.rate - self.dividend_yield
    }

    /// E[S_T] = S₀·e^{(r-q)T}.
    #[inline]
    pub fn expected_terminal(&self) -> f64 {
        self.spot * (self.drift() * self.maturity).exp()
    }
}

impl Default for GbmParams {
    fn default() -> Self {
        Self {
            spot: 100.0,
            rate: 0.05,
            dividend_yield: 0.0,
            volatility: 0.2,
            maturity: 1.0,
        }
    }
}

/// Per-step transition of a GBM with a fixed time step.
///
/// Precomputes the drift and diffusion terms once so that the inner loop is
/// a single multiply-add (and `exp` for the exact scheme).
#[derive(Clone, Copy, Debug)]
pub(crate) struct GbmStepper {
    scheme: Discretisation,
    drift_dt: f64,
    vol_sqrt_dt: f64,
}

impl GbmStepper {
    pub(crate) fn new(params: &GbmParams, dt: f64, scheme: Discretisation) -> Self {
        let sigma = params.volatility;
        let drift_dt = match scheme {
            Discretisation::EulerMaruyama => params.drift() * dt,
            Discretisation::Exact => (params.drift() - 0.5 * sigma * sigma) * dt,
        };
        Self {
            scheme,
            drift_dt,
            vol_sqrt_dt: sigma * dt.sqrt(),
        }
    }

    /// Advances `s` by one step driven by the standard normal `z`.
    #[inline]
    pub(crate) fn step(&self, s: f64, z: f64) -> f64 {
        match self.scheme {
            Discretisation::EulerMaruyama => s * (1.0 + self.drift_dt + self.vol_sqrt_dt * z),
            Discretisation::Exact => s * (self.drift_dt + self.vol_sqrt_dt * z).exp(),
        }
    }
}

/// One or more price paths observed on a uniform time grid.
///
/// Either simulated by [`generate_gbm_paths`] or supplied as a single
/// historical path through [`PathSet::from_observations`].
#[derive(Clone, Debug, PartialEq)]
pub struct PathSet {
    n_paths: usize,
    n_steps: usize,
    dt: f64,
    values: Vec<f64>,
}

impl PathSet {
    /// Wraps one observed path (e.g. historical closes) with step `dt`.
    ///
    /// # Errors
    /// `InvalidPath` if fewer than two observations are supplied or an
    /// observation is non-positive or non-finite; `InvalidParameter` if
    /// `dt` is not positive.
    pub fn from_observations(prices: Vec<f64>, dt: f64) -> Result<Self, PricingError> {
        if prices.len() < 2 {
            return Err(PricingError::InvalidPath(format!(
                "need at least 2 observations, got {}",
                prices.len()
            )));
        }
        if let Some((i, p)) = prices
            .iter()
            .enumerate()
            .find(|(_, p)| !(**p > 0.0 && p.is_finite()))
        {
            return Err(PricingError::InvalidPath(format!(
                "observation {} = {} is not a positive price",
                i, p
            )));
        }
        if !(dt > 0.0 && dt.is_finite()) {
            return Err(PricingError::invalid("dt", dt));
        }
        Ok(Self {
            n_paths: 1,
            n_steps: prices.len() - 1,
            dt,
            values: prices,
        })
    }

    /// Number of paths.
    #[inline]
    pub fn n_paths(&self) -> usize {
        self.n_paths
    }

    /// Number of steps per path (observations minus one).
    #[inline]
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Time step in years.
    #[inline]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Observations of path `index`, `n_steps + 1` long.
    ///
    /// # Panics
    /// If `index >= n_paths`.
    #[inline]
    pub fn path(&self, index: usize) -> &[f64] {
        let width = self.n_steps + 1;
        &self.values[index * width..(index + 1) * width]
    }

    /// Iterates over the paths in order.
    pub fn iter(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.values.chunks_exact(self.n_steps + 1)
    }

    /// Terminal value of every path.
    pub fn terminals(&self) -> Vec<f64> {
        self.iter().map(|p| p[self.n_steps]).collect()
    }
}

/// Simulates `n_paths` GBM paths of `n_steps` steps over `params.maturity`.
///
/// Paths are drawn sequentially from `rng`, so a fixed seed reproduces the
/// set bit for bit.
///
/// # Errors
/// `InvalidParameter` for invalid dynamics or zero path/step counts.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::{generate_gbm_paths, Discretisation, GbmParams};
/// use pricer_pricing::rng::PricerRng;
///
/// let mut rng = PricerRng::from_seed(42);
/// let paths = generate_gbm_paths(&GbmParams::default(), 4, 252, Discretisation::Exact, &mut rng).unwrap();
/// assert_eq!(paths.n_paths(), 4);
/// assert_eq!(paths.path(0).len(), 253);
/// assert_eq!(paths.path(3)[0], 100.0);
/// ```
pub fn generate_gbm_paths(
    params: &GbmParams,
    n_paths: usize,
    n_steps: usize,
    scheme: Discretisation,
    rng: &mut PricerRng,
) -> Result<PathSet, PricingError> {
    params.validate()?;
    if n_paths == 0 || n_steps == 0 {
        return Err(PricingError::InvalidParameter(format!(
            "path and step counts must be positive: n_paths = {}, n_steps = {}",
            n_paths, n_steps
        )));
    }

    let dt = params.maturity / n_steps as f64;
    let stepper = GbmStepper::new(params, dt, scheme);
    let width = n_steps + 1;
    let mut values = vec![0.0; n_paths * width];

    for path in values.chunks_exact_mut(width) {
        path[0] = params.spot;
        for step in 0..n_steps {
            path[step + 1] = stepper.step(path[step], rng.gen_normal());
        }
    }

    Ok(PathSet {
        n_paths,
        n_steps,
        dt,
        values,
    })
}
