//! Heston Monte Carlo, used to cross-check the semi-closed form.
//!
//! Variance follows a full-truncation Euler scheme and the spot a log-Euler
//! step driven by the truncated variance:
//!
//! ```text
//! v⁺      = max(v, 0)
//! S(t+dt) = S(t)·exp((r - q - v⁺/2)·dt + √v⁺·√dt·Z₁)
//! v(t+dt) = max(v + κ(θ - v⁺)·dt + ξ·√v⁺·√dt·Z₂, 0)
//! Z₂      = ρ·Z₁ + √(1-ρ²)·Z
//! ```
//!
//! Conditional on v⁺ the spot step is an exact martingale, so the
//! terminal-spot control variate keeps its known mean `S·e^{-qT}`.

use pricer_core::traits::PricingEngine;
use pricer_core::types::{ExerciseStyle, OptionSpec, PricingError, PricingResult};
use pricer_models::models::HestonParams;

use super::config::MonteCarloConfig;
use super::estimator::{estimate, MonteCarloEstimate, TerminalSampler};
use super::pricer::DELTA_BUMP_FRACTION;

struct HestonPath {
    spot: f64,
    drift: f64,
    dt: f64,
    sqrt_dt: f64,
    params: HestonParams,
    rho_bar: f64,
    n_steps: usize,
}

impl TerminalSampler for HestonPath {
    fn normals_per_path(&self) -> usize {
        2 * self.n_steps
    }

    fn terminal(&self, normals: &[f64]) -> f64 {
        let p = &self.params;
        let mut log_s = self.spot.ln();
        let mut v = p.v0;
        for pair in normals.chunks_exact(2) {
            let z1 = pair[0];
            let z2 = p.rho * z1 + self.rho_bar * pair[1];
            let v_pos = v.max(0.0);
            let vol = v_pos.sqrt();
            log_s += (self.drift - 0.5 * v_pos) * self.dt + vol * self.sqrt_dt * z1;
            let dv = p.kappa * (p.theta - v_pos) * self.dt + p.xi * vol * self.sqrt_dt * z2;
            v = (v + dv).max(0.0);
        }
        log_s.exp()
    }
}

/// Monte Carlo engine for European options under Heston dynamics.
///
/// The configured [`Discretisation`](super::Discretisation) is ignored: the
/// scheme is always full-truncation Euler with `n_steps` steps.
///
/// # Examples
///
/// ```rust
/// use pricer_core::traits::PricingEngine;
/// use pricer_core::types::OptionSpec;
/// use pricer_models::models::HestonParams;
/// use pricer_pricing::mc::{HestonMonteCarloEngine, MonteCarloConfig};
///
/// let config = MonteCarloConfig::builder().n_paths(20_000).n_steps(100).build().unwrap();
/// let engine = HestonMonteCarloEngine::new(HestonParams::default(), config).unwrap();
/// let spec = OptionSpec::european_call(100.0, 100.0, 1.0, 0.0, 0.2);
/// let result = engine.price(&spec).unwrap();
/// assert!(result.price > 5.0 && result.price < 10.0);
/// ```
#[derive(Clone, Debug)]
pub struct HestonMonteCarloEngine {
    params: HestonParams,
    config: MonteCarloConfig,
}

impl HestonMonteCarloEngine {
    /// Validates the model parameters.
    ///
    /// # Errors
    /// `InvalidParameter` if the Heston parameters are out of domain.
    pub fn new(params: HestonParams, config: MonteCarloConfig) -> Result<Self, PricingError> {
        params.validate()?;
        Ok(Self { params, config })
    }

    /// Returns the model parameters.
    #[inline]
    pub fn params(&self) -> &HestonParams {
        &self.params
    }

    /// Discounted-payoff estimate. `spec.volatility` is not used.
    ///
    /// # Errors
    /// `InvalidParameter` for invalid or expired specs and American exercise.
    pub fn estimate(&self, spec: &OptionSpec) -> Result<MonteCarloEstimate, PricingError> {
        self.check(spec)?;
        if spec.is_expired() {
            return Err(PricingError::InvalidParameter(
                "cannot simulate an expired option".to_string(),
            ));
        }
        let n_steps = self.config.n_steps();
        let dt = spec.maturity / n_steps as f64;
        let sampler = HestonPath {
            spot: spec.spot,
            drift: spec.rate - spec.dividend_yield,
            dt,
            sqrt_dt: dt.sqrt(),
            params: self.params,
            rho_bar: (1.0 - self.params.rho * self.params.rho).max(0.0).sqrt(),
            n_steps,
        };
        estimate(&sampler, spec, spec.spot * spec.dividend_discount(), &self.config)
    }

    fn check(&self, spec: &OptionSpec) -> Result<(), PricingError> {
        spec.validate()?;
        if spec.exercise != ExerciseStyle::European {
            return Err(PricingError::InvalidParameter(
                "Heston Monte Carlo prices European exercise only".to_string(),
            ));
        }
        Ok(())
    }
}

impl PricingEngine for HestonMonteCarloEngine {
    fn name(&self) -> &str {
        "heston-mc"
    }

    fn price(&self, spec: &OptionSpec) -> Result<PricingResult, PricingError> {
        self.check(spec)?;
        if spec.is_expired() {
            return Ok(PricingResult::new(spec.intrinsic(spec.spot)));
        }
        let est = self.estimate(spec)?;
        tracing::debug!(
            engine = self.name(),
            price = est.price,
            std_error = est.std_error,
            "priced"
        );
        Ok(PricingResult::new(est.price).with_interval(est.std_error, est.confidence_interval))
    }

    /// Central difference on common random numbers.
    fn delta(&self, spec: &OptionSpec) -> Result<f64, PricingError> {
        self.check(spec)?;
        if spec.is_expired() {
            return Ok(if spec.intrinsic(spec.spot) > 0.0 {
                spec.option_type.sign()
            } else {
                0.0
            });
        }
        let h = DELTA_BUMP_FRACTION * spec.spot;
        let up = self.estimate(&spec.with_spot(spec.spot + h))?.price;
        let down = self.estimate(&spec.with_spot(spec.spot - h))?.price;
        Ok((up - down) / (2.0 * h))
    }
}
