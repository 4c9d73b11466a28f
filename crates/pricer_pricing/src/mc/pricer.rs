//! Monte Carlo pricing engine for European options under GBM.
//!
//! # Overview
//!
//! [`MonteCarloEngine`] coordinates:
//! 1. Seeded random number generation per chunk (via [`PricerRng`](crate::rng::PricerRng))
//! 2. Terminal sampling with the configured [`Discretisation`]
//! 3. Antithetic pairing and the terminal-spot control variate
//! 4. Discounting, aggregation and the confidence interval
//! 5. Greeks via bump-and-revalue with common random numbers
//!
//! # Common Random Numbers
//!
//! Every bumped revaluation reuses the base seed, so the base and bumped
//! runs see the same normals and the finite difference measures the
//! parameter effect rather than sampling noise.

use pricer_core::traits::PricingEngine;
use pricer_core::types::{
    ConfidenceInterval, ExerciseStyle, Greeks, OptionSpec, PricingError, PricingResult,
};

use super::config::{Discretisation, MonteCarloConfig};
use super::estimator::{estimate, z_score, MonteCarloEstimate, TerminalSampler};
use super::paths::{GbmParams, GbmStepper};

/// Relative spot bump for delta and gamma.
pub const DELTA_BUMP_FRACTION: f64 = 0.01;

/// Absolute volatility bump for vega.
pub const VEGA_BUMP: f64 = 0.01;

/// Absolute rate bump for rho.
pub const RHO_BUMP: f64 = 1e-4;

/// One exact lognormal draw from S₀ to S_T.
struct ExactTerminal {
    stepper: GbmStepper,
    spot: f64,
}

impl TerminalSampler for ExactTerminal {
    fn normals_per_path(&self) -> usize {
        1
    }

    #[inline]
    fn terminal(&self, normals: &[f64]) -> f64 {
        self.stepper.step(self.spot, normals[0])
    }
}

/// Full Euler-Maruyama path, one normal per step.
struct EulerPath {
    stepper: GbmStepper,
    spot: f64,
    n_steps: usize,
}

impl TerminalSampler for EulerPath {
    fn normals_per_path(&self) -> usize {
        self.n_steps
    }

    #[inline]
    fn terminal(&self, normals: &[f64]) -> f64 {
        normals.iter().fold(self.spot, |s, &z| self.stepper.step(s, z))
    }
}

/// Monte Carlo engine for European calls and puts.
///
/// # Examples
///
/// ```rust
/// use pricer_core::traits::PricingEngine;
/// use pricer_core::types::OptionSpec;
/// use pricer_pricing::mc::{MonteCarloConfig, MonteCarloEngine};
///
/// let config = MonteCarloConfig::builder().n_paths(100_000).seed(42).build().unwrap();
/// let engine = MonteCarloEngine::new(config);
///
/// let spec = OptionSpec::european_call(100.0, 100.0, 1.0, 0.05, 0.2);
/// let result = engine.price(&spec).unwrap();
/// let ci = result.confidence_interval.unwrap();
/// assert!(ci.lower < 10.4506 && 10.4506 < ci.upper);
/// ```
#[derive(Clone, Debug)]
pub struct MonteCarloEngine {
    config: MonteCarloConfig,
    greeks: bool,
}

impl Default for MonteCarloEngine {
    fn default() -> Self {
        Self::new(MonteCarloConfig::default())
    }
}

impl MonteCarloEngine {
    /// Creates an engine that reports price, interval and CRN Greeks.
    pub fn new(config: MonteCarloConfig) -> Self {
        Self {
            config,
            greeks: true,
        }
    }

    /// Enables or disables the Greek revaluations in [`PricingEngine::price`].
    pub fn with_greeks(mut self, greeks: bool) -> Self {
        self.greeks = greeks;
        self
    }

    /// Returns the simulation configuration.
    #[inline]
    pub fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    /// Discounted-payoff estimate of a live European option.
    ///
    /// # Errors
    /// - `InvalidParameter` for invalid or expired specs and American exercise
    /// - `InsufficientSamples` when fewer than two samples are configured
    pub fn estimate(&self, spec: &OptionSpec) -> Result<MonteCarloEstimate, PricingError> {
        let params = self.check(spec)?;
        if spec.is_expired() {
            return Err(PricingError::InvalidParameter(
                "cannot simulate an expired option".to_string(),
            ));
        }
        self.run(spec, &params)
    }

    /// Price, interval and delta, gamma, vega, rho by central differences
    /// on common random numbers.
    ///
    /// # Errors
    /// As [`MonteCarloEngine::estimate`].
    pub fn price_with_greeks(&self, spec: &OptionSpec) -> Result<PricingResult, PricingError> {
        let params = self.check(spec)?;
        if spec.is_expired() {
            return Ok(self.expired(spec));
        }
        let base = self.run(spec, &params)?;

        let h_s = DELTA_BUMP_FRACTION * spec.spot;
        let up = self.revalue(&spec.with_spot(spec.spot + h_s))?;
        let down = self.revalue(&spec.with_spot(spec.spot - h_s))?;
        let delta = (up - down) / (2.0 * h_s);
        let gamma = (up - 2.0 * base.price + down) / (h_s * h_s);

        let h_v = VEGA_BUMP.min(0.5 * params.volatility);
        let vega = (self.revalue(&spec.with_volatility(params.volatility + h_v))?
            - self.revalue(&spec.with_volatility(params.volatility - h_v))?)
            / (2.0 * h_v);

        let rho = (self.revalue(&spec.with_rate(spec.rate + RHO_BUMP))?
            - self.revalue(&spec.with_rate(spec.rate - RHO_BUMP))?)
            / (2.0 * RHO_BUMP);

        Ok(PricingResult::new(base.price)
            .with_greeks(Greeks {
                delta: Some(delta),
                gamma: Some(gamma),
                vega: Some(vega),
                theta: None,
                rho: Some(rho),
            })
            .with_interval(base.std_error, base.confidence_interval))
    }

    /// Central-difference delta on common random numbers.
    ///
    /// # Errors
    /// As [`MonteCarloEngine::estimate`].
    pub fn crn_delta(&self, spec: &OptionSpec) -> Result<f64, PricingError> {
        self.check(spec)?;
        if spec.is_expired() {
            return Ok(expired_delta(spec));
        }
        let h_s = DELTA_BUMP_FRACTION * spec.spot;
        let up = self.revalue(&spec.with_spot(spec.spot + h_s))?;
        let down = self.revalue(&spec.with_spot(spec.spot - h_s))?;
        Ok((up - down) / (2.0 * h_s))
    }

    fn check(&self, spec: &OptionSpec) -> Result<GbmParams, PricingError> {
        spec.validate()?;
        if spec.exercise != ExerciseStyle::European {
            return Err(PricingError::InvalidParameter(
                "Monte Carlo engine prices European exercise only".to_string(),
            ));
        }
        let volatility = spec.require_volatility()?;
        Ok(GbmParams::new(
            spec.spot,
            spec.rate,
            spec.dividend_yield,
            volatility,
            spec.maturity,
        ))
    }

    fn revalue(&self, spec: &OptionSpec) -> Result<f64, PricingError> {
        let params = self.check(spec)?;
        Ok(self.run(spec, &params)?.price)
    }

    fn run(
        &self,
        spec: &OptionSpec,
        params: &GbmParams,
    ) -> Result<MonteCarloEstimate, PricingError> {
        let result = match self.config.scheme() {
            Discretisation::Exact => {
                let sampler = ExactTerminal {
                    stepper: GbmStepper::new(params, params.maturity, Discretisation::Exact),
                    spot: params.spot,
                };
                let control_mean = spec.spot * spec.dividend_discount();
                estimate(&sampler, spec, control_mean, &self.config)
            }
            Discretisation::EulerMaruyama => {
                let n_steps = self.config.n_steps();
                let dt = params.maturity / n_steps as f64;
                // E[S_T] of the Euler chain is S·(1 + (r-q)·dt)^n
                let control_mean = spec.discount_factor()
                    * params.spot
                    * (1.0 + params.drift() * dt).powi(n_steps as i32);
                let sampler = EulerPath {
                    stepper: GbmStepper::new(params, dt, Discretisation::EulerMaruyama),
                    spot: params.spot,
                    n_steps,
                };
                estimate(&sampler, spec, control_mean, &self.config)
            }
        }?;
        tracing::trace!(
            price = result.price,
            std_error = result.std_error,
            n_samples = result.n_samples,
            "monte carlo run"
        );
        Ok(result)
    }

    fn expired(&self, spec: &OptionSpec) -> PricingResult {
        let value = spec.intrinsic(spec.spot);
        let level = self.config.confidence_level();
        PricingResult::new(value)
            .with_greeks(Greeks {
                delta: Some(expired_delta(spec)),
                gamma: Some(0.0),
                vega: Some(0.0),
                theta: None,
                rho: Some(0.0),
            })
            .with_interval(
                0.0,
                ConfidenceInterval::symmetric(value, 0.0, z_score(level), level),
            )
    }
}

fn expired_delta(spec: &OptionSpec) -> f64 {
    if spec.intrinsic(spec.spot) > 0.0 {
        spec.option_type.sign()
    } else {
        0.0
    }
}

impl PricingEngine for MonteCarloEngine {
    fn name(&self) -> &str {
        "monte-carlo"
    }

    fn price(&self, spec: &OptionSpec) -> Result<PricingResult, PricingError> {
        let result = if self.greeks {
            self.price_with_greeks(spec)?
        } else {
            self.check(spec)?;
            if spec.is_expired() {
                self.expired(spec)
            } else {
                let est = self.estimate(spec)?;
                PricingResult::new(est.price).with_interval(est.std_error, est.confidence_interval)
            }
        };
        tracing::debug!(
            engine = self.name(),
            price = result.price,
            std_error = result.std_error,
            n_paths = self.config.n_paths(),
            "priced"
        );
        Ok(result)
    }

    fn delta(&self, spec: &OptionSpec) -> Result<f64, PricingError> {
        self.crn_delta(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pricer_core::types::OptionType;
    use pricer_models::analytical::BlackScholes;

    fn engine(n_paths: usize) -> MonteCarloEngine {
        MonteCarloEngine::new(
            MonteCarloConfig::builder()
                .n_paths(n_paths)
                .seed(42)
                .build()
                .unwrap(),
        )
    }

    fn atm_call() -> OptionSpec {
        OptionSpec::european_call(100.0, 100.0, 1.0, 0.05, 0.2)
    }

    // ========================================
    // Price Tests
    // ========================================

    #[test]
    fn test_reference_scenario_within_interval() {
        let result = engine(200_000).with_greeks(false).price(&atm_call()).unwrap();
        let ci = result.confidence_interval.unwrap();
        assert!(ci.contains(10.4506), "{:?}", ci);
        assert_relative_eq!(result.price, 10.4506, epsilon = 0.1);
        assert_relative_eq!(ci.level, 0.95);
    }

    #[test]
    fn test_put_with_dividend_matches_closed_form() {
        let spec =
            OptionSpec::european_put(100.0, 110.0, 0.5, 0.03, 0.25).with_dividend_yield(0.02);
        let bs = BlackScholes::new(&spec).unwrap().price();
        let est = engine(200_000).estimate(&spec).unwrap();
        assert!((est.price - bs).abs() < 4.0 * est.std_error, "{} vs {}", est.price, bs);
    }

    #[test]
    fn test_euler_scheme_is_close_for_daily_steps() {
        let config = MonteCarloConfig::builder()
            .n_paths(40_000)
            .n_steps(252)
            .scheme(Discretisation::EulerMaruyama)
            .build()
            .unwrap();
        let est = MonteCarloEngine::new(config).estimate(&atm_call()).unwrap();
        assert!((est.price - 10.4506).abs() < 4.0 * est.std_error + 0.05);
    }

    #[test]
    fn test_fixed_seed_is_bit_identical() {
        let a = engine(20_000).estimate(&atm_call()).unwrap();
        let b = engine(20_000).estimate(&atm_call()).unwrap();
        assert_eq!(a.price.to_bits(), b.price.to_bits());
        assert_eq!(a.std_error.to_bits(), b.std_error.to_bits());
    }

    #[test]
    fn test_different_seeds_differ() {
        let config = MonteCarloConfig::builder().n_paths(20_000).seed(1).build().unwrap();
        let a = MonteCarloEngine::new(config.clone()).estimate(&atm_call()).unwrap();
        let b = MonteCarloEngine::new(config.with_seed(2)).estimate(&atm_call()).unwrap();
        assert_ne!(a.price, b.price);
    }

    // ========================================
    // Variance Reduction Tests
    // ========================================

    #[test]
    fn test_antithetic_reduces_standard_error() {
        let plain = MonteCarloConfig::builder().n_paths(100_000).antithetic(false).build().unwrap();
        let paired = MonteCarloConfig::builder().n_paths(100_000).antithetic(true).build().unwrap();
        let plain = MonteCarloEngine::new(plain).estimate(&atm_call()).unwrap();
        let paired = MonteCarloEngine::new(paired).estimate(&atm_call()).unwrap();
        assert_eq!(paired.n_samples, 50_000);
        assert!(paired.std_error < plain.std_error);
    }

    #[test]
    fn test_control_variate_reduces_standard_error() {
        let plain = MonteCarloConfig::builder().n_paths(100_000).antithetic(false).build().unwrap();
        let controlled = MonteCarloConfig::builder()
            .n_paths(100_000)
            .antithetic(false)
            .control_variate(true)
            .build()
            .unwrap();
        let plain = MonteCarloEngine::new(plain).estimate(&atm_call()).unwrap();
        let controlled = MonteCarloEngine::new(controlled).estimate(&atm_call()).unwrap();
        let beta = controlled.control_beta.unwrap();
        assert!(beta > 0.4 && beta < 0.9, "beta = {}", beta);
        assert!(controlled.std_error < 0.6 * plain.std_error);
        assert!((controlled.price - 10.4506).abs() < 4.0 * controlled.std_error);
    }

    // ========================================
    // Greeks Tests
    // ========================================

    #[test]
    fn test_crn_greeks_match_closed_form() {
        let spec = atm_call();
        let result = engine(200_000).price(&spec).unwrap();
        let bs = BlackScholes::new(&spec).unwrap();
        assert_relative_eq!(result.greeks.delta.unwrap(), bs.delta(), epsilon = 0.01);
        assert_relative_eq!(result.greeks.gamma.unwrap(), bs.gamma(), epsilon = 0.003);
        assert_relative_eq!(result.greeks.vega.unwrap(), bs.vega(), epsilon = 0.8);
        assert_relative_eq!(result.greeks.rho.unwrap(), bs.rho(), epsilon = 0.8);
        assert!(result.greeks.theta.is_none());
    }

    #[test]
    fn test_trait_delta_uses_crn() {
        let spec = atm_call().with_option_type(OptionType::Put);
        let delta = engine(100_000).delta(&spec).unwrap();
        let bs = BlackScholes::new(&spec).unwrap().delta();
        assert_relative_eq!(delta, bs, epsilon = 0.01);
    }

    // ========================================
    // Edge Case Tests
    // ========================================

    #[test]
    fn test_zero_maturity_is_intrinsic() {
        let spec = atm_call().with_spot(112.0).with_maturity(0.0);
        let result = engine(1_000).price(&spec).unwrap();
        assert_eq!(result.price, 12.0);
        assert_eq!(result.greeks.delta, Some(1.0));
        assert_eq!(result.std_error, Some(0.0));
    }

    #[test]
    fn test_american_rejected() {
        let spec = atm_call().with_exercise(ExerciseStyle::American);
        assert!(matches!(engine(1_000).price(&spec), Err(PricingError::InvalidParameter(_))));
    }

    #[test]
    fn test_missing_volatility_rejected() {
        assert!(engine(1_000).price(&atm_call().without_volatility()).is_err());
    }
}
