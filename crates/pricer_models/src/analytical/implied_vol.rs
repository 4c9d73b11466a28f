//! Implied volatility by bracketed Newton iteration on the Black-Scholes price.

use pricer_core::math::solvers::{NewtonRaphsonSolver, SolverConfig};
use pricer_core::types::{OptionSpec, PricingError};

use super::black_scholes::BlackScholes;

/// Lower end of the volatility search bracket.
pub const MIN_IMPLIED_VOL: f64 = 1e-6;
/// Upper end of the volatility search bracket.
pub const MAX_IMPLIED_VOL: f64 = 5.0;
/// Price tolerance for the root search.
pub const DEFAULT_IV_TOLERANCE: f64 = 1e-8;
/// Iteration budget for the root search.
pub const DEFAULT_IV_MAX_ITERATIONS: usize = 100;

/// Root-finder settings for implied volatility.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImpliedVolConfig {
    /// Lower bracket.
    pub min_vol: f64,
    /// Upper bracket.
    pub max_vol: f64,
    /// Absolute price tolerance.
    pub tolerance: f64,
    /// Maximum Newton/bisection iterations.
    pub max_iterations: usize,
}

impl Default for ImpliedVolConfig {
    fn default() -> Self {
        Self {
            min_vol: MIN_IMPLIED_VOL,
            max_vol: MAX_IMPLIED_VOL,
            tolerance: DEFAULT_IV_TOLERANCE,
            max_iterations: DEFAULT_IV_MAX_ITERATIONS,
        }
    }
}

/// Finds σ such that the Black-Scholes price of `spec` equals `market_price`.
///
/// The volatility field of `spec` is ignored. Newton steps use the analytic
/// vega and fall back to bisection whenever a step would leave the bracket.
///
/// # Errors
///
/// - `InvalidParameter` for an invalid contract, a non-finite price or an
///   expired option (its value no longer depends on σ)
/// - `NoConvergence` if the price violates the no-arbitrage bounds, cannot
///   be reached within the bracket, or the iteration budget runs out
///
/// # Examples
/// ```
/// use pricer_core::types::OptionSpec;
/// use pricer_models::analytical::{implied_volatility, BlackScholes, ImpliedVolConfig};
///
/// let spec = OptionSpec::european_put(100.0, 110.0, 0.5, 0.02, 0.35);
/// let market = BlackScholes::new(&spec).unwrap().price();
/// let iv = implied_volatility(&spec, market, &ImpliedVolConfig::default()).unwrap();
/// assert!((iv - 0.35).abs() < 1e-6);
/// ```
pub fn implied_volatility(
    spec: &OptionSpec,
    market_price: f64,
    config: &ImpliedVolConfig,
) -> Result<f64, PricingError> {
    let spec = spec.without_volatility();
    spec.validate()?;
    if !market_price.is_finite() {
        return Err(PricingError::invalid("market_price", market_price));
    }
    if spec.is_expired() {
        return Err(PricingError::InvalidParameter(
            "implied volatility is undefined for an expired option".to_string(),
        ));
    }

    let (lower, upper) = spec.price_bounds();
    if market_price < lower - config.tolerance {
        return Err(PricingError::NoConvergence(format!(
            "price {} is below the no-arbitrage lower bound {}",
            market_price, lower
        )));
    }
    if market_price > upper + config.tolerance {
        return Err(PricingError::NoConvergence(format!(
            "price {} is above the no-arbitrage upper bound {}",
            market_price, upper
        )));
    }

    // Evaluated inside the validated domain, so construction cannot fail.
    let model = |vol: f64| BlackScholes::new(&spec.with_volatility(vol)).ok();
    let objective = |vol: f64| model(vol).map_or(f64::NAN, |bs| bs.price() - market_price);
    let vega = |vol: f64| model(vol).map_or(0.0, |bs| bs.vega());

    // Brenner-Subrahmanyam guess, kept inside the bracket
    let guess = ((2.0 * std::f64::consts::PI / spec.maturity).sqrt() * market_price / spec.spot)
        .clamp(0.05, 2.0)
        .clamp(config.min_vol, config.max_vol);

    let solver =
        NewtonRaphsonSolver::new(SolverConfig::new(config.tolerance, config.max_iterations));
    let vol = solver
        .find_root_bracketed(objective, vega, config.min_vol, config.max_vol, guess)
        .map_err(|err| {
            PricingError::NoConvergence(format!(
                "implied volatility search for price {} failed: {}",
                market_price, err
            ))
        })?;

    tracing::trace!(market_price, vol, "implied volatility solved");
    Ok(vol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pricer_core::types::OptionType;
    use proptest::prelude::*;

    fn config() -> ImpliedVolConfig {
        ImpliedVolConfig::default()
    }

    // ==========================================================
    // Recovery Tests
    // ==========================================================

    #[test]
    fn test_recovers_vol_across_strikes() {
        for strike in [80.0, 100.0, 120.0] {
            for option_type in [OptionType::Call, OptionType::Put] {
                let spec = OptionSpec::new(option_type, 100.0, strike, 1.0, 0.02, 0.24);
                let market = BlackScholes::new(&spec).unwrap().price();
                let iv = implied_volatility(&spec, market, &config()).unwrap();
                assert_relative_eq!(iv, 0.24, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_recovers_high_vol() {
        let spec = OptionSpec::european_call(100.0, 100.0, 2.0, 0.01, 1.5);
        let market = BlackScholes::new(&spec).unwrap().price();
        assert_relative_eq!(
            implied_volatility(&spec, market, &config()).unwrap(),
            1.5,
            epsilon = 1e-6
        );
    }

    // ==========================================================
    // Failure Tests
    // ==========================================================

    #[test]
    fn test_price_below_intrinsic_fails() {
        // Deep ITM call quoted below S - K·e^(-rT)
        let spec = OptionSpec::european_call(150.0, 100.0, 1.0, 0.02, 0.2).without_volatility();
        assert!(matches!(
            implied_volatility(&spec, 40.0, &config()),
            Err(PricingError::NoConvergence(_))
        ));
    }

    #[test]
    fn test_price_above_spot_fails() {
        let spec = OptionSpec::european_call(100.0, 100.0, 1.0, 0.02, 0.2);
        assert!(matches!(
            implied_volatility(&spec, 100.5, &config()),
            Err(PricingError::NoConvergence(_))
        ));
    }

    #[test]
    fn test_price_unreachable_within_bracket_fails() {
        // Inside the bounds but needs σ > 5
        let spec = OptionSpec::european_call(100.0, 100.0, 1.0, 0.0, 0.2);
        assert!(matches!(
            implied_volatility(&spec, 99.0, &config()),
            Err(PricingError::NoConvergence(_))
        ));
    }

    #[test]
    fn test_expired_and_invalid_inputs() {
        let expired = OptionSpec::european_call(100.0, 90.0, 0.0, 0.02, 0.2);
        assert!(matches!(
            implied_volatility(&expired, 10.0, &config()),
            Err(PricingError::InvalidParameter(_))
        ));
        let spec = OptionSpec::european_call(100.0, 100.0, 1.0, 0.02, 0.2);
        assert!(implied_volatility(&spec, f64::NAN, &config()).is_err());
    }

    // ==========================================================
    // Property Tests
    // ==========================================================

    proptest! {
        #[test]
        fn prop_round_trip_recovers_volatility(
            spot in 50.0..150.0_f64,
            strike in 50.0..150.0_f64,
            maturity in 0.1..3.0_f64,
            rate in -0.01..0.08_f64,
            vol in 0.05..1.5_f64,
            is_call in any::<bool>(),
        ) {
            let option_type = if is_call { OptionType::Call } else { OptionType::Put };
            let spec = OptionSpec::new(option_type, spot, strike, maturity, rate, vol);
            let bs = BlackScholes::new(&spec).unwrap();
            // Far out of the money the price carries no information about σ
            prop_assume!(bs.vega() > 1e-2);

            let iv = implied_volatility(&spec.without_volatility(), bs.price(), &config()).unwrap();
            prop_assert!((iv - vol).abs() < 1e-5, "vol {} recovered as {}", vol, iv);
        }
    }
}
