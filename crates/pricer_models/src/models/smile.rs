//! Single-maturity implied-volatility smile from Heston prices.
//!
//! Each strike is priced under Heston, the price is inverted through
//! Black-Scholes, and the difference to a flat-volatility Black-Scholes
//! price is reported as the model-risk signal.

use pricer_core::types::{OptionSpec, PricingError};

use super::heston::HestonEngine;
use crate::analytical::{implied_volatility, BlackScholes, ImpliedVolConfig};

/// One strike of a generated smile.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SmilePoint {
    /// Strike.
    pub strike: f64,
    /// K / S.
    pub moneyness: f64,
    /// Heston price.
    pub heston_price: f64,
    /// Black-Scholes volatility reproducing `heston_price`; `None` when the
    /// price cannot be inverted (e.g. quadrature noise far out of the money).
    pub implied_vol: Option<f64>,
    /// Black-Scholes price at the flat volatility.
    pub black_scholes_price: f64,
    /// `heston_price - black_scholes_price`.
    pub model_risk: f64,
}

/// Prices `spec` at every strike under Heston and Black-Scholes.
///
/// The flat volatility is `spec.volatility`, or `sqrt(v0)` when absent.
///
/// # Errors
/// `InvalidParameter` for a non-positive strike or American exercise, and
/// any other pricing failure; a failed inversion only clears
/// [`SmilePoint::implied_vol`].
///
/// # Examples
/// ```
/// use pricer_core::types::OptionSpec;
/// use pricer_models::models::{generate_smile, HestonEngine, HestonParams, HestonQuadrature};
///
/// let engine = HestonEngine::new(HestonParams::default(), HestonQuadrature::default()).unwrap();
/// let spec = OptionSpec::european_call(100.0, 100.0, 1.0, 0.02, 0.2);
/// let smile = generate_smile(&spec, &engine, &[90.0, 100.0, 110.0]).unwrap();
/// // Negative correlation: implied vol falls with strike
/// assert!(smile[0].implied_vol.unwrap() > smile[2].implied_vol.unwrap());
/// ```
pub fn generate_smile(
    spec: &OptionSpec,
    engine: &HestonEngine,
    strikes: &[f64],
) -> Result<Vec<SmilePoint>, PricingError> {
    let flat_vol = spec.volatility.unwrap_or_else(|| engine.params().v0.sqrt());
    let config = ImpliedVolConfig::default();

    strikes
        .iter()
        .map(|&strike| {
            let at_strike = spec.with_strike(strike).with_volatility(flat_vol);
            let heston_price = engine.price_only(&at_strike)?;
            let black_scholes_price = BlackScholes::new(&at_strike)?.price();
            let implied_vol = match implied_volatility(&at_strike, heston_price, &config) {
                Ok(vol) => Some(vol),
                Err(err) => {
                    tracing::warn!(strike, heston_price, %err, "smile point could not be inverted");
                    None
                }
            };
            Ok(SmilePoint {
                strike,
                moneyness: strike / spec.spot,
                heston_price,
                implied_vol,
                black_scholes_price,
                model_risk: heston_price - black_scholes_price,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HestonParams, HestonQuadrature};
    use approx::assert_relative_eq;
    use pricer_core::types::ExerciseStyle;

    fn engine(params: HestonParams) -> HestonEngine {
        HestonEngine::new(params, HestonQuadrature::default()).unwrap()
    }

    #[test]
    fn test_smile_is_skewed_for_negative_rho() {
        let spec = OptionSpec::european_put(100.0, 100.0, 0.5, 0.02, 0.2);
        let strikes = [80.0, 90.0, 100.0, 110.0, 120.0];
        let smile = generate_smile(&spec, &engine(HestonParams::default()), &strikes).unwrap();
        let vols: Vec<f64> = smile.iter().map(|p| p.implied_vol.unwrap()).collect();
        assert!(vols.windows(2).all(|w| w[0] > w[1]), "{:?}", vols);
        assert_relative_eq!(smile[2].moneyness, 1.0);
    }

    #[test]
    fn test_flat_smile_when_vol_of_vol_vanishes() {
        let params = HestonParams::new(0.04, 2.0, 0.04, 0.01, 0.0).unwrap();
        let spec = OptionSpec::european_call(100.0, 100.0, 1.0, 0.02, 0.2);
        let smile = generate_smile(&spec, &engine(params), &[85.0, 100.0, 115.0]).unwrap();
        for point in smile {
            assert_relative_eq!(point.implied_vol.unwrap(), 0.2, epsilon = 2e-3);
            assert!(point.model_risk.abs() < 0.05);
        }
    }

    #[test]
    fn test_model_risk_sign_convention() {
        let spec = OptionSpec::european_call(100.0, 100.0, 1.0, 0.02, 0.2);
        let smile = generate_smile(&spec, &engine(HestonParams::default()), &[100.0]).unwrap();
        let point = smile[0];
        assert_relative_eq!(point.model_risk, point.heston_price - point.black_scholes_price);
    }

    #[test]
    fn test_invalid_strikes_rejected_as_parameters() {
        let spec = OptionSpec::european_call(100.0, 100.0, 1.0, 0.02, 0.2);
        let e = engine(HestonParams::default());
        for strike in [-10.0, 0.0] {
            assert!(matches!(
                generate_smile(&spec, &e, &[strike]),
                Err(PricingError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn test_american_contract_rejected() {
        let spec = OptionSpec::european_put(100.0, 100.0, 1.0, 0.02, 0.2)
            .with_exercise(ExerciseStyle::American);
        let result = generate_smile(&spec, &engine(HestonParams::default()), &[100.0]);
        assert!(matches!(result, Err(PricingError::InvalidParameter(_))));
    }
}
