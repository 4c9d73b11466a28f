//! Garman-Kohlhagen model for FX option pricing.
//!
//! Black-Scholes with two interest rates: the domestic rate plays the role
//! of the risk-free rate and the foreign rate that of the dividend yield.
//!
//! - S: spot exchange rate (domestic per foreign)
//! - rd: domestic risk-free rate (continuous compounding)
//! - rf: foreign risk-free rate (continuous compounding)
//!
//! ## Call Option Price
//! C = S * e^(-rf*T) * N(d1) - K * e^(-rd*T) * N(d2)
//!
//! ## Put Option Price
//! P = K * e^(-rd*T) * N(-d2) - S * e^(-rf*T) * N(-d1)
//!
//! # Examples
//!
//! ```
//! use pricer_core::types::OptionType;
//! use pricer_models::analytical::{FxOptionSpec, GarmanKohlhagenEngine};
//!
//! let call = FxOptionSpec::new(OptionType::Call, 1.10, 1.12, 1.0, 0.03, 0.01, 0.15);
//! let put = FxOptionSpec { option_type: OptionType::Put, ..call };
//! let engine = GarmanKohlhagenEngine::default();
//!
//! let parity = engine.price_fx(&call).unwrap().price - engine.price_fx(&put).unwrap().price
//!     - (1.10 * (-0.01_f64).exp() - 1.12 * (-0.03_f64).exp());
//! assert!(parity.abs() < 1e-10);
//! ```

use pricer_core::traits::PricingEngine;
use pricer_core::types::{OptionSpec, OptionType, PricingError, PricingResult};

use super::black_scholes::{BlackScholes, BlackScholesEngine};
use super::distributions::norm_cdf;
use super::implied_vol::ImpliedVolConfig;

/// A European FX option quoted in domestic currency per unit of foreign.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FxOptionSpec {
    /// Call or put on the foreign currency.
    pub option_type: OptionType,
    /// Spot exchange rate.
    pub spot: f64,
    /// Strike exchange rate.
    pub strike: f64,
    /// Time to expiry in years.
    pub maturity: f64,
    /// Domestic risk-free rate.
    pub domestic_rate: f64,
    /// Foreign risk-free rate.
    pub foreign_rate: f64,
    /// Exchange-rate volatility.
    pub volatility: f64,
}

impl FxOptionSpec {
    /// Creates an FX option.
    pub fn new(
        option_type: OptionType,
        spot: f64,
        strike: f64,
        maturity: f64,
        domestic_rate: f64,
        foreign_rate: f64,
        volatility: f64,
    ) -> Self {
        Self {
            option_type,
            spot,
            strike,
            maturity,
            domestic_rate,
            foreign_rate,
            volatility,
        }
    }

    /// Equivalent equity contract: r = rd, q = rf.
    pub fn to_option_spec(&self) -> OptionSpec {
        OptionSpec::new(
            self.option_type,
            self.spot,
            self.strike,
            self.maturity,
            self.domestic_rate,
            self.volatility,
        )
        .with_dividend_yield(self.foreign_rate)
    }

    /// Outright forward: S * e^((rd - rf) * T).
    pub fn forward(&self) -> f64 {
        self.spot * ((self.domestic_rate - self.foreign_rate) * self.maturity).exp()
    }
}

/// Closed-form FX option engine.
///
/// Also implements [`PricingEngine`] directly on an [`OptionSpec`] whose
/// `rate` is the domestic rate and `dividend_yield` the foreign rate.
#[derive(Debug, Clone, Copy, Default)]
pub struct GarmanKohlhagenEngine {
    inner: BlackScholesEngine,
}

impl GarmanKohlhagenEngine {
    /// Engine with a custom implied-volatility configuration.
    pub fn new(implied_vol: ImpliedVolConfig) -> Self {
        Self {
            inner: BlackScholesEngine::new(implied_vol),
        }
    }

    /// Prices an FX option with the full set of Greeks.
    ///
    /// `rho` in the result is the domestic-rate sensitivity; see
    /// [`rho_foreign`](Self::rho_foreign) for the other leg.
    pub fn price_fx(&self, spec: &FxOptionSpec) -> Result<PricingResult, PricingError> {
        self.inner.price(&spec.to_option_spec())
    }

    /// Sensitivity to the foreign rate.
    pub fn rho_foreign(&self, spec: &FxOptionSpec) -> Result<f64, PricingError> {
        let equity = spec.to_option_spec();
        let bs = BlackScholes::new(&equity)?;
        if equity.is_expired() {
            return Ok(0.0);
        }
        let scale = spec.spot * spec.maturity * equity.dividend_discount();
        Ok(match spec.option_type {
            OptionType::Call => -scale * norm_cdf(bs.d1()),
            OptionType::Put => scale * norm_cdf(-bs.d1()),
        })
    }

    /// Volatility reproducing an FX option premium.
    pub fn implied_volatility_fx(
        &self,
        spec: &FxOptionSpec,
        market_price: f64,
    ) -> Result<f64, PricingError> {
        self.inner
            .implied_volatility(&spec.to_option_spec().without_volatility(), market_price)
    }
}

impl PricingEngine for GarmanKohlhagenEngine {
    fn name(&self) -> &str {
        "garman-kohlhagen"
    }

    fn price(&self, spec: &OptionSpec) -> Result<PricingResult, PricingError> {
        self.inner.price(spec)
    }

    fn delta(&self, spec: &OptionSpec) -> Result<f64, PricingError> {
        self.inner.delta(spec)
    }

    fn implied_volatility(
        &self,
        spec: &OptionSpec,
        market_price: f64,
    ) -> Result<f64, PricingError> {
        self.inner.implied_volatility(spec, market_price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn eurusd(option_type: OptionType) -> FxOptionSpec {
        FxOptionSpec::new(option_type, 1.10, 1.10, 1.0, 0.03, 0.01, 0.12)
    }

    #[test]
    fn test_forward() {
        assert_relative_eq!(
            eurusd(OptionType::Call).forward(),
            1.10 * 0.02_f64.exp(),
            epsilon = 1e-14
        );
    }

    #[test]
    fn test_reference_call_price() {
        // d1 = (0.02 + 0.0072) / 0.12 = 0.22667, d2 = 0.10667
        let price = GarmanKohlhagenEngine::default()
            .price_fx(&eurusd(OptionType::Call))
            .unwrap()
            .price;
        let expected = 1.10 * (-0.01_f64).exp() * norm_cdf(0.226_666_666_666_666_7)
            - 1.10 * (-0.03_f64).exp() * norm_cdf(0.106_666_666_666_666_7);
        assert_relative_eq!(price, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_parity_uses_both_rates() {
        let engine = GarmanKohlhagenEngine::default();
        let call = engine.price_fx(&eurusd(OptionType::Call)).unwrap().price;
        let put = engine.price_fx(&eurusd(OptionType::Put)).unwrap().price;
        let rhs = 1.10 * (-0.01_f64).exp() - 1.10 * (-0.03_f64).exp();
        assert_relative_eq!(call - put, rhs, epsilon = 1e-12);
    }

    #[test]
    fn test_rho_foreign_matches_finite_difference() {
        let engine = GarmanKohlhagenEngine::default();
        for option_type in [OptionType::Call, OptionType::Put] {
            let spec = eurusd(option_type);
            let h = 1e-6;
            let up = FxOptionSpec { foreign_rate: 0.01 + h, ..spec };
            let down = FxOptionSpec { foreign_rate: 0.01 - h, ..spec };
            let fd = (engine.price_fx(&up).unwrap().price - engine.price_fx(&down).unwrap().price)
                / (2.0 * h);
            assert_relative_eq!(engine.rho_foreign(&spec).unwrap(), fd, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_fx_implied_vol_round_trip() {
        let engine = GarmanKohlhagenEngine::default();
        for strike in [1.00, 1.10, 1.20] {
            let spec = FxOptionSpec { strike, ..eurusd(OptionType::Put) };
            let premium = engine.price_fx(&spec).unwrap().price;
            let iv = engine.implied_volatility_fx(&spec, premium).unwrap();
            assert_relative_eq!(iv, 0.12, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_engine_name_and_delta() {
        let engine = GarmanKohlhagenEngine::default();
        assert_eq!(engine.name(), "garman-kohlhagen");
        let delta = engine.delta(&eurusd(OptionType::Call).to_option_spec()).unwrap();
        assert!(delta > 0.0 && delta < (-0.01_f64).exp());
    }
}
