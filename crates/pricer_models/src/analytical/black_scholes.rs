//! Black-Scholes pricing model for European options.
//!
//! Closed-form price and analytic Greeks under lognormal dynamics with a
//! continuous dividend yield q.
//!
//! ## Mathematical Formulas
//!
//! **Call Price**: C = S·e^(-qT)·N(d₁) - K·e^(-rT)·N(d₂)
//! **Put Price**: P = K·e^(-rT)·N(-d₂) - S·e^(-qT)·N(-d₁)
//!
//! Where:
//! - d₁ = (ln(S/K) + (r - q + σ²/2)T) / (σ√T)
//! - d₂ = d₁ - σ√T

use pricer_core::traits::PricingEngine;
use pricer_core::types::{Greeks, OptionSpec, OptionType, PricingError, PricingResult};

use super::distributions::{norm_cdf, norm_pdf};
use super::implied_vol::{implied_volatility, ImpliedVolConfig};

/// Black-Scholes formulas evaluated for one [`OptionSpec`].
///
/// Construction validates `spec` and precomputes d₁, d₂ and the discount
/// factors; every accessor is then O(1). Expired options (maturity at or
/// below [`EXPIRY_EPSILON`](pricer_core::types::EXPIRY_EPSILON)) price at
/// intrinsic value with step-function delta and zero higher Greeks.
///
/// # Examples
/// ```
/// use pricer_core::types::OptionSpec;
/// use pricer_models::analytical::BlackScholes;
///
/// let spec = OptionSpec::european_call(100.0, 100.0, 1.0, 0.05, 0.2);
/// let bs = BlackScholes::new(&spec).unwrap();
/// assert!((bs.price() - 10.4506).abs() < 1e-4);
///
/// // Put-call parity: C - P = S·e^(-qT) - K·e^(-rT)
/// let put = BlackScholes::new(&spec.with_option_type(pricer_core::types::OptionType::Put)).unwrap();
/// let parity = bs.price() - put.price() - (100.0 - 100.0 * (-0.05_f64).exp());
/// assert!(parity.abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct BlackScholes {
    spec: OptionSpec,
    volatility: f64,
    d1: f64,
    d2: f64,
    df_rate: f64,
    df_div: f64,
}

impl BlackScholes {
    /// Validates `spec` and precomputes the formula terms.
    ///
    /// # Errors
    /// `PricingError::InvalidParameter` for out-of-domain inputs or a
    /// missing volatility.
    pub fn new(spec: &OptionSpec) -> Result<Self, PricingError> {
        spec.validate()?;
        let volatility = spec.require_volatility()?;
        let df_rate = spec.discount_factor();
        let df_div = spec.dividend_discount();

        let (d1, d2) = if spec.is_expired() {
            (0.0, 0.0)
        } else {
            let vol_sqrt_t = volatility * spec.maturity.sqrt();
            let d1 = ((spec.spot / spec.strike).ln()
                + (spec.rate - spec.dividend_yield + 0.5 * volatility * volatility)
                    * spec.maturity)
                / vol_sqrt_t;
            (d1, d1 - vol_sqrt_t)
        };

        Ok(Self {
            spec: *spec,
            volatility,
            d1,
            d2,
            df_rate,
            df_div,
        })
    }

    /// The d₁ term (0 for an expired option).
    #[inline]
    pub fn d1(&self) -> f64 {
        self.d1
    }

    /// The d₂ term (0 for an expired option).
    #[inline]
    pub fn d2(&self) -> f64 {
        self.d2
    }

    /// Option value.
    pub fn price(&self) -> f64 {
        let s = &self.spec;
        if s.is_expired() {
            return s.intrinsic(s.spot);
        }
        match s.option_type {
            OptionType::Call => {
                s.spot * self.df_div * norm_cdf(self.d1)
                    - s.strike * self.df_rate * norm_cdf(self.d2)
            }
            OptionType::Put => {
                s.strike * self.df_rate * norm_cdf(-self.d2)
                    - s.spot * self.df_div * norm_cdf(-self.d1)
            }
        }
    }

    /// Delta: ∂V/∂S.
    pub fn delta(&self) -> f64 {
        let s = &self.spec;
        if s.is_expired() {
            return match s.option_type {
                OptionType::Call if s.spot > s.strike => 1.0,
                OptionType::Put if s.spot < s.strike => -1.0,
                _ => 0.0,
            };
        }
        match s.option_type {
            OptionType::Call => self.df_div * norm_cdf(self.d1),
            OptionType::Put => self.df_div * (norm_cdf(self.d1) - 1.0),
        }
    }

    /// Gamma: φ(d₁)·e^(-qT) / (S·σ·√T).
    pub fn gamma(&self) -> f64 {
        let s = &self.spec;
        if s.is_expired() {
            return 0.0;
        }
        self.df_div * norm_pdf(self.d1) / (s.spot * self.volatility * s.maturity.sqrt())
    }

    /// Vega: S·e^(-qT)·√T·φ(d₁), per unit of volatility.
    pub fn vega(&self) -> f64 {
        let s = &self.spec;
        if s.is_expired() {
            return 0.0;
        }
        s.spot * self.df_div * s.maturity.sqrt() * norm_pdf(self.d1)
    }

    /// Theta: ∂V/∂t per year.
    pub fn theta(&self) -> f64 {
        let s = &self.spec;
        if s.is_expired() {
            return 0.0;
        }
        let decay =
            -s.spot * self.df_div * norm_pdf(self.d1) * self.volatility / (2.0 * s.maturity.sqrt());
        match s.option_type {
            OptionType::Call => {
                decay + s.dividend_yield * s.spot * self.df_div * norm_cdf(self.d1)
                    - s.rate * s.strike * self.df_rate * norm_cdf(self.d2)
            }
            OptionType::Put => {
                decay - s.dividend_yield * s.spot * self.df_div * norm_cdf(-self.d1)
                    + s.rate * s.strike * self.df_rate * norm_cdf(-self.d2)
            }
        }
    }

    /// Rho: ∂V/∂r per unit of rate.
    pub fn rho(&self) -> f64 {
        let s = &self.spec;
        if s.is_expired() {
            return 0.0;
        }
        let k_t_df = s.strike * s.maturity * self.df_rate;
        match s.option_type {
            OptionType::Call => k_t_df * norm_cdf(self.d2),
            OptionType::Put => -k_t_df * norm_cdf(-self.d2),
        }
    }

    /// All analytic Greeks.
    pub fn greeks(&self) -> Greeks {
        Greeks {
            delta: Some(self.delta()),
            gamma: Some(self.gamma()),
            vega: Some(self.vega()),
            theta: Some(self.theta()),
            rho: Some(self.rho()),
        }
    }
}

/// `call - put - (S·e^(-qT) - K·e^(-rT))`; zero when parity holds.
pub fn put_call_parity_residual(call: f64, put: f64, spec: &OptionSpec) -> f64 {
    call - put - (spec.spot * spec.dividend_discount() - spec.strike * spec.discount_factor())
}

/// Closed-form engine implementing [`PricingEngine`].
///
/// # Examples
/// ```
/// use pricer_core::traits::PricingEngine;
/// use pricer_core::types::OptionSpec;
/// use pricer_models::analytical::BlackScholesEngine;
///
/// let engine = BlackScholesEngine::default();
/// let spec = OptionSpec::european_call(100.0, 100.0, 1.0, 0.05, 0.2);
/// let iv = engine.implied_volatility(&spec.without_volatility(), 10.4506).unwrap();
/// assert!((iv - 0.2).abs() < 1e-4);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BlackScholesEngine {
    /// Settings for the implied-volatility root finder.
    pub implied_vol: ImpliedVolConfig,
}

impl BlackScholesEngine {
    /// Engine with a custom implied-volatility configuration.
    pub fn new(implied_vol: ImpliedVolConfig) -> Self {
        Self { implied_vol }
    }
}

impl PricingEngine for BlackScholesEngine {
    fn name(&self) -> &str {
        "black-scholes"
    }

    fn price(&self, spec: &OptionSpec) -> Result<PricingResult, PricingError> {
        let bs = BlackScholes::new(spec)?;
        Ok(PricingResult::new(bs.price()).with_greeks(bs.greeks()))
    }

    fn delta(&self, spec: &OptionSpec) -> Result<f64, PricingError> {
        Ok(BlackScholes::new(spec)?.delta())
    }

    fn implied_volatility(
        &self,
        spec: &OptionSpec,
        market_price: f64,
    ) -> Result<f64, PricingError> {
        implied_volatility(spec, market_price, &self.implied_vol)
    }
}
