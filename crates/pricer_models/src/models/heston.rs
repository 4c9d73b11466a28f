//! Heston stochastic volatility model, semi-closed form.
//!
//! ```text
//! dS = (r - q) S dt + sqrt(V) S dW_S
//! dV = kappa (theta - V) dt + xi sqrt(V) dW_V
//! E[dW_S dW_V] = rho dt
//! ```
//!
//! ## Feller condition
//!
//! ```text
//! 2 * kappa * theta > xi^2
//! ```
//!
//! keeps the variance strictly positive. It is reported, not enforced: the
//! characteristic function is well defined either way.
//!
//! ## Pricing
//!
//! The characteristic function of `ln(S_T / F)` is evaluated in the "little
//! trap" form (Albrecher et al.), which stays on the principal branch of the
//! complex logarithm for long maturities. Calls use the Lewis single
//! integral
//!
//! ```text
//! C = e^{-rT} (F - sqrt(F K) / pi * ∫_0^∞ Re[e^{iu ln(F/K)} φ(u - i/2)] / (u² + 1/4) du)
//! ```
//!
//! whose integrand is bounded at `u = 0`. Puts follow from parity.

use std::f64::consts::PI;

use num_complex::Complex64;
use pricer_core::math::quadrature::GaussLegendre;
use pricer_core::traits::PricingEngine;
use pricer_core::types::{
    ExerciseStyle, Greeks, OptionSpec, OptionType, PricingError, PricingResult,
};

/// Default initial variance.
pub const DEFAULT_V0: f64 = 0.04;
/// Default mean-reversion speed.
pub const DEFAULT_KAPPA: f64 = 2.0;
/// Default long-run variance.
pub const DEFAULT_THETA: f64 = 0.04;
/// Default volatility of variance.
pub const DEFAULT_XI: f64 = 0.5;
/// Default spot/variance correlation.
pub const DEFAULT_RHO: f64 = -0.6;

/// Default truncation of the Lewis integral.
pub const DEFAULT_UPPER_LIMIT: f64 = 200.0;
/// Default number of quadrature panels.
pub const DEFAULT_PANELS: usize = 40;
/// Default Gauss-Legendre order per panel.
pub const DEFAULT_ORDER: usize = 16;

/// Relative spot bump for the finite-difference delta and gamma.
const SPOT_BUMP: f64 = 1e-4;

/// Heston model parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HestonParams {
    /// Initial variance (v0 >= 0).
    pub v0: f64,
    /// Mean-reversion speed (kappa > 0).
    pub kappa: f64,
    /// Long-run variance (theta >= 0).
    pub theta: f64,
    /// Volatility of variance (xi > 0).
    pub xi: f64,
    /// Correlation, strictly inside (-1, 1).
    pub rho: f64,
}

impl Default for HestonParams {
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

impl HestonParams {
    /// Creates and validates a parameter set.
    ///
    /// # Examples
    /// ```
    /// use pricer_models::models::HestonParams;
    ///
    /// let params = HestonParams::new(0.04, 1.5, 0.04, 0.3, -0.7).unwrap();
    /// assert!(params.satisfies_feller());
    /// assert!(HestonParams::new(0.04, 1.5, 0.04, 0.3, -1.0).is_err());
    /// ```
    pub fn new(v0: f64, kappa: f64, theta: f64, xi: f64, rho: f64) -> Result<Self, PricingError> {
        let params = Self {
            v0,
            kappa,
            theta,
            xi,
            rho,
        };
        params.validate()?;
        Ok(params)
    }

    /// Checks the parameter domain.
    pub fn validate(&self) -> Result<(), PricingError> {
        let check = |name: &str, value: f64, ok: bool| {
            if ok && value.is_finite() {
                Ok(())
            } else {
                Err(PricingError::InvalidParameter(format!(
                    "heston {} = {} is out of range",
                    name, value
                )))
            }
        };
        check("v0", self.v0, self.v0 >= 0.0)?;
        check("kappa", self.kappa, self.kappa > 0.0)?;
        check("theta", self.theta, self.theta >= 0.0)?;
        check("xi", self.xi, self.xi > 0.0)?;
        check("rho", self.rho, self.rho > -1.0 && self.rho < 1.0)
    }

    /// `2·kappa·theta > xi²`.
    pub fn satisfies_feller(&self) -> bool {
        2.0 * self.kappa * self.theta > self.xi * self.xi
    }

    /// Characteristic function of `ln(S_T / F)` at (complex) `u`.
    pub fn characteristic_function(&self, u: Complex64, maturity: f64) -> Complex64 {
        let i = Complex64::i();
        let one = Complex64::new(1.0, 0.0);
        let xi2 = self.xi * self.xi;

        let beta = self.kappa - self.rho * self.xi * i * u;
        let mut d = (beta * beta + xi2 * (u * u + i * u)).sqrt();
        if d.re < 0.0 {
            d = -d;
        }
        let g = (beta - d) / (beta + d);
        let e = (-d * maturity).exp();

        let c = self.kappa * self.theta / xi2
            * ((beta - d) * maturity - 2.0 * ((one - g * e) / (one - g)).ln());
        let dd = (beta - d) / xi2 * (one - e) / (one - g * e);
        (c + dd * self.v0).exp()
    }
}

/// Quadrature settings for the Lewis integral.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HestonQuadrature {
    /// The integral is truncated at this frequency.
    pub upper_limit: f64,
    /// Equal panels on `[0, upper_limit]`.
    pub panels: usize,
    /// Gauss-Legendre points per panel.
    pub order: usize,
}

impl Default for HestonQuadrature {
    fn default() -> Self {
        Self {
            upper_limit: DEFAULT_UPPER_LIMIT,
            panels: DEFAULT_PANELS,
            order: DEFAULT_ORDER,
        }
    }
}

/// Semi-closed-form Heston engine for European options.
///
/// The volatility field of the [`OptionSpec`] is ignored; the variance
/// dynamics come from [`HestonParams`].
///
/// # Examples
/// ```
/// use pricer_core::traits::PricingEngine;
/// use pricer_core::types::OptionSpec;
/// use pricer_models::models::{HestonEngine, HestonParams, HestonQuadrature};
///
/// let engine = HestonEngine::new(HestonParams::default(), HestonQuadrature::default()).unwrap();
/// let spec = OptionSpec::european_call(100.0, 100.0, 1.0, 0.02, 0.2);
/// let price = engine.price(&spec).unwrap().price;
/// assert!(price > 5.0 && price < 12.0);
/// ```
#[derive(Debug, Clone)]
pub struct HestonEngine {
    params: HestonParams,
    quadrature: HestonQuadrature,
    rule: GaussLegendre,
}

impl HestonEngine {
    /// Validates the inputs and precomputes the quadrature rule.
    pub fn new(params: HestonParams, quadrature: HestonQuadrature) -> Result<Self, PricingError> {
        params.validate()?;
        if !(quadrature.upper_limit > 0.0 && quadrature.upper_limit.is_finite())
            || quadrature.panels == 0
        {
            return Err(PricingError::InvalidParameter(format!(
                "heston quadrature needs a positive upper limit and panels: {:?}",
                quadrature
            )));
        }
        let rule = GaussLegendre::new(quadrature.order)?;
        if !params.satisfies_feller() {
            tracing::debug!(?params, "heston parameters violate the Feller condition");
        }
        Ok(Self {
            params,
            quadrature,
            rule,
        })
    }

    /// Model parameters.
    pub fn params(&self) -> &HestonParams {
        &self.params
    }

    /// Lewis call price; `spec` must already be validated and unexpired.
    fn call_price(&self, spec: &OptionSpec) -> Result<f64, PricingError> {
        let t = spec.maturity;
        let forward = spec.forward();
        let log_moneyness = (forward / spec.strike).ln();
        let i = Complex64::i();
        let half_i = Complex64::new(0.0, 0.5);

        let integrand = |u: f64| {
            let phi = self
                .params
                .characteristic_function(Complex64::new(u, 0.0) - half_i, t);
            ((i * u * log_moneyness).exp() * phi).re / (u * u + 0.25)
        };
        let integral = self.rule.integrate(
            integrand,
            0.0,
            self.quadrature.upper_limit,
            self.quadrature.panels,
        );

        let call =
            spec.discount_factor() * (forward - (forward * spec.strike).sqrt() * integral / PI);
        if !call.is_finite() {
            return Err(PricingError::NoConvergence(format!(
                "heston integral is not finite for strike {} and maturity {}",
                spec.strike, t
            )));
        }
        Ok(call)
    }

    /// Price of `spec` without Greeks.
    ///
    /// # Errors
    /// `InvalidParameter` for an invalid contract or American exercise;
    /// `NoConvergence` if the integral is not finite.
    pub fn price_only(&self, spec: &OptionSpec) -> Result<f64, PricingError> {
        self.check(spec)?;
        self.value(spec)
    }

    /// Price of an already checked `spec`.
    fn value(&self, spec: &OptionSpec) -> Result<f64, PricingError> {
        if spec.is_expired() {
            return Ok(spec.intrinsic(spec.spot));
        }
        let call = self.call_price(spec)?;
        let value = match spec.option_type {
            OptionType::Call => call,
            OptionType::Put => {
                call - spec.spot * spec.dividend_discount() + spec.strike * spec.discount_factor()
            }
        };
        // Quadrature noise can push far out-of-the-money values a hair below zero
        Ok(value.max(0.0))
    }

    fn check(&self, spec: &OptionSpec) -> Result<(), PricingError> {
        spec.without_volatility().validate()?;
        if spec.exercise == ExerciseStyle::American {
            return Err(PricingError::InvalidParameter(
                "the heston engine prices European exercise only".to_string(),
            ));
        }
        Ok(())
    }
}

impl PricingEngine for HestonEngine {
    fn name(&self) -> &str {
        "heston"
    }

    fn price(&self, spec: &OptionSpec) -> Result<PricingResult, PricingError> {
        self.check(spec)?;
        let price = self.value(spec)?;
        if spec.is_expired() {
            let itm = price > 0.0;
            let delta = if itm { spec.option_type.sign() } else { 0.0 };
            return Ok(PricingResult::new(price).with_greeks(Greeks::delta_only(delta)));
        }

        let h = SPOT_BUMP * spec.spot;
        let up = self.value(&spec.with_spot(spec.spot + h))?;
        let down = self.value(&spec.with_spot(spec.spot - h))?;
        let delta = (up - down) / (2.0 * h);
        let gamma = (up - 2.0 * price + down) / (h * h);

        tracing::debug!(strike = spec.strike, maturity = spec.maturity, price, "heston priced");

        Ok(PricingResult::new(price).with_greeks(Greeks {
            delta: Some(delta),
            gamma: Some(gamma),
            ..Greeks::default()
        }))
    }

    fn delta(&self, spec: &OptionSpec) -> Result<f64, PricingError> {
        self.check(spec)?;
        if spec.is_expired() {
            let itm = spec.intrinsic(spec.spot) > 0.0;
            return Ok(if itm { spec.option_type.sign() } else { 0.0 });
        }
        let h = SPOT_BUMP * spec.spot;
        let up = self.value(&spec.with_spot(spec.spot + h))?;
        let down = self.value(&spec.with_spot(spec.spot - h))?;
        Ok((up - down) / (2.0 * h))
    }
}
