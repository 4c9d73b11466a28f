//! Vanilla option contract description.
//!
//! [`OptionSpec`] is the immutable input shared by every engine. Volatility is
//! optional so that the same value can describe a contract whose volatility
//! is the unknown (implied-volatility inversion).

use super::error::PricingError;

/// Maturities at or below this threshold are treated as expired.
pub const EXPIRY_EPSILON: f64 = 1e-10;

/// Call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OptionType {
    /// Right to buy at the strike.
    Call,
    /// Right to sell at the strike.
    Put,
}

impl OptionType {
    /// Returns `true` for a call.
    #[inline]
    pub fn is_call(&self) -> bool {
        matches!(self, OptionType::Call)
    }

    /// +1 for a call, -1 for a put.
    #[inline]
    pub fn sign(&self) -> f64 {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionType::Call => write!(f, "call"),
            OptionType::Put => write!(f, "put"),
        }
    }
}

impl std::str::FromStr for OptionType {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "call" | "c" => Ok(OptionType::Call),
            "put" | "p" => Ok(OptionType::Put),
            other => Err(PricingError::InvalidParameter(format!(
                "unknown option type '{}': expected call or put",
                other
            ))),
        }
    }
}

/// Exercise style.
///
/// Every engine supports European exercise; American exercise is only
/// honoured by the lattice engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ExerciseStyle {
    /// Exercise at maturity only.
    #[default]
    European,
    /// Exercise at any time up to maturity.
    American,
}

/// Immutable description of a vanilla option and its market inputs.
///
/// # Invariants
///
/// `spot`, `strike`, `maturity` and (when present) `volatility` must be
/// strictly positive and finite; [`validate`](Self::validate) enforces this.
/// `maturity` may also be zero, which every engine prices at intrinsic value.
///
/// # Examples
///
/// ```
/// use pricer_core::types::{ExerciseStyle, OptionSpec, OptionType};
///
/// let spec = OptionSpec::european_put(100.0, 95.0, 0.5, 0.03, 0.25)
///     .with_dividend_yield(0.01)
///     .with_exercise(ExerciseStyle::American);
///
/// assert_eq!(spec.option_type, OptionType::Put);
/// assert_eq!(spec.exercise, ExerciseStyle::American);
/// assert!((spec.forward() - 100.0 * (0.02_f64 * 0.5).exp()).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptionSpec {
    /// Underlying spot price (S).
    pub spot: f64,
    /// Strike price (K).
    pub strike: f64,
    /// Time to maturity in years (T).
    pub maturity: f64,
    /// Continuously compounded risk-free (domestic) rate (r).
    pub rate: f64,
    /// Continuous dividend yield, or foreign rate for FX (q).
    pub dividend_yield: f64,
    /// Annualised volatility, `None` when it is the unknown.
    pub volatility: Option<f64>,
    /// Call or put.
    pub option_type: OptionType,
    /// Exercise style.
    pub exercise: ExerciseStyle,
}

impl OptionSpec {
    /// Creates a European option with zero dividend yield.
    pub fn new(
        option_type: OptionType,
        spot: f64,
        strike: f64,
        maturity: f64,
        rate: f64,
        volatility: f64,
    ) -> Self {
        Self {
            spot,
            strike,
            maturity,
            rate,
            dividend_yield: 0.0,
            volatility: Some(volatility),
            option_type,
            exercise: ExerciseStyle::European,
        }
    }

    /// European call with zero dividend yield.
    pub fn european_call(
        spot: f64,
        strike: f64,
        maturity: f64,
        rate: f64,
        volatility: f64,
    ) -> Self {
        Self::new(OptionType::Call, spot, strike, maturity, rate, volatility)
    }

    /// European put with zero dividend yield.
    pub fn european_put(spot: f64, strike: f64, maturity: f64, rate: f64, volatility: f64) -> Self {
        Self::new(OptionType::Put, spot, strike, maturity, rate, volatility)
    }

    /// Returns a copy with a different spot.
    #[inline]
    pub fn with_spot(self, spot: f64) -> Self {
        Self { spot, ..self }
    }

    /// Returns a copy with a different strike.
    #[inline]
    pub fn with_strike(self, strike: f64) -> Self {
        Self { strike, ..self }
    }

    /// Returns a copy with a different maturity.
    #[inline]
    pub fn with_maturity(self, maturity: f64) -> Self {
        Self { maturity, ..self }
    }

    /// Returns a copy with a different risk-free rate.
    #[inline]
    pub fn with_rate(self, rate: f64) -> Self {
        Self { rate, ..self }
    }

    /// Returns a copy with a different dividend (or foreign) yield.
    #[inline]
    pub fn with_dividend_yield(self, dividend_yield: f64) -> Self {
        Self {
            dividend_yield,
            ..self
        }
    }

    /// Returns a copy with the given volatility.
    #[inline]
    pub fn with_volatility(self, volatility: f64) -> Self {
        Self {
            volatility: Some(volatility),
            ..self
        }
    }

    /// Returns a copy with volatility marked as unknown.
    #[inline]
    pub fn without_volatility(self) -> Self {
        Self {
            volatility: None,
            ..self
        }
    }

    /// Returns a copy with a different option type.
    #[inline]
    pub fn with_option_type(self, option_type: OptionType) -> Self {
        Self {
            option_type,
            ..self
        }
    }

    /// Returns a copy with a different exercise style.
    #[inline]
    pub fn with_exercise(self, exercise: ExerciseStyle) -> Self {
        Self { exercise, ..self }
    }

    /// Validates the contract and market inputs.
    ///
    /// Volatility is only checked when present.
    ///
    /// # Errors
    ///
    /// `PricingError::InvalidParameter` naming the first offending field.
    pub fn validate(&self) -> Result<(), PricingError> {
        if !(self.spot > 0.0 && self.spot.is_finite()) {
            return Err(PricingError::invalid("spot", self.spot));
        }
        if !(self.strike > 0.0 && self.strike.is_finite()) {
            return Err(PricingError::invalid("strike", self.strike));
        }
        if !(self.maturity >= 0.0 && self.maturity.is_finite()) {
            return Err(PricingError::invalid("maturity", self.maturity));
        }
        if !self.rate.is_finite() || !self.dividend_yield.is_finite() {
            return Err(PricingError::InvalidParameter(format!(
                "rates must be finite: r = {}, q = {}",
                self.rate, self.dividend_yield
            )));
        }
        if let Some(vol) = self.volatility {
            if !(vol > 0.0 && vol.is_finite()) {
                return Err(PricingError::invalid("volatility", vol));
            }
        }
        Ok(())
    }

    /// Returns the volatility or fails when it is the unknown.
    pub fn require_volatility(&self) -> Result<f64, PricingError> {
        self.volatility.ok_or_else(|| {
            PricingError::InvalidParameter("volatility is required by this engine".to_string())
        })
    }

    /// Returns `true` if the option has (numerically) expired.
    #[inline]
    pub fn is_expired(&self) -> bool {
        self.maturity <= EXPIRY_EPSILON
    }

    /// Payoff at expiry for an underlying price `spot_at_expiry`.
    #[inline]
    pub fn payoff(&self, spot_at_expiry: f64) -> f64 {
        match self.option_type {
            OptionType::Call => (spot_at_expiry - self.strike).max(0.0),
            OptionType::Put => (self.strike - spot_at_expiry).max(0.0),
        }
    }

    /// Intrinsic value at the given spot (same formula as the payoff).
    #[inline]
    pub fn intrinsic(&self, spot: f64) -> f64 {
        self.payoff(spot)
    }

    /// Risk-free discount factor e^{-rT}.
    #[inline]
    pub fn discount_factor(&self) -> f64 {
        (-self.rate * self.maturity).exp()
    }

    /// Dividend discount factor e^{-qT}.
    #[inline]
    pub fn dividend_discount(&self) -> f64 {
        (-self.dividend_yield * self.maturity).exp()
    }

    /// Forward price S e^{(r-q)T}.
    #[inline]
    pub fn forward(&self) -> f64 {
        self.spot * ((self.rate - self.dividend_yield) * self.maturity).exp()
    }

    /// No-arbitrage price bounds `(lower, upper)` of a European option.
    ///
    /// - call: `[max(0, S e^{-qT} - K e^{-rT}), S e^{-qT}]`
    /// - put: `[max(0, K e^{-rT} - S e^{-qT}), K e^{-rT}]`
    pub fn price_bounds(&self) -> (f64, f64) {
        let pv_spot = self.spot * self.dividend_discount();
        let pv_strike = self.strike * self.discount_factor();
        match self.option_type {
            OptionType::Call => ((pv_spot - pv_strike).max(0.0), pv_spot),
            OptionType::Put => ((pv_strike - pv_spot).max(0.0), pv_strike),
        }
    }
}
