//! Engine outputs.

/// Analytic or finite-difference sensitivities.
///
/// Each field is optional because not every engine produces every Greek:
/// the lattice only yields delta, Monte Carlo yields the bumped subset.
///
/// # Conventions
///
/// - `delta`: ∂V/∂S
/// - `gamma`: ∂²V/∂S²
/// - `vega`: ∂V/∂σ per unit of volatility (not per 1%)
/// - `theta`: ∂V/∂t per year (calendar decay, negative for a long call)
/// - `rho`: ∂V/∂r per unit of rate
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Greeks {
    /// Delta: ∂V/∂S.
    pub delta: Option<f64>,
    /// Gamma: ∂²V/∂S².
    pub gamma: Option<f64>,
    /// Vega: ∂V/∂σ.
    pub vega: Option<f64>,
    /// Theta: ∂V/∂t.
    pub theta: Option<f64>,
    /// Rho: ∂V/∂r.
    pub rho: Option<f64>,
}

impl Greeks {
    /// Greeks with only delta populated.
    #[inline]
    pub fn delta_only(delta: f64) -> Self {
        Self {
            delta: Some(delta),
            ..Default::default()
        }
    }
}

/// Two-sided confidence interval around a simulated estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfidenceInterval {
    /// Lower bound.
    pub lower: f64,
    /// Upper bound.
    pub upper: f64,
    /// Confidence level in (0, 1), e.g. 0.95.
    pub level: f64,
}

impl ConfidenceInterval {
    /// Builds `estimate ± z * std_error`.
    pub fn symmetric(estimate: f64, std_error: f64, z: f64, level: f64) -> Self {
        Self {
            lower: estimate - z * std_error,
            upper: estimate + z * std_error,
            level,
        }
    }

    /// Returns `true` if `value` lies inside the interval (inclusive).
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    /// Half of the interval width.
    #[inline]
    pub fn half_width(&self) -> f64 {
        0.5 * (self.upper - self.lower)
    }
}

/// Output of a pricing engine. Read-only once produced.
///
/// # Examples
///
/// ```
/// use pricer_core::types::{Greeks, PricingResult};
///
/// let result = PricingResult::new(10.45).with_greeks(Greeks::delta_only(0.64));
/// assert_eq!(result.delta(), Some(0.64));
/// assert!(result.confidence_interval.is_none());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PricingResult {
    /// Present value.
    pub price: f64,
    /// Sensitivities produced alongside the price.
    pub greeks: Greeks,
    /// Standard error of the estimate (simulation engines only).
    pub std_error: Option<f64>,
    /// Confidence interval of the estimate (simulation engines only).
    pub confidence_interval: Option<ConfidenceInterval>,
}

impl PricingResult {
    /// Result carrying only a price.
    #[inline]
    pub fn new(price: f64) -> Self {
        Self {
            price,
            ..Default::default()
        }
    }

    /// Attaches Greeks.
    #[inline]
    pub fn with_greeks(self, greeks: Greeks) -> Self {
        Self { greeks, ..self }
    }

    /// Attaches a standard error and the matching confidence interval.
    #[inline]
    pub fn with_interval(self, std_error: f64, interval: ConfidenceInterval) -> Self {
        Self {
            std_error: Some(std_error),
            confidence_interval: Some(interval),
            ..self
        }
    }

    /// Shorthand for `greeks.delta`.
    #[inline]
    pub fn delta(&self) -> Option<f64> {
        self.greeks.delta
    }
}
