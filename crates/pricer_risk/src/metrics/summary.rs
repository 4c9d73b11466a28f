//! Aggregate risk statistics over a sample of outcomes.

use pricer_core::types::PricingError;

use super::dispersion::{annualised_volatility, mean, median, std_dev};
use super::drawdown::{max_drawdown, pnl_drawdown};
use super::var::{conditional_value_at_risk, value_at_risk};

/// Confidence level used for VaR and CVaR when none is configured.
pub const DEFAULT_CONFIDENCE: f64 = 0.95;

/// Summary statistics of a distribution of outcomes.
///
/// Built either from P&L values ([`RiskSummary::from_outcomes`], e.g.
/// hedging errors) or from per-period returns ([`RiskSummary::from_returns`]).
/// The two differ only in how the drawdown is measured and whether an
/// annualised volatility is reported.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RiskSummary {
    /// Number of observations.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample standard deviation.
    pub std_dev: f64,
    /// Median.
    pub median: f64,
    /// Smallest observation.
    pub min: f64,
    /// Largest observation.
    pub max: f64,
    /// Level at which VaR and CVaR are stated.
    pub confidence: f64,
    /// `(1 - confidence)`-quantile.
    pub value_at_risk: f64,
    /// Mean of the tail at or below the VaR.
    pub conditional_value_at_risk: f64,
    /// Worst running peak-to-trough fall (≤ 0).
    pub max_drawdown: f64,
    /// Volatility scaled to one year, for return series only.
    pub annualised_volatility: Option<f64>,
}

impl RiskSummary {
    /// Summarises P&L outcomes; the drawdown is taken on their running sum.
    ///
    /// # Errors
    /// `InsufficientSamples` for fewer than two outcomes; `InvalidParameter`
    /// for a confidence outside `(0, 1)` or a non-finite outcome.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pricer_risk::metrics::RiskSummary;
    ///
    /// let errors = [-5.0, -3.0, -1.0, 0.0, 1.0, 2.0, 4.0, 6.0, 8.0, 10.0];
    /// let summary = RiskSummary::from_outcomes(&errors, 0.95).unwrap();
    /// assert_eq!(summary.count, 10);
    /// assert!((summary.value_at_risk + 4.1).abs() < 1e-12);
    /// assert!(summary.annualised_volatility.is_none());
    /// ```
    pub fn from_outcomes(values: &[f64], confidence: f64) -> Result<Self, PricingError> {
        let mut summary = Self::base(values, confidence)?;
        summary.max_drawdown = pnl_drawdown(values)?;
        Ok(summary)
    }

    /// Summarises simple per-period returns; the drawdown is taken on the
    /// compounded wealth path and the volatility is annualised with
    /// `periods_per_year`.
    ///
    /// # Errors
    /// As [`RiskSummary::from_outcomes`], plus `InvalidParameter` for a
    /// return below -100% or a non-positive `periods_per_year`.
    pub fn from_returns(
        returns: &[f64],
        confidence: f64,
        periods_per_year: f64,
    ) -> Result<Self, PricingError> {
        let mut summary = Self::base(returns, confidence)?;
        summary.max_drawdown = max_drawdown(returns)?;
        summary.annualised_volatility = Some(annualised_volatility(returns, periods_per_year)?);
        Ok(summary)
    }

    fn base(values: &[f64], confidence: f64) -> Result<Self, PricingError> {
        let std_dev = std_dev(values)?;
        Ok(Self {
            count: values.len(),
            mean: mean(values)?,
            std_dev,
            median: median(values)?,
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            confidence,
            value_at_risk: value_at_risk(values, confidence)?,
            conditional_value_at_risk: conditional_value_at_risk(values, confidence)?,
            max_drawdown: 0.0,
            annualised_volatility: None,
        })
    }
}
