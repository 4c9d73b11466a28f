//! Risk metrics over a distribution of outcomes.
//!
//! All functions are pure and operate on plain slices, so they apply equally
//! to hedging errors, overlay portfolio returns or historical returns.
//!
//! ## Sign convention
//!
//! Values are profits: a loss is negative. [`value_at_risk`] therefore
//! returns the lower-tail quantile itself (a negative number for a losing
//! tail) rather than a positive loss amount.
//!
//! ## Example
//!
//! ```rust
//! use pricer_risk::metrics::{conditional_value_at_risk, value_at_risk};
//!
//! let outcomes = [-5.0, -3.0, -1.0, 0.0, 1.0, 2.0, 4.0, 6.0, 8.0, 10.0];
//! let var = value_at_risk(&outcomes, 0.95).unwrap();
//! let cvar = conditional_value_at_risk(&outcomes, 0.95).unwrap();
//! assert!((var + 4.1).abs() < 1e-12);
//! assert!((cvar + 5.0).abs() < 1e-12);
//! ```

mod dispersion;
mod drawdown;
mod summary;
mod var;

pub use dispersion::{annualised_volatility, mean, median, std_dev, TRADING_DAYS_PER_YEAR};
pub use drawdown::{cumulative_wealth, drawdown_series, max_drawdown, pnl_drawdown};
pub use summary::{RiskSummary, DEFAULT_CONFIDENCE};
pub use var::{conditional_value_at_risk, quantile, value_at_risk};

use pricer_core::types::PricingError;

/// Rejects empty input and non-finite observations.
pub(crate) fn check_sample(values: &[f64], need: usize) -> Result<(), PricingError> {
    if values.len() < need {
        return Err(PricingError::InsufficientSamples {
            got: values.len(),
            need,
        });
    }
    if let Some((i, v)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(PricingError::InvalidParameter(format!(
            "observation {} = {} is not finite",
            i, v
        )));
    }
    Ok(())
}

/// Sorted copy of a validated sample.
pub(crate) fn sorted(values: &[f64]) -> Result<Vec<f64>, PricingError> {
    check_sample(values, 1)?;
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Ok(sorted)
}
