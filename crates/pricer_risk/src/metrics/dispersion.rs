//! Location and dispersion statistics.

use pricer_core::types::PricingError;

use super::{check_sample, var::quantile};

/// Trading days per year used to annualise daily statistics.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Arithmetic mean.
///
/// # Errors
/// `InsufficientSamples` for an empty sample.
pub fn mean(values: &[f64]) -> Result<f64, PricingError> {
    check_sample(values, 1)?;
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (divisor `n - 1`).
///
/// # Errors
/// `InsufficientSamples` for fewer than two observations.
///
/// # Examples
///
/// ```rust
/// use pricer_risk::metrics::std_dev;
///
/// let sd = std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
/// assert!((sd - 2.138089935299395).abs() < 1e-12);
/// assert!(std_dev(&[1.0]).is_err());
/// ```
pub fn std_dev(values: &[f64]) -> Result<f64, PricingError> {
    check_sample(values, 2)?;
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Ok((ss / (values.len() - 1) as f64).sqrt())
}

/// Median (the 0.5-quantile).
pub fn median(values: &[f64]) -> Result<f64, PricingError> {
    quantile(values, 0.5)
}

/// Sample standard deviation of per-period returns scaled by
/// `√periods_per_year`.
///
/// # Errors
/// `InsufficientSamples` for fewer than two returns; `InvalidParameter` if
/// `periods_per_year` is not positive.
pub fn annualised_volatility(returns: &[f64], periods_per_year: f64) -> Result<f64, PricingError> {
    if !(periods_per_year > 0.0 && periods_per_year.is_finite()) {
        return Err(PricingError::invalid("periods_per_year", periods_per_year));
    }
    Ok(std_dev(returns)? * periods_per_year.sqrt())
}
