//! Running peak-to-trough drawdown.

use pricer_core::types::PricingError;

use super::check_sample;

/// Wealth path `W_i = Π_{j<=i} (1 + r_j)` starting from one unit.
///
/// # Errors
/// `InsufficientSamples` for an empty series; `InvalidParameter` for a
/// non-finite return or a return below -100%.
pub fn cumulative_wealth(returns: &[f64]) -> Result<Vec<f64>, PricingError> {
    check_sample(returns, 1)?;
    if let Some((i, r)) = returns.iter().enumerate().find(|(_, r)| **r < -1.0) {
        return Err(PricingError::InvalidParameter(format!(
            "return {} = {} loses more than the whole position",
            i, r
        )));
    }
    Ok(returns
        .iter()
        .scan(1.0, |wealth, r| {
            *wealth *= 1.0 + r;
            Some(*wealth)
        })
        .collect())
}

/// Drawdown at every point of the wealth path: `W_i / max_{j<=i} W_j - 1`.
///
/// # Errors
/// As [`cumulative_wealth`].
pub fn drawdown_series(returns: &[f64]) -> Result<Vec<f64>, PricingError> {
    let wealth = cumulative_wealth(returns)?;
    let mut peak = f64::NEG_INFINITY;
    Ok(wealth
        .into_iter()
        .map(|w| {
            peak = peak.max(w);
            if peak > 0.0 {
                w / peak - 1.0
            } else {
                -1.0
            }
        })
        .collect())
}

/// Largest relative fall from a running peak of the wealth path (≤ 0).
///
/// # Errors
/// As [`cumulative_wealth`].
///
/// # Examples
///
/// ```rust
/// use pricer_risk::metrics::max_drawdown;
///
/// let mdd = max_drawdown(&[0.10, -0.20, 0.05, -0.10]).unwrap();
/// assert!((mdd + 0.244).abs() < 1e-12);
/// ```
pub fn max_drawdown(returns: &[f64]) -> Result<f64, PricingError> {
    Ok(drawdown_series(returns)?
        .into_iter()
        .fold(0.0, f64::min))
}

/// Largest absolute fall of the running sum of P&L values from its running
/// peak, with the cumulative series starting at zero (≤ 0).
///
/// # Errors
/// `InsufficientSamples` for an empty series.
pub fn pnl_drawdown(pnl: &[f64]) -> Result<f64, PricingError> {
    check_sample(pnl, 1)?;
    let (mut total, mut peak, mut worst) = (0.0_f64, 0.0_f64, 0.0_f64);
    for value in pnl {
        total += value;
        peak = peak.max(total);
        worst = worst.min(total - peak);
    }
    Ok(worst)
}
