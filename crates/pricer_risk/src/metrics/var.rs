//! Historical quantile, VaR and CVaR.

use pricer_core::types::PricingError;

use super::sorted;

/// Quantile of an already sorted, non-empty sample with linear interpolation
/// between order statistics (position `(n - 1)·p`).
fn sorted_quantile(sorted: &[f64], p: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

fn check_confidence(confidence: f64) -> Result<(), PricingError> {
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(PricingError::InvalidParameter(format!(
            "confidence level must lie in (0, 1), got {}",
            confidence
        )));
    }
    Ok(())
}

/// The `p`-quantile of `values`, interpolating linearly between order
/// statistics.
///
/// # Errors
/// `InsufficientSamples` for an empty sample; `InvalidParameter` for `p`
/// outside `[0, 1]` or a non-finite observation.
///
/// # Examples
///
/// ```rust
/// use pricer_risk::metrics::quantile;
///
/// let q = quantile(&[4.0, 1.0, 3.0, 2.0], 0.5).unwrap();
/// assert!((q - 2.5).abs() < 1e-12);
/// ```
pub fn quantile(values: &[f64], p: f64) -> Result<f64, PricingError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(PricingError::InvalidParameter(format!(
            "quantile probability must lie in [0, 1], got {}",
            p
        )));
    }
    Ok(sorted_quantile(&sorted(values)?, p))
}

/// Historical Value-at-Risk: the `(1 - confidence)`-quantile of the outcomes.
///
/// # Errors
/// As [`quantile`], plus `InvalidParameter` if `confidence` is not in `(0, 1)`.
pub fn value_at_risk(values: &[f64], confidence: f64) -> Result<f64, PricingError> {
    check_confidence(confidence)?;
    Ok(sorted_quantile(&sorted(values)?, 1.0 - confidence))
}

/// Conditional Value-at-Risk: mean of the outcomes at or below the VaR.
///
/// The tail always contains the sample minimum, so it is never empty.
///
/// # Errors
/// As [`value_at_risk`].
pub fn conditional_value_at_risk(values: &[f64], confidence: f64) -> Result<f64, PricingError> {
    check_confidence(confidence)?;
    let sorted = sorted(values)?;
    let var = sorted_quantile(&sorted, 1.0 - confidence);
    let tail: Vec<f64> = sorted.iter().copied().take_while(|v| *v <= var).collect();
    Ok(tail.iter().sum::<f64>() / tail.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    const OUTCOMES: [f64; 10] = [-5.0, -3.0, -1.0, 0.0, 1.0, 2.0, 4.0, 6.0, 8.0, 10.0];

    // ========================================
    // Quantile Tests
    // ========================================

    #[test]
    fn test_quantile_endpoints() {
        assert_eq!(quantile(&OUTCOMES, 0.0).unwrap(), -5.0);
        assert_eq!(quantile(&OUTCOMES, 1.0).unwrap(), 10.0);
    }

    #[test]
    fn test_quantile_ignores_input_order() {
        let mut shuffled = OUTCOMES;
        shuffled.reverse();
        assert_relative_eq!(
            quantile(&shuffled, 0.3).unwrap(),
            quantile(&OUTCOMES, 0.3).unwrap(),
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_quantile_single_observation() {
        assert_eq!(quantile(&[7.0], 0.25).unwrap(), 7.0);
    }

    #[test]
    fn test_quantile_rejects_bad_input() {
        assert!(matches!(
            quantile(&[], 0.5),
            Err(PricingError::InsufficientSamples { got: 0, need: 1 })
        ));
        assert!(quantile(&OUTCOMES, 1.5).is_err());
        assert!(quantile(&[1.0, f64::NAN], 0.5).is_err());
    }

    // ========================================
    // VaR / CVaR Tests
    // ========================================

    #[test]
    fn test_var_is_fifth_percentile() {
        // position 0.45 between -5 and -3
        assert_relative_eq!(value_at_risk(&OUTCOMES, 0.95).unwrap(), -4.1, epsilon = 1e-12);
    }

    #[test]
    fn test_cvar_is_tail_mean() {
        assert_relative_eq!(
            conditional_value_at_risk(&OUTCOMES, 0.95).unwrap(),
            -5.0,
            epsilon = 1e-12
        );
        // 80% VaR = -1.4, tail {-5, -3}
        assert_relative_eq!(
            conditional_value_at_risk(&OUTCOMES, 0.8).unwrap(),
            -4.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_confidence_must_be_open_interval() {
        assert!(value_at_risk(&OUTCOMES, 1.0).is_err());
        assert!(conditional_value_at_risk(&OUTCOMES, 0.0).is_err());
    }

    proptest! {
        #[test]
        fn prop_quantile_monotone_and_bounded(
            values in prop::collection::vec(-1e3f64..1e3, 1..60),
            p in 0.0f64..1.0,
            dp in 0.0f64..0.5,
        ) {
            let q1 = quantile(&values, p).unwrap();
            let q2 = quantile(&values, (p + dp).min(1.0)).unwrap();
            let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(q1 <= q2 + 1e-9);
            prop_assert!(q1 >= lo - 1e-9 && q1 <= hi + 1e-9);
        }

        #[test]
        fn prop_cvar_not_above_var(
            values in prop::collection::vec(-1e3f64..1e3, 1..60),
            confidence in 0.5f64..0.99,
        ) {
            let var = value_at_risk(&values, confidence).unwrap();
            let cvar = conditional_value_at_risk(&values, confidence).unwrap();
            prop_assert!(cvar <= var + 1e-9);
        }
    }
}
