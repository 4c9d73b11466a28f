//! Dated price observations and the return and volatility statistics built on them.

use crate::types::PricingError;
use chrono::NaiveDate;

/// Trading days per year used to annualise daily statistics.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Default rolling window for realised volatility (one trading month).
pub const DEFAULT_VOL_WINDOW: usize = 21;

/// A single dated observation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Observation {
    /// Observation date.
    pub date: NaiveDate,
    /// Closing price.
    pub price: f64,
}

/// Ordered (date, price) observations, treated as opaque read-only input.
///
/// The series keeps observations in the order supplied so that
/// [`quality_report`](Self::quality_report) can detect ordering problems;
/// [`cleaned`](Self::cleaned) returns a sorted, de-duplicated copy.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use pricer_core::market_data::PriceSeries;
///
/// let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
/// let series = PriceSeries::new(vec![(d(2), 100.0), (d(3), 101.0), (d(4), 99.99)]);
/// let returns = series.log_returns().unwrap();
/// assert_eq!(returns.len(), 2);
/// assert!((returns[0] - (1.01_f64).ln()).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    observations: Vec<Observation>,
}

impl PriceSeries {
    /// Wraps `(date, price)` pairs without reordering them.
    pub fn new(observations: Vec<(NaiveDate, f64)>) -> Self {
        Self {
            observations: observations
                .into_iter()
                .map(|(date, price)| Observation { date, price })
                .collect(),
        }
    }

    /// Observations in supplied order.
    #[inline]
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Number of observations.
    #[inline]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Returns `true` if there are no observations.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Prices in supplied order.
    pub fn prices(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.price).collect()
    }

    /// Earliest observation date.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.iter().map(|o| o.date).min()
    }

    /// Latest observation date.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.iter().map(|o| o.date).max()
    }

    /// Sorted by date, keeping the last observation for repeated dates and
    /// dropping non-finite or non-positive prices.
    pub fn cleaned(&self) -> Self {
        let mut observations: Vec<Observation> = self
            .observations
            .iter()
            .copied()
            .filter(|o| o.price.is_finite() && o.price > 0.0)
            .collect();
        // Stable sort keeps supply order within a date, so the last one wins
        observations.sort_by_key(|o| o.date);
        let mut deduped: Vec<Observation> = Vec::with_capacity(observations.len());
        for obs in observations {
            match deduped.last_mut() {
                Some(last) if last.date == obs.date => *last = obs,
                _ => deduped.push(obs),
            }
        }
        Self {
            observations: deduped,
        }
    }

    fn checked_prices(&self) -> Result<Vec<f64>, PricingError> {
        if self.len() < 2 {
            return Err(PricingError::InsufficientSamples {
                got: self.len(),
                need: 2,
            });
        }
        if let Some(bad) = self
            .observations
            .iter()
            .find(|o| !(o.price.is_finite() && o.price > 0.0))
        {
            return Err(PricingError::InvalidPath(format!(
                "non-positive price {} on {}",
                bad.price, bad.date
            )));
        }
        Ok(self.prices())
    }

    /// Log returns `ln(S_{i+1} / S_i)`.
    ///
    /// # Errors
    ///
    /// - `InsufficientSamples` with fewer than two observations
    /// - `InvalidPath` if any price is non-positive or non-finite
    pub fn log_returns(&self) -> Result<Vec<f64>, PricingError> {
        let prices = self.checked_prices()?;
        Ok(prices.windows(2).map(|w| (w[1] / w[0]).ln()).collect())
    }

    /// Simple returns `S_{i+1} / S_i - 1`.
    ///
    /// # Errors
    ///
    /// Same as [`log_returns`](Self::log_returns).
    pub fn simple_returns(&self) -> Result<Vec<f64>, PricingError> {
        let prices = self.checked_prices()?;
        Ok(prices.windows(2).map(|w| w[1] / w[0] - 1.0).collect())
    }

    /// Annualised realised volatility of log returns over the whole series.
    ///
    /// # Errors
    ///
    /// `InsufficientSamples` with fewer than two returns.
    pub fn realized_volatility(&self, periods_per_year: f64) -> Result<f64, PricingError> {
        let returns = self.log_returns()?;
        sample_std(&returns).map(|sd| sd * periods_per_year.sqrt())
    }

    /// Rolling annualised volatility of log returns.
    ///
    /// Element `i` covers returns `i..i + window`; the output has
    /// `n_returns - window + 1` values.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` if `window < 2`
    /// - `InsufficientSamples` if there are fewer returns than `window`
    pub fn rolling_volatility(
        &self,
        window: usize,
        periods_per_year: f64,
    ) -> Result<Vec<f64>, PricingError> {
        if window < 2 {
            return Err(PricingError::InvalidParameter(format!(
                "rolling window must be at least 2, got {}",
                window
            )));
        }
        let returns = self.log_returns()?;
        if returns.len() < window {
            return Err(PricingError::InsufficientSamples {
                got: returns.len(),
                need: window,
            });
        }
        let scale = periods_per_year.sqrt();
        returns
            .windows(window)
            .map(|w| sample_std(w).map(|sd| sd * scale))
            .collect()
    }
}

/// Sample standard deviation (n - 1 denominator).
fn sample_std(values: &[f64]) -> Result<f64, PricingError> {
    if values.len() < 2 {
        return Err(PricingError::InsufficientSamples {
            got: values.len(),
            need: 2,
        });
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Ok(var.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_returns_require_two_observations() {
        let series = PriceSeries::new(vec![(day(1), 100.0)]);
        assert_eq!(
            series.log_returns(),
            Err(PricingError::InsufficientSamples { got: 1, need: 2 })
        );
    }

    #[test]
    fn test_non_positive_price_is_invalid_path() {
        let series = PriceSeries::new(vec![(day(1), 100.0), (day(2), 0.0)]);
        assert!(matches!(series.simple_returns(), Err(PricingError::InvalidPath(_))));
    }

    #[test]
    fn test_cleaned_sorts_and_keeps_last_duplicate() {
        let series = PriceSeries::new(vec![
            (day(3), 103.0),
            (day(1), 101.0),
            (day(3), 104.0),
            (day(2), f64::NAN),
        ]);
        let cleaned = series.cleaned();
        assert_eq!(cleaned.prices(), vec![101.0, 104.0]);
        assert_eq!(cleaned.first_date(), Some(day(1)));
    }

    #[test]
    fn test_realized_volatility_of_alternating_returns() {
        // Log returns alternate between +a and -a
        let a: f64 = 0.01;
        let prices = [100.0, 100.0 * a.exp(), 100.0, 100.0 * a.exp(), 100.0];
        let series = PriceSeries::new(
            prices
                .iter()
                .enumerate()
                .map(|(i, &p)| (day(i as u32 + 1), p))
                .collect(),
        );
        let returns = [a, -a, a, -a];
        let expected = sample_std(&returns).unwrap() * TRADING_DAYS_PER_YEAR.sqrt();
        assert_relative_eq!(
            series.realized_volatility(TRADING_DAYS_PER_YEAR).unwrap(),
            expected,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_rolling_volatility_length_and_window_checks() {
        let series = PriceSeries::new(
            (1..=10)
                .map(|i| (day(i), 100.0 + (i % 3) as f64))
                .collect(),
        );
        let vols = series.rolling_volatility(3, TRADING_DAYS_PER_YEAR).unwrap();
        assert_eq!(vols.len(), 9 - 3 + 1);
        assert!(vols.iter().all(|v| *v >= 0.0));
        assert!(series.rolling_volatility(1, TRADING_DAYS_PER_YEAR).is_err());
        assert!(matches!(
            series.rolling_volatility(20, TRADING_DAYS_PER_YEAR),
            Err(PricingError::InsufficientSamples { got: 9, need: 20 })
        ));
    }
}
