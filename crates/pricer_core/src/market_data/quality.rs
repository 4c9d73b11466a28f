//! Integrity checks run on historical prices before they drive a hedge.

use super::series::PriceSeries;
use crate::types::PricingError;
use chrono::NaiveDate;

/// Default minimum number of observations (one trading year).
pub const DEFAULT_MIN_OBSERVATIONS: usize = 252;

/// Default largest tolerated calendar gap between observations.
pub const DEFAULT_MAX_GAP_DAYS: i64 = 5;

/// How far after the requested start the first observation may fall.
pub const START_TOLERANCE_DAYS: i64 = 7;

/// A calendar gap between consecutive observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DateGap {
    /// Date before the gap.
    pub prev_date: NaiveDate,
    /// Date after the gap.
    pub next_date: NaiveDate,
    /// Calendar days between the two.
    pub gap_days: i64,
}

/// Summary of a price series' integrity.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataQualityReport {
    /// Number of observations.
    pub n_obs: usize,
    /// Earliest date.
    pub first_date: Option<NaiveDate>,
    /// Latest date.
    pub last_date: Option<NaiveDate>,
    /// Any non-finite or non-positive price.
    pub has_missing_values: bool,
    /// Dates strictly increasing in supplied order.
    pub is_monotonic: bool,
    /// Any date repeated.
    pub has_duplicate_dates: bool,
    /// Largest calendar gap in days between consecutive observations.
    pub max_gap_days: Option<i64>,
    /// Gaps larger than the threshold passed to [`PriceSeries::quality_report`].
    pub large_gaps: Vec<DateGap>,
}

impl DataQualityReport {
    /// Returns `true` if the series is usable as-is.
    pub fn is_clean(&self, min_obs: usize) -> bool {
        !self.has_missing_values
            && self.is_monotonic
            && !self.has_duplicate_dates
            && self.large_gaps.is_empty()
            && self.n_obs >= min_obs
    }
}

impl PriceSeries {
    /// Builds a [`DataQualityReport`], flagging gaps above `max_gap_days`.
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use pricer_core::market_data::PriceSeries;
    ///
    /// let d = |m, day| NaiveDate::from_ymd_opt(2024, m, day).unwrap();
    /// let series = PriceSeries::new(vec![(d(1, 2), 100.0), (d(1, 3), 101.0), (d(1, 20), 102.0)]);
    /// let report = series.quality_report(5);
    /// assert_eq!(report.max_gap_days, Some(17));
    /// assert_eq!(report.large_gaps.len(), 1);
    /// assert!(!report.is_clean(2));
    /// ```
    pub fn quality_report(&self, max_gap_days: i64) -> DataQualityReport {
        let obs = self.observations();
        let has_missing_values = obs.iter().any(|o| !(o.price.is_finite() && o.price > 0.0));
        let is_monotonic = obs.windows(2).all(|w| w[1].date > w[0].date);

        let mut dates: Vec<NaiveDate> = obs.iter().map(|o| o.date).collect();
        dates.sort();
        let has_duplicate_dates = dates.windows(2).any(|w| w[0] == w[1]);

        let gaps: Vec<DateGap> = dates
            .windows(2)
            .map(|w| DateGap {
                prev_date: w[0],
                next_date: w[1],
                gap_days: (w[1] - w[0]).num_days(),
            })
            .collect();
        let max_gap = gaps.iter().map(|g| g.gap_days).max();
        let large_gaps = gaps
            .into_iter()
            .filter(|g| g.gap_days > max_gap_days)
            .collect();

        DataQualityReport {
            n_obs: obs.len(),
            first_date: dates.first().copied(),
            last_date: dates.last().copied(),
            has_missing_values,
            is_monotonic,
            has_duplicate_dates,
            max_gap_days: max_gap,
            large_gaps,
        }
    }

    /// Fails unless the series is ready for quantitative use.
    ///
    /// # Errors
    ///
    /// - `InsufficientSamples` if there are fewer than `min_obs` usable prices
    /// - `InvalidPath` for duplicates, non-increasing dates, missing prices,
    ///   a first date more than [`START_TOLERANCE_DAYS`] after `requested_start`,
    ///   or any gap above `max_gap_days`
    pub fn ensure_ready(
        &self,
        requested_start: Option<NaiveDate>,
        min_obs: usize,
        max_gap_days: i64,
    ) -> Result<(), PricingError> {
        if self.is_empty() {
            return Err(PricingError::InsufficientSamples {
                got: 0,
                need: min_obs.max(1),
            });
        }
        let report = self.quality_report(max_gap_days);
        if report.has_duplicate_dates {
            return Err(PricingError::InvalidPath("price dates contain duplicates".to_string()));
        }
        if !report.is_monotonic {
            return Err(PricingError::InvalidPath(
                "price dates must be strictly increasing".to_string(),
            ));
        }
        if report.has_missing_values {
            return Err(PricingError::InvalidPath(
                "price series contains missing or non-positive values".to_string(),
            ));
        }
        if report.n_obs < min_obs {
            return Err(PricingError::InsufficientSamples {
                got: report.n_obs,
                need: min_obs,
            });
        }
        if let (Some(start), Some(first)) = (requested_start, report.first_date) {
            if (first - start).num_days() > START_TOLERANCE_DAYS {
                return Err(PricingError::InvalidPath(format!(
                    "data starts too late: first date {}, expected near {}",
                    first, start
                )));
            }
        }
        if let Some(gap) = report.large_gaps.first() {
            return Err(PricingError::InvalidPath(format!(
                "calendar gap of {} days between {} and {}",
                gap.gap_days, gap.prev_date, gap.next_date
            )));
        }
        Ok(())
    }
}
