//! Historical price data loaded from files or external feeds.
//!
//! The core treats these values as opaque, read-only input: no fetching,
//! refreshing or caching happens here.
//!
//! # Components
//!
//! - [`series`]: [`PriceSeries`] with return and realised-volatility helpers
//! - [`quality`]: [`DataQualityReport`] and readiness checks
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use pricer_core::market_data::{PriceSeries, TRADING_DAYS_PER_YEAR};
//!
//! let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
//! let series = PriceSeries::new(vec![(d(2), 100.0), (d(3), 102.0), (d(4), 101.0)]);
//! let vol = series.realized_volatility(TRADING_DAYS_PER_YEAR).unwrap();
//! assert!(vol > 0.0);
//! ```

pub mod quality;
pub mod series;

pub use quality::{
    DataQualityReport, DateGap, DEFAULT_MAX_GAP_DAYS, DEFAULT_MIN_OBSERVATIONS,
    START_TOLERANCE_DAYS,
};
pub use series::{Observation, PriceSeries, DEFAULT_VOL_WINDOW, TRADING_DAYS_PER_YEAR};
