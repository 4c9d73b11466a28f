//! Overlay configuration errors.

use pricer_core::types::PricingError;
use thiserror::Error;

/// Errors raised while setting up a protective put overlay.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OverlayError {
    /// The put would expire after the end of the overlay horizon.
    #[error("put maturity {put_maturity} exceeds the overlay horizon {horizon}")]
    PutOutlivesHorizon {
        /// Put maturity in years
        put_maturity: f64,
        /// Overlay horizon in years
        horizon: f64,
    },

    /// A configuration value is out of range.
    #[error("invalid overlay parameter {name} = {value}")]
    InvalidConfig {
        /// Field name
        name: &'static str,
        /// Offending value
        value: f64,
    },
}

impl From<OverlayError> for PricingError {
    fn from(err: OverlayError) -> Self {
        PricingError::InvalidParameter(err.to_string())
    }
}
