//! Portfolio overlays.
//!
//! Currently a single strategy: a budget-constrained protective put on a
//! long underlying position, compared against the unhedged position through
//! the [`metrics`](crate::metrics) module.

mod error;
mod protective_put;

pub use error::OverlayError;
pub use protective_put::{
    OverlayConfig, OverlayResult, OverlayReturns, ProtectivePutOverlay, DEFAULT_BUDGET_FRACTION,
    DEFAULT_NOTIONAL, DEFAULT_PUT_MATURITY, DEFAULT_PUT_STRIKE_PCT,
};
