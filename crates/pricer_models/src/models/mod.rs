//! Stochastic volatility models.
//!
//! - [`heston`]: Heston parameters, characteristic function and the
//!   semi-closed-form [`HestonEngine`]
//! - [`smile`]: single-maturity implied-volatility smile and model-risk report

pub mod heston;
pub mod smile;

pub use heston::{
    HestonEngine, HestonParams, HestonQuadrature, DEFAULT_KAPPA, DEFAULT_ORDER, DEFAULT_PANELS,
    DEFAULT_RHO, DEFAULT_THETA, DEFAULT_UPPER_LIMIT, DEFAULT_V0, DEFAULT_XI,
};
pub use smile::{generate_smile, SmilePoint};
