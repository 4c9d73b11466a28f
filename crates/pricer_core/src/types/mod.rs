//! Contract, result and error types.
//!
//! This module provides:
//! - `option`: [`OptionSpec`], [`OptionType`], [`ExerciseStyle`]
//! - `result`: [`PricingResult`], [`Greeks`], [`ConfidenceInterval`]
//! - `error`: Structured error types for pricing, interpolation, and solver operations
//!
//! # Re-exports
//!
//! For convenience, commonly used types are re-exported at this module level.

pub mod error;
pub mod option;
pub mod result;

pub use error::{InterpolationError, PricingError, SolverError};
pub use option::{ExerciseStyle, OptionSpec, OptionType, EXPIRY_EPSILON};
pub use result::{ConfidenceInterval, Greeks, PricingResult};
