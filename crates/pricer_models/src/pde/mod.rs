//! Finite-difference solution of the Black-Scholes PDE.
//!
//! - [`grid`]: [`PriceGrid`], the (time, price) value surface of one solve
//! - [`finite_difference`]: [`FiniteDifferenceEngine`] with implicit and
//!   Crank-Nicolson time stepping

pub mod finite_difference;
pub mod grid;

pub use finite_difference::{
    convergence_table, FiniteDifferenceEngine, GridConvergenceRow, PdeConfig, Scheme,
    BOUND_TOLERANCE_FRACTION, DEFAULT_PRICE_STEPS, DEFAULT_RANNACHER_STEPS,
    DEFAULT_S_MAX_MULTIPLIER, DEFAULT_TIME_STEPS,
};
pub use grid::{GridReading, PriceGrid};
