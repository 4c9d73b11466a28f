//! Analytical pricing formulas for European options.
//!
//! This module provides closed-form solutions for option pricing:
//! - Black-Scholes with a continuous dividend yield
//! - Garman-Kohlhagen for FX options
//! - Analytical Greeks (Delta, Gamma, Vega, Theta, Rho)
//! - Implied volatility by safeguarded Newton iteration
//!
//! ## Design Principles
//!
//! - **Eager validation**: every constructor checks its [`OptionSpec`](pricer_core::types::OptionSpec)
//! - **Exact parity**: the erfc-based CDF satisfies Φ(x) + Φ(-x) = 1 to rounding

pub mod black_scholes;
pub mod distributions;
pub mod garman_kohlhagen;
pub mod implied_vol;

// Re-export main types at module level
pub use black_scholes::{put_call_parity_residual, BlackScholes, BlackScholesEngine};
pub use distributions::{norm_cdf, norm_inv, norm_pdf};
pub use garman_kohlhagen::{FxOptionSpec, GarmanKohlhagenEngine};
pub use implied_vol::{
    implied_volatility, ImpliedVolConfig, DEFAULT_IV_MAX_ITERATIONS, DEFAULT_IV_TOLERANCE,
    MAX_IMPLIED_VOL, MIN_IMPLIED_VOL,
};
