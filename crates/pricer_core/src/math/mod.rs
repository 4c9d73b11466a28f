//! Numerical building blocks shared by the engines.
//!
//! - [`solvers`]: Newton-Raphson with bisection safeguard
//! - [`interpolators`]: piecewise linear interpolation
//! - [`tridiagonal`]: Thomas algorithm for finite-difference steps
//! - [`quadrature`]: Gauss-Legendre integration for characteristic functions

pub mod interpolators;
pub mod quadrature;
pub mod solvers;
pub mod tridiagonal;
