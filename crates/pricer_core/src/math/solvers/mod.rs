//! Root-finding solvers for numerical computation.
//!
//! ## Available Solvers
//!
//! - [`NewtonRaphsonSolver`]: Newton iteration, plain or safeguarded by a
//!   bisection bracket (`find_root_bracketed`), used for implied volatility
//!
//! ## Configuration
//!
//! Solvers use [`SolverConfig`] for configuring:
//! - `tolerance`: Convergence tolerance (default: 1e-10)
//! - `max_iterations`: Maximum iteration count (default: 100)
//!
//! ## Examples
//!
//! ```
//! use pricer_core::math::solvers::{NewtonRaphsonSolver, SolverConfig};
//!
//! // Solve x³ - x - 2 = 0 in bracket [1, 2]
//! let solver = NewtonRaphsonSolver::new(SolverConfig::default());
//! let f = |x: f64| x * x * x - x - 2.0;
//! let f_prime = |x: f64| 3.0 * x * x - 1.0;
//!
//! let root = solver.find_root_bracketed(f, f_prime, 1.0, 2.0, 1.5).unwrap();
//! assert!(f(root).abs() < 1e-10);
//! ```

mod config;
mod newton_raphson;

pub use config::{SolverConfig, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};
pub use newton_raphson::NewtonRaphsonSolver;
