//! Newton-Raphson root-finding solver.

use super::SolverConfig;
use crate::types::SolverError;
use num_traits::Float;

/// Newton-Raphson root finder.
///
/// Uses Newton's method: `x_{n+1} = x_n - f(x_n) / f'(x_n)` for fast
/// quadratic convergence on smooth functions.
///
/// # Type Parameters
///
/// * `T` - Floating-point type (e.g., `f64`)
///
/// # Convergence
///
/// Plain Newton may fail if the derivative is near zero or the initial
/// guess is far from the root. [`find_root_bracketed`](Self::find_root_bracketed)
/// guards against both by keeping a sign-changing bracket and falling back
/// to bisection whenever the Newton step would leave it.
///
/// # Example
///
/// ```
/// use pricer_core::math::solvers::{NewtonRaphsonSolver, SolverConfig};
///
/// // Solve x² - 2 = 0 (find √2)
/// let solver = NewtonRaphsonSolver::new(SolverConfig::default());
///
/// let f = |x: f64| x * x - 2.0;
/// let f_prime = |x: f64| 2.0 * x;
///
/// let root = solver.find_root(f, f_prime, 1.0).unwrap();
/// assert!((root - std::f64::consts::SQRT_2).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct NewtonRaphsonSolver<T: Float> {
    /// Solver configuration
    config: SolverConfig<T>,
}

impl<T: Float> NewtonRaphsonSolver<T> {
    /// Create a new Newton-Raphson solver with the given configuration.
    pub fn new(config: SolverConfig<T>) -> Self {
        Self { config }
    }

    /// Create a solver with default configuration.
    pub fn with_defaults() -> Self {
        Self {
            config: SolverConfig::default(),
        }
    }

    /// Find a root of `f` using explicit derivative `f_prime`.
    ///
    /// # Returns
    ///
    /// * `Ok(x)` - Root where `|f(x)| < tolerance`
    /// * `Err(SolverError::MaxIterationsExceeded)` - Failed to converge
    /// * `Err(SolverError::DerivativeNearZero)` - Derivative too small
    /// * `Err(SolverError::NumericalInstability)` - Iterate became non-finite
    pub fn find_root<F, G>(&self, f: F, f_prime: G, x0: T) -> Result<T, SolverError>
    where
        F: Fn(T) -> T,
        G: Fn(T) -> T,
    {
        let mut x = x0;
        let epsilon = T::min_positive_value().sqrt();

        for _iteration in 0..self.config.max_iterations {
            let f_val = f(x);
            if f_val.abs() < self.config.tolerance {
                return Ok(x);
            }

            let f_prime_val = f_prime(x);
            if f_prime_val.abs() < epsilon {
                return Err(SolverError::DerivativeNearZero {
                    x: x.to_f64().unwrap_or(f64::NAN),
                });
            }

            x = x - f_val / f_prime_val;

            if !x.is_finite() {
                return Err(SolverError::NumericalInstability(
                    "Newton iteration produced non-finite value".to_string(),
                ));
            }
        }

        Err(SolverError::MaxIterationsExceeded {
            iterations: self.config.max_iterations,
        })
    }

    /// Find a root of `f` inside `[lo, hi]` with a Newton/bisection hybrid.
    ///
    /// The bracket is shrunk at every iteration using the sign of `f(x)`.
    /// A Newton step is accepted only if the derivative is usable and the
    /// new iterate stays strictly inside the bracket; otherwise the midpoint
    /// is taken. Convergence is therefore guaranteed for continuous `f` with
    /// a valid bracket, at worst at the bisection rate.
    ///
    /// # Arguments
    ///
    /// * `f` - Function to find root of
    /// * `f_prime` - Derivative of f
    /// * `lo`, `hi` - Bracket endpoints (`f(lo)` and `f(hi)` must differ in sign)
    /// * `x0` - Initial guess; the midpoint is used if it lies outside the bracket
    ///
    /// # Returns
    ///
    /// * `Ok(x)` - Root where `|f(x)| < tolerance` or the bracket width is below tolerance
    /// * `Err(SolverError::NoBracket)` - `f(lo)` and `f(hi)` have the same sign
    /// * `Err(SolverError::MaxIterationsExceeded)` - Iteration budget exhausted
    ///
    /// # Example
    ///
    /// ```
    /// use pricer_core::math::solvers::{NewtonRaphsonSolver, SolverConfig};
    ///
    /// let solver = NewtonRaphsonSolver::new(SolverConfig::default());
    ///
    /// // arctan has a tiny derivative far from 0: plain Newton diverges from x0 = 5
    /// let root = solver
    ///     .find_root_bracketed(|x: f64| x.atan(), |x: f64| 1.0 / (1.0 + x * x), -10.0, 10.0, 5.0)
    ///     .unwrap();
    /// assert!(root.abs() < 1e-10);
    /// ```
    pub fn find_root_bracketed<F, G>(
        &self,
        f: F,
        f_prime: G,
        lo: T,
        hi: T,
        x0: T,
    ) -> Result<T, SolverError>
    where
        F: Fn(T) -> T,
        G: Fn(T) -> T,
    {
        let (mut lo, mut hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        let mut f_lo = f(lo);
        let f_hi = f(hi);
        let tol = self.config.tolerance;

        if f_lo.abs() < tol {
            return Ok(lo);
        }
        if f_hi.abs() < tol {
            return Ok(hi);
        }
        if f_lo.signum() == f_hi.signum() {
            return Err(SolverError::NoBracket {
                a: lo.to_f64().unwrap_or(f64::NAN),
                b: hi.to_f64().unwrap_or(f64::NAN),
            });
        }

        let two = T::one() + T::one();
        let epsilon = T::min_positive_value().sqrt();
        let mut x = if x0 > lo && x0 < hi { x0 } else { (lo + hi) / two };

        for _iteration in 0..self.config.max_iterations {
            let f_val = f(x);
            if f_val.abs() < tol {
                return Ok(x);
            }

            // Shrink the bracket around the sign change
            if f_val.signum() == f_lo.signum() {
                lo = x;
                f_lo = f_val;
            } else {
                hi = x;
            }
            if hi - lo < tol {
                return Ok(x);
            }

            let f_prime_val = f_prime(x);
            let newton = x - f_val / f_prime_val;
            x = if f_prime_val.abs() > epsilon && newton.is_finite() && newton > lo && newton < hi
            {
                newton
            } else {
                (lo + hi) / two
            };
        }

        Err(SolverError::MaxIterationsExceeded {
            iterations: self.config.max_iterations,
        })
    }

    /// Returns a reference to the solver configuration.
    pub fn config(&self) -> &SolverConfig<T> {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================
    // Plain Newton Tests
    // ========================================

    #[test]
    fn test_find_sqrt_2() {
        let solver = NewtonRaphsonSolver::new(SolverConfig::default());
        let root = solver
            .find_root(|x: f64| x * x - 2.0, |x: f64| 2.0 * x, 1.0)
            .unwrap();
        assert!(
            (root - std::f64::consts::SQRT_2).abs() < 1e-10,
            "Expected √2 ≈ {}, got {}",
            std::f64::consts::SQRT_2,
            root
        );
    }

    #[test]
    fn test_zero_derivative_is_reported() {
        let solver = NewtonRaphsonSolver::new(SolverConfig::default());
        let result = solver.find_root(|x: f64| x * x + 1.0, |x: f64| 2.0 * x, 0.0);
        match result {
            Err(SolverError::DerivativeNearZero { x }) => assert_eq!(x, 0.0),
            other => panic!("Expected DerivativeNearZero, got {:?}", other),
        }
    }

    #[test]
    fn test_max_iterations_exceeded() {
        let solver = NewtonRaphsonSolver::new(SolverConfig::new(1e-300, 3));
        let result = solver.find_root(|x: f64| x * x - 2.0, |x: f64| 2.0 * x, 100.0);
        assert_eq!(
            result,
            Err(SolverError::MaxIterationsExceeded { iterations: 3 })
        );
    }

    // ========================================
    // Bracketed Newton Tests
    // ========================================

    #[test]
    fn test_bracketed_recovers_from_bad_guess() {
        let solver = NewtonRaphsonSolver::new(SolverConfig::default());
        let f = |x: f64| x.atan();
        let df = |x: f64| 1.0 / (1.0 + x * x);

        // Plain Newton overshoots and diverges from this guess
        assert!(solver.find_root(f, df, 5.0).is_err());

        let root = solver.find_root_bracketed(f, df, -10.0, 10.0, 5.0).unwrap();
        assert!(root.abs() < 1e-10);
    }

    #[test]
    fn test_bracketed_no_bracket() {
        let solver = NewtonRaphsonSolver::new(SolverConfig::default());
        let result =
            solver.find_root_bracketed(|x: f64| x * x + 1.0, |x: f64| 2.0 * x, -1.0, 1.0, 0.5);
        assert!(matches!(result, Err(SolverError::NoBracket { .. })));
    }

    #[test]
    fn test_bracketed_reversed_bounds_and_flat_derivative() {
        let solver = NewtonRaphsonSolver::new(SolverConfig::default());
        // Zero derivative everywhere forces pure bisection
        let root = solver
            .find_root_bracketed(|x: f64| x - 0.3, |_x: f64| 0.0, 1.0, 0.0, 0.9)
            .unwrap();
        assert!((root - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_bracketed_root_at_endpoint() {
        let solver = NewtonRaphsonSolver::new(SolverConfig::default());
        let root = solver
            .find_root_bracketed(|x: f64| x - 1.0, |_x: f64| 1.0, 0.0, 1.0, 0.5)
            .unwrap();
        assert!((root - 1.0).abs() < 1e-10);
    }
}
