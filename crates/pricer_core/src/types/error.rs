//! Error types for structured error handling.
//!
//! This module provides:
//! - `PricingError`: The error taxonomy shared by every engine, the hedging
//!   simulator and the risk metrics
//! - `InterpolationError`: Errors from interpolation operations
//! - `SolverError`: Errors from root-finding and linear solvers
//!
//! Lower-level errors convert into `PricingError` so that `?` propagates
//! across layers without losing the failure category.

use thiserror::Error;

/// Categorised pricing errors.
///
/// Every operation either fully succeeds or fails with one of these
/// categories; no partial results are returned.
///
/// # Variants
/// - `InvalidParameter`: Out-of-domain input (non-positive spot, strike,
///   maturity or volatility; arbitrage-violating rate/volatility combination)
/// - `NoConvergence`: A root-finder or iterative routine exhausted its budget,
///   or the target is unattainable
/// - `GridInstability`: Numerical blow-up in a discretised scheme
/// - `InvalidPath`: A price path inconsistent with the required step count
/// - `InsufficientSamples`: A statistic requested on too few observations
///
/// # Examples
/// ```
/// use pricer_core::types::PricingError;
///
/// let err = PricingError::InvalidParameter("spot must be positive".to_string());
/// assert_eq!(format!("{}", err), "Invalid parameter: spot must be positive");
///
/// let err = PricingError::InsufficientSamples { got: 1, need: 2 };
/// assert!(err.to_string().contains("got 1"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    /// Out-of-domain input parameters.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Solver budget exhausted or target outside the attainable range.
    #[error("No convergence: {0}")]
    NoConvergence(String),

    /// Non-finite or oscillating values in a finite-difference grid.
    #[error("Grid instability: {0}")]
    GridInstability(String),

    /// Path too short or containing unusable observations.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Too few observations for the requested statistic.
    #[error("Insufficient samples: got {got}, need at least {need}")]
    InsufficientSamples {
        /// Number of observations supplied
        got: usize,
        /// Minimum number of observations required
        need: usize,
    },
}

impl PricingError {
    /// Shorthand for an `InvalidParameter` error naming the offending field.
    ///
    /// # Examples
    /// ```
    /// use pricer_core::types::PricingError;
    ///
    /// let err = PricingError::invalid("strike", -1.0);
    /// assert_eq!(err.to_string(), "Invalid parameter: strike = -1 (must be positive and finite)");
    /// ```
    pub fn invalid(name: &str, value: f64) -> Self {
        PricingError::InvalidParameter(format!(
            "{} = {} (must be positive and finite)",
            name, value
        ))
    }
}

/// Interpolation-related errors.
///
/// # Variants
/// - `OutOfBounds`: Query point outside valid interpolation domain
/// - `InsufficientData`: Not enough data points for interpolation
/// - `InvalidInput`: General invalid input error
///
/// # Examples
/// ```
/// use pricer_core::types::InterpolationError;
///
/// let err = InterpolationError::OutOfBounds { x: 5.0, min: 0.0, max: 3.0 };
/// assert!(format!("{}", err).contains("outside valid domain"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InterpolationError {
    /// Query point outside valid interpolation domain.
    #[error("Query point {x} outside valid domain [{min}, {max}]")]
    OutOfBounds {
        /// The query point that was out of bounds
        x: f64,
        /// Minimum valid value
        min: f64,
        /// Maximum valid value
        max: f64,
    },

    /// Insufficient data points for interpolation.
    #[error("Insufficient data points: got {got}, need at least {need}")]
    InsufficientData {
        /// Number of points provided
        got: usize,
        /// Minimum number of points required
        need: usize,
    },

    /// Invalid input data or parameters.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Root-finding and linear solver errors.
///
/// # Variants
/// - `MaxIterationsExceeded`: Solver failed to converge within iteration limit
/// - `DerivativeNearZero`: Derivative too small for Newton-Raphson
/// - `NoBracket`: Function values at bracket endpoints have same sign
/// - `SingularMatrix`: Zero pivot in a tridiagonal elimination
/// - `NumericalInstability`: General numerical instability
///
/// # Examples
/// ```
/// use pricer_core::types::SolverError;
///
/// let err = SolverError::MaxIterationsExceeded { iterations: 100 };
/// assert!(format!("{}", err).contains("100 iterations"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// Solver failed to converge within maximum iterations.
    #[error("Failed to converge after {iterations} iterations")]
    MaxIterationsExceeded {
        /// Number of iterations attempted
        iterations: usize,
    },

    /// Derivative near zero (division by zero risk in Newton-Raphson).
    #[error("Derivative near zero at x = {x}")]
    DerivativeNearZero {
        /// The x value where derivative was near zero
        x: f64,
    },

    /// No valid bracket (function values at endpoints have same sign).
    #[error("No bracket: f({a}) and f({b}) have same sign")]
    NoBracket {
        /// Left bracket endpoint
        a: f64,
        /// Right bracket endpoint
        b: f64,
    },

    /// Zero pivot encountered while eliminating a tridiagonal system.
    #[error("Singular matrix: zero pivot at row {row}")]
    SingularMatrix {
        /// Row at which the pivot vanished
        row: usize,
    },

    /// Numerical instability detected.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),
}

impl From<SolverError> for PricingError {
    fn from(err: SolverError) -> Self {
        match err {
            SolverError::SingularMatrix { .. } | SolverError::NumericalInstability(_) => {
                PricingError::GridInstability(err.to_string())
            }
            other => PricingError::NoConvergence(other.to_string()),
        }
    }
}

impl From<InterpolationError> for PricingError {
    fn from(err: InterpolationError) -> Self {
        match err {
            InterpolationError::InsufficientData { got, need } => {
                PricingError::InsufficientSamples { got, need }
            }
            other => PricingError::InvalidParameter(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================
    // Display Tests
    // ========================================

    #[test]
    fn test_pricing_error_display() {
        assert_eq!(
            PricingError::NoConvergence("price above spot".to_string()).to_string(),
            "No convergence: price above spot"
        );
        assert_eq!(
            PricingError::GridInstability("NaN at node 12".to_string()).to_string(),
            "Grid instability: NaN at node 12"
        );
        assert_eq!(
            PricingError::InvalidPath("expected 253 observations, got 10".to_string())
                .to_string(),
            "Invalid path: expected 253 observations, got 10"
        );
    }

    #[test]
    fn test_invalid_helper_names_field() {
        let err = PricingError::invalid("volatility", 0.0);
        assert!(err.to_string().contains("volatility = 0"));
    }

    #[test]
    fn test_solver_error_display() {
        let err = SolverError::NoBracket { a: 1.0, b: 2.0 };
        assert!(err.to_string().contains("same sign"));

        let err = SolverError::SingularMatrix { row: 3 };
        assert_eq!(err.to_string(), "Singular matrix: zero pivot at row 3");
    }

    // ========================================
    // Conversion Tests
    // ========================================

    #[test]
    fn test_solver_error_maps_to_no_convergence() {
        let err: PricingError = SolverError::MaxIterationsExceeded { iterations: 100 }.into();
        assert!(matches!(err, PricingError::NoConvergence(_)));
    }

    #[test]
    fn test_singular_matrix_maps_to_grid_instability() {
        let err: PricingError = SolverError::SingularMatrix { row: 0 }.into();
        assert!(matches!(err, PricingError::GridInstability(_)));
    }

    #[test]
    fn test_insufficient_data_maps_to_insufficient_samples() {
        let err: PricingError = InterpolationError::InsufficientData { got: 1, need: 2 }.into();
        assert_eq!(err, PricingError::InsufficientSamples { got: 1, need: 2 });
    }
}
