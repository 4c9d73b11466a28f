//! Tridiagonal linear systems (Thomas algorithm).
//!
//! Finite-difference schemes produce one tridiagonal system per time step.
//! [`TridiagonalSystem`] owns the three bands plus scratch space so that a
//! solve allocates nothing after construction.

use crate::types::SolverError;

/// Pivots with magnitude at or below this value are treated as zero.
pub const PIVOT_EPSILON: f64 = 1e-14;

/// Band storage for an `n x n` tridiagonal matrix.
///
/// Row `i` reads `lower[i] * x[i-1] + diag[i] * x[i] + upper[i] * x[i+1]`;
/// `lower[0]` and `upper[n-1]` are ignored.
///
/// # Example
///
/// ```
/// use pricer_core::math::tridiagonal::TridiagonalSystem;
///
/// // [2 1 0; 1 2 1; 0 1 2] x = [4, 8, 8]  =>  x = [1, 2, 3]
/// let mut system = TridiagonalSystem::new(vec![0.0, 1.0, 1.0], vec![2.0; 3], vec![1.0, 1.0, 0.0]).unwrap();
/// let mut x = vec![0.0; 3];
/// system.solve(&[4.0, 8.0, 8.0], &mut x).unwrap();
/// assert!((x[0] - 1.0).abs() < 1e-12);
/// assert!((x[2] - 3.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct TridiagonalSystem {
    lower: Vec<f64>,
    diag: Vec<f64>,
    upper: Vec<f64>,
    c_star: Vec<f64>,
    d_star: Vec<f64>,
}

impl TridiagonalSystem {
    /// Builds a system from its three bands.
    ///
    /// # Errors
    ///
    /// `SolverError::NumericalInstability` if the bands are empty or differ in length.
    pub fn new(lower: Vec<f64>, diag: Vec<f64>, upper: Vec<f64>) -> Result<Self, SolverError> {
        let n = diag.len();
        if n == 0 || lower.len() != n || upper.len() != n {
            return Err(SolverError::NumericalInstability(format!(
                "band lengths must match and be non-zero: lower {}, diag {}, upper {}",
                lower.len(),
                n,
                upper.len()
            )));
        }
        Ok(Self {
            lower,
            diag,
            upper,
            c_star: vec![0.0; n],
            d_star: vec![0.0; n],
        })
    }

    /// System dimension.
    #[inline]
    pub fn len(&self) -> usize {
        self.diag.len()
    }

    /// Always `false` for a constructed system.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.diag.is_empty()
    }

    /// Multiplies the matrix by `x` into `out`.
    ///
    /// Used by Crank-Nicolson to form the explicit half of the step.
    pub fn multiply(&self, x: &[f64], out: &mut [f64]) {
        let n = self.len();
        for i in 0..n {
            let mut acc = self.diag[i] * x[i];
            if i > 0 {
                acc += self.lower[i] * x[i - 1];
            }
            if i + 1 < n {
                acc += self.upper[i] * x[i + 1];
            }
            out[i] = acc;
        }
    }

    /// Solves `A x = rhs` by forward elimination and back substitution.
    ///
    /// # Errors
    ///
    /// `SolverError::SingularMatrix` when a pivot vanishes, and
    /// `SolverError::NumericalInstability` on mismatched slice lengths.
    pub fn solve(&mut self, rhs: &[f64], x: &mut [f64]) -> Result<(), SolverError> {
        let n = self.len();
        if rhs.len() != n || x.len() != n {
            return Err(SolverError::NumericalInstability(format!(
                "expected vectors of length {}, got rhs {} and x {}",
                n,
                rhs.len(),
                x.len()
            )));
        }

        if self.diag[0].abs() <= PIVOT_EPSILON {
            return Err(SolverError::SingularMatrix { row: 0 });
        }
        self.c_star[0] = if n > 1 { self.upper[0] / self.diag[0] } else { 0.0 };
        self.d_star[0] = rhs[0] / self.diag[0];

        for i in 1..n {
            let denom = self.diag[i] - self.lower[i] * self.c_star[i - 1];
            if denom.abs() <= PIVOT_EPSILON {
                return Err(SolverError::SingularMatrix { row: i });
            }
            self.c_star[i] = if i + 1 < n { self.upper[i] / denom } else { 0.0 };
            self.d_star[i] = (rhs[i] - self.lower[i] * self.d_star[i - 1]) / denom;
        }

        x[n - 1] = self.d_star[n - 1];
        for i in (0..n - 1).rev() {
            x[i] = self.d_star[i] - self.c_star[i] * x[i + 1];
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_solve_matches_known_solution() {
        let lower = vec![0.0, -1.0, -1.0, -1.0];
        let upper = vec![-1.0, -1.0, -1.0, 0.0];
        let mut system = TridiagonalSystem::new(lower, vec![4.0; 4], upper).unwrap();
        let expected = [1.0, 2.0, 3.0, 4.0];
        let mut rhs = [0.0; 4];
        system.multiply(&expected, &mut rhs);

        let mut x = [0.0; 4];
        system.solve(&rhs, &mut x).unwrap();
        for (xi, ei) in x.iter().zip(expected.iter()) {
            assert_relative_eq!(*xi, *ei, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_single_row() {
        let mut system = TridiagonalSystem::new(vec![0.0], vec![2.0], vec![0.0]).unwrap();
        let mut x = [0.0];
        system.solve(&[3.0], &mut x).unwrap();
        assert_relative_eq!(x[0], 1.5);
    }

    #[test]
    fn test_zero_pivot_is_singular() {
        let mut system =
            TridiagonalSystem::new(vec![0.0, 1.0], vec![1.0, 1.0], vec![1.0, 0.0]).unwrap();
        let mut x = [0.0; 2];
        assert_eq!(
            system.solve(&[1.0, 1.0], &mut x),
            Err(SolverError::SingularMatrix { row: 1 })
        );
    }

    #[test]
    fn test_mismatched_bands_rejected() {
        assert!(TridiagonalSystem::new(vec![0.0], vec![1.0, 1.0], vec![0.0, 0.0]).is_err());
        assert!(TridiagonalSystem::new(vec![], vec![], vec![]).is_err());
    }
}
