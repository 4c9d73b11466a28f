//! Gauss-Legendre quadrature.
//!
//! Nodes and weights on [-1, 1] are computed once by Newton iteration on the
//! three-term Legendre recurrence; integration over [a, b] splits the range
//! into equal panels and maps the rule onto each one.

use crate::types::SolverError;
use std::f64::consts::PI;

const NODE_TOLERANCE: f64 = 3e-14;
const NODE_MAX_ITERATIONS: usize = 100;

/// An `n`-point Gauss-Legendre rule, exact for polynomials of degree `2n - 1`.
///
/// # Example
///
/// ```
/// use pricer_core::math::quadrature::GaussLegendre;
///
/// let rule = GaussLegendre::new(16).unwrap();
/// let integral = rule.integrate(|x: f64| x.sin(), 0.0, std::f64::consts::PI, 4);
/// assert!((integral - 2.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct GaussLegendre {
    nodes: Vec<f64>,
    weights: Vec<f64>,
}

impl GaussLegendre {
    /// Computes the `order`-point rule.
    ///
    /// # Errors
    ///
    /// - `SolverError::NumericalInstability` if `order == 0`
    /// - `SolverError::MaxIterationsExceeded` if a node fails to converge
    pub fn new(order: usize) -> Result<Self, SolverError> {
        if order == 0 {
            return Err(SolverError::NumericalInstability(
                "quadrature order must be at least 1".to_string(),
            ));
        }
        let n = order;
        let nf = n as f64;
        let mut nodes = vec![0.0; n];
        let mut weights = vec![0.0; n];

        // Roots are symmetric; solve for the positive half only
        for i in 0..n.div_ceil(2) {
            let mut z = (PI * (i as f64 + 0.75) / (nf + 0.5)).cos();
            let mut converged = false;
            let mut dp = 0.0;

            for _ in 0..NODE_MAX_ITERATIONS {
                let (p, p_prev) = legendre(n, z);
                dp = nf * (z * p - p_prev) / (z * z - 1.0);
                let z_prev = z;
                z = z_prev - p / dp;
                if (z - z_prev).abs() < NODE_TOLERANCE {
                    converged = true;
                    break;
                }
            }
            if !converged {
                return Err(SolverError::MaxIterationsExceeded {
                    iterations: NODE_MAX_ITERATIONS,
                });
            }

            let w = 2.0 / ((1.0 - z * z) * dp * dp);
            nodes[i] = -z;
            nodes[n - 1 - i] = z;
            weights[i] = w;
            weights[n - 1 - i] = w;
        }

        Ok(Self { nodes, weights })
    }

    /// Number of nodes.
    #[inline]
    pub fn order(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes on [-1, 1] in increasing order.
    #[inline]
    pub fn nodes(&self) -> &[f64] {
        &self.nodes
    }

    /// Weights matching [`nodes`](Self::nodes).
    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Integrates `f` over `[a, b]` split into `panels` equal sub-intervals.
    ///
    /// `panels == 0` is treated as a single panel.
    pub fn integrate<F>(&self, f: F, a: f64, b: f64, panels: usize) -> f64
    where
        F: Fn(f64) -> f64,
    {
        let panels = panels.max(1);
        let width = (b - a) / panels as f64;
        let half = 0.5 * width;

        (0..panels)
            .map(|k| {
                let mid = a + (k as f64 + 0.5) * width;
                let sum: f64 = self
                    .nodes
                    .iter()
                    .zip(self.weights.iter())
                    .map(|(&x, &w)| w * f(mid + half * x))
                    .sum();
                half * sum
            })
            .sum()
    }
}

/// Returns `(P_n(z), P_{n-1}(z))` by the Bonnet recurrence.
fn legendre(n: usize, z: f64) -> (f64, f64) {
    let mut p = 1.0;
    let mut p_prev = 0.0;
    for j in 1..=n {
        let jf = j as f64;
        let p_next = ((2.0 * jf - 1.0) * z * p - (jf - 1.0) * p_prev) / jf;
        p_prev = p;
        p = p_next;
    }
    (p, p_prev)
}
