//! Value surface produced by one finite-difference solve.

use pricer_core::math::interpolators::{Interpolator, LinearInterpolator};
use pricer_core::types::PricingError;

/// Option values on a uniform `[0, S_max] x [0, T]` mesh.
///
/// Row `n` holds the values at calendar time `t_n = n·dt` (row 0 is the
/// valuation date, row `time_steps` the payoff); column `i` is the price
/// node `S_i = i·dS`. Owned by a single solve.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceGrid {
    s_max: f64,
    maturity: f64,
    price_steps: usize,
    time_steps: usize,
    values: Vec<f64>,
}

/// Price and sensitivities interpolated from the t = 0 row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridReading {
    /// Option value at the requested spot.
    pub price: f64,
    /// ∂V/∂S from central differences.
    pub delta: f64,
    /// ∂²V/∂S² from central differences.
    pub gamma: f64,
}

impl PriceGrid {
    /// Zero-filled grid with `price_steps + 1` nodes and `time_steps + 1` rows.
    pub fn new(price_steps: usize, time_steps: usize, s_max: f64, maturity: f64) -> Self {
        Self {
            s_max,
            maturity,
            price_steps,
            time_steps,
            values: vec![0.0; (price_steps + 1) * (time_steps + 1)],
        }
    }

    /// Number of price intervals (M).
    #[inline]
    pub fn price_steps(&self) -> usize {
        self.price_steps
    }

    /// Number of time intervals (N).
    #[inline]
    pub fn time_steps(&self) -> usize {
        self.time_steps
    }

    /// Upper price boundary.
    #[inline]
    pub fn s_max(&self) -> f64 {
        self.s_max
    }

    /// Price spacing.
    #[inline]
    pub fn ds(&self) -> f64 {
        self.s_max / self.price_steps as f64
    }

    /// Time spacing.
    #[inline]
    pub fn dt(&self) -> f64 {
        self.maturity / self.time_steps as f64
    }

    /// Price nodes `S_0 = 0, ..., S_M = S_max`.
    pub fn spot_nodes(&self) -> Vec<f64> {
        let ds = self.ds();
        (0..=self.price_steps).map(|i| i as f64 * ds).collect()
    }

    /// Values at time row `n`.
    #[inline]
    pub fn row(&self, n: usize) -> &[f64] {
        let width = self.price_steps + 1;
        &self.values[n * width..(n + 1) * width]
    }

    /// Mutable values at time row `n`.
    #[inline]
    pub fn row_mut(&mut self, n: usize) -> &mut [f64] {
        let width = self.price_steps + 1;
        &mut self.values[n * width..(n + 1) * width]
    }

    /// Value at (time row, price node).
    #[inline]
    pub fn value(&self, n: usize, i: usize) -> f64 {
        self.values[n * (self.price_steps + 1) + i]
    }

    /// Interpolates price, delta and gamma at `spot` from the t = 0 row.
    ///
    /// Node sensitivities are central differences (one-sided at the
    /// boundaries) and are interpolated linearly between the two nodes
    /// bracketing `spot`.
    ///
    /// # Errors
    /// `InvalidParameter` if `spot` lies outside `[0, S_max]`.
    pub fn read_at(&self, spot: f64) -> Result<GridReading, PricingError> {
        let nodes = self.spot_nodes();
        let v = self.row(0);
        let m = self.price_steps;
        let ds = self.ds();

        let mut delta = vec![0.0; m + 1];
        let mut gamma = vec![0.0; m + 1];
        for i in 1..m {
            delta[i] = (v[i + 1] - v[i - 1]) / (2.0 * ds);
            gamma[i] = (v[i + 1] - 2.0 * v[i] + v[i - 1]) / (ds * ds);
        }
        delta[0] = (v[1] - v[0]) / ds;
        delta[m] = (v[m] - v[m - 1]) / ds;
        gamma[0] = gamma[1];
        gamma[m] = gamma[m - 1];

        let price = LinearInterpolator::new(&nodes, v)?.interpolate(spot)?;
        let delta = LinearInterpolator::new(&nodes, &delta)?.interpolate(spot)?;
        let gamma = LinearInterpolator::new(&nodes, &gamma)?.interpolate(spot)?;
        Ok(GridReading { price, delta, gamma })
    }
}
