//! Piecewise linear interpolation.

use super::Interpolator;
use crate::types::InterpolationError;
use num_traits::Float;

/// Piecewise linear interpolator over strictly increasing knots.
///
/// Used to read prices off a finite-difference grid and to interpolate
/// smiles between quoted strikes. Besides the value it exposes the segment
/// slope, which is the grid delta when the knots are price nodes.
///
/// # Example
///
/// ```
/// use pricer_core::math::interpolators::{Interpolator, LinearInterpolator};
///
/// let interp = LinearInterpolator::new(&[0.0_f64, 1.0, 2.0], &[0.0, 2.0, 3.0]).unwrap();
/// assert!((interp.interpolate(0.5).unwrap() - 1.0).abs() < 1e-12);
/// assert!((interp.slope(1.5).unwrap() - 1.0).abs() < 1e-12);
/// assert_eq!(interp.domain(), (0.0, 2.0));
/// ```
#[derive(Debug, Clone)]
pub struct LinearInterpolator<T: Float> {
    xs: Vec<T>,
    ys: Vec<T>,
}

impl<T: Float> LinearInterpolator<T> {
    /// Builds an interpolator, sorting the knots by x.
    ///
    /// # Errors
    ///
    /// * `InterpolationError::InvalidInput` - Mismatched lengths, non-finite
    ///   or repeated x values
    /// * `InterpolationError::InsufficientData` - Fewer than 2 knots
    pub fn new(xs: &[T], ys: &[T]) -> Result<Self, InterpolationError> {
        if xs.len() != ys.len() {
            return Err(InterpolationError::InvalidInput(format!(
                "xs and ys must have same length: got {} and {}",
                xs.len(),
                ys.len()
            )));
        }
        if xs.len() < 2 {
            return Err(InterpolationError::InsufficientData {
                got: xs.len(),
                need: 2,
            });
        }
        if xs.iter().chain(ys.iter()).any(|v| !v.is_finite()) {
            return Err(InterpolationError::InvalidInput(
                "knots must be finite".to_string(),
            ));
        }

        let mut pairs: Vec<(T, T)> = xs.iter().copied().zip(ys.iter().copied()).collect();
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        if pairs.windows(2).any(|w| w[1].0 <= w[0].0) {
            return Err(InterpolationError::InvalidInput(
                "x values must be distinct".to_string(),
            ));
        }

        let (xs, ys) = pairs.into_iter().unzip();
        Ok(Self { xs, ys })
    }

    /// Sorted x-coordinates.
    #[inline]
    pub fn xs(&self) -> &[T] {
        &self.xs
    }

    /// y-values in sorted x order.
    #[inline]
    pub fn ys(&self) -> &[T] {
        &self.ys
    }

    /// Number of knots.
    #[inline]
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    /// Always `false` for a constructed interpolator.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Index `i` with `xs[i] <= x < xs[i+1]`, clamped to `[0, n-2]`.
    #[inline]
    fn segment(&self, x: T) -> usize {
        let pos = self.xs.partition_point(|&xi| xi <= x);
        pos.saturating_sub(1).min(self.xs.len() - 2)
    }

    fn check_bounds(&self, x: T) -> Result<(), InterpolationError> {
        let (lo, hi) = self.domain();
        if x < lo || x > hi || !x.is_finite() {
            return Err(InterpolationError::OutOfBounds {
                x: x.to_f64().unwrap_or(f64::NAN),
                min: lo.to_f64().unwrap_or(f64::NAN),
                max: hi.to_f64().unwrap_or(f64::NAN),
            });
        }
        Ok(())
    }

    /// Slope of the segment containing `x`.
    ///
    /// # Errors
    ///
    /// `InterpolationError::OutOfBounds` if `x` lies outside the knots.
    pub fn slope(&self, x: T) -> Result<T, InterpolationError> {
        self.check_bounds(x)?;
        let i = self.segment(x);
        Ok((self.ys[i + 1] - self.ys[i]) / (self.xs[i + 1] - self.xs[i]))
    }
}

impl<T: Float> Interpolator<T> for LinearInterpolator<T> {
    fn interpolate(&self, x: T) -> Result<T, InterpolationError> {
        self.check_bounds(x)?;
        let i = self.segment(x);
        let t = (x - self.xs[i]) / (self.xs[i + 1] - self.xs[i]);
        Ok(self.ys[i] + (self.ys[i + 1] - self.ys[i]) * t)
    }

    #[inline]
    fn domain(&self) -> (T, T) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }
}
