//! Standard normal distribution functions.
//!
//! This module provides:
//! - `norm_cdf`: Cumulative distribution function (CDF)
//! - `norm_pdf`: Probability density function (PDF)
//! - `norm_inv`: Quantile function (inverse CDF), used for confidence levels
//!
//! `norm_cdf` and `norm_pdf` are generic over `T: Float`.

use num_traits::Float;

/// Square root of 2.
const SQRT_2: f64 = std::f64::consts::SQRT_2;

/// 1 / sqrt(2 * pi)
const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// Complementary error function, Abramowitz and Stegun 7.1.26.
///
/// Maximum absolute error 1.5e-7. The negative half is obtained from
/// `erfc(-x) = 2 - erfc(x)`, so `Φ(x) + Φ(-x) = 1` holds to rounding and
/// put-call parity of the closed-form prices is exact.
#[inline]
fn erfc_approx<T: Float>(x: T) -> T {
    let one = T::one();
    let abs_x = x.abs();

    let a1 = T::from(0.254829592).unwrap_or_else(T::zero);
    let a2 = T::from(-0.284496736).unwrap_or_else(T::zero);
    let a3 = T::from(1.421413741).unwrap_or_else(T::zero);
    let a4 = T::from(-1.453152027).unwrap_or_else(T::zero);
    let a5 = T::from(1.061405429).unwrap_or_else(T::zero);
    let p = T::from(0.3275911).unwrap_or_else(T::zero);

    let t = one / (one + p * abs_x);
    let poly = a1 + t * (a2 + t * (a3 + t * (a4 + t * a5)));
    let erfc_abs = t * poly * (-abs_x * abs_x).exp();

    if x < T::zero() {
        one + one - erfc_abs
    } else {
        erfc_abs
    }
}

/// Standard normal cumulative distribution function.
///
/// Φ(x) = (1/2) * erfc(-x / sqrt(2)), accurate to about 1e-7.
///
/// # Examples
/// ```
/// use pricer_models::analytical::distributions::norm_cdf;
///
/// assert!((norm_cdf(0.0_f64) - 0.5).abs() < 1e-7);
/// assert!(norm_cdf(-3.0_f64) < 0.01);
/// assert!(norm_cdf(3.0_f64) > 0.99);
/// ```
#[inline]
pub fn norm_cdf<T: Float>(x: T) -> T {
    let sqrt_2 = T::from(SQRT_2).unwrap_or_else(T::one);
    let half = T::from(0.5).unwrap_or_else(T::zero);
    half * erfc_approx(-x / sqrt_2)
}

/// Standard normal probability density function.
///
/// φ(x) = (1 / sqrt(2π)) * exp(-x² / 2)
///
/// # Examples
/// ```
/// use pricer_models::analytical::distributions::norm_pdf;
///
/// assert!((norm_pdf(0.0_f64) - 0.3989422804).abs() < 1e-7);
/// assert!((norm_pdf(1.0_f64) - 0.2419707245).abs() < 1e-7);
/// ```
#[inline]
pub fn norm_pdf<T: Float>(x: T) -> T {
    let frac_1_sqrt_2pi = T::from(FRAC_1_SQRT_2PI).unwrap_or_else(T::zero);
    let half = T::from(0.5).unwrap_or_else(T::zero);
    frac_1_sqrt_2pi * (-half * x * x).exp()
}

// Acklam's rational approximation coefficients
const INV_A: [f64; 6] = [
    -3.969_683_028_665_376e1,
    2.209_460_984_245_205e2,
    -2.759_285_104_469_687e2,
    1.383_577_518_672_69e2,
    -3.066_479_806_614_716e1,
    2.506_628_277_459_239,
];
const INV_B: [f64; 5] = [
    -5.447_609_879_822_406e1,
    1.615_858_368_580_409e2,
    -1.556_989_798_598_866e2,
    6.680_131_188_771_972e1,
    -1.328_068_155_288_572e1,
];
const INV_C: [f64; 6] = [
    -7.784_894_002_430_293e-3,
    -3.223_964_580_411_365e-1,
    -2.400_758_277_161_838,
    -2.549_732_539_343_734,
    4.374_664_141_464_968,
    2.938_163_982_698_783,
];
const INV_D: [f64; 4] = [
    7.784_695_709_041_462e-3,
    3.224_671_290_700_398e-1,
    2.445_134_137_142_996,
    3.754_408_661_907_416,
];
const INV_P_LOW: f64 = 0.02425;

/// Standard normal quantile function Φ⁻¹(p).
///
/// Acklam's rational approximation, relative error below 1.2e-9 on (0, 1).
/// Returns `-inf`/`+inf` at 0 and 1, and NaN outside [0, 1].
///
/// # Examples
/// ```
/// use pricer_models::analytical::distributions::norm_inv;
///
/// assert!((norm_inv(0.975) - 1.959963984540054).abs() < 1e-8);
/// assert_eq!(norm_inv(0.5), 0.0);
/// ```
pub fn norm_inv(p: f64) -> f64 {
    if !(0.0..=1.0).contains(&p) || p.is_nan() {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }
    if p == 0.5 {
        return 0.0;
    }

    let tail = |q: f64| {
        let (c, d) = (INV_C, INV_D);
        (((((c[0] * q + c[1]) * q + c[2]) * q + c[3]) * q + c[4]) * q + c[5])
            / ((((d[0] * q + d[1]) * q + d[2]) * q + d[3]) * q + 1.0)
    };

    if p < INV_P_LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p > 1.0 - INV_P_LOW {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    } else {
        let (a, b) = (INV_A, INV_B);
        let q = p - 0.5;
        let r = q * q;
        (((((a[0] * r + a[1]) * r + a[2]) * r + a[3]) * r + a[4]) * r + a[5]) * q
            / (((((b[0] * r + b[1]) * r + b[2]) * r + b[3]) * r + b[4]) * r + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // ==========================================================
    // norm_cdf tests
    // ==========================================================

    #[test]
    fn test_norm_cdf_symmetry_is_exact() {
        for x in [-3.0, -2.0, -1.0, -0.5, 0.5, 1.0, 2.0, 3.0_f64] {
            assert_relative_eq!(norm_cdf(x) + norm_cdf(-x), 1.0, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_norm_cdf_reference_values() {
        assert_relative_eq!(norm_cdf(1.0_f64), 0.8413447460685429, epsilon = 1e-7);
        assert_relative_eq!(norm_cdf(-1.0_f64), 0.15865525393145707, epsilon = 1e-7);
        assert_relative_eq!(norm_cdf(2.0_f64), 0.9772498680518208, epsilon = 1e-7);
        assert_relative_eq!(norm_cdf(-2.0_f64), 0.022750131948179195, epsilon = 1e-7);
    }

    #[test]
    fn test_norm_cdf_bounded_for_extreme_values() {
        assert!(norm_cdf(40.0_f64) <= 1.0);
        assert!(norm_cdf(-40.0_f64) >= 0.0);
    }

    // ==========================================================
    // norm_pdf tests
    // ==========================================================

    #[test]
    fn test_norm_pdf_is_even() {
        for x in [0.3, 1.7, 4.0_f64] {
            assert_eq!(norm_pdf(x), norm_pdf(-x));
        }
    }

    // ==========================================================
    // norm_inv tests
    // ==========================================================

    #[test]
    fn test_norm_inv_reference_values() {
        assert_relative_eq!(norm_inv(0.975), 1.959963984540054, epsilon = 1e-8);
        assert_relative_eq!(norm_inv(0.995), 2.5758293035489004, epsilon = 1e-8);
        assert_relative_eq!(norm_inv(0.01), -2.3263478740408408, epsilon = 1e-8);
    }

    #[test]
    fn test_norm_inv_inverts_cdf() {
        for p in [0.001, 0.02, 0.2, 0.5, 0.7, 0.99] {
            assert_relative_eq!(norm_cdf(norm_inv(p)), p, epsilon = 2e-7);
        }
    }

    #[test]
    fn test_norm_inv_edges() {
        assert_eq!(norm_inv(0.0), f64::NEG_INFINITY);
        assert_eq!(norm_inv(1.0), f64::INFINITY);
        assert!(norm_inv(1.5).is_nan());
    }
}
