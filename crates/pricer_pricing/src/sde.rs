//! Discretisation study for the GBM SDE.
//!
//! Euler-Maruyama and the exact log scheme are driven by the same Brownian
//! increments, so the gap between their terminal values isolates the
//! discretisation error (strong error) from sampling noise.

use pricer_core::types::PricingError;

use crate::mc::GbmParams;
use crate::rng::PricerRng;

/// One Euler-Maruyama step of `dS = μ·S·dt + σ·S·dW`.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::sde::euler_step;
///
/// assert!((euler_step(100.0, 0.05, 0.2, 0.1, 0.0) - 100.5).abs() < 1e-12);
/// ```
#[inline]
pub fn euler_step(s: f64, drift: f64, volatility: f64, dt: f64, dw: f64) -> f64 {
    s + drift * s * dt + volatility * s * dw
}

/// Error statistics of Euler-Maruyama at one step count.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiscretisationErrorRow {
    /// Number of time steps.
    pub n_steps: usize,
    /// Mean of |S_T(Euler) - S_T(exact)| over paths.
    pub strong_error: f64,
    /// Sample mean of the Euler terminal values.
    pub euler_mean: f64,
    /// Sample mean of the exact terminal values.
    pub exact_mean: f64,
    /// E[S_T] = S₀·e^{(r-q)T}.
    pub theoretical_mean: f64,
}

impl DiscretisationErrorRow {
    /// |E_hat[S_T(Euler)] - E[S_T]|.
    #[inline]
    pub fn weak_error(&self) -> f64 {
        (self.euler_mean - self.theoretical_mean).abs()
    }
}

/// Compares Euler-Maruyama with the exact scheme for each step count.
///
/// Every step count uses the same seed, so rows differ only by the time
/// grid.
///
/// # Errors
/// `InvalidParameter` for invalid dynamics, an empty step list, a zero step
/// count, or fewer than one path.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::GbmParams;
/// use pricer_pricing::sde::discretisation_error;
///
/// let rows = discretisation_error(&GbmParams::default(), &[4, 64], 2_000, 42).unwrap();
/// assert!(rows[1].strong_error < rows[0].strong_error);
/// ```
pub fn discretisation_error(
    params: &GbmParams,
    step_counts: &[usize],
    n_paths: usize,
    seed: u64,
) -> Result<Vec<DiscretisationErrorRow>, PricingError> {
    params.validate()?;
    if step_counts.is_empty() || step_counts.contains(&0) || n_paths == 0 {
        return Err(PricingError::InvalidParameter(format!(
            "need positive step counts and paths: steps = {:?}, n_paths = {}",
            step_counts, n_paths
        )));
    }

    let mu = params.drift();
    let sigma = params.volatility;
    let theoretical_mean = params.expected_terminal();

    let rows = step_counts
        .iter()
        .map(|&n_steps| {
            let dt = params.maturity / n_steps as f64;
            let sqrt_dt = dt.sqrt();
            let log_drift = (mu - 0.5 * sigma * sigma) * dt;
            let mut rng = PricerRng::from_seed(seed);

            let (mut abs_gap, mut euler_sum, mut exact_sum) = (0.0, 0.0, 0.0);
            for _ in 0..n_paths {
                let mut euler = params.spot;
                let mut log_exact = params.spot.ln();
                for _ in 0..n_steps {
                    let dw = sqrt_dt * rng.gen_normal();
                    euler = euler_step(euler, mu, sigma, dt, dw);
                    log_exact += log_drift + sigma * dw;
                }
                let exact = log_exact.exp();
                abs_gap += (euler - exact).abs();
                euler_sum += euler;
                exact_sum += exact;
            }

            let n = n_paths as f64;
            DiscretisationErrorRow {
                n_steps,
                strong_error: abs_gap / n,
                euler_mean: euler_sum / n,
                exact_mean: exact_sum / n,
                theoretical_mean,
            }
        })
        .collect();

    Ok(rows)
}
