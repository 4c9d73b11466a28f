//! Discounted-payoff estimator shared by the Monte Carlo engines.
//!
//! Samples are generated in fixed-size chunks; chunk `c` draws from its own
//! [`PricerRng`] seeded with [`stream_seed`]`(seed, c)`. Chunks run on the
//! rayon pool and their moment sums are reduced in chunk order, so the
//! estimate is bit-identical for any number of worker threads.

use pricer_core::types::{ConfidenceInterval, OptionSpec, PricingError};
use pricer_models::analytical::norm_inv;
use rayon::prelude::*;

use super::config::MonteCarloConfig;
use crate::rng::{stream_seed, PricerRng};

/// Maps a vector of standard normals to a terminal underlying value.
pub(crate) trait TerminalSampler: Sync {
    /// Normals consumed per path.
    fn normals_per_path(&self) -> usize;

    /// Terminal value driven by `normals`.
    fn terminal(&self, normals: &[f64]) -> f64;
}

/// Point estimate and sampling error of one Monte Carlo run.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonteCarloEstimate {
    /// Discounted sample mean of the payoff.
    pub price: f64,
    /// Standard error of `price`.
    pub std_error: f64,
    /// Independent samples (antithetic pairs count once).
    pub n_samples: usize,
    /// Control-variate coefficient, when the control was applied.
    pub control_beta: Option<f64>,
    /// `price ± z·std_error` at the configured level.
    pub confidence_interval: ConfidenceInterval,
}

/// Two-sided normal quantile for a confidence level, e.g. 0.95 -> 1.95996.
#[inline]
pub fn z_score(confidence_level: f64) -> f64 {
    norm_inv(0.5 + 0.5 * confidence_level)
}

/// Running means and centred second moments (Welford), mergeable with
/// Chan's pairwise update.
#[derive(Clone, Copy, Debug, Default)]
struct Moments {
    n: usize,
    mean_y: f64,
    mean_x: f64,
    m2_y: f64,
    m2_x: f64,
    c_xy: f64,
}

impl Moments {
    #[inline]
    fn push(&mut self, y: f64, x: f64) {
        self.n += 1;
        let n = self.n as f64;
        let dx = x - self.mean_x;
        let dy = y - self.mean_y;
        self.mean_x += dx / n;
        self.mean_y += dy / n;
        self.m2_x += dx * (x - self.mean_x);
        self.m2_y += dy * (y - self.mean_y);
        self.c_xy += dx * (y - self.mean_y);
    }

    fn merge(self, other: Self) -> Self {
        if self.n == 0 {
            return other;
        }
        if other.n == 0 {
            return self;
        }
        let (na, nb) = (self.n as f64, other.n as f64);
        let n = na + nb;
        let dx = other.mean_x - self.mean_x;
        let dy = other.mean_y - self.mean_y;
        let w = na * nb / n;
        Self {
            n: self.n + other.n,
            mean_y: self.mean_y + dy * nb / n,
            mean_x: self.mean_x + dx * nb / n,
            m2_y: self.m2_y + other.m2_y + dy * dy * w,
            m2_x: self.m2_x + other.m2_x + dx * dx * w,
            c_xy: self.c_xy + other.c_xy + dx * dy * w,
        }
    }
}

/// Runs `sampler` under `config` and estimates E[e^{-rT}·payoff(S_T)].
///
/// The control variate is `X = e^{-rT}·S_T`, whose mean `control_mean`
/// must be known exactly (`S·e^{-qT}` for any martingale scheme).
pub(crate) fn estimate<S: TerminalSampler>(
    sampler: &S,
    spec: &OptionSpec,
    control_mean: f64,
    config: &MonteCarloConfig,
) -> Result<MonteCarloEstimate, PricingError> {
    let n_samples = config.n_samples();
    if n_samples < 2 {
        return Err(PricingError::InsufficientSamples {
            got: n_samples,
            need: 2,
        });
    }

    let discount = spec.discount_factor();
    let chunk_size = config.chunk_size();
    let n_chunks = n_samples.div_ceil(chunk_size);
    let antithetic = config.antithetic();
    let width = sampler.normals_per_path();

    let partials: Vec<Moments> = (0..n_chunks)
        .into_par_iter()
        .map(|chunk| {
            let len = chunk_size.min(n_samples - chunk * chunk_size);
            let mut rng = PricerRng::from_seed(stream_seed(config.seed(), chunk as u64));
            let mut normals = vec![0.0; width];
            let mut mirrored = vec![0.0; width];
            let mut moments = Moments::default();

            for _ in 0..len {
                rng.fill_normal(&mut normals);
                let s = sampler.terminal(&normals);
                let (y, x) = if antithetic {
                    for (m, z) in mirrored.iter_mut().zip(&normals) {
                        *m = -z;
                    }
                    let s_bar = sampler.terminal(&mirrored);
                    (
                        0.5 * (spec.payoff(s) + spec.payoff(s_bar)),
                        0.5 * (s + s_bar),
                    )
                } else {
                    (spec.payoff(s), s)
                };
                moments.push(discount * y, discount * x);
            }
            moments
        })
        .collect();

    let m = partials
        .into_iter()
        .fold(Moments::default(), Moments::merge);

    let n = m.n as f64;
    let var_y = m.m2_y / (n - 1.0);

    let (price, variance, control_beta) = if config.control_variate() {
        let var_x = m.m2_x / (n - 1.0);
        let cov = m.c_xy / (n - 1.0);
        let beta = if var_x > 0.0 { cov / var_x } else { 0.0 };
        (
            m.mean_y - beta * (m.mean_x - control_mean),
            var_y - 2.0 * beta * cov + beta * beta * var_x,
            Some(beta),
        )
    } else {
        (m.mean_y, var_y, None)
    };

    let std_error = (variance.max(0.0) / n).sqrt();
    if !price.is_finite() || !std_error.is_finite() {
        return Err(PricingError::NoConvergence(format!(
            "non-finite Monte Carlo estimate: price = {}, std_error = {}",
            price, std_error
        )));
    }

    let level = config.confidence_level();
    Ok(MonteCarloEstimate {
        price,
        std_error,
        n_samples: m.n,
        control_beta,
        confidence_interval: ConfidenceInterval::symmetric(price, std_error, z_score(level), level),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// S_T = S·(1 + σ·z): mean S, payoff variance known in closed form.
    struct Linear {
        spot: f64,
        sigma: f64,
    }

    impl TerminalSampler for Linear {
        fn normals_per_path(&self) -> usize {
            1
        }

        fn terminal(&self, normals: &[f64]) -> f64 {
            self.spot * (1.0 + self.sigma * normals[0])
        }
    }

    fn forward_contract_spec() -> OptionSpec {
        // Strike 0 call pays S_T
        OptionSpec::european_call(100.0, 1e-12, 1.0, 0.0, 0.2)
    }

    fn config(antithetic: bool, control: bool, chunk: usize) -> MonteCarloConfig {
        MonteCarloConfig::builder()
            .n_paths(20_000)
            .antithetic(antithetic)
            .control_variate(control)
            .chunk_size(chunk)
            .seed(11)
            .build()
            .unwrap()
    }

    #[test]
    fn test_z_score_95() {
        assert_relative_eq!(z_score(0.95), 1.959963984540054, epsilon = 1e-8);
        assert_relative_eq!(z_score(0.99), 2.5758293035489, epsilon = 1e-8);
    }

    #[test]
    fn test_antithetic_linear_payoff_is_exact() {
        // Linear payoff in z: each antithetic pair averages to exactly S
        let sampler = Linear { spot: 100.0, sigma: 0.1 };
        let est =
            estimate(&sampler, &forward_contract_spec(), 100.0, &config(true, false, 512)).unwrap();
        assert_relative_eq!(est.price, 100.0, epsilon = 1e-9);
        assert!(est.std_error < 1e-9);
        assert_eq!(est.n_samples, 10_000);
    }

    #[test]
    fn test_control_variate_removes_linear_noise() {
        let sampler = Linear { spot: 100.0, sigma: 0.1 };
        let est =
            estimate(&sampler, &forward_contract_spec(), 100.0, &config(false, true, 512)).unwrap();
        assert_relative_eq!(est.control_beta.unwrap(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(est.price, 100.0, epsilon = 1e-8);
    }

    #[test]
    fn test_plain_estimate_has_expected_error() {
        let sampler = Linear { spot: 100.0, sigma: 0.1 };
        let spec = forward_contract_spec();
        let est = estimate(&sampler, &spec, 100.0, &config(false, false, 512)).unwrap();
        // sd of payoff = 10, n = 20_000
        assert_relative_eq!(est.std_error, 10.0 / 20_000f64.sqrt(), max_relative = 0.05);
        assert!(est.confidence_interval.contains(100.0));
    }

    #[test]
    fn test_chunking_does_not_change_sample_count() {
        let sampler = Linear { spot: 100.0, sigma: 0.1 };
        let spec = forward_contract_spec();
        let est = estimate(&sampler, &spec, 100.0, &config(false, false, 3_000)).unwrap();
        assert_eq!(est.n_samples, 20_000);
    }

    #[test]
    fn test_repeat_runs_are_identical() {
        let sampler = Linear { spot: 100.0, sigma: 0.1 };
        let spec = OptionSpec::european_call(100.0, 100.0, 1.0, 0.0, 0.2);
        let a = estimate(&sampler, &spec, 100.0, &config(false, false, 700)).unwrap();
        let b = estimate(&sampler, &spec, 100.0, &config(false, false, 700)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_single_pair_is_insufficient() {
        let sampler = Linear { spot: 100.0, sigma: 0.1 };
        let config = MonteCarloConfig::builder().n_paths(2).build().unwrap();
        assert!(matches!(
            estimate(&sampler, &forward_contract_spec(), 100.0, &config),
            Err(PricingError::InsufficientSamples { got: 1, need: 2 })
        ));
    }
}
