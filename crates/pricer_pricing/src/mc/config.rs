//! Monte Carlo simulation configuration.
//!
//! Every default is a named constant; a config built with no overrides
//! reproduces the same estimate on every run.

use std::fmt;
use std::str::FromStr;

use super::error::ConfigError;

/// Maximum number of simulation paths allowed.
pub const MAX_PATHS: usize = 10_000_000;

/// Maximum number of time steps allowed per path.
pub const MAX_STEPS: usize = 10_000;

/// Default number of simulated paths.
pub const DEFAULT_PATHS: usize = 200_000;

/// Default number of time steps (daily over one year).
pub const DEFAULT_STEPS: usize = 252;

/// Default seed.
pub const DEFAULT_SEED: u64 = 42;

/// Default two-sided confidence level of the reported interval.
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Default number of samples per parallel chunk.
///
/// Fixes the chunk-to-seed mapping, so estimates do not depend on the
/// number of worker threads.
pub const DEFAULT_CHUNK_SIZE: usize = 4_096;

/// Time discretisation of the underlying SDE.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Discretisation {
    /// `S += (r - q)·S·dt + σ·S·dW` on each of `n_steps` steps.
    EulerMaruyama,
    /// Exact lognormal transition; a European payoff needs one draw per path.
    #[default]
    Exact,
}

impl fmt::Display for Discretisation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EulerMaruyama => write!(f, "euler-maruyama"),
            Self::Exact => write!(f, "exact"),
        }
    }
}

impl FromStr for Discretisation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "euler" | "euler-maruyama" => Ok(Self::EulerMaruyama),
            "exact" => Ok(Self::Exact),
            other => Err(ConfigError::InvalidParameter {
                name: "scheme",
                value: format!("unknown discretisation '{}'", other),
            }),
        }
    }
}

/// Monte Carlo simulation configuration.
///
/// Immutable once built. Use [`MonteCarloConfigBuilder`] to construct
/// instances.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::{Discretisation, MonteCarloConfig};
///
/// let config = MonteCarloConfig::builder()
///     .n_paths(10_000)
///     .n_steps(252)
///     .scheme(Discretisation::EulerMaruyama)
///     .seed(7)
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.n_paths(), 10_000);
/// assert!(config.antithetic());
/// assert_eq!(config.n_samples(), 5_000);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct MonteCarloConfig {
    n_paths: usize,
    n_steps: usize,
    seed: u64,
    antithetic: bool,
    control_variate: bool,
    scheme: Discretisation,
    confidence_level: f64,
    chunk_size: usize,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            n_paths: DEFAULT_PATHS,
            n_steps: DEFAULT_STEPS,
            seed: DEFAULT_SEED,
            antithetic: true,
            control_variate: false,
            scheme: Discretisation::Exact,
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl MonteCarloConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> MonteCarloConfigBuilder {
        MonteCarloConfigBuilder::default()
    }

    /// Number of simulated paths (both legs of an antithetic pair count).
    #[inline]
    pub fn n_paths(&self) -> usize {
        self.n_paths
    }

    /// Number of time steps per path.
    #[inline]
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Base seed of the run.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Whether each draw is paired with its negation.
    #[inline]
    pub fn antithetic(&self) -> bool {
        self.antithetic
    }

    /// Whether the discounted terminal spot is used as a control variate.
    #[inline]
    pub fn control_variate(&self) -> bool {
        self.control_variate
    }

    /// SDE discretisation.
    #[inline]
    pub fn scheme(&self) -> Discretisation {
        self.scheme
    }

    /// Two-sided confidence level of the reported interval.
    #[inline]
    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }

    /// Samples per parallel chunk.
    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of independent samples entering the estimator.
    ///
    /// An antithetic pair is averaged into a single sample.
    #[inline]
    pub fn n_samples(&self) -> usize {
        if self.antithetic {
            self.n_paths / 2
        } else {
            self.n_paths
        }
    }

    /// Same configuration with a different seed.
    pub fn with_seed(&self, seed: u64) -> Self {
        Self {
            seed,
            ..self.clone()
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - `n_paths` is 0 or greater than 10,000,000, or odd with antithetic pairing
    /// - `n_steps` is 0 or greater than 10,000
    /// - `confidence_level` is outside (0, 1)
    /// - `chunk_size` is 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_paths == 0 || self.n_paths > MAX_PATHS {
            return Err(ConfigError::InvalidPathCount(self.n_paths));
        }
        if self.antithetic && self.n_paths % 2 != 0 {
            return Err(ConfigError::InvalidParameter {
                name: "n_paths",
                value: format!("{} is odd; antithetic pairing needs an even count", self.n_paths),
            });
        }
        if self.n_steps == 0 || self.n_steps > MAX_STEPS {
            return Err(ConfigError::InvalidStepCount(self.n_steps));
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(ConfigError::InvalidParameter {
                name: "confidence_level",
                value: format!("{} must lie in (0, 1)", self.confidence_level),
            });
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "chunk_size",
                value: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for [`MonteCarloConfig`].
///
/// Unset fields take the `DEFAULT_*` constants of this module; the result
/// is validated at build time.
#[derive(Clone, Debug, Default)]
pub struct MonteCarloConfigBuilder {
    n_paths: Option<usize>,
    n_steps: Option<usize>,
    seed: Option<u64>,
    antithetic: Option<bool>,
    control_variate: bool,
    scheme: Discretisation,
    confidence_level: Option<f64>,
    chunk_size: Option<usize>,
}

impl MonteCarloConfigBuilder {
    /// Sets the number of simulation paths.
    #[inline]
    pub fn n_paths(mut self, n_paths: usize) -> Self {
        self.n_paths = Some(n_paths);
        self
    }

    /// Sets the number of time steps per path.
    #[inline]
    pub fn n_steps(mut self, n_steps: usize) -> Self {
        self.n_steps = Some(n_steps);
        self
    }

    /// Sets the seed for reproducibility.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables antithetic variates (enabled by default).
    #[inline]
    pub fn antithetic(mut self, antithetic: bool) -> Self {
        self.antithetic = Some(antithetic);
        self
    }

    /// Enables or disables the terminal-spot control variate.
    #[inline]
    pub fn control_variate(mut self, control_variate: bool) -> Self {
        self.control_variate = control_variate;
        self
    }

    /// Sets the SDE discretisation.
    #[inline]
    pub fn scheme(mut self, scheme: Discretisation) -> Self {
        self.scheme = scheme;
        self
    }

    /// Sets the confidence level of the reported interval.
    #[inline]
    pub fn confidence_level(mut self, level: f64) -> Self {
        self.confidence_level = Some(level);
        self
    }

    /// Sets the number of samples per parallel chunk.
    #[inline]
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// See [`MonteCarloConfig::validate`].
    pub fn build(self) -> Result<MonteCarloConfig, ConfigError> {
        let config = MonteCarloConfig {
            n_paths: self.n_paths.unwrap_or(DEFAULT_PATHS),
            n_steps: self.n_steps.unwrap_or(DEFAULT_STEPS),
            seed: self.seed.unwrap_or(DEFAULT_SEED),
            antithetic: self.antithetic.unwrap_or(true),
            control_variate: self.control_variate,
            scheme: self.scheme,
            confidence_level: self.confidence_level.unwrap_or(DEFAULT_CONFIDENCE_LEVEL),
            chunk_size: self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_match_constants() {
        let config = MonteCarloConfig::builder().build().unwrap();
        assert_eq!(config, MonteCarloConfig::default());
        assert_eq!(config.n_paths(), DEFAULT_PATHS);
        assert_eq!(config.n_steps(), DEFAULT_STEPS);
        assert_eq!(config.seed(), DEFAULT_SEED);
        assert_eq!(config.scheme(), Discretisation::Exact);
        assert!(config.antithetic());
        assert!(!config.control_variate());
    }

    #[test]
    fn test_builder_overrides() {
        let config = MonteCarloConfig::builder()
            .n_paths(1001)
            .n_steps(10)
            .antithetic(false)
            .control_variate(true)
            .confidence_level(0.99)
            .chunk_size(100)
            .seed(9)
            .build()
            .unwrap();
        assert_eq!(config.n_samples(), 1001);
        assert!(config.control_variate());
        assert_eq!(config.confidence_level(), 0.99);
        assert_eq!(config.chunk_size(), 100);
        assert_eq!(config.with_seed(10).seed(), 10);
    }

    #[test]
    fn test_invalid_zero_paths() {
        let result = MonteCarloConfig::builder().n_paths(0).build();
        assert!(matches!(result, Err(ConfigError::InvalidPathCount(0))));
    }

    #[test]
    fn test_invalid_too_many_paths() {
        let result = MonteCarloConfig::builder().n_paths(MAX_PATHS + 2).build();
        assert!(matches!(result, Err(ConfigError::InvalidPathCount(_))));
    }

    #[test]
    fn test_invalid_zero_steps() {
        let result = MonteCarloConfig::builder().n_steps(0).build();
        assert!(matches!(result, Err(ConfigError::InvalidStepCount(0))));
    }

    #[test]
    fn test_odd_paths_rejected_with_antithetic() {
        let result = MonteCarloConfig::builder().n_paths(1001).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter { name: "n_paths", .. })
        ));
    }

    #[test]
    fn test_invalid_confidence_level() {
        for level in [0.0, 1.0, -0.5, f64::NAN] {
            let result = MonteCarloConfig::builder().confidence_level(level).build();
            assert!(result.is_err(), "level {} accepted", level);
        }
    }

    #[test]
    fn test_discretisation_from_str() {
        assert_eq!("euler".parse::<Discretisation>().unwrap(), Discretisation::EulerMaruyama);
        assert_eq!("Exact".parse::<Discretisation>().unwrap(), Discretisation::Exact);
        assert!("milstein".parse::<Discretisation>().is_err());
        assert_eq!(Discretisation::EulerMaruyama.to_string(), "euler-maruyama");
    }
}
