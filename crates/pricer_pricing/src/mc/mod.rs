//! Monte Carlo pricing engines.
//!
//! # Architecture
//!
//! ```text
//! MonteCarloEngine / HestonMonteCarloEngine
//! ├── MonteCarloConfig  (paths, steps, seed, variance reduction, level)
//! ├── TerminalSampler   (exact GBM, Euler GBM, full-truncation Heston)
//! └── estimator
//!     ├── per-chunk PricerRng seeded from (seed, chunk index)
//!     ├── rayon map over chunks, in-order moment reduction
//!     └── antithetic pairing, control variate, confidence interval
//! ```
//!
//! # Examples
//!
//! ```rust
//! use pricer_core::types::OptionSpec;
//! use pricer_pricing::mc::{MonteCarloConfig, MonteCarloEngine};
//!
//! let config = MonteCarloConfig::builder()
//!     .n_paths(50_000)
//!     .control_variate(true)
//!     .seed(42)
//!     .build()
//!     .unwrap();
//!
//! let engine = MonteCarloEngine::new(config);
//! let spec = OptionSpec::european_put(100.0, 95.0, 0.5, 0.02, 0.25);
//! let estimate = engine.estimate(&spec).unwrap();
//! println!("Price: {:.4} +/- {:.4}", estimate.price, estimate.std_error);
//! ```

pub mod config;
pub mod error;
mod estimator;
pub mod heston;
pub mod paths;
pub mod pricer;

// Re-exports for convenient access
pub use config::{
    Discretisation, MonteCarloConfig, MonteCarloConfigBuilder, DEFAULT_CHUNK_SIZE,
    DEFAULT_CONFIDENCE_LEVEL, DEFAULT_PATHS, DEFAULT_SEED, DEFAULT_STEPS, MAX_PATHS, MAX_STEPS,
};
pub use error::ConfigError;
pub use estimator::{z_score, MonteCarloEstimate};
pub use heston::HestonMonteCarloEngine;
pub use paths::{generate_gbm_paths, GbmParams, PathSet};
pub use pricer::{MonteCarloEngine, DELTA_BUMP_FRACTION, RHO_BUMP, VEGA_BUMP};
