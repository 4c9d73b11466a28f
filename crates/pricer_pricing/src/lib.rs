//! # pricer_pricing: Stochastic engines for hedgekit
//!
//! ## Layer 3 Role
//!
//! pricer_pricing holds the simulation side of the toolkit:
//! - Seeded random number generation with independent per-chunk streams (`rng`)
//! - GBM path generation, the Monte Carlo engine with antithetic variates,
//!   a control variate and common-random-number Greeks (`mc`)
//! - Heston Monte Carlo as a cross-check of the semi-closed form (`mc::heston`)
//! - Euler-Maruyama discretisation study (`sde`)
//!
//! ## Determinism
//!
//! No engine touches global generator state. A run is a pure function of its
//! [`mc::MonteCarloConfig`]: the same seed reproduces bit-identical estimates
//! regardless of the size of the rayon thread pool.
//!
//! ## Usage Example
//!
//! ```rust
//! use pricer_core::traits::PricingEngine;
//! use pricer_core::types::OptionSpec;
//! use pricer_pricing::mc::{MonteCarloConfig, MonteCarloEngine};
//!
//! let engine = MonteCarloEngine::new(MonteCarloConfig::builder().n_paths(20_000).build().unwrap());
//! let spec = OptionSpec::european_call(100.0, 100.0, 1.0, 0.05, 0.2);
//! let result = engine.price(&spec).unwrap();
//! assert!(result.confidence_interval.is_some());
//! assert!(result.greeks.delta.unwrap() > 0.5);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): Serialisation of configs, estimates and study rows

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod mc;
pub mod rng;
pub mod sde;
