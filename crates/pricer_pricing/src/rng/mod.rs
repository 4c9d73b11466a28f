//! # Random Number Generation
//!
//! Seeded generators for Monte Carlo simulation. There is no global
//! generator state: every simulation run owns a [`PricerRng`] built from an
//! explicit seed, and parallel work derives one generator per chunk with
//! [`stream_seed`].
//!
//! ## Usage Example
//!
//! ```rust
//! use pricer_pricing::rng::{stream_seed, PricerRng};
//!
//! let mut rng = PricerRng::from_seed(12345);
//! let normal_value = rng.gen_normal();
//!
//! // Independent, reproducible stream for chunk 3 of a run seeded with 42
//! let mut chunk_rng = PricerRng::from_seed(stream_seed(42, 3));
//! let mut buffer = vec![0.0; 1000];
//! chunk_rng.fill_normal(&mut buffer);
//! # let _ = normal_value;
//! ```

mod prng;

pub use prng::{stream_seed, PricerRng};
