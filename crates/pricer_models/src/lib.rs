//! # Pricer Models (L2: Deterministic Engines)
//!
//! Closed-form, lattice, finite-difference and semi-closed-form pricing
//! engines for vanilla options.
//!
//! This crate provides:
//! - Normal distribution primitives and Black-Scholes/Garman-Kohlhagen
//!   prices, Greeks and implied volatility (`analytical`)
//! - The Cox-Ross-Rubinstein binomial tree (`lattice`)
//! - Implicit and Crank-Nicolson finite differences (`pde`)
//! - The Heston model and smile generation (`models`)
//!
//! Every engine implements [`PricingEngine`](pricer_core::traits::PricingEngine)
//! and can be compared through `&dyn PricingEngine`.
//!
//! ## Usage Examples
//!
//! ```rust
//! use pricer_core::traits::PricingEngine;
//! use pricer_core::types::OptionSpec;
//! use pricer_models::analytical::BlackScholesEngine;
//! use pricer_models::lattice::BinomialTreeEngine;
//!
//! let spec = OptionSpec::european_call(100.0, 100.0, 1.0, 0.05, 0.2);
//! let engines: [&dyn PricingEngine; 2] = [&BlackScholesEngine::default(), &BinomialTreeEngine::new(500)];
//! let prices: Vec<f64> = engines.iter().map(|e| e.price(&spec).unwrap().price).collect();
//! assert!((prices[0] - prices[1]).abs() < 0.01);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): Serialisation of configs and report rows

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod analytical;
pub mod lattice;
pub mod models;
pub mod pde;
