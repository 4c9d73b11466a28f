//! # pricer_core: Foundation for the hedgekit pricing toolkit
//!
//! ## Layer 1 (Foundation) Role
//!
//! pricer_core is the bottom layer of the workspace, providing:
//! - Contract and result types: `OptionSpec`, `PricingResult`, `Greeks` (`types`)
//! - The error taxonomy shared by every engine: `PricingError` (`types::error`)
//! - The `PricingEngine` capability trait (`traits`)
//! - Root-finding, tridiagonal and quadrature routines (`math`)
//! - Historical price series and data-quality checks (`market_data`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other pricer_* crates, with minimal external dependencies:
//! - num-traits: Traits for generic numerical computation
//! - chrono: Observation dates for price series
//! - thiserror: Error derivation
//! - serde: Serialisation support (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use pricer_core::types::{OptionSpec, OptionType};
//!
//! let spec = OptionSpec::european_call(100.0, 100.0, 1.0, 0.05, 0.2);
//! assert!(spec.validate().is_ok());
//! assert_eq!(spec.option_type, OptionType::Call);
//! assert_eq!(spec.intrinsic(110.0), 10.0);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): Enable serialisation for result and report types

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod market_data;
pub mod math;
pub mod traits;
pub mod types;
