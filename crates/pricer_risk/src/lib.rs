//! # Pricer Risk (L4: Application)
//!
//! Hedging simulation, risk metrics and model-risk reporting on top of the
//! pricing engines.
//!
//! This crate provides:
//! - Discrete delta hedging of a short option with pluggable delta functions
//!   and transaction cost models (`hedging`)
//! - Rebalance-interval x cost-rate experiments run in parallel over seeded
//!   GBM paths (`hedging::HedgingExperiment`)
//! - VaR, CVaR, drawdown and dispersion statistics (`metrics`)
//! - A budget-constrained protective put overlay (`overlay`)
//! - Cross-model price comparison against Black-Scholes (`model_risk`)
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            pricer_risk (L4)             │
//! ├─────────────────────────────────────────┤
//! │  hedging/    - simulator, position,     │
//! │                costs, experiments       │
//! │  metrics/    - VaR, CVaR, drawdown      │
//! │  overlay/    - protective put           │
//! │  model_risk  - engine comparison        │
//! └─────────────────────────────────────────┘
//!          ↓
//! ┌─────────────────────────────────────────┐
//! │   pricer_pricing (L3) / pricer_models   │
//! │  Monte Carlo, closed form, tree, PDE,   │
//! │  Heston                                 │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use pricer_core::types::OptionSpec;
//! use pricer_models::analytical::BlackScholesEngine;
//! use pricer_risk::hedging::{EngineDelta, HedgingExperiment};
//!
//! let spec = OptionSpec::european_call(100.0, 100.0, 1.0, 0.02, 0.2);
//! let engine = BlackScholesEngine::default();
//!
//! let cells = HedgingExperiment::new(500, 252, 42)
//!     .with_grid(vec![1, 21], vec![0.0])
//!     .run(&spec, &EngineDelta::new(&engine))
//!     .unwrap();
//!
//! // Daily rebalancing replicates the option far better than monthly
//! assert!(cells[0].summary.std_dev < cells[1].summary.std_dev);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod hedging;
pub mod metrics;
pub mod model_risk;
pub mod overlay;

pub use hedging::{
    simulate, simulate_paths, CostModel, DeltaFn, EngineDelta, HedgePosition, HedgeState,
    HedgingExperiment, HedgingOutcome, NoCost, ProportionalCost, RebalanceSchedule,
};
pub use metrics::RiskSummary;
pub use model_risk::{compare_engines, EngineComparison};
pub use overlay::{OverlayConfig, ProtectivePutOverlay};
