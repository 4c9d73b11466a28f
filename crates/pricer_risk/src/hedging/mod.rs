//! Discrete-time delta hedging under transaction costs.
//!
//! ## Components
//!
//! - [`DeltaFn`]: the hedge ratio, supplied by any [`PricingEngine`] through
//!   [`EngineDelta`] or by a plain closure
//! - [`CostModel`]: cost of a trade as a function of size and price
//! - [`HedgePosition`]: shares, cash and costs of one running hedge
//! - [`simulate`]: replays one path through the hedge lifecycle
//! - [`HedgingExperiment`]: rebalance-interval x cost grids over simulated paths
//!
//! [`PricingEngine`]: pricer_core::traits::PricingEngine
//!
//! ## Example
//!
//! ```rust
//! use pricer_core::types::OptionSpec;
//! use pricer_models::analytical::BlackScholesEngine;
//! use pricer_risk::hedging::{simulate, EngineDelta, ProportionalCost, RebalanceSchedule};
//!
//! let spec = OptionSpec::european_put(100.0, 100.0, 0.25, 0.02, 0.2);
//! let engine = BlackScholesEngine::default();
//! let path = [100.0, 98.5, 97.0, 99.0, 101.5, 100.5];
//! let cost = ProportionalCost::proportional(0.0005).unwrap();
//!
//! let outcome = simulate(&spec, &EngineDelta::new(&engine), &path, &RebalanceSchedule::EveryStep, &cost).unwrap();
//! assert_eq!(outcome.deltas.len(), 5);
//! assert!(outcome.total_costs > 0.0);
//! ```

mod cost;
mod experiment;
mod position;
mod simulator;

pub use cost::{CostModel, NoCost, ProportionalCost};
pub use experiment::{
    simulate_paths, ExperimentCell, HedgingExperiment, DEFAULT_COST_RATES, DEFAULT_HEDGE_PATHS,
    DEFAULT_HEDGE_STEPS, DEFAULT_REBALANCE_INTERVALS,
};
pub use position::{HedgePosition, HedgeState};
pub use simulator::{simulate, DeltaFn, EngineDelta, HedgingOutcome, RebalanceSchedule};
