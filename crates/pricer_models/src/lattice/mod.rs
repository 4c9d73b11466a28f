//! Recombining lattice engines.
//!
//! - [`binomial`]: Cox-Ross-Rubinstein tree with optional early exercise

pub mod binomial;

pub use binomial::{
    convergence_table, BinomialTreeEngine, ConvergenceRow, ReplicationCheck, DEFAULT_TREE_STEPS,
};
