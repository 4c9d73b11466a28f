//! Cox-Ross-Rubinstein binomial tree.
//!
//! ## Parameterisation
//!
//! - u = e^(σ√Δt), d = 1/u
//! - p = (e^((r-q)Δt) - d) / (u - d)
//!
//! A probability outside [0, 1] means the rate/volatility/step combination
//! admits arbitrage on the lattice and is rejected rather than clamped.
//!
//! Prices converge to the closed form at O(1/n) with the usual odd/even
//! oscillation for at-the-money strikes.

use pricer_core::traits::PricingEngine;
use pricer_core::types::{ExerciseStyle, Greeks, OptionSpec, PricingError, PricingResult};

/// Default number of time steps.
pub const DEFAULT_TREE_STEPS: usize = 200;

/// CRR binomial tree engine.
///
/// # Examples
/// ```
/// use pricer_core::traits::PricingEngine;
/// use pricer_core::types::OptionSpec;
/// use pricer_models::lattice::BinomialTreeEngine;
///
/// let spec = OptionSpec::european_call(100.0, 100.0, 1.0, 0.05, 0.2);
/// let result = BinomialTreeEngine::new(500).price(&spec).unwrap();
/// assert!((result.price - 10.4506).abs() < 0.01);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinomialTreeEngine {
    /// Number of tree steps.
    pub steps: usize,
}

impl Default for BinomialTreeEngine {
    fn default() -> Self {
        Self::new(DEFAULT_TREE_STEPS)
    }
}

/// One-period replication of the tree value at the root.
///
/// Holding `delta·e^(-qΔt)` shares (dividends reinvested) plus `bond` in
/// cash reproduces the option value in both successor states.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReplicationCheck {
    /// (V_u - V_d) / (S_u - S_d).
    pub delta: f64,
    /// e^(-rΔt)·(V_u - delta·S_u).
    pub bond: f64,
    /// Cost of the replicating portfolio at the root.
    pub replicated_price: f64,
    /// Discounted expected value at the root (continuation value).
    pub tree_price: f64,
    /// |replicated_price - tree_price|.
    pub gap: f64,
}

/// A row of a lattice convergence study.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConvergenceRow {
    /// Number of tree steps.
    pub steps: usize,
    /// Tree price.
    pub price: f64,
    /// |price - reference|.
    pub abs_error: f64,
}

/// Lattice parameters for one spec.
#[derive(Debug, Clone, Copy)]
struct Lattice {
    dt: f64,
    up: f64,
    down: f64,
    prob: f64,
    disc: f64,
}

/// Values retained from the backward induction near the root.
#[derive(Debug, Clone, Copy)]
struct Induction {
    lattice: Lattice,
    price: f64,
    continuation: f64,
    step_one: [f64; 2],
    step_two: Option<[f64; 3]>,
}

impl BinomialTreeEngine {
    /// Creates a tree engine with the given number of steps.
    pub fn new(steps: usize) -> Self {
        Self { steps }
    }

    fn lattice(&self, spec: &OptionSpec, volatility: f64) -> Result<Lattice, PricingError> {
        let dt = spec.maturity / self.steps as f64;
        let up = (volatility * dt.sqrt()).exp();
        let down = 1.0 / up;
        let growth = ((spec.rate - spec.dividend_yield) * dt).exp();
        let prob = (growth - down) / (up - down);
        if !prob.is_finite() || !(0.0..=1.0).contains(&prob) {
            return Err(PricingError::InvalidParameter(format!(
                "risk-neutral probability {} is outside [0, 1] \
                 (r = {}, q = {}, sigma = {}, steps = {})",
                prob,
                spec.rate,
                spec.dividend_yield,
                volatility,
                self.steps
            )));
        }
        Ok(Lattice {
            dt,
            up,
            down,
            prob,
            disc: (-spec.rate * dt).exp(),
        })
    }

    fn induct(&self, spec: &OptionSpec) -> Result<Induction, PricingError> {
        spec.validate()?;
        let volatility = spec.require_volatility()?;
        if self.steps == 0 {
            return Err(PricingError::InvalidParameter(
                "binomial steps must be > 0".to_string(),
            ));
        }
        let lattice = self.lattice(spec, volatility)?;
        let n = self.steps;
        let american = spec.exercise == ExerciseStyle::American;
        let ratio = lattice.up / lattice.down;
        let disc_up = lattice.disc * lattice.prob;
        let disc_down = lattice.disc * (1.0 - lattice.prob);

        // Node j at step i sits at S·u^j·d^(i-j)
        let mut values = vec![0.0_f64; n + 1];
        let mut node = spec.spot * lattice.down.powi(n as i32);
        for value in values.iter_mut() {
            *value = spec.payoff(node);
            node *= ratio;
        }

        let mut step_one = [values[0], values.get(1).copied().unwrap_or(values[0])];
        let mut step_two = None;
        let mut continuation = values[0];
        let mut base = spec.spot * lattice.down.powi(n as i32 - 1);

        for i in (0..n).rev() {
            let mut node = base;
            for j in 0..=i {
                let held = disc_up * values[j + 1] + disc_down * values[j];
                if i == 0 {
                    continuation = held;
                }
                values[j] = if american {
                    held.max(spec.payoff(node))
                } else {
                    held
                };
                node *= ratio;
            }
            match i {
                2 => step_two = Some([values[0], values[1], values[2]]),
                1 => step_one = [values[0], values[1]],
                _ => {}
            }
            base *= lattice.up;
        }

        Ok(Induction {
            lattice,
            price: values[0],
            continuation,
            step_one,
            step_two,
        })
    }

    /// One-step replication check at the root.
    ///
    /// # Errors
    /// Same as [`PricingEngine::price`]; also fails for expired options.
    pub fn replication_check(&self, spec: &OptionSpec) -> Result<ReplicationCheck, PricingError> {
        if spec.is_expired() {
            return Err(PricingError::InvalidParameter(
                "replication check needs a positive maturity".to_string(),
            ));
        }
        let tree = self.induct(spec)?;
        let Lattice { dt, up, down, disc, .. } = tree.lattice;
        let (s_up, s_down) = (spec.spot * up, spec.spot * down);
        let [v_down, v_up] = tree.step_one;

        let delta = (v_up - v_down) / (s_up - s_down);
        let bond = disc * (v_up - delta * s_up);
        let replicated_price = delta * (-spec.dividend_yield * dt).exp() * spec.spot + bond;
        Ok(ReplicationCheck {
            delta,
            bond,
            replicated_price,
            tree_price: tree.continuation,
            gap: (replicated_price - tree.continuation).abs(),
        })
    }
}

impl PricingEngine for BinomialTreeEngine {
    fn name(&self) -> &str {
        "binomial-crr"
    }

    fn price(&self, spec: &OptionSpec) -> Result<PricingResult, PricingError> {
        if spec.is_expired() {
            spec.validate()?;
            let intrinsic = spec.intrinsic(spec.spot);
            let delta = if intrinsic > 0.0 { spec.option_type.sign() } else { 0.0 };
            return Ok(PricingResult::new(intrinsic).with_greeks(Greeks::delta_only(delta)));
        }

        let tree = self.induct(spec)?;
        let Lattice { dt, up, down, .. } = tree.lattice;
        let s = spec.spot;
        let [v_d, v_u] = tree.step_one;
        let delta = (v_u - v_d) / (s * up - s * down);

        let (gamma, theta) = match tree.step_two {
            Some([v_dd, v_ud, v_uu]) => {
                let (s_uu, s_dd) = (s * up * up, s * down * down);
                let upper = (v_uu - v_ud) / (s_uu - s);
                let lower = (v_ud - v_dd) / (s - s_dd);
                let gamma = (upper - lower) / (0.5 * (s_uu - s_dd));
                // The middle node at step 2 has the root's spot
                let theta = (v_ud - tree.price) / (2.0 * dt);
                (Some(gamma), Some(theta))
            }
            None => (None, None),
        };

        tracing::debug!(
            steps = self.steps,
            price = tree.price,
            delta,
            option_type = %spec.option_type,
            "binomial tree priced"
        );

        Ok(PricingResult::new(tree.price).with_greeks(Greeks {
            delta: Some(delta),
            gamma,
            theta,
            ..Greeks::default()
        }))
    }
}

/// Tree prices for each step count against a reference price.
///
/// # Examples
/// ```
/// use pricer_core::types::OptionSpec;
/// use pricer_models::analytical::BlackScholes;
/// use pricer_models::lattice::convergence_table;
///
/// let spec = OptionSpec::european_put(100.0, 100.0, 1.0, 0.05, 0.2);
/// let reference = BlackScholes::new(&spec).unwrap().price();
/// let rows = convergence_table(&spec, &[50, 400], reference).unwrap();
/// assert!(rows[1].abs_error < rows[0].abs_error);
/// ```
pub fn convergence_table(
    spec: &OptionSpec,
    steps: &[usize],
    reference: f64,
) -> Result<Vec<ConvergenceRow>, PricingError> {
    steps
        .iter()
        .map(|&n| {
            let price = BinomialTreeEngine::new(n).price(spec)?.price;
            Ok(ConvergenceRow {
                steps: n,
                price,
                abs_error: (price - reference).abs(),
            })
        })
        .collect()
}
