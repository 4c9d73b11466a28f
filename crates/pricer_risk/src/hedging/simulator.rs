//! Discrete delta hedging of a short option along one price path.
//!
//! The desk sells the option at inception, receives the premium and holds
//! `delta` shares financed through a cash account. Between observations the
//! cash earns the risk-free rate and the shares earn the dividend yield. On
//! rebalance dates the hedge is moved to the delta at the new state; at
//! expiry the shares are sold and the option payoff is paid out of the
//! portfolio.
//!
//! ```text
//! t₀            tᵢ (rebalance)                 t_n = T
//! ├─ Initialized ─┼─ Rebalancing ─┼─ ... ─┼─ Settled
//! premium - Δ₀S₀   trade Δᵢ - Δᵢ₋₁         error = cash - payoff
//! ```

use pricer_core::traits::PricingEngine;
use pricer_core::types::{OptionSpec, PricingError};

use super::cost::CostModel;
use super::position::HedgePosition;

/// Hedge ratio (and optionally premium) at a given market state.
///
/// The state is passed as an [`OptionSpec`] whose `spot` and `maturity` are
/// the current price and remaining time to expiry. Any
/// `Fn(&OptionSpec) -> f64` closure is a delta function with zero premium,
/// which makes constant-delta stubs trivial to write.
///
/// # Examples
///
/// ```rust
/// use pricer_core::types::OptionSpec;
/// use pricer_risk::hedging::DeltaFn;
///
/// let half = |_: &OptionSpec| 0.5;
/// let spec = OptionSpec::european_call(100.0, 100.0, 1.0, 0.02, 0.2);
/// assert_eq!(half.delta(&spec).unwrap(), 0.5);
/// assert_eq!(half.premium(&spec).unwrap(), 0.0);
/// ```
pub trait DeltaFn: Sync {
    /// Shares to hold per option sold.
    fn delta(&self, state: &OptionSpec) -> Result<f64, PricingError>;

    /// Premium received when the option is sold. Defaults to zero, in which
    /// case the hedging error measures the hedge P&L alone.
    fn premium(&self, state: &OptionSpec) -> Result<f64, PricingError> {
        let _ = state;
        Ok(0.0)
    }
}

impl<F> DeltaFn for F
where
    F: Fn(&OptionSpec) -> f64 + Sync,
{
    fn delta(&self, state: &OptionSpec) -> Result<f64, PricingError> {
        Ok(self(state))
    }
}

/// Hedges with the delta, and sells at the price, of a pricing engine.
///
/// # Examples
///
/// ```rust
/// use pricer_core::types::OptionSpec;
/// use pricer_models::analytical::BlackScholesEngine;
/// use pricer_risk::hedging::{DeltaFn, EngineDelta};
///
/// let engine = BlackScholesEngine::default();
/// let delta_fn = EngineDelta::new(&engine);
/// let spec = OptionSpec::european_call(100.0, 100.0, 1.0, 0.05, 0.2);
/// assert!((delta_fn.delta(&spec).unwrap() - 0.6368).abs() < 1e-4);
/// assert!((delta_fn.premium(&spec).unwrap() - 10.4506).abs() < 1e-4);
/// ```
#[derive(Clone, Copy)]
pub struct EngineDelta<'a> {
    engine: &'a dyn PricingEngine,
}

impl<'a> EngineDelta<'a> {
    /// Wraps `engine`.
    pub fn new(engine: &'a dyn PricingEngine) -> Self {
        Self { engine }
    }

    /// Name of the wrapped engine.
    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }
}

impl std::fmt::Debug for EngineDelta<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineDelta")
            .field("engine", &self.engine.name())
            .finish()
    }
}

impl DeltaFn for EngineDelta<'_> {
    fn delta(&self, state: &OptionSpec) -> Result<f64, PricingError> {
        self.engine.delta(state)
    }

    fn premium(&self, state: &OptionSpec) -> Result<f64, PricingError> {
        Ok(self.engine.price(state)?.price)
    }
}

/// When the hedge is moved between inception and expiry.
///
/// Step indices refer to path observations: step 0 is inception (always
/// hedged) and step `n` is expiry (always liquidated).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum RebalanceSchedule {
    /// At every observation.
    #[default]
    EveryStep,
    /// At every `k`-th observation.
    Every(usize),
    /// At the listed observation indices.
    Times(Vec<usize>),
    /// Never: the inception hedge is held to expiry.
    Static,
}

impl RebalanceSchedule {
    /// Rebalancing flags for steps `0..n_steps` (inception is `false`).
    ///
    /// # Errors
    /// `InvalidParameter` for `Every(0)`; `InvalidPath` if a listed time lies
    /// beyond the `n_steps` steps of the path.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pricer_risk::hedging::RebalanceSchedule;
    ///
    /// let mask = RebalanceSchedule::Every(2).mask(5).unwrap();
    /// assert_eq!(mask, vec![false, false, true, false, true]);
    /// assert!(RebalanceSchedule::Times(vec![7]).mask(5).is_err());
    /// ```
    pub fn mask(&self, n_steps: usize) -> Result<Vec<bool>, PricingError> {
        let mut mask = vec![false; n_steps];
        match self {
            Self::EveryStep => mask.iter_mut().skip(1).for_each(|m| *m = true),
            Self::Every(0) => {
                return Err(PricingError::InvalidParameter(
                    "rebalance interval must be at least one step".to_string(),
                ))
            }
            Self::Every(k) => mask.iter_mut().skip(*k).step_by(*k).for_each(|m| *m = true),
            Self::Times(times) => {
                for &t in times {
                    if t > n_steps {
                        return Err(PricingError::InvalidPath(format!(
                            "rebalance at step {} but the path has only {} steps",
                            t, n_steps
                        )));
                    }
                    if t > 0 && t < n_steps {
                        mask[t] = true;
                    }
                }
            }
            Self::Static => {}
        }
        Ok(mask)
    }
}

/// Result of hedging one path to expiry.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HedgingOutcome {
    /// `final_portfolio - payoff`; positive means the hedge over-replicated.
    pub hedging_error: f64,
    /// Cash after liquidating the shares at expiry.
    pub final_portfolio: f64,
    /// Option payoff at expiry.
    pub payoff: f64,
    /// Premium received at inception.
    pub premium: f64,
    /// Sum of all trading costs, including liquidation.
    pub total_costs: f64,
    /// Number of non-zero trades.
    pub n_trades: usize,
    /// Shares held over each interval `[tᵢ, tᵢ₊₁)`.
    pub deltas: Vec<f64>,
    /// Cost paid at each observation, inception and expiry included.
    pub costs: Vec<f64>,
}

/// Hedges a short position in `spec` along `path`.
///
/// `path` holds `n + 1` observations on a uniform grid over
/// `spec.maturity`; `path[0]` replaces `spec.spot` as the inception price.
///
/// # Errors
/// - `InvalidPath` for fewer than two observations, a non-positive or
///   non-finite observation, or a schedule that refers beyond the path
/// - `InvalidParameter` for an invalid or expired spec, or a non-finite delta
/// - Any error raised by `delta_fn`
///
/// # Examples
///
/// ```rust
/// use pricer_core::types::OptionSpec;
/// use pricer_risk::hedging::{simulate, NoCost, RebalanceSchedule};
///
/// let spec = OptionSpec::european_call(100.0, 100.0, 1.0, 0.0, 0.2);
/// let path = [100.0, 104.0, 98.0, 110.0];
/// let fully_hedged = |_: &OptionSpec| 1.0;
/// let outcome = simulate(&spec, &fully_hedged, &path, &RebalanceSchedule::Static, &NoCost).unwrap();
/// // one share bought at 100 sold at 110, call pays 10
/// assert!(outcome.hedging_error.abs() < 1e-12);
/// ```
pub fn simulate<D, C>(
    spec: &OptionSpec,
    delta_fn: &D,
    path: &[f64],
    schedule: &RebalanceSchedule,
    cost_model: &C,
) -> Result<HedgingOutcome, PricingError>
where
    D: DeltaFn + ?Sized,
    C: CostModel + ?Sized,
{
    spec.validate()?;
    if spec.is_expired() {
        return Err(PricingError::InvalidParameter(
            "cannot hedge an expired option".to_string(),
        ));
    }
    check_path(path)?;

    let n_steps = path.len() - 1;
    let rebalance = schedule.mask(n_steps)?;
    let dt = spec.maturity / n_steps as f64;
    let growth = (spec.rate * dt).exp();
    let carry = (spec.dividend_yield * dt).exp() - 1.0;
    let state_at = |step: usize| {
        spec.with_spot(path[step])
            .with_maturity(spec.maturity - step as f64 * dt)
    };
    let target_delta = |state: &OptionSpec| -> Result<f64, PricingError> {
        let delta = delta_fn.delta(state)?;
        if !delta.is_finite() {
            return Err(PricingError::InvalidParameter(format!(
                "delta function returned {} at spot {}",
                delta, state.spot
            )));
        }
        Ok(delta)
    };

    let inception = state_at(0);
    let premium = delta_fn.premium(&inception)?;
    let mut position = HedgePosition::open(premium, target_delta(&inception)?, path[0], cost_model);

    let mut deltas = Vec::with_capacity(n_steps);
    let mut costs = Vec::with_capacity(n_steps + 1);
    deltas.push(position.shares());
    costs.push(position.total_costs());

    for step in 1..n_steps {
        position.accrue(growth, carry * path[step - 1]);
        let cost = if rebalance[step] {
            let target = target_delta(&state_at(step))?;
            position.rebalance(step, target, path[step], cost_model)?
        } else {
            0.0
        };
        deltas.push(position.shares());
        costs.push(cost);
    }

    position.accrue(growth, carry * path[n_steps - 1]);
    costs.push(position.settle(path[n_steps], cost_model)?);

    let payoff = spec.payoff(path[n_steps]);
    let final_portfolio = position.cash();
    Ok(HedgingOutcome {
        hedging_error: final_portfolio - payoff,
        final_portfolio,
        payoff,
        premium,
        total_costs: position.total_costs(),
        n_trades: position.n_trades(),
        deltas,
        costs,
    })
}

fn check_path(path: &[f64]) -> Result<(), PricingError> {
    if path.len() < 2 {
        return Err(PricingError::InvalidPath(format!(
            "need at least 2 observations, got {}",
            path.len()
        )));
    }
    if let Some((i, s)) = path
        .iter()
        .enumerate()
        .find(|(_, s)| !(**s > 0.0 && s.is_finite()))
    {
        return Err(PricingError::InvalidPath(format!(
            "observation {} = {} is not a positive price",
            i, s
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hedging::cost::{NoCost, ProportionalCost};
    use approx::assert_relative_eq;
    use pricer_models::analytical::BlackScholesEngine;

    fn spec() -> OptionSpec {
        OptionSpec::european_call(100.0, 100.0, 1.0, 0.0, 0.2)
    }

    // ========================================
    // Schedule Tests
    // ========================================

    #[test]
    fn test_every_step_mask() {
        assert_eq!(
            RebalanceSchedule::EveryStep.mask(4).unwrap(),
            vec![false, true, true, true]
        );
        assert_eq!(
            RebalanceSchedule::Every(1).mask(4).unwrap(),
            RebalanceSchedule::EveryStep.mask(4).unwrap()
        );
    }

    #[test]
    fn test_interval_longer_than_path_is_static() {
        assert!(RebalanceSchedule::Every(21).mask(10).unwrap().iter().all(|m| !m));
        assert!(RebalanceSchedule::Every(0).mask(10).is_err());
    }

    #[test]
    fn test_times_skip_inception_and_expiry() {
        let mask = RebalanceSchedule::Times(vec![0, 2, 4]).mask(4).unwrap();
        assert_eq!(mask, vec![false, false, true, false]);
    }

    // ========================================
    // Simulation Tests
    // ========================================

    #[test]
    fn test_constant_delta_stub_pnl() {
        // Hold half a share throughout: P&L = 0.5 * (S_T - S_0) - payoff
        let stub = |_: &OptionSpec| 0.5;
        let path = [100.0, 95.0, 103.0, 120.0];
        let schedule = RebalanceSchedule::EveryStep;
        let outcome = simulate(&spec(), &stub, &path, &schedule, &NoCost).unwrap();
        assert_relative_eq!(outcome.hedging_error, 0.5 * 20.0 - 20.0, epsilon = 1e-12);
        assert_eq!(outcome.premium, 0.0);
        // only the opening and closing trades are non-zero
        assert_eq!(outcome.n_trades, 2);
        assert_eq!(outcome.deltas, vec![0.5, 0.5, 0.5]);
        assert_eq!(outcome.costs.len(), 4);
    }

    #[test]
    fn test_interest_accrues_on_cash() {
        let spec = spec().with_rate(0.05);
        let no_hedge = |_: &OptionSpec| 0.0;
        // path ends out of the money, so the error is the grown cash (zero)
        let path = [100.0, 90.0, 80.0];
        let schedule = RebalanceSchedule::Static;
        let outcome = simulate(&spec, &no_hedge, &path, &schedule, &NoCost).unwrap();
        assert_eq!(outcome.hedging_error, 0.0);

        let short_stock = |_: &OptionSpec| -1.0;
        let outcome = simulate(&spec, &short_stock, &path, &schedule, &NoCost).unwrap();
        // short sale proceeds 100 grow at 5% for one year, buy back at 80
        assert_relative_eq!(
            outcome.hedging_error,
            100.0 * 0.05_f64.exp() - 80.0,
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_costs_reduce_error_by_amount_paid() {
        let engine = BlackScholesEngine::default();
        let delta_fn = EngineDelta::new(&engine);
        let path = [100.0, 102.0, 99.0, 101.0, 104.0, 98.0, 103.0];
        let schedule = RebalanceSchedule::EveryStep;
        let free = simulate(&spec(), &delta_fn, &path, &schedule, &NoCost).unwrap();
        let cost = ProportionalCost::proportional(0.001).unwrap();
        let costly = simulate(&spec(), &delta_fn, &path, &schedule, &cost).unwrap();

        assert!(costly.total_costs > 0.0);
        // zero rate: every cost reduces terminal cash one for one
        assert_relative_eq!(
            free.hedging_error - costly.hedging_error,
            costly.total_costs,
            epsilon = 1e-10
        );
        assert_relative_eq!(
            costly.costs.iter().sum::<f64>(),
            costly.total_costs,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_engine_delta_sells_at_model_price() {
        let engine = BlackScholesEngine::default();
        let delta_fn = EngineDelta::new(&engine);
        let path = [100.0, 100.0];
        let schedule = RebalanceSchedule::EveryStep;
        let outcome = simulate(&spec(), &delta_fn, &path, &schedule, &NoCost).unwrap();
        assert_relative_eq!(outcome.premium, 7.965567455405804, epsilon = 1e-4);
        // flat path, option expires at the money: keep the premium
        assert_relative_eq!(outcome.hedging_error, outcome.premium, epsilon = 1e-12);
        assert_eq!(delta_fn.engine_name(), "black-scholes");
    }

    #[test]
    fn test_static_hedge_never_rebalances() {
        let engine = BlackScholesEngine::default();
        let delta_fn = EngineDelta::new(&engine);
        let path = [100.0, 110.0, 90.0, 105.0];
        let schedule = RebalanceSchedule::Static;
        let outcome = simulate(&spec(), &delta_fn, &path, &schedule, &NoCost).unwrap();
        assert!(outcome.deltas.iter().all(|d| *d == outcome.deltas[0]));
        assert_eq!(outcome.n_trades, 2);
    }

    // ========================================
    // Error Tests
    // ========================================

    #[test]
    fn test_invalid_paths() {
        let stub = |_: &OptionSpec| 0.5;
        let schedule = RebalanceSchedule::EveryStep;
        assert!(matches!(
            simulate(&spec(), &stub, &[100.0], &schedule, &NoCost),
            Err(PricingError::InvalidPath(_))
        ));
        assert!(matches!(
            simulate(&spec(), &stub, &[100.0, -1.0, 100.0], &schedule, &NoCost),
            Err(PricingError::InvalidPath(_))
        ));
        let late = RebalanceSchedule::Times(vec![5]);
        assert!(matches!(
            simulate(&spec(), &stub, &[100.0, 101.0], &late, &NoCost),
            Err(PricingError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_non_finite_delta_rejected() {
        let broken = |_: &OptionSpec| f64::NAN;
        let schedule = RebalanceSchedule::EveryStep;
        let result = simulate(&spec(), &broken, &[100.0, 101.0], &schedule, &NoCost);
        assert!(matches!(result, Err(PricingError::InvalidParameter(_))));
    }

    #[test]
    fn test_expired_option_rejected() {
        let stub = |_: &OptionSpec| 0.5;
        let spec = spec().with_maturity(0.0);
        let schedule = RebalanceSchedule::EveryStep;
        assert!(simulate(&spec, &stub, &[100.0, 101.0], &schedule, &NoCost).is_err());
    }
}
