//! Mutable hedge state carried through one simulation.

use pricer_core::types::PricingError;

use super::cost::CostModel;

/// Lifecycle of a hedge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HedgeState {
    /// Hedge established at inception.
    Initialized,
    /// Last rebalanced at `step`.
    Rebalancing {
        /// Step index of the most recent rebalance.
        step: usize,
    },
    /// Shares liquidated at expiry; no further trades.
    Settled,
}

/// Shares held, cash account and cumulative trading costs of a short-option
/// delta hedge.
///
/// # Examples
///
/// ```rust
/// use pricer_risk::hedging::{HedgePosition, HedgeState, NoCost};
///
/// // Sell an option for 10, buy 0.5 shares at 100
/// let mut position = HedgePosition::open(10.0, 0.5, 100.0, &NoCost);
/// assert_eq!(position.cash(), -40.0);
/// position.rebalance(1, 0.6, 110.0, &NoCost).unwrap();
/// assert!((position.shares() - 0.6).abs() < 1e-15);
/// assert_eq!(position.state(), HedgeState::Rebalancing { step: 1 });
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct HedgePosition {
    shares: f64,
    cash: f64,
    total_costs: f64,
    n_trades: usize,
    state: HedgeState,
}

impl HedgePosition {
    /// Receives `premium`, buys `delta` shares at `spot` and pays the cost.
    pub fn open<C: CostModel + ?Sized>(
        premium: f64,
        delta: f64,
        spot: f64,
        cost_model: &C,
    ) -> Self {
        let mut position = Self {
            shares: 0.0,
            cash: premium,
            total_costs: 0.0,
            n_trades: 0,
            state: HedgeState::Initialized,
        };
        position.trade(delta, spot, cost_model);
        position
    }

    /// Shares currently held.
    #[inline]
    pub fn shares(&self) -> f64 {
        self.shares
    }

    /// Cash account balance.
    #[inline]
    pub fn cash(&self) -> f64 {
        self.cash
    }

    /// Costs paid so far.
    #[inline]
    pub fn total_costs(&self) -> f64 {
        self.total_costs
    }

    /// Non-zero trades executed so far.
    #[inline]
    pub fn n_trades(&self) -> usize {
        self.n_trades
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> HedgeState {
        self.state
    }

    /// Mark-to-market value `shares · spot + cash`.
    #[inline]
    pub fn value(&self, spot: f64) -> f64 {
        self.shares * spot + self.cash
    }

    /// Grows cash by `growth` (one period of interest) and credits the
    /// dividend paid on the shares held.
    pub fn accrue(&mut self, growth: f64, dividend_per_share: f64) {
        self.cash = self.cash * growth + self.shares * dividend_per_share;
    }

    /// Trades to `target` shares at `spot`; returns the cost paid.
    ///
    /// # Errors
    /// `InvalidParameter` once the position is settled.
    pub fn rebalance<C: CostModel + ?Sized>(
        &mut self,
        step: usize,
        target: f64,
        spot: f64,
        cost_model: &C,
    ) -> Result<f64, PricingError> {
        self.ensure_open()?;
        let cost = self.trade(target - self.shares, spot, cost_model);
        self.state = HedgeState::Rebalancing { step };
        Ok(cost)
    }

    /// Liquidates the shares at `spot`; returns the cost paid.
    ///
    /// # Errors
    /// `InvalidParameter` if already settled.
    pub fn settle<C: CostModel + ?Sized>(
        &mut self,
        spot: f64,
        cost_model: &C,
    ) -> Result<f64, PricingError> {
        self.ensure_open()?;
        let cost = self.trade(-self.shares, spot, cost_model);
        self.state = HedgeState::Settled;
        Ok(cost)
    }

    fn ensure_open(&self) -> Result<(), PricingError> {
        if self.state == HedgeState::Settled {
            return Err(PricingError::InvalidParameter(
                "hedge position is already settled".to_string(),
            ));
        }
        Ok(())
    }

    fn trade<C: CostModel + ?Sized>(&mut self, shares: f64, spot: f64, cost_model: &C) -> f64 {
        let cost = cost_model.cost(shares, spot);
        self.shares += shares;
        self.cash -= shares * spot + cost;
        self.total_costs += cost;
        if shares != 0.0 {
            self.n_trades += 1;
        }
        cost
    }
}
