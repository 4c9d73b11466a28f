//! Transaction cost models.

use pricer_core::types::PricingError;

/// Cost charged for trading `trade_shares` (signed) at `price`.
///
/// Any `Fn(f64, f64) -> f64` closure is a cost model.
///
/// # Examples
///
/// ```rust
/// use pricer_risk::hedging::CostModel;
///
/// let half_spread = |trade: f64, price: f64| 0.5 * 0.02 * trade.abs() * price;
/// assert!((half_spread.cost(-10.0, 50.0) - 5.0).abs() < 1e-12);
/// ```
pub trait CostModel: Sync {
    /// Non-negative cost of the trade, in currency units.
    fn cost(&self, trade_shares: f64, price: f64) -> f64;
}

impl<F> CostModel for F
where
    F: Fn(f64, f64) -> f64 + Sync,
{
    fn cost(&self, trade_shares: f64, price: f64) -> f64 {
        self(trade_shares, price)
    }
}

/// Frictionless trading.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NoCost;

impl CostModel for NoCost {
    #[inline]
    fn cost(&self, _trade_shares: f64, _price: f64) -> f64 {
        0.0
    }
}

/// `rate · |trade| · price`, plus `fixed` for every non-zero trade.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProportionalCost {
    /// Cost per unit of traded notional.
    pub rate: f64,
    /// Flat charge per trade.
    pub fixed: f64,
}

impl ProportionalCost {
    /// Validated cost model.
    ///
    /// # Errors
    /// `InvalidParameter` if either component is negative or non-finite.
    pub fn new(rate: f64, fixed: f64) -> Result<Self, PricingError> {
        for (name, value) in [("cost rate", rate), ("fixed cost", fixed)] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(PricingError::InvalidParameter(format!(
                    "{} = {} (must be non-negative and finite)",
                    name, value
                )));
            }
        }
        Ok(Self { rate, fixed })
    }

    /// Proportional cost without a fixed component.
    pub fn proportional(rate: f64) -> Result<Self, PricingError> {
        Self::new(rate, 0.0)
    }
}

impl CostModel for ProportionalCost {
    #[inline]
    fn cost(&self, trade_shares: f64, price: f64) -> f64 {
        if trade_shares == 0.0 {
            return 0.0;
        }
        self.rate * trade_shares.abs() * price + self.fixed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_proportional_cost() {
        let model = ProportionalCost::new(0.001, 0.5).unwrap();
        assert_relative_eq!(model.cost(10.0, 100.0), 1.5);
        assert_relative_eq!(model.cost(-10.0, 100.0), 1.5);
    }

    #[test]
    fn test_no_trade_no_fixed_charge() {
        let model = ProportionalCost::new(0.001, 0.5).unwrap();
        assert_eq!(model.cost(0.0, 100.0), 0.0);
        assert_eq!(NoCost.cost(5.0, 100.0), 0.0);
    }

    #[test]
    fn test_rejects_negative_rate() {
        assert!(ProportionalCost::proportional(-0.01).is_err());
        assert!(ProportionalCost::new(0.0, f64::NAN).is_err());
    }
}
