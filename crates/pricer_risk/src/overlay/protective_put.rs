//! Protective put overlay on a long underlying position.
//!
//! A portfolio holds `notional / S₀` units of the underlying and spends at
//! most `budget_fraction · notional` on European puts struck at
//! `put_strike_pct · S₀`, never buying more puts than units held. The put
//! payoff is received at the put expiry and grown at the risk-free rate to
//! the end of the overlay horizon, so both portfolios are compared on the
//! same date.

use pricer_core::types::{OptionSpec, PricingError};
use pricer_models::analytical::BlackScholes;
use pricer_pricing::mc::{generate_gbm_paths, Discretisation, GbmParams};
use pricer_pricing::rng::PricerRng;

use super::error::OverlayError;
use crate::metrics::{RiskSummary, TRADING_DAYS_PER_YEAR};

/// Default portfolio notional.
pub const DEFAULT_NOTIONAL: f64 = 1_000_000.0;

/// Default put strike as a fraction of spot.
pub const DEFAULT_PUT_STRIKE_PCT: f64 = 0.95;

/// Default put maturity in years.
pub const DEFAULT_PUT_MATURITY: f64 = 0.25;

/// Default premium budget as a fraction of notional.
pub const DEFAULT_BUDGET_FRACTION: f64 = 0.02;

/// Sizing parameters of the overlay.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OverlayConfig {
    /// Portfolio value at inception.
    pub notional: f64,
    /// Put strike as a fraction of the inception spot.
    pub put_strike_pct: f64,
    /// Put maturity in years.
    pub put_maturity: f64,
    /// Maximum premium spend as a fraction of notional.
    pub budget_fraction: f64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            notional: DEFAULT_NOTIONAL,
            put_strike_pct: DEFAULT_PUT_STRIKE_PCT,
            put_maturity: DEFAULT_PUT_MATURITY,
            budget_fraction: DEFAULT_BUDGET_FRACTION,
        }
    }
}

impl OverlayConfig {
    /// Checks that every field is in range.
    ///
    /// # Errors
    /// [`OverlayError::InvalidConfig`] for a non-positive notional, strike
    /// fraction or maturity, or a budget outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), OverlayError> {
        for (name, value) in [
            ("notional", self.notional),
            ("put_strike_pct", self.put_strike_pct),
            ("put_maturity", self.put_maturity),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(OverlayError::InvalidConfig { name, value });
            }
        }
        if !(0.0..=1.0).contains(&self.budget_fraction) {
            return Err(OverlayError::InvalidConfig {
                name: "budget_fraction",
                value: self.budget_fraction,
            });
        }
        Ok(())
    }
}

/// Horizon returns of the two portfolios along one path.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OverlayReturns {
    /// Underlying only.
    pub unhedged: f64,
    /// Underlying plus puts, net of premium.
    pub hedged: f64,
}

/// Returns of both portfolios across simulated paths.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OverlayResult {
    /// Horizon return of the underlying-only portfolio, per path.
    pub unhedged_returns: Vec<f64>,
    /// Horizon return of the overlay portfolio, per path.
    pub hedged_returns: Vec<f64>,
    /// Puts bought.
    pub hedge_units: f64,
    /// Premium spent.
    pub premium_paid: f64,
    /// Premium allowed by the budget.
    pub premium_budget: f64,
    /// Puts bought per unit of underlying held.
    pub coverage_ratio: f64,
}

impl OverlayResult {
    /// Risk summaries of the unhedged and hedged returns, read as return
    /// series: the drawdown compounds them and the volatility is annualised
    /// over trading days.
    ///
    /// # Errors
    /// As [`RiskSummary::from_returns`].
    pub fn summaries(&self, confidence: f64) -> Result<(RiskSummary, RiskSummary), PricingError> {
        let summarise =
            |returns: &[f64]| RiskSummary::from_returns(returns, confidence, TRADING_DAYS_PER_YEAR);
        Ok((summarise(&self.unhedged_returns)?, summarise(&self.hedged_returns)?))
    }
}

/// A sized protective put overlay.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::GbmParams;
/// use pricer_risk::overlay::{OverlayConfig, ProtectivePutOverlay};
///
/// let market = GbmParams::new(100.0, 0.02, 0.0, 0.2, 1.0);
/// let overlay = ProtectivePutOverlay::new(OverlayConfig::default(), market).unwrap();
/// // 2% of notional buys more than full cover, so the overlay is capped
/// assert_eq!(overlay.coverage_ratio(), 1.0);
///
/// let crash = overlay.apply(&[100.0, 80.0, 70.0, 75.0, 90.0]).unwrap();
/// assert!(crash.hedged > crash.unhedged);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ProtectivePutOverlay {
    config: OverlayConfig,
    market: GbmParams,
    put: OptionSpec,
    put_premium: f64,
    units_underlying: f64,
    hedge_units: f64,
}

impl ProtectivePutOverlay {
    /// Prices the put under Black-Scholes and sizes the hedge.
    ///
    /// `market.maturity` is the overlay horizon.
    ///
    /// # Errors
    /// `InvalidParameter` for an invalid configuration or market, or a put
    /// that outlives the horizon.
    pub fn new(config: OverlayConfig, market: GbmParams) -> Result<Self, PricingError> {
        config.validate()?;
        market.validate()?;
        if config.put_maturity > market.maturity {
            return Err(OverlayError::PutOutlivesHorizon {
                put_maturity: config.put_maturity,
                horizon: market.maturity,
            }
            .into());
        }

        let put = OptionSpec::european_put(
            market.spot,
            config.put_strike_pct * market.spot,
            config.put_maturity,
            market.rate,
            market.volatility,
        )
        .with_dividend_yield(market.dividend_yield);
        let put_premium = BlackScholes::new(&put)?.price();
        let units_underlying = config.notional / market.spot;
        let budget = config.budget_fraction * config.notional;
        let affordable = if put_premium > 0.0 { budget / put_premium } else { 0.0 };

        Ok(Self {
            config,
            market,
            put,
            put_premium,
            units_underlying,
            hedge_units: units_underlying.min(affordable),
        })
    }

    /// Sizing parameters.
    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// The put bought at inception.
    pub fn put_spec(&self) -> &OptionSpec {
        &self.put
    }

    /// Black-Scholes premium of one put.
    pub fn put_premium(&self) -> f64 {
        self.put_premium
    }

    /// Units of underlying held.
    pub fn units_underlying(&self) -> f64 {
        self.units_underlying
    }

    /// Puts bought.
    pub fn hedge_units(&self) -> f64 {
        self.hedge_units
    }

    /// Premium spent on the puts.
    pub fn premium_paid(&self) -> f64 {
        self.hedge_units * self.put_premium
    }

    /// Premium allowed by the budget.
    pub fn premium_budget(&self) -> f64 {
        self.config.budget_fraction * self.config.notional
    }

    /// Puts bought per unit of underlying held.
    pub fn coverage_ratio(&self) -> f64 {
        if self.units_underlying > 0.0 {
            self.hedge_units / self.units_underlying
        } else {
            0.0
        }
    }

    /// Horizon returns along a price path of `n + 1` observations spanning
    /// the overlay horizon.
    ///
    /// The put settles at the observation nearest to its maturity (at least
    /// the first step after inception).
    ///
    /// # Errors
    /// `InvalidPath` for fewer than two observations or a non-positive price.
    pub fn apply(&self, path: &[f64]) -> Result<OverlayReturns, PricingError> {
        if path.len() < 2 {
            return Err(PricingError::InvalidPath(format!(
                "need at least 2 observations, got {}",
                path.len()
            )));
        }
        if let Some(s) = path.iter().find(|s| !(**s > 0.0 && s.is_finite())) {
            return Err(PricingError::InvalidPath(format!("{} is not a positive price", s)));
        }

        let n_steps = path.len() - 1;
        let put_fraction = self.config.put_maturity / self.market.maturity;
        let put_step = ((put_fraction * n_steps as f64).round() as usize).clamp(1, n_steps);
        let terminal = path[n_steps];

        let unhedged_value = self.units_underlying * terminal;
        let put_payoff = self.hedge_units * self.put.payoff(path[put_step]);
        let carry = self.market.maturity - self.config.put_maturity;
        let grown = put_payoff * (self.market.rate * carry).exp();
        let hedged_value = unhedged_value - self.premium_paid() + grown;

        Ok(OverlayReturns {
            unhedged: unhedged_value / self.config.notional - 1.0,
            hedged: hedged_value / self.config.notional - 1.0,
        })
    }

    /// Horizon returns along a path of simple per-period returns of the
    /// underlying, starting from the inception spot.
    ///
    /// # Errors
    /// `InvalidPath` for an empty series or a return at or below -100%.
    pub fn apply_returns(&self, returns: &[f64]) -> Result<OverlayReturns, PricingError> {
        if returns.is_empty() {
            return Err(PricingError::InvalidPath("empty return series".to_string()));
        }
        let path: Vec<f64> = std::iter::once(self.market.spot)
            .chain(returns.iter().scan(self.market.spot, |s, r| {
                *s *= 1.0 + r;
                Some(*s)
            }))
            .collect();
        self.apply(&path)
    }

    /// Simulates `n_paths` exact GBM paths over the horizon and applies the
    /// overlay to each.
    ///
    /// # Errors
    /// `InvalidParameter` for zero path or step counts.
    pub fn simulate(
        &self,
        n_paths: usize,
        n_steps: usize,
        seed: u64,
    ) -> Result<OverlayResult, PricingError> {
        let mut rng = PricerRng::from_seed(seed);
        let paths = generate_gbm_paths(
            &self.market,
            n_paths,
            n_steps,
            Discretisation::Exact,
            &mut rng,
        )?;
        let mut unhedged_returns = Vec::with_capacity(n_paths);
        let mut hedged_returns = Vec::with_capacity(n_paths);
        for path in paths.iter() {
            let r = self.apply(path)?;
            unhedged_returns.push(r.unhedged);
            hedged_returns.push(r.hedged);
        }
        tracing::debug!(
            n_paths,
            coverage = self.coverage_ratio(),
            premium = self.premium_paid(),
            "protective put overlay simulated"
        );
        Ok(OverlayResult {
            unhedged_returns,
            hedged_returns,
            hedge_units: self.hedge_units,
            premium_paid: self.premium_paid(),
            premium_budget: self.premium_budget(),
            coverage_ratio: self.coverage_ratio(),
        })
    }
}
