//! Shared capability interface for pricing engines.
//!
//! Each engine (lattice, closed form, simulation, PDE, stochastic volatility)
//! is a standalone algorithm implementing [`PricingEngine`]; none is a
//! specialisation of another. The trait is object safe so heterogeneous
//! engines can be compared through `&dyn PricingEngine`.

use crate::types::{OptionSpec, PricingError, PricingResult};

/// Prices a vanilla option and derives its hedge ratio.
///
/// # Contract
///
/// - Inputs are validated eagerly; an engine never returns NaN silently.
/// - A call either fully succeeds or fails as a whole.
/// - Engines are pure with respect to `self`: repeated calls with the same
///   spec return identical results.
///
/// # Examples
///
/// ```
/// use pricer_core::traits::PricingEngine;
/// use pricer_core::types::{Greeks, OptionSpec, PricingError, PricingResult};
///
/// /// Prices every option at intrinsic value.
/// struct IntrinsicEngine;
///
/// impl PricingEngine for IntrinsicEngine {
///     fn name(&self) -> &str {
///         "intrinsic"
///     }
///
///     fn price(&self, spec: &OptionSpec) -> Result<PricingResult, PricingError> {
///         spec.validate()?;
///         let intrinsic = spec.intrinsic(spec.spot);
///         let delta = if intrinsic > 0.0 { spec.option_type.sign() } else { 0.0 };
///         Ok(PricingResult::new(intrinsic).with_greeks(Greeks::delta_only(delta)))
///     }
/// }
///
/// let spec = OptionSpec::european_call(110.0, 100.0, 1.0, 0.0, 0.2);
/// assert_eq!(IntrinsicEngine.price(&spec).unwrap().price, 10.0);
/// assert_eq!(IntrinsicEngine.delta(&spec).unwrap(), 1.0);
/// assert!(IntrinsicEngine.implied_volatility(&spec, 12.0).is_err());
/// ```
pub trait PricingEngine: Send + Sync {
    /// Short identifier used in logs and comparison reports.
    fn name(&self) -> &str;

    /// Prices the option.
    fn price(&self, spec: &OptionSpec) -> Result<PricingResult, PricingError>;

    /// Hedge ratio ∂V/∂S.
    ///
    /// The default implementation prices the option and reads the delta from
    /// the result; engines with a cheaper route override it.
    fn delta(&self, spec: &OptionSpec) -> Result<f64, PricingError> {
        let result = self.price(spec)?;
        result.delta().ok_or_else(|| {
            PricingError::InvalidParameter(format!(
                "engine '{}' does not produce delta",
                self.name()
            ))
        })
    }

    /// Volatility reproducing `market_price` under this engine.
    ///
    /// Optional capability; the default reports that it is unsupported.
    fn implied_volatility(
        &self,
        spec: &OptionSpec,
        market_price: f64,
    ) -> Result<f64, PricingError> {
        let _ = (spec, market_price);
        Err(PricingError::InvalidParameter(format!(
            "engine '{}' does not support implied volatility",
            self.name()
        )))
    }
}
