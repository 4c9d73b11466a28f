//! Cross-model comparison on a single contract.
//!
//! Every engine prices the same [`OptionSpec`]; prices are compared with the
//! Black-Scholes closed form. A gap beyond the tolerance is a model-risk
//! signal carried in the report, not an error.

use pricer_core::traits::PricingEngine;
use pricer_core::types::{OptionSpec, PricingError};
use pricer_models::analytical::BlackScholes;
use rayon::prelude::*;

/// Price gap, in currency units, below which engines are said to agree.
pub const DEFAULT_MODEL_TOLERANCE: f64 = 0.05;

/// One engine's result against the Black-Scholes reference.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineComparison {
    /// Engine name.
    pub engine: String,
    /// Engine price.
    pub price: f64,
    /// Engine delta, when the engine reports one.
    pub delta: Option<f64>,
    /// Monte Carlo standard error, when applicable.
    pub std_error: Option<f64>,
    /// Black-Scholes price of the same contract.
    pub reference_price: f64,
    /// `|price - reference_price|`.
    pub abs_diff_vs_reference: f64,
    /// Whether the gap is within the tolerance.
    pub within_tolerance: bool,
}

/// Prices `spec` with every engine and compares against Black-Scholes.
///
/// Rows keep the order of `engines`.
///
/// # Errors
/// `InvalidParameter` if `spec` cannot be priced by Black-Scholes (e.g. no
/// volatility) or `tolerance` is negative; otherwise the first engine error.
/// A disagreement is never an error.
///
/// # Examples
///
/// ```rust
/// use pricer_core::traits::PricingEngine;
/// use pricer_core::types::OptionSpec;
/// use pricer_models::analytical::BlackScholesEngine;
/// use pricer_models::lattice::BinomialTreeEngine;
/// use pricer_risk::model_risk::compare_engines;
///
/// let spec = OptionSpec::european_call(100.0, 100.0, 1.0, 0.05, 0.2);
/// let bs = BlackScholesEngine::default();
/// let tree = BinomialTreeEngine::new(500);
/// let engines: [&dyn PricingEngine; 2] = [&bs, &tree];
/// let rows = compare_engines(&spec, &engines, 0.05).unwrap();
/// assert_eq!(rows[1].engine, "binomial-crr");
/// assert!(rows.iter().all(|row| row.within_tolerance));
/// ```
pub fn compare_engines(
    spec: &OptionSpec,
    engines: &[&dyn PricingEngine],
    tolerance: f64,
) -> Result<Vec<EngineComparison>, PricingError> {
    if !(tolerance >= 0.0 && tolerance.is_finite()) {
        return Err(PricingError::InvalidParameter(format!(
            "tolerance = {} (must be non-negative and finite)",
            tolerance
        )));
    }
    let reference_price = BlackScholes::new(spec)?.price();

    let rows = engines
        .par_iter()
        .map(|engine| {
            let result = engine.price(spec)?;
            let diff = (result.price - reference_price).abs();
            Ok(EngineComparison {
                engine: engine.name().to_string(),
                price: result.price,
                delta: result.delta(),
                std_error: result.std_error,
                reference_price,
                abs_diff_vs_reference: diff,
                within_tolerance: diff <= tolerance,
            })
        })
        .collect::<Result<Vec<_>, PricingError>>()?;

    for row in rows.iter().filter(|row| !row.within_tolerance) {
        tracing::info!(
            engine = %row.engine,
            price = row.price,
            reference = reference_price,
            diff = row.abs_diff_vs_reference,
            "engine disagrees with Black-Scholes"
        );
    }
    Ok(rows)
}

/// Largest absolute gap to the reference across the rows (zero if empty).
pub fn max_disagreement(rows: &[EngineComparison]) -> f64 {
    rows.iter()
        .map(|row| row.abs_diff_vs_reference)
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pricer_models::analytical::BlackScholesEngine;
    use pricer_models::lattice::BinomialTreeEngine;
    use pricer_models::models::{HestonEngine, HestonParams, HestonQuadrature};
    use pricer_models::pde::{FiniteDifferenceEngine, PdeConfig};
    use pricer_pricing::mc::{MonteCarloConfig, MonteCarloEngine};

    fn spec() -> OptionSpec {
        OptionSpec::european_call(100.0, 100.0, 1.0, 0.05, 0.2)
    }

    #[test]
    fn test_all_five_engines_agree() {
        let bs = BlackScholesEngine::default();
        let tree = BinomialTreeEngine::new(500);
        let pde = FiniteDifferenceEngine::new(PdeConfig::default());
        let flat = HestonParams::new(0.04, 2.0, 0.04, 1e-4, 0.0).unwrap();
        let heston = HestonEngine::new(flat, HestonQuadrature::default()).unwrap();
        let mc = MonteCarloEngine::new(
            MonteCarloConfig::builder()
                .n_paths(200_000)
                .control_variate(true)
                .build()
                .unwrap(),
        );
        let engines: [&dyn PricingEngine; 5] = [&bs, &tree, &pde, &heston, &mc];

        let rows = compare_engines(&spec(), &engines, DEFAULT_MODEL_TOLERANCE).unwrap();
        assert_eq!(rows.len(), 5);
        for row in &rows {
            assert!(row.within_tolerance, "{:?}", row);
            assert!(row.delta.is_some(), "{} reports no delta", row.engine);
        }
        assert_eq!(rows[0].abs_diff_vs_reference, 0.0);
        assert!(rows[4].std_error.is_some());
        assert!(max_disagreement(&rows) < DEFAULT_MODEL_TOLERANCE);
    }

    #[test]
    fn test_stochastic_volatility_flagged_not_raised() {
        let spec = OptionSpec::european_call(100.0, 100.0, 1.0, 0.0, 0.2);
        let heston =
            HestonEngine::new(HestonParams::default(), HestonQuadrature::default()).unwrap();
        let engines: [&dyn PricingEngine; 1] = [&heston];
        let rows = compare_engines(&spec, &engines, DEFAULT_MODEL_TOLERANCE).unwrap();
        assert!(!rows[0].within_tolerance);
        // 7.9656 under Black-Scholes against 7.2475 under Heston
        assert_relative_eq!(rows[0].abs_diff_vs_reference, 0.718, epsilon = 0.01);
    }

    #[test]
    fn test_needs_reference_volatility() {
        let bs = BlackScholesEngine::default();
        let engines: [&dyn PricingEngine; 1] = [&bs];
        assert!(compare_engines(&spec().without_volatility(), &engines, 0.05).is_err());
        assert!(compare_engines(&spec(), &engines, -1.0).is_err());
    }

    #[test]
    fn test_empty_engine_list() {
        let rows = compare_engines(&spec(), &[], 0.05).unwrap();
        assert!(rows.is_empty());
        assert_eq!(max_disagreement(&rows), 0.0);
    }
}
