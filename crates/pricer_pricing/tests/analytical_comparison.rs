//! Analytical comparison tests for Monte Carlo pricing.
//!
//! These tests verify that Monte Carlo estimates agree with closed-form and
//! semi-closed-form prices within their reported sampling error.
//!
//! # Test Categories
//!
//! 1. **Black-Scholes**: GBM estimates vs the closed form across strikes
//! 2. **Interval Coverage**: repeated seeds cover the true price at the stated level
//! 3. **Convergence**: standard error shrinks as the path count grows
//! 4. **Heston**: full-truncation Monte Carlo vs the characteristic-function price
//! 5. **Expiry**: every engine collapses to intrinsic value at zero maturity

use approx::assert_relative_eq;
use pricer_core::traits::PricingEngine;
use pricer_core::types::{OptionSpec, OptionType};
use pricer_models::analytical::{BlackScholes, BlackScholesEngine};
use pricer_models::lattice::BinomialTreeEngine;
use pricer_models::models::{HestonEngine, HestonParams, HestonQuadrature};
use pricer_models::pde::{FiniteDifferenceEngine, PdeConfig};
use pricer_pricing::mc::{
    Discretisation, HestonMonteCarloEngine, MonteCarloConfig, MonteCarloEngine,
};
use proptest::prelude::*;

/// Standard test contract: spot, strike, maturity, rate, vol.
fn standard_spec() -> OptionSpec {
    OptionSpec::european_call(100.0, 100.0, 1.0, 0.05, 0.2)
}

fn config(n_paths: usize, seed: u64) -> MonteCarloConfig {
    MonteCarloConfig::builder()
        .n_paths(n_paths)
        .seed(seed)
        .build()
        .unwrap()
}

// ============================================================================
// Black-Scholes Comparison Tests
// ============================================================================

#[test]
fn test_mc_vs_black_scholes_across_strikes() {
    let engine = MonteCarloEngine::new(config(200_000, 42)).with_greeks(false);

    for option_type in [OptionType::Call, OptionType::Put] {
        for strike in [80.0, 100.0, 120.0] {
            let spec = standard_spec()
                .with_strike(strike)
                .with_option_type(option_type)
                .with_dividend_yield(0.01);
            let analytical = BlackScholes::new(&spec).unwrap().price();
            let est = engine.estimate(&spec).unwrap();

            let error = (est.price - analytical).abs();
            assert!(
                error < 4.0 * est.std_error,
                "{:?} K={}: MC={:.4}, Analytical={:.4}, Error={:.4}, SE={:.4}",
                option_type,
                strike,
                est.price,
                analytical,
                error,
                est.std_error
            );
        }
    }
}

#[test]
fn test_put_call_parity_holds_pathwise() {
    // Same normals for call and put: C - P equals the discounted forward
    // payoff sample mean, which the control variate pins exactly.
    let cfg = MonteCarloConfig::builder()
        .n_paths(50_000)
        .control_variate(true)
        .build()
        .unwrap();
    let engine = MonteCarloEngine::new(cfg);
    let call = engine.estimate(&standard_spec()).unwrap();
    let put = engine
        .estimate(&standard_spec().with_option_type(OptionType::Put))
        .unwrap();
    let parity = 100.0 - 100.0 * (-0.05_f64).exp();
    assert_relative_eq!(call.price - put.price, parity, epsilon = 1e-8);
}

// ============================================================================
// Interval Coverage Tests
// ============================================================================

#[test]
fn test_confidence_interval_coverage() {
    let spec = standard_spec();
    let truth = BlackScholes::new(&spec).unwrap().price();
    let runs = 100;

    let covered = (0..runs)
        .filter(|&seed| {
            let engine = MonteCarloEngine::new(config(4_000, seed)).with_greeks(false);
            let result = engine.price(&spec).unwrap();
            result.confidence_interval.unwrap().contains(truth)
        })
        .count();

    // 95% nominal; binomial(100, 0.95) falls below 87 with probability < 0.1%
    assert!(covered >= 87, "coverage {}/{}", covered, runs);
}

// ============================================================================
// Convergence Tests
// ============================================================================

#[test]
fn test_standard_error_shrinks_with_paths() {
    let spec = standard_spec();
    let small = MonteCarloEngine::new(config(10_000, 1)).estimate(&spec).unwrap();
    let large = MonteCarloEngine::new(config(160_000, 1)).estimate(&spec).unwrap();
    // 16x paths -> roughly 4x smaller error
    let ratio = small.std_error / large.std_error;
    assert!(ratio > 3.0 && ratio < 5.0, "ratio = {}", ratio);
}

#[test]
fn test_euler_scheme_matches_closed_form() {
    let spec = standard_spec();
    let euler = |n_steps: usize| {
        let cfg = MonteCarloConfig::builder()
            .n_paths(20_000)
            .n_steps(n_steps)
            .scheme(Discretisation::EulerMaruyama)
            .control_variate(true)
            .build()
            .unwrap();
        MonteCarloEngine::new(cfg).estimate(&spec).unwrap()
    };
    let fine = euler(100);
    let truth = BlackScholes::new(&spec).unwrap().price();
    assert!((fine.price - truth).abs() < 4.0 * fine.std_error + 0.02);
}

// ============================================================================
// Heston Comparison Tests
// ============================================================================

#[test]
fn test_heston_mc_vs_semi_closed_form_across_strikes() {
    let params = HestonParams::new(0.04, 1.5, 0.04, 0.3, -0.7).unwrap();
    let exact = HestonEngine::new(params, HestonQuadrature::default()).unwrap();
    let cfg = MonteCarloConfig::builder()
        .n_paths(60_000)
        .n_steps(100)
        .control_variate(true)
        .build()
        .unwrap();
    let mc = HestonMonteCarloEngine::new(params, cfg).unwrap();

    for strike in [90.0, 100.0, 110.0] {
        let spec = OptionSpec::european_put(100.0, strike, 0.5, 0.02, 0.2);
        let reference = exact.price_only(&spec).unwrap();
        let est = mc.estimate(&spec).unwrap();
        assert!(
            (est.price - reference).abs() < 4.0 * est.std_error + 0.02,
            "K={}: MC={:.4} ± {:.4}, semi-closed={:.4}",
            strike,
            est.price,
            est.std_error,
            reference
        );
    }
}

// ============================================================================
// Expiry Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_zero_maturity_is_intrinsic_for_every_engine(
        spot in 1.0..300.0_f64,
        strike in 1.0..300.0_f64,
        rate in -0.05..0.15_f64,
        vol in 0.01..2.0_f64,
        is_call in any::<bool>(),
    ) {
        let option_type = if is_call { OptionType::Call } else { OptionType::Put };
        let spec = OptionSpec::new(option_type, spot, strike, 0.0, rate, vol);
        let intrinsic = spec.intrinsic(spot);

        let engines: Vec<Box<dyn PricingEngine>> = vec![
            Box::new(BlackScholesEngine::default()),
            Box::new(BinomialTreeEngine::default()),
            Box::new(FiniteDifferenceEngine::new(PdeConfig::default())),
            Box::new(MonteCarloEngine::new(config(1_000, 7))),
        ];
        for engine in &engines {
            let result = engine.price(&spec).unwrap();
            prop_assert_eq!(result.price, intrinsic, "engine {}", engine.name());
        }
    }
}
