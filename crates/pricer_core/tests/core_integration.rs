//! Integration tests across pricer_core modules.
//!
//! Exercises the public API the way the engine crates use it: price series
//! feeding volatility estimates, the tridiagonal solver on a discretised
//! boundary-value problem, quadrature on a density, and lower-level errors
//! propagating into `PricingError` through `?`.

use approx::assert_relative_eq;
use chrono::{Datelike, NaiveDate};
use pricer_core::market_data::{
    PriceSeries, DEFAULT_MAX_GAP_DAYS, DEFAULT_MIN_OBSERVATIONS, DEFAULT_VOL_WINDOW,
    TRADING_DAYS_PER_YEAR,
};
use pricer_core::math::interpolators::{Interpolator, LinearInterpolator};
use pricer_core::math::quadrature::GaussLegendre;
use pricer_core::math::solvers::{NewtonRaphsonSolver, SolverConfig};
use pricer_core::math::tridiagonal::TridiagonalSystem;
use pricer_core::types::{OptionSpec, PricingError};

/// Business-day series whose log returns alternate between `+step` and `-step`.
fn zigzag_series(n: usize, step: f64) -> PriceSeries {
    let mut date = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
    let mut price = 100.0;
    let mut obs = Vec::with_capacity(n);
    while obs.len() < n {
        if date.weekday().number_from_monday() <= 5 {
            obs.push((date, price));
            let sign = if obs.len() % 2 == 0 { -1.0 } else { 1.0 };
            price *= (sign * step).exp();
        }
        date = date.succ_opt().unwrap();
    }
    PriceSeries::new(obs)
}

// ========================================
// Market data
// ========================================

#[test]
fn test_series_ready_and_volatility_recovered() {
    let step = 0.01;
    let series = zigzag_series(300, step);
    let start = NaiveDate::from_ymd_opt(2022, 1, 1);
    assert!(series
        .ensure_ready(start, DEFAULT_MIN_OBSERVATIONS, DEFAULT_MAX_GAP_DAYS)
        .is_ok());

    let expected = step * TRADING_DAYS_PER_YEAR.sqrt();
    let realized = series.realized_volatility(TRADING_DAYS_PER_YEAR).unwrap();
    assert_relative_eq!(realized, expected, max_relative = 0.01);

    let rolling = series
        .rolling_volatility(DEFAULT_VOL_WINDOW, TRADING_DAYS_PER_YEAR)
        .unwrap();
    assert_eq!(rolling.len(), 299 - DEFAULT_VOL_WINDOW + 1);
    for vol in rolling {
        assert_relative_eq!(vol, expected, max_relative = 0.05);
    }
}

#[test]
fn test_unordered_file_cleaned_before_use() {
    let d = |day| NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
    let raw = PriceSeries::new(vec![
        (d(5), 102.0),
        (d(4), 101.0),
        (d(4), 101.5),
        (d(6), f64::NAN),
        (d(7), 103.0),
    ]);
    assert!(matches!(
        raw.ensure_ready(None, 2, DEFAULT_MAX_GAP_DAYS),
        Err(PricingError::InvalidPath(_))
    ));

    let cleaned = raw.cleaned();
    assert_eq!(cleaned.prices(), vec![101.5, 102.0, 103.0]);
    assert!(cleaned.ensure_ready(None, 2, DEFAULT_MAX_GAP_DAYS).is_ok());
    assert_eq!(cleaned.first_date(), Some(d(4)));
}

// ========================================
// Numerical building blocks
// ========================================

#[test]
fn test_tridiagonal_solves_discrete_poisson_problem() {
    // -u'' = 2 on (0, 1), u(0) = u(1) = 0: u = x (1 - x), exact under central differences
    let n = 99;
    let h = 1.0 / (n + 1) as f64;
    let off = -1.0 / (h * h);
    let mut system =
        TridiagonalSystem::new(vec![off; n], vec![2.0 / (h * h); n], vec![off; n]).unwrap();
    let mut u = vec![0.0; n];
    system.solve(&vec![2.0; n], &mut u).unwrap();

    for (i, value) in u.iter().enumerate() {
        let x = (i + 1) as f64 * h;
        assert!((value - x * (1.0 - x)).abs() < 1e-9);
    }
}

#[test]
fn test_quadrature_integrates_normal_density() {
    let gl = GaussLegendre::new(16).unwrap();
    let density = |x: f64| (-0.5 * x * x).exp() / (2.0 * std::f64::consts::PI).sqrt();
    assert_relative_eq!(gl.integrate(density, -8.0, 8.0, 8), 1.0, epsilon = 1e-12);
    assert_relative_eq!(gl.integrate(density, 0.0, 8.0, 4), 0.5, epsilon = 1e-12);
}

#[test]
fn test_interpolated_curve_between_knots() {
    let curve =
        LinearInterpolator::new(&[0.25_f64, 0.5, 1.0, 2.0], &[0.18, 0.19, 0.2, 0.22]).unwrap();
    assert_relative_eq!(curve.interpolate(0.75).unwrap(), 0.195, epsilon = 1e-12);
    assert_eq!(curve.domain(), (0.25, 2.0));

    let out_of_range: Result<f64, PricingError> = curve.interpolate(3.0).map_err(Into::into);
    assert!(matches!(out_of_range, Err(PricingError::InvalidParameter(_))));
}

// ========================================
// Error propagation
// ========================================

fn spot_for_forward(spec: &OptionSpec, target: f64) -> Result<f64, PricingError> {
    let solver = NewtonRaphsonSolver::new(SolverConfig::default());
    let df = spec.dividend_discount() / spec.discount_factor();
    let spot = solver.find_root_bracketed(|s: f64| s * df - target, |_| df, 1e-6, 1e3, spec.spot)?;
    Ok(spot)
}

#[test]
fn test_solver_errors_propagate_as_pricing_errors() {
    let spec = OptionSpec::european_call(100.0, 100.0, 1.0, 0.05, 0.2);
    let spot = spot_for_forward(&spec, 110.0).unwrap();
    assert_relative_eq!(spot * (0.05_f64).exp(), 110.0, epsilon = 1e-8);

    // a forward above the bracket has no root
    assert!(matches!(
        spot_for_forward(&spec, 1e6),
        Err(PricingError::NoConvergence(_))
    ));
}
