//! Criterion benchmarks for pricer_core numeric routines.
//!
//! Measures linear interpolation lookup, the Thomas algorithm and
//! Gauss-Legendre integration across problem sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pricer_core::math::interpolators::{Interpolator, LinearInterpolator};
use pricer_core::math::quadrature::GaussLegendre;
use pricer_core::math::tridiagonal::TridiagonalSystem;

/// Generate test data for 1D interpolation benchmarks.
fn generate_1d_data(n: usize) -> (Vec<f64>, Vec<f64>) {
    let xs: Vec<f64> = (0..n).map(|i| i as f64 / (n - 1) as f64).collect();
    let ys: Vec<f64> = xs.iter().map(|&x| x.sin() + 0.5 * x * x).collect();
    (xs, ys)
}

/// Benchmark linear interpolation construction and lookup.
fn bench_linear_interpolation(c: &mut Criterion) {
    let mut group = c.benchmark_group("linear_interpolation");

    for size in [100, 1000, 10000] {
        let (xs, ys) = generate_1d_data(size);

        group.bench_with_input(
            BenchmarkId::new("construction", size),
            &(&xs, &ys),
            |b, (xs, ys)| {
                b.iter(|| LinearInterpolator::new(black_box(xs), black_box(ys)).unwrap());
            },
        );

        let interp = LinearInterpolator::new(&xs, &ys).unwrap();
        group.bench_with_input(BenchmarkId::new("lookup", size), &interp, |b, interp| {
            b.iter(|| interp.interpolate(black_box(0.5)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark one tridiagonal solve, the per-step cost of the PDE engine.
fn bench_tridiagonal(c: &mut Criterion) {
    let mut group = c.benchmark_group("tridiagonal_solve");

    for size in [100, 400, 1600] {
        let mut system =
            TridiagonalSystem::new(vec![-1.0; size], vec![4.0; size], vec![-1.0; size]).unwrap();
        let rhs = vec![1.0; size];
        let mut x = vec![0.0; size];
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            b.iter(|| system.solve(black_box(&rhs), &mut x).unwrap());
        });
    }

    group.finish();
}

/// Benchmark rule construction and composite integration.
fn bench_quadrature(c: &mut Criterion) {
    let mut group = c.benchmark_group("gauss_legendre");

    group.bench_function("construct_16", |b| {
        b.iter(|| GaussLegendre::new(black_box(16)).unwrap());
    });

    let rule = GaussLegendre::new(16).unwrap();
    for panels in [10, 40, 160] {
        group.bench_function(BenchmarkId::new("integrate", panels), |b| {
            b.iter(|| rule.integrate(|x| (-x).exp() * x.cos(), 0.0, 50.0, black_box(panels)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_linear_interpolation,
    bench_tridiagonal,
    bench_quadrature
);
criterion_main!(benches);
