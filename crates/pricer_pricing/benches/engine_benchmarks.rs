//! Criterion benchmarks for the Monte Carlo engines.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pricer_core::types::OptionSpec;
use pricer_models::models::HestonParams;
use pricer_pricing::mc::{
    generate_gbm_paths, Discretisation, GbmParams, HestonMonteCarloEngine, MonteCarloConfig,
    MonteCarloEngine,
};
use pricer_pricing::rng::PricerRng;

fn atm_call() -> OptionSpec {
    OptionSpec::european_call(100.0, 100.0, 1.0, 0.02, 0.2)
}

fn bench_path_generation(c: &mut Criterion) {
    let params = GbmParams::default();
    let mut group = c.benchmark_group("gbm_paths");

    for n_paths in [100, 1_000] {
        group.bench_with_input(BenchmarkId::new("exact_252", n_paths), &n_paths, |b, &n| {
            b.iter(|| {
                let mut rng = PricerRng::from_seed(42);
                generate_gbm_paths(black_box(&params), n, 252, Discretisation::Exact, &mut rng)
                    .unwrap()
            });
        });
    }

    group.finish();
}

fn bench_monte_carlo(c: &mut Criterion) {
    let spec = atm_call();
    let mut group = c.benchmark_group("monte_carlo");
    group.sample_size(20);

    for n_paths in [10_000, 100_000] {
        let config = MonteCarloConfig::builder().n_paths(n_paths).build().unwrap();
        let engine = MonteCarloEngine::new(config);
        group.bench_with_input(BenchmarkId::new("exact", n_paths), &engine, |b, engine| {
            b.iter(|| engine.estimate(black_box(&spec)).unwrap());
        });
    }

    let euler = MonteCarloConfig::builder()
        .n_paths(10_000)
        .n_steps(252)
        .scheme(Discretisation::EulerMaruyama)
        .build()
        .unwrap();
    let engine = MonteCarloEngine::new(euler);
    group.bench_function("euler_252_steps", |b| {
        b.iter(|| engine.estimate(black_box(&spec)).unwrap());
    });

    let greeks =
        MonteCarloEngine::new(MonteCarloConfig::builder().n_paths(20_000).build().unwrap());
    group.bench_function("crn_greeks", |b| {
        b.iter(|| greeks.price_with_greeks(black_box(&spec)).unwrap());
    });

    group.finish();
}

fn bench_heston_mc(c: &mut Criterion) {
    let spec = atm_call();
    let mut group = c.benchmark_group("heston_mc");
    group.sample_size(10);

    let config = MonteCarloConfig::builder().n_paths(10_000).n_steps(100).build().unwrap();
    let engine = HestonMonteCarloEngine::new(HestonParams::default(), config).unwrap();
    group.bench_function("10k_paths_100_steps", |b| {
        b.iter(|| engine.estimate(black_box(&spec)).unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_path_generation, bench_monte_carlo, bench_heston_mc);
criterion_main!(benches);
