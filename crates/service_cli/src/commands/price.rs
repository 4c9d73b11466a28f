//! Price command implementation
//!
//! Prices one contract with every engine and reports the gap to the
//! Black-Scholes closed form.

use pricer_core::traits::PricingEngine;
use pricer_core::types::{ExerciseStyle, Greeks, OptionSpec, OptionType};
use pricer_models::analytical::{put_call_parity_residual, BlackScholes, BlackScholesEngine};
use pricer_models::lattice::BinomialTreeEngine;
use pricer_models::models::{HestonEngine, HestonQuadrature};
use pricer_models::pde::FiniteDifferenceEngine;
use pricer_pricing::mc::{HestonMonteCarloEngine, MonteCarloEngine};
use pricer_risk::model_risk::{compare_engines, max_disagreement, EngineComparison};
use serde::Serialize;
use tracing::info;

use super::{describe, Context, ContractArgs};
use crate::output::{self, num, opt_num, Table};
use crate::Result;

/// Result of the price command.
#[derive(Debug, Clone, Serialize)]
pub struct PriceReport {
    pub contract: OptionSpec,
    pub tolerance: f64,
    pub engines: Vec<EngineComparison>,
    pub max_disagreement: f64,
    pub black_scholes_greeks: Greeks,
    /// `C - P - (S e^{-qT} - K e^{-rT})` from the closed form.
    pub put_call_parity_residual: f64,
    pub american: Option<AmericanReport>,
}

/// Early-exercise value from the binomial tree.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AmericanReport {
    pub tree_steps: usize,
    pub european: f64,
    pub american: f64,
    pub early_exercise_premium: f64,
}

/// Run the price command
pub fn run(ctx: &Context, contract: &ContractArgs, american: bool, heston_mc: bool) -> Result<()> {
    let spec = contract.resolve(&ctx.config)?;
    info!("Pricing {}", describe(&spec));
    let report = build_report(ctx, &spec, american, heston_mc)?;
    output::emit(ctx.format, &report, tables)
}

fn build_report(
    ctx: &Context,
    spec: &OptionSpec,
    american: bool,
    heston_mc: bool,
) -> Result<PriceReport> {
    let engines_config = &ctx.config.engines;
    let heston_params = ctx.config.heston.params()?;
    let mc_config = engines_config.monte_carlo()?;

    let bs = BlackScholesEngine::default();
    let tree = BinomialTreeEngine::new(engines_config.tree_steps);
    let pde = FiniteDifferenceEngine::new(engines_config.pde());
    let heston = HestonEngine::new(heston_params, HestonQuadrature::default())?;
    let mc = MonteCarloEngine::new(mc_config.clone());
    let heston_sim = HestonMonteCarloEngine::new(heston_params, mc_config)?;

    let mut engines: Vec<&dyn PricingEngine> = vec![&bs, &tree, &pde, &heston, &mc];
    if heston_mc {
        engines.push(&heston_sim);
    }
    let rows = compare_engines(spec, &engines, engines_config.model_tolerance)?;

    let closed_form = BlackScholes::new(spec)?;
    let flipped = match spec.option_type {
        OptionType::Call => OptionType::Put,
        OptionType::Put => OptionType::Call,
    };
    let other = BlackScholes::new(&spec.with_option_type(flipped))?.price();
    let (call, put) = match spec.option_type {
        OptionType::Call => (closed_form.price(), other),
        OptionType::Put => (other, closed_form.price()),
    };

    let american = if american {
        let european = tree.price(spec)?.price;
        let early = tree.price(&spec.with_exercise(ExerciseStyle::American))?.price;
        Some(AmericanReport {
            tree_steps: engines_config.tree_steps,
            european,
            american: early,
            early_exercise_premium: early - european,
        })
    } else {
        None
    };

    Ok(PriceReport {
        contract: *spec,
        tolerance: engines_config.model_tolerance,
        max_disagreement: max_disagreement(&rows),
        engines: rows,
        black_scholes_greeks: closed_form.greeks(),
        put_call_parity_residual: put_call_parity_residual(call, put, spec),
        american,
    })
}

fn tables(report: &PriceReport) -> Vec<Table> {
    let header = ["Engine", "Price", "Delta", "Std Error", "|Diff| vs BS", "Agrees"];
    let mut engines = Table::new(header)
        .with_title(format!("Engine comparison ({})", describe(&report.contract)));
    for row in &report.engines {
        engines.row([
            row.engine.clone(),
            num(row.price, 6),
            opt_num(row.delta, 6),
            opt_num(row.std_error, 6),
            num(row.abs_diff_vs_reference, 6),
            if row.within_tolerance { "yes" } else { "NO" }.to_string(),
        ]);
    }

    let g = &report.black_scholes_greeks;
    let greeks = Table::key_values(
        "Black-Scholes Greeks",
        [
            ("delta", opt_num(g.delta, 6)),
            ("gamma", opt_num(g.gamma, 6)),
            ("vega", opt_num(g.vega, 6)),
            ("theta", opt_num(g.theta, 6)),
            ("rho", opt_num(g.rho, 6)),
            ("parity residual", format!("{:.2e}", report.put_call_parity_residual)),
            ("max disagreement", num(report.max_disagreement, 6)),
        ],
    );

    let mut out = vec![engines, greeks];
    if let Some(a) = &report.american {
        out.push(Table::key_values(
            &format!("Early exercise ({} tree steps)", a.tree_steps),
            [
                ("european", num(a.european, 6)),
                ("american", num(a.american, 6)),
                ("premium", num(a.early_exercise_premium, 6)),
            ],
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::output::OutputFormat;
    use approx::assert_abs_diff_eq;

    fn context() -> Context {
        let mut config = AppConfig::default();
        config.engines.mc_paths = 50_000;
        config.engines.tree_steps = 400;
        config.engines.pde_price_steps = 200;
        config.engines.pde_time_steps = 200;
        Context {
            config,
            format: OutputFormat::Table,
        }
    }

    #[test]
    fn test_report_lists_every_engine() {
        let ctx = context();
        let spec = ctx.config.contract.to_spec();
        let report = build_report(&ctx, &spec, false, true).unwrap();

        let names: Vec<&str> = report.engines.iter().map(|r| r.engine.as_str()).collect();
        assert_eq!(names.len(), 6);
        assert_eq!(names[0], "black-scholes");
        assert_eq!(names[1], "binomial-crr");
        assert_abs_diff_eq!(report.put_call_parity_residual, 0.0, epsilon = 1e-10);
        assert!(report.american.is_none());
        // default Heston parameters imply a smile, so the gap is flagged
        assert!(!report.engines[3].within_tolerance);
        assert!(report.max_disagreement >= report.engines[3].abs_diff_vs_reference);
    }

    #[test]
    fn test_american_put_premium() {
        let ctx = context();
        let spec = ctx.config.contract.to_spec().with_option_type(OptionType::Put).with_rate(0.05);
        let report = build_report(&ctx, &spec, true, false).unwrap();
        let american = report.american.unwrap();
        assert!(american.early_exercise_premium > 0.0);
        assert_eq!(american.tree_steps, 400);
    }

    #[test]
    fn test_tables_render() {
        let ctx = context();
        let spec = ctx.config.contract.to_spec();
        let report = build_report(&ctx, &spec, true, false).unwrap();
        let rendered: Vec<String> = tables(&report).iter().map(Table::render).collect();
        assert_eq!(rendered.len(), 3);
        assert!(rendered[0].contains("black-scholes"));
        assert!(rendered[1].contains("vega"));
    }
}
