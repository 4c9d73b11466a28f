//! Smile command implementation
//!
//! Prices a strike ladder under Heston, backs out Black-Scholes implied
//! volatilities and reports the price gap to a flat-volatility model.

use pricer_core::types::OptionSpec;
use pricer_models::models::{
    generate_smile, HestonEngine, HestonParams, HestonQuadrature, SmilePoint,
};
use serde::Serialize;
use tracing::info;

use super::{describe, require_non_empty, Context, ContractArgs};
use crate::output::{self, num, opt_num, Table};
use crate::Result;

/// Strikes as fractions of spot when none are given.
pub const DEFAULT_MONEYNESS: [f64; 9] = [0.8, 0.85, 0.9, 0.95, 1.0, 1.05, 1.1, 1.15, 1.2];

/// Result of the smile command.
#[derive(Debug, Clone, Serialize)]
pub struct SmileReport {
    pub contract: OptionSpec,
    pub heston: HestonParams,
    pub feller_condition: bool,
    pub points: Vec<SmilePoint>,
}

/// Run the smile command
pub fn run(ctx: &Context, contract: &ContractArgs, strikes: &[f64]) -> Result<()> {
    let spec = contract.resolve(&ctx.config)?;
    let report = build_report(ctx, &spec, strikes)?;
    output::emit(ctx.format, &report, tables)
}

fn build_report(ctx: &Context, spec: &OptionSpec, strikes: &[f64]) -> Result<SmileReport> {
    let strikes: Vec<f64> = if strikes.is_empty() {
        DEFAULT_MONEYNESS.iter().map(|m| m * spec.spot).collect()
    } else {
        strikes.to_vec()
    };
    require_non_empty("--strikes", &strikes)?;

    let params = ctx.config.heston.params()?;
    info!("Heston smile for {} at {} strikes", describe(spec), strikes.len());
    let engine = HestonEngine::new(params, HestonQuadrature::default())?;
    let points = generate_smile(spec, &engine, &strikes)?;

    Ok(SmileReport {
        contract: *spec,
        heston: params,
        feller_condition: params.satisfies_feller(),
        points,
    })
}

fn tables(report: &SmileReport) -> Vec<Table> {
    let mut table = Table::new(["Strike", "K/S", "Heston", "Implied vol", "BS flat", "Model risk"])
        .with_title(format!(
            "Heston smile (v0={}, kappa={}, theta={}, xi={}, rho={}, Feller {})",
            report.heston.v0,
            report.heston.kappa,
            report.heston.theta,
            report.heston.xi,
            report.heston.rho,
            if report.feller_condition { "holds" } else { "violated" }
        ));
    for p in &report.points {
        table.row([
            num(p.strike, 2),
            num(p.moneyness, 3),
            num(p.heston_price, 4),
            opt_num(p.implied_vol, 4),
            num(p.black_scholes_price, 4),
            num(p.model_risk, 4),
        ]);
    }
    vec![table]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::output::OutputFormat;

    fn context() -> Context {
        Context {
            config: AppConfig::default(),
            format: OutputFormat::Table,
        }
    }

    #[test]
    fn test_default_ladder_shows_skew() {
        let ctx = context();
        let spec = ctx.config.contract.to_spec();
        let report = build_report(&ctx, &spec, &[]).unwrap();

        assert_eq!(report.points.len(), DEFAULT_MONEYNESS.len());
        assert!((report.points[0].strike - 80.0).abs() < 1e-12);
        // rho < 0: low strikes carry more implied volatility
        let first = report.points[0].implied_vol.unwrap();
        let last = report.points[8].implied_vol.unwrap();
        assert!(first > last, "{} vs {}", first, last);
    }

    #[test]
    fn test_explicit_strikes() {
        let ctx = context();
        let spec = ctx.config.contract.to_spec();
        let report = build_report(&ctx, &spec, &[95.0, 105.0]).unwrap();
        assert_eq!(report.points.len(), 2);
        assert_eq!(report.points[1].strike, 105.0);
    }
}
