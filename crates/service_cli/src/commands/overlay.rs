//! Overlay command implementation
//!
//! Sizes a budget-constrained protective put on a long position and
//! compares hedged and unhedged horizon returns.

use std::path::Path;

use pricer_core::market_data::TRADING_DAYS_PER_YEAR;
use pricer_pricing::mc::GbmParams;
use pricer_risk::metrics::RiskSummary;
use pricer_risk::overlay::{OverlayConfig, OverlayReturns, ProtectivePutOverlay};
use serde::Serialize;
use tracing::info;

use super::{Context, ContractArgs};
use crate::data::load_price_series;
use crate::output::{self, num, opt_num, Table};
use crate::Result;

/// Command-line arguments of the overlay command.
#[derive(Debug, Clone, Default)]
pub struct OverlayArgs {
    pub contract: ContractArgs,
    pub horizon: Option<f64>,
    pub notional: Option<f64>,
    pub strike_pct: Option<f64>,
    pub put_maturity: Option<f64>,
    pub budget: Option<f64>,
    pub paths: Option<usize>,
    pub steps: Option<usize>,
    pub seed: Option<u64>,
    pub prices: Option<String>,
}

/// Sizing shared by both overlay modes.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct OverlaySizing {
    pub config: OverlayConfig,
    pub market: GbmParams,
    pub put_strike: f64,
    pub put_premium: f64,
    pub units_underlying: f64,
    pub hedge_units: f64,
    pub premium_paid: f64,
    pub premium_budget: f64,
    pub coverage_ratio: f64,
}

/// Result over simulated paths.
#[derive(Debug, Clone, Serialize)]
pub struct SimulatedOverlayReport {
    pub sizing: OverlaySizing,
    pub n_paths: usize,
    pub n_steps: usize,
    pub seed: u64,
    pub unhedged: RiskSummary,
    pub hedged: RiskSummary,
}

/// Result along a historical path.
#[derive(Debug, Clone, Serialize)]
pub struct HistoricalOverlayReport {
    pub source: String,
    pub sizing: OverlaySizing,
    pub returns: OverlayReturns,
}

impl OverlayArgs {
    fn overlay_config(&self, base: &OverlayConfig) -> OverlayConfig {
        OverlayConfig {
            notional: self.notional.unwrap_or(base.notional),
            put_strike_pct: self.strike_pct.unwrap_or(base.put_strike_pct),
            put_maturity: self.put_maturity.unwrap_or(base.put_maturity),
            budget_fraction: self.budget.unwrap_or(base.budget_fraction),
        }
    }
}

/// Run the overlay command
pub fn run(ctx: &Context, args: &OverlayArgs) -> Result<()> {
    match &args.prices {
        Some(file) => {
            let report = historical(ctx, args, Path::new(file))?;
            output::emit(ctx.format, &report, |r| {
                let mut rows = sizing_rows(&r.sizing);
                rows.push(("unhedged return", num(r.returns.unhedged, 6)));
                rows.push(("hedged return", num(r.returns.hedged, 6)));
                vec![Table::key_values(&format!("Protective put on {}", r.source), rows)]
            })
        }
        None => {
            let report = simulated(ctx, args)?;
            output::emit(ctx.format, &report, simulated_tables)
        }
    }
}

fn build_overlay(
    ctx: &Context,
    args: &OverlayArgs,
    spot: f64,
    horizon: f64,
) -> Result<(ProtectivePutOverlay, OverlaySizing)> {
    let contract = ContractArgs {
        spot: Some(spot),
        maturity: Some(horizon),
        ..args.contract.clone()
    };
    let spec = contract.resolve(&ctx.config)?;
    let market = GbmParams::from_spec(&spec)?;
    let overlay = ProtectivePutOverlay::new(args.overlay_config(&ctx.config.overlay), market)?;
    let sizing = OverlaySizing {
        config: *overlay.config(),
        market,
        put_strike: overlay.put_spec().strike,
        put_premium: overlay.put_premium(),
        units_underlying: overlay.units_underlying(),
        hedge_units: overlay.hedge_units(),
        premium_paid: overlay.premium_paid(),
        premium_budget: overlay.premium_budget(),
        coverage_ratio: overlay.coverage_ratio(),
    };
    Ok((overlay, sizing))
}

fn simulated(ctx: &Context, args: &OverlayArgs) -> Result<SimulatedOverlayReport> {
    let base = &ctx.config.contract;
    let spot = args.contract.spot.unwrap_or(base.spot);
    let horizon = args.horizon.unwrap_or(base.maturity);
    let (overlay, sizing) = build_overlay(ctx, args, spot, horizon)?;

    let n_paths = args.paths.unwrap_or(ctx.config.hedging.n_paths);
    let n_steps = args.steps.unwrap_or(ctx.config.hedging.n_steps);
    let seed = args.seed.unwrap_or(ctx.config.engines.seed);
    info!(
        "Protective put overlay: coverage {:.3}, {} paths over {} years",
        sizing.coverage_ratio, n_paths, horizon
    );
    let result = overlay.simulate(n_paths, n_steps, seed)?;
    let (unhedged, hedged) = result.summaries(ctx.config.hedging.confidence)?;

    Ok(SimulatedOverlayReport {
        sizing,
        n_paths,
        n_steps,
        seed,
        unhedged,
        hedged,
    })
}

/// The horizon spans the file, one trading day per observation.
fn historical(ctx: &Context, args: &OverlayArgs, file: &Path) -> Result<HistoricalOverlayReport> {
    let series = load_price_series(file)?;
    series.ensure_ready(None, 2, ctx.config.data.max_gap_days)?;
    let prices = series.prices();
    let horizon = (prices.len() - 1) as f64 / TRADING_DAYS_PER_YEAR;

    let (overlay, sizing) = build_overlay(ctx, args, prices[0], horizon)?;
    info!("Protective put overlay along {}", file.display());
    let returns = overlay.apply(&prices)?;
    Ok(HistoricalOverlayReport {
        source: file.display().to_string(),
        sizing,
        returns,
    })
}

fn sizing_rows(s: &OverlaySizing) -> Vec<(&'static str, String)> {
    vec![
        ("notional", num(s.config.notional, 2)),
        ("horizon (years)", num(s.market.maturity, 4)),
        ("put strike", num(s.put_strike, 4)),
        ("put maturity", num(s.config.put_maturity, 4)),
        ("put premium", num(s.put_premium, 4)),
        ("units held", num(s.units_underlying, 2)),
        ("puts bought", num(s.hedge_units, 2)),
        ("premium paid", num(s.premium_paid, 2)),
        ("premium budget", num(s.premium_budget, 2)),
        ("coverage", num(s.coverage_ratio, 4)),
    ]
}

fn simulated_tables(report: &SimulatedOverlayReport) -> Vec<Table> {
    let sizing = Table::key_values("Protective put sizing", sizing_rows(&report.sizing));

    let mut returns = Table::new(["Statistic", "Unhedged", "Hedged"]).with_title(format!(
        "Horizon returns over {} paths",
        report.n_paths
    ));
    let (u, h) = (&report.unhedged, &report.hedged);
    for (name, a, b) in [
        ("mean", u.mean, h.mean),
        ("std dev", u.std_dev, h.std_dev),
        ("median", u.median, h.median),
        ("min", u.min, h.min),
        ("max", u.max, h.max),
        ("VaR", u.value_at_risk, h.value_at_risk),
        ("CVaR", u.conditional_value_at_risk, h.conditional_value_at_risk),
        ("max drawdown", u.max_drawdown, h.max_drawdown),
    ] {
        returns.row([name.to_string(), num(a, 4), num(b, 4)]);
    }
    returns.row([
        "ann. vol".to_string(),
        opt_num(u.annualised_volatility, 4),
        opt_num(h.annualised_volatility, 4),
    ]);
    vec![sizing, returns]
}
