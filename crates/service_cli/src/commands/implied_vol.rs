//! Implied-vol command implementation
//!
//! Inverts the Black-Scholes formula for a quoted option price.

use pricer_core::types::OptionSpec;
use pricer_models::analytical::{implied_volatility, BlackScholes, ImpliedVolConfig};
use serde::Serialize;
use tracing::info;

use super::{describe, Context, ContractArgs};
use crate::output::{self, num, Table};
use crate::Result;

/// Result of the implied-vol command.
#[derive(Debug, Clone, Serialize)]
pub struct ImpliedVolReport {
    pub contract: OptionSpec,
    pub market_price: f64,
    pub implied_volatility: f64,
    /// Black-Scholes price at the implied volatility.
    pub repriced: f64,
    pub residual: f64,
}

/// Run the implied-vol command
pub fn run(ctx: &Context, contract: &ContractArgs, market_price: f64) -> Result<()> {
    let spec = contract.resolve(&ctx.config)?.without_volatility();
    info!("Inverting price {} for {}", market_price, describe(&spec));
    let report = build_report(&spec, market_price)?;
    output::emit(ctx.format, &report, |r| {
        vec![Table::key_values(
            "Implied volatility",
            [
                ("market price", num(r.market_price, 6)),
                ("implied vol", num(r.implied_volatility, 8)),
                ("repriced", num(r.repriced, 6)),
                ("residual", format!("{:.2e}", r.residual)),
            ],
        )]
    })
}

fn build_report(spec: &OptionSpec, market_price: f64) -> Result<ImpliedVolReport> {
    let vol = implied_volatility(spec, market_price, &ImpliedVolConfig::default())?;
    let repriced = BlackScholes::new(&spec.with_volatility(vol))?.price();
    Ok(ImpliedVolReport {
        contract: *spec,
        market_price,
        implied_volatility: vol,
        repriced,
        residual: repriced - market_price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CliError;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_recovers_volatility() {
        let spec = OptionSpec::european_put(100.0, 95.0, 0.25, 0.02, 0.2);
        let price = BlackScholes::new(&spec).unwrap().price();
        let report = build_report(&spec.without_volatility(), price).unwrap();
        assert_abs_diff_eq!(report.implied_volatility, 0.2, epsilon = 1e-6);
        assert!(report.residual.abs() < 1e-6);
    }

    #[test]
    fn test_arbitrage_price_rejected() {
        let spec = OptionSpec::european_call(100.0, 100.0, 1.0, 0.02, 0.2);
        // a call is never worth more than the discounted spot
        let result = build_report(&spec, 150.0);
        assert!(matches!(result, Err(CliError::Pricing(_))));
    }
}
