//! Check command implementation
//!
//! Prints the configuration every other command would run with, after
//! defaults, the configuration file and environment overrides are merged.

use pricer_core::traits::PricingEngine;
use pricer_models::analytical::BlackScholesEngine;
use tracing::info;

use super::Context;
use crate::output::OutputFormat;
use crate::Result;

/// Run the check command
pub fn run(ctx: &Context) -> Result<()> {
    // validated at load time; pricing the default contract proves the engines link
    let spec = ctx.config.contract.to_spec();
    let price = BlackScholesEngine::default().price(&spec)?.price;
    info!("Configuration valid; default contract prices at {:.6}", price);

    match ctx.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&ctx.config)?),
        OutputFormat::Table => print!("{}", ctx.config.to_toml()?),
    }
    Ok(())
}
