//! Convergence command implementation
//!
//! Tabulates binomial and finite-difference prices against the closed form
//! and the strong error of the Euler-Maruyama scheme.

use pricer_core::types::OptionSpec;
use pricer_models::analytical::BlackScholes;
use pricer_models::lattice::{self, ConvergenceRow};
use pricer_models::pde::{self, GridConvergenceRow};
use pricer_pricing::mc::GbmParams;
use pricer_pricing::sde::{discretisation_error, DiscretisationErrorRow};
use serde::Serialize;
use tracing::info;

use super::{describe, Context, ContractArgs};
use crate::output::{self, num, Table};
use crate::Result;

/// Tree sizes studied when none are given.
pub const DEFAULT_TREE_STUDY: [usize; 7] = [10, 25, 50, 100, 200, 500, 1000];

/// Finite-difference grids studied when none are given.
pub const DEFAULT_GRID_STUDY: [(usize, usize); 4] = [(50, 50), (100, 100), (200, 200), (400, 400)];

/// Euler step counts studied when none are given.
pub const DEFAULT_SDE_STUDY: [usize; 5] = [4, 16, 64, 252, 1008];

/// Paths per step count in the SDE study.
pub const DEFAULT_SDE_PATHS: usize = 10_000;

/// Command-line arguments of the convergence command.
#[derive(Debug, Clone, Default)]
pub struct ConvergenceArgs {
    pub contract: ContractArgs,
    pub tree_steps: Vec<usize>,
    pub grids: Vec<(usize, usize)>,
    pub sde_steps: Vec<usize>,
    pub sde_paths: Option<usize>,
}

/// Result of the convergence command.
#[derive(Debug, Clone, Serialize)]
pub struct ConvergenceReport {
    pub contract: OptionSpec,
    pub reference_price: f64,
    pub binomial: Vec<ConvergenceRow>,
    pub finite_difference: Vec<GridConvergenceRow>,
    pub euler_maruyama: Vec<DiscretisationErrorRow>,
}

/// Run the convergence command
pub fn run(ctx: &Context, args: &ConvergenceArgs) -> Result<()> {
    let report = build_report(ctx, args)?;
    output::emit(ctx.format, &report, tables)
}

fn or_default<T: Clone>(given: &[T], default: &[T]) -> Vec<T> {
    if given.is_empty() {
        default.to_vec()
    } else {
        given.to_vec()
    }
}

fn build_report(ctx: &Context, args: &ConvergenceArgs) -> Result<ConvergenceReport> {
    let spec = args.contract.resolve(&ctx.config)?;
    let reference = BlackScholes::new(&spec)?.price();
    info!("Convergence study for {} (reference {:.6})", describe(&spec), reference);

    let tree_steps = or_default(&args.tree_steps, &DEFAULT_TREE_STUDY);
    let binomial = lattice::convergence_table(&spec, &tree_steps, reference)?;
    let finite_difference = pde::convergence_table(
        &spec,
        ctx.config.engines.pde(),
        &or_default(&args.grids, &DEFAULT_GRID_STUDY),
        reference,
    )?;
    let euler_maruyama = discretisation_error(
        &GbmParams::from_spec(&spec)?,
        &or_default(&args.sde_steps, &DEFAULT_SDE_STUDY),
        args.sde_paths.unwrap_or(DEFAULT_SDE_PATHS),
        ctx.config.engines.seed,
    )?;

    Ok(ConvergenceReport {
        contract: spec,
        reference_price: reference,
        binomial,
        finite_difference,
        euler_maruyama,
    })
}

fn tables(report: &ConvergenceReport) -> Vec<Table> {
    let mut tree = Table::new(["Steps", "Price", "|Error|"]).with_title(format!(
        "Binomial tree vs Black-Scholes {:.6} ({})",
        report.reference_price,
        describe(&report.contract)
    ));
    for row in &report.binomial {
        tree.row([row.steps.to_string(), num(row.price, 6), format!("{:.3e}", row.abs_error)]);
    }

    let mut grid = Table::new(["Price steps", "Time steps", "Price", "|Error|"])
        .with_title("Finite difference vs Black-Scholes");
    for row in &report.finite_difference {
        grid.row([
            row.price_steps.to_string(),
            row.time_steps.to_string(),
            num(row.price, 6),
            format!("{:.3e}", row.abs_error),
        ]);
    }

    let mut sde = Table::new(["Steps", "Strong error", "Weak error", "Euler mean", "Exact mean"])
        .with_title("Euler-Maruyama vs exact scheme (terminal spot)");
    for row in &report.euler_maruyama {
        sde.row([
            row.n_steps.to_string(),
            format!("{:.3e}", row.strong_error),
            format!("{:.3e}", row.weak_error()),
            num(row.euler_mean, 4),
            num(row.exact_mean, 4),
        ]);
    }
    vec![tree, grid, sde]
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
    fn test_errors_shrink_with_resolution() {
        let args = ConvergenceArgs {
            tree_steps: vec![10, 1000],
            grids: vec![(50, 50), (200, 200)],
            sde_steps: vec![4, 64],
            sde_paths: Some(2_000),
            ..ConvergenceArgs::default()
        };
        let report = build_report(&context(), &args).unwrap();

        assert!(report.binomial[1].abs_error < report.binomial[0].abs_error);
        assert!(report.finite_difference[1].abs_error < report.finite_difference[0].abs_error);
        assert!(report.finite_difference[1].abs_error < 0.02);
        assert!(report.euler_maruyama[1].strong_error < report.euler_maruyama[0].strong_error);
    }

    #[test]
    fn test_default_studies() {
        let args = ConvergenceArgs {
            sde_paths: Some(500),
            ..ConvergenceArgs::default()
        };
        let report = build_report(&context(), &args).unwrap();
        assert_eq!(report.binomial.len(), DEFAULT_TREE_STUDY.len());
        assert_eq!(report.finite_difference.len(), DEFAULT_GRID_STUDY.len());
        assert_eq!(report.euler_maruyama.len(), DEFAULT_SDE_STUDY.len());
        assert_eq!(tables(&report).len(), 3);
    }
}
