//! Data-check command implementation
//!
//! Reports the integrity of a historical price file before it is used to
//! drive a hedge or an overlay.

use std::path::Path;

use chrono::NaiveDate;
use pricer_core::market_data::{
    DataQualityReport, PriceSeries, DEFAULT_VOL_WINDOW, TRADING_DAYS_PER_YEAR,
};
use serde::Serialize;
use tracing::{info, warn};

use super::Context;
use crate::data::load_price_series;
use crate::output::{self, num, opt_num, Table};
use crate::{CliError, Result};

/// Command-line arguments of the data-check command.
#[derive(Debug, Clone)]
pub struct DataCheckArgs {
    pub file: String,
    pub min_obs: Option<usize>,
    pub max_gap_days: Option<i64>,
    pub start: Option<NaiveDate>,
    pub strict: bool,
}

/// Result of the data-check command.
#[derive(Debug, Clone, Serialize)]
pub struct DataCheckReport {
    pub source: String,
    pub min_observations: usize,
    pub max_gap_days: i64,
    pub quality: DataQualityReport,
    pub clean: bool,
    /// First readiness failure, if any.
    pub problem: Option<String>,
    /// Annualised, on the sorted and de-duplicated series.
    pub realized_volatility: Option<f64>,
    pub latest_rolling_volatility: Option<f64>,
}

/// Run the data-check command
pub fn run(ctx: &Context, args: &DataCheckArgs) -> Result<()> {
    let series = load_price_series(Path::new(&args.file))?;
    let report = build_report(ctx, args, &series);
    if let Some(problem) = &report.problem {
        warn!("{}: {}", args.file, problem);
    } else {
        info!("{}: ready ({} observations)", args.file, report.quality.n_obs);
    }
    output::emit(ctx.format, &report, tables)?;

    match (&report.problem, args.strict) {
        (Some(problem), true) => Err(CliError::invalid_argument(format!(
            "{} is not ready: {}",
            args.file, problem
        ))),
        _ => Ok(()),
    }
}

fn build_report(ctx: &Context, args: &DataCheckArgs, series: &PriceSeries) -> DataCheckReport {
    let min_obs = args.min_obs.unwrap_or(ctx.config.data.min_observations);
    let max_gap = args.max_gap_days.unwrap_or(ctx.config.data.max_gap_days);
    let quality = series.quality_report(max_gap);
    let problem = series
        .ensure_ready(args.start, min_obs, max_gap)
        .err()
        .map(|e| e.to_string());

    let cleaned = series.cleaned();
    let realized_volatility = cleaned.realized_volatility(TRADING_DAYS_PER_YEAR).ok();
    let latest_rolling_volatility = cleaned
        .rolling_volatility(DEFAULT_VOL_WINDOW, TRADING_DAYS_PER_YEAR)
        .ok()
        .and_then(|vols| vols.last().copied());

    DataCheckReport {
        source: args.file.clone(),
        min_observations: min_obs,
        max_gap_days: max_gap,
        clean: quality.is_clean(min_obs),
        quality,
        problem,
        realized_volatility,
        latest_rolling_volatility,
    }
}

fn tables(report: &DataCheckReport) -> Vec<Table> {
    let q = &report.quality;
    let date = |d: Option<NaiveDate>| d.map_or_else(|| "-".to_string(), |d| d.to_string());
    let mut summary = Table::key_values(
        &format!("Data quality of {}", report.source),
        [
            ("observations", format!("{} (need {})", q.n_obs, report.min_observations)),
            ("first date", date(q.first_date)),
            ("last date", date(q.last_date)),
            ("missing values", q.has_missing_values.to_string()),
            ("monotonic dates", q.is_monotonic.to_string()),
            ("duplicate dates", q.has_duplicate_dates.to_string()),
            (
                "max gap (days)",
                q.max_gap_days.map_or_else(|| "-".to_string(), |g| g.to_string()),
            ),
            ("clean", report.clean.to_string()),
            ("problem", report.problem.clone().unwrap_or_else(|| "-".to_string())),
            ("realized vol", opt_num(report.realized_volatility, 4)),
            (
                format!("rolling vol ({}d)", DEFAULT_VOL_WINDOW).as_str(),
                opt_num(report.latest_rolling_volatility, 4),
            ),
        ],
    );
    if q.large_gaps.is_empty() {
        return vec![summary];
    }

    let mut gaps = Table::new(["From", "To", "Days"]).with_title(format!(
        "Gaps above {} days",
        report.max_gap_days
    ));
    for gap in &q.large_gaps {
        gaps.row([
            gap.prev_date.to_string(),
            gap.next_date.to_string(),
            num(gap.gap_days as f64, 0),
        ]);
    }
    summary.row(["large gaps".to_string(), q.large_gaps.len().to_string()]);
    vec![summary, gaps]
}
