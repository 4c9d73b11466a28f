//! Historical price files.
//!
//! A price file is a CSV with a `date,price` header and ISO dates
//! (`YYYY-MM-DD`). Rows are kept in file order so the quality report can
//! flag ordering problems.

use std::path::Path;

use chrono::NaiveDate;
use pricer_core::market_data::PriceSeries;
use serde::Deserialize;
use tracing::debug;

use crate::{CliError, Result};

#[derive(Debug, Deserialize)]
struct PriceRecord {
    date: NaiveDate,
    price: f64,
}

/// Reads a `date,price` CSV file.
pub fn load_price_series(path: &Path) -> Result<PriceSeries> {
    if !path.exists() {
        return Err(CliError::FileNotFound(path.display().to_string()));
    }
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    let series = read_records(&mut reader)?;
    debug!(path = %path.display(), observations = series.len(), "loaded price file");
    Ok(series)
}

fn read_records<R: std::io::Read>(reader: &mut csv::Reader<R>) -> Result<PriceSeries> {
    let observations = reader
        .deserialize::<PriceRecord>()
        .map(|record| record.map(|r| (r.date, r.price)))
        .collect::<std::result::Result<Vec<_>, csv::Error>>()?;
    Ok(PriceSeries::new(observations))
}
