//! CSV artifacts: aligned prices and daily returns.
use crate::core::{AlignedPriceTable, Analysis, ReturnTable};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const PRICES_FILE: &str = "prices.csv";
pub const RETURNS_FILE: &str = "daily_returns.csv";

fn header(instruments: &[String]) -> Vec<&str> {
    std::iter::once("Date")
        .chain(instruments.iter().map(String::as_str))
        .collect()
}

/// Missing prices are written as empty cells.
pub fn write_prices(path: &Path, table: &AlignedPriceTable) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    wtr.write_record(header(&table.instruments))?;
    for (t, date) in table.dates.iter().enumerate() {
        let mut record = vec![date.to_string()];
        record.extend(
            table
                .row(t)
                .into_iter()
                .map(|p| p.map(|v| v.to_string()).unwrap_or_default()),
        );
        wtr.write_record(&record)?;
    }
    wtr.flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

pub fn write_returns(path: &Path, table: &ReturnTable) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    wtr.write_record(header(&table.instruments))?;
    for (t, date) in table.dates.iter().enumerate() {
        let mut record = vec![date.to_string()];
        record.extend(table.row(t).into_iter().map(|r| r.to_string()));
        wtr.write_record(&record)?;
    }
    wtr.flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Writes both artifacts into `dir`, creating it if needed.
pub fn export_all<P: AsRef<Path>>(dir: P, analysis: &Analysis) -> Result<(PathBuf, PathBuf)> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory: {}", dir.display()))?;

    let prices_path = dir.join(PRICES_FILE);
    let returns_path = dir.join(RETURNS_FILE);
    write_prices(&prices_path, &analysis.prices)?;
    write_returns(&returns_path, &analysis.returns)?;
    debug!("Exported analysis to {}", dir.display());
    Ok((prices_path, returns_path))
}
