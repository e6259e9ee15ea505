//! Writing the typed table as CSV.
//!
//! The file is written next to its final name and renamed into place, so a
//! failed write never leaves a partial CSV behind and a rerun overwrites
//! the previous artifact.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::ScrapeError;
use crate::model::TypedTable;
use crate::period::Period;
use crate::tickers::Ticker;

/// `{ticker}_historical_data_{period}.csv`
pub fn output_file_name(ticker: &Ticker, period: Period) -> String {
    format!("{}_historical_data_{}.csv", ticker, period)
}

/// Write `table` with a header row to `path`, replacing any existing file.
pub fn write_csv(table: &TypedTable, path: &Path) -> Result<(), ScrapeError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{}.tmp", file_name));

    let written = write_records(table, &tmp);
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    fs::rename(&tmp, path).inspect_err(|_| {
        let _ = fs::remove_file(&tmp);
    })?;
    Ok(())
}

fn write_records(table: &TypedTable, path: &Path) -> Result<(), ScrapeError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

/// Persist `table` for `ticker` into `dir` and return the written path.
pub fn persist(
    table: &TypedTable,
    dir: &Path,
    ticker: &Ticker,
    period: Period,
) -> Result<PathBuf, ScrapeError> {
    let path = dir.join(output_file_name(ticker, period));
    write_csv(table, &path)?;
    info!(
        "Successfully saved {} data to {} ({} rows)",
        ticker,
        path.display(),
        table.len()
    );
    Ok(path)
}
