//! Error types shared by the pipeline and the scraper binary.
//!
//! The `ScrapeError` enum covers the per-ticker failure taxonomy (table not
//! located, nothing extractable) together with the I/O, CSV and agent
//! failures that can surface around it. Cell-level parse failures are not
//! errors at all: they become null cells during coercion.
use std::io;

use thiserror::Error;

/// Unified error type for one ticker's pipeline and the surrounding driver.
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// No selector pattern, including the generic fallback, located a visible table.
    #[error("Price history table not found: {0}")]
    TableNotFound(String),

    /// Every extraction strategy ran and none produced a usable row.
    #[error("All data extraction methods failed: {0}")]
    ExtractionFailed(String),

    /// A selector pattern could not be compiled.
    #[error("Invalid selector '{0}'")]
    Selector(String),

    /// The rendering agent failed to navigate or to produce markup.
    #[error("Rendering agent error: {0}")]
    Agent(String),

    /// A time limit or delay outside the accepted range.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Error while parsing the ticker file into `Ticker` values.
    #[error("Parse tickers file error: {0}")]
    ParseTickersFile(String),

    /// I/O error originating from files or sockets.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failure while writing the CSV artifact.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Failure while encoding the run summary as JSON.
    #[error("JSON serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}
