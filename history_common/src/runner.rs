//! Sequential batch over many tickers.
//!
//! Tickers are processed one at a time with a random pause between them.
//! A failing ticker is logged and recorded; the batch always continues.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{error, info};
use rand::Rng;
use serde::Serialize;

use crate::agent::AgentFactory;
use crate::error::ScrapeError;
use crate::pipeline::{PipelineConfig, scrape_ticker};
use crate::tickers::Ticker;

/// Longest accepted time limit or pause, in seconds (one day).
pub const MAX_SECONDS: f64 = 86_400.0;

/// Convert a user-supplied number of seconds, rejecting negative, non-finite
/// and over-long values.
pub fn checked_secs(name: &str, value: f64) -> Result<Duration, ScrapeError> {
    if !value.is_finite() || !(0.0..=MAX_SECONDS).contains(&value) {
        return Err(ScrapeError::Config(format!(
            "{} must be between 0 and {} seconds, got {}",
            name, MAX_SECONDS, value
        )));
    }
    Duration::try_from_secs_f64(value).map_err(|e| ScrapeError::Config(format!("{}: {}", name, e)))
}

/// Bounds of the random pause between two tickers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayRange {
    /// Shortest pause.
    pub min: Duration,
    /// Longest pause (exclusive).
    pub max: Duration,
}

impl DelayRange {
    /// Range from seconds. Both bounds go through `checked_secs` and `min`
    /// may not exceed `max`.
    pub fn try_from_secs_f64(min: f64, max: f64) -> Result<Self, ScrapeError> {
        let min = checked_secs("minimum delay", min)?;
        let max = checked_secs("maximum delay", max)?;
        if min > max {
            return Err(ScrapeError::Config(format!(
                "minimum delay {:.1}s exceeds maximum delay {:.1}s",
                min.as_secs_f64(),
                max.as_secs_f64()
            )));
        }
        Ok(Self { min, max })
    }

    /// Uniform sample in `[min, max)`, or `min` when the range is empty.
    pub fn sample(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let mut rng = rand::rng();
        Duration::from_secs_f64(rng.random_range(self.min.as_secs_f64()..self.max.as_secs_f64()))
    }
}

impl Default for DelayRange {
    fn default() -> Self {
        Self { min: Duration::from_secs(3), max: Duration::from_secs(7) }
    }
}

/// A ticker whose CSV was written.
#[derive(Debug, Clone, Serialize)]
pub struct TickerSuccess {
    /// Symbol.
    pub ticker: Ticker,
    /// Data rows written.
    pub rows: usize,
    /// CSV location.
    pub path: PathBuf,
}

/// A ticker that produced no CSV.
#[derive(Debug, Clone, Serialize)]
pub struct TickerFailure {
    /// Symbol.
    pub ticker: Ticker,
    /// Why it failed.
    pub error: String,
}

/// Outcome of a batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    /// Tickers attempted.
    pub total: usize,
    /// Tickers with a CSV, in processing order.
    pub successful: Vec<TickerSuccess>,
    /// Tickers without a CSV, in processing order.
    pub failed: Vec<TickerFailure>,
}

impl BatchSummary {
    /// Log the closing report.
    pub fn log_report(&self, output_dir: &Path) {
        let ok: Vec<String> = self.successful.iter().map(|s| s.ticker.to_string()).collect();
        let failed: Vec<String> = self.failed.iter().map(|f| f.ticker.to_string()).collect();

        info!("{}", "=".repeat(50));
        info!("SCRAPING COMPLETE");
        info!("{}", "=".repeat(50));
        info!("Total tickers processed: {}", self.total);
        info!("Successful: {} ({})", ok.len(), ok.join(", "));
        info!(
            "Failed: {} ({})",
            failed.len(),
            if failed.is_empty() { "None".to_string() } else { failed.join(", ") }
        );
        info!("Data saved to: {}", output_dir.display());
        info!("{}", "=".repeat(50));
    }

    /// Write the summary as pretty JSON.
    pub fn write_json(&self, path: &Path) -> Result<(), ScrapeError> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

/// Run the pipeline for each ticker in order.
///
/// `sleep` performs the pause between tickers, so callers decide whether it
/// actually blocks.
pub fn run_batch<F, S>(
    factory: &F,
    tickers: &[Ticker],
    config: &PipelineConfig,
    delay: DelayRange,
    mut sleep: S,
) -> BatchSummary
where
    F: AgentFactory,
    S: FnMut(Duration),
{
    let mut summary = BatchSummary { total: tickers.len(), ..Default::default() };

    for (i, ticker) in tickers.iter().enumerate() {
        info!("Processing ticker {} of {}: {}", i + 1, tickers.len(), ticker);
        if i > 0 {
            let pause = delay.sample();
            info!("Waiting {:.1} seconds before processing next ticker...", pause.as_secs_f64());
            sleep(pause);
        }

        match scrape_ticker(factory, ticker, config) {
            Ok(output) => summary.successful.push(TickerSuccess {
                ticker: ticker.clone(),
                rows: output.table.len(),
                path: output.path,
            }),
            Err(e) => {
                error!("Error processing {}: {}", ticker, e);
                summary.failed.push(TickerFailure { ticker: ticker.clone(), error: e.to_string() });
            }
        }
    }
    summary
}
