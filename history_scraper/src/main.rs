//! History Scraper — downloads daily price history tables for a list of
//! tickers and stores each one as a clean CSV file.
//!
//! For every ticker the page is loaded through a rendering agent, the price
//! table is located and extracted, columns are renamed to
//! `Date, Open, High, Low, Close, Adj_Close, Volume`, cells are typed, and
//! the result is written to `<output-dir>/<TICKER>_historical_data_<period>.csv`.
//! Tickers run one after another with a random pause in between; a failing
//! ticker is reported and skipped.
//!
//! Usage example (CLI):
//! ```bash
//! history_scraper --tickers AAPL MSFT GOOGL --period 1y --output-dir stock_data
//! history_scraper --path ./tickers.txt --source file --html-dir ./saved_pages
//! ```
#![warn(missing_docs)]
mod agent;
mod args;

use crate::agent::file::FileFactory;
use crate::agent::http::HttpFactory;
use crate::args::{Args, Source};
use clap::Parser;
use history_common::Result;
use history_common::ScrapeError;
use history_common::locator::LocatorConfig;
use history_common::pipeline::PipelineConfig;
use history_common::runner::{DelayRange, checked_secs, run_batch};
use history_common::tickers::{Ticker, TickerParser, dedup_tickers};
use log::{info, warn};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::PathBuf;
use std::thread;

fn main() -> Result<(), ScrapeError> {
    let args = Args::parse();
    init_logger(args.verbose);

    let tickers = collect_tickers(&args)?;
    if tickers.is_empty() {
        return Err(ScrapeError::ParseTickersFile(
            "no tickers given; use --tickers or --path".to_string(),
        ));
    }

    fs::create_dir_all(&args.output_dir)?;
    let output_dir = fs::canonicalize(&args.output_dir).unwrap_or_else(|_| args.output_dir.clone());

    let (config, delay) = build_settings(&args, output_dir.clone())?;

    let symbols: Vec<String> = tickers.iter().map(Ticker::to_string).collect();
    info!("Starting historical data scraper");
    info!(
        "Scraping {} historical data for {} stocks: {}",
        args.period,
        tickers.len(),
        symbols.join(", ")
    );
    info!("Output directory: {}", output_dir.display());

    let summary = match args.source {
        Source::Http => run_batch(&HttpFactory::new()?, &tickers, &config, delay, thread::sleep),
        Source::File => {
            let dir = args.html_dir.clone().unwrap_or_else(|| PathBuf::from("."));
            run_batch(&FileFactory::new(dir), &tickers, &config, delay, thread::sleep)
        }
    };

    summary.log_report(&output_dir);
    if let Some(path) = &args.summary_json {
        summary.write_json(path)?;
        info!("Summary written to {}", path.display());
    }
    Ok(())
}

fn init_logger(verbose: bool) {
    let level = if verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Tickers from `--tickers` followed by those of `--path`, duplicates removed.
fn collect_tickers(args: &Args) -> Result<Vec<Ticker>, ScrapeError> {
    let mut tickers = args.tickers.clone();

    if let Some(raw) = &args.path {
        let file_path = normalize_path(raw);
        if !is_file_exist(&file_path) {
            return Err(ScrapeError::ParseTickersFile(format!(
                "ticker file {} does not exist",
                file_path.display()
            )));
        }
        let file = File::open(&file_path)?;
        let from_file = Ticker::parse_from_file(BufReader::new(file))?;
        info!("Read {} tickers from {}", from_file.len(), file_path.display());
        tickers.extend(from_file);
    }

    let before = tickers.len();
    let tickers = dedup_tickers(tickers);
    if tickers.len() < before {
        warn!("Ignoring {} duplicate tickers", before - tickers.len());
    }
    Ok(tickers)
}

/// Pipeline configuration and inter-ticker delay from the time-related flags.
fn build_settings(args: &Args, output_dir: PathBuf) -> Result<(PipelineConfig, DelayRange), ScrapeError> {
    let config = PipelineConfig {
        output_dir,
        period: args.period,
        locator: LocatorConfig::with_timeouts(
            checked_secs("--pattern-timeout", args.pattern_timeout)?,
            checked_secs("--table-timeout", args.table_timeout)?,
        ),
    };
    let delay = DelayRange::try_from_secs_f64(args.min_delay, args.max_delay)?;
    Ok((config, delay))
}

/// Normalize a CLI-provided path string by trimming whitespace and matching quotes.
///
/// This allows passing Windows paths in quotes without breaking parsing.
fn normalize_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let no_quotes = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    PathBuf::from(no_quotes)
}

/// Returns `true` if the provided path exists and is a regular file.
fn is_file_exist(path: &PathBuf) -> bool {
    path.exists() && path.is_file()
}
