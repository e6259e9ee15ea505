//! Command-line arguments for the history scraper.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use history_common::runner::checked_secs;
use history_common::{Period, Ticker};

/// Where page markup comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Source {
    /// Fetch the live history page over HTTP.
    Http,
    /// Read saved pages named `<TICKER>.html` from `--html-dir`.
    File,
}

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about = "Scrape historical stock prices into CSV files", long_about = None)]
pub struct Args {
    /// Ticker symbols to scrape (e.g. AAPL MSFT GOOGL).
    #[clap(long, num_args = 0..)]
    pub tickers: Vec<Ticker>,

    /// Path to a text file with more tickers.
    /// Tickers may be separated by commas, spaces, or new lines.
    #[clap(long)]
    pub path: Option<String>,

    /// History window ending today.
    #[clap(long, value_enum, default_value_t = Period::OneYear)]
    pub period: Period,

    /// Directory receiving one CSV per ticker. Created if missing.
    #[clap(long, default_value = "stock_data")]
    pub output_dir: PathBuf,

    /// Page source.
    #[clap(long, value_enum, default_value_t = Source::Http)]
    pub source: Source,

    /// Directory with saved pages, required with `--source file`.
    #[clap(long, required_if_eq("source", "file"))]
    pub html_dir: Option<PathBuf>,

    /// Shortest pause between tickers, in seconds.
    #[clap(long, default_value_t = 3.0, value_parser = parse_seconds)]
    pub min_delay: f64,

    /// Longest pause between tickers, in seconds.
    #[clap(long, default_value_t = 7.0, value_parser = parse_seconds)]
    pub max_delay: f64,

    /// Budget for the whole table search, in seconds.
    #[clap(long, default_value_t = 15.0, value_parser = parse_seconds)]
    pub table_timeout: f64,

    /// Wait for each table selector, in seconds.
    #[clap(long, default_value_t = 3.0, value_parser = parse_seconds)]
    pub pattern_timeout: f64,

    /// Also write the run summary as JSON to this file.
    #[clap(long)]
    pub summary_json: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[clap(long, short)]
    pub verbose: bool,
}

/// Seconds in `0..=MAX_SECONDS`, finite.
fn parse_seconds(raw: &str) -> Result<f64, String> {
    let value: f64 = raw.trim().parse().map_err(|e| format!("{}", e))?;
    checked_secs("value", value).map_err(|e| e.to_string())?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["history_scraper", "--tickers", "aapl", "msft"]).unwrap();
        assert_eq!(args.tickers.len(), 2);
        assert_eq!(args.tickers[0].as_str(), "AAPL");
        assert_eq!(args.period, Period::OneYear);
        assert_eq!(args.output_dir, PathBuf::from("stock_data"));
        assert_eq!(args.source, Source::Http);
    }

    #[test]
    fn file_source_needs_html_dir() {
        let err = Args::try_parse_from(["history_scraper", "--tickers", "AAPL", "--source", "file"]);
        assert!(err.is_err());

        let args = Args::try_parse_from([
            "history_scraper", "--tickers", "AAPL", "--source", "file", "--html-dir", "pages", "--period", "6mo",
        ])
        .unwrap();
        assert_eq!(args.period, Period::SixMonths);
        assert_eq!(args.html_dir, Some(PathBuf::from("pages")));
    }

    #[test]
    fn rejects_out_of_range_seconds() {
        for (flag, value) in [
            ("--table-timeout", "1e19"),
            ("--pattern-timeout", "inf"),
            ("--min-delay", "NaN"),
            ("--max-delay", "inf"),
            ("--max-delay", "100000"),
        ] {
            let parsed = Args::try_parse_from(["history_scraper", "--tickers", "AAPL", flag, value]);
            assert!(parsed.is_err(), "{flag} {value}");
        }
        let args = Args::try_parse_from(["history_scraper", "--tickers", "AAPL", "--min-delay", "0"]).unwrap();
        assert_eq!(args.min_delay, 0.0);
    }

    #[test]
    fn rejects_bad_ticker() {
        assert!(Args::try_parse_from(["history_scraper", "--tickers", "MS/FT"]).is_err());
    }
}
