//! Ticker symbols and helpers for reading them from files.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

use crate::error::ScrapeError;

/// Trait providing file parsing for tickers.
pub trait TickerParser {
    /// Parses tickers from a buffered reader.
    ///
    /// Symbols may be separated by commas, whitespace or new lines. Blank
    /// entries are skipped; any malformed symbol fails the whole file.
    fn parse_from_file<R: BufRead>(reader: R) -> Result<Vec<Ticker>, ScrapeError>;
}

impl TickerParser for Ticker {
    fn parse_from_file<R: BufRead>(reader: R) -> Result<Vec<Self>, ScrapeError> {
        let mut tickers = Vec::new();

        for line_result in reader.lines() {
            let line = line_result.map_err(ScrapeError::Io)?;
            for token in line.split(|c: char| c == ',' || c.is_whitespace()) {
                if token.is_empty() {
                    continue;
                }
                match token.parse::<Self>() {
                    Ok(ticker) => tickers.push(ticker),
                    Err(e) => return Err(ScrapeError::ParseTickersFile(e.to_string())),
                }
            }
        }
        Ok(tickers)
    }
}

/// Exchange ticker symbol, stored upper-cased.
///
/// Accepts ASCII letters and digits plus the punctuation used by index,
/// share-class and currency symbols (`^GSPC`, `BRK-B`, `RY.TO`, `EURUSD=X`).
#[derive(Debug, Clone, Serialize, Deserialize, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// Symbol as used in URLs and file names.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Ticker {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let symbol = s.trim();
        let valid = !symbol.is_empty()
            && symbol
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='));
        if !valid {
            return Err(ScrapeError::ParseTickersFile(format!(
                "invalid ticker symbol '{}'",
                s
            )));
        }
        Ok(Ticker(symbol.to_ascii_uppercase()))
    }
}

impl TryFrom<String> for Ticker {
    type Error = ScrapeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Drops repeated symbols, keeping the first occurrence of each.
pub fn dedup_tickers(tickers: Vec<Ticker>) -> Vec<Ticker> {
    let mut seen = std::collections::HashSet::new();
    tickers
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .collect()
}
