//! History page addresses.

use crate::period::Period;
use crate::tickers::Ticker;

/// Base address of the quote pages.
pub const QUOTE_BASE_URL: &str = "https://finance.yahoo.com/quote";

/// Build the daily history page URL for `ticker` over `period`, ending at
/// `now` (Unix seconds).
pub fn history_url(ticker: &Ticker, period: Period, now: i64) -> String {
    let period1 = now - period.span_secs();
    format!(
        "{}/{}/history?period1={}&period2={}&interval=1d&filter=history&frequency=1d&includeAdjustedClose=true",
        QUOTE_BASE_URL, ticker, period1, now
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_carries_window_bounds() {
        let ticker: Ticker = "aapl".parse().unwrap();
        let url = history_url(&ticker, Period::OneYear, 1_700_000_000);
        assert!(url.starts_with("https://finance.yahoo.com/quote/AAPL/history?"));
        assert!(url.contains("period1=1668464000&period2=1700000000"));
        assert!(url.ends_with("includeAdjustedClose=true"));
    }
}
