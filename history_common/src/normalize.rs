//! Canonical column names.
//!
//! The history page decorates the close columns with tooltip text
//! ("Close Close price adjusted for splits.") and footnote asterisks, so the
//! close rules match on prefix before any generic cleanup runs.

use log::debug;

use crate::model::{ADJ_CLOSE, CLOSE, NormalizedTable, RawTable};

/// Canonical name for a single scraped header. First matching rule wins:
/// `Adj Close…` → `Adj_Close`, `Close…` → `Close`, otherwise asterisks and
/// surrounding whitespace are removed.
pub fn normalize_header(header: &str) -> String {
    if header.starts_with("Adj Close") {
        return ADJ_CLOSE.to_string();
    }
    if header.starts_with(CLOSE) {
        return CLOSE.to_string();
    }
    let cleaned = header.replace('*', "");
    cleaned.trim().to_string()
}

/// Rename the headers of `raw`.
///
/// If two headers map to the same name, the column keeps the position of
/// the first and the cells of the last.
pub fn normalize(raw: RawTable) -> NormalizedTable {
    let (headers, rows) = raw.into_parts();

    let mut columns: Vec<String> = Vec::with_capacity(headers.len());
    // For every output column, the source column feeding it.
    let mut sources: Vec<usize> = Vec::with_capacity(headers.len());
    for (idx, header) in headers.iter().enumerate() {
        let name = normalize_header(header);
        if name != *header {
            debug!("Renamed column '{}' to '{}'", header, name);
        }
        match columns.iter().position(|c| *c == name) {
            Some(existing) => sources[existing] = idx,
            None => {
                columns.push(name);
                sources.push(idx);
            }
        }
    }

    let rows = rows
        .into_iter()
        .map(|row| sources.iter().map(|&src| row[src].clone()).collect())
        .collect();

    NormalizedTable { columns, rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUFFIXES: [&str; 5] = [
        "",
        " ",
        "*",
        " Close price adjusted for splits.",
        "**Adjusted close price adjusted for splits and dividend and/or capital gain distributions.",
    ];

    #[test]
    fn close_prefixes_collapse() {
        for suffix in SUFFIXES {
            assert_eq!(normalize_header(&format!("Adj Close{suffix}")), "Adj_Close");
            assert_eq!(normalize_header(&format!("Close{suffix}")), "Close");
        }
    }

    #[test]
    fn generic_cleanup_strips_asterisks_and_whitespace() {
        assert_eq!(normalize_header("ColA * "), "ColA");
        assert_eq!(normalize_header("Another Col"), "Another Col");
        assert_eq!(normalize_header(" Volume*"), "Volume");
        // Not a prefix match: only cleanup applies.
        assert_eq!(normalize_header(" Close*"), "Close");
        assert_eq!(normalize_header("Prev Close"), "Prev Close");
    }

    #[test]
    fn renames_table_and_keeps_order() {
        let mut raw = RawTable::new(
            ["Date", "Open", "Close* Close price", "Adj Close** Adjusted", "Volume"]
                .map(String::from)
                .to_vec(),
        );
        raw.push_row(["d", "1", "2", "3", "4"].map(String::from).to_vec());

        let table = normalize(raw);
        assert_eq!(table.columns, ["Date", "Open", "Close", "Adj_Close", "Volume"]);
        assert_eq!(table.rows[0], ["d", "1", "2", "3", "4"]);
    }

    #[test]
    fn later_duplicate_overwrites_earlier() {
        let mut raw = RawTable::new(["Close", "Date", "Close*"].map(String::from).to_vec());
        raw.push_row(["first", "d", "second"].map(String::from).to_vec());

        let table = normalize(raw);
        assert_eq!(table.columns, ["Close", "Date"]);
        assert_eq!(table.rows[0], ["second", "d"]);
    }
}
