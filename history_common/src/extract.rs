//! Turning table markup into a `RawTable`.
//!
//! Two strategies run as an ordered chain:
//! 1. `Strategy::Document` — generic table parsing of the whole page, first
//!    table wins. Headers come from `<thead>` or a leading all-`<th>` row,
//!    short rows are padded and `colspan` cells repeated.
//! 2. `Strategy::Element` — strict parsing of the located table element.
//!    Header from the first row's `<th>` cells (or the canonical list),
//!    `<td>` cells only, short rows dropped.
//!
//! The chain stops at the first strategy that yields at least one row and
//! reports `ExtractionFailed` only once both have been tried.

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::error::ScrapeError;
use crate::model::{CANONICAL_COLUMNS, RawTable};

// Constant selectors; parsing cannot fail.
static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").unwrap());
static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());
static HEAD_ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("thead tr").unwrap());
static HEADER_CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("th").unwrap());
static DATA_CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").unwrap());
static ANY_CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("th, td").unwrap());

/// Markup available to the extraction chain.
///
/// Either side may be missing when the agent could not serialize it; the
/// strategy depending on it then fails.
#[derive(Debug, Clone, Default)]
pub struct MarkupSources {
    /// Whole rendered document.
    pub document: Option<String>,
    /// Outer markup of the located table element.
    pub table: Option<String>,
}

/// One way of extracting a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Generic parse of the full document.
    Document,
    /// Strict parse of the located element.
    Element,
}

/// Strategies in the order they are tried.
pub const STRATEGIES: [Strategy; 2] = [Strategy::Document, Strategy::Element];

impl Strategy {
    /// Run this strategy. `Err` carries the reason it produced nothing.
    pub fn run(self, sources: &MarkupSources) -> Result<RawTable, String> {
        let (source, name) = match self {
            Strategy::Document => (sources.document.as_deref(), "document"),
            Strategy::Element => (sources.table.as_deref(), "table element"),
        };
        let markup = source.ok_or_else(|| format!("{} markup unavailable", name))?;
        let table = match self {
            Strategy::Document => parse_first_table(markup),
            Strategy::Element => parse_table_element(markup),
        }?;
        if table.is_empty() {
            return Err(format!("{} table has no data rows", name));
        }
        Ok(table)
    }
}

/// Run the strategy chain over `sources`.
pub fn extract(sources: &MarkupSources) -> Result<RawTable, ScrapeError> {
    let mut reasons = Vec::new();
    for strategy in STRATEGIES {
        debug!("Attempting {:?} extraction", strategy);
        match strategy.run(sources) {
            Ok(table) => {
                info!(
                    "{:?} extraction produced {} rows x {} columns",
                    strategy,
                    table.rows().len(),
                    table.headers().len()
                );
                return Ok(table);
            }
            Err(reason) => {
                warn!("{:?} extraction failed: {}", strategy, reason);
                reasons.push(format!("{:?}: {}", strategy, reason));
            }
        }
    }
    Err(ScrapeError::ExtractionFailed(reasons.join("; ")))
}

/// Generic parse: first `<table>` anywhere in `markup`.
pub fn parse_first_table(markup: &str) -> Result<RawTable, String> {
    let document = Html::parse_document(markup);
    let table = document
        .select(&TABLE)
        .next()
        .ok_or_else(|| "no table in document".to_string())?;

    let rows: Vec<ElementRef<'_>> = own_rows(table, &ROW).collect();
    let head_rows: Vec<ElementRef<'_>> = own_rows(table, &HEAD_ROW).collect();

    let (headers, body): (Vec<String>, Vec<ElementRef<'_>>) = if let Some(last) = head_rows.last() {
        let head_ids: Vec<_> = head_rows.iter().map(|r| r.id()).collect();
        let body = rows.into_iter().filter(|r| !head_ids.contains(&r.id())).collect();
        (expanded_cells(*last, &ANY_CELL), body)
    } else {
        let header_first = rows.first().is_some_and(|r| is_header_row(*r));
        if header_first {
            (expanded_cells(rows[0], &ANY_CELL), rows[1..].to_vec())
        } else {
            (Vec::new(), rows)
        }
    };

    let body_cells: Vec<Vec<String>> = body
        .iter()
        .map(|r| expanded_cells(*r, &ANY_CELL))
        .filter(|cells| !cells.is_empty())
        .collect();

    let headers = if headers.is_empty() {
        let width = body_cells.iter().map(Vec::len).max().unwrap_or(0);
        (0..width).map(|i| i.to_string()).collect()
    } else {
        headers
    };
    if headers.is_empty() {
        return Err("table has no columns".to_string());
    }

    let mut raw = RawTable::new(headers);
    let width = raw.headers().len();
    for mut cells in body_cells {
        if cells.len() < width {
            cells.resize(width, String::new());
        }
        raw.push_row(cells);
    }
    Ok(raw)
}

/// Strict parse of a single table element's outer markup.
pub fn parse_table_element(markup: &str) -> Result<RawTable, String> {
    let fragment = Html::parse_fragment(markup);
    let table = fragment
        .select(&TABLE)
        .next()
        .ok_or_else(|| "no table in element markup".to_string())?;
    let mut rows = own_rows(table, &ROW);

    let headers: Vec<String> = rows
        .next()
        .map(|first| own_cells(first, &HEADER_CELL).map(cell_text).collect())
        .unwrap_or_default();
    let headers = if headers.is_empty() {
        debug!("No header cells, using canonical columns");
        CANONICAL_COLUMNS.iter().map(|c| c.to_string()).collect()
    } else {
        headers
    };

    let mut raw = RawTable::new(headers);
    let mut dropped = 0usize;
    for row in rows {
        let cells: Vec<String> = own_cells(row, &DATA_CELL).map(cell_text).collect();
        if cells.is_empty() {
            continue;
        }
        if !raw.push_row(cells) {
            dropped += 1;
        }
    }
    if dropped > 0 {
        debug!("Dropped {} rows shorter than the header", dropped);
    }
    Ok(raw)
}

fn is_header_row(row: ElementRef<'_>) -> bool {
    let mut cells = own_cells(row, &ANY_CELL).peekable();
    cells.peek().is_some() && cells.all(|c| c.value().name() == "th")
}

/// Cell texts of `row`, repeating cells that span several columns.
fn expanded_cells(row: ElementRef<'_>, cells: &Selector) -> Vec<String> {
    let mut out = Vec::new();
    for cell in own_cells(row, cells) {
        let span = cell
            .value()
            .attr("colspan")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(1);
        let text = cell_text(cell);
        out.extend(std::iter::repeat_n(text, span));
    }
    out
}

/// Rows of `table` itself, not of tables nested in its cells.
fn own_rows<'a>(table: ElementRef<'a>, rows: &'a Selector) -> impl Iterator<Item = ElementRef<'a>> {
    table.select(rows).filter(move |r| nearest_is(*r, "table", table))
}

/// Cells of `row` itself.
fn own_cells<'a>(row: ElementRef<'a>, cells: &'a Selector) -> impl Iterator<Item = ElementRef<'a>> {
    row.select(cells).filter(move |c| nearest_is(*c, "tr", row))
}

/// True when the closest `tag` ancestor of `el` is `owner`.
fn nearest_is(el: ElementRef<'_>, tag: &str, owner: ElementRef<'_>) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == tag)
        .is_some_and(|a| a.id() == owner.id())
}

/// Visible text with whitespace collapsed, leaving out nested tables.
fn cell_text(cell: ElementRef<'_>) -> String {
    cell.descendants()
        .filter(|node| {
            !node
                .ancestors()
                .take_while(|a| a.id() != cell.id())
                .any(|a| a.value().as_element().is_some_and(|e| e.name() == "table"))
        })
        .filter_map(|node| node.value().as_text())
        .flat_map(|text| text.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str], tag: &str) -> String {
        let inner: String = cells.iter().map(|c| format!("<{tag}>{c}</{tag}>")).collect();
        format!("<tr>{inner}</tr>")
    }

    fn seven_header_table(body: &[String]) -> String {
        let header = row(&["Date", "Open", "High", "Low", "Close", "Adj Close", "Volume"], "th");
        format!("<table>{}{}</table>", header, body.concat())
    }

    #[test]
    fn element_parse_truncates_long_rows_and_drops_short_ones() {
        let long = row(&["Jan 03, 2023", "1", "2", "3", "4", "5", "100", "decor"], "td");
        let short = row(&["Jan 04, 2023", "1", "2", "3", "4", "5"], "td");
        let table = parse_table_element(&seven_header_table(&[long, short])).unwrap();

        assert_eq!(table.rows().len(), 1);
        assert_eq!(table.rows()[0].len(), 7);
        assert_eq!(table.rows()[0][6], "100");
    }

    #[test]
    fn element_parse_defaults_headers() {
        let markup = format!(
            "<table>{}{}</table>",
            row(&["ignored"], "td"),
            row(&["Jan 03, 2023", "1", "2", "3", "4", "5", "100"], "td")
        );
        let table = parse_table_element(&markup).unwrap();
        assert_eq!(table.headers(), CANONICAL_COLUMNS);
        assert_eq!(table.rows().len(), 1);
    }

    #[test]
    fn element_parse_skips_header_only_rows() {
        let markup = seven_header_table(&[row(&["x"], "th")]);
        let table = parse_table_element(&markup).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn document_parse_uses_thead_and_pads() {
        let markup = r#"<html><body><p>intro</p>
            <table>
              <thead><tr><th>Date</th><th>Close <span>Close price adjusted for splits.</span></th><th>Volume</th></tr></thead>
              <tbody>
                <tr><td>Jan 03, 2023</td><td>125.07</td><td>112,117,500</td></tr>
                <tr><td>Feb 10, 2023</td><td colspan="2">0.23 Dividend</td></tr>
                <tr><td>Feb 13, 2023</td></tr>
              </tbody>
            </table>
            <table><tr><th>Other</th></tr><tr><td>1</td></tr></table>
        </body></html>"#;
        let table = parse_first_table(markup).unwrap();

        assert_eq!(table.headers()[1], "Close Close price adjusted for splits.");
        assert_eq!(table.rows().len(), 3);
        assert_eq!(table.rows()[1], ["Feb 10, 2023", "0.23 Dividend", "0.23 Dividend"]);
        assert_eq!(table.rows()[2], ["Feb 13, 2023", "", ""]);
    }

    #[test]
    fn nested_tables_stay_inside_their_cell() {
        let markup = r#"<html><body><table>
            <thead><tr><th>Date</th><th>Note</th></tr></thead>
            <tbody>
              <tr><td>Jan 03, 2023</td><td>split <table><tr><td>x</td><td>y</td></tr></table> 1</td></tr>
            </tbody>
        </table></body></html>"#;
        let table = parse_first_table(markup).unwrap();

        assert_eq!(table.rows().to_vec(), vec![vec!["Jan 03, 2023".to_string(), "split 1".to_string()]]);

        let element = r#"<table><tr><th>Date</th><th>Note</th></tr>
            <tr><td>Jan 03, 2023</td><td><table><tr><td>a</td><td>b</td></tr></table>ok</td></tr></table>"#;
        let table = parse_table_element(element).unwrap();
        assert_eq!(table.rows().to_vec(), vec![vec!["Jan 03, 2023".to_string(), "ok".to_string()]]);
    }

    #[test]
    fn document_parse_numbers_columns_without_header() {
        let markup = "<table><tr><td>a</td><td>b</td></tr></table>";
        let table = parse_first_table(markup).unwrap();
        assert_eq!(table.headers(), ["0", "1"]);
        assert_eq!(table.rows().len(), 1);
    }

    #[test]
    fn chain_falls_back_to_element() {
        let element = seven_header_table(&[row(
            &["Jan 03, 2023", "1", "2", "3", "4", "5", "100"],
            "td",
        )]);
        let sources = MarkupSources {
            document: Some("<html><body>no tables here</body></html>".into()),
            table: Some(element),
        };
        let table = extract(&sources).unwrap();
        assert_eq!(table.headers()[5], "Adj Close");
    }

    #[test]
    fn chain_fails_after_both_strategies() {
        let sources = MarkupSources {
            document: Some("<p>nothing</p>".into()),
            table: Some(seven_header_table(&[])),
        };
        let err = extract(&sources).unwrap_err();
        match err {
            ScrapeError::ExtractionFailed(reason) => {
                assert!(reason.contains("Document"));
                assert!(reason.contains("Element"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
