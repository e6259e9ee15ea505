//! Table types passed between pipeline stages.
//!
//! - `RawTable` — header and cell strings as scraped.
//! - `NormalizedTable` — same cells under canonical column names.
//! - `TypedTable` — cells coerced to numbers, dates or null; the artifact
//!   that gets persisted.

use std::fmt;

use chrono::NaiveDate;

/// Canonical date column.
pub const DATE: &str = "Date";
/// Canonical adjusted close column.
pub const ADJ_CLOSE: &str = "Adj_Close";
/// Canonical close column.
pub const CLOSE: &str = "Close";
/// Columns coerced to numbers.
pub const NUMERIC_COLUMNS: [&str; 6] = ["Open", "High", "Low", CLOSE, ADJ_CLOSE, "Volume"];
/// Every recognized output column, in display order.
pub const CANONICAL_COLUMNS: [&str; 7] = [DATE, "Open", "High", "Low", CLOSE, ADJ_CLOSE, "Volume"];

/// Scraped table: headers plus rows of cell text.
///
/// Every row holds exactly `headers.len()` cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Empty table with the given headers.
    pub fn new(headers: Vec<String>) -> Self {
        Self { headers, rows: Vec::new() }
    }

    /// Append a row, truncating cells beyond the header count.
    ///
    /// Rows shorter than the header are rejected and `false` is returned.
    pub fn push_row(&mut self, mut cells: Vec<String>) -> bool {
        if cells.len() < self.headers.len() {
            return false;
        }
        cells.truncate(self.headers.len());
        self.rows.push(cells);
        true
    }

    /// Column headers as scraped.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// True when there are no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Split into headers and rows.
    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<String>>) {
        (self.headers, self.rows)
    }
}

/// Raw cells under canonical, duplicate-free column names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedTable {
    /// Column names, unique.
    pub columns: Vec<String>,
    /// Rows aligned with `columns`.
    pub rows: Vec<Vec<String>>,
}

/// One coerced cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Missing or unparseable.
    Null,
    /// Numeric column value.
    Number(f64),
    /// Date column value.
    Date(NaiveDate),
    /// Passthrough column value.
    Text(String),
}

impl Cell {
    /// True for `Cell::Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Numeric value, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Date value, if this is a date.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(d) => Some(*d),
            _ => None,
        }
    }
}

/// CSV field form: plain decimal numbers, ISO-8601 dates, empty for null.
impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

/// Coerced table, the persisted artifact.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypedTable {
    /// Column names in output order.
    pub columns: Vec<String>,
    /// Rows aligned with `columns`.
    pub rows: Vec<Vec<Cell>>,
}

impl TypedTable {
    /// Index of the named column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All cells of the named column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&Cell>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when there are no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_row_truncates_and_rejects_short_rows() {
        let mut table = RawTable::new(vec!["A".into(), "B".into()]);
        assert!(table.push_row(vec!["1".into(), "2".into(), "extra".into()]));
        assert!(!table.push_row(vec!["1".into()]));
        assert_eq!(table.rows().to_vec(), vec![vec!["1".to_string(), "2".to_string()]]);
    }

    #[test]
    fn cells_render_as_csv_fields() {
        assert_eq!(Cell::Number(1_200_000.0).to_string(), "1200000");
        assert_eq!(Cell::Number(151.5).to_string(), "151.5");
        let date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        assert_eq!(Cell::Date(date).to_string(), "2023-01-01");
        assert_eq!(Cell::Null.to_string(), "");
    }
}
