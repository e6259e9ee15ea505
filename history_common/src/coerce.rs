//! Cell coercion. Never fails: anything unparseable becomes `Cell::Null`.
//!
//! Numeric cells only have comma thousands separators removed before
//! parsing. Period-grouped values such as `1.300.000` are not rewritten and
//! end up null rather than misread.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::debug;

use crate::model::{Cell, DATE, NUMERIC_COLUMNS, NormalizedTable, TypedTable};

const DATE_FORMATS: [&str; 9] = [
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%d-%b-%Y",
];

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M"];

/// How a column's cells are typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Parsed with `parse_date`.
    Date,
    /// Parsed with `parse_number`.
    Numeric,
    /// Passed through as text.
    Text,
}

impl ColumnKind {
    /// Kind for a canonical or passthrough column name.
    pub fn of(column: &str) -> Self {
        if column == DATE {
            ColumnKind::Date
        } else if NUMERIC_COLUMNS.contains(&column) {
            ColumnKind::Numeric
        } else {
            ColumnKind::Text
        }
    }

    /// Coerce one cell.
    pub fn coerce(self, raw: &str) -> Cell {
        match self {
            ColumnKind::Date => parse_date(raw).map_or(Cell::Null, Cell::Date),
            ColumnKind::Numeric => parse_number(raw).map_or(Cell::Null, Cell::Number),
            ColumnKind::Text => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    Cell::Null
                } else {
                    Cell::Text(trimmed.to_string())
                }
            }
        }
    }
}

/// Strip comma separators and parse a finite number.
pub fn parse_number(raw: &str) -> Option<f64> {
    let stripped: String = raw.trim().chars().filter(|c| *c != ',').collect();
    stripped.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse the common date spellings of history tables; time parts are dropped.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// Type every cell of `table` according to its column.
pub fn coerce(table: NormalizedTable) -> TypedTable {
    let kinds: Vec<ColumnKind> = table.columns.iter().map(|c| ColumnKind::of(c)).collect();
    let mut nulled = 0usize;

    let rows = table
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .zip(&kinds)
                .map(|(raw, kind)| {
                    let cell = kind.coerce(raw);
                    if cell.is_null() && !raw.trim().is_empty() {
                        nulled += 1;
                    }
                    cell
                })
                .collect()
        })
        .collect();

    if nulled > 0 {
        debug!("{} non-empty cells could not be coerced and were nulled", nulled);
    }
    TypedTable { columns: table.columns, rows }
}
