//! Dropping rows with nothing left in them after coercion.

use log::debug;

use crate::model::{Cell, TypedTable};

/// Remove rows in which every cell is null. Partially null rows stay.
pub fn drop_empty_rows(mut table: TypedTable) -> TypedTable {
    let before = table.rows.len();
    table.rows.retain(|row| !row.iter().all(Cell::is_null));
    let removed = before - table.rows.len();
    if removed > 0 {
        debug!("Dropped {} all-null rows", removed);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_fully_null_rows_are_dropped() {
        let table = TypedTable {
            columns: ["Date", "Open", "Volume"].map(String::from).to_vec(),
            rows: vec![
                vec![Cell::Null, Cell::Null, Cell::Null],
                vec![Cell::Null, Cell::Number(100.0), Cell::Null],
            ],
        };
        let table = drop_empty_rows(table);
        assert_eq!(table.rows, vec![vec![Cell::Null, Cell::Number(100.0), Cell::Null]]);
    }
}
