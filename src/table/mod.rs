//! # Table Model and Store
//!
//! The engines see the spreadsheet host through the [`TableStore`] trait: an
//! addressable 2D grid of named tables supporting range reads and writes, row
//! insertion and deletion, and formula-cell assignment. [`Workbook`] is the
//! in-memory implementation used by the engines' callers and the tests.
pub mod cell;
pub mod reference;

use crate::table::cell::Value;
use crate::table::reference::cell_position;
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised by table access and mutation.
#[derive(Error, Debug)]
pub enum TableError {
    /// Requested table does not exist in the store
    #[error("Table '{0}' not found")]
    TableNotFound(String),

    /// Column name absent from the header row
    #[error("Column '{name}' not found")]
    ColumnNotFound { name: String },

    /// Row or cell reference outside the current grid
    #[error("Position '{position}' is out of bounds")]
    OutOfBounds { position: String },

    /// A written row does not match the table width
    #[error("Ragged write: expected {expected} cells, got {actual}")]
    RaggedWrite { expected: usize, actual: usize },
}

/// A snapshot of one table's values: row 0 is the header, rows >= 1 are data.
/// All rows have the same length as the header.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(rows: Vec<Vec<Value>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    /// Resolves a column name against the header row to a stable 0-based
    /// index, valid for the lifetime of one engine invocation.
    pub fn column_index(&self, name: &str) -> Result<usize, TableError> {
        self.rows
            .first()
            .and_then(|header| {
                header.iter().position(|cell| cell.as_text() == Some(name))
            })
            .ok_or_else(|| TableError::ColumnNotFound { name: name.to_owned() })
    }

    pub fn into_rows(self) -> Vec<Vec<Value>> {
        self.rows
    }
}

/// The host-side tabular data store the engines operate against.
///
/// All coordinates are 0-based; implementations are synchronous and assumed
/// to have exclusive access for the duration of one engine invocation.
pub trait TableStore {
    /// Reads the entire table including its header row.
    fn all_rows(&self, table: &str) -> Result<Table, TableError>;

    /// Inserts `count` blank rows immediately after row index `after`.
    /// Inserted cells are empty; no content is inferred from neighbors.
    fn insert_rows(&mut self, table: &str, after: usize, count: usize) -> Result<(), TableError>;

    /// Deletes `count` rows starting at row index `from`.
    fn delete_rows(&mut self, table: &str, from: usize, count: usize) -> Result<(), TableError>;

    /// Reads a rectangular range of values.
    fn read_range(
        &self,
        table: &str,
        row: usize,
        column: usize,
        row_count: usize,
        column_count: usize,
    ) -> Result<Vec<Vec<Value>>, TableError>;

    /// Writes a rectangular block of values with its top-left cell at
    /// (row, column). All rows of the block must have equal length.
    fn write_range(
        &mut self,
        table: &str,
        row: usize,
        column: usize,
        values: &[Vec<Value>],
    ) -> Result<(), TableError>;

    /// Assigns a formula string to a single cell.
    fn write_formula(
        &mut self,
        table: &str,
        row: usize,
        column: usize,
        formula: &str,
    ) -> Result<(), TableError>;

    /// Resolves a column name in the table's header row to its 0-based index.
    fn resolve_column_index(&self, table: &str, name: &str) -> Result<usize, TableError> {
        self.all_rows(table)?.column_index(name)
    }
}

/// In-memory workbook of named tables.
#[derive(Clone, Debug, Default)]
pub struct Workbook {
    tables: HashMap<String, Vec<Vec<Value>>>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a table. Short rows are padded with empty cells so the
    /// equal-row-length invariant holds from the start.
    pub fn add_table(&mut self, name: &str, mut rows: Vec<Vec<Value>>) {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, Value::Empty);
        }
        self.tables.insert(name.to_owned(), rows);
    }

    fn table(&self, name: &str) -> Result<&Vec<Vec<Value>>, TableError> {
        self.tables
            .get(name)
            .ok_or_else(|| TableError::TableNotFound(name.to_owned()))
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut Vec<Vec<Value>>, TableError> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| TableError::TableNotFound(name.to_owned()))
    }
}

impl TableStore for Workbook {
    fn all_rows(&self, table: &str) -> Result<Table, TableError> {
        Ok(Table::new(self.table(table)?.clone()))
    }

    fn insert_rows(&mut self, table: &str, after: usize, count: usize) -> Result<(), TableError> {
        let rows = self.table_mut(table)?;
        if after >= rows.len() {
            return Err(TableError::OutOfBounds {
                position: cell_position(after, 0),
            });
        }
        let width = rows.first().map(Vec::len).unwrap_or(0);
        for _ in 0..count {
            rows.insert(after + 1, vec![Value::Empty; width]);
        }
        Ok(())
    }

    fn delete_rows(&mut self, table: &str, from: usize, count: usize) -> Result<(), TableError> {
        let rows = self.table_mut(table)?;
        if from + count > rows.len() {
            return Err(TableError::OutOfBounds {
                position: cell_position(from + count - 1, 0),
            });
        }
        rows.drain(from..from + count);
        Ok(())
    }

    fn read_range(
        &self,
        table: &str,
        row: usize,
        column: usize,
        row_count: usize,
        column_count: usize,
    ) -> Result<Vec<Vec<Value>>, TableError> {
        let rows = self.table(table)?;
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if row + row_count > rows.len() || column + column_count > width {
            return Err(TableError::OutOfBounds {
                position: cell_position(row + row_count - 1, column + column_count - 1),
            });
        }
        Ok(rows[row..row + row_count]
            .iter()
            .map(|cells| cells[column..column + column_count].to_vec())
            .collect())
    }

    fn write_range(
        &mut self,
        table: &str,
        row: usize,
        column: usize,
        values: &[Vec<Value>],
    ) -> Result<(), TableError> {
        let rows = self.table_mut(table)?;
        let width = rows.first().map(Vec::len).unwrap_or(0);
        let block_width = values.first().map(Vec::len).unwrap_or(0);
        if values.iter().any(|cells| cells.len() != block_width) {
            let actual = values
                .iter()
                .map(Vec::len)
                .find(|len| *len != block_width)
                .unwrap_or(block_width);
            return Err(TableError::RaggedWrite {
                expected: block_width,
                actual,
            });
        }
        if row + values.len() > rows.len() || column + block_width > width {
            return Err(TableError::OutOfBounds {
                position: cell_position(row + values.len().max(1) - 1, column + block_width.max(1) - 1),
            });
        }
        for (offset, cells) in values.iter().enumerate() {
            rows[row + offset][column..column + block_width].clone_from_slice(cells);
        }
        Ok(())
    }

    fn write_formula(
        &mut self,
        table: &str,
        row: usize,
        column: usize,
        formula: &str,
    ) -> Result<(), TableError> {
        let rows = self.table_mut(table)?;
        let cell = rows
            .get_mut(row)
            .and_then(|cells| cells.get_mut(column))
            .ok_or_else(|| TableError::OutOfBounds {
                position: cell_position(row, column),
            })?;
        *cell = Value::Formula(formula.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workbook() -> Workbook {
        let mut book = Workbook::new();
        book.add_table(
            "Tracker",
            vec![
                vec![Value::text("Program"), Value::text("Week"), Value::text("Census")],
                vec![Value::text("Alpha"), Value::Empty, Value::Number(10.0)],
                vec![Value::text("Beta"), Value::Empty, Value::Number(20.0)],
            ],
        );
        book
    }

    #[test]
    fn column_resolution() {
        let book = workbook();
        assert_eq!(book.resolve_column_index("Tracker", "Census").unwrap(), 2);
        let err = book.resolve_column_index("Tracker", "Missing").unwrap_err();
        assert!(matches!(err, TableError::ColumnNotFound { .. }));
    }

    #[test]
    fn unknown_table_is_an_error() {
        let book = workbook();
        assert!(matches!(
            book.all_rows("Nope").unwrap_err(),
            TableError::TableNotFound(_)
        ));
    }

    #[test]
    fn insert_rows_are_blank() {
        let mut book = workbook();
        book.insert_rows("Tracker", 2, 2).unwrap();
        let table = book.all_rows("Tracker").unwrap();
        assert_eq!(table.row_count(), 5);
        assert_eq!(table.rows()[3], vec![Value::Empty; 3]);
        assert_eq!(table.rows()[4], vec![Value::Empty; 3]);
    }

    #[test]
    fn delete_rows_shrinks_table() {
        let mut book = workbook();
        book.delete_rows("Tracker", 1, 1).unwrap();
        let table = book.all_rows("Tracker").unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[1][0], Value::text("Beta"));
    }

    #[test]
    fn range_round_trip() {
        let mut book = workbook();
        book.write_range(
            "Tracker",
            1,
            1,
            &[vec![Value::Number(1.0), Value::Number(2.0)]],
        )
        .unwrap();
        let read = book.read_range("Tracker", 1, 1, 1, 2).unwrap();
        assert_eq!(read, vec![vec![Value::Number(1.0), Value::Number(2.0)]]);
    }

    #[test]
    fn out_of_bounds_read_fails() {
        let book = workbook();
        assert!(matches!(
            book.read_range("Tracker", 2, 0, 2, 1).unwrap_err(),
            TableError::OutOfBounds { .. }
        ));
    }

    #[test]
    fn ragged_write_fails() {
        let mut book = workbook();
        let err = book
            .write_range(
                "Tracker",
                1,
                0,
                &[vec![Value::Empty, Value::Empty], vec![Value::Empty]],
            )
            .unwrap_err();
        assert!(matches!(err, TableError::RaggedWrite { expected: 2, actual: 1 }));
    }

    #[test]
    fn formula_assignment() {
        let mut book = workbook();
        book.write_formula("Tracker", 2, 2, "=SUM(C2:C2)").unwrap();
        let table = book.all_rows("Tracker").unwrap();
        assert_eq!(table.rows()[2][2], Value::Formula("=SUM(C2:C2)".to_owned()));
    }
}
