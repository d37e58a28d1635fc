//! Configuration provider for the tracker engines.
//!
//! Configuration lives in two dedicated tables of the same workbook: a
//! program list table whose first column names the programs and whose first
//! three rows describe the data columns, plus a small table naming the active
//! data table. It is re-read in full on every engine invocation and never
//! cached, so edits take effect on the next run.

use crate::error::TrackerError;
use crate::table::cell::Value;
use crate::table::TableStore;
use thiserror::Error;

/// Table holding the program list and the per-column flags.
pub const PROGRAM_LIST_TABLE: &str = "_programlist";

/// Table holding the name of the active data table.
pub const SHEET_CONFIG_TABLE: &str = "_sheetconfig";

/// First-column labels of the program list table that are layout markers,
/// not program names.
pub const RESERVED_ENTRIES: [&str; 3] = [
    "Program List",
    "1Calculate Totals?",
    "2Copy into next week?",
];

/// Errors raised while reading the configuration tables.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Program list table is missing its header or flag rows
    #[error("Config table '{table}' needs at least {expected} rows, found {actual}")]
    TooFewRows {
        table: String,
        expected: usize,
        actual: usize,
    },

    /// Active data table name cell is blank or not text
    #[error("Data table name is missing from '{table}'")]
    MissingDataTableName { table: String },
}

/// One engine invocation's worth of configuration, loaded fresh per call.
#[derive(Clone, Debug)]
pub struct Config {
    /// Program names in presentation order
    pub programs: Vec<String>,
    /// Columns whose prior-week value is copied into the new week's rows
    pub carry_forward: Vec<String>,
    /// Columns that receive a sum formula in the totals row
    pub totals: Vec<String>,
    /// Name of the active data table
    pub data_table: String,
    /// All data-entry column names declared in the program list header
    pub columns: Vec<String>,
}

impl Config {
    /// Reads the configuration tables from the store.
    ///
    /// Program list layout: row 0 is the header ("Program List" followed by
    /// the data column names), row 1 flags the columns to total, row 2 flags
    /// the columns to carry forward. Every other first-column value is a
    /// program name; blank cells and the reserved labels are skipped.
    pub fn load(store: &impl TableStore) -> Result<Self, TrackerError> {
        let program_list = store.all_rows(PROGRAM_LIST_TABLE)?;
        let rows = program_list.rows();
        if rows.len() < 3 {
            return Err(ConfigError::TooFewRows {
                table: PROGRAM_LIST_TABLE.to_owned(),
                expected: 3,
                actual: rows.len(),
            }
            .into());
        }

        let header = &rows[0];
        let totals = flagged_columns(header, &rows[1], 1);
        // Column 1 holds the week date and is never eligible for carry-forward.
        let carry_forward = flagged_columns(header, &rows[2], 2);

        let programs = rows
            .iter()
            .filter_map(|row| row.first().and_then(Value::as_text))
            .filter(|name| !name.is_empty() && !RESERVED_ENTRIES.contains(name))
            .map(str::to_owned)
            .collect();

        let columns = header
            .iter()
            .skip(1)
            .filter_map(Value::as_text)
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
            .collect();

        let sheet_config = store.all_rows(SHEET_CONFIG_TABLE)?;
        let data_table = sheet_config
            .rows()
            .get(1)
            .and_then(|row| row.first())
            .and_then(Value::as_text)
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
            .ok_or_else(|| ConfigError::MissingDataTableName {
                table: SHEET_CONFIG_TABLE.to_owned(),
            })?;

        Ok(Config {
            programs,
            carry_forward,
            totals,
            data_table,
            columns,
        })
    }
}

/// Collects header names whose companion flag cell is truthy, starting at
/// `first_column` to skip the label and any never-flagged leading columns.
fn flagged_columns(header: &[Value], flags: &[Value], first_column: usize) -> Vec<String> {
    header
        .iter()
        .zip(flags.iter())
        .skip(first_column)
        .filter(|(_, flag)| flag.is_truthy())
        .filter_map(|(name, _)| name.as_text())
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect()
}
