//! Monthly aggregation engine.
//!
//! Scans the data table for rows in the target month, groups them by program
//! and writes each program's occupancy average into the summary table. The
//! ratio is mean(census) / capacity, capacity being read once per program
//! from the first matching row; it is assumed constant within a month.

use crate::config::Config;
use crate::engine::{EngineError, PROGRAM_COLUMN, WEEK_COLUMN};
use crate::error::TrackerError;
use crate::table::cell::Value;
use crate::table::reference::cell_position;
use crate::table::TableStore;
use chrono::Datelike;
use regex::Regex;
use std::collections::HashMap;
use tracing::info;

/// Column holding the weekly occupancy reading.
pub const CENSUS_COLUMN: &str = "Census";

/// Column holding the program capacity.
pub const CAPACITY_COLUMN: &str = "Full";

/// Summary value for a program with no rows in the target month.
pub const MISSING_LABEL: &str = "Not found in data!";

/// Summary value when no average can be computed.
pub const NOT_AVAILABLE_LABEL: &str = "N/A";

/// Rows of the summary table reserved for the month cell and column titles.
const SUMMARY_META_ROWS: usize = 2;

/// Column of the summary table holding program names; values go next to it.
const SUMMARY_NAME_COLUMN: usize = 1;

/// Cell of the summary table holding the target month.
const MONTH_CELL: (usize, usize) = (0, 1);

/// Per-program accumulator over the target month's rows.
struct MonthlyGroup {
    /// Capacity from the first matching row; not summed across rows
    capacity: f64,
    census_sum: f64,
    /// Rows with a valid numeric census reading
    count: u32,
}

/// Recomputes the summary table's occupancy averages for the month named in
/// its designated month cell.
///
/// If the summary's program rows do not match the configuration they are
/// rebuilt first (names in configuration order, values cleared). The computed
/// value cells are written back in one batch; on error the engine aborts
/// before writing.
pub fn recompute_averages(
    store: &mut impl TableStore,
    data_table: &str,
    summary_table: &str,
    config: &Config,
) -> Result<(), TrackerError> {
    let summary = store.all_rows(summary_table)?;
    if summary.row_count() < SUMMARY_META_ROWS {
        return Err(EngineError::MalformedSummary {
            table: summary_table.to_owned(),
        }
        .into());
    }
    let month_cell = summary
        .rows()
        .get(MONTH_CELL.0)
        .and_then(|row| row.get(MONTH_CELL.1))
        .cloned()
        .unwrap_or(Value::Empty);
    let (year, month) = target_month(&month_cell)?;

    if summary.row_count() - SUMMARY_META_ROWS != config.programs.len() {
        rebuild_summary(store, summary_table, config)?;
    }

    let groups = collect_monthly_groups(store, data_table, year, month)?;

    let summary = store.all_rows(summary_table)?;
    let values: Vec<Vec<Value>> = summary
        .rows()
        .iter()
        .skip(SUMMARY_META_ROWS)
        .map(|row| {
            let name = row
                .get(SUMMARY_NAME_COLUMN)
                .and_then(Value::as_text)
                .unwrap_or_default();
            vec![Value::text(name), average_value(groups.get(name))]
        })
        .collect();
    store.write_range(summary_table, SUMMARY_META_ROWS, SUMMARY_NAME_COLUMN, &values)?;

    info!(
        data_table,
        summary_table, year, month, programs = values.len(), "recomputed monthly averages"
    );
    Ok(())
}

/// Scans all data rows and accumulates census readings per program for the
/// target month. Rows with a non-numeric census still create their group.
fn collect_monthly_groups(
    store: &impl TableStore,
    data_table: &str,
    year: i32,
    month: u32,
) -> Result<HashMap<String, MonthlyGroup>, TrackerError> {
    let data = store.all_rows(data_table)?;
    let week_column = data.column_index(WEEK_COLUMN)?;
    let program_column = data.column_index(PROGRAM_COLUMN)?;
    let census_column = data.column_index(CENSUS_COLUMN)?;
    let capacity_column = data.column_index(CAPACITY_COLUMN)?;

    let mut groups: HashMap<String, MonthlyGroup> = HashMap::new();
    for row in data.rows().iter().skip(1) {
        let Some(date) = row[week_column].as_date() else {
            continue;
        };
        if date.year() != year || date.month() != month {
            continue;
        }
        let Some(program) = row[program_column].as_text() else {
            continue;
        };
        let group = groups
            .entry(program.to_owned())
            .or_insert_with(|| MonthlyGroup {
                capacity: row[capacity_column].as_number().unwrap_or(0.0),
                census_sum: 0.0,
                count: 0,
            });
        if let Some(census) = row[census_column].as_number() {
            group.census_sum += census;
            group.count += 1;
        }
    }
    Ok(groups)
}

/// Formats one program's summary value from its accumulated group.
fn average_value(group: Option<&MonthlyGroup>) -> Value {
    match group {
        None => Value::text(MISSING_LABEL),
        Some(group) if group.count == 0 || group.capacity == 0.0 => {
            Value::text(NOT_AVAILABLE_LABEL)
        }
        Some(group) => {
            let average = group.census_sum / group.count as f64;
            Value::text(format!("{:.2}%", average / group.capacity * 100.0))
        }
    }
}

/// Replaces the summary's program rows with one blank row per configured
/// program, names written in configuration order.
fn rebuild_summary(
    store: &mut impl TableStore,
    summary_table: &str,
    config: &Config,
) -> Result<(), TrackerError> {
    let current = store.all_rows(summary_table)?;
    let stale_rows = current.row_count() - SUMMARY_META_ROWS;
    if stale_rows > 0 {
        store.delete_rows(summary_table, SUMMARY_META_ROWS, stale_rows)?;
    }
    if !config.programs.is_empty() {
        store.insert_rows(summary_table, SUMMARY_META_ROWS - 1, config.programs.len())?;
        let names: Vec<Vec<Value>> = config
            .programs
            .iter()
            .map(|program| vec![Value::text(program)])
            .collect();
        store.write_range(summary_table, SUMMARY_META_ROWS, SUMMARY_NAME_COLUMN, &names)?;
    }
    Ok(())
}

/// Reads the target (year, month) from the designated month cell. Date cells
/// are taken as-is; text cells like "July 2025" are parsed as a fallback.
fn target_month(cell: &Value) -> Result<(i32, u32), EngineError> {
    let parsed = match cell {
        Value::Date(date) => Some((date.year(), date.month())),
        Value::Text(text) => parse_month_text(text),
        _ => None,
    };
    parsed.ok_or_else(|| EngineError::InvalidMonthCell {
        position: cell_position(MONTH_CELL.0, MONTH_CELL.1),
        value: cell.to_string(),
    })
}

/// Parses "<month name> <year>" with English month names, full or abbreviated.
fn parse_month_text(text: &str) -> Option<(i32, u32)> {
    let pattern = Regex::new(r"^\s*([A-Za-z]+)\.?\s+(\d{4})\s*$").expect("Hardcode regex pattern");
    let captures = pattern.captures(text)?;
    let name = captures[1].to_ascii_lowercase();
    let month = match name.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    let year = captures[2].parse().ok()?;
    Some((year, month))
}
