//! Week extension engine.
//!
//! Appends a new week block to the data table: one row per configured program
//! in list order plus the totals row, all dated seven calendar days after the
//! prior block, with configured columns carried forward and sum formulas
//! rewritten. The whole operation is all-or-nothing; any failure restores the
//! table to its pre-call snapshot before the error is propagated.

use crate::config::Config;
use crate::engine::{EngineError, PROGRAM_COLUMN, TOTAL_LABEL, WEEK_COLUMN};
use crate::error::{ResultMessage, TrackerError};
use crate::table::cell::Value;
use crate::table::reference::sum_formula;
use crate::table::{Table, TableStore};
use chrono::Duration;
use std::collections::HashMap;
use tracing::{info, warn};

/// Extends the table by one week block.
///
/// Fails with a state error if the table has no data rows or the last row's
/// week cell is blank or not a date; that terminal block is the anchor for
/// both the carry-forward lookup and the new date.
pub fn extend_week(
    store: &mut impl TableStore,
    table: &str,
    config: &Config,
) -> Result<(), TrackerError> {
    let snapshot = store.all_rows(table)?;
    match append_week_block(store, table, config, &snapshot) {
        Ok(()) => {
            info!(table, rows = config.programs.len() + 1, "appended new week block");
            Ok(())
        }
        Err(err) => {
            warn!(table, error = %err, "week extension failed, restoring snapshot");
            restore(store, table, &snapshot)
                .map_err(TrackerError::from)
                .with_prefix("rollback after failed week extension")?;
            Err(err).with_prefix("week extension failed, table restored")
        }
    }
}

/// Steps 2-8 of the extension: everything that may fail after the snapshot
/// was taken. `snapshot` doubles as the consistent pre-call view of the data.
fn append_week_block(
    store: &mut impl TableStore,
    table: &str,
    config: &Config,
    snapshot: &Table,
) -> Result<(), TrackerError> {
    let rows = snapshot.rows();
    if rows.len() < 2 {
        return Err(EngineError::EmptyTable {
            table: table.to_owned(),
        }
        .into());
    }
    let week_column = snapshot.column_index(WEEK_COLUMN)?;
    let program_column = snapshot.column_index(PROGRAM_COLUMN)?;
    let prior_date = rows[rows.len() - 1][week_column]
        .as_date()
        .ok_or_else(|| EngineError::MissingWeekDate {
            table: table.to_owned(),
        })?;

    // The prior block is the maximal trailing run of rows dated prior_date.
    let mut block_start = rows.len();
    while block_start > 1 && rows[block_start - 1][week_column].as_date() == Some(prior_date) {
        block_start -= 1;
    }
    let prior_rows: HashMap<&str, &Vec<Value>> = rows[block_start..]
        .iter()
        .filter_map(|row| row[program_column].as_text().map(|name| (name, row)))
        .collect();

    let carry_columns = config
        .carry_forward
        .iter()
        .map(|name| snapshot.column_index(name))
        .collect::<Result<Vec<usize>, _>>()?;

    let block_rows = config.programs.len() + 1;
    store.insert_rows(table, rows.len() - 1, block_rows)?;

    // The in-memory store inserts genuinely blank rows, so no separate
    // anti-autofill clearing pass is needed before populating them.
    let mut new_rows = vec![vec![Value::Empty; snapshot.column_count()]; block_rows];
    for (index, program) in config.programs.iter().enumerate() {
        new_rows[index][program_column] = Value::text(program);
        // Programs absent from the prior block start from blank cells.
        if let Some(prior) = prior_rows.get(program.as_str()) {
            for &column in &carry_columns {
                new_rows[index][column] = prior[column].clone();
            }
        }
    }
    new_rows[block_rows - 1][program_column] = Value::text(TOTAL_LABEL);

    let new_date = prior_date + Duration::days(7);
    for row in &mut new_rows {
        row[week_column] = Value::Date(new_date);
    }

    let first_new_row = rows.len();
    store.write_range(table, first_new_row, 0, &new_rows)?;

    let totals_row = first_new_row + block_rows - 1;
    for name in &config.totals {
        let column = snapshot.column_index(name)?;
        let formula = sum_formula(column, first_new_row, totals_row - 1);
        store.write_formula(table, totals_row, column, &formula)?;
    }
    Ok(())
}

/// Restores the table to the snapshot: drops any rows inserted beyond the
/// original count, then rewrites every original value.
fn restore(store: &mut impl TableStore, table: &str, snapshot: &Table) -> Result<(), crate::table::TableError> {
    let current = store.all_rows(table)?;
    if current.row_count() > snapshot.row_count() {
        store.delete_rows(
            table,
            snapshot.row_count(),
            current.row_count() - snapshot.row_count(),
        )?;
    }
    store.write_range(table, 0, 0, snapshot.rows())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Workbook;
    use chrono::NaiveDate;

    const TRACKER: &str = "FY26 Tracker";

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("NaiveDate literal")
    }

    fn config() -> Config {
        Config {
            programs: vec!["Alpha".into(), "Beta".into(), "Gamma".into()],
            carry_forward: vec!["Full".into()],
            totals: vec!["Full".into(), "Census".into()],
            data_table: TRACKER.into(),
            columns: vec!["Week".into(), "Full".into(), "Census".into(), "Notes".into()],
        }
    }

    fn data_row(program: &str, week: NaiveDate, full: f64, census: Option<f64>) -> Vec<Value> {
        vec![
            Value::text(program),
            Value::Date(week),
            Value::Number(full),
            census.map(Value::Number).unwrap_or(Value::Empty),
            Value::Empty,
        ]
    }

    /// Two complete week blocks ending 2025-07-20, Alpha.Full=50, Beta.Full=30,
    /// Gamma.Full=40.
    fn workbook() -> Workbook {
        let earlier = date(2025, 7, 13);
        let prior = date(2025, 7, 20);
        let mut book = Workbook::new();
        book.add_table(
            TRACKER,
            vec![
                vec![
                    Value::text("Program"),
                    Value::text("Week"),
                    Value::text("Full"),
                    Value::text("Census"),
                    Value::text("Notes"),
                ],
                data_row("Alpha", earlier, 50.0, Some(17.0)),
                data_row("Beta", earlier, 30.0, Some(21.0)),
                data_row("Gamma", earlier, 40.0, Some(33.0)),
                data_row("Total", earlier, 0.0, None),
                data_row("Alpha", prior, 50.0, Some(18.0)),
                data_row("Beta", prior, 30.0, Some(22.0)),
                data_row("Gamma", prior, 40.0, Some(35.0)),
                data_row("Total", prior, 0.0, None),
            ],
        );
        book
    }

    fn cell<'a>(table: &'a Table, row: usize, column: usize) -> &'a Value {
        &table.rows()[row][column]
    }

    #[test]
    fn carries_values_and_advances_week() {
        let mut book = workbook();
        extend_week(&mut book, TRACKER, &config()).unwrap();

        let table = book.all_rows(TRACKER).unwrap();
        let next = date(2025, 7, 27);
        // New block starts at row 9: Alpha, Beta, Gamma, Total.
        assert_eq!(cell(&table, 9, 0), &Value::text("Alpha"));
        assert_eq!(cell(&table, 9, 2), &Value::Number(50.0));
        assert_eq!(cell(&table, 10, 0), &Value::text("Beta"));
        assert_eq!(cell(&table, 10, 2), &Value::Number(30.0));
        assert_eq!(cell(&table, 11, 2), &Value::Number(40.0));
        for row in 9..=12 {
            assert_eq!(cell(&table, row, 1), &Value::Date(next));
        }
        assert_eq!(cell(&table, 12, 0), &Value::text("Total"));
    }

    #[test]
    fn prior_block_keeps_its_date() {
        let mut book = workbook();
        extend_week(&mut book, TRACKER, &config()).unwrap();

        let table = book.all_rows(TRACKER).unwrap();
        for row in 5..=8 {
            assert_eq!(cell(&table, row, 1), &Value::Date(date(2025, 7, 20)));
        }
    }

    #[test]
    fn new_block_has_each_program_exactly_once() {
        let mut book = workbook();
        extend_week(&mut book, TRACKER, &config()).unwrap();

        let table = book.all_rows(TRACKER).unwrap();
        let names: Vec<&Value> = (9..=12).map(|row| cell(&table, row, 0)).collect();
        assert_eq!(
            names,
            vec![
                &Value::text("Alpha"),
                &Value::text("Beta"),
                &Value::text("Gamma"),
                &Value::text("Total"),
            ]
        );
    }

    #[test]
    fn block_shape_matches_configuration() {
        let mut book = workbook();
        let before = book.all_rows(TRACKER).unwrap();
        extend_week(&mut book, TRACKER, &config()).unwrap();

        let after = book.all_rows(TRACKER).unwrap();
        assert_eq!(after.row_count(), before.row_count() + 4);
        assert_eq!(after.column_count(), before.column_count());
    }

    #[test]
    fn uncarried_columns_stay_blank() {
        let mut book = workbook();
        extend_week(&mut book, TRACKER, &config()).unwrap();

        let table = book.all_rows(TRACKER).unwrap();
        for row in 9..=11 {
            // Census is totalled but not carried; Notes is neither.
            assert_eq!(cell(&table, row, 3), &Value::Empty);
            assert_eq!(cell(&table, row, 4), &Value::Empty);
        }
        // Totals row gets formulas only in configured columns.
        assert_eq!(cell(&table, 12, 4), &Value::Empty);
    }

    #[test]
    fn totals_formulas_cover_the_new_data_rows() {
        let mut book = workbook();
        extend_week(&mut book, TRACKER, &config()).unwrap();

        let table = book.all_rows(TRACKER).unwrap();
        // Data rows 9..=11 are wire rows 10..=12.
        assert_eq!(cell(&table, 12, 2), &Value::Formula("=SUM(C10:C12)".to_owned()));
        assert_eq!(cell(&table, 12, 3), &Value::Formula("=SUM(D10:D12)".to_owned()));
    }

    #[test]
    fn program_without_prior_row_starts_blank() {
        let mut book = workbook();
        let mut config = config();
        config.programs.push("Delta".into());
        extend_week(&mut book, TRACKER, &config).unwrap();

        let table = book.all_rows(TRACKER).unwrap();
        assert_eq!(cell(&table, 12, 0), &Value::text("Delta"));
        assert_eq!(cell(&table, 12, 2), &Value::Empty);
        assert_eq!(cell(&table, 12, 1), &Value::Date(date(2025, 7, 27)));
    }

    #[test]
    fn dropped_program_is_not_carried() {
        let mut book = workbook();
        let mut config = config();
        config.programs.retain(|name| name != "Gamma");
        extend_week(&mut book, TRACKER, &config).unwrap();

        let table = book.all_rows(TRACKER).unwrap();
        assert_eq!(table.row_count(), 12);
        let names: Vec<&Value> = (9..=11).map(|row| cell(&table, row, 0)).collect();
        assert_eq!(
            names,
            vec![&Value::text("Alpha"), &Value::text("Beta"), &Value::text("Total")]
        );
    }

    #[test]
    fn zero_programs_yield_totals_only_block() {
        let mut book = workbook();
        let mut config = config();
        config.programs.clear();
        config.carry_forward.clear();
        config.totals.clear();
        extend_week(&mut book, TRACKER, &config).unwrap();

        let table = book.all_rows(TRACKER).unwrap();
        assert_eq!(table.row_count(), 10);
        assert_eq!(cell(&table, 9, 0), &Value::text("Total"));
        assert_eq!(cell(&table, 9, 1), &Value::Date(date(2025, 7, 27)));
    }

    #[test]
    fn blank_terminal_date_fails_and_leaves_table_unchanged() {
        let mut book = workbook();
        book.write_range(TRACKER, 8, 1, &[vec![Value::Empty]]).unwrap();
        let before = book.all_rows(TRACKER).unwrap();

        let err = extend_week(&mut book, TRACKER, &config()).unwrap_err();
        assert!(err.to_string().contains("week date"));
        assert_eq!(book.all_rows(TRACKER).unwrap(), before);
    }

    #[test]
    fn failure_after_insertion_rolls_back_all_rows() {
        let mut book = workbook();
        let before = book.all_rows(TRACKER).unwrap();
        let mut config = config();
        // Unknown totals column fails after the rows were physically inserted.
        config.totals.push("Bogus".into());

        let err = extend_week(&mut book, TRACKER, &config).unwrap_err();
        assert!(err.to_string().contains("table restored"));
        assert_eq!(book.all_rows(TRACKER).unwrap(), before);
    }

    #[test]
    fn header_only_table_is_a_state_error() {
        let mut book = Workbook::new();
        book.add_table(
            TRACKER,
            vec![vec![
                Value::text("Program"),
                Value::text("Week"),
                Value::text("Full"),
                Value::text("Census"),
                Value::text("Notes"),
            ]],
        );
        let err = extend_week(&mut book, TRACKER, &config()).unwrap_err();
        assert!(err.to_string().contains("no data rows"));
    }
}
