//! # Tracker Engines
//!
//! The two engines that operate on the tracking workbook: week extension
//! (append next week's rows with rollback) and monthly aggregation (occupancy
//! averages into the summary table). They never call each other; both read
//! their [`Config`](crate::config::Config) fresh and borrow the
//! [`TableStore`](crate::table::TableStore) for a single invocation.
pub mod aggregate;
pub mod extend;

pub use aggregate::recompute_averages;
pub use extend::extend_week;

use thiserror::Error;

/// Column holding the program name in the data table.
pub const PROGRAM_COLUMN: &str = "Program";

/// Column holding the week date in the data table.
pub const WEEK_COLUMN: &str = "Week";

/// Program-cell label of the synthetic totals row.
pub const TOTAL_LABEL: &str = "Total";

/// State errors raised by the engines when the workbook does not hold a
/// well-formed tracker.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Data table holds a header but no data rows
    #[error("Table '{table}' has no data rows")]
    EmptyTable { table: String },

    /// Terminal row's week cell is blank or not a date
    #[error("Invalid or missing week date in the last row of '{table}'")]
    MissingWeekDate { table: String },

    /// Summary table lacks its two reserved meta rows
    #[error("Summary table '{table}' is missing its reserved header rows")]
    MalformedSummary { table: String },

    /// Designated month cell is blank or unparseable
    #[error("Invalid target month at '{position}': '{value}'")]
    InvalidMonthCell { position: String, value: String },
}
