//! # Weekly Tracker Core
//!
//! Automates a weekly tracking workbook for a set of named programs: a data
//! table keyed by (program, week) rows plus a per-month summary of occupancy
//! averages.
//!
//! ## Features
//!
//! - **Week extension**: appends a new week block — one row per configured
//!   program in list order plus a totals row — seven days after the prior
//!   block, carrying forward configured columns and rewriting `SUM` formulas.
//!   All-or-nothing: any failure restores the pre-call snapshot.
//! - **Monthly aggregation**: groups the target month's rows by program and
//!   writes each program's mean(census) / capacity percentage into the
//!   summary table, rebuilding its program rows when the configuration
//!   changed.
//! - **Abstract table store**: the engines talk to the spreadsheet host
//!   through the [`table::TableStore`] trait; [`table::Workbook`] is the
//!   in-memory implementation.
//! - **Fresh configuration**: the program list, carry-forward and totals
//!   column sets are re-read from their config tables on every invocation.
//!
//! The engines are single-threaded and synchronous; the store is assumed to
//! be exclusively held for the duration of one invocation, enforced by the
//! host and the [`guard`] module's cooldown rather than by locking.

pub mod config;
pub mod engine;
pub mod error;
pub mod guard;
pub mod table;

pub use crate::config::Config;
pub use crate::engine::{extend_week, recompute_averages};
pub use crate::error::TrackerError;
pub use crate::table::cell::Value;
pub use crate::table::{Table, TableStore, Workbook};
