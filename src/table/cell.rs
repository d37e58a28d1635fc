use chrono::NaiveDate;
use std::fmt::Display;

/// A single cell value in a tracking table.
///
/// Mirrors the value kinds the spreadsheet host can hand back: plain text,
/// numbers, calendar dates, blank cells, and cells holding a formula. A
/// `Formula` cell keeps the formula source; the host is the one that
/// evaluates it.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Formula(String),
}

impl Value {
    /// Convenience constructor for text cells.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns the numeric value for number cells, None otherwise.
    /// Text that merely looks numeric stays text, matching host semantics.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) if value.is_finite() => Some(*value),
            _ => None,
        }
    }

    /// Returns the date for date cells, None otherwise.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(date) => Some(*date),
            _ => None,
        }
    }

    /// Returns the text for text cells, None otherwise.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Host-style truthiness: blank cells, zero and empty strings are false,
    /// everything else is true. Used for configuration flag cells.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Empty => false,
            Self::Text(value) => !value.is_empty(),
            Self::Number(value) => *value != 0.0,
            Self::Date(_) | Self::Formula(_) => true,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(value) => write!(f, "{}", value),
            Self::Number(value) => write!(f, "{}", value),
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Formula(formula) => write!(f, "{}", formula),
        }
    }
}
