//! Date Coercion Module
//! Per-column attempt to read date-candidate columns as calendar dates.

use super::table::{Table, TableError};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use log::warn;
use serde::Serialize;
use std::fmt;

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: [&str; 9] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%Y%m%d",
];

/// Parse one cell as a date, trying the common layouts in turn.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.date());
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

/// Calendar month bucket, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Why a column was left out of the time series choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CoercionFailure {
    /// No non-empty values at all.
    NoValues,
    /// Fewer than half of the non-empty values read as dates.
    TooFewDates { parsed: usize, present: usize },
}

impl fmt::Display for CoercionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoercionFailure::NoValues => write!(f, "no values"),
            CoercionFailure::TooFewDates { parsed, present } => {
                write!(f, "only {} of {} values are dates", parsed, present)
            }
        }
    }
}

/// Outcome of coercing one date-candidate column.
#[derive(Debug, Clone, PartialEq)]
pub struct DateCoercion {
    pub column: String,
    pub outcome: Result<Vec<Option<NaiveDate>>, CoercionFailure>,
    /// Non-empty cells that did not parse; they count as missing dates.
    pub unparsed: usize,
}

impl DateCoercion {
    pub fn is_coerced(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Coerce a single column cell by cell. Cells that don't parse become
/// missing. The column is kept when at least half of its non-empty values
/// are dates, which leaves plain text columns out.
pub fn coerce_column(table: &Table, column: &str) -> Result<DateCoercion, TableError> {
    let values = table.text_values(column)?;
    let mut dates = Vec::with_capacity(values.len());
    let mut present = 0usize;
    let mut parsed = 0usize;

    for value in &values {
        match value.as_deref().map(str::trim) {
            None | Some("") => dates.push(None),
            Some(text) => {
                present += 1;
                let date = parse_date(text);
                if date.is_some() {
                    parsed += 1;
                }
                dates.push(date);
            }
        }
    }

    let outcome = if present == 0 {
        Err(CoercionFailure::NoValues)
    } else if parsed == 0 || parsed * 2 < present {
        Err(CoercionFailure::TooFewDates { parsed, present })
    } else {
        Ok(dates)
    };
    Ok(DateCoercion {
        column: column.to_string(),
        outcome,
        unparsed: present - parsed,
    })
}

/// Coerce every candidate; failures are reported, never fatal.
pub fn coerce_candidates(
    table: &Table,
    candidates: &[String],
) -> Result<Vec<DateCoercion>, TableError> {
    let mut results = Vec::with_capacity(candidates.len());
    for column in candidates {
        let coercion = coerce_column(table, column)?;
        match &coercion.outcome {
            Err(reason) => warn!("Skipping '{}' for time series: {}", column, reason),
            Ok(_) if coercion.unparsed > 0 => warn!(
                "'{}': {} value(s) are not dates and are left out",
                column, coercion.unparsed
            ),
            Ok(_) => {}
        }
        results.push(coercion);
    }
    Ok(results)
}
