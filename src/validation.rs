//! Row-level validation errors and the collector for malformed input rows.
//!
//! Rows that violate the fixed trip schema are never fatal: the reader drops
//! them from their chunk and hands them to a [`MalformedRowCollector`] so the
//! run can report what was skipped.
//!
//! # Example
//!
//! ```
//! use taxi_trip_prep::validation::*;
//!
//! let mut collector = MalformedRowCollector::new();
//! collector.add(MalformedRow {
//!     row: 17,
//!     line: Some(19),
//!     errors: vec![ValidationError::field("trip_start_time", "not an unsigned integer: \"abc\"")],
//! });
//!
//! assert_eq!(collector.count(), 1);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Error};
use std::path::Path;

/// Result of validating a raw row into `T`.
pub type ValidationResult<T = ()> = Result<T, Vec<ValidationError>>;

/// A single validation error with context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// The field that failed validation (optional)
    pub field: Option<String>,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error with just a message.
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }

    /// Create a validation error for a specific field.
    pub fn field<S: Into<String>, M: Into<String>>(field: S, message: M) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref field) = self.field {
            write!(f, "[{}] {}", field, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ValidationError {}

/// An input row dropped because it violated the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MalformedRow {
    /// 0-based data row index in the source (header excluded).
    pub row: u64,
    /// 1-based line number in the source, when the reader knows it.
    pub line: Option<u64>,
    /// Why the row was rejected.
    pub errors: Vec<ValidationError>,
}

impl fmt::Display for MalformedRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}", self.row)?;
        if let Some(line) = self.line {
            write!(f, " (line {line})")?;
        }
        write!(f, ": {}", format_errors(&self.errors))
    }
}

/// Default number of malformed rows kept in memory for reporting.
pub const DEFAULT_RETAINED_ROWS: usize = 10_000;

/// Collects malformed rows for end-of-run reporting.
///
/// The count is always exact; only the first `retain` rows keep their details,
/// so a badly broken source cannot grow the collector without bound.
#[derive(Debug, Clone)]
pub struct MalformedRowCollector {
    rows: Vec<MalformedRow>,
    total: u64,
    retain: usize,
}

impl Default for MalformedRowCollector {
    fn default() -> Self {
        Self::with_retention(DEFAULT_RETAINED_ROWS)
    }
}

impl MalformedRowCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a collector that keeps details for at most `retain` rows.
    pub fn with_retention(retain: usize) -> Self {
        Self {
            rows: Vec::new(),
            total: 0,
            retain,
        }
    }

    /// Record a malformed row.
    pub fn add(&mut self, row: MalformedRow) {
        self.total += 1;
        if self.rows.len() < self.retain {
            self.rows.push(row);
        }
    }

    /// Total number of malformed rows seen, including those not retained.
    pub fn count(&self) -> u64 {
        self.total
    }

    /// Retained malformed rows, in source order.
    pub fn rows(&self) -> &[MalformedRow] {
        &self.rows
    }

    /// Export retained rows to JSON format.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.rows)
    }

    /// Write retained rows to a file in JSON format.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let json = self.to_json().map_err(Error::other)?;
        std::fs::write(path, json)
    }
}

impl fmt::Display for MalformedRowCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MalformedRowCollector({} rows)", self.total)
    }
}

pub(crate) fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
