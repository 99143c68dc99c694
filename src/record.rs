//! Trip records: the typed input row and the flattened per-point output row.
//!
//! The source schema is fixed. Every column is nullable text except
//! `trip_start_time` (unsigned epoch seconds, nullable through the missing-value
//! token) and `partial_location_flag` (a non-nullable boolean). The raw
//! `trip_location` polyline stays text here; it is parsed during the chunk
//! transform, where a bad polyline fails the whole chunk instead of one row.

use crate::validation::{ValidationError, ValidationResult};
use csv::StringRecord;
use serde::{Deserialize, Serialize};

/// A single `[longitude, latitude]` point.
pub type Location = [f64; 2];

/// Column names of the source file, in source order.
pub const COLUMN_NAMES: [&str; 9] = [
    "trip_id",
    "call_type",
    "customer_id",
    "taxi_stand_id",
    "taxi_id",
    "trip_start_time",
    "surge_rate",
    "partial_location_flag",
    "trip_location",
];

/// Tokens treated as missing by default: an empty field and the literal `NA`.
pub const DEFAULT_NA_VALUES: [&str; 2] = ["", "NA"];

/// The set of raw field values that map to null.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingValues {
    tokens: Vec<String>,
}

impl MissingValues {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_missing(&self, raw: &str) -> bool {
        self.tokens.iter().any(|t| t == raw)
    }

    /// Nullable text: `None` for a missing-value token, the raw text otherwise.
    pub fn text(&self, raw: &str) -> Option<String> {
        if self.is_missing(raw) {
            None
        } else {
            Some(raw.to_string())
        }
    }
}

impl Default for MissingValues {
    fn default() -> Self {
        Self::new(DEFAULT_NA_VALUES)
    }
}

/// One trip as read from the source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRecord {
    pub trip_id: Option<String>,
    pub call_type: Option<String>,
    pub customer_id: Option<String>,
    pub taxi_stand_id: Option<String>,
    pub taxi_id: Option<String>,
    /// Epoch seconds as read; epoch milliseconds after the chunk rescale.
    pub trip_start_time: Option<u64>,
    pub surge_rate: Option<String>,
    pub partial_location_flag: bool,
    /// JSON-encoded list of `[longitude, latitude]` pairs.
    pub trip_location: Option<String>,
}

impl TripRecord {
    /// Apply the fixed schema to a raw CSV row.
    ///
    /// All field problems are reported together, so a malformed row carries
    /// every reason it was rejected.
    ///
    /// # Errors
    /// Returns the validation errors if the row has the wrong number of fields,
    /// a `trip_start_time` that is neither an unsigned integer nor a missing
    /// value, or an unrecognised `partial_location_flag`.
    pub fn from_csv_row(row: &StringRecord, na: &MissingValues) -> ValidationResult<Self> {
        if row.len() != COLUMN_NAMES.len() {
            return Err(vec![ValidationError::new(format!(
                "expected {} fields, found {}",
                COLUMN_NAMES.len(),
                row.len()
            ))]);
        }

        let mut errors = Vec::new();
        let field = |i: usize| row.get(i).unwrap_or_default();

        let trip_start_time = match parse_start_time(field(5), na) {
            Ok(v) => v,
            Err(e) => {
                errors.push(e);
                None
            }
        };
        let partial_location_flag = match parse_flag(field(7)) {
            Ok(v) => v,
            Err(e) => {
                errors.push(e);
                false
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self {
            trip_id: na.text(field(0)),
            call_type: na.text(field(1)),
            customer_id: na.text(field(2)),
            taxi_stand_id: na.text(field(3)),
            taxi_id: na.text(field(4)),
            trip_start_time,
            surge_rate: na.text(field(6)),
            partial_location_flag,
            trip_location: na.text(field(8)),
        })
    }

    /// Short label for log and error messages.
    pub fn label(&self) -> &str {
        self.trip_id.as_deref().unwrap_or("<null trip_id>")
    }
}

fn parse_start_time(raw: &str, na: &MissingValues) -> Result<Option<u64>, ValidationError> {
    if na.is_missing(raw) {
        return Ok(None);
    }
    raw.trim().parse::<u64>().map(Some).map_err(|_| {
        ValidationError::field(
            "trip_start_time",
            format!("not an unsigned integer: {raw:?}"),
        )
    })
}

fn parse_flag(raw: &str) -> Result<bool, ValidationError> {
    match raw.trim() {
        "True" | "true" | "TRUE" | "1" => Ok(true),
        "False" | "false" | "FALSE" | "0" => Ok(false),
        other => Err(ValidationError::field(
            "partial_location_flag",
            format!("not a boolean: {other:?}"),
        )),
    }
}

/// One point of a trip, carrying the trip's metadata.
///
/// Field order is the key order of the serialized JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripInstanceRecord {
    pub trip_id: Option<String>,
    pub call_type: Option<String>,
    pub customer_id: Option<String>,
    pub taxi_stand_id: Option<String>,
    pub taxi_id: Option<String>,
    /// Epoch milliseconds.
    pub trip_start_time: Option<u64>,
    pub surge_rate: Option<String>,
    pub partial_location_flag: bool,
    /// 0-based position of the point within its trip.
    pub trip_instance_id: u64,
    /// `None` only for the placeholder record of a trip with no points.
    pub trip_instance_location: Option<Location>,
}

impl TripInstanceRecord {
    /// Build the record for point `trip_instance_id` of `trip`.
    pub fn from_trip(
        trip: &TripRecord,
        trip_instance_id: u64,
        trip_instance_location: Option<Location>,
    ) -> Self {
        Self {
            trip_id: trip.trip_id.clone(),
            call_type: trip.call_type.clone(),
            customer_id: trip.customer_id.clone(),
            taxi_stand_id: trip.taxi_stand_id.clone(),
            taxi_id: trip.taxi_id.clone(),
            trip_start_time: trip.trip_start_time,
            surge_rate: trip.surge_rate.clone(),
            partial_location_flag: trip.partial_location_flag,
            trip_instance_id,
            trip_instance_location,
        }
    }
}
