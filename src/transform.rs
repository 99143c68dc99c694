//! The per-chunk transform: rescale, parse, explode.
//!
//! The steps run over the whole chunk in that order, and any error aborts the
//! chunk. Nothing is emitted for a chunk unless every trip in it made it
//! through all three steps.

use crate::record::{Location, TripInstanceRecord, TripRecord};
use anyhow::{Context, Result, anyhow};

/// Seconds to milliseconds.
pub const MILLIS_PER_SECOND: u64 = 1000;

/// Convert every `trip_start_time` in the chunk from seconds to milliseconds.
///
/// Null start times stay null.
///
/// # Errors
/// Returns an error if a rescaled timestamp does not fit in a `u64`.
pub fn rescale_start_times(trips: &mut [TripRecord]) -> Result<()> {
    for trip in trips.iter_mut() {
        if let Some(secs) = trip.trip_start_time {
            let millis = secs.checked_mul(MILLIS_PER_SECOND).ok_or_else(|| {
                anyhow!(
                    "trip {}: trip_start_time {} overflows when rescaled to milliseconds",
                    trip.label(),
                    secs
                )
            })?;
            trip.trip_start_time = Some(millis);
        }
    }
    Ok(())
}

/// Parse a trip's `trip_location` text into its ordered list of points.
///
/// # Errors
/// Returns an error if the location is null, is not valid JSON, or is not a
/// list of 2-element numeric arrays.
pub fn parse_locations(trip: &TripRecord) -> Result<Vec<Location>> {
    let raw = trip
        .trip_location
        .as_deref()
        .ok_or_else(|| anyhow!("trip {}: trip_location is null", trip.label()))?;
    serde_json::from_str::<Vec<Location>>(raw)
        .with_context(|| format!("trip {}: parse trip_location {raw:?}", trip.label()))
}

/// Expand one trip into one record per point, numbered from 0.
///
/// A trip with no points still yields a single record, with
/// `trip_instance_id = 0` and a null location.
pub fn explode(trip: &TripRecord, locations: &[Location]) -> Vec<TripInstanceRecord> {
    if locations.is_empty() {
        return vec![TripInstanceRecord::from_trip(trip, 0, None)];
    }
    locations
        .iter()
        .enumerate()
        .map(|(i, loc)| TripInstanceRecord::from_trip(trip, i as u64, Some(*loc)))
        .collect()
}

/// Run rescale, parse and explode over one chunk of trips.
///
/// Output keeps input trip order, and point order within each trip.
///
/// # Errors
/// Returns the first rescale or parse error; no records are returned in that
/// case.
pub fn transform_chunk(mut trips: Vec<TripRecord>) -> Result<Vec<TripInstanceRecord>> {
    rescale_start_times(&mut trips)?;

    let parsed = trips
        .iter()
        .map(parse_locations)
        .collect::<Result<Vec<_>>>()?;

    let total = parsed.iter().map(|p| p.len().max(1)).sum();
    let mut out = Vec::with_capacity(total);
    for (trip, locations) in trips.iter().zip(&parsed) {
        out.extend(explode(trip, locations));
    }
    Ok(out)
}
