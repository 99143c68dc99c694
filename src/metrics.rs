//! Run metrics: counters and timing for one pipeline run.
//!
//! A [`RunMetrics`] value lives inside the [`Pipeline`](crate::Pipeline) and is
//! updated after every chunk. It can be logged at the end of a run or saved as
//! a JSON document next to the output.
//!
//! # Example
//!
//! ```no_run
//! use taxi_trip_prep::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut pipeline = Pipeline::new(PipelineConfig::default())?;
//! let _ = pipeline.run();
//!
//! pipeline.metrics().log();
//! pipeline.metrics().save_to_file("metrics.json")?;
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

/// Counters collected while a pipeline runs.
#[derive(Debug, Clone, Default)]
pub struct RunMetrics {
    /// Data rows skipped before the first chunk (restart offset).
    pub rows_skipped: u64,
    /// Data rows consumed into chunks, malformed ones included.
    pub rows_consumed: u64,
    /// Rows dropped because they violated the schema.
    pub malformed_rows: u64,
    /// Trips that went through the chunk transform.
    pub trips_transformed: u64,
    /// Trip instance records written to chunk files.
    pub records_written: u64,
    /// Chunk files written.
    pub chunks_written: u64,
    start_time: Option<Instant>,
    end_time: Option<Instant>,
}

impl RunMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the start time of the run.
    pub fn record_start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Record the end time of the run.
    pub fn record_end(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Get the elapsed run time, if both ends were recorded.
    #[must_use]
    pub fn elapsed(&self) -> Option<Duration> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some(end.duration_since(start)),
            _ => None,
        }
    }

    /// Get all metrics as a JSON object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut obj = json!({
            "rows_skipped": self.rows_skipped,
            "rows_consumed": self.rows_consumed,
            "malformed_rows": self.malformed_rows,
            "trips_transformed": self.trips_transformed,
            "records_written": self.records_written,
            "chunks_written": self.chunks_written,
        });
        if let Some(elapsed) = self.elapsed() {
            obj["execution_time_ms"] = json!(elapsed.as_millis() as u64);
        }
        obj
    }

    /// Log all metrics as one `info` event.
    pub fn log(&self) {
        tracing::info!(
            rows_skipped = self.rows_skipped,
            rows_consumed = self.rows_consumed,
            malformed_rows = self.malformed_rows,
            trips_transformed = self.trips_transformed,
            records_written = self.records_written,
            chunks_written = self.chunks_written,
            elapsed_ms = self.elapsed().map(|d| d.as_millis() as u64),
            "run metrics"
        );
    }

    /// Save all metrics to a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written to.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let formatted = serde_json::to_string_pretty(&self.to_json())?;
        let mut file = File::create(path).with_context(|| format!("create {}", path.display()))?;
        file.write_all(formatted.as_bytes())?;
        Ok(())
    }
}
