//! # taxi-trip-prep
//!
//! Flattens the ECML/PKDD 2015 taxi trajectory dataset into chunked JSON
//! documents ready for bulk ingestion into a search store.
//!
//! Each source row is one trip whose `POLYLINE` column holds a JSON list of
//! `[longitude, latitude]` points. The pipeline turns every trip into one
//! record per point (a *trip instance*), carrying the trip's metadata, and
//! writes each chunk of the source to its own `rowChunk_<n>.json` file.
//!
//! ## Quick Start
//!
//! ```no_run
//! use taxi_trip_prep::*;
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! let config = PipelineConfig::new("csvData/train.csv", "jsonData");
//! let mut pipeline = Pipeline::new(config)?;
//!
//! match pipeline.run() {
//!     Ok(summary) => println!("wrote {} chunks", summary.chunks_written),
//!     Err(e) => eprintln!("{e}; resume with skip_rows = {}", e.restart_offset),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Per-chunk flow
//!
//! 1. [`TripCsvReader`] reads `chunk_size` data rows and applies the schema;
//!    malformed rows are dropped and recorded
//! 2. [`transform_chunk`] rescales start times to milliseconds, parses each
//!    polyline, and explodes every trip into [`TripInstanceRecord`]s
//! 3. [`write_json_array`] writes the chunk atomically
//!
//! Any transform or I/O error stops the run with a [`PipelineError`] naming the
//! last completed chunk and the restart offset to use next.
//!
//! ## Module Overview
//!
//! - [`config`] - Run configuration, from defaults, a JSON file, or the environment
//! - [`record`] - Input and output record types
//! - [`transform`] - Rescale, parse and explode
//! - [`io`] - Chunked CSV reader, JSON chunk writer, gzip source decompression
//! - [`pipeline`] - The chunk loop and its state machine
//! - [`validation`] - Malformed-row errors and their collector
//! - [`metrics`] - Run counters and timing
//! - [`testing`] - Builders and fixtures for tests

pub mod config;
pub mod io;
pub mod metrics;
pub mod pipeline;
pub mod record;
pub mod testing;
pub mod transform;
pub mod validation;

pub use config::PipelineConfig;
pub use io::csv::{RowChunk, TripCsvReader};
pub use io::json::{chunk_file_name, chunk_path, read_json_array, write_json_array};
pub use metrics::RunMetrics;
pub use pipeline::{ChunkReport, Pipeline, PipelineError, PipelineState, RunSummary};
pub use record::{Location, MissingValues, TripInstanceRecord, TripRecord};
pub use transform::{explode, parse_locations, rescale_start_times, transform_chunk};
pub use validation::{MalformedRow, MalformedRowCollector, ValidationError};
