//! Testing utilities for trip pipelines.
//!
//! - **Builders**: [`TripRowBuilder`] produces raw source rows, including
//!   deliberately malformed ones
//! - **Fixtures**: sample rows shaped like the public dataset, and
//!   [`TestWorkspace`], a temporary directory with a source file, an output
//!   directory and helpers to read chunks back
//!
//! # Quick Start
//!
//! ```no_run
//! use taxi_trip_prep::*;
//! use taxi_trip_prep::testing::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let ws = TestWorkspace::new()?;
//! ws.write_source(&sample_trip_rows())?;
//!
//! let mut pipeline = Pipeline::new(ws.config())?;
//! pipeline.run()?;
//!
//! assert_eq!(ws.read_chunk(0)?.len(), 6);
//! # Ok(())
//! # }
//! ```

mod builders;
mod fixtures;

pub use builders::TripRowBuilder;
pub use fixtures::{SOURCE_HEADER, TestWorkspace, sample_trip_rows, source_text};
