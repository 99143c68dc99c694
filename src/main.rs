//! Flatten the taxi trajectory CSV into `rowChunk_<n>.json` files.
//!
//! Configuration comes from the `TAXI_PREP_*` environment variables; see
//! [`PipelineConfig::from_env`].

use anyhow::Result;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use taxi_trip_prep::{Pipeline, PipelineConfig};

fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = PipelineConfig::from_env()?;
    tracing::info!(
        source = %config.source.display(),
        output_dir = %config.output_dir.display(),
        chunk_size = config.chunk_size,
        skip_rows = config.skip_rows,
        "starting"
    );

    let mut pipeline = Pipeline::new(config)?;
    let outcome = pipeline.run();
    pipeline.metrics().log();

    match outcome {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            tracing::error!(
                restart_offset = e.restart_offset,
                start_chunk = e.failed_chunk.unwrap_or(pipeline.config().start_chunk_index),
                "set TAXI_PREP_SKIP_ROWS and TAXI_PREP_START_CHUNK to these values to resume"
            );
            Ok(ExitCode::FAILURE)
        }
    }
}
