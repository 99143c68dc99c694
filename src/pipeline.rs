//! The chunked read → transform → write loop.
//!
//! A [`Pipeline`] owns all per-run state: the chunk counter, the committed row
//! offset, metrics, and the malformed-row collector. Chunks are processed
//! strictly in order, and each one is all-or-nothing: either its whole
//! `rowChunk_<n>.json` file is written, or the run stops in
//! [`PipelineState::Failed`] without writing it.

use crate::config::PipelineConfig;
use crate::io::csv::{RowChunk, TripCsvReader};
use crate::io::json::{chunk_path, write_json_array};
use crate::metrics::RunMetrics;
use crate::transform::transform_chunk;
use crate::validation::{MalformedRow, MalformedRowCollector};
use anyhow::{Context, Result};
use std::fmt;
use std::path::PathBuf;

/// Where a pipeline is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Not started yet.
    Idle,
    /// Pulling the next chunk from the source.
    Reading,
    /// Transforming and writing chunk `chunk_index`.
    Processing { chunk_index: u64 },
    /// Input exhausted, every chunk written.
    Done,
    /// Stopped on chunk `chunk_index` (or before the first chunk when `None`).
    Failed { chunk_index: Option<u64> },
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed { .. })
    }
}

/// A completed chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkReport {
    pub chunk_index: u64,
    pub path: PathBuf,
    /// Data rows consumed, malformed ones included.
    pub rows_consumed: u64,
    pub trips: u64,
    pub records: u64,
    pub malformed_rows: u64,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Index of the first chunk written, or `None` when the input was empty.
    pub first_chunk_index: Option<u64>,
    /// Index of the last chunk written.
    pub last_chunk_index: Option<u64>,
    pub chunks_written: u64,
    pub records_written: u64,
    pub malformed_rows: u64,
    /// Data rows consumed from the source, restart offset included.
    pub rows_consumed: u64,
}

/// A run aborted on a chunk transform or I/O failure.
#[derive(Debug)]
pub struct PipelineError {
    /// Chunk being processed when the run stopped; `None` if the source could
    /// not be opened or skipped.
    pub failed_chunk: Option<u64>,
    /// Last chunk whose file was written, if any.
    pub last_completed_chunk: Option<u64>,
    /// `skip_rows` value that resumes right after the last completed chunk.
    pub restart_offset: u64,
    /// Underlying cause.
    pub source: anyhow::Error,
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.last_completed_chunk {
            Some(last) => write!(f, "terminated after processing chunk #{last}")?,
            None => write!(f, "terminated before completing any chunk")?,
        }
        if let Some(failed) = self.failed_chunk {
            write!(f, ", chunk #{failed} failed")?;
        }
        write!(f, " (restart offset {}): {:#}", self.restart_offset, self.source)
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.source)
    }
}

/// Flattens a trip CSV into per-chunk JSON files.
pub struct Pipeline {
    config: PipelineConfig,
    state: PipelineState,
    next_chunk_index: u64,
    last_completed_chunk: Option<u64>,
    first_chunk_index: Option<u64>,
    /// Data rows covered by skipped rows plus completed chunks.
    rows_committed: u64,
    metrics: RunMetrics,
    malformed: MalformedRowCollector,
}

impl Pipeline {
    /// Create a pipeline for a validated configuration.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            state: PipelineState::Idle,
            next_chunk_index: config.start_chunk_index,
            last_completed_chunk: None,
            first_chunk_index: None,
            rows_committed: config.skip_rows,
            metrics: RunMetrics::new(),
            malformed: MalformedRowCollector::new(),
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }

    pub fn malformed_rows(&self) -> &MalformedRowCollector {
        &self.malformed
    }

    /// Last chunk whose file was written.
    pub fn last_completed_chunk(&self) -> Option<u64> {
        self.last_completed_chunk
    }

    /// Run the whole source through the pipeline.
    ///
    /// # Errors
    /// Returns a [`PipelineError`] on the first chunk transform or I/O failure.
    /// Chunks completed before it keep their files; the failing chunk has none.
    pub fn run(&mut self) -> Result<RunSummary, PipelineError> {
        self.metrics.record_start();

        let mut reader = match self.open_source() {
            Ok(reader) => reader,
            Err(e) => return Err(self.fail(None, e)),
        };

        loop {
            self.state = PipelineState::Reading;
            let chunk = match reader.next_chunk() {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(e) => {
                    let index = self.next_chunk_index;
                    return Err(self.fail(Some(index), e));
                }
            };

            let index = self.next_chunk_index;
            self.state = PipelineState::Processing { chunk_index: index };
            if let Err(e) = self.process_chunk(chunk) {
                return Err(self.fail(Some(index), e));
            }
        }

        self.state = PipelineState::Done;
        self.metrics.record_end();
        let summary = self.summary();
        tracing::info!(
            chunks = summary.chunks_written,
            records = summary.records_written,
            malformed = summary.malformed_rows,
            rows = summary.rows_consumed,
            "finished processing {}",
            self.config.source.display()
        );
        Ok(summary)
    }

    /// Transform and write one chunk, then advance the chunk counter.
    ///
    /// The chunk is written as `rowChunk_<n>.json`, where `n` is the next chunk
    /// index. Its malformed rows are recorded and logged only once the file is
    /// written.
    ///
    /// # Errors
    /// Returns an error if the transform or the write fails. Nothing about the
    /// chunk is recorded, the chunk counter does not advance and no file is
    /// left for it.
    pub(crate) fn process_chunk(&mut self, chunk: RowChunk) -> Result<ChunkReport> {
        let index = self.next_chunk_index;
        let RowChunk {
            first_row,
            rows_consumed,
            trips,
            malformed,
        } = chunk;

        let trips_len = trips.len() as u64;
        let records = transform_chunk(trips).with_context(|| {
            format!("transform chunk #{index} (data rows from {first_row})")
        })?;

        let path = chunk_path(&self.config.output_dir, index);
        write_json_array(&path, &records, self.config.pretty)
            .with_context(|| format!("write chunk #{index}"))?;

        let report = ChunkReport {
            chunk_index: index,
            path,
            rows_consumed,
            trips: trips_len,
            records: records.len() as u64,
            malformed_rows: malformed.len() as u64,
        };
        self.complete(&report, malformed);
        Ok(report)
    }

    fn open_source(&mut self) -> Result<TripCsvReader> {
        let mut reader = TripCsvReader::open(
            &self.config.source,
            self.config.chunk_size,
            self.config.missing_values(),
        )?;
        if self.config.skip_rows > 0 {
            let skipped = reader
                .skip_rows(self.config.skip_rows)
                .with_context(|| format!("skip {} data rows", self.config.skip_rows))?;
            if skipped < self.config.skip_rows {
                tracing::warn!(
                    requested = self.config.skip_rows,
                    skipped,
                    "source ended while skipping rows"
                );
            }
            self.metrics.rows_skipped = skipped;
        }
        Ok(reader)
    }

    fn complete(&mut self, report: &ChunkReport, malformed: Vec<MalformedRow>) {
        self.first_chunk_index.get_or_insert(report.chunk_index);
        self.last_completed_chunk = Some(report.chunk_index);
        self.next_chunk_index = report.chunk_index + 1;
        self.rows_committed += report.rows_consumed;

        for row in malformed {
            tracing::warn!(chunk = report.chunk_index, "dropped malformed {row}");
            self.malformed.add(row);
        }
        self.metrics.malformed_rows += report.malformed_rows;
        self.metrics.rows_consumed += report.rows_consumed;
        self.metrics.trips_transformed += report.trips;
        self.metrics.records_written += report.records;
        self.metrics.chunks_written += 1;

        tracing::debug!(
            chunk = report.chunk_index,
            trips = report.trips,
            records = report.records,
            "wrote {}",
            report.path.display()
        );
        if self.next_chunk_index % self.config.progress_every == 0 {
            tracing::info!("processed chunk #{}", self.next_chunk_index);
        }
    }

    fn fail(&mut self, chunk_index: Option<u64>, source: anyhow::Error) -> PipelineError {
        self.state = PipelineState::Failed { chunk_index };
        self.metrics.record_end();
        let err = PipelineError {
            failed_chunk: chunk_index,
            last_completed_chunk: self.last_completed_chunk,
            restart_offset: self.rows_committed,
            source,
        };
        tracing::error!("{err}");
        err
    }

    fn summary(&self) -> RunSummary {
        RunSummary {
            first_chunk_index: self.first_chunk_index,
            last_chunk_index: self.last_completed_chunk,
            chunks_written: self.metrics.chunks_written,
            records_written: self.metrics.records_written,
            malformed_rows: self.metrics.malformed_rows,
            rows_consumed: self.rows_committed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::TripRecord;
    use crate::testing::TestWorkspace;
    use crate::validation::ValidationError;

    fn trip(id: &str, polyline: &str) -> TripRecord {
        TripRecord {
            trip_id: Some(id.into()),
            call_type: None,
            customer_id: None,
            taxi_stand_id: None,
            taxi_id: None,
            trip_start_time: Some(3),
            surge_rate: None,
            partial_location_flag: false,
            trip_location: Some(polyline.into()),
        }
    }

    fn malformed(row: u64) -> MalformedRow {
        MalformedRow {
            row,
            line: Some(row + 2),
            errors: vec![ValidationError::new("wrong field count")],
        }
    }

    #[test]
    fn process_chunk_advances_the_counter() -> Result<()> {
        let ws = TestWorkspace::new()?;
        let mut p = Pipeline::new(ws.config())?;

        let report = p.process_chunk(RowChunk {
            first_row: 0,
            rows_consumed: 2,
            trips: vec![trip("direct", "[[1.5,2.5]]")],
            malformed: vec![malformed(1)],
        })?;
        assert_eq!(report.chunk_index, 0);
        assert_eq!(report.records, 1);
        assert_eq!(report.malformed_rows, 1);
        assert_eq!(report.path, ws.chunk_path(0));
        assert_eq!(p.malformed_rows().count(), 1);

        let report = p.process_chunk(RowChunk {
            first_row: 2,
            rows_consumed: 1,
            trips: vec![trip("direct", "[]")],
            malformed: vec![],
        })?;
        assert_eq!(report.chunk_index, 1);
        assert_eq!(p.last_completed_chunk(), Some(1));
        assert_eq!(p.metrics().chunks_written, 2);
        assert_eq!(p.metrics().rows_consumed, 3);
        assert_eq!(p.summary().rows_consumed, 3);
        Ok(())
    }

    #[test]
    fn failed_process_chunk_records_nothing() -> Result<()> {
        let ws = TestWorkspace::new()?;
        let mut p = Pipeline::new(ws.config())?;

        let err = p.process_chunk(RowChunk {
            first_row: 0,
            rows_consumed: 2,
            trips: vec![trip("bad", "[[1.5,")],
            malformed: vec![malformed(0)],
        });
        assert!(err.is_err());
        assert_eq!(p.last_completed_chunk(), None);
        assert_eq!(p.malformed_rows().count(), 0);
        assert_eq!(p.metrics().malformed_rows, 0);
        assert_eq!(p.metrics().rows_consumed, 0);
        assert_eq!(p.summary().rows_consumed, 0);
        assert!(ws.output_files()?.is_empty());
        Ok(())
    }
}
