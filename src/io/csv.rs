//! Chunked CSV reader for the trip source file.
//!
//! [`TripCsvReader`] pulls fixed-size groups of data rows (header excluded)
//! from the source and applies the trip schema to each one.
//!
//! # Design notes
//! - Chunking is **row-count based**: a chunk spans exactly `chunk_size`
//!   consumed data rows (fewer only at end of input), malformed or not. Chunk
//!   `k` therefore always covers the same rows of the file, which is what makes
//!   a manual restart offset meaningful.
//! - Malformed rows (wrong field count, bad types, invalid UTF-8) are dropped
//!   from the chunk and returned alongside it. Only I/O errors are fatal.
//! - The header row's own names are ignored; [`COLUMN_NAMES`](crate::record::COLUMN_NAMES)
//!   fixes the schema.

use crate::io::compression::open_source;
use crate::record::{MissingValues, TripRecord};
use crate::validation::{MalformedRow, ValidationError};
use anyhow::{Context, Result, bail};
use csv::{ErrorKind, StringRecord};
use std::io::Read;
use std::path::Path;

/// One chunk of the source: the trips that passed the schema, plus the rows
/// that did not.
#[derive(Debug, Clone, Default)]
pub struct RowChunk {
    /// 0-based data row index of the first row consumed into this chunk.
    pub first_row: u64,
    /// Number of data rows consumed, including malformed ones.
    pub rows_consumed: u64,
    /// Well-formed trips, in source order.
    pub trips: Vec<TripRecord>,
    /// Rows dropped because they violated the schema.
    pub malformed: Vec<MalformedRow>,
}

/// Outcome of reading a single data row.
enum RowRead {
    Trip(TripRecord),
    Malformed(MalformedRow),
    End,
}

/// Streaming reader that yields the source in [`RowChunk`]s.
pub struct TripCsvReader {
    rdr: csv::Reader<Box<dyn Read>>,
    na: MissingValues,
    chunk_size: usize,
    next_row: u64,
    record: StringRecord,
    exhausted: bool,
}

impl TripCsvReader {
    /// Open a CSV file with a header row. Gzip sources are decompressed on
    /// the fly, see [`open_source`].
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or if `chunk_size` is zero.
    pub fn open(path: impl AsRef<Path>, chunk_size: usize, na: MissingValues) -> Result<Self> {
        Self::from_reader(open_source(path)?, chunk_size, na)
    }

    /// Wrap an already-open reader. The first line must be the header.
    ///
    /// # Errors
    /// Returns an error if `chunk_size` is zero.
    pub fn from_reader<R: Read + 'static>(
        reader: R,
        chunk_size: usize,
        na: MissingValues,
    ) -> Result<Self> {
        if chunk_size == 0 {
            bail!("chunk size must be at least 1");
        }
        let rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(Box::new(reader) as Box<dyn Read>);
        Ok(Self {
            rdr,
            na,
            chunk_size,
            next_row: 0,
            record: StringRecord::new(),
            exhausted: false,
        })
    }

    /// Number of data rows consumed so far, skipped rows included.
    pub fn rows_consumed(&self) -> u64 {
        self.next_row
    }

    /// Consume and discard up to `n` data rows, for resuming a previous run.
    ///
    /// Returns the number of rows actually skipped, which is smaller than `n`
    /// only if the input ends first.
    ///
    /// # Errors
    /// Returns an error if the source cannot be read.
    pub fn skip_rows(&mut self, n: u64) -> Result<u64> {
        let mut skipped = 0;
        while skipped < n {
            if matches!(self.read_row()?, RowRead::End) {
                break;
            }
            skipped += 1;
        }
        Ok(skipped)
    }

    /// Read the next chunk, or `None` once the input is exhausted.
    ///
    /// # Errors
    /// Returns an error if the source cannot be read. Schema violations are
    /// not errors; they land in [`RowChunk::malformed`].
    pub fn next_chunk(&mut self) -> Result<Option<RowChunk>> {
        let mut chunk = RowChunk {
            first_row: self.next_row,
            ..RowChunk::default()
        };
        while chunk.rows_consumed < self.chunk_size as u64 {
            match self.read_row()? {
                RowRead::Trip(trip) => chunk.trips.push(trip),
                RowRead::Malformed(row) => chunk.malformed.push(row),
                RowRead::End => break,
            }
            chunk.rows_consumed += 1;
        }
        if chunk.rows_consumed == 0 {
            return Ok(None);
        }
        Ok(Some(chunk))
    }

    fn read_row(&mut self) -> Result<RowRead> {
        if self.exhausted {
            return Ok(RowRead::End);
        }
        let row = self.next_row;
        match self.rdr.read_record(&mut self.record) {
            Ok(false) => {
                self.exhausted = true;
                Ok(RowRead::End)
            }
            Ok(true) => {
                self.next_row += 1;
                let line = self.record.position().map(|p| p.line());
                Ok(match TripRecord::from_csv_row(&self.record, &self.na) {
                    Ok(trip) => RowRead::Trip(trip),
                    Err(errors) => RowRead::Malformed(MalformedRow { row, line, errors }),
                })
            }
            Err(e) => {
                if let ErrorKind::Utf8 { pos, .. } = e.kind() {
                    let line = pos.as_ref().map(|p| p.line());
                    self.next_row += 1;
                    return Ok(RowRead::Malformed(MalformedRow {
                        row,
                        line,
                        errors: vec![ValidationError::new(e.to_string())],
                    }));
                }
                Err(e).with_context(|| format!("read CSV data row #{}", row + 1))
            }
        }
    }
}

