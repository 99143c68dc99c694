//! Pre-built source data and a scratch workspace for pipeline tests.

use crate::config::PipelineConfig;
use crate::io::json::{chunk_path, read_json_array};
use crate::record::TripInstanceRecord;
use crate::testing::TripRowBuilder;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Header line of the public taxi trajectory dataset.
pub const SOURCE_HEADER: &str = "\"TRIP_ID\",\"CALL_TYPE\",\"ORIGIN_CALL\",\"ORIGIN_STAND\",\"TAXI_ID\",\"TIMESTAMP\",\"DAY_TYPE\",\"MISSING_DATA\",\"POLYLINE\"";

/// A few rows shaped like the public dataset: three trips with 3, 2 and 0 points.
#[must_use]
pub fn sample_trip_rows() -> Vec<String> {
    vec![
        TripRowBuilder::new("1372636858620000589")
            .call_type("C")
            .taxi_id("20000589")
            .start_time(1_372_636_858)
            .surge_rate("A")
            .locations(&[
                [-8.618643, 41.141412],
                [-8.618499, 41.141376],
                [-8.620326, 41.14251],
            ])
            .to_csv_line(),
        TripRowBuilder::new("1372637303620000596")
            .call_type("B")
            .taxi_stand_id("7")
            .taxi_id("20000596")
            .start_time(1_372_637_303)
            .surge_rate("A")
            .locations(&[[-8.639847, 41.159826], [-8.640351, 41.159871]])
            .to_csv_line(),
        TripRowBuilder::new("1372636951620000320")
            .call_type("A")
            .customer_id("31508")
            .taxi_id("20000320")
            .start_time(1_372_636_951)
            .surge_rate("A")
            .partial(true)
            .to_csv_line(),
    ]
}

/// Source text: the dataset header followed by `rows`, one per line.
#[must_use]
pub fn source_text(rows: &[String]) -> String {
    let mut out = String::from(SOURCE_HEADER);
    for row in rows {
        out.push('\n');
        out.push_str(row);
    }
    out.push('\n');
    out
}

/// A temporary directory holding a source file and an output directory.
///
/// The directory is removed when the workspace is dropped.
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    /// Create an empty workspace.
    ///
    /// # Errors
    /// Returns an error if the temporary directory cannot be created.
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir().context("create temp dir")?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn source_path(&self) -> PathBuf {
        self.dir.path().join("train.csv")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.dir.path().join("jsonData")
    }

    /// Write the header plus `rows` as the source file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn write_source(&self, rows: &[String]) -> Result<PathBuf> {
        let path = self.source_path();
        std::fs::write(&path, source_text(rows))
            .with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }

    /// Default configuration pointed at this workspace.
    #[must_use]
    pub fn config(&self) -> PipelineConfig {
        PipelineConfig::new(self.source_path(), self.output_dir())
    }

    pub fn chunk_path(&self, index: u64) -> PathBuf {
        chunk_path(self.output_dir(), index)
    }

    /// Read back the records of chunk `index`.
    ///
    /// # Errors
    /// Returns an error if the chunk file is missing or unreadable.
    pub fn read_chunk(&self, index: u64) -> Result<Vec<TripInstanceRecord>> {
        read_json_array(self.chunk_path(index))
    }

    /// Sorted file names in the output directory (empty if it does not exist).
    ///
    /// # Errors
    /// Returns an error if the directory exists but cannot be listed.
    pub fn output_files(&self) -> Result<Vec<String>> {
        let dir = self.output_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = std::fs::read_dir(&dir)
            .with_context(|| format!("list {}", dir.display()))?
            .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
            .collect::<std::io::Result<Vec<_>>>()?;
        names.sort();
        Ok(names)
    }
}
