//! Transparent gzip decompression for the trip source file.
//!
//! The dataset dump is commonly shipped as `train.csv.gz`. A source is read
//! through a gzip decoder when its name ends in `.gz` (any case) or when its
//! first bytes are the gzip magic number; anything else is read as plain text.
//!
//! ```no_run
//! use taxi_trip_prep::io::compression::open_source;
//! # fn main() -> anyhow::Result<()> {
//! let reader = open_source("csvData/train.csv.gz")?;
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Leading bytes of every gzip member.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// How the bytes of a source file are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEncoding {
    Plain,
    Gzip,
}

impl SourceEncoding {
    /// Pick the encoding from the file name, falling back to the leading bytes.
    pub fn detect(path: &Path, head: &[u8]) -> Self {
        let gz_name = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));
        if gz_name || head.starts_with(&GZIP_MAGIC) {
            Self::Gzip
        } else {
            Self::Plain
        }
    }
}

/// Open `path` for reading, decompressing gzip on the fly.
///
/// Concatenated gzip members are read to the end.
///
/// # Errors
/// Returns an error if the file cannot be opened or read, or if it is gzip
/// while the `compression-gzip` feature is disabled.
pub fn open_source(path: impl AsRef<Path>) -> Result<Box<dyn Read>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let head = reader
        .fill_buf()
        .with_context(|| format!("read {}", path.display()))?;
    match SourceEncoding::detect(path, head) {
        SourceEncoding::Plain => Ok(Box::new(reader)),
        SourceEncoding::Gzip => gzip_reader(reader, path),
    }
}

#[cfg(feature = "compression-gzip")]
fn gzip_reader(reader: BufReader<File>, _path: &Path) -> Result<Box<dyn Read>> {
    Ok(Box::new(flate2::bufread::MultiGzDecoder::new(reader)))
}

#[cfg(not(feature = "compression-gzip"))]
fn gzip_reader(_reader: BufReader<File>, path: &Path) -> Result<Box<dyn Read>> {
    anyhow::bail!(
        "{} is gzip-compressed but the compression-gzip feature is disabled",
        path.display()
    )
}
