//! JSON chunk files: one self-contained JSON array per chunk.
//!
//! Output files are named `rowChunk_<index>.json`. Writes are atomic: the
//! array is serialized to a `.json.part` sibling, flushed, and renamed into
//! place, so a failed write never leaves a partial chunk file behind.

use anyhow::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{File, create_dir_all};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// File name prefix of every chunk file.
pub const CHUNK_FILE_PREFIX: &str = "rowChunk_";

/// File name of chunk `index`, e.g. `rowChunk_0.json`.
pub fn chunk_file_name(index: u64) -> String {
    format!("{CHUNK_FILE_PREFIX}{index}.json")
}

/// Full path of chunk `index` inside `output_dir`.
pub fn chunk_path(output_dir: impl AsRef<Path>, index: u64) -> PathBuf {
    output_dir.as_ref().join(chunk_file_name(index))
}

/// Write a typed slice as a single JSON array, atomically.
///
/// * Creates parent directories if they don't exist.
/// * `pretty` switches from the compact form to an indented one.
///
/// # Returns
/// The number of items written (`data.len()`).
///
/// # Errors
/// Returns an error if the file/dirs cannot be created or the array fails to
/// serialize/flush/rename. The destination is untouched in that case.
pub fn write_json_array<T: Serialize>(
    path: impl AsRef<Path>,
    data: &[T],
    pretty: bool,
) -> Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }

    let part = path.with_extension("json.part");
    let written = write_part(&part, data, pretty).and_then(|()| {
        std::fs::rename(&part, path)
            .with_context(|| format!("rename {} to {}", part.display(), path.display()))
    });
    if let Err(e) = written {
        let _ = std::fs::remove_file(&part);
        return Err(e);
    }
    Ok(data.len())
}

fn write_part<T: Serialize>(part: &Path, data: &[T], pretty: bool) -> Result<()> {
    let f = File::create(part).with_context(|| format!("create {}", part.display()))?;
    let mut w = BufWriter::new(f);
    if pretty {
        serde_json::to_writer_pretty(&mut w, data)
    } else {
        serde_json::to_writer(&mut w, data)
    }
    .with_context(|| format!("serialize {} items to {}", data.len(), part.display()))?;
    w.flush()
        .with_context(|| format!("flush {}", part.display()))?;
    Ok(())
}

/// Read a JSON array file into a typed `Vec<T>`.
///
/// # Errors
/// Returns an error if the file cannot be opened or does not hold a JSON
/// array of `T`.
pub fn read_json_array<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Vec<T>> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse JSON array in {}", path.display()))
}
