//! Configuration for the trip flattening pipeline.

use crate::record::{DEFAULT_NA_VALUES, MissingValues};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable overriding [`PipelineConfig::source`].
pub const ENV_SOURCE: &str = "TAXI_PREP_SOURCE";
/// Environment variable overriding [`PipelineConfig::output_dir`].
pub const ENV_OUTPUT_DIR: &str = "TAXI_PREP_OUTPUT_DIR";
/// Environment variable overriding [`PipelineConfig::chunk_size`].
pub const ENV_CHUNK_SIZE: &str = "TAXI_PREP_CHUNK_SIZE";
/// Environment variable overriding [`PipelineConfig::skip_rows`].
pub const ENV_SKIP_ROWS: &str = "TAXI_PREP_SKIP_ROWS";
/// Environment variable overriding [`PipelineConfig::start_chunk_index`].
pub const ENV_START_CHUNK: &str = "TAXI_PREP_START_CHUNK";
/// Environment variable overriding [`PipelineConfig::progress_every`].
pub const ENV_PROGRESS_EVERY: &str = "TAXI_PREP_PROGRESS_EVERY";
/// Environment variable overriding [`PipelineConfig::pretty`].
pub const ENV_PRETTY: &str = "TAXI_PREP_PRETTY";

/// Everything a pipeline run needs to know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Source CSV file (optionally compressed)
    pub source: PathBuf,

    /// Directory receiving `rowChunk_<n>.json` files
    pub output_dir: PathBuf,

    /// Data rows per chunk
    pub chunk_size: usize,

    /// Data rows to skip before the first chunk, when resuming a failed run
    pub skip_rows: u64,

    /// Index of the first chunk written by this run
    pub start_chunk_index: u64,

    /// Log progress every this many completed chunks
    pub progress_every: u64,

    /// Indent the JSON output
    pub pretty: bool,

    /// Raw field values read as null
    pub na_values: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("csvData/train.csv"),
            output_dir: PathBuf::from("jsonData"),
            chunk_size: 1000,
            skip_rows: 0,
            start_chunk_index: 0,
            progress_every: 100,
            pretty: false,
            na_values: DEFAULT_NA_VALUES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl PipelineConfig {
    /// Default configuration reading `source` and writing into `output_dir`.
    pub fn new(source: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a JSON document. Missing fields take defaults.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("parse config {}", path.display()))
    }

    /// Defaults overridden by the `TAXI_PREP_*` environment variables.
    ///
    /// # Errors
    /// Returns an error naming the variable if a value cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(source) = env_var(ENV_SOURCE) {
            config.source = PathBuf::from(source);
        }
        if let Some(dir) = env_var(ENV_OUTPUT_DIR) {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(n) = env_parse(ENV_CHUNK_SIZE)? {
            config.chunk_size = n;
        }
        if let Some(n) = env_parse(ENV_SKIP_ROWS)? {
            config.skip_rows = n;
        }
        if let Some(n) = env_parse(ENV_START_CHUNK)? {
            config.start_chunk_index = n;
        }
        if let Some(n) = env_parse(ENV_PROGRESS_EVERY)? {
            config.progress_every = n;
        }
        if let Some(raw) = env_var(ENV_PRETTY) {
            config.pretty = parse_switch(&raw)
                .with_context(|| format!("invalid value for {ENV_PRETTY}"))?;
        }
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    /// Returns an error describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.source.as_os_str().is_empty() {
            bail!("source path must not be empty");
        }
        if self.chunk_size == 0 {
            bail!("chunk_size must be at least 1");
        }
        if self.progress_every == 0 {
            bail!("progress_every must be at least 1");
        }
        Ok(())
    }

    /// The missing-value tokens as a lookup set.
    pub fn missing_values(&self) -> MissingValues {
        MissingValues::new(self.na_values.iter().cloned())
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    env_var(name)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| anyhow::anyhow!("invalid value {raw:?} for {name}: {e}"))
        })
        .transpose()
}

fn parse_switch(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("expected a boolean, found {other:?}"),
    }
}
