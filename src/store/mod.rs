//! Record store readers.
//!
//! A record store is an already-extracted snapshot of the message database,
//! one row per message. This module reads it into [`RawRecord`]s.
//!
//! # Supported Formats
//!
//! | Format | Extension | Feature |
//! |--------|-----------|---------|
//! | [`Csv`](StoreFormat::Csv) | `.csv` | `csv-format` |
//! | [`Json`](StoreFormat::Json) | `.json` | `json-format` |
//! | [`Jsonl`](StoreFormat::Jsonl) | `.jsonl`, `.ndjson` | `json-format` |
//!
//! # Columns
//!
//! `chat_id` and `date_utc` are required. When `date_utc` is missing, the raw
//! `date` column of the Messages database (nanoseconds since 2001-01-01 UTC)
//! is converted instead. `guid`, `text` and `is_from_me` are optional; every
//! other column is kept as an extra field.
//!
//! # Example
//!
//! ```rust,no_run
//! # #[cfg(feature = "csv-format")]
//! # fn main() -> amat::Result<()> {
//! use amat::store::{StoreFormat, create_source, read_records};
//!
//! // Detect the format from the extension
//! let records = read_records("chat_df.csv")?;
//!
//! // Or pick a reader explicitly
//! let source = create_source(StoreFormat::Csv)?;
//! let records = source.read("export.txt".as_ref())?;
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "csv-format"))]
//! # fn main() {}
//! ```

mod columns;
#[cfg(feature = "csv-format")]
mod csv_reader;
#[cfg(feature = "json-format")]
mod json_reader;

pub use columns::{APPLE_EPOCH_OFFSET_SECS, apple_date_to_utc, parse_bool, parse_date_utc};
#[cfg(feature = "csv-format")]
pub use csv_reader::CsvSource;
#[cfg(feature = "json-format")]
pub use json_reader::{JsonSource, JsonlSource};

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AmatError, LoadErrorKind, Result};
use crate::message::RawRecord;

/// Serialization format of a record store snapshot.
///
/// ```rust
/// use amat::store::StoreFormat;
/// use std::str::FromStr;
///
/// assert_eq!(StoreFormat::from_str("ndjson").unwrap(), StoreFormat::Jsonl);
/// assert_eq!(StoreFormat::from_path("chat_df.csv".as_ref()).unwrap(), StoreFormat::Csv);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum StoreFormat {
    /// Comma-separated values with a header row
    #[default]
    Csv,
    /// A JSON array of row objects
    Json,
    /// One JSON row object per line
    #[serde(alias = "ndjson")]
    Jsonl,
}

impl StoreFormat {
    /// Returns the file extension for this format (without dot).
    pub fn extension(&self) -> &'static str {
        match self {
            StoreFormat::Csv => "csv",
            StoreFormat::Json => "json",
            StoreFormat::Jsonl => "jsonl",
        }
    }

    /// Returns all format names including aliases.
    pub fn all_names() -> &'static [&'static str] {
        &["csv", "json", "jsonl", "ndjson"]
    }

    /// Returns all formats.
    pub fn all() -> &'static [StoreFormat] {
        &[StoreFormat::Csv, StoreFormat::Json, StoreFormat::Jsonl]
    }

    /// Detects the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        ext.parse().map_err(|_| {
            AmatError::load(
                LoadErrorKind::UnsupportedFormat(format!(
                    "unknown file extension '.{}', expected one of: {}",
                    ext,
                    Self::all_names().join(", ")
                )),
                Some(path.to_path_buf()),
            )
        })
    }
}

impl fmt::Display for StoreFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreFormat::Csv => write!(f, "CSV"),
            StoreFormat::Json => write!(f, "JSON"),
            StoreFormat::Jsonl => write!(f, "JSONL"),
        }
    }
}

impl FromStr for StoreFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(StoreFormat::Csv),
            "json" => Ok(StoreFormat::Json),
            "jsonl" | "ndjson" => Ok(StoreFormat::Jsonl),
            _ => Err(format!(
                "Unknown store format: '{}'. Expected one of: {}",
                s,
                StoreFormat::all_names().join(", ")
            )),
        }
    }
}

/// A reader for one record store format.
pub trait RecordSource: Send + Sync {
    /// Returns the name of the format (e.g. "CSV").
    fn name(&self) -> &'static str;

    /// Reads every record from a file.
    ///
    /// A missing or unreadable file fails with [`LoadErrorKind::Io`], which
    /// [`AmatError::is_missing_file`] can tell apart from malformed content.
    fn read(&self, path: &Path) -> Result<Vec<RawRecord>> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AmatError::load(e, Some(path.to_path_buf())))?;
        let records = self.read_str(&content).map_err(|e| e.with_path(path))?;
        tracing::debug!(
            path = %path.display(),
            format = self.name(),
            rows = records.len(),
            "Read record store"
        );
        Ok(records)
    }

    /// Reads every record from in-memory content.
    fn read_str(&self, content: &str) -> Result<Vec<RawRecord>>;
}

/// Creates a reader for the given format.
///
/// Fails with [`LoadErrorKind::UnsupportedFormat`] when the format's feature
/// is not enabled.
pub fn create_source(format: StoreFormat) -> Result<Box<dyn RecordSource>> {
    match format {
        #[cfg(feature = "csv-format")]
        StoreFormat::Csv => Ok(Box::new(CsvSource::new())),
        #[cfg(feature = "json-format")]
        StoreFormat::Json => Ok(Box::new(JsonSource::new())),
        #[cfg(feature = "json-format")]
        StoreFormat::Jsonl => Ok(Box::new(JsonlSource::new())),
        #[allow(unreachable_patterns)]
        _ => Err(AmatError::load(
            LoadErrorKind::UnsupportedFormat(format!(
                "{} stores require the '{}' feature to be enabled",
                format,
                match format {
                    StoreFormat::Csv => "csv-format",
                    StoreFormat::Json | StoreFormat::Jsonl => "json-format",
                }
            )),
            None,
        )),
    }
}

/// Reads a record store, detecting its format from the file extension.
pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<RawRecord>> {
    let path = path.as_ref();
    let format = StoreFormat::from_path(path)?;
    create_source(format)?.read(path)
}
