//! Unified error types for amat.
//!
//! This module provides a single [`AmatError`] enum that covers all error
//! cases in the library. Loading problems, identity map problems, bad field
//! names and bad date strings each get their own variant, so callers can tell
//! "nothing matched" (an empty table, never an error) apart from "the request
//! was malformed".
//!
//! # Error Kinds
//!
//! | Variant | Raised by | Meaning |
//! |---------|-----------|---------|
//! | [`Load`](AmatError::Load) | record store readers | file missing, unreadable or malformed |
//! | [`Config`](AmatError::Config) | identity map, timezone | map unreadable or malformed, unknown zone |
//! | [`UnknownField`](AmatError::UnknownField) | filters, grouping, search | column absent from the table |
//! | [`InvalidDate`](AmatError::InvalidDate) | date range filter | unparsable date string |

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A specialized [`Result`] type for amat operations.
///
/// # Example
///
/// ```rust
/// use amat::error::Result;
/// use amat::MessageTable;
///
/// fn my_function() -> Result<MessageTable> {
///     Ok(MessageTable::default())
/// }
/// ```
pub type Result<T> = std::result::Result<T, AmatError>;

/// The error type for all amat operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AmatError {
    /// An I/O error occurred while writing output.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The record store could not be read or is malformed.
    #[error("Failed to load record store{}: {source}", path.as_ref().map(|p| format!(" (file: {})", p.display())).unwrap_or_default())]
    Load {
        /// What went wrong
        #[source]
        source: LoadErrorKind,
        /// The file path, if available
        path: Option<PathBuf>,
    },

    /// The identity map or timezone configuration is unusable.
    #[error("Invalid configuration{}: {source}", path.as_ref().map(|p| format!(" (file: {})", p.display())).unwrap_or_default())]
    Config {
        /// What went wrong
        #[source]
        source: ConfigErrorKind,
        /// The file path, if available
        path: Option<PathBuf>,
    },

    /// A referenced field does not exist in the table.
    #[error("Unknown field '{field}'")]
    UnknownField {
        /// The requested field name
        field: String,
    },

    /// A date string passed to the date range filter could not be parsed.
    #[error("Invalid date '{input}'. Expected a date like {expected}")]
    InvalidDate {
        /// The invalid date string that was provided
        input: String,
        /// Example of accepted input
        expected: &'static str,
    },

    /// A resampling frequency could not be parsed.
    #[error("Invalid frequency '{input}'. Expected [N]D, [N]W, [N]M or [N]Y")]
    InvalidFrequency {
        /// The invalid frequency string
        input: String,
    },

    /// A search query could not be compiled.
    #[error("Invalid search query: {0}")]
    InvalidQuery(#[from] regex::Error),

    /// CSV writing error.
    #[cfg(feature = "csv-format")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[cfg(feature = "json-format")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Kinds of record store failures.
#[derive(Debug, Error)]
pub enum LoadErrorKind {
    /// The file could not be opened or read
    #[error("{0}")]
    Io(#[from] io::Error),
    /// CSV framing error
    #[cfg(feature = "csv-format")]
    #[error("{0}")]
    Csv(#[from] csv::Error),
    /// JSON syntax error
    #[cfg(feature = "json-format")]
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// A required column is absent
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
    /// A required value could not be interpreted
    #[error("row {row}: invalid value '{value}' in column '{column}'")]
    InvalidValue {
        /// Zero-based row index
        row: usize,
        /// Column name
        column: String,
        /// Offending raw value
        value: String,
    },
    /// The store format is unknown or its feature is disabled
    #[error("unsupported store format: {0}")]
    UnsupportedFormat(String),
}

/// Kinds of configuration failures.
#[derive(Debug, Error)]
pub enum ConfigErrorKind {
    /// The identity map file could not be read
    #[error("{0}")]
    Io(#[from] io::Error),
    /// The identity map is not valid YAML
    #[error("{0}")]
    Yaml(#[from] serde_yaml::Error),
    /// The timezone identifier is not a known IANA zone
    #[error("unknown timezone '{0}'")]
    InvalidTimezone(String),
    /// The identity map is valid YAML but not a flat key/label mapping
    #[error("{0}")]
    InvalidMap(String),
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl AmatError {
    /// Creates a load error.
    pub fn load(source: impl Into<LoadErrorKind>, path: Option<PathBuf>) -> Self {
        AmatError::Load {
            source: source.into(),
            path,
        }
    }

    /// Creates a configuration error.
    pub fn config(source: impl Into<ConfigErrorKind>, path: Option<PathBuf>) -> Self {
        AmatError::Config {
            source: source.into(),
            path,
        }
    }

    /// Creates a missing column error.
    pub fn missing_column(column: &'static str) -> Self {
        Self::load(LoadErrorKind::MissingColumn(column), None)
    }

    /// Creates an invalid value error for a record store cell.
    pub fn invalid_value(row: usize, column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::load(
            LoadErrorKind::InvalidValue {
                row,
                column: column.into(),
                value: value.into(),
            },
            None,
        )
    }

    /// Creates an unknown timezone error.
    pub fn invalid_timezone(tz: impl Into<String>) -> Self {
        Self::config(ConfigErrorKind::InvalidTimezone(tz.into()), None)
    }

    /// Creates an unknown field error.
    pub fn unknown_field(field: impl Into<String>) -> Self {
        AmatError::UnknownField {
            field: field.into(),
        }
    }

    /// Creates an invalid date error.
    pub fn invalid_date(input: impl Into<String>) -> Self {
        AmatError::InvalidDate {
            input: input.into(),
            expected: "'Jan 1, 2019' or '2019-01-01'",
        }
    }

    /// Creates an invalid frequency error.
    pub fn invalid_frequency(input: impl Into<String>) -> Self {
        AmatError::InvalidFrequency {
            input: input.into(),
        }
    }

    /// Attaches a file path to load and config errors that lack one.
    #[must_use]
    pub fn with_path(self, file: impl Into<PathBuf>) -> Self {
        match self {
            AmatError::Load { source, path: None } => AmatError::Load {
                source,
                path: Some(file.into()),
            },
            AmatError::Config { source, path: None } => AmatError::Config {
                source,
                path: Some(file.into()),
            },
            other => other,
        }
    }

    /// Returns `true` if this is a record store error.
    pub fn is_load(&self) -> bool {
        matches!(self, AmatError::Load { .. })
    }

    /// Returns `true` if this is an identity map or timezone error.
    pub fn is_config(&self) -> bool {
        matches!(self, AmatError::Config { .. })
    }

    /// Returns `true` if a referenced field does not exist.
    pub fn is_unknown_field(&self) -> bool {
        matches!(self, AmatError::UnknownField { .. })
    }

    /// Returns `true` if this is a date-related error.
    pub fn is_invalid_date(&self) -> bool {
        matches!(self, AmatError::InvalidDate { .. })
    }

    /// Returns `true` if an input file (record store or identity map) does not exist.
    pub fn is_missing_file(&self) -> bool {
        match self {
            AmatError::Load {
                source: LoadErrorKind::Io(e),
                ..
            }
            | AmatError::Config {
                source: ConfigErrorKind::Io(e),
                ..
            } => e.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = AmatError::from(io_err);
        let display = err.to_string();
        assert!(display.contains("IO error"));
        assert!(display.contains("file not found"));
    }

    #[test]
    fn test_load_error_with_path() {
        let err = AmatError::missing_column("chat_id").with_path("/data/chat.csv");
        let display = err.to_string();
        assert!(display.contains("chat_id"));
        assert!(display.contains("/data/chat.csv"));
        assert!(err.is_load());
    }

    #[test]
    fn test_load_error_without_path() {
        let err = AmatError::invalid_value(3, "date_utc", "yesterday");
        let display = err.to_string();
        assert!(display.contains("row 3"));
        assert!(display.contains("yesterday"));
        assert!(!display.contains("file:"));
    }

    #[test]
    fn test_with_path_keeps_existing_path() {
        let err = AmatError::missing_column("guid")
            .with_path("first.csv")
            .with_path("second.csv");
        let display = err.to_string();
        assert!(display.contains("first.csv"));
        assert!(!display.contains("second.csv"));
    }

    #[test]
    fn test_config_error_display() {
        let err = AmatError::invalid_timezone("Mars/Olympus");
        assert!(err.is_config());
        assert!(err.to_string().contains("Mars/Olympus"));
    }

    #[test]
    fn test_unknown_field_display() {
        let err = AmatError::unknown_field("mood");
        assert!(err.is_unknown_field());
        assert!(err.to_string().contains("'mood'"));
    }

    #[test]
    fn test_invalid_date_display() {
        let err = AmatError::invalid_date("not-a-date");
        let display = err.to_string();
        assert!(display.contains("not-a-date"));
        assert!(display.contains("Jan 1, 2019"));
    }

    #[test]
    fn test_invalid_frequency_display() {
        let err = AmatError::invalid_frequency("0Q");
        assert!(err.to_string().contains("0Q"));
    }

    #[test]
    fn test_missing_file_is_distinguishable() {
        let missing = AmatError::load(io::Error::new(io::ErrorKind::NotFound, "gone"), None);
        assert!(missing.is_missing_file());
        assert!(missing.is_load());

        let denied = AmatError::load(
            io::Error::new(io::ErrorKind::PermissionDenied, "nope"),
            None,
        );
        assert!(!denied.is_missing_file());

        let bad_data = AmatError::missing_column("date_utc");
        assert!(!bad_data.is_missing_file());

        let missing_map = AmatError::config(io::Error::new(io::ErrorKind::NotFound, "gone"), None);
        assert!(missing_map.is_missing_file());
        assert!(missing_map.is_config());
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error;
        let err = AmatError::load(
            io::Error::new(io::ErrorKind::PermissionDenied, "access denied"),
            None,
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn test_is_methods() {
        let date_err = AmatError::invalid_date("bad");
        assert!(date_err.is_invalid_date());
        assert!(!date_err.is_load());
        assert!(!date_err.is_config());
        assert!(!date_err.is_unknown_field());
    }

    #[test]
    fn test_yaml_error_kind() {
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>("a: [1, 2").unwrap_err();
        let err = AmatError::config(yaml_err, Some(PathBuf::from("id_map.yaml")));
        assert!(err.is_config());
        assert!(err.to_string().contains("id_map.yaml"));
    }

    #[cfg(feature = "json-format")]
    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: AmatError = json_err.into();
        assert!(err.to_string().contains("JSON error"));
    }

    #[test]
    fn test_error_debug() {
        let err = AmatError::invalid_date("bad");
        let debug = format!("{:?}", err);
        assert!(debug.contains("InvalidDate"));
    }
}
