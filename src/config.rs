//! Configuration types for loading an archive.
//!
//! This module provides plain configuration structs for library usage. They
//! implement `Serialize`/`Deserialize`, so an analysis script can keep its
//! settings in a small YAML file next to the data.
//!
//! Chart and search settings live next to the code that uses them:
//! [`PlotOptions`](crate::chart::PlotOptions), [`PieOptions`](crate::chart::PieOptions),
//! [`HeatmapOptions`](crate::chart::HeatmapOptions) and
//! [`SearchOptions`](crate::search::SearchOptions).
//!
//! # Example
//!
//! ```rust
//! use amat::config::LoadOptions;
//!
//! let options = LoadOptions::new()
//!     .with_timezone("US/Pacific")
//!     .with_id_map("id_map.yaml");
//!
//! assert_eq!(options.timezone, "US/Pacific");
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{AmatError, Result};
use crate::store::StoreFormat;

/// Default timezone for enrichment.
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Settings for [`load_path`](crate::pipeline::load_path).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// IANA timezone used for `date_local` (default: `"UTC"`)
    pub timezone: String,

    /// Identity map file; without one, `contact` is not derived (default: none)
    pub id_map: Option<PathBuf>,

    /// Record store format; detected from the extension when unset (default: none)
    pub format: Option<StoreFormat>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.to_string(),
            id_map: None,
            format: None,
        }
    }
}

impl LoadOptions {
    /// Creates options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses options from YAML; missing keys keep their defaults.
    ///
    /// ```rust
    /// use amat::config::LoadOptions;
    ///
    /// # fn main() -> amat::Result<()> {
    /// let options = LoadOptions::from_yaml_str("timezone: Europe/Berlin\nformat: jsonl\n")?;
    /// assert_eq!(options.timezone, "Europe/Berlin");
    /// assert!(options.id_map.is_none());
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| AmatError::config(e, None))
    }

    /// Sets the timezone.
    #[must_use]
    pub fn with_timezone(mut self, tz: impl Into<String>) -> Self {
        self.timezone = tz.into();
        self
    }

    /// Sets the identity map file.
    #[must_use]
    pub fn with_id_map(mut self, path: impl Into<PathBuf>) -> Self {
        self.id_map = Some(path.into());
        self
    }

    /// Forces a record store format.
    #[must_use]
    pub fn with_format(mut self, format: StoreFormat) -> Self {
        self.format = Some(format);
        self
    }
}
