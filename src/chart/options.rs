//! Render configuration passed to a [`ChartBackend`](super::ChartBackend).
//!
//! Every option has a documented default. Anything else a backend may
//! understand goes into `extra` and is forwarded verbatim.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Chart kind for time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    /// Filled areas
    #[default]
    Area,
    /// Lines
    Line,
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartKind::Area => write!(f, "area"),
            ChartKind::Line => write!(f, "line"),
        }
    }
}

impl FromStr for ChartKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "area" => Ok(ChartKind::Area),
            "line" => Ok(ChartKind::Line),
            _ => Err(format!("Unknown chart kind: '{}'. Expected area or line", s)),
        }
    }
}

/// Options for count and length time series.
///
/// ```
/// use amat::chart::{ChartKind, PlotOptions};
///
/// let options = PlotOptions::new()
///     .with_kind(ChartKind::Line)
///     .with_colormap("rainbow")
///     .with_legend(false);
///
/// assert_eq!(options.figsize, (15.0, 5.0));
/// assert!(!options.is_stacked()); // lines are not stacked unless asked
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotOptions {
    /// Figure width and height in inches (default: 15 x 5)
    pub figsize: (f64, f64),
    /// Area or line (default: area)
    pub kind: ChartKind,
    /// Stack series on top of each other (default: stacked for area, not for line)
    pub stacked: Option<bool>,
    /// Show a legend (default: true)
    pub legend: bool,
    /// Chart title (default: none)
    pub title: Option<String>,
    /// Color scheme name (default: backend's choice)
    pub colormap: Option<String>,
    /// Backend-specific options, forwarded as-is
    pub extra: BTreeMap<String, String>,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            figsize: (15.0, 5.0),
            kind: ChartKind::Area,
            stacked: None,
            legend: true,
            title: None,
            colormap: None,
            extra: BTreeMap::new(),
        }
    }
}

impl PlotOptions {
    /// Creates options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether series are drawn stacked, resolving the per-kind default.
    pub fn is_stacked(&self) -> bool {
        self.stacked.unwrap_or(self.kind == ChartKind::Area)
    }

    /// Sets the figure size in inches.
    #[must_use]
    pub fn with_figsize(mut self, width: f64, height: f64) -> Self {
        self.figsize = (width, height);
        self
    }

    /// Sets the chart kind.
    #[must_use]
    pub fn with_kind(mut self, kind: ChartKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets stacking explicitly.
    #[must_use]
    pub fn with_stacked(mut self, stacked: bool) -> Self {
        self.stacked = Some(stacked);
        self
    }

    /// Shows or hides the legend.
    #[must_use]
    pub fn with_legend(mut self, legend: bool) -> Self {
        self.legend = legend;
        self
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the color scheme.
    #[must_use]
    pub fn with_colormap(mut self, colormap: impl Into<String>) -> Self {
        self.colormap = Some(colormap.into());
        self
    }

    /// Adds a backend-specific option.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Options for breakdown pie charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PieOptions {
    /// Figure width and height in inches (default: 6 x 6)
    pub figsize: (f64, f64),
    /// Show a legend (default: false)
    pub legend: bool,
    /// Chart title (default: `"total: N"` per chart)
    pub title: Option<String>,
    /// Color scheme name (default: backend's choice)
    pub colormap: Option<String>,
    /// Backend-specific options, forwarded as-is
    pub extra: BTreeMap<String, String>,
}

impl Default for PieOptions {
    fn default() -> Self {
        Self {
            figsize: (6.0, 6.0),
            legend: false,
            title: None,
            colormap: None,
            extra: BTreeMap::new(),
        }
    }
}

impl PieOptions {
    /// Creates options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the figure size in inches.
    #[must_use]
    pub fn with_figsize(mut self, width: f64, height: f64) -> Self {
        self.figsize = (width, height);
        self
    }

    /// Shows or hides the legend.
    #[must_use]
    pub fn with_legend(mut self, legend: bool) -> Self {
        self.legend = legend;
        self
    }

    /// Overrides the title of every chart in the cascade.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the color scheme.
    #[must_use]
    pub fn with_colormap(mut self, colormap: impl Into<String>) -> Self {
        self.colormap = Some(colormap.into());
        self
    }

    /// Adds a backend-specific option.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Options for the weekly heatmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapOptions {
    /// Figure width and height in inches (default: 15 x 10)
    pub figsize: (f64, f64),
    /// Color scheme name (default: `"viridis"`)
    pub colormap: String,
    /// Backend-specific options, forwarded as-is
    pub extra: BTreeMap<String, String>,
}

impl Default for HeatmapOptions {
    fn default() -> Self {
        Self {
            figsize: (15.0, 10.0),
            colormap: "viridis".to_string(),
            extra: BTreeMap::new(),
        }
    }
}

impl HeatmapOptions {
    /// Creates options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the figure size in inches.
    #[must_use]
    pub fn with_figsize(mut self, width: f64, height: f64) -> Self {
        self.figsize = (width, height);
        self
    }

    /// Sets the color scheme.
    #[must_use]
    pub fn with_colormap(mut self, colormap: impl Into<String>) -> Self {
        self.colormap = colormap.into();
        self
    }

    /// Adds a backend-specific option.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}
