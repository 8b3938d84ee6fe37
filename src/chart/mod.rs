//! Aggregation and chart rendering.
//!
//! Each chart comes in two layers:
//!
//! | Data | Render | Result |
//! |------|--------|--------|
//! | [`count_over_time`] | [`plot_count`] | [`TimeSeries`] of message counts |
//! | [`length_over_time`] | [`plot_length`] | [`TimeSeries`] of characters |
//! | [`breakdown`] | [`plot_breakdown`] | one [`PieChart`] per threshold |
//! | [`weekly_heatmap`] | [`plot_weekly_heatmap`] | [`WeeklyHeatmap`] |
//!
//! The data functions are pure. The `plot_*` functions call them, pass the
//! result to a caller-supplied [`ChartBackend`], and return it, so drawing
//! never needs global state.
//!
//! # Example
//!
//! ```rust,no_run
//! # #[cfg(feature = "json-format")]
//! # fn main() -> amat::Result<()> {
//! use amat::chart::{ChartKind, JsonChartWriter, PieOptions, PlotOptions, plot_breakdown, plot_count};
//! use amat::config::LoadOptions;
//! use amat::pipeline::load_path;
//!
//! let table = load_path("chat_df.csv", &LoadOptions::new().with_id_map("id_map.yaml"))?;
//! let mut charts = JsonChartWriter::new("charts")?;
//!
//! // Messages per month by weekday, as lines
//! let options = PlotOptions::new().with_kind(ChartKind::Line).with_colormap("rainbow");
//! plot_count(&table, "M".parse()?, "weekday", &options, &mut charts)?;
//!
//! // Who do I text the most?
//! plot_breakdown(&table, &[2.0, 4.0, 3.0], "contact", &PieOptions::new(), &mut charts)?;
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "json-format"))]
//! # fn main() {}
//! ```

mod backend;
mod breakdown;
mod frequency;
mod heatmap;
mod options;
mod timeseries;

pub use backend::ChartBackend;
#[cfg(feature = "json-format")]
pub use backend::JsonChartWriter;
pub use breakdown::{OTHER_LABEL, PieChart, Slice, breakdown};
pub use frequency::{Frequency, Unit};
pub use heatmap::{DAY_START_HOUR, WEEKDAY_LABELS, WeeklyHeatmap, weekly_heatmap};
pub use options::{ChartKind, HeatmapOptions, PieOptions, PlotOptions};
pub use timeseries::{Measure, Series, TimeSeries, count_over_time, length_over_time};

use crate::error::Result;
use crate::message::MessageTable;

/// Field charts are grouped by when the caller has no preference.
pub const DEFAULT_GROUP_FIELD: &str = crate::message::CONTACT_FIELD;

/// Breakdown cutoffs used when the caller gives none: one pie, with groups
/// under 2% folded into "other".
pub const DEFAULT_SLIVERS: &[f64] = &[2.0];

/// Renders message counts over time, one series per `by` value.
pub fn plot_count(
    table: &MessageTable,
    frequency: Frequency,
    by: &str,
    options: &PlotOptions,
    backend: &mut dyn ChartBackend,
) -> Result<TimeSeries> {
    let series = count_over_time(table, frequency, by)?;
    backend.render_series(&series, options)?;
    Ok(series)
}

/// Renders characters sent over time, one series per `by` value.
pub fn plot_length(
    table: &MessageTable,
    frequency: Frequency,
    by: &str,
    options: &PlotOptions,
    backend: &mut dyn ChartBackend,
) -> Result<TimeSeries> {
    let series = length_over_time(table, frequency, by)?;
    backend.render_series(&series, options)?;
    Ok(series)
}

/// Renders a breakdown cascade, one pie per threshold.
///
/// A title in `options` replaces the default `"total: N"` of every chart.
pub fn plot_breakdown(
    table: &MessageTable,
    slivers: &[f64],
    by: &str,
    options: &PieOptions,
    backend: &mut dyn ChartBackend,
) -> Result<Vec<PieChart>> {
    let mut charts = breakdown(table, slivers, by)?;
    for chart in &mut charts {
        if let Some(title) = &options.title {
            chart.title.clone_from(title);
        }
        backend.render_pie(chart, options)?;
    }
    Ok(charts)
}

/// Renders the weekday by hour grid.
pub fn plot_weekly_heatmap(
    table: &MessageTable,
    options: &HeatmapOptions,
    backend: &mut dyn ChartBackend,
) -> Result<WeeklyHeatmap> {
    let heatmap = weekly_heatmap(table);
    backend.render_heatmap(&heatmap, options)?;
    Ok(heatmap)
}
