//! Rendering seam between chart data and a drawing library.

use super::breakdown::PieChart;
use super::heatmap::WeeklyHeatmap;
use super::options::{HeatmapOptions, PieOptions, PlotOptions};
use super::timeseries::TimeSeries;
use crate::error::Result;

/// Something that can draw charts.
///
/// The `plot_*` functions compute chart data, hand it to a backend together
/// with the render options, and return the data. Implement this trait to
/// draw with a plotting crate, emit Vega specs, or record calls in tests.
pub trait ChartBackend {
    /// Draws one area or line chart with a series per category.
    fn render_series(&mut self, chart: &TimeSeries, options: &PlotOptions) -> Result<()>;

    /// Draws one pie chart of a breakdown cascade.
    fn render_pie(&mut self, chart: &PieChart, options: &PieOptions) -> Result<()>;

    /// Draws the weekly activity grid.
    fn render_heatmap(&mut self, heatmap: &WeeklyHeatmap, options: &HeatmapOptions) -> Result<()>;
}

#[cfg(feature = "json-format")]
pub use json_backend::JsonChartWriter;

#[cfg(feature = "json-format")]
mod json_backend {
    use std::fs::{self, File};
    use std::io::{BufWriter, Write};
    use std::path::{Path, PathBuf};

    use serde::Serialize;

    use super::ChartBackend;
    use crate::chart::{HeatmapOptions, PieChart, PieOptions, PlotOptions, TimeSeries, WeeklyHeatmap};
    use crate::error::Result;

    #[derive(Serialize)]
    struct Document<'a, D: Serialize, O: Serialize> {
        kind: &'static str,
        options: &'a O,
        data: &'a D,
    }

    #[derive(Serialize)]
    struct HeatmapData<'a> {
        weekdays: [&'static str; 7],
        hours: Vec<String>,
        counts: [[u64; 24]; 7],
        midnight_counts: &'a [[u64; 24]; 7],
    }

    /// Writes every rendered chart as a numbered JSON document.
    ///
    /// Files are named `chart-001-series.json`, `chart-002-pie.json`, … and
    /// hold `{"kind", "options", "data"}`, ready for an external plotting
    /// script.
    ///
    /// ```rust,no_run
    /// use amat::chart::{Frequency, JsonChartWriter, PlotOptions, plot_count};
    /// # use amat::MessageTable;
    ///
    /// # fn main() -> amat::Result<()> {
    /// # let table = MessageTable::default();
    /// let mut writer = JsonChartWriter::new("charts")?;
    /// plot_count(&table, Frequency::YEARLY, "contact", &PlotOptions::new().with_legend(false), &mut writer)?;
    /// # Ok(())
    /// # }
    /// ```
    #[derive(Debug)]
    pub struct JsonChartWriter {
        dir: PathBuf,
        written: Vec<PathBuf>,
    }

    impl JsonChartWriter {
        /// Creates the writer, creating `dir` if needed.
        pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
            let dir = dir.as_ref().to_path_buf();
            fs::create_dir_all(&dir)?;
            Ok(Self {
                dir,
                written: Vec::new(),
            })
        }

        /// Paths written so far, in render order.
        pub fn written(&self) -> &[PathBuf] {
            &self.written
        }

        fn write<D: Serialize, O: Serialize>(
            &mut self,
            kind: &'static str,
            data: &D,
            options: &O,
        ) -> Result<()> {
            let path = self
                .dir
                .join(format!("chart-{:03}-{}.json", self.written.len() + 1, kind));
            let mut file = BufWriter::new(File::create(&path)?);
            serde_json::to_writer_pretty(
                &mut file,
                &Document {
                    kind,
                    options,
                    data,
                },
            )?;
            file.flush()?;
            tracing::debug!(path = %path.display(), kind, "Wrote chart");
            self.written.push(path);
            Ok(())
        }
    }

    impl ChartBackend for JsonChartWriter {
        fn render_series(&mut self, chart: &TimeSeries, options: &PlotOptions) -> Result<()> {
            self.write("series", chart, options)
        }

        fn render_pie(&mut self, chart: &PieChart, options: &PieOptions) -> Result<()> {
            self.write("pie", chart, options)
        }

        fn render_heatmap(
            &mut self,
            heatmap: &WeeklyHeatmap,
            options: &HeatmapOptions,
        ) -> Result<()> {
            let data = HeatmapData {
                weekdays: crate::chart::WEEKDAY_LABELS,
                hours: WeeklyHeatmap::hour_labels(),
                counts: heatmap.rotated(),
                midnight_counts: heatmap.counts(),
            };
            self.write("heatmap", &data, options)
        }
    }
}
