//! # amat
//!
//! An analytics toolbox for exported message archives.
//!
//! ## Overview
//!
//! amat loads an already-extracted snapshot of a messages database (one row
//! per message), enriches it with local-time and contact fields, and provides
//! composable tools on top of the enriched table:
//! - **Filters** - by date range, by field membership, or by any predicate
//! - **Charts** - message counts and characters over time, share breakdowns,
//!   and a weekday by hour heatmap, drawn through a pluggable backend
//! - **Search** - literal text search, plus a context view that prints each
//!   hit inside its conversation with the query highlighted
//! - **Export** - CSV, JSON and JSON Lines
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use amat::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let options = LoadOptions::new()
//!         .with_id_map("id_map.yaml")
//!         .with_timezone("US/Pacific");
//!     let table = load_path("chat_df.csv", &options)?;
//!
//!     // Everything Mom sent this summer
//!     let summer = DateRange::new()
//!         .with_start("Jun 21, 2019")?
//!         .with_end("Sept 23, 2019")?;
//!     let from_mom = filter_any(&filter_date(&table, &summer), "contact", ["Mom"])?;
//!     println!("{} messages", from_mom.len());
//!
//!     // Every frabjous moment, with five messages of context
//!     context_search(&table, "frabjous", &SearchOptions::new(), &mut std::io::stdout())?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! - [`pipeline`] - [`load`](pipeline::load) and [`load_path`](pipeline::load_path)
//! - [`store`] - record store readers ([`StoreFormat`](store::StoreFormat), [`RecordSource`](store::RecordSource))
//! - [`identity`] - [`IdentityMap`] from `chat_id` to contact name
//! - [`message`] - [`Message`], [`MessageTable`], [`RawRecord`], [`FieldValue`]
//! - [`filter`] - [`DateRange`](filter::DateRange), [`filter_date`](filter::filter_date),
//!   [`filter_any`](filter::filter_any), [`filter_by`](filter::filter_by)
//! - [`chart`] - time series, breakdowns, heatmap, [`ChartBackend`](chart::ChartBackend)
//! - [`search`] - [`search`](search::search), [`context_search`](search::context_search)
//! - [`output`] - [`write_csv`](output::write_csv), [`write_json`](output::write_json), [`write_jsonl`](output::write_jsonl)
//! - [`config`] - [`LoadOptions`](config::LoadOptions)
//! - [`error`] - Unified error types ([`AmatError`], [`Result`])
//! - [`prelude`] - Convenient re-exports
//!
//! ## Logging
//!
//! The library emits [`tracing`] events (loads at `info`, per-operation detail
//! at `debug`) and never installs a subscriber.

pub mod chart;
pub mod config;
pub mod error;
pub mod filter;
pub mod identity;
pub mod message;
pub mod output;
pub mod pipeline;
pub mod search;
pub mod store;

// Re-export the main types at the crate root for convenience
pub use error::{AmatError, Result};
pub use identity::IdentityMap;
pub use message::{Direction, FieldValue, Message, MessageTable, RawRecord};

/// Convenient re-exports for common usage.
///
/// Import everything you need with a single line:
///
/// ```rust
/// use amat::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::{Direction, FieldValue, IdentityMap, Message, MessageTable, RawRecord};

    // Error types
    pub use crate::error::{AmatError, Result};

    // Loading
    pub use crate::config::LoadOptions;
    pub use crate::pipeline::{load, load_path};
    pub use crate::store::{RecordSource, StoreFormat, create_source, read_records};

    // Filtering
    pub use crate::filter::{DateRange, filter_any, filter_between, filter_by, filter_date};

    // Charts
    pub use crate::chart::{
        ChartBackend, ChartKind, DEFAULT_SLIVERS, Frequency, HeatmapOptions, PieChart, PieOptions,
        PlotOptions, TimeSeries, WeeklyHeatmap, breakdown, count_over_time, length_over_time,
        plot_breakdown, plot_count, plot_length, plot_weekly_heatmap, weekly_heatmap,
    };

    // Search
    pub use crate::search::{SearchOptions, context_search, context_windows, search};

    // Output
    #[cfg(feature = "csv-format")]
    pub use crate::output::{series_to_csv, to_csv, write_csv};
    #[cfg(feature = "json-format")]
    pub use crate::output::{to_json, to_jsonl, write_json, write_jsonl};
}
