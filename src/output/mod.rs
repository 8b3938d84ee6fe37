//! Export writers for enriched tables and time series.
//!
//! This module provides writers for different output formats:
//! - [`write_csv`] / [`to_csv`] - one column per table field - requires `csv-format` feature
//! - [`series_to_csv`] - a [`TimeSeries`](crate::chart::TimeSeries) as a wide table - requires `csv-format` feature
//! - [`write_json`] / [`to_json`] - JSON array of row objects - requires `json-format` feature
//! - [`write_jsonl`] / [`to_jsonl`] - JSON Lines, one row object per line - requires `json-format` feature
//!
//! Every format keeps the table's column order, and the CSV and JSON outputs
//! can be read back with [`store::read_records`](crate::store::read_records).
//!
//! # Example
//!
//! ```rust,no_run
//! # #[cfg(all(feature = "csv-format", feature = "json-format"))]
//! # fn main() -> amat::Result<()> {
//! use amat::config::LoadOptions;
//! use amat::output::{to_csv, write_csv, write_jsonl};
//! use amat::pipeline::load_path;
//! use amat::search::search;
//!
//! let table = load_path("chat_df.csv", &LoadOptions::new().with_id_map("id_map.yaml"))?;
//! let hits = search(&table, "frabjous", false)?;
//!
//! write_csv(&hits, "frabjous.csv")?;
//! write_jsonl(&hits, "frabjous.jsonl")?;
//! let preview = to_csv(&hits.head(5))?;
//! # Ok(())
//! # }
//! # #[cfg(not(all(feature = "csv-format", feature = "json-format")))]
//! # fn main() {}
//! ```

#[cfg(feature = "csv-format")]
mod csv_writer;
#[cfg(feature = "json-format")]
mod json_writer;
#[cfg(feature = "json-format")]
mod jsonl_writer;

#[cfg(feature = "csv-format")]
pub use csv_writer::{series_to_csv, to_csv, write_csv};
#[cfg(feature = "json-format")]
pub use json_writer::{to_json, write_json};
#[cfg(feature = "json-format")]
pub use jsonl_writer::{to_jsonl, write_jsonl};

#[cfg(feature = "json-format")]
pub(crate) use row::Row;

#[cfg(feature = "json-format")]
mod row {
    use serde::ser::{Serialize, SerializeMap, Serializer};

    use crate::message::{FieldValue, Message};

    /// A message serialized as an object keyed by the table's columns, in order.
    pub(crate) struct Row<'a> {
        pub(crate) columns: &'a [String],
        pub(crate) message: &'a Message,
    }

    impl Serialize for Row<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(self.columns.len()))?;
            for column in self.columns {
                let value = self.message.field(column).unwrap_or(FieldValue::Null);
                map.serialize_entry(column, &value)?;
            }
            map.end()
        }
    }
}
