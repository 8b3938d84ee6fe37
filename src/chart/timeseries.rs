//! Count and length aggregation over time.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::frequency::Frequency;
use crate::error::Result;
use crate::message::{FieldValue, Message, MessageTable};

/// What a time series sums per bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Measure {
    /// Number of messages
    Count,
    /// Total characters of `text`
    Length,
}

impl Measure {
    fn of(&self, message: &Message) -> u64 {
        match self {
            Measure::Count => 1,
            Measure::Length => message.length as u64,
        }
    }
}

/// One category's values, aligned with [`TimeSeries::buckets`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    /// Category value
    pub label: String,
    /// Sum per bucket
    pub values: Vec<u64>,
}

impl Series {
    /// Sum over all buckets.
    pub fn total(&self) -> u64 {
        self.values.iter().sum()
    }
}

/// A resampled, per-category time series.
///
/// Buckets are contiguous: every bucket between the first and last record
/// is present, and categories with no messages in a bucket read 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeries {
    /// Resampling frequency
    pub frequency: Frequency,
    /// What each value sums
    pub measure: Measure,
    /// Field the series are grouped by
    pub by: String,
    /// First day of each bucket, ascending
    pub buckets: Vec<NaiveDate>,
    /// One series per category, sorted by label
    pub series: Vec<Series>,
}

impl TimeSeries {
    /// Returns `true` if there are no buckets.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Looks up a category's series.
    pub fn get(&self, label: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.label == label)
    }

    /// Category labels, in series order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|s| s.label.as_str())
    }

    /// Sum over every bucket and category.
    pub fn total(&self) -> u64 {
        self.series.iter().map(Series::total).sum()
    }
}

/// Counts messages per category per bucket.
///
/// Rows whose `by` value is null are left out.
///
/// ```
/// use amat::chart::{Frequency, count_over_time};
/// use amat::{IdentityMap, RawRecord, pipeline::load};
/// use chrono::{TimeZone, Utc};
///
/// # fn main() -> amat::Result<()> {
/// let records = vec![
///     RawRecord::new("1", Utc.with_ymd_and_hms(2019, 1, 5, 0, 0, 0).unwrap()),
///     RawRecord::new("1", Utc.with_ymd_and_hms(2019, 3, 9, 0, 0, 0).unwrap()),
///     RawRecord::new("2", Utc.with_ymd_and_hms(2019, 3, 10, 0, 0, 0).unwrap()),
/// ];
/// let table = load(&records, Some(&IdentityMap::from_yaml_str("1: Mom\n2: Dad")?), "UTC")?;
///
/// let ts = count_over_time(&table, Frequency::MONTHLY, "contact")?;
/// assert_eq!(ts.buckets.len(), 3); // Jan, Feb, Mar
/// assert_eq!(ts.get("Mom").unwrap().values, vec![1, 0, 1]);
/// assert_eq!(ts.get("Dad").unwrap().values, vec![0, 0, 1]);
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns [`AmatError::UnknownField`](crate::AmatError::UnknownField) if the
/// table has no `by` field.
pub fn count_over_time(table: &MessageTable, frequency: Frequency, by: &str) -> Result<TimeSeries> {
    aggregate(table, frequency, by, Measure::Count)
}

/// Sums message `length` per category per bucket.
///
/// # Errors
///
/// Returns [`AmatError::UnknownField`](crate::AmatError::UnknownField) if the
/// table has no `by` field.
pub fn length_over_time(
    table: &MessageTable,
    frequency: Frequency,
    by: &str,
) -> Result<TimeSeries> {
    aggregate(table, frequency, by, Measure::Length)
}

fn aggregate(
    table: &MessageTable,
    frequency: Frequency,
    by: &str,
    measure: Measure,
) -> Result<TimeSeries> {
    table.require_field(by)?;

    let rows: Vec<(String, NaiveDate, u64)> = table
        .iter()
        .filter_map(|m| {
            let key = m.field(by).unwrap_or(FieldValue::Null);
            if key.is_null() {
                return None;
            }
            Some((key.to_string(), m.date_local.date(), measure.of(m)))
        })
        .collect();

    let mut result = TimeSeries {
        frequency,
        measure,
        by: by.to_string(),
        buckets: Vec::new(),
        series: Vec::new(),
    };

    let (Some(first), Some(last)) = (
        rows.iter().map(|(_, d, _)| *d).min(),
        rows.iter().map(|(_, d, _)| *d).max(),
    ) else {
        return Ok(result);
    };

    let anchor = frequency.unit.start_of(first);
    let n_buckets = frequency.bucket_index(anchor, last) + 1;
    result.buckets = (0..n_buckets)
        .map(|i| frequency.bucket_start(anchor, i))
        .collect();

    let mut by_label: BTreeMap<String, Vec<u64>> = BTreeMap::new();
    for (label, date, amount) in rows {
        let values = by_label
            .entry(label)
            .or_insert_with(|| vec![0; n_buckets]);
        values[frequency.bucket_index(anchor, date)] += amount;
    }
    result.series = by_label
        .into_iter()
        .map(|(label, values)| Series { label, values })
        .collect();

    tracing::debug!(
        by,
        frequency = %frequency,
        measure = ?measure,
        buckets = result.buckets.len(),
        series = result.series.len(),
        "Resampled time series"
    );
    Ok(result)
}
