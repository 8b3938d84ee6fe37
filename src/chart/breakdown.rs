//! Categorical share breakdown with cascading "other" buckets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::{FieldValue, MessageTable};

/// Label of the merged bucket.
pub const OTHER_LABEL: &str = "other";

/// One pie slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slice {
    /// Category value, or [`OTHER_LABEL`]
    pub label: String,
    /// Messages in this slice
    pub count: u64,
    /// Share of the chart total, in percent
    pub percent: f64,
}

/// One stage of a breakdown cascade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieChart {
    /// Messages covered by this chart
    pub total: u64,
    /// Chart title, `"total: N"` unless overridden at render time
    pub title: String,
    /// Slices by count descending; the merged bucket is last
    pub slices: Vec<Slice>,
}

impl PieChart {
    /// Looks up a slice by label.
    pub fn get(&self, label: &str) -> Option<&Slice> {
        self.slices.iter().find(|s| s.label == label)
    }
}

/// Computes a cascade of pie charts, one per threshold in `slivers`.
///
/// Stage 1 merges every category under `slivers[0]` percent of the total
/// into [`OTHER_LABEL`]. Each later stage breaks down only the previous
/// stage's merged categories, with percentages relative to their own total.
/// The cascade stops once nothing was merged.
///
/// A lone category under the threshold keeps its own name: merging it would
/// produce an "other" slice holding exactly one category.
///
/// ```
/// use amat::chart::breakdown;
/// use amat::{IdentityMap, RawRecord, pipeline::load};
/// use chrono::{TimeZone, Utc};
///
/// # fn main() -> amat::Result<()> {
/// let t = Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap();
/// let mut records = Vec::new();
/// for (chat, n) in [("a", 50), ("b", 30), ("c", 15), ("d", 5)] {
///     records.extend((0..n).map(|_| RawRecord::new(chat, t)));
/// }
/// let table = load(&records, None, "UTC")?;
///
/// let charts = breakdown(&table, &[20.0, 10.0], "chat_id")?;
/// assert_eq!(charts.len(), 2);
/// assert_eq!(charts[0].get("other").unwrap().percent, 20.0);
/// assert_eq!(charts[1].get("c").unwrap().percent, 75.0);
/// assert_eq!(charts[1].get("d").unwrap().percent, 25.0);
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns [`AmatError::UnknownField`](crate::AmatError::UnknownField) if the
/// table has no `by` field.
pub fn breakdown(table: &MessageTable, slivers: &[f64], by: &str) -> Result<Vec<PieChart>> {
    table.require_field(by)?;

    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for message in table {
        let key = message.field(by).unwrap_or(FieldValue::Null);
        if !key.is_null() {
            *counts.entry(key.to_string()).or_insert(0) += 1;
        }
    }

    let mut remainder: Vec<(String, u64)> = counts.into_iter().collect();
    sort_by_count(&mut remainder);

    let mut charts = Vec::with_capacity(slivers.len());
    for &threshold in slivers {
        let total: u64 = remainder.iter().map(|(_, c)| c).sum();
        if total == 0 {
            break;
        }
        let percent = |count: u64| count as f64 * 100.0 / total as f64;

        let (mut kept, mut merged): (Vec<_>, Vec<_>) = remainder
            .into_iter()
            .partition(|(_, count)| percent(*count) >= threshold);
        if merged.len() == 1 {
            kept.append(&mut merged);
            sort_by_count(&mut kept);
        }

        let mut slices: Vec<Slice> = Vec::with_capacity(kept.len() + 1);
        let mut other_count: u64 = merged.iter().map(|(_, c)| c).sum();
        for (label, count) in kept {
            // A real category named "other" joins the merged bucket.
            if label == OTHER_LABEL && !merged.is_empty() {
                other_count += count;
                continue;
            }
            slices.push(Slice {
                label,
                count,
                percent: percent(count),
            });
        }
        if !merged.is_empty() {
            slices.push(Slice {
                label: OTHER_LABEL.to_string(),
                count: other_count,
                percent: percent(other_count),
            });
        }

        tracing::debug!(
            by,
            threshold,
            total,
            slices = slices.len(),
            merged = merged.len(),
            "Computed breakdown stage"
        );
        charts.push(PieChart {
            total,
            title: format!("total: {}", total),
            slices,
        });

        remainder = merged;
    }

    Ok(charts)
}

fn sort_by_count(entries: &mut [(String, u64)]) {
    entries.sort_by(|(la, ca), (lb, cb)| cb.cmp(ca).then_with(|| la.cmp(lb)));
}
