//! Weekday by hour activity grid.

use serde::{Deserialize, Serialize};

use crate::message::MessageTable;

/// Hour at which a displayed day begins.
pub const DAY_START_HOUR: usize = 4;

/// Row labels, Monday first.
pub const WEEKDAY_LABELS: [&str; 7] = ["M", "T", "W", "R", "F", "A", "U"];

/// Message counts indexed by `[weekday][hour]`.
///
/// Every cell is present; hours with no messages hold 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyHeatmap {
    counts: [[u64; 24]; 7],
}

impl WeeklyHeatmap {
    /// Count for a weekday (0 = Monday) and hour (0..=23). Out-of-range cells read 0.
    pub fn get(&self, weekday: usize, hour: usize) -> u64 {
        self.counts
            .get(weekday)
            .and_then(|row| row.get(hour))
            .copied()
            .unwrap_or(0)
    }

    /// The grid with midnight-based columns.
    pub fn counts(&self) -> &[[u64; 24]; 7] {
        &self.counts
    }

    /// Total messages counted.
    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    /// The grid as displayed, with each row starting at [`DAY_START_HOUR`].
    ///
    /// The whole week is shifted as one sequence, so the last columns of a
    /// row hold the small hours of the following day (Sunday wraps to Monday).
    pub fn rotated(&self) -> [[u64; 24]; 7] {
        let mut out = [[0; 24]; 7];
        for (weekday, row) in out.iter_mut().enumerate() {
            for (col, cell) in row.iter_mut().enumerate() {
                let flat = (weekday * 24 + col + DAY_START_HOUR) % (7 * 24);
                *cell = self.counts[flat / 24][flat % 24];
            }
        }
        out
    }

    /// Column labels matching [`rotated`](Self::rotated): `"4am"` … `"3am"`.
    pub fn hour_labels() -> Vec<String> {
        (0..24)
            .map(|col| hour_label((col + DAY_START_HOUR) % 24))
            .collect()
    }
}

fn hour_label(hour: usize) -> String {
    match hour {
        0 => "12am".to_string(),
        1..=11 => format!("{}am", hour),
        12 => "12pm".to_string(),
        _ => format!("{}pm", hour - 12),
    }
}

/// Counts messages per weekday and hour of `date_local`.
///
/// ```
/// use amat::chart::weekly_heatmap;
/// use amat::{RawRecord, pipeline::load};
/// use chrono::{TimeZone, Utc};
///
/// # fn main() -> amat::Result<()> {
/// // 2019-01-02 is a Wednesday
/// let t = Utc.with_ymd_and_hms(2019, 1, 2, 14, 30, 0).unwrap();
/// let table = load(&[RawRecord::new("1", t), RawRecord::new("2", t)], None, "UTC")?;
///
/// let heat = weekly_heatmap(&table);
/// assert_eq!(heat.get(2, 14), 2);
/// assert_eq!(heat.get(0, 0), 0);
/// # Ok(())
/// # }
/// ```
pub fn weekly_heatmap(table: &MessageTable) -> WeeklyHeatmap {
    let mut heatmap = WeeklyHeatmap::default();
    for message in table {
        let (weekday, hour) = (message.weekday as usize, message.hour as usize);
        if let Some(cell) = heatmap
            .counts
            .get_mut(weekday)
            .and_then(|row| row.get_mut(hour))
        {
            *cell += 1;
        }
    }
    tracing::debug!(rows = table.len(), "Built weekly heatmap");
    heatmap
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::RawRecord;
    use crate::pipeline::load;
    use chrono::{TimeDelta, TimeZone, Utc};

    fn heatmap_of(times: &[(u32, u32)]) -> WeeklyHeatmap {
        // 2018-12-31 is a Monday
        let monday = Utc.with_ymd_and_hms(2018, 12, 31, 0, 0, 0).unwrap();
        let records: Vec<RawRecord> = times
            .iter()
            .map(|(weekday, hour)| {
                let t = monday
                    + TimeDelta::days(i64::from(*weekday))
                    + TimeDelta::hours(i64::from(*hour));
                RawRecord::new("1", t)
            })
            .collect();
        weekly_heatmap(&load(&records, None, "UTC").unwrap())
    }

    #[test]
    fn test_cell_counts() {
        let heat = heatmap_of(&[(2, 14), (2, 14), (2, 15), (0, 0), (6, 23)]);
        assert_eq!(heat.get(2, 14), 2);
        assert_eq!(heat.get(2, 15), 1);
        assert_eq!(heat.get(0, 0), 1);
        assert_eq!(heat.get(6, 23), 1);
        assert_eq!(heat.get(3, 3), 0);
        assert_eq!(heat.total(), 5);
    }

    #[test]
    fn test_out_of_range_reads_zero() {
        let heat = heatmap_of(&[(0, 0)]);
        assert_eq!(heat.get(7, 0), 0);
        assert_eq!(heat.get(0, 24), 0);
    }

    #[test]
    fn test_rotation_starts_day_at_4am() {
        let heat = heatmap_of(&[(0, 4), (0, 3), (1, 2), (6, 3)]);
        let rotated = heat.rotated();
        // Monday 4am is the first displayed column of Monday
        assert_eq!(rotated[0][0], 1);
        // Tuesday 2am shows at the end of Monday's row
        assert_eq!(rotated[0][22], 1);
        // Sunday 3am sits in Saturday's last column
        assert_eq!(rotated[5][23], 1);
        // Monday 3am wraps around to Sunday's last column
        assert_eq!(rotated[6][23], 1);
        let total: u64 = rotated.iter().flatten().sum();
        assert_eq!(total, heat.total());
    }

    #[test]
    fn test_hour_labels() {
        let labels = WeeklyHeatmap::hour_labels();
        assert_eq!(labels.len(), 24);
        assert_eq!(labels[0], "4am");
        assert_eq!(labels[8], "12pm");
        assert_eq!(labels[20], "12am");
        assert_eq!(labels[23], "3am");
    }

    #[test]
    fn test_empty_grid_is_all_zero() {
        let heat = WeeklyHeatmap::default();
        assert_eq!(heat.total(), 0);
        assert_eq!(heat.counts().len(), 7);
        assert_eq!(WEEKDAY_LABELS[5], "A");
    }
}
