//! Resampling frequencies for time-series charts.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::AmatError;

/// Calendar unit of a [`Frequency`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    /// Calendar day
    Day,
    /// Week starting Monday
    Week,
    /// Calendar month
    Month,
    /// Calendar year
    Year,
}

impl Unit {
    /// Returns the single-letter code (`D`, `W`, `M`, `Y`).
    pub fn code(&self) -> char {
        match self {
            Unit::Day => 'D',
            Unit::Week => 'W',
            Unit::Month => 'M',
            Unit::Year => 'Y',
        }
    }

    /// Returns the first day of the unit containing `date`.
    pub fn start_of(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Unit::Day => date,
            Unit::Week => date - Days::new(u64::from(date.weekday().num_days_from_monday())),
            Unit::Month => date.with_day(1).unwrap_or(date),
            Unit::Year => date.with_ordinal(1).unwrap_or(date),
        }
    }

    /// Whole units between two unit starts (`from <= to`).
    fn between(&self, from: NaiveDate, to: NaiveDate) -> u64 {
        let months = |d: NaiveDate| i64::from(d.year()) * 12 + i64::from(d.month0());
        let n = match self {
            Unit::Day => (to - from).num_days(),
            Unit::Week => (to - from).num_days() / 7,
            Unit::Month => months(to) - months(from),
            Unit::Year => i64::from(to.year() - from.year()),
        };
        n.max(0) as u64
    }

    fn advance(&self, date: NaiveDate, n: u64) -> NaiveDate {
        let shifted = match self {
            Unit::Day => date.checked_add_days(Days::new(n)),
            Unit::Week => date.checked_add_days(Days::new(n * 7)),
            Unit::Month => date.checked_add_months(Months::new(n as u32)),
            Unit::Year => date.checked_add_months(Months::new((n * 12) as u32)),
        };
        shifted.unwrap_or(NaiveDate::MAX)
    }
}

/// A resampling frequency: a positive multiple of a calendar unit.
///
/// Parsed from `"D"`, `"W"`, `"M"`, `"Y"` (alias `"A"`) with an optional
/// multiple in front, e.g. `"3D"` or `"6M"`.
///
/// Buckets are labelled by their first day. Weeks start on Monday, months on
/// the 1st and years on January 1st. For multiples, bucket boundaries are
/// anchored at the unit containing the earliest record.
///
/// ```
/// use amat::chart::{Frequency, Unit};
///
/// let f: Frequency = "6M".parse().unwrap();
/// assert_eq!(f.multiple, 6);
/// assert_eq!(f.unit, Unit::Month);
/// assert_eq!(f.to_string(), "6M");
///
/// assert!("0D".parse::<Frequency>().is_err());
/// assert!("Q".parse::<Frequency>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Frequency {
    /// Number of units per bucket (at least 1)
    pub multiple: u32,
    /// Calendar unit
    pub unit: Unit,
}

impl Frequency {
    /// One day per bucket.
    pub const DAILY: Frequency = Frequency::new(1, Unit::Day);
    /// One week per bucket.
    pub const WEEKLY: Frequency = Frequency::new(1, Unit::Week);
    /// One month per bucket.
    pub const MONTHLY: Frequency = Frequency::new(1, Unit::Month);
    /// One year per bucket.
    pub const YEARLY: Frequency = Frequency::new(1, Unit::Year);

    /// Creates a frequency. A zero multiple is treated as 1.
    pub const fn new(multiple: u32, unit: Unit) -> Self {
        Self {
            multiple: if multiple == 0 { 1 } else { multiple },
            unit,
        }
    }

    /// Index of the bucket containing `date`, counting from `anchor`.
    pub(crate) fn bucket_index(&self, anchor: NaiveDate, date: NaiveDate) -> usize {
        (self.unit.between(anchor, self.unit.start_of(date)) / u64::from(self.multiple)) as usize
    }

    /// First day of the `index`-th bucket after `anchor`.
    pub(crate) fn bucket_start(&self, anchor: NaiveDate, index: usize) -> NaiveDate {
        self.unit
            .advance(anchor, index as u64 * u64::from(self.multiple))
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.multiple == 1 {
            write!(f, "{}", self.unit.code())
        } else {
            write!(f, "{}{}", self.multiple, self.unit.code())
        }
    }
}

impl FromStr for Frequency {
    type Err = AmatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let split = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        let (digits, code) = trimmed.split_at(split);

        let multiple = if digits.is_empty() {
            1
        } else {
            match digits.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => return Err(AmatError::invalid_frequency(s)),
            }
        };

        let unit = match code.to_ascii_uppercase().as_str() {
            "D" => Unit::Day,
            "W" => Unit::Week,
            "M" | "MS" => Unit::Month,
            "Y" | "A" | "YS" | "AS" => Unit::Year,
            _ => return Err(AmatError::invalid_frequency(s)),
        };

        Ok(Frequency { multiple, unit })
    }
}

impl From<Frequency> for String {
    fn from(f: Frequency) -> Self {
        f.to_string()
    }
}

impl TryFrom<String> for Frequency {
    type Error = AmatError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
