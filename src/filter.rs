//! Filter messages by date range, field membership, or an arbitrary predicate.
//!
//! Every filter borrows a [`MessageTable`] and returns a new one: input rows
//! are never touched, row order is preserved, and the output is a valid input
//! to the next filter, so filters chain freely.
//!
//! # Filter Types
//!
//! | Filter | Function | Keeps |
//! |--------|----------|-------|
//! | Date range | [`filter_date`] | `start < date_local < end` (both exclusive) |
//! | Membership | [`filter_any`] | rows whose field equals one of the given values |
//! | Predicate | [`filter_by`] | rows whose field satisfies a function |
//!
//! # Examples
//!
//! ```
//! use amat::filter::{DateRange, filter_any, filter_by, filter_date};
//! use amat::{IdentityMap, RawRecord, pipeline::load};
//! use chrono::{TimeZone, Utc};
//!
//! # fn main() -> amat::Result<()> {
//! let records = vec![
//!     RawRecord::new("1", Utc.with_ymd_and_hms(2018, 7, 1, 12, 0, 0).unwrap()).with_text("old"),
//!     RawRecord::new("1", Utc.with_ymd_and_hms(2019, 7, 1, 12, 0, 0).unwrap()).with_text("summer"),
//!     RawRecord::new("2", Utc.with_ymd_and_hms(2019, 7, 2, 12, 0, 0).unwrap()).with_text("frabjous"),
//! ];
//! let ids = IdentityMap::from_yaml_str("1: Mom\n2: Dad\n")?;
//! let table = load(&records, Some(&ids), "UTC")?;
//!
//! let summer = filter_date(&table, &DateRange::new().with_start("Jun 21, 2019")?.with_end("Sept 23, 2019")?);
//! assert_eq!(summer.len(), 2);
//!
//! let from_mom = filter_any(&summer, "contact", ["Mom"])?;
//! assert_eq!(from_mom.len(), 1);
//!
//! let frabjous = filter_by(&table, "text", |v| v.to_string().to_lowercase().contains("frabjous"))?;
//! assert_eq!(frabjous.len(), 1);
//! # Ok(())
//! # }
//! ```

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{AmatError, Result};
use crate::message::{FieldValue, Message, MessageTable};

/// Formats tried, in order, for date-only strings.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%b %d, %Y",
    // before "%b %d %Y", which would read "Jan 2019" as Jan 20, 19 AD
    "%b %Y",
    "%b %d %Y",
    "%d %b %Y",
];

/// Formats tried, in order, for strings that carry a time of day.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y.%m.%d %I:%M:%S %p",
    "%b %d, %Y %H:%M",
    "%b %d, %Y %I:%M %p",
];

/// Parses a human-readable date.
///
/// Accepts ISO dates (`2019-06-21`), US numeric dates (`6/21/2019`) and
/// month-name dates (`Jun 21, 2019`, `June 21, 2019`, `Sept 23, 2019`,
/// `21 June 2019`), optionally followed by a time. Date-only input means
/// midnight.
///
/// ```
/// use amat::filter::parse_date;
///
/// let a = parse_date("September 25, 2019").unwrap();
/// let b = parse_date("2019-09-25").unwrap();
/// assert_eq!(a, b);
/// assert!(parse_date("someday").is_err());
/// ```
pub fn parse_date(input: &str) -> Result<NaiveDateTime> {
    let normalized = normalize(input);

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&normalized, fmt).ok())
        .or_else(|| {
            DATE_FORMATS.iter().find_map(|fmt| {
                // "%b %Y" has no day; pin it to the first of the month.
                let (text, fmt) = if *fmt == "%b %Y" {
                    (format!("1 {}", normalized), "%d %b %Y")
                } else {
                    (normalized.clone(), *fmt)
                };
                NaiveDate::parse_from_str(&text, fmt)
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
        })
        .ok_or_else(|| AmatError::invalid_date(input))
}

/// Full month names; `%b` only parses the three-letter prefix.
const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Collapses whitespace, drops a trailing period after month abbreviations,
/// and rewrites full month names and "Sept" to their three-letter form.
fn normalize(input: &str) -> String {
    input
        .split_whitespace()
        .map(|word| {
            let trimmed = word.trim_end_matches('.');
            let (body, comma) = match trimmed.strip_suffix(',') {
                Some(body) => (body.trim_end_matches('.'), ","),
                None => (trimmed, ""),
            };
            let month = MONTHS.iter().find(|&&name| {
                body.eq_ignore_ascii_case(name)
                    || (body.eq_ignore_ascii_case("sept") && name == "september")
            });
            match month {
                Some(name) => format!("{}{}", &name[..3], comma),
                None => format!("{}{}", body, comma),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// An exclusive date window on `date_local`.
///
/// Defaults span 1900-01-01 to 2200-01-01, so leaving either bound unset
/// filters nothing on that side.
///
/// # Examples
///
/// ```
/// use amat::filter::DateRange;
///
/// # fn main() -> amat::Result<()> {
/// let new_texts = DateRange::new().with_start("Jan 1, 2019")?;
/// let old_texts = DateRange::new().with_end("July 7, 2018")?;
/// let summer = DateRange::new()
///     .with_start("Jun 21, 2019")?
///     .with_end("Sept 23, 2019")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// Rows must be strictly after this instant.
    pub start: NaiveDateTime,
    /// Rows must be strictly before this instant.
    pub end: NaiveDateTime,
}

impl Default for DateRange {
    fn default() -> Self {
        Self {
            start: midnight(1900, 1, 1),
            end: midnight(2200, 1, 1),
        }
    }
}

fn midnight(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

impl DateRange {
    /// Creates the full default range.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the (exclusive) lower bound from a date string.
    ///
    /// # Errors
    ///
    /// Returns [`AmatError::InvalidDate`] if the string is not a recognized date.
    pub fn with_start(mut self, date: &str) -> Result<Self> {
        self.start = parse_date(date)?;
        Ok(self)
    }

    /// Sets the (exclusive) upper bound from a date string.
    ///
    /// # Errors
    ///
    /// Returns [`AmatError::InvalidDate`] if the string is not a recognized date.
    pub fn with_end(mut self, date: &str) -> Result<Self> {
        self.end = parse_date(date)?;
        Ok(self)
    }

    /// Sets the lower bound directly.
    #[must_use]
    pub fn with_start_at(mut self, start: NaiveDateTime) -> Self {
        self.start = start;
        self
    }

    /// Sets the upper bound directly.
    #[must_use]
    pub fn with_end_at(mut self, end: NaiveDateTime) -> Self {
        self.end = end;
        self
    }

    /// Returns `true` if `t` lies strictly inside the range.
    pub fn contains(&self, t: &NaiveDateTime) -> bool {
        self.start < *t && *t < self.end
    }
}

/// Keeps messages with `start < date_local < end`.
pub fn filter_date(table: &MessageTable, range: &DateRange) -> MessageTable {
    let kept = retain(table, |m| range.contains(&m.date_local));
    tracing::debug!(
        rows_in = table.len(),
        rows_out = kept.len(),
        start = %range.start,
        end = %range.end,
        "Filtered by date"
    );
    kept
}

/// Parses optional bound strings, then applies [`filter_date`].
///
/// ```
/// # use amat::{MessageTable, filter::filter_between};
/// # fn main() -> amat::Result<()> {
/// # let table = MessageTable::default();
/// let recent = filter_between(&table, Some("September 25, 2019"), None)?;
/// # Ok(())
/// # }
/// ```
pub fn filter_between(
    table: &MessageTable,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<MessageTable> {
    let mut range = DateRange::new();
    if let Some(start) = start {
        range = range.with_start(start)?;
    }
    if let Some(end) = end {
        range = range.with_end(end)?;
    }
    Ok(filter_date(table, &range))
}

/// Keeps messages whose `field` equals any of `values`.
///
/// An empty value set returns an empty table.
///
/// ```
/// # use amat::{MessageTable, filter::filter_any};
/// # fn main() -> amat::Result<()> {
/// # let table = MessageTable::new(vec!["contact".into(), "is_from_me".into()], vec![]);
/// let from_parents = filter_any(&table, "contact", ["Mom", "Dad", "Mom and Dad"])?;
/// let received = filter_any(&table, "is_from_me", [false])?;
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns [`AmatError::UnknownField`] if the table has no such field.
pub fn filter_any<I, V>(table: &MessageTable, field: &str, values: I) -> Result<MessageTable>
where
    I: IntoIterator<Item = V>,
    V: Into<FieldValue>,
{
    table.require_field(field)?;
    let allowed: Vec<FieldValue> = values.into_iter().map(Into::into).collect();

    let kept = retain(table, |m| {
        let value = m.field(field).unwrap_or(FieldValue::Null);
        allowed.contains(&value)
    });
    tracing::debug!(
        field,
        allowed = allowed.len(),
        rows_in = table.len(),
        rows_out = kept.len(),
        "Filtered by membership"
    );
    Ok(kept)
}

/// Keeps messages whose `field` satisfies `predicate`.
///
/// ```
/// # use amat::{FieldValue, MessageTable, filter::filter_by};
/// # fn main() -> amat::Result<()> {
/// # let table = MessageTable::new(vec!["weekday".into()], vec![]);
/// // Mondays, Wednesdays and Fridays
/// let mwf = filter_by(&table, "weekday", |v| matches!(v.as_int(), Some(0 | 2 | 4)))?;
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns [`AmatError::UnknownField`] if the table has no such field.
pub fn filter_by<F>(table: &MessageTable, field: &str, predicate: F) -> Result<MessageTable>
where
    F: Fn(&FieldValue) -> bool,
{
    table.require_field(field)?;

    let kept = retain(table, |m| {
        let value = m.field(field).unwrap_or(FieldValue::Null);
        predicate(&value)
    });
    tracing::debug!(
        field,
        rows_in = table.len(),
        rows_out = kept.len(),
        "Filtered by predicate"
    );
    Ok(kept)
}

fn retain(table: &MessageTable, keep: impl Fn(&Message) -> bool) -> MessageTable {
    table.derive(table.iter().filter(|m| keep(m)).cloned().collect())
}
