//! Column conventions shared by every record store reader.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};

/// Seconds between the Unix epoch and the Apple epoch (2001-01-01T00:00:00Z).
pub const APPLE_EPOCH_OFFSET_SECS: i64 = 978_307_200;

pub(crate) const CHAT_ID: &str = "chat_id";
pub(crate) const GUID: &str = "guid";
pub(crate) const TEXT: &str = "text";
pub(crate) const IS_FROM_ME: &str = "is_from_me";
pub(crate) const DATE_UTC: &str = "date_utc";
pub(crate) const APPLE_DATE: &str = "date";

/// Columns with a dedicated slot in [`RawRecord`](crate::RawRecord).
pub(crate) const KNOWN: &[&str] = &[CHAT_ID, GUID, TEXT, IS_FROM_ME, DATE_UTC];

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parses a `date_utc` cell.
///
/// Accepts RFC 3339 (any offset, normalized to UTC) and naive
/// `YYYY-MM-DD HH:MM:SS[.f]` / `YYYY-MM-DDTHH:MM:SS[.f]`, which are taken to
/// already be UTC.
///
/// ```
/// use amat::store::parse_date_utc;
///
/// let a = parse_date_utc("2019-01-01T08:00:00Z").unwrap();
/// let b = parse_date_utc("2019-01-01 00:00:00-08:00").unwrap();
/// let c = parse_date_utc("2019-01-01 08:00:00").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a, c);
/// ```
pub fn parse_date_utc(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Converts a raw Messages database `date` (nanoseconds since 2001-01-01 UTC).
///
/// ```
/// use amat::store::apple_date_to_utc;
///
/// let dt = apple_date_to_utc(0).unwrap();
/// assert_eq!(dt.to_rfc3339(), "2001-01-01T00:00:00+00:00");
/// ```
pub fn apple_date_to_utc(nanos: i64) -> Option<DateTime<Utc>> {
    let epoch = DateTime::from_timestamp(APPLE_EPOCH_OFFSET_SECS, 0)?;
    epoch.checked_add_signed(TimeDelta::nanoseconds(nanos))
}

/// Parses an `is_from_me` cell: `1`/`0`/`true`/`false` in any case; empty is `false`.
pub fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" => Some(true),
        "0" | "false" | "f" | "no" | "" => Some(false),
        _ => None,
    }
}
