//! Enrichment pipeline: raw records in, enriched table out.
//!
//! For every record, [`load`] shifts `date_utc` into the requested timezone
//! (DST aware, via `chrono-tz`), strips the zone to get `date_local`, and
//! derives `timestamp`, `weekday`, `hour`, `length` and `ioicon` from it. When an
//! identity map is supplied, every row also gets a `contact` label.
//!
//! Enrichment is a pure function of (records, identity map, timezone): rows keep
//! their input order and running it twice gives identical tables.
//!
//! # Example
//!
//! ```
//! use amat::{IdentityMap, RawRecord, pipeline::load};
//! use chrono::{NaiveDate, TimeZone, Utc};
//!
//! # fn main() -> amat::Result<()> {
//! let records = vec![RawRecord::new("12", Utc.with_ymd_and_hms(2019, 1, 1, 8, 0, 0).unwrap())];
//! let ids = IdentityMap::from_yaml_str("12: Mom")?;
//!
//! let table = load(&records, Some(&ids), "Etc/GMT+8")?;
//! let msg = &table.messages()[0];
//!
//! assert_eq!(msg.date_local, NaiveDate::from_ymd_opt(2019, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap());
//! assert_eq!(msg.weekday, 1); // Tuesday
//! assert_eq!(msg.hour, 0);
//! assert_eq!(msg.contact(), Some("Mom"));
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use chrono::{Datelike, Timelike};
use chrono_tz::Tz;

use crate::config::LoadOptions;
use crate::error::{AmatError, Result};
use crate::identity::{DEFAULT_CONTACT, IdentityMap};
use crate::message::{BASE_FIELDS, CONTACT_FIELD, Direction, Message, MessageTable, RawRecord};
use crate::store::{StoreFormat, create_source};

/// `strftime` pattern of the `timestamp` field: `YYYY.MM.DD hh:mm:ss AM/PM`.
pub const TIMESTAMP_FORMAT: &str = "%Y.%m.%d %I:%M:%S %p";

/// Resolves an IANA timezone identifier.
pub fn parse_timezone(tz: &str) -> Result<Tz> {
    tz.trim()
        .parse::<Tz>()
        .map_err(|_| AmatError::invalid_timezone(tz))
}

/// Enriches raw records into a [`MessageTable`].
///
/// Without an identity map the table has no `contact` column.
///
/// # Errors
///
/// Fails with a configuration error if `timezone` is not a known IANA zone.
pub fn load(
    records: &[RawRecord],
    identity: Option<&IdentityMap>,
    timezone: &str,
) -> Result<MessageTable> {
    let tz = parse_timezone(timezone)?;

    let messages: Vec<Message> = records
        .iter()
        .map(|record| enrich(record, identity, tz))
        .collect();

    let table = MessageTable::new(columns(records, identity.is_some()), messages);

    let unmapped = identity.map(|_| {
        table
            .iter()
            .filter(|m| m.contact() == Some(DEFAULT_CONTACT))
            .map(|m| m.chat_id.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    });
    tracing::info!(
        rows = table.len(),
        timezone = %tz,
        unmapped_chats = unmapped.unwrap_or(0),
        "Loaded message table"
    );

    Ok(table)
}

/// Reads a record store (and optional identity map) from disk, then enriches it.
///
/// The store format comes from [`LoadOptions::format`] or the file extension.
///
/// # Example
///
/// ```rust,no_run
/// use amat::config::LoadOptions;
/// use amat::pipeline::load_path;
///
/// # fn main() -> amat::Result<()> {
/// let options = LoadOptions::new()
///     .with_id_map("id_map.yaml")
///     .with_timezone("US/Pacific");
/// let table = load_path("chat_df.csv", &options)?;
/// # Ok(())
/// # }
/// ```
pub fn load_path(data_path: impl AsRef<Path>, options: &LoadOptions) -> Result<MessageTable> {
    let data_path = data_path.as_ref();

    // Fail fast on a bad zone before touching the filesystem.
    parse_timezone(&options.timezone)?;

    let format = match options.format {
        Some(format) => format,
        None => StoreFormat::from_path(data_path)?,
    };
    let records = create_source(format)?.read(data_path)?;

    let identity = options
        .id_map
        .as_deref()
        .map(|path| IdentityMap::from_path(path))
        .transpose()?;

    load(&records, identity.as_ref(), &options.timezone)
}

fn enrich(record: &RawRecord, identity: Option<&IdentityMap>, tz: Tz) -> Message {
    let date_local = record.date_utc.with_timezone(&tz).naive_local();

    Message {
        chat_id: record.chat_id.clone(),
        guid: record.guid.clone(),
        text: record.text.clone(),
        is_from_me: record.is_from_me,
        date_utc: record.date_utc,
        date_local,
        timestamp: date_local.format(TIMESTAMP_FORMAT).to_string(),
        weekday: date_local.weekday().num_days_from_monday(),
        hour: date_local.hour(),
        length: record.text.as_deref().map_or(0, |t| t.chars().count()),
        contact: identity.map(|ids| ids.lookup(&record.chat_id).to_string()),
        direction: Direction::from_flag(record.is_from_me),
        extra: record.extra.clone(),
    }
}

/// Base fields, then `contact` when mapped, then extra store columns by name.
fn columns(records: &[RawRecord], has_contact: bool) -> Vec<String> {
    let mut columns: Vec<String> = BASE_FIELDS.iter().map(|s| s.to_string()).collect();
    if has_contact {
        columns.push(CONTACT_FIELD.to_string());
    }

    let extra: BTreeSet<&str> = records
        .iter()
        .flat_map(|r| r.extra.keys().map(String::as_str))
        .filter(|k| !BASE_FIELDS.contains(k) && *k != CONTACT_FIELD)
        .collect();
    columns.extend(extra.into_iter().map(String::from));
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn record(chat_id: &str, y: i32, m: u32, d: u32, h: u32) -> RawRecord {
        RawRecord::new(chat_id, Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap())
    }

    #[test]
    fn test_local_time_fixed_offset() {
        let table = load(&[record("1", 2019, 1, 1, 8)], None, "Etc/GMT+8").unwrap();
        let msg = &table.messages()[0];
        assert_eq!(
            msg.date_local,
            NaiveDate::from_ymd_opt(2019, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
        assert_eq!(msg.weekday, 1);
        assert_eq!(msg.hour, 0);
        assert_eq!(msg.timestamp, "2019.01.01 12:00:00 AM");
    }

    #[test]
    fn test_local_time_follows_dst() {
        // Pacific is UTC-8 in January and UTC-7 in July.
        let records = [record("1", 2019, 1, 15, 20), record("1", 2019, 7, 15, 20)];
        let table = load(&records, None, "America/Los_Angeles").unwrap();
        assert_eq!(table.messages()[0].hour, 12);
        assert_eq!(table.messages()[1].hour, 13);
        assert_eq!(table.messages()[1].timestamp, "2019.07.15 01:00:00 PM");
    }

    #[test]
    fn test_derived_fields() {
        let records = [
            record("1", 2019, 1, 6, 23).with_text("héllo 👋").from_me(true),
            record("2", 2019, 1, 7, 0),
        ];
        let table = load(&records, None, "UTC").unwrap();

        let sent = &table.messages()[0];
        assert_eq!(sent.length, 7);
        assert_eq!(sent.ioicon(), "💬");
        assert_eq!(sent.weekday, 6); // Sunday

        let received = &table.messages()[1];
        assert_eq!(received.length, 0);
        assert_eq!(received.ioicon(), "📢");
        assert_eq!(received.weekday, 0); // Monday
    }

    #[test]
    fn test_contact_lookup_and_default() {
        let ids = IdentityMap::from_yaml_str("1: Mom\n").unwrap();
        let table = load(&[record("1", 2019, 1, 1, 0), record("9", 2019, 1, 1, 0)], Some(&ids), "UTC")
            .unwrap();
        assert!(table.has_field("contact"));
        assert_eq!(table.messages()[0].contact(), Some("Mom"));
        assert_eq!(table.messages()[1].contact(), Some("other"));
    }

    #[test]
    fn test_no_contact_without_map() {
        let table = load(&[record("1", 2019, 1, 1, 0)], None, "UTC").unwrap();
        assert!(!table.has_field("contact"));
        assert!(table.messages()[0].contact().is_none());
    }

    #[test]
    fn test_order_preserved() {
        let records = [
            record("1", 2020, 1, 1, 0).with_guid("late"),
            record("1", 2019, 1, 1, 0).with_guid("early"),
        ];
        let table = load(&records, None, "UTC").unwrap();
        assert_eq!(table.messages()[0].guid, "late");
        assert_eq!(table.messages()[1].guid, "early");
    }

    #[test]
    fn test_deterministic() {
        let ids = IdentityMap::from_yaml_str("1: Mom\n").unwrap();
        let records = [
            record("1", 2019, 3, 10, 9).with_text("a"),
            record("2", 2019, 11, 3, 9).with_extra("service", "SMS"),
        ];
        let first = load(&records, Some(&ids), "US/Pacific").unwrap();
        let second = load(&records, Some(&ids), "US/Pacific").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_extra_columns_listed() {
        let records = [record("1", 2019, 1, 1, 0).with_extra("service", "SMS")];
        let table = load(&records, None, "UTC").unwrap();
        assert!(table.has_field("service"));
        assert_eq!(table.columns().last().map(String::as_str), Some("service"));
    }

    #[test]
    fn test_unknown_timezone() {
        let err = load(&[record("1", 2019, 1, 1, 0)], None, "Mars/Olympus").unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_empty_input() {
        let table = load(&[], None, "UTC").unwrap();
        assert!(table.is_empty());
        assert!(table.has_field("date_local"));
    }
}
