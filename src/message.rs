//! Message records and the enriched message table.
//!
//! This module provides:
//! - [`RawRecord`] - one row as it comes out of a record store
//! - [`Message`] - one row of the enriched table, with derived time and contact fields
//! - [`MessageTable`] - the ordered, immutable collection every operation reads
//! - [`FieldValue`] - a dynamically typed cell, used for field-based filtering and grouping
//!
//! # Fields
//!
//! | Field | Type | Source |
//! |-------|------|--------|
//! | `chat_id` | text | record store |
//! | `guid` | text | record store |
//! | `text` | text or null | record store |
//! | `is_from_me` | bool | record store |
//! | `date_utc` | UTC instant | record store |
//! | `date_local` | naive local time | `date_utc` shifted into the load timezone |
//! | `timestamp` | text | `date_local` as `YYYY.MM.DD hh:mm:ss AM/PM` |
//! | `weekday` | int | 0 = Monday … 6 = Sunday |
//! | `hour` | int | 0..=23 |
//! | `length` | int | character count of `text` |
//! | `contact` | text | identity map lookup (only when a map was supplied) |
//! | `ioicon` | text | 💬 for sent, 📢 for received |
//!
//! Any extra record store column is carried along under its own name.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AmatError, Result};

/// Fields every enriched table has, in column order.
pub const BASE_FIELDS: &[&str] = &[
    "chat_id",
    "guid",
    "text",
    "is_from_me",
    "date_utc",
    "date_local",
    "timestamp",
    "weekday",
    "hour",
    "length",
    "ioicon",
];

/// Field added when an identity map is supplied at load time.
pub const CONTACT_FIELD: &str = "contact";

/// Whether a message was sent by the archive owner or received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Sent by the archive owner.
    Sent,
    /// Received from someone else.
    Received,
}

impl Direction {
    /// Returns the direction for an `is_from_me` flag.
    pub fn from_flag(is_from_me: bool) -> Self {
        if is_from_me {
            Direction::Sent
        } else {
            Direction::Received
        }
    }

    /// Returns the glyph printed in transcripts.
    pub fn glyph(&self) -> &'static str {
        match self {
            Direction::Sent => "💬",
            Direction::Received => "📢",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glyph())
    }
}

/// A dynamically typed cell value.
///
/// Field filters and grouping work on named fields, so every column of a
/// [`MessageTable`] can be read as a `FieldValue`.
///
/// ```
/// use amat::FieldValue;
///
/// assert_eq!(FieldValue::from("Mom"), FieldValue::Text("Mom".into()));
/// assert_eq!(FieldValue::from(false), FieldValue::Bool(false));
/// assert_eq!(FieldValue::from(3), FieldValue::Int(3));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Missing value
    Null,
    /// Boolean flag
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Text
    Text(String),
    /// UTC instant
    Timestamp(DateTime<Utc>),
    /// Naive local wall time
    LocalTime(NaiveDateTime),
}

impl FieldValue {
    /// Returns `true` for [`FieldValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Returns the text, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer, if this is an integer value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the flag, if this is a boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(x) => write!(f, "{}", x),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
            FieldValue::LocalTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i64::from(i))
    }
}

impl From<u32> for FieldValue {
    fn from(i: u32) -> Self {
        FieldValue::Int(i64::from(i))
    }
}

impl From<f64> for FieldValue {
    fn from(x: f64) -> Self {
        FieldValue::Float(x)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(ts: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(ts)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(dt: NaiveDateTime) -> Self {
        FieldValue::LocalTime(dt)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// One row of a record store snapshot, before enrichment.
///
/// # Example
///
/// ```
/// use amat::RawRecord;
/// use chrono::{TimeZone, Utc};
///
/// let record = RawRecord::new("7", Utc.with_ymd_and_hms(2019, 1, 1, 8, 0, 0).unwrap())
///     .with_guid("A1B2")
///     .with_text("frabjous party tonight")
///     .from_me(true);
///
/// assert_eq!(record.chat_id, "7");
/// assert!(record.is_from_me);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Conversation identifier.
    pub chat_id: String,
    /// Message identifier, unique within the store.
    #[serde(default)]
    pub guid: String,
    /// Message body; `None` for attachments and other text-less rows.
    #[serde(default)]
    pub text: Option<String>,
    /// `true` if the archive owner sent the message.
    #[serde(default)]
    pub is_from_me: bool,
    /// When the message was sent.
    pub date_utc: DateTime<Utc>,
    /// Every other column of the store, by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, FieldValue>,
}

impl RawRecord {
    /// Creates a record with only the required columns.
    pub fn new(chat_id: impl Into<String>, date_utc: DateTime<Utc>) -> Self {
        Self {
            chat_id: chat_id.into(),
            guid: String::new(),
            text: None,
            is_from_me: false,
            date_utc,
            extra: BTreeMap::new(),
        }
    }

    /// Builder method to set the guid.
    #[must_use]
    pub fn with_guid(mut self, guid: impl Into<String>) -> Self {
        self.guid = guid.into();
        self
    }

    /// Builder method to set the text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Builder method to set the sender flag.
    #[must_use]
    pub fn from_me(mut self, is_from_me: bool) -> Self {
        self.is_from_me = is_from_me;
        self
    }

    /// Builder method to add an extra column.
    #[must_use]
    pub fn with_extra(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }
}

/// One row of the enriched table.
///
/// Built by [`pipeline::load`](crate::pipeline::load); every derived field is a
/// pure function of the raw record, the identity map and the timezone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    /// Conversation identifier.
    pub chat_id: String,
    /// Message identifier.
    pub guid: String,
    /// Message body, if any.
    pub text: Option<String>,
    /// `true` if the archive owner sent the message.
    pub is_from_me: bool,
    /// When the message was sent, in UTC.
    pub date_utc: DateTime<Utc>,
    /// Local wall time in the load timezone.
    pub date_local: NaiveDateTime,
    /// `date_local` formatted as `YYYY.MM.DD hh:mm:ss AM/PM`.
    pub timestamp: String,
    /// Day of week, 0 = Monday.
    pub weekday: u32,
    /// Hour of day, 0..=23.
    pub hour: u32,
    /// Number of characters in `text`.
    pub length: usize,
    /// Contact label; `None` when loaded without an identity map.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    /// Sent or received.
    pub direction: Direction,
    /// Extra record store columns.
    #[serde(flatten)]
    pub extra: BTreeMap<String, FieldValue>,
}

impl Message {
    /// Returns the message text, treating an absent body as empty.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Returns the sent/received glyph.
    pub fn ioicon(&self) -> &'static str {
        self.direction.glyph()
    }

    /// Returns the contact label, if the table was loaded with an identity map.
    pub fn contact(&self) -> Option<&str> {
        self.contact.as_deref()
    }

    /// Reads a field by name.
    ///
    /// Returns `None` if the message has no such field. `contact` is absent
    /// when the table was loaded without an identity map.
    pub fn field(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "chat_id" => FieldValue::Text(self.chat_id.clone()),
            "guid" => FieldValue::Text(self.guid.clone()),
            "text" => FieldValue::from(self.text.clone()),
            "is_from_me" => FieldValue::Bool(self.is_from_me),
            "date_utc" => FieldValue::Timestamp(self.date_utc),
            "date_local" => FieldValue::LocalTime(self.date_local),
            "timestamp" => FieldValue::Text(self.timestamp.clone()),
            "weekday" => FieldValue::from(self.weekday),
            "hour" => FieldValue::from(self.hour),
            "length" => FieldValue::Int(self.length as i64),
            "ioicon" => FieldValue::from(self.ioicon()),
            CONTACT_FIELD => return self.contact.clone().map(FieldValue::Text),
            other => return self.extra.get(other).cloned(),
        };
        Some(value)
    }
}

/// The enriched, ordered message table.
///
/// Tables are never modified in place: filters and searches build new tables,
/// and the column list travels with the rows so an empty result still knows
/// which fields exist.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MessageTable {
    columns: Vec<String>,
    messages: Vec<Message>,
}

impl MessageTable {
    /// Creates a table from rows and their column list.
    pub fn new(columns: Vec<String>, messages: Vec<Message>) -> Self {
        Self { columns, messages }
    }

    /// Builds a table with the same columns and a different set of rows.
    pub(crate) fn derive(&self, messages: Vec<Message>) -> Self {
        Self {
            columns: self.columns.clone(),
            messages,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Iterates over rows in table order.
    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    /// Returns the rows as a slice.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns `true` if the table has a column with this name.
    pub fn has_field(&self, field: &str) -> bool {
        self.columns.iter().any(|c| c == field)
    }

    /// Fails with [`AmatError::UnknownField`] unless the column exists.
    pub fn require_field(&self, field: &str) -> Result<()> {
        if self.has_field(field) {
            Ok(())
        } else {
            Err(AmatError::unknown_field(field))
        }
    }

    /// Reads one cell. Missing extra values read as [`FieldValue::Null`].
    pub fn value(&self, row: usize, field: &str) -> Result<Option<FieldValue>> {
        self.require_field(field)?;
        Ok(self
            .messages
            .get(row)
            .map(|m| m.field(field).unwrap_or(FieldValue::Null)))
    }

    /// Returns the first `n` rows.
    #[must_use]
    pub fn head(&self, n: usize) -> Self {
        self.derive(self.messages.iter().take(n).cloned().collect())
    }

    /// Returns the last `n` rows, in table order.
    #[must_use]
    pub fn tail(&self, n: usize) -> Self {
        let skip = self.messages.len().saturating_sub(n);
        self.derive(self.messages[skip..].to_vec())
    }
}

impl<'a> IntoIterator for &'a MessageTable {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
