//! JSON and JSON Lines record store readers.

use serde_json::{Map, Value};

use crate::error::{AmatError, LoadErrorKind, Result};
use crate::message::{FieldValue, RawRecord};

use super::RecordSource;
use super::columns::{
    APPLE_DATE, CHAT_ID, DATE_UTC, GUID, IS_FROM_ME, KNOWN, TEXT, apple_date_to_utc, parse_bool,
    parse_date_utc,
};

/// Reads a JSON array of row objects.
#[derive(Debug, Clone, Default)]
pub struct JsonSource;

impl JsonSource {
    /// Creates a new reader.
    pub fn new() -> Self {
        Self
    }
}

impl RecordSource for JsonSource {
    fn name(&self) -> &'static str {
        "JSON"
    }

    fn read_str(&self, content: &str) -> Result<Vec<RawRecord>> {
        let value: Value = serde_json::from_str(content).map_err(|e| AmatError::load(e, None))?;
        let rows = match value {
            Value::Array(rows) => rows,
            _ => {
                return Err(AmatError::load(
                    LoadErrorKind::UnsupportedFormat("expected a JSON array of rows".into()),
                    None,
                ));
            }
        };

        rows.into_iter()
            .enumerate()
            .map(|(row, value)| record_from_value(row, value))
            .collect()
    }
}

/// Reads one JSON row object per line. Blank lines are skipped.
#[derive(Debug, Clone, Default)]
pub struct JsonlSource;

impl JsonlSource {
    /// Creates a new reader.
    pub fn new() -> Self {
        Self
    }
}

impl RecordSource for JsonlSource {
    fn name(&self) -> &'static str {
        "JSONL"
    }

    fn read_str(&self, content: &str) -> Result<Vec<RawRecord>> {
        // rows count physical lines, blank ones included
        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(row, line)| {
                let value: Value =
                    serde_json::from_str(line).map_err(|e| AmatError::load(e, None))?;
                record_from_value(row, value)
            })
            .collect()
    }
}

fn record_from_value(row: usize, value: Value) -> Result<RawRecord> {
    let mut obj = match value {
        Value::Object(obj) => obj,
        other => return Err(AmatError::invalid_value(row, "<row>", other.to_string())),
    };

    let chat_id = match obj.remove(CHAT_ID) {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => return Err(AmatError::invalid_value(row, CHAT_ID, other.to_string())),
        None => return Err(AmatError::missing_column(CHAT_ID)),
    };

    let date_utc = take_date(row, &mut obj)?;

    let guid = match obj.remove(GUID) {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => String::new(),
        Some(other) => {
            tracing::warn!(row, value = %other, "Non-string guid converted to text");
            other.to_string()
        }
    };

    let text = match obj.remove(TEXT) {
        Some(Value::String(s)) => Some(s),
        Some(Value::Null) | None => None,
        Some(other) => return Err(AmatError::invalid_value(row, TEXT, other.to_string())),
    };

    let is_from_me = match obj.remove(IS_FROM_ME) {
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_i64().map(|i| i != 0).ok_or_else(|| {
            AmatError::invalid_value(row, IS_FROM_ME, n.to_string())
        })?,
        Some(Value::String(s)) => {
            parse_bool(&s).ok_or_else(|| AmatError::invalid_value(row, IS_FROM_ME, s))?
        }
        Some(Value::Null) | None => false,
        Some(other) => {
            return Err(AmatError::invalid_value(row, IS_FROM_ME, other.to_string()));
        }
    };

    let extra = obj
        .into_iter()
        .filter(|(k, _)| !KNOWN.contains(&k.as_str()))
        .map(|(k, v)| {
            if v.is_array() || v.is_object() {
                tracing::warn!(row, column = %k, "Nested value kept as JSON text");
            }
            (k, field_value(v))
        })
        .collect();

    Ok(RawRecord {
        chat_id,
        guid,
        text,
        is_from_me,
        date_utc,
        extra,
    })
}

/// Reads `date_utc` (string, or Unix seconds), falling back to the Apple `date`.
fn take_date(row: usize, obj: &mut Map<String, Value>) -> Result<chrono::DateTime<chrono::Utc>> {
    if let Some(value) = obj.remove(DATE_UTC) {
        let parsed = match &value {
            Value::String(s) => parse_date_utc(s),
            Value::Number(n) => n
                .as_i64()
                .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0)),
            _ => None,
        };
        return parsed.ok_or_else(|| AmatError::invalid_value(row, DATE_UTC, value.to_string()));
    }

    match obj.remove(APPLE_DATE) {
        Some(value) => value
            .as_i64()
            .and_then(apple_date_to_utc)
            .ok_or_else(|| AmatError::invalid_value(row, APPLE_DATE, value.to_string())),
        None => Err(AmatError::missing_column(DATE_UTC)),
    }
}

fn field_value(value: Value) -> FieldValue {
    match value {
        Value::Null => FieldValue::Null,
        Value::Bool(b) => FieldValue::Bool(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => FieldValue::Int(i),
            None => n.as_f64().map(FieldValue::Float).unwrap_or(FieldValue::Null),
        },
        Value::String(s) => FieldValue::Text(s),
        other => FieldValue::Text(other.to_string()),
    }
}
