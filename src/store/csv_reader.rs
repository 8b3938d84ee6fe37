//! CSV record store reader.

use std::collections::BTreeMap;

use crate::error::{AmatError, Result};
use crate::message::{FieldValue, RawRecord};

use super::RecordSource;
use super::columns::{
    APPLE_DATE, CHAT_ID, DATE_UTC, GUID, IS_FROM_ME, KNOWN, TEXT, apple_date_to_utc, parse_bool,
    parse_date_utc,
};

/// Reads a CSV record store with a header row.
///
/// Empty `text` cells are read as an absent body. Extra columns are typed
/// the way the JSON readers type them: integers, floats and `true`/`false`
/// become numbers and booleans, empty cells `Null`, anything else text.
#[derive(Debug, Clone)]
pub struct CsvSource {
    delimiter: u8,
}

impl CsvSource {
    /// Creates a reader for comma-delimited files.
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    /// Uses a different field delimiter (e.g. `b';'` or `b'\t'`).
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl Default for CsvSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Column positions resolved from the header row.
struct Layout {
    chat_id: usize,
    guid: Option<usize>,
    text: Option<usize>,
    is_from_me: Option<usize>,
    date: DateColumn,
    extra: Vec<(usize, String)>,
    width: usize,
}

enum DateColumn {
    Utc(usize),
    Apple(usize),
}

impl Layout {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);

        let chat_id = find(CHAT_ID).ok_or_else(|| AmatError::missing_column(CHAT_ID))?;
        let date = match (find(DATE_UTC), find(APPLE_DATE)) {
            (Some(i), _) => DateColumn::Utc(i),
            (None, Some(i)) => DateColumn::Apple(i),
            (None, None) => return Err(AmatError::missing_column(DATE_UTC)),
        };

        let extra = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (i, h.trim().to_string()))
            .filter(|(_, h)| !h.is_empty() && !KNOWN.contains(&h.as_str()))
            .collect();

        Ok(Self {
            chat_id,
            guid: find(GUID),
            text: find(TEXT),
            is_from_me: find(IS_FROM_ME),
            date,
            extra,
            width: headers.len(),
        })
    }

    fn record(&self, row: usize, cells: &csv::StringRecord) -> Result<RawRecord> {
        let cell = |i: usize| cells.get(i).unwrap_or("");
        if cells.len() != self.width {
            tracing::warn!(
                row,
                expected = self.width,
                found = cells.len(),
                "Ragged row; missing cells read as empty"
            );
        }

        let date_utc = match self.date {
            DateColumn::Utc(i) => parse_date_utc(cell(i))
                .ok_or_else(|| AmatError::invalid_value(row, DATE_UTC, cell(i)))?,
            DateColumn::Apple(i) => cell(i)
                .trim()
                .parse::<i64>()
                .ok()
                .and_then(apple_date_to_utc)
                .ok_or_else(|| AmatError::invalid_value(row, APPLE_DATE, cell(i)))?,
        };

        let is_from_me = match self.is_from_me {
            Some(i) => parse_bool(cell(i))
                .ok_or_else(|| AmatError::invalid_value(row, IS_FROM_ME, cell(i)))?,
            None => false,
        };

        let text = self
            .text
            .map(cell)
            .filter(|t| !t.is_empty())
            .map(String::from);

        let extra: BTreeMap<String, FieldValue> = self
            .extra
            .iter()
            .map(|(i, name)| (name.clone(), typed_cell(cell(*i))))
            .collect();

        Ok(RawRecord {
            chat_id: cell(self.chat_id).trim().to_string(),
            guid: self.guid.map(cell).unwrap_or("").to_string(),
            text,
            is_from_me,
            date_utc,
            extra,
        })
    }
}

/// Types an extra cell so CSV and JSON stores agree on its value.
fn typed_cell(raw: &str) -> FieldValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        FieldValue::Null
    } else if let Ok(n) = trimmed.parse::<i64>() {
        FieldValue::Int(n)
    } else if let Some(x) = trimmed.parse::<f64>().ok().filter(|x| x.is_finite()) {
        FieldValue::Float(x)
    } else if trimmed.eq_ignore_ascii_case("true") {
        FieldValue::Bool(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        FieldValue::Bool(false)
    } else {
        FieldValue::from(raw)
    }
}

impl RecordSource for CsvSource {
    fn name(&self) -> &'static str {
        "CSV"
    }

    fn read_str(&self, content: &str) -> Result<Vec<RawRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| AmatError::load(e, None))?
            .clone();
        let layout = Layout::from_headers(&headers)?;

        let mut records = Vec::new();
        for (row, result) in reader.records().enumerate() {
            let cells = result.map_err(|e| AmatError::load(e, None))?;
            records.push(layout.record(row, &cells)?);
        }

        Ok(records)
    }
}
