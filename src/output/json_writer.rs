//! JSON output writer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::Row;
use crate::error::Result;
use crate::message::MessageTable;

/// Writes a table to a JSON file as an array.
///
/// # Format
/// ```json
/// [
///   {"chat_id": "7", "guid": "g1", "text": "hello", "is_from_me": true, ...},
///   {"chat_id": "8", "guid": "g2", "text": null, "is_from_me": false, ...}
/// ]
/// ```
pub fn write_json(table: &MessageTable, output_path: impl AsRef<Path>) -> Result<()> {
    let output_path = output_path.as_ref();
    let mut file = BufWriter::new(File::create(output_path)?);
    serde_json::to_writer_pretty(&mut file, &rows(table))?;
    file.flush()?;
    tracing::debug!(path = %output_path.display(), rows = table.len(), "Wrote JSON");
    Ok(())
}

/// Converts a table to a JSON array string.
///
/// Same format as [`write_json`].
pub fn to_json(table: &MessageTable) -> Result<String> {
    Ok(serde_json::to_string_pretty(&rows(table))?)
}

fn rows(table: &MessageTable) -> Vec<Row<'_>> {
    table
        .iter()
        .map(|message| Row {
            columns: table.columns(),
            message,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::RawRecord;
    use crate::pipeline::load;
    use chrono::{TimeZone, Utc};

    fn make_table() -> MessageTable {
        let t = Utc.with_ymd_and_hms(2019, 1, 1, 8, 0, 0).unwrap();
        load(
            &[
                RawRecord::new("7", t).with_text("hello").with_extra("service", "SMS"),
                RawRecord::new("8", t),
            ],
            None,
            "UTC",
        )
        .unwrap()
    }

    #[test]
    fn test_to_json_rows() {
        let json = to_json(&make_table()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["chat_id"], "7");
        assert_eq!(rows[0]["text"], "hello");
        assert_eq!(rows[0]["hour"], 8);
        assert_eq!(rows[0]["service"], "SMS");
        assert!(rows[1]["text"].is_null());
        assert!(rows[1]["service"].is_null());
        assert!(rows[0].get("contact").is_none());
    }

    #[test]
    fn test_to_json_keeps_column_order() {
        let json = to_json(&make_table()).unwrap();
        let chat = json.find("\"chat_id\"").unwrap();
        let date = json.find("\"date_local\"").unwrap();
        let service = json.find("\"service\"").unwrap();
        assert!(chat < date && date < service);
    }

    #[test]
    fn test_write_json_reads_back() {
        let temp_file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write_json(&make_table(), temp_file.path()).unwrap();

        let records = crate::store::read_records(temp_file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].chat_id, "7");
        assert_eq!(records[0].date_utc, Utc.with_ymd_and_hms(2019, 1, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(to_json(&MessageTable::default()).unwrap(), "[]");
    }
}
