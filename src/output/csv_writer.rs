//! CSV output writer.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::chart::TimeSeries;
use crate::error::{AmatError, Result};
use crate::message::{FieldValue, MessageTable};

/// Writes a table to a CSV file.
///
/// # Format
/// - Delimiter: `,`
/// - Columns: the table's columns, in order
/// - Absent values: empty cells
/// - `date_utc`: RFC 3339; `date_local`: `YYYY-MM-DD HH:MM:SS`
pub fn write_csv(table: &MessageTable, output_path: impl AsRef<Path>) -> Result<()> {
    let output_path = output_path.as_ref();
    let file = File::create(output_path)?;
    write_table(table, file)?;
    tracing::debug!(path = %output_path.display(), rows = table.len(), "Wrote CSV");
    Ok(())
}

/// Converts a table to a CSV string.
///
/// Same format as [`write_csv`].
pub fn to_csv(table: &MessageTable) -> Result<String> {
    let mut buffer = Vec::new();
    write_table(table, &mut buffer)?;
    into_string(buffer)
}

/// Converts a time series to a wide CSV string.
///
/// One row per bucket: a `date` column (`YYYY-MM-DD`, the bucket's first
/// day) followed by one column per category.
///
/// ```
/// use amat::chart::{Frequency, count_over_time};
/// use amat::output::series_to_csv;
/// use amat::{IdentityMap, RawRecord, pipeline::load};
/// use chrono::{TimeZone, Utc};
///
/// # fn main() -> amat::Result<()> {
/// let records = vec![
///     RawRecord::new("1", Utc.with_ymd_and_hms(2019, 1, 5, 0, 0, 0).unwrap()),
///     RawRecord::new("2", Utc.with_ymd_and_hms(2019, 2, 5, 0, 0, 0).unwrap()),
/// ];
/// let table = load(&records, Some(&IdentityMap::from_yaml_str("1: Mom\n2: Dad")?), "UTC")?;
/// let ts = count_over_time(&table, Frequency::MONTHLY, "contact")?;
///
/// assert_eq!(series_to_csv(&ts)?, "date,Dad,Mom\n2019-01-01,0,1\n2019-02-01,1,0\n");
/// # Ok(())
/// # }
/// ```
pub fn series_to_csv(series: &TimeSeries) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["date"];
    header.extend(series.labels());
    writer.write_record(&header)?;

    for (i, bucket) in series.buckets.iter().enumerate() {
        let mut record = vec![bucket.format("%Y-%m-%d").to_string()];
        record.extend(
            series
                .series
                .iter()
                .map(|s| s.values.get(i).copied().unwrap_or(0).to_string()),
        );
        writer.write_record(&record)?;
    }

    let buffer = writer
        .into_inner()
        .map_err(|e| AmatError::Io(e.into_error()))?;
    into_string(buffer)
}

fn write_table<W: Write>(table: &MessageTable, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(table.columns())?;

    for message in table {
        let record = table
            .columns()
            .iter()
            .map(|column| message.field(column).unwrap_or(FieldValue::Null).to_string());
        writer.write_record(record)?;
    }

    writer.flush()?;
    Ok(())
}

fn into_string(buffer: Vec<u8>) -> Result<String> {
    String::from_utf8(buffer).map_err(|e| AmatError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::IdentityMap;
    use crate::message::RawRecord;
    use crate::pipeline::load;
    use chrono::{TimeZone, Utc};
    use tempfile::NamedTempFile;

    fn make_table() -> MessageTable {
        let ids = IdentityMap::from_yaml_str("7: Mom\n").unwrap();
        let t = Utc.with_ymd_and_hms(2019, 1, 1, 8, 0, 0).unwrap();
        load(
            &[
                RawRecord::new("7", t)
                    .with_guid("g1")
                    .with_text("hello, \"world\"")
                    .from_me(true),
                RawRecord::new("8", t).with_guid("g2"),
            ],
            Some(&ids),
            "Etc/GMT+8",
        )
        .unwrap()
    }

    #[test]
    fn test_to_csv_header_and_rows() {
        let csv = to_csv(&make_table()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "chat_id,guid,text,is_from_me,date_utc,date_local,timestamp,weekday,hour,length,ioicon,contact"
        );
        assert_eq!(
            lines.next().unwrap(),
            "7,g1,\"hello, \"\"world\"\"\",true,2019-01-01T08:00:00+00:00,2019-01-01 00:00:00,2019.01.01 12:00:00 AM,1,0,14,💬,Mom"
        );
        assert_eq!(
            lines.next().unwrap(),
            "8,g2,,false,2019-01-01T08:00:00+00:00,2019-01-01 00:00:00,2019.01.01 12:00:00 AM,1,0,0,📢,other"
        );
    }

    #[test]
    fn test_write_csv_file() {
        let temp_file = NamedTempFile::new().unwrap();
        write_csv(&make_table(), temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert_eq!(content, to_csv(&make_table()).unwrap());
    }

    #[test]
    fn test_empty_table_writes_header() {
        let csv = to_csv(&make_table().head(0)).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn test_written_csv_reads_back() {
        let temp_file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write_csv(&make_table(), temp_file.path()).unwrap();

        let records = crate::store::read_records(temp_file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text.as_deref(), Some("hello, \"world\""));
        assert!(records[0].is_from_me);
        assert!(records[1].text.is_none());
        assert_eq!(records[0].date_utc, make_table().messages()[0].date_utc);
    }
}
