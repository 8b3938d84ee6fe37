//! JSON Lines output writer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::Row;
use crate::error::Result;
use crate::message::MessageTable;

/// Writes a table to a JSONL file: one row object per line.
pub fn write_jsonl(table: &MessageTable, output_path: impl AsRef<Path>) -> Result<()> {
    let output_path = output_path.as_ref();
    let mut file = BufWriter::new(File::create(output_path)?);
    write_lines(table, &mut file)?;
    file.flush()?;
    tracing::debug!(path = %output_path.display(), rows = table.len(), "Wrote JSONL");
    Ok(())
}

/// Converts a table to a JSONL string. Each line ends with `\n`.
pub fn to_jsonl(table: &MessageTable) -> Result<String> {
    let mut buffer = Vec::new();
    write_lines(table, &mut buffer)?;
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn write_lines<W: Write>(table: &MessageTable, out: &mut W) -> Result<()> {
    for message in table {
        let row = Row {
            columns: table.columns(),
            message,
        };
        serde_json::to_writer(&mut *out, &row)?;
        out.write_all(b"\n")?;
    }
    Ok(())
}
