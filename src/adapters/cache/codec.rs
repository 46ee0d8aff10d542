//! CSV codec for cached tables
//!
//! A header row carries the column names, every following row one table row.
//! All cells are written as-is, so a table read back equals the table written.

use crate::domain::{CacheError, Result, Table};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Encodes a table into any writer
pub fn encode<W: Write>(writer: W, table: &Table) -> std::result::Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    if !table.columns().is_empty() {
        writer.write_record(table.columns())?;
        for row in table.rows() {
            writer.write_record(row)?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Decodes a table from any reader
pub fn decode<R: Read>(reader: R) -> std::result::Result<Table, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers = reader.headers().map_err(|e| e.to_string())?.clone();
    let mut table = Table::with_columns(headers.iter());
    for record in reader.records() {
        let record = record.map_err(|e| e.to_string())?;
        table
            .push_row(record.iter())
            .map_err(|e| e.to_string())?;
    }
    Ok(table)
}

/// Writes a table to `path`, replacing any previous content
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    let file = File::create(path).map_err(|e| CacheError::Io {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    encode(file, table).map_err(|e| CacheError::Codec {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(())
}

/// Reads the table stored at `path`
pub fn read_table(path: &Path) -> Result<Table> {
    let file = File::open(path).map_err(|e| CacheError::Io {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let table = decode(file).map_err(|reason| CacheError::Codec {
        path: path.to_path_buf(),
        reason,
    })?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        let mut table = Table::with_columns(["key", "value"]);
        table.push_row(["HKIndoorWorkout", "0"]).unwrap();
        table.push_row(["note", "a, \"quoted\"\nvalue"]).unwrap();
        table.push_row(["empty", ""]).unwrap();
        table
    }

    #[test]
    fn test_encode_decode_preserves_cells() {
        let table = sample_table();
        let mut buf = Vec::new();
        encode(&mut buf, &table).unwrap();
        let back = decode(buf.as_slice()).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn test_header_row_first() {
        let mut buf = Vec::new();
        encode(&mut buf, &sample_table()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("key,value\n"));
    }

    #[test]
    fn test_header_only_table() {
        let table = Table::with_columns(["timestamp", "value"]);
        let mut buf = Vec::new();
        encode(&mut buf, &table).unwrap();
        let back = decode(buf.as_slice()).unwrap();
        assert_eq!(back.columns(), table.columns());
        assert!(back.is_empty());
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = decode("a,b\n1,2\n3\n".as_bytes()).unwrap_err();
        assert!(!err.is_empty());
    }
}
