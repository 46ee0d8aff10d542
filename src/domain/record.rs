//! Health record domain model
//!
//! A [`HealthRecord`] is one `Record` element of the export document, reduced to
//! its type, timestamp and value. Records are grouped by type into
//! [`RecordSet`]s, preserving document order inside each group.

use super::errors::VitalportError;
use super::result::Result;
use super::table::Table;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Timestamp format used by the export document and the record cache
pub const RECORD_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// A single health sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRecord {
    /// Record type identifier, e.g. `HKQuantityTypeIdentifierHeartRate`
    pub record_type: String,

    /// When the record was created
    pub timestamp: DateTime<FixedOffset>,

    /// Raw value as exported; empty for records that carry none
    pub value: String,
}

impl HealthRecord {
    /// Creates a new record
    pub fn new(
        record_type: impl Into<String>,
        timestamp: DateTime<FixedOffset>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            record_type: record_type.into(),
            timestamp,
            value: value.into(),
        }
    }

    /// Short display name of the record type
    ///
    /// Strips everything up to `Identifier` (or up to `Type` when there is no
    /// identifier marker), so `HKQuantityTypeIdentifierHeartRate` becomes
    /// `HeartRate`.
    pub fn short_type(&self) -> &str {
        short_type_name(&self.record_type)
    }
}

/// Shortens a record type identifier for display
pub fn short_type_name(record_type: &str) -> &str {
    if let Some((_, rest)) = record_type.split_once("Identifier") {
        rest
    } else if let Some((_, rest)) = record_type.split_once("Type") {
        rest
    } else {
        record_type
    }
}

/// Parses a timestamp in the export's `2024-01-31 08:15:00 +0100` format
pub fn parse_record_timestamp(raw: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_str(raw.trim(), RECORD_TIMESTAMP_FORMAT).map_err(|e| {
        VitalportError::Validation(format!("Invalid record timestamp '{raw}': {e}"))
    })
}

/// Formats a timestamp in the export's format
pub fn format_record_timestamp(timestamp: &DateTime<FixedOffset>) -> String {
    timestamp.format(RECORD_TIMESTAMP_FORMAT).to_string()
}

/// Records grouped by type, each group in document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    groups: BTreeMap<String, Vec<HealthRecord>>,
}

impl RecordSet {
    /// Creates an empty record set
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record to its type group
    pub fn push(&mut self, record: HealthRecord) {
        self.groups
            .entry(record.record_type.clone())
            .or_default()
            .push(record);
    }

    /// Record types present, sorted
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Records of one type
    pub fn get(&self, record_type: &str) -> Option<&[HealthRecord]> {
        self.groups.get(record_type).map(Vec::as_slice)
    }

    /// Iterates over `(type, records)` groups
    pub fn groups(&self) -> impl Iterator<Item = (&str, &[HealthRecord])> {
        self.groups
            .iter()
            .map(|(t, records)| (t.as_str(), records.as_slice()))
    }

    /// Number of distinct types
    pub fn type_count(&self) -> usize {
        self.groups.len()
    }

    /// Total number of records across all groups
    pub fn total_records(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// True when no records were collected
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Table of one record type: `timestamp,value`
pub fn records_to_table(records: &[HealthRecord]) -> Result<Table> {
    let mut table = Table::with_columns(["timestamp", "value"]);
    for record in records {
        table.push_row([format_record_timestamp(&record.timestamp), record.value.clone()])?;
    }
    Ok(table)
}

/// Rebuilds records of one type from a `timestamp,value` table
pub fn records_from_table(record_type: &str, table: &Table) -> Result<Vec<HealthRecord>> {
    let ts_idx = table.require_column("timestamp")?;
    let value_idx = table.require_column("value")?;

    table
        .rows()
        .iter()
        .map(|row| {
            Ok(HealthRecord::new(
                record_type,
                parse_record_timestamp(&row[ts_idx])?,
                row[value_idx].clone(),
            ))
        })
        .collect()
}

/// Table of every record in a set: `type,timestamp,value`
pub fn record_set_to_table(set: &RecordSet) -> Result<Table> {
    let mut table = Table::with_columns(["type", "timestamp", "value"]);
    for (record_type, records) in set.groups() {
        for record in records {
            table.push_row([
                record_type.to_string(),
                format_record_timestamp(&record.timestamp),
                record.value.clone(),
            ])?;
        }
    }
    Ok(table)
}
