//! Flat tabular artifact
//!
//! Every cached artifact is a [`Table`]: an ordered list of column names and
//! string rows. Typed entities convert to and from tables; the cache layer only
//! ever sees tables.

use super::errors::VitalportError;
use super::result::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Attribute map of an XML element, ordered by key
pub type Attributes = BTreeMap<String, String>;

/// A flat table with a stable column order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Creates an empty table with the given columns
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Builds a table from attribute maps
    ///
    /// Columns are the sorted union of all keys; a map lacking a column
    /// contributes an empty cell.
    pub fn from_attribute_maps<'a, I>(maps: I) -> Self
    where
        I: IntoIterator<Item = &'a Attributes>,
    {
        let maps: Vec<&Attributes> = maps.into_iter().collect();
        let columns: BTreeSet<&String> = maps.iter().flat_map(|m| m.keys()).collect();
        let columns: Vec<String> = columns.into_iter().cloned().collect();

        let rows = maps
            .iter()
            .map(|map| {
                columns
                    .iter()
                    .map(|column| map.get(column).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    /// Appends a row; its width must match the column count
    pub fn push_row<I, S>(&mut self, row: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let row: Vec<String> = row.into_iter().map(Into::into).collect();
        if row.len() != self.columns.len() {
            return Err(VitalportError::Validation(format!(
                "Row has {} cells but table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Column names in order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows in order
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Index of a column that must exist
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name).ok_or_else(|| {
            VitalportError::Validation(format!("Table has no column '{name}'"))
        })
    }

    /// All values of a column, or `None` if the column is absent
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }

    /// Single cell lookup
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| r[idx].as_str())
    }

    /// Rows as attribute maps, skipping empty cells
    pub fn to_attribute_maps(&self) -> Vec<Attributes> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .filter(|(_, value)| !value.is_empty())
                    .map(|(column, value)| (column.clone(), value.clone()))
                    .collect()
            })
            .collect()
    }
}
