//! ECG domain model

use super::errors::VitalportError;
use super::result::Result;
use super::table::{Attributes, Table};
use serde::{Deserialize, Serialize};

/// Sample rate of exported ECG recordings
pub const DEFAULT_SAMPLE_RATE_HZ: f64 = 512.0;

/// Column of a cached sample table
pub const SAMPLE_COLUMN: &str = "sample";

/// A single-lead ECG recording
///
/// The sample index doubles as the time axis; the sample rate is a property of
/// the device and is not stored with the recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ecg {
    /// Recording name (source file stem)
    pub name: String,

    /// Voltage samples in device units
    pub samples: Vec<f64>,

    /// Header key/value pairs
    pub meta: Attributes,
}

impl Ecg {
    /// Creates a new recording
    pub fn new(name: impl Into<String>, samples: Vec<f64>, meta: Attributes) -> Self {
        Self {
            name: name.into(),
            samples,
            meta,
        }
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when the recording holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Recording length in seconds at the given sample rate
    pub fn duration_secs(&self, sample_rate_hz: f64) -> f64 {
        self.samples.len() as f64 / sample_rate_hz
    }

    /// Samples as a one-column table
    pub fn samples_table(&self) -> Result<Table> {
        let mut table = Table::with_columns([SAMPLE_COLUMN]);
        for sample in &self.samples {
            table.push_row([sample.to_string()])?;
        }
        Ok(table)
    }

    /// Rebuilds a recording from its cached sample table and metadata
    pub fn from_samples_table(
        name: impl Into<String>,
        table: &Table,
        meta: Attributes,
    ) -> Result<Self> {
        let idx = table.require_column(SAMPLE_COLUMN)?;
        let samples = table
            .rows()
            .iter()
            .map(|row| {
                row[idx].parse::<f64>().map_err(|e| {
                    VitalportError::Validation(format!("Invalid sample '{}': {e}", row[idx]))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(name, samples, meta))
    }
}
