//! Batch outcomes and ingestion summary
//!
//! Batch loads never abort on one bad file. Each item ends up either as a
//! success or as an [`ItemFailure`], and the caller reports
//! "N of M items failed" with the reasons.

use crate::domain::ItemFailure;
use std::fmt;
use std::time::Duration;

/// Successes and per-item failures of a batch, in input order
#[derive(Debug)]
pub struct BatchOutcome<T> {
    /// Label and value of every item that loaded
    pub successes: Vec<(String, T)>,

    /// Every item that failed
    pub failures: Vec<ItemFailure>,
}

impl<T> BatchOutcome<T> {
    /// Create a new empty outcome
    pub fn new() -> Self {
        Self {
            successes: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Record a loaded item
    pub fn push_success(&mut self, label: impl Into<String>, value: T) {
        self.successes.push((label.into(), value));
    }

    /// Record a failed item
    pub fn push_failure(&mut self, failure: ItemFailure) {
        self.failures.push(failure);
    }

    /// Number of items attempted
    pub fn total(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    /// Number of items that loaded
    pub fn succeeded(&self) -> usize {
        self.successes.len()
    }

    /// Number of items that failed
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// True when at least one item failed
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Loaded values in input order
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.successes.iter().map(|(_, value)| value)
    }

    /// Consumes the outcome, keeping only the loaded values
    pub fn into_values(self) -> Vec<T> {
        self.successes.into_iter().map(|(_, value)| value).collect()
    }

    /// Converts every loaded value, keeping labels and failures
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> BatchOutcome<U> {
        BatchOutcome {
            successes: self
                .successes
                .into_iter()
                .map(|(label, value)| (label, f(value)))
                .collect(),
            failures: self.failures,
        }
    }

    /// `"N of M items failed"`, or `None` when nothing failed
    pub fn failure_summary(&self) -> Option<String> {
        self.has_failures()
            .then(|| format!("{} of {} items failed", self.failed(), self.total()))
    }

    /// Log the outcome of a named batch
    pub fn log_summary(&self, batch: &str) {
        tracing::info!(
            batch = batch,
            total = self.total(),
            succeeded = self.succeeded(),
            failed = self.failed(),
            "Batch completed"
        );
        for failure in &self.failures {
            crate::log_item_failure!(batch, &failure.label, &failure.error);
        }
    }
}

impl<T> Default for BatchOutcome<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Failure report: the summary line followed by one line per failure
impl<T> fmt::Display for BatchOutcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.failure_summary() {
            None => write!(f, "{} items loaded", self.total()),
            Some(summary) => {
                write!(f, "{summary}")?;
                for failure in &self.failures {
                    write!(f, "\n  {}: {}", failure.label, failure.error)?;
                }
                Ok(())
            }
        }
    }
}

/// Summary of an ingestion run
#[derive(Debug, Default)]
pub struct IngestSummary {
    /// Number of `Record` elements ingested
    pub records: usize,

    /// Number of distinct record types
    pub record_types: usize,

    /// Number of workouts
    pub workouts: usize,

    /// Number of activity summaries
    pub activity_summaries: usize,

    /// Number of workouts with a route reference
    pub routes_total: usize,

    /// Number of routes written to the cache
    pub routes_cached: usize,

    /// Track points dropped across all routes
    pub skipped_points: usize,

    /// Number of ECG files found
    pub ecgs_total: usize,

    /// Number of ECGs written to the cache
    pub ecgs_cached: usize,

    /// Routes and ECGs that could not be loaded
    pub failures: Vec<ItemFailure>,

    /// Wall time of the run
    pub duration: Duration,
}

impl IngestSummary {
    /// Create a new empty summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Routes and ECGs attempted
    pub fn total_items(&self) -> usize {
        self.routes_total + self.ecgs_total
    }

    /// True when every route and ECG loaded
    pub fn is_successful(&self) -> bool {
        self.failures.is_empty()
    }

    /// `"N of M items failed"`, or `None` when nothing failed
    pub fn failure_summary(&self) -> Option<String> {
        (!self.failures.is_empty()).then(|| {
            format!(
                "{} of {} items failed",
                self.failures.len(),
                self.total_items()
            )
        })
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            records = self.records,
            record_types = self.record_types,
            workouts = self.workouts,
            activity_summaries = self.activity_summaries,
            routes_total = self.routes_total,
            routes_cached = self.routes_cached,
            skipped_points = self.skipped_points,
            ecgs_total = self.ecgs_total,
            ecgs_cached = self.ecgs_cached,
            duration_ms = self.duration.as_millis() as u64,
            "Ingestion completed"
        );

        if let Some(summary) = self.failure_summary() {
            tracing::warn!(failed = self.failures.len(), "{}", summary);
            for failure in &self.failures {
                crate::log_item_failure!("ingest", &failure.label, &failure.error);
            }
        }
    }
}
