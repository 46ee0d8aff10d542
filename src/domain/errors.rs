//! Domain error types
//!
//! This module defines the error hierarchy for Vitalport. Parsing, caching and
//! signal analysis each get their own error enum; [`VitalportError`] wraps them
//! so the `?` operator works across layers. No third-party error types leak
//! through the public API.

use std::path::PathBuf;
use thiserror::Error;

/// Main Vitalport error type
///
/// This is the primary error type used throughout the application.
#[derive(Debug, Error)]
pub enum VitalportError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Errors raised while reading the export bundle
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Errors raised by the on-disk cache
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Errors raised by ECG analysis
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl VitalportError {
    /// Returns true when the error is a cache miss, which callers answer by
    /// re-parsing the source data.
    pub fn is_cache_miss(&self) -> bool {
        matches!(self, VitalportError::Cache(CacheError::Miss { .. }))
    }
}

/// Errors raised while parsing the export bundle
///
/// The variants follow the blast radius of the failure: a malformed export
/// document aborts the whole ingestion, a malformed track point only drops
/// that point, and an unreadable route or ECG file only fails that item.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The main export document is unreadable or has an unexpected shape
    #[error("Malformed export document: {0}")]
    MalformedExport(String),

    /// A single track point lacks a required field or holds an unparseable value
    #[error("Track point {point} skipped: {reason}")]
    RouteParse {
        /// Zero-based index of the track point within the route document
        point: usize,
        /// What was wrong with it
        reason: String,
    },

    /// A route document could not be read at all
    #[error("Route document {path} unreadable: {reason}")]
    RouteDocument {
        /// Path of the route document
        path: PathBuf,
        /// Underlying reason
        reason: String,
    },

    /// An ECG file does not follow the expected layout
    #[error("ECG '{name}' has an invalid format: {reason}")]
    EcgFormat {
        /// ECG name (file stem)
        name: String,
        /// Underlying reason
        reason: String,
    },
}

/// Errors raised by the on-disk cache
#[derive(Debug, Error)]
pub enum CacheError {
    /// The requested artifact has not been cached yet
    #[error("No cached '{key}' in category '{category}'")]
    Miss {
        /// Cache category name
        category: String,
        /// Artifact key
        key: String,
    },

    /// Filesystem failure inside the cache tree
    #[error("Cache I/O failure at {path}: {reason}")]
    Io {
        /// Affected path
        path: PathBuf,
        /// Underlying reason
        reason: String,
    },

    /// A cached table could not be encoded or decoded
    #[error("Cache codec failure at {path}: {reason}")]
    Codec {
        /// Affected path
        path: PathBuf,
        /// Underlying reason
        reason: String,
    },
}

/// Errors raised by ECG analysis
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Too few beats were detected to derive the requested metric
    #[error("Insufficient beats: found {found}, need at least {required}")]
    InsufficientBeats {
        /// Number of beats detected
        found: usize,
        /// Number of beats the metric needs
        required: usize,
    },

    /// The signal holds no samples, so no rate can be derived
    #[error("ECG signal is empty")]
    EmptySignal,

    /// A detector parameter is out of range
    #[error("Invalid analysis parameter: {0}")]
    InvalidParameter(String),
}

/// Per-item failure recorded during a batch load
///
/// Batch operations never abort on a single bad file; they collect one of
/// these per failing item and keep going.
#[derive(Debug)]
pub struct ItemFailure {
    /// Label of the failing item (file name or workout uuid)
    pub label: String,

    /// Why it failed
    pub error: VitalportError,
}

impl ItemFailure {
    /// Creates a new item failure
    pub fn new(label: impl Into<String>, error: VitalportError) -> Self {
        Self {
            label: label.into(),
            error,
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for VitalportError {
    fn from(err: std::io::Error) -> Self {
        VitalportError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for VitalportError {
    fn from(err: serde_json::Error) -> Self {
        VitalportError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for VitalportError {
    fn from(err: toml::de::Error) -> Self {
        VitalportError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from csv errors
impl From<csv::Error> for VitalportError {
    fn from(err: csv::Error) -> Self {
        VitalportError::Serialization(format!("CSV error: {err}"))
    }
}
