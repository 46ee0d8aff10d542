//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output with configurable log levels
//! - JSON-formatted local file logs with daily or hourly rotation
//! - Macros for the recurring batch events of an ingestion
//!
//! # Example
//!
//! ```no_run
//! use vitalport::logging::init_logging;
//! use vitalport::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(routes = 12, "Ingestion started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log progress through a batch of items
///
/// # Example
///
/// ```no_run
/// use vitalport::log_batch_progress;
///
/// log_batch_progress!("routes", 40, 120);
/// ```
#[macro_export]
macro_rules! log_batch_progress {
    ($batch:expr, $done:expr, $total:expr) => {
        tracing::debug!(
            batch = $batch,
            done = $done,
            total = $total,
            progress_pct = (if $total == 0 {
                100.0
            } else {
                $done as f64 / $total as f64 * 100.0
            }),
            "Batch progress"
        );
    };
}

/// Log the failure of one item of a batch
///
/// # Example
///
/// ```no_run
/// use vitalport::log_item_failure;
/// use vitalport::domain::VitalportError;
///
/// let error = VitalportError::Other("unreadable".to_string());
/// log_item_failure!("routes", "route_2021-05-01.gpx", &error);
/// ```
#[macro_export]
macro_rules! log_item_failure {
    ($batch:expr, $label:expr, $error:expr) => {
        tracing::warn!(
            batch = $batch,
            item = %$label,
            error = %$error,
            "Batch item failed"
        );
    };
}
