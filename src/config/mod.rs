//! Configuration management for Vitalport.
//!
//! This module provides TOML-based configuration loading, parsing, and
//! validation.
//!
//! # Overview
//!
//! Vitalport uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `VITALPORT_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use vitalport::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("vitalport.toml")?;
//!
//! println!("Export root: {}", config.export.root);
//! println!("Cache: {}", config.export.cache_root().display());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Application settings (log level)
//! - [`ExportConfig`] - Export bundle and cache location
//! - [`IngestConfig`] - Route worker pool
//! - [`EcgConfig`] - Beat detector parameters and sample rate
//! - [`LoggingConfig`] - Logging configuration
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [export]
//! root = "${HOME}/apple_health_export"
//!
//! [ingest]
//! parallel = true
//! workers = 0
//!
//! [ecg]
//! slope_threshold = 50.0
//! min_beat_distance = 180
//! slope_stride = 3
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, EcgConfig, ExportConfig, IngestConfig, LoggingConfig, VitalportConfig,
};
