//! Configuration schema types
//!
//! This module defines the configuration structure for Vitalport. Only the
//! `[export]` section is required; every other section falls back to its
//! defaults.

use crate::adapters::export::ExportLayout;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Name of the cache folder inside the export bundle
pub const DEFAULT_CACHE_DIR: &str = "cache";

/// Main Vitalport configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VitalportConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Export bundle location
    pub export: ExportConfig,

    /// Ingestion settings
    #[serde(default)]
    pub ingest: IngestConfig,

    /// ECG analysis settings
    #[serde(default)]
    pub ecg: EcgConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl VitalportConfig {
    /// Default configuration for the export bundle at `root`
    pub fn for_export(root: impl Into<String>) -> Self {
        Self {
            application: ApplicationConfig::default(),
            export: ExportConfig {
                root: root.into(),
                cache_dir: None,
            },
            ingest: IngestConfig::default(),
            ecg: EcgConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.export.validate()?;
        self.ingest.validate()?;
        self.ecg.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Export bundle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory holding `Export.xml`, `electrocardiograms/` and `workout-routes/`
    pub root: String,

    /// Cache folder; defaults to `<root>/cache`
    #[serde(default)]
    pub cache_dir: Option<String>,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.root.trim().is_empty() {
            return Err("export.root cannot be empty".to_string());
        }
        Ok(())
    }

    /// Paths of the export bundle
    pub fn layout(&self) -> ExportLayout {
        ExportLayout::new(&self.root)
    }

    /// Effective cache folder
    pub fn cache_root(&self) -> PathBuf {
        match self.cache_dir.as_deref().map(str::trim) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => PathBuf::from(&self.root).join(DEFAULT_CACHE_DIR),
        }
    }
}

/// Ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Parse route documents on a worker pool
    #[serde(default = "default_true")]
    pub parallel: bool,

    /// Worker pool size; 0 uses every available CPU
    #[serde(default)]
    pub workers: usize,
}

impl IngestConfig {
    fn validate(&self) -> Result<(), String> {
        if self.workers > 512 {
            return Err("ingest.workers must be <= 512".to_string());
        }
        Ok(())
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            workers: 0,
        }
    }
}

/// ECG analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EcgConfig {
    /// Sampling rate of the recordings in Hz
    #[serde(default = "default_sample_rate_hz")]
    pub sample_rate_hz: f64,

    /// Slope magnitude a beat must exceed
    #[serde(default = "default_slope_threshold")]
    pub slope_threshold: f64,

    /// Refractory distance between beats, in samples
    #[serde(default = "default_min_beat_distance")]
    pub min_beat_distance: usize,

    /// Sample distance the slope is taken over
    #[serde(default = "default_slope_stride")]
    pub slope_stride: usize,

    /// Beat count above which pairwise HRV logs a warning
    #[serde(default = "default_pairwise_warn_beats")]
    pub pairwise_warn_beats: usize,
}

impl EcgConfig {
    fn validate(&self) -> Result<(), String> {
        if !self.sample_rate_hz.is_finite() || self.sample_rate_hz <= 0.0 {
            return Err("ecg.sample_rate_hz must be a positive number".to_string());
        }
        if !self.slope_threshold.is_finite() || self.slope_threshold < 0.0 {
            return Err("ecg.slope_threshold must be a non-negative number".to_string());
        }
        if self.slope_stride == 0 {
            return Err("ecg.slope_stride must be >= 1".to_string());
        }
        Ok(())
    }
}

impl Default for EcgConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: default_sample_rate_hz(),
            slope_threshold: default_slope_threshold(),
            min_beat_distance: default_min_beat_distance(),
            slope_stride: default_slope_stride(),
            pairwise_warn_beats: default_pairwise_warn_beats(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write JSON logs to rolling files
    #[serde(default)]
    pub local_enabled: bool,

    /// Folder of the log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Rotation (daily, hourly)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled"
                .to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_sample_rate_hz() -> f64 {
    512.0
}

fn default_slope_threshold() -> f64 {
    50.0
}

fn default_min_beat_distance() -> usize {
    180
}

fn default_slope_stride() -> usize {
    3
}

fn default_pairwise_warn_beats() -> usize {
    256
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
