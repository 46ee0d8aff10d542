//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::VitalportConfig;
use crate::domain::errors::VitalportError;
use crate::domain::result::Result;
use regex::{Captures, Regex};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into VitalportConfig
/// 4. Applies environment variable overrides (VITALPORT_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use vitalport::config::loader::load_config;
///
/// let config = load_config("vitalport.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<VitalportConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(VitalportError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        VitalportError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration text, applying substitution, overrides and validation
pub fn parse_config(contents: &str) -> Result<VitalportConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: VitalportConfig = toml::from_str(&contents)
        .map_err(|e| VitalportError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        VitalportError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Expands `${VAR_NAME}` placeholders from the process environment
///
/// Comment lines pass through unchanged. Every unset variable is named in a
/// single error.
fn substitute_env_vars(input: &str) -> Result<String> {
    let placeholder = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| VitalportError::Configuration(format!("Invalid placeholder pattern: {e}")))?;
    let mut unset: BTreeSet<String> = BTreeSet::new();

    let expanded: Vec<String> = input
        .lines()
        .map(|line| {
            if line.trim_start().starts_with('#') {
                return line.to_string();
            }
            placeholder
                .replace_all(line, |caps: &Captures<'_>| {
                    std::env::var(&caps[1]).unwrap_or_else(|_| {
                        unset.insert(caps[1].to_string());
                        caps[0].to_string()
                    })
                })
                .into_owned()
        })
        .collect();

    if !unset.is_empty() {
        let names: Vec<String> = unset.into_iter().collect();
        return Err(VitalportError::Configuration(format!(
            "Missing required environment variables: {}",
            names.join(", ")
        )));
    }

    let mut output = expanded.join("\n");
    output.push('\n');
    Ok(output)
}

/// Reads a numeric override, rejecting values that do not parse
fn numeric_override<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(val) => val.trim().parse().map(Some).map_err(|_| {
            VitalportError::Configuration(format!("{name} must be a number, got '{val}'"))
        }),
        Err(_) => Ok(None),
    }
}

/// Applies environment variable overrides using VITALPORT_* prefix
///
/// Environment variables follow the pattern: VITALPORT_<SECTION>_<KEY>
/// For example: VITALPORT_EXPORT_ROOT, VITALPORT_ECG_SLOPE_THRESHOLD
fn apply_env_overrides(config: &mut VitalportConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("VITALPORT_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Export overrides
    if let Ok(val) = std::env::var("VITALPORT_EXPORT_ROOT") {
        config.export.root = val;
    }
    if let Ok(val) = std::env::var("VITALPORT_EXPORT_CACHE_DIR") {
        config.export.cache_dir = Some(val);
    }

    // Ingest overrides
    if let Ok(val) = std::env::var("VITALPORT_INGEST_PARALLEL") {
        config.ingest.parallel = val.parse().unwrap_or(true);
    }
    if let Some(workers) = numeric_override("VITALPORT_INGEST_WORKERS")? {
        config.ingest.workers = workers;
    }

    // ECG overrides
    if let Some(rate) = numeric_override("VITALPORT_ECG_SAMPLE_RATE_HZ")? {
        config.ecg.sample_rate_hz = rate;
    }
    if let Some(threshold) = numeric_override("VITALPORT_ECG_SLOPE_THRESHOLD")? {
        config.ecg.slope_threshold = threshold;
    }
    if let Some(distance) = numeric_override("VITALPORT_ECG_MIN_BEAT_DISTANCE")? {
        config.ecg.min_beat_distance = distance;
    }
    if let Some(stride) = numeric_override("VITALPORT_ECG_SLOPE_STRIDE")? {
        config.ecg.slope_stride = stride;
    }
    if let Some(beats) = numeric_override("VITALPORT_ECG_PAIRWISE_WARN_BEATS")? {
        config.ecg.pairwise_warn_beats = beats;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("VITALPORT_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("VITALPORT_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("VITALPORT_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
