//! CLI command implementations
//!
//! Every command returns its process exit code:
//!
//! | Code | Meaning |
//! |---|---|
//! | 0 | success |
//! | 1 | partial success, some routes or ECGs failed |
//! | 2 | configuration error |
//! | 3 | ingestion or data error |
//! | 5 | fatal error |

pub mod clear;
pub mod ecg;
pub mod ingest;
pub mod init;
pub mod status;
pub mod validate;

use crate::config::{load_config, VitalportConfig};
use crate::domain::VitalportError;
use std::path::Path;

/// Exit code: success
pub const EXIT_OK: i32 = 0;
/// Exit code: some items failed
pub const EXIT_PARTIAL: i32 = 1;
/// Exit code: configuration error
pub const EXIT_CONFIG: i32 = 2;
/// Exit code: ingestion or data error
pub const EXIT_DATA: i32 = 3;
/// Exit code: fatal error
pub const EXIT_FATAL: i32 = 5;

/// Exit code for an error that ended a command
pub fn exit_code_for(error: &VitalportError) -> i32 {
    match error {
        VitalportError::Configuration(_) => EXIT_CONFIG,
        VitalportError::Parse(_) | VitalportError::Analysis(_) | VitalportError::Validation(_) => {
            EXIT_DATA
        }
        _ => EXIT_FATAL,
    }
}

/// Loads the configuration, or builds a default one when only `--root` is given
///
/// A `root` override always replaces `export.root` of the loaded file.
pub(crate) fn resolve_config(
    config_path: &str,
    root: Option<&str>,
) -> crate::domain::Result<VitalportConfig> {
    let mut config = match root {
        Some(root) if !Path::new(config_path).exists() => {
            tracing::debug!(config_path, "No configuration file, using defaults");
            VitalportConfig::for_export(root)
        }
        _ => load_config(config_path)?,
    };

    if let Some(root) = root {
        config.export.root = root.to_string();
    }

    config.validate().map_err(VitalportError::Configuration)?;
    Ok(config)
}

/// Loads the configuration for a command, printing why it failed
pub(crate) fn config_or_exit(
    config_path: &str,
    root: Option<&str>,
) -> std::result::Result<VitalportConfig, i32> {
    resolve_config(config_path, root).map_err(|e| {
        tracing::error!(error = %e, config_path, "Failed to load configuration");
        println!("❌ Failed to load configuration");
        println!("   Error: {e}");
        EXIT_CONFIG
    })
}
