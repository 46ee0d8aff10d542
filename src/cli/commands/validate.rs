//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Vitalport configuration file.

use super::{EXIT_CONFIG, EXIT_OK};
use crate::config::load_config;
use crate::core::ingest::{DataCategory, DataLoader};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading validates every section
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(EXIT_CONFIG);
            }
        };

        let loader = DataLoader::from_config(&config);

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Export Root: {}", config.export.root);
        println!("  Cache: {}", config.export.cache_root().display());
        println!(
            "  Export Document: {}",
            if loader.supports(DataCategory::Health) {
                "found"
            } else {
                "missing"
            }
        );
        println!(
            "  Route Parsing: {}",
            match (config.ingest.parallel, config.ingest.workers) {
                (false, _) => "sequential".to_string(),
                (true, 0) => "parallel (all CPUs)".to_string(),
                (true, n) => format!("parallel ({n} workers)"),
            }
        );
        println!("  ECG Sample Rate: {} Hz", config.ecg.sample_rate_hz);
        println!(
            "  Beat Detection: threshold {}, distance {}, stride {}",
            config.ecg.slope_threshold, config.ecg.min_beat_distance, config.ecg.slope_stride
        );
        println!(
            "  File Logging: {}",
            if config.logging.local_enabled {
                format!(
                    "{} ({})",
                    config.logging.local_path, config.logging.local_rotation
                )
            } else {
                "disabled".to_string()
            }
        );
        println!();
        Ok(EXIT_OK)
    }
}
