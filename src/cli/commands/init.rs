//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use super::{EXIT_CONFIG, EXIT_FATAL, EXIT_OK};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "vitalport.toml")]
    pub output: String,

    /// Export bundle directory written into the file
    #[arg(long)]
    pub root: Option<String>,

    /// Include every option with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Vitalport configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG);
        }

        let root = self.root.as_deref().unwrap_or("${HOME}/apple_health_export");
        let config_content = if self.with_examples {
            Self::generate_config_with_examples(root)
        } else {
            Self::generate_minimal_config(root)
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Point export.root in {} at your unzipped export", self.output);
                println!("  2. Validate configuration: vitalport validate-config");
                println!("  3. Populate the cache: vitalport ingest");
                println!("  4. Analyze ECG recordings: vitalport ecg");
                println!();
                Ok(EXIT_OK)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(EXIT_FATAL)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config(root: &str) -> String {
        format!(
            r#"# Vitalport Configuration File

[application]
log_level = "info"

[export]
root = "{root}"

[ingest]
parallel = true
workers = 0

[ecg]
sample_rate_hz = 512.0
slope_threshold = 50.0
min_beat_distance = 180
slope_stride = 3

[logging]
local_enabled = false
local_path = "./logs"
local_rotation = "daily"
"#
        )
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples(root: &str) -> String {
        format!(
            r#"# Vitalport Configuration File
#
# This file contains all configuration options with examples and explanations.
# Values of the form ${{VAR}} are read from the environment, and every key can
# be overridden with VITALPORT_<SECTION>_<KEY>.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# ============================================================================
# Export Bundle
# ============================================================================
[export]
# Unzipped export folder holding Export.xml, electrocardiograms/ and
# workout-routes/ (required)
root = "{root}"

# Cache folder (default: <root>/cache)
# cache_dir = "/var/cache/vitalport"

# ============================================================================
# Ingestion
# ============================================================================
[ingest]
# Parse route documents on a worker pool
parallel = true

# Worker pool size (0 = every available CPU)
workers = 0

# ============================================================================
# ECG Analysis
# ============================================================================
[ecg]
# Sampling rate of the recordings in Hz
sample_rate_hz = 512.0

# Slope magnitude a beat must exceed
slope_threshold = 50.0

# Refractory distance between two beats, in samples
min_beat_distance = 180

# Distance the slope is taken over, in samples (>= 1)
slope_stride = 3

# Warn when pairwise HRV runs over more beats than this
pairwise_warn_beats = 256

# ============================================================================
# Logging Configuration
# ============================================================================
[logging]
# Enable JSON file logging
local_enabled = false

# Log folder
local_path = "./logs"

# Log rotation (daily or hourly)
local_rotation = "daily"
"#
        )
    }
}
