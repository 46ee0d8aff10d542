//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Vitalport using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Vitalport - health export ingestion and ECG analysis
#[derive(Parser, Debug)]
#[command(name = "vitalport")]
#[command(version, about, long_about = None)]
#[command(author = "Vitalport Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "vitalport.toml", env = "VITALPORT_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "VITALPORT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse an export bundle into the cache
    Ingest(commands::ingest::IngestArgs),

    /// Detect heartbeats and derive heart rate and HRV for every ECG
    Ecg(commands::ecg::EcgArgs),

    /// Show the cache and source data of an export bundle
    Status(commands::status::StatusArgs),

    /// Remove cached artifacts
    Clear(commands::clear::ClearArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

impl Cli {
    /// Runs the selected command and returns the process exit code
    pub fn execute(&self) -> anyhow::Result<i32> {
        match &self.command {
            Commands::Ingest(args) => args.execute(&self.config),
            Commands::Ecg(args) => args.execute(&self.config),
            Commands::Status(args) => args.execute(&self.config),
            Commands::Clear(args) => args.execute(&self.config),
            Commands::ValidateConfig(args) => args.execute(&self.config),
            Commands::Init(args) => args.execute(),
        }
    }
}
