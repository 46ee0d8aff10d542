// Vitalport - Health Export Ingestion and ECG Analysis
// Copyright (c) 2025 Vitalport Contributors
// Licensed under the MIT License

//! # Vitalport - Health Export Ingestion and ECG Analysis
//!
//! Vitalport reads the export bundle a wearable health platform produces
//! (`Export.xml`, GPX workout routes and ECG recordings), turns it into typed
//! entities and flat tables kept in an on-disk cache, and estimates heart rate
//! and heart-rate variability from the ECG recordings.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Parsing** the export document into records, workouts and summaries
//! - **Extracting** workout routes from GPX documents on a worker pool
//! - **Caching** every artifact as a CSV table for fast reloads
//! - **Analyzing** ECG recordings with a slope-threshold beat detector
//! - **Filtering** routes by bounding box, country and time window
//!
//! ## Architecture
//!
//! Vitalport follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Ingestion, ECG analysis and route filters
//! - [`adapters`] - Export bundle parsers and the on-disk cache
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vitalport::config::VitalportConfig;
//! use vitalport::core::ingest::DataLoader;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = VitalportConfig::for_export("/data/apple_health_export");
//!     let loader = DataLoader::from_config(&config);
//!
//!     let summary = loader.ingest(false)?;
//!     println!("Ingested {} records", summary.records);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! ### Cache-first loading
//!
//! Every load answers from the cache when it can and falls back to the source
//! files on a miss, writing back what it parsed:
//!
//! ```rust,no_run
//! use vitalport::config::VitalportConfig;
//! use vitalport::core::ingest::DataLoader;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = DataLoader::from_config(&VitalportConfig::for_export("/data/export"));
//! let heart_rate = loader.load_records("HKQuantityTypeIdentifierHeartRate")?;
//! println!("{} heart rate samples", heart_rate.len());
//! # Ok(())
//! # }
//! ```
//!
//! ### ECG Analysis
//!
//! ```rust,no_run
//! use vitalport::core::analysis::BeatDetector;
//! use vitalport::domain::ecg::DEFAULT_SAMPLE_RATE_HZ;
//! # use vitalport::domain::Ecg;
//!
//! # fn example(ecg: &Ecg) {
//! let analysis = BeatDetector::default().analyze(ecg, DEFAULT_SAMPLE_RATE_HZ);
//! match analysis.bpm {
//!     Some(bpm) => println!("{}: {bpm:.1} bpm", analysis.name),
//!     None => println!("{}: heart rate unavailable", analysis.name),
//! }
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Vitalport uses the [`domain::VitalportError`] type for all errors:
//!
//! ```rust,no_run
//! use vitalport::domain::VitalportError;
//!
//! fn example() -> Result<(), VitalportError> {
//!     let config = vitalport::config::load_config("vitalport.toml")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! Vitalport uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!(records = 48_211, "Export parsed");
//! warn!(point = 17, "Skipping malformed track point");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
