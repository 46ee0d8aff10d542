//! Core logic for Vitalport.
//!
//! # Modules
//!
//! - [`ingest`] - Export ingestion, cache-first loading and the route worker pool
//! - [`analysis`] - ECG beat detection, heart rate, HRV and heartbeat segmentation
//! - [`filter`] - Route filters and filter pipelines
//!
//! # Workflow
//!
//! 1. **Parse**: stream `Export.xml` into records, workout shells and summaries
//! 2. **Cache**: write every artifact as a CSV table under the cache root
//! 3. **Fan out**: parse referenced route documents on the worker pool
//! 4. **Analyze**: detect beats in each ECG and derive BPM and HRV
//!
//! # Example
//!
//! ```rust,no_run
//! use vitalport::config::load_config;
//! use vitalport::core::ingest::DataLoader;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("vitalport.toml")?;
//! let loader = DataLoader::from_config(&config);
//!
//! let summary = loader.ingest(false)?;
//! println!("Records: {}", summary.records);
//! println!("Routes cached: {}", summary.routes_cached);
//! if let Some(failed) = summary.failure_summary() {
//!     println!("{failed}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod filter;
pub mod ingest;
