//! Ingest command implementation
//!
//! This module implements the `ingest` command, which parses an export bundle
//! and writes every artifact into the cache.

use super::{config_or_exit, exit_code_for, EXIT_DATA, EXIT_OK, EXIT_PARTIAL};
use crate::core::ingest::{DataCategory, DataLoader};
use clap::Args;

/// Arguments for the ingest command
#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Export bundle directory (overrides export.root)
    #[arg(long)]
    pub root: Option<String>,

    /// Clear the whole cache before ingesting
    #[arg(short, long)]
    pub force: bool,

    /// Parse route documents one after the other
    #[arg(long, conflicts_with = "workers")]
    pub sequential: bool,

    /// Route worker pool size (0 = every CPU)
    #[arg(long)]
    pub workers: Option<usize>,
}

impl IngestArgs {
    /// Execute the ingest command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting ingest command");

        let mut config = match config_or_exit(config_path, self.root.as_deref()) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        if self.sequential {
            tracing::info!("Sequential route parsing requested from CLI");
            config.ingest.parallel = false;
        }
        if let Some(workers) = self.workers {
            tracing::info!(workers, "Overriding worker count from CLI");
            config.ingest.parallel = true;
            config.ingest.workers = workers;
        }

        let loader = DataLoader::from_config(&config);
        if !loader.supports(DataCategory::Health) {
            println!(
                "❌ No export document found at {}",
                loader.layout().export_file().display()
            );
            return Ok(EXIT_DATA);
        }

        println!("🚀 Ingesting {}", config.export.root);
        println!();

        let summary = match loader.ingest(self.force) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Ingestion failed");
                eprintln!("Ingestion failed: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        println!("📊 Ingest Summary:");
        println!("  Records: {}", summary.records);
        println!("  Record Types: {}", summary.record_types);
        println!("  Workouts: {}", summary.workouts);
        println!("  Activity Summaries: {}", summary.activity_summaries);
        println!(
            "  Routes: {} of {} cached",
            summary.routes_cached, summary.routes_total
        );
        println!("  Skipped Track Points: {}", summary.skipped_points);
        println!(
            "  ECGs: {} of {} cached",
            summary.ecgs_cached, summary.ecgs_total
        );
        println!("  Cache: {}", loader.store().root().display());
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        println!();

        match summary.failure_summary() {
            None => {
                println!("✅ Ingestion completed successfully!");
                Ok(EXIT_OK)
            }
            Some(failed) => {
                println!("⚠️  {failed}:");
                for (i, failure) in summary.failures.iter().enumerate() {
                    if i < 10 {
                        println!("    - {}: {}", failure.label, failure.error);
                    }
                }
                if summary.failures.len() > 10 {
                    println!("    ... and {} more failures", summary.failures.len() - 10);
                }
                Ok(EXIT_PARTIAL)
            }
        }
    }
}
