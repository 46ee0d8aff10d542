//! Status command implementation
//!
//! This module implements the `status` command for displaying the source data
//! of an export bundle and the state of its cache.

use super::{config_or_exit, EXIT_OK};
use crate::adapters::cache::CacheCategory;
use crate::core::ingest::{DataCategory, DataLoader};
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Export bundle directory (overrides export.root)
    #[arg(long)]
    pub root: Option<String>,
}

impl StatusArgs {
    /// Execute the status command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking cache status");

        println!("📊 Cache Status");
        println!();

        let config = match config_or_exit(config_path, self.root.as_deref()) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };
        let loader = DataLoader::from_config(&config);
        let store = loader.store();

        println!("Export bundle: {}", loader.layout().root().display());
        for (label, category) in [
            ("Export.xml", DataCategory::Health),
            ("Electrocardiograms", DataCategory::Ecg),
            ("Workout routes", DataCategory::Routes),
        ] {
            let mark = if loader.supports(category) { "✅" } else { "➖" };
            println!("  {mark} {label}");
        }
        println!();

        println!("Cache: {}", store.root().display());
        match store.read_info() {
            Ok(Some(info)) => println!("  Last updated: {}", info.last_updated),
            Ok(None) => {
                println!("  Never ingested.");
                println!("  Run 'vitalport ingest' to populate the cache.");
                return Ok(EXIT_OK);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Unreadable cache info");
                println!("  Last updated: unknown ({e})");
            }
        }
        println!();

        println!("{:<28} {:>8} {:>8}", "Category", "Files", "Cached");
        println!("{}", "-".repeat(46));
        for category in CacheCategory::ALL {
            let cached = if store.exists(category) { "yes" } else { "no" };
            println!(
                "{:<28} {:>8} {:>8}",
                category.as_str(),
                store.file_count(category),
                cached
            );
        }
        println!();
        Ok(EXIT_OK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_on_empty_bundle() {
        let dir = tempfile::TempDir::new().unwrap();
        let args = StatusArgs {
            root: Some(dir.path().display().to_string()),
        };
        assert_eq!(args.execute("/no/such/vitalport.toml").unwrap(), EXIT_OK);
    }

    #[test]
    fn test_status_with_bad_config() {
        let args = StatusArgs { root: None };
        assert_eq!(args.execute("/no/such/vitalport.toml").unwrap(), 2);
    }
}
