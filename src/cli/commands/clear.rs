//! Clear command implementation
//!
//! This module implements the `clear` command, the only way cached artifacts
//! are invalidated.

use super::{config_or_exit, exit_code_for, EXIT_CONFIG, EXIT_OK};
use crate::adapters::cache::{CacheCategory, CacheStore};
use clap::Args;
use std::io::{self, Write};

/// Arguments for the clear command
#[derive(Args, Debug)]
pub struct ClearArgs {
    /// Export bundle directory (overrides export.root)
    #[arg(long)]
    pub root: Option<String>,

    /// Category to clear (root, records, routes, workout_statistics,
    /// workout_metadata_entries, ecg); repeatable, all when omitted
    #[arg(long = "category", value_name = "CATEGORY")]
    pub categories: Vec<String>,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

impl ClearArgs {
    /// Execute the clear command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match config_or_exit(config_path, self.root.as_deref()) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        let categories = match self.selected_categories() {
            Ok(c) => c,
            Err(e) => {
                println!("❌ {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let store = CacheStore::new(config.export.cache_root());
        let names: Vec<&str> = categories.iter().map(|c| c.as_str()).collect();
        tracing::info!(cache = %store.root().display(), categories = ?names, "Clearing cache");

        if !self.yes {
            println!("Cache: {}", store.root().display());
            println!("Categories: {}", names.join(", "));
            print!("Delete cached files? [y/N]: ");
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Clear cancelled.");
                return Ok(EXIT_OK);
            }
        }

        let mut total = 0;
        for category in categories {
            match store.delete_all(category) {
                Ok(removed) => {
                    println!("  {:<28} {removed} files removed", category.as_str());
                    total += removed;
                }
                Err(e) => {
                    tracing::error!(category = %category, error = %e, "Failed to clear cache");
                    eprintln!("Failed to clear {category}: {e}");
                    return Ok(exit_code_for(&e));
                }
            }
        }

        println!();
        println!("✅ Removed {total} cached files");
        Ok(EXIT_OK)
    }

    /// Categories named on the command line, every category when none is
    fn selected_categories(&self) -> Result<Vec<CacheCategory>, String> {
        if self.categories.is_empty() {
            return Ok(CacheCategory::ALL.to_vec());
        }
        self.categories
            .iter()
            .map(|name| name.parse::<CacheCategory>())
            .collect()
    }
}
