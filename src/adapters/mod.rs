//! Adapters to the filesystem.
//!
//! - [`export`] - readers for the export bundle (XML document, GPX routes, ECG dumps)
//! - [`cache`] - the CSV table cache the readers' output is persisted to
//!
//! # Design Pattern
//!
//! Adapters isolate file formats from the rest of the crate: the core layer
//! only sees domain values and [`Table`](crate::domain::Table)s.
//!
//! ```rust,no_run
//! use vitalport::adapters::cache::{CacheCategory, CacheStore};
//! use vitalport::adapters::export::{ExportLayout, RecordParser};
//!
//! # fn example() -> vitalport::domain::Result<()> {
//! let layout = ExportLayout::new("/data/apple_health_export");
//! let document = RecordParser::parse_file(&layout.export_file())?;
//!
//! let store = CacheStore::new(layout.root().join("cache"));
//! store.write(CacheCategory::Root, "metadata", &document.metadata_table()?)?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod export;
