//! Ingestion of an export bundle into the cache
//!
//! - [`loader`] - the [`DataLoader`] façade, cache first with parse on miss
//! - [`parallel`] - the route worker pool
//! - [`summary`] - batch outcomes and the ingestion summary

pub mod loader;
pub mod parallel;
pub mod summary;

pub use loader::{DataCategory, DataLoader};
pub use parallel::{LoadMode, ParallelLoader, RouteJob};
pub use summary::{BatchOutcome, IngestSummary};
