//! On-disk table cache
//!
//! Every cached artifact is a CSV file addressed by a [`CacheCategory`] and a
//! key. See [`CacheStore`] for the freshness and invalidation rules.

pub mod category;
pub mod codec;
pub mod store;

pub use category::CacheCategory;
pub use store::{CacheInfo, CacheStore};
