//! Domain models and types for Vitalport.
//!
//! The domain layer holds the value objects produced by the export parsers and
//! consumed by the cache and the ECG analysis:
//!
//! - **Health records** ([`HealthRecord`], [`RecordSet`])
//! - **Workouts** ([`Workout`]) and their **routes** ([`Route`], [`RoutePoint`])
//! - **Electrocardiograms** ([`Ecg`])
//! - **Tables** ([`Table`]), the flat form every cached artifact takes
//! - **Error types** ([`VitalportError`], [`ParseError`], [`CacheError`], [`AnalysisError`])
//!
//! Parsed entities carry no reference to the file they came from; once built
//! they are independent of the parser that produced them.

pub mod ecg;
pub mod errors;
pub mod record;
pub mod result;
pub mod route;
pub mod table;
pub mod workout;

// Re-export commonly used types for convenience
pub use ecg::Ecg;
pub use errors::{AnalysisError, CacheError, ItemFailure, ParseError, VitalportError};
pub use record::{HealthRecord, RecordSet};
pub use result::Result;
pub use route::{BoundingBox, Route, RoutePoint};
pub use table::{Attributes, Table};
pub use workout::Workout;
