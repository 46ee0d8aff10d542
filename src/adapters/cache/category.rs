//! Cache categories and their folders
//!
//! ```text
//! <cache>/
//! ├── cache.json
//! ├── workouts.csv, routes_meta.csv, metadata.csv, ...   (Root)
//! ├── records/<type>.csv                                 (Records)
//! ├── routes/<workout uuid>.csv                          (Routes)
//! ├── workout_statistics/<workout uuid>.csv              (WorkoutStatistics)
//! ├── workout_metadata_entries/<workout uuid>.csv        (WorkoutMetadataEntries)
//! └── ecg/<name>.csv                                     (Ecg)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A group of cached artifacts sharing one folder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheCategory {
    /// Top-level tables directly inside the cache folder
    Root,
    /// One table per health record type
    Records,
    /// One table per routed workout
    Routes,
    /// One statistics table per workout
    WorkoutStatistics,
    /// One metadata table per workout
    WorkoutMetadataEntries,
    /// One sample table per ECG recording
    Ecg,
}

impl CacheCategory {
    /// Every category, root first
    pub const ALL: [CacheCategory; 6] = [
        CacheCategory::Root,
        CacheCategory::Records,
        CacheCategory::Routes,
        CacheCategory::WorkoutStatistics,
        CacheCategory::WorkoutMetadataEntries,
        CacheCategory::Ecg,
    ];

    /// Categories derived from workouts, cleared together on a forced ingest
    pub const WORKOUT_DERIVED: [CacheCategory; 3] = [
        CacheCategory::Routes,
        CacheCategory::WorkoutStatistics,
        CacheCategory::WorkoutMetadataEntries,
    ];

    /// Sub-folder name, `None` for the cache root
    pub fn folder(&self) -> Option<&'static str> {
        match self {
            CacheCategory::Root => None,
            CacheCategory::Records => Some("records"),
            CacheCategory::Routes => Some("routes"),
            CacheCategory::WorkoutStatistics => Some("workout_statistics"),
            CacheCategory::WorkoutMetadataEntries => Some("workout_metadata_entries"),
            CacheCategory::Ecg => Some("ecg"),
        }
    }

    /// Name used in logs, errors and on the command line
    pub fn as_str(&self) -> &'static str {
        self.folder().unwrap_or("root")
    }
}

impl fmt::Display for CacheCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CacheCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| {
                let known: Vec<&str> = CacheCategory::ALL.iter().map(|c| c.as_str()).collect();
                format!("Unknown cache category '{s}', expected one of: {}", known.join(", "))
            })
    }
}
