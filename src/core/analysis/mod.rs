//! ECG analysis
//!
//! - [`beats`] - slope-threshold beat detection, BPM and HRV
//! - [`segments`] - per-beat windows of a recording

pub mod beats;
pub mod segments;

pub use beats::{analysis_table, BeatDetector, BeatParams, EcgAnalysis};
pub use segments::{split_around_beats, split_between_beats};
