//! ECG command implementation
//!
//! This module implements the `ecg` command: beat detection, heart rate and
//! HRV for every recording of the bundle, written to `ecg_analysis.csv` in the
//! cache root.

use super::{config_or_exit, exit_code_for, EXIT_CONFIG, EXIT_DATA, EXIT_OK, EXIT_PARTIAL};
use crate::adapters::cache::CacheCategory;
use crate::core::analysis::beats::UNAVAILABLE;
use crate::core::analysis::{analysis_table, BeatDetector, EcgAnalysis};
use crate::core::ingest::{BatchOutcome, DataCategory, DataLoader};
use crate::domain::Ecg;
use clap::Args;

/// Cache key of the analysis table
pub const ECG_ANALYSIS_TABLE: &str = "ecg_analysis";

/// Arguments for the ecg command
#[derive(Args, Debug)]
pub struct EcgArgs {
    /// Export bundle directory (overrides export.root)
    #[arg(long)]
    pub root: Option<String>,

    /// Analyze a single recording (file name or stem)
    #[arg(long)]
    pub name: Option<String>,

    /// Slope threshold (overrides ecg.slope_threshold)
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Minimum beat distance in samples (overrides ecg.min_beat_distance)
    #[arg(long)]
    pub distance: Option<usize>,

    /// Slope stride in samples (overrides ecg.slope_stride)
    #[arg(long)]
    pub stride: Option<usize>,

    /// Sample rate in Hz (overrides ecg.sample_rate_hz)
    #[arg(long)]
    pub sample_rate: Option<f64>,
}

impl EcgArgs {
    /// Execute the ecg command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting ECG analysis");

        let mut config = match config_or_exit(config_path, self.root.as_deref()) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        if let Some(threshold) = self.threshold {
            config.ecg.slope_threshold = threshold;
        }
        if let Some(distance) = self.distance {
            config.ecg.min_beat_distance = distance;
        }
        if let Some(stride) = self.stride {
            config.ecg.slope_stride = stride;
        }
        if let Some(rate) = self.sample_rate {
            config.ecg.sample_rate_hz = rate;
        }

        let detector = match config
            .validate()
            .map_err(crate::domain::VitalportError::Configuration)
            .and_then(|_| BeatDetector::from_config(&config.ecg))
        {
            Ok(d) => d,
            Err(e) => {
                println!("❌ Invalid ECG parameters");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let loader = DataLoader::from_config(&config);
        let outcome: BatchOutcome<Ecg> = match &self.name {
            Some(name) => {
                let mut outcome = BatchOutcome::new();
                match loader.load_ecg(name) {
                    Ok(ecg) => outcome.push_success(name.clone(), ecg),
                    Err(e) => {
                        tracing::error!(ecg = %name, error = %e, "Failed to load ECG");
                        eprintln!("Failed to load ECG '{name}': {e}");
                        return Ok(exit_code_for(&e));
                    }
                }
                outcome
            }
            None => {
                if !loader.supports(DataCategory::Ecg) {
                    println!(
                        "No ECG recordings found in {}",
                        loader.layout().ecg_dir().display()
                    );
                    return Ok(EXIT_OK);
                }
                match loader.load_ecgs() {
                    Ok(o) => o,
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to load ECGs");
                        eprintln!("Failed to load ECGs: {e}");
                        return Ok(exit_code_for(&e));
                    }
                }
            }
        };

        let rate = config.ecg.sample_rate_hz;
        let analyses: Vec<EcgAnalysis> = outcome
            .values()
            .map(|ecg| detector.analyze(ecg, rate))
            .collect();

        let table = match analysis_table(&analyses) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("Failed to build analysis table: {e}");
                return Ok(EXIT_DATA);
            }
        };
        let path = match loader
            .store()
            .write(CacheCategory::Root, ECG_ANALYSIS_TABLE, &table)
        {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(error = %e, "Failed to write ECG analysis");
                eprintln!("Failed to write ECG analysis: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        println!("🫀 ECG Analysis ({} recordings)", analyses.len());
        println!();
        println!(
            "{:<32} {:>10} {:>7} {:>8} {:>8} {:>12}",
            "Name", "Duration", "Beats", "BPM", "HRV", "HRV (pairs)"
        );
        println!("{}", "-".repeat(82));
        for a in &analyses {
            println!(
                "{:<32} {:>9.1}s {:>7} {:>8} {:>8} {:>12}",
                a.name,
                a.duration_secs,
                a.beats.len(),
                metric(a.bpm, 1),
                metric(a.hrv, 2),
                metric(a.hrv_pairwise, 2)
            );
        }
        println!();
        println!("Written to {}", path.display());

        if outcome.has_failures() {
            println!();
            println!("⚠️  {outcome}");
            return Ok(EXIT_PARTIAL);
        }
        Ok(EXIT_OK)
    }
}

fn metric(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{v:.precision$}"))
        .unwrap_or_else(|| UNAVAILABLE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_metric_is_dash() {
        assert_eq!(metric(None, 2), "-");
        assert_eq!(metric(Some(153.6), 1), "153.6");
    }

    #[test]
    fn test_invalid_stride_is_config_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let args = EcgArgs {
            root: Some(dir.path().display().to_string()),
            name: None,
            threshold: None,
            distance: None,
            stride: Some(0),
            sample_rate: None,
        };
        assert_eq!(args.execute("/no/such/vitalport.toml").unwrap(), EXIT_CONFIG);
    }

    #[test]
    fn test_no_recordings() {
        let dir = tempfile::TempDir::new().unwrap();
        let args = EcgArgs {
            root: Some(dir.path().display().to_string()),
            name: None,
            threshold: None,
            distance: None,
            stride: None,
            sample_rate: None,
        };
        assert_eq!(args.execute("/no/such/vitalport.toml").unwrap(), EXIT_OK);
    }
}
