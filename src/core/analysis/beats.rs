//! Slope-threshold beat detection
//!
//! A beat is the first sample where the signal slope, taken over `stride`
//! samples, exceeds `threshold` in magnitude, provided the previous beat lies
//! more than `min_distance` samples back. The refractory distance keeps one
//! QRS complex from registering several beats.
//!
//! All metrics that need beats return [`AnalysisError::InsufficientBeats`]
//! instead of a meaningless number when too few beats were found.

use crate::config::EcgConfig;
use crate::domain::{AnalysisError, Ecg, Result, Table};

/// Beats needed for inter-beat intervals
pub const MIN_BEATS_FOR_INTERVALS: usize = 2;

/// Beats needed for HRV (two intervals to compare)
pub const MIN_BEATS_FOR_HRV: usize = 3;

/// Marker for metrics that could not be derived
pub const UNAVAILABLE: &str = "-";

/// Detector parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatParams {
    /// Slope magnitude a beat must exceed (`a`)
    pub threshold: f64,
    /// Distance to the previous beat a new beat must exceed, in samples (`d`)
    pub min_distance: usize,
    /// Sample distance the slope is taken over (`r`)
    pub stride: usize,
}

impl BeatParams {
    /// Validated parameters
    pub fn new(threshold: f64, min_distance: usize, stride: usize) -> Result<Self> {
        if stride == 0 {
            return Err(AnalysisError::InvalidParameter("slope stride must be >= 1".into()).into());
        }
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(AnalysisError::InvalidParameter(format!(
                "slope threshold must be a non-negative number, got {threshold}"
            ))
            .into());
        }
        Ok(Self {
            threshold,
            min_distance,
            stride,
        })
    }

    /// Parameters from the `[ecg]` section
    pub fn from_config(config: &EcgConfig) -> Result<Self> {
        Self::new(
            config.slope_threshold,
            config.min_beat_distance,
            config.slope_stride,
        )
    }
}

impl Default for BeatParams {
    fn default() -> Self {
        Self {
            threshold: 50.0,
            min_distance: 180,
            stride: 3,
        }
    }
}

/// `slope[i] = (y[i + stride] - y[i]) / stride` for every `i` with a partner
///
/// A signal no longer than `stride` has no slopes.
pub fn slope_series(samples: &[f64], stride: usize) -> Vec<f64> {
    if stride == 0 {
        return Vec::new();
    }
    let divisor = stride as f64;
    samples
        .iter()
        .zip(samples.iter().skip(stride))
        .map(|(a, b)| (b - a) / divisor)
        .collect()
}

/// Beats per minute, extrapolated from the recorded window
pub fn bpm(beat_count: usize, sample_count: usize, sample_rate_hz: f64) -> Result<f64> {
    if sample_count == 0 {
        return Err(AnalysisError::EmptySignal.into());
    }
    let window_secs = sample_count as f64 / sample_rate_hz;
    Ok(beat_count as f64 * (60.0 / window_secs))
}

/// Distances between consecutive beats, in samples
pub fn intervals(beats: &[usize]) -> Result<Vec<usize>> {
    require_beats(beats, MIN_BEATS_FOR_INTERVALS)?;
    Ok(beats.windows(2).map(|w| w[1] - w[0]).collect())
}

/// Mean absolute difference of successive intervals
pub fn hrv(beats: &[usize]) -> Result<f64> {
    require_beats(beats, MIN_BEATS_FOR_HRV)?;
    let intervals = intervals(beats)?;
    let diffs: Vec<f64> = intervals
        .windows(2)
        .map(|w| (w[1] as f64 - w[0] as f64).abs())
        .collect();
    Ok(mean(&diffs))
}

/// Mean absolute difference over all unordered interval pairs
///
/// Quadratic in the beat count.
pub fn hrv_pairwise(beats: &[usize]) -> Result<f64> {
    require_beats(beats, MIN_BEATS_FOR_HRV)?;
    let intervals = intervals(beats)?;

    let mut sum = 0.0;
    let mut pairs = 0usize;
    for (i, a) in intervals.iter().enumerate() {
        for b in &intervals[i + 1..] {
            sum += (*a as f64 - *b as f64).abs();
            pairs += 1;
        }
    }
    Ok(sum / pairs as f64)
}

fn require_beats(beats: &[usize], required: usize) -> Result<()> {
    if beats.len() < required {
        return Err(AnalysisError::InsufficientBeats {
            found: beats.len(),
            required,
        }
        .into());
    }
    Ok(())
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Stateless beat detector
#[derive(Debug, Clone)]
pub struct BeatDetector {
    params: BeatParams,
    pairwise_warn_beats: usize,
}

impl BeatDetector {
    /// Detector with the given parameters
    pub fn new(params: BeatParams) -> Self {
        Self {
            params,
            pairwise_warn_beats: 256,
        }
    }

    /// Detector configured by the `[ecg]` section
    pub fn from_config(config: &EcgConfig) -> Result<Self> {
        Ok(Self::new(BeatParams::from_config(config)?)
            .with_pairwise_warn_beats(config.pairwise_warn_beats))
    }

    /// Beat count above which pairwise HRV logs a warning
    pub fn with_pairwise_warn_beats(mut self, beats: usize) -> Self {
        self.pairwise_warn_beats = beats;
        self
    }

    /// Detector parameters
    pub fn params(&self) -> &BeatParams {
        &self.params
    }

    /// Slope series of a signal
    pub fn slopes(&self, samples: &[f64]) -> Vec<f64> {
        slope_series(samples, self.params.stride)
    }

    /// Sample indices of detected beats, strictly increasing
    pub fn detect(&self, samples: &[f64]) -> Vec<usize> {
        let BeatParams {
            threshold,
            min_distance,
            ..
        } = self.params;
        // Before the first beat the reference is a virtual beat `d` samples
        // ahead of the signal, so index 0 is exactly `d` away from it
        let mut last: Option<usize> = None;
        let mut beats = Vec::new();

        for (i, slope) in self.slopes(samples).iter().enumerate() {
            let clear = match last {
                Some(previous) => i - previous > min_distance,
                None => i > 0,
            };
            if slope.abs() > threshold && clear {
                beats.push(i);
                last = Some(i);
            }
        }
        beats
    }

    /// Pairwise HRV, warning when the beat count makes it expensive
    pub fn hrv_pairwise(&self, beats: &[usize]) -> Result<f64> {
        if beats.len() > self.pairwise_warn_beats {
            tracing::warn!(
                beats = beats.len(),
                limit = self.pairwise_warn_beats,
                "Pairwise HRV is quadratic in the beat count"
            );
        }
        hrv_pairwise(beats)
    }

    /// Beats and every derived metric of one recording
    pub fn analyze(&self, ecg: &Ecg, sample_rate_hz: f64) -> EcgAnalysis {
        let beats = self.detect(&ecg.samples);

        let bpm = available(&ecg.name, "bpm", bpm(beats.len(), ecg.len(), sample_rate_hz));
        let hrv = available(&ecg.name, "hrv", hrv(&beats));
        let hrv_pairwise = available(&ecg.name, "hrv_pairwise", self.hrv_pairwise(&beats));

        EcgAnalysis {
            name: ecg.name.clone(),
            samples: ecg.len(),
            duration_secs: ecg.duration_secs(sample_rate_hz),
            beats,
            bpm,
            hrv,
            hrv_pairwise,
        }
    }
}

impl Default for BeatDetector {
    fn default() -> Self {
        Self::new(BeatParams::default())
    }
}

/// Keeps a metric, or logs why it is unavailable
fn available(ecg: &str, metric: &str, value: Result<f64>) -> Option<f64> {
    match value {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::debug!(ecg = ecg, metric = metric, reason = %e, "Metric unavailable");
            None
        }
    }
}

/// Analysis of one recording; `None` marks an unavailable metric, never zero
#[derive(Debug, Clone, PartialEq)]
pub struct EcgAnalysis {
    /// Recording name
    pub name: String,
    /// Number of samples
    pub samples: usize,
    /// Recording length in seconds
    pub duration_secs: f64,
    /// Detected beat indices
    pub beats: Vec<usize>,
    /// Beats per minute
    pub bpm: Option<f64>,
    /// Successive-difference HRV in samples
    pub hrv: Option<f64>,
    /// Pairwise HRV in samples
    pub hrv_pairwise: Option<f64>,
}

/// Columns of the analysis table
pub const ANALYSIS_COLUMNS: [&str; 7] = [
    "name",
    "samples",
    "duration_sec",
    "beats",
    "bpm",
    "hrv",
    "hrv_pairwise",
];

/// One row per analysis; unavailable metrics are written as `-`
pub fn analysis_table(analyses: &[EcgAnalysis]) -> Result<Table> {
    let cell = |value: Option<f64>| {
        value
            .map(|v| format!("{v:.2}"))
            .unwrap_or_else(|| UNAVAILABLE.to_string())
    };

    let mut table = Table::with_columns(ANALYSIS_COLUMNS);
    for a in analyses {
        table.push_row([
            a.name.clone(),
            a.samples.to_string(),
            format!("{:.2}", a.duration_secs),
            a.beats.len().to_string(),
            cell(a.bpm),
            cell(a.hrv),
            cell(a.hrv_pairwise),
        ])?;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Attributes, VitalportError};
    use test_case::test_case;

    #[test]
    fn test_slope_series() {
        let slopes = slope_series(&[0.0, 3.0, 6.0, 12.0], 3);
        assert_eq!(slopes, vec![4.0]);
        assert_eq!(slope_series(&[1.0, 2.0], 1), vec![1.0]);
    }

    #[test_case(0 ; "empty")]
    #[test_case(2 ; "shorter than stride")]
    #[test_case(3 ; "equal to stride")]
    fn test_short_signal_has_no_beats(len: usize) {
        let samples = vec![1000.0; len];
        assert!(BeatDetector::default().detect(&samples).is_empty());
    }

    #[test]
    fn test_sentinel_distance_is_exclusive() {
        let detector = BeatDetector::default();
        // index 0 sits exactly `d` away from the sentinel
        assert!(detector.detect(&[0.0, 0.0, 0.0, 300.0]).is_empty());
        assert_eq!(detector.detect(&[0.0, 0.0, 0.0, 0.0, 300.0]), vec![1]);
    }

    #[test]
    fn test_slope_equal_to_threshold_rejected() {
        let detector = BeatDetector::new(BeatParams::new(50.0, 180, 1).unwrap());
        assert!(detector.detect(&[0.0, 0.0, 50.0]).is_empty());
        assert_eq!(detector.detect(&[0.0, 0.0, 50.5]), vec![1]);
    }

    #[test]
    fn test_distance_equal_to_refractory_rejected() {
        let detector = BeatDetector::new(BeatParams::new(50.0, 5, 1).unwrap());

        let samples = [0.0, 0.0, 100.0, 100.0, 100.0, 100.0, 100.0, 200.0, 200.0, 200.0];
        assert_eq!(detector.detect(&samples), vec![1]);

        let samples = [0.0, 0.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 200.0, 200.0];
        assert_eq!(detector.detect(&samples), vec![1, 7]);
    }

    #[test_case(usize::MAX ; "max")]
    #[test_case(1 << 63 ; "above i64 range")]
    fn test_huge_refractory_keeps_single_beat(min_distance: usize) {
        let detector = BeatDetector::new(BeatParams::new(50.0, min_distance, 1).unwrap());
        let samples: Vec<f64> = (0..20)
            .map(|i| if i % 2 == 0 { 0.0 } else { 300.0 })
            .collect();
        assert_eq!(detector.detect(&samples), vec![1]);
    }

    #[test]
    fn test_falling_edges_count_too() {
        let detector = BeatDetector::new(BeatParams::new(50.0, 5, 1).unwrap());
        let samples = [300.0, 300.0, 0.0, 0.0];
        assert_eq!(detector.detect(&samples), vec![1]);
    }

    #[test]
    fn test_intervals_and_hrv() {
        let beats = [0, 200, 410, 600];
        assert_eq!(intervals(&beats).unwrap(), vec![200, 210, 190]);
        // |210-200| + |190-210| = 30 over 2
        assert_eq!(hrv(&beats).unwrap(), 15.0);
        // pairs: 10, 10, 20
        assert!((hrv_pairwise(&beats).unwrap() - 40.0 / 3.0).abs() < 1e-12);
    }

    #[test_case(&[] ; "no beats")]
    #[test_case(&[5] ; "one beat")]
    #[test_case(&[5, 300] ; "two beats")]
    fn test_hrv_needs_three_beats(beats: &[usize]) {
        let err = hrv(beats).unwrap_err();
        assert!(matches!(
            err,
            VitalportError::Analysis(AnalysisError::InsufficientBeats { required: 3, .. })
        ));
        assert!(hrv_pairwise(beats).is_err());
    }

    #[test]
    fn test_intervals_need_two_beats() {
        assert!(intervals(&[7]).is_err());
        assert_eq!(intervals(&[7, 200]).unwrap(), vec![193]);
    }

    #[test]
    fn test_bpm_formula() {
        assert_eq!(bpm(10, 5120, 512.0).unwrap(), 60.0);
        assert_eq!(bpm(0, 5120, 512.0).unwrap(), 0.0);
        assert!(matches!(
            bpm(0, 0, 512.0).unwrap_err(),
            VitalportError::Analysis(AnalysisError::EmptySignal)
        ));
    }

    #[test]
    fn test_invalid_params() {
        assert!(BeatParams::new(50.0, 180, 0).is_err());
        assert!(BeatParams::new(-1.0, 180, 3).is_err());
        assert!(BeatParams::new(f64::INFINITY, 180, 3).is_err());
    }

    #[test]
    fn test_params_from_config() {
        let params = BeatParams::from_config(&EcgConfig::default()).unwrap();
        assert_eq!(params, BeatParams::default());
    }

    #[test]
    fn test_analysis_marks_unavailable_metrics() {
        let ecg = Ecg::new("flat", vec![0.0; 1024], Attributes::new());
        let analysis = BeatDetector::default().analyze(&ecg, 512.0);
        assert!(analysis.beats.is_empty());
        assert_eq!(analysis.bpm, Some(0.0));
        assert_eq!(analysis.hrv, None);

        let table = analysis_table(&[analysis]).unwrap();
        assert_eq!(table.get(0, "bpm"), Some("0.00"));
        assert_eq!(table.get(0, "hrv"), Some("-"));
        assert_eq!(table.get(0, "hrv_pairwise"), Some("-"));
        assert_eq!(table.get(0, "duration_sec"), Some("2.00"));
    }

    #[test]
    fn test_empty_recording_has_no_bpm() {
        let ecg = Ecg::new("empty", Vec::new(), Attributes::new());
        let analysis = BeatDetector::default().analyze(&ecg, 512.0);
        assert_eq!(analysis.bpm, None);
    }
}
