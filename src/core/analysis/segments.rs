//! Heartbeat segmentation
//!
//! Cuts a recording into per-beat windows once beats are known.

use super::beats::intervals;
use crate::domain::Result;

/// Windows `[b_i, b_{i+1})` between consecutive beats
///
/// Fewer than two beats give no window.
pub fn split_between_beats<'a>(samples: &'a [f64], beats: &[usize]) -> Vec<&'a [f64]> {
    beats
        .windows(2)
        .filter_map(|w| samples.get(w[0]..w[1]))
        .collect()
}

/// Windows centred on interior beats
///
/// Beat `i` (for `i` in `1..intervals - 2`) gets a window of half-width
/// `interval_i / 2`, clamped to the signal. Beats near both ends are left out
/// since their neighbourhood is incomplete.
pub fn split_around_beats<'a>(samples: &'a [f64], beats: &[usize]) -> Result<Vec<&'a [f64]>> {
    let intervals = intervals(beats)?;
    let last = intervals.len().saturating_sub(2);

    let windows = (1..last)
        .filter_map(|i| {
            let half = intervals[i] / 2;
            let start = beats[i].saturating_sub(half);
            let end = (beats[i] + half).min(samples.len());
            samples.get(start..end)
        })
        .collect();
    Ok(windows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize) -> Vec<f64> {
        (0..len).map(|i| i as f64).collect()
    }

    #[test]
    fn test_split_between_beats() {
        let samples = ramp(20);
        let windows = split_between_beats(&samples, &[2, 5, 11]);
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0], &[2.0, 3.0, 4.0]);
        assert_eq!(windows[1].len(), 6);
        assert!(split_between_beats(&samples, &[4]).is_empty());
    }

    #[test]
    fn test_split_around_interior_beats() {
        let samples = ramp(100);
        // intervals 10, 10, 20, 10, 10: interior indices 1..3
        let beats = [5, 15, 25, 45, 55, 65];
        let windows = split_around_beats(&samples, &beats).unwrap();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].first(), Some(&10.0));
        assert_eq!(windows[0].len(), 10);
        assert_eq!(windows[1].first(), Some(&15.0));
        assert_eq!(windows[1].len(), 20);
    }

    #[test]
    fn test_split_around_needs_beats() {
        let samples = ramp(10);
        assert!(split_around_beats(&samples, &[3]).is_err());
        assert!(split_around_beats(&samples, &[3, 6, 9]).unwrap().is_empty());
    }
}
