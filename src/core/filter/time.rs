//! Time-window route filter

use super::RouteFilter;
use crate::domain::Route;
use chrono::{DateTime, Utc};

/// Keeps routes recorded inside a time window with a bounded duration
///
/// A route passes when it started strictly after `from`, ended strictly before
/// `to`, and its duration lies in `[min_duration_sec, max_duration_sec]`.
/// Routes without points never pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeFilter {
    /// Exclusive lower bound of the start time
    pub from: DateTime<Utc>,
    /// Exclusive upper bound of the end time
    pub to: DateTime<Utc>,
    /// Shortest accepted duration, in seconds
    pub min_duration_sec: i64,
    /// Longest accepted duration, in seconds
    pub max_duration_sec: i64,
}

impl TimeFilter {
    /// Window filter with no duration limits
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            from,
            to,
            min_duration_sec: 0,
            max_duration_sec: i64::MAX,
        }
    }

    /// Restricts the accepted duration
    pub fn with_duration(mut self, min_sec: i64, max_sec: i64) -> Self {
        self.min_duration_sec = min_sec;
        self.max_duration_sec = max_sec;
        self
    }
}

impl Default for TimeFilter {
    /// Everything from the Unix epoch until now
    fn default() -> Self {
        Self::new(DateTime::<Utc>::default(), Utc::now())
    }
}

impl RouteFilter for TimeFilter {
    fn name(&self) -> &str {
        "time"
    }

    fn keep(&self, route: &Route) -> bool {
        match (route.start, route.end) {
            (Some(start), Some(end)) => {
                start > self.from
                    && end < self.to
                    && (self.min_duration_sec..=self.max_duration_sec)
                        .contains(&route.duration_sec)
            }
            _ => false,
        }
    }
}
