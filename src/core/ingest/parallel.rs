//! Route fan-out over a fixed worker pool
//!
//! Route documents are the expensive part of an export, so they are parsed on
//! a `rayon` pool. Results come back index-aligned with the input whatever the
//! completion order, and a failing item only fails itself. Sequential mode runs
//! the same per-item function in a plain loop and yields the same output.

use super::summary::BatchOutcome;
use crate::adapters::export::{RouteExtraction, RouteExtractor};
use crate::config::IngestConfig;
use crate::domain::{ItemFailure, Result};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

/// How a batch is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// One item after the other on the calling thread
    Sequential,
    /// A pool of `workers` threads
    Parallel {
        /// Pool size
        workers: usize,
    },
}

/// One route document to parse, and the name the route gets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteJob {
    /// Route name (workout uuid or file stem)
    pub name: String,
    /// Route document path
    pub path: PathBuf,
}

impl RouteJob {
    /// Create a new job
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Batch runner used for route parsing
#[derive(Debug, Clone)]
pub struct ParallelLoader {
    mode: LoadMode,
}

impl ParallelLoader {
    /// Runner with an explicit mode
    pub fn new(mode: LoadMode) -> Self {
        Self { mode }
    }

    /// Runner that never spawns threads
    pub fn sequential() -> Self {
        Self::new(LoadMode::Sequential)
    }

    /// Runner with `workers` threads; 0 means one per available CPU
    pub fn parallel(workers: usize) -> Self {
        let workers = if workers == 0 {
            available_workers()
        } else {
            workers
        };
        Self::new(LoadMode::Parallel { workers })
    }

    /// Runner configured by the `[ingest]` section
    pub fn from_config(config: &IngestConfig) -> Self {
        if config.parallel {
            Self::parallel(config.workers)
        } else {
            Self::sequential()
        }
    }

    /// Execution mode
    pub fn mode(&self) -> LoadMode {
        self.mode
    }

    /// Applies `f` to every item, returning results in input order
    pub fn run<I, T, F>(&self, items: &[I], f: F) -> Vec<Result<T>>
    where
        I: Sync,
        T: Send,
        F: Fn(&I) -> Result<T> + Sync + Send,
    {
        match self.mode {
            LoadMode::Sequential => items.iter().map(&f).collect(),
            LoadMode::Parallel { workers } => {
                match ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .thread_name(|i| format!("vitalport-worker-{i}"))
                    .build()
                {
                    Ok(pool) => pool.install(|| items.par_iter().map(&f).collect()),
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            workers,
                            "Worker pool unavailable, running sequentially"
                        );
                        items.iter().map(&f).collect()
                    }
                }
            }
        }
    }

    /// Runs a labelled batch, collecting per-item failures
    pub fn load<I, T, F, L>(&self, batch: &str, items: &[I], label: L, f: F) -> BatchOutcome<T>
    where
        I: Sync,
        T: Send,
        F: Fn(&I) -> Result<T> + Sync + Send,
        L: Fn(&I) -> String,
    {
        let total = items.len();
        let done = AtomicUsize::new(0);

        tracing::info!(batch = batch, items = total, mode = ?self.mode, "Starting batch");

        let results = self.run(items, |item| {
            let result = f(item);
            let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
            crate::log_batch_progress!(batch, finished, total);
            result
        });

        let mut outcome = BatchOutcome::new();
        for (item, result) in items.iter().zip(results) {
            match result {
                Ok(value) => outcome.push_success(label(item), value),
                Err(error) => outcome.push_failure(ItemFailure::new(label(item), error)),
            }
        }

        outcome.log_summary(batch);
        outcome
    }

    /// Extracts every route of `jobs`
    pub fn extract_routes(&self, jobs: &[RouteJob]) -> BatchOutcome<RouteExtraction> {
        self.load(
            "routes",
            jobs,
            |job| job.name.clone(),
            |job| RouteExtractor::extract_as(&job.path, job.name.clone()),
        )
    }
}

impl Default for ParallelLoader {
    fn default() -> Self {
        Self::parallel(0)
    }
}

/// Number of CPUs the process may use, at least one
fn available_workers() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VitalportError;

    fn square_or_fail(n: &u64) -> Result<u64> {
        if n % 7 == 3 {
            Err(VitalportError::Other(format!("item {n} rejected")))
        } else {
            Ok(n * n)
        }
    }

    #[test]
    fn test_zero_workers_uses_available_parallelism() {
        match ParallelLoader::parallel(0).mode() {
            LoadMode::Parallel { workers } => assert!(workers >= 1),
            LoadMode::Sequential => panic!("expected a pool"),
        }
    }

    #[test]
    fn test_results_are_index_aligned() {
        let items: Vec<u64> = (0..200).collect();
        let results = ParallelLoader::parallel(4).run(&items, |n| Ok(*n * 2));
        let values: Vec<u64> = results.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(values, items.iter().map(|n| n * 2).collect::<Vec<_>>());
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let items: Vec<u64> = (0..100).collect();
        let seq = ParallelLoader::sequential().load("t", &items, |n| n.to_string(), square_or_fail);
        let par = ParallelLoader::parallel(3).load("t", &items, |n| n.to_string(), square_or_fail);

        assert_eq!(seq.successes, par.successes);
        let seq_failed: Vec<&str> = seq.failures.iter().map(|f| f.label.as_str()).collect();
        let par_failed: Vec<&str> = par.failures.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(seq_failed, par_failed);
    }

    #[test]
    fn test_failures_do_not_abort_batch() {
        let items: Vec<u64> = (0..10).collect();
        let outcome = ParallelLoader::parallel(2).load("t", &items, |n| n.to_string(), square_or_fail);
        assert_eq!(outcome.total(), 10);
        assert_eq!(outcome.failed(), 1);
        assert_eq!(outcome.failures[0].label, "3");
        assert_eq!(
            outcome.failure_summary().as_deref(),
            Some("1 of 10 items failed")
        );
    }

    #[test]
    fn test_empty_batch() {
        let items: Vec<u64> = Vec::new();
        let outcome = ParallelLoader::parallel(2).load("t", &items, |n| n.to_string(), square_or_fail);
        assert_eq!(outcome.total(), 0);
    }

    fn gpx_with_points(count: usize, offset: f64) -> String {
        let points: String = (0..count)
            .map(|i| {
                let lon = 11.39 + offset + i as f64 * 0.001;
                // every fifth point lacks its speed and is dropped
                let speed = if i % 5 == 4 {
                    String::new()
                } else {
                    format!("<speed>{}</speed>", 2.5 + i as f64 * 0.1)
                };
                format!(
                    r#"<trkpt lon="{lon}" lat="47.26"><ele>580</ele><time>2021-05-01T06:{:02}:{:02}Z</time><extensions>{speed}<course>45</course><hAcc>3</hAcc><vAcc>2</vAcc></extensions></trkpt>"#,
                    (count - i) / 60,
                    (count - i) % 60
                )
            })
            .collect();
        format!(r#"<gpx xmlns="http://www.topografix.com/GPX/1/1"><trk><trkseg>{points}</trkseg></trk></gpx>"#)
    }

    #[test]
    fn test_sequential_and_parallel_routes_agree() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut jobs = Vec::new();
        for n in 0..6 {
            let path = temp.path().join(format!("route_{n}.gpx"));
            std::fs::write(&path, gpx_with_points(20 + n * 7, n as f64 * 0.01)).unwrap();
            jobs.push(RouteJob::new(format!("workout-{n}"), path));
        }
        jobs.insert(3, RouteJob::new("workout-missing", temp.path().join("gone.gpx")));

        let seq = ParallelLoader::sequential().extract_routes(&jobs);
        let par = ParallelLoader::parallel(4).extract_routes(&jobs);

        assert_eq!(seq.succeeded(), 6);
        assert_eq!(seq.successes.len(), par.successes.len());
        for ((seq_label, seq_route), (par_label, par_route)) in
            seq.successes.iter().zip(&par.successes)
        {
            assert_eq!(seq_label, par_label);
            assert_eq!(seq_route.route, par_route.route);
            assert_eq!(seq_route.raw_points, par_route.raw_points);
            assert_eq!(seq_route.skipped.len(), par_route.skipped.len());
            assert!(!seq_route.skipped.is_empty());
        }

        let seq_failed: Vec<&str> = seq.failures.iter().map(|f| f.label.as_str()).collect();
        let par_failed: Vec<&str> = par.failures.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(seq_failed, vec!["workout-missing"]);
        assert_eq!(seq_failed, par_failed);
    }

    #[test]
    fn test_missing_route_is_item_failure() {
        let jobs = vec![RouteJob::new("gone", "/no/such/route.gpx")];
        let outcome = ParallelLoader::sequential().extract_routes(&jobs);
        assert_eq!(outcome.failed(), 1);
        assert_eq!(outcome.failures[0].label, "gone");
    }
}
