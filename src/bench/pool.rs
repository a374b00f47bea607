//! Worker pools and the batch barrier
//!
//! A fixed-size thread pool per concurrency level, built once at startup
//! and reused across every experiment point; concurrency is the variable
//! under test, so the pools never resize. `run_batch` is the barrier: it
//! submits one read task per file and blocks until all of them finish,
//! collecting every task's outcome.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::io::reader::BufferLimits;
use crate::io::strategy::Strategy;
use crate::{BenchError, Result};

/// The process's worker pools, one per concurrency level.
///
/// Dropping the set joins all worker threads, so the pools are released
/// on every exit path that unwinds through the owner.
pub struct WorkerPools {
    pools: Vec<(usize, ThreadPool)>,
}

impl WorkerPools {
    /// Build one fixed-size pool per requested level
    pub fn new(levels: &[usize]) -> Result<Self> {
        let mut pools = Vec::with_capacity(levels.len());
        for &level in levels {
            if level == 0 {
                return Err(BenchError::Pool(
                    "Concurrency level must be greater than 0".to_string(),
                ));
            }
            let pool = ThreadPoolBuilder::new()
                .num_threads(level)
                .thread_name(move |i| format!("readmark-p{}-w{}", level, i))
                .build()
                .map_err(|e| {
                    BenchError::Pool(format!("Failed to build pool of {} threads: {}", level, e))
                })?;
            pools.push((level, pool));
        }
        Ok(Self { pools })
    }

    /// The pool of the given size, if one was built
    pub fn get(&self, concurrency: usize) -> Option<&ThreadPool> {
        self.pools
            .iter()
            .find(|(level, _)| *level == concurrency)
            .map(|(_, pool)| pool)
    }

    /// The configured concurrency levels, in construction order
    pub fn levels(&self) -> Vec<usize> {
        self.pools.iter().map(|(level, _)| *level).collect()
    }
}

/// Outcome of one timed batch of reads
#[derive(Debug)]
pub struct BatchReport {
    /// Number of read tasks submitted and waited for
    pub attempted: usize,
    /// Total bytes successfully read across the batch
    pub bytes_read: u64,
    /// Per-file failures; a failure never cancels its siblings
    pub failures: Vec<(PathBuf, BenchError)>,
    /// Wall-clock time from just before first submission to just after
    /// the last task finished
    pub elapsed: Duration,
}

impl BatchReport {
    /// Elapsed batch time in seconds
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// True if every task in the batch succeeded
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Read every file once through the pool and wait for all reads to finish.
///
/// The calling thread blocks until the whole batch is done, whatever the
/// individual outcomes; the timing therefore covers all attempted reads,
/// failed ones included. Failures are reported on stderr and collected in
/// the returned report.
pub fn run_batch(
    pool: &ThreadPool,
    files: &[PathBuf],
    strategy: Strategy,
    limits: &BufferLimits,
) -> BatchReport {
    let start = Instant::now();
    let outcomes: Vec<Result<u64>> = pool.install(|| {
        files
            .par_iter()
            .map(|path| strategy.read_file(path, limits))
            .collect()
    });
    let elapsed = start.elapsed();

    let mut bytes_read = 0u64;
    let mut failures = Vec::new();
    for (path, outcome) in files.iter().zip(outcomes) {
        match outcome {
            Ok(n) => bytes_read += n,
            Err(e) => {
                eprintln!("Read of {} failed: {}", path.display(), e);
                failures.push((path.clone(), e));
            }
        }
    }

    BatchReport {
        attempted: files.len(),
        bytes_read,
        failures,
        elapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::fileset::FileSet;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_pools_are_built_per_level() {
        let pools = WorkerPools::new(&[1, 2, 4, 8]).unwrap();
        assert_eq!(pools.levels(), vec![1, 2, 4, 8]);
        for level in [1, 2, 4, 8] {
            let pool = pools.get(level).unwrap();
            assert_eq!(pool.current_num_threads(), level);
        }
        assert!(pools.get(3).is_none());
    }

    #[test]
    fn test_zero_level_rejected() {
        assert!(WorkerPools::new(&[1, 0]).is_err());
    }

    #[test]
    fn test_batch_reads_every_file() {
        let dir = tempdir().unwrap();
        let set = FileSet::generate(dir.path(), 20, 500, 1000).unwrap();
        let pools = WorkerPools::new(&[4]).unwrap();
        let limits = BufferLimits::default();

        for strategy in crate::io::strategy::STRATEGIES {
            let report = run_batch(pools.get(4).unwrap(), set.files(), strategy, &limits);
            assert_eq!(report.attempted, 20);
            assert_eq!(report.bytes_read, 20 * 500);
            assert!(report.is_clean());
            assert!(report.elapsed > Duration::ZERO);
        }

        set.cleanup();
    }

    #[test]
    fn test_failing_tasks_do_not_cancel_siblings() {
        let dir = tempdir().unwrap();
        let set = FileSet::generate(dir.path(), 12, 256, 1000).unwrap();

        // Break every third file deterministically
        let broken: Vec<_> = set.files().iter().step_by(3).cloned().collect();
        for path in &broken {
            fs::remove_file(path).unwrap();
        }

        let pools = WorkerPools::new(&[2]).unwrap();
        let limits = BufferLimits::default();
        let report = run_batch(
            pools.get(2).unwrap(),
            set.files(),
            Strategy::Stream,
            &limits,
        );

        // All tasks were attempted; only the broken subset failed
        assert_eq!(report.attempted, 12);
        assert_eq!(report.failures.len(), broken.len());
        assert_eq!(report.bytes_read, (12 - broken.len()) as u64 * 256);
        for (path, _) in &report.failures {
            assert!(broken.contains(path));
        }

        set.cleanup();
    }

    #[test]
    fn test_empty_batch() {
        let pools = WorkerPools::new(&[1]).unwrap();
        let limits = BufferLimits::default();
        let report = run_batch(pools.get(1).unwrap(), &[], Strategy::Mapped, &limits);
        assert_eq!(report.attempted, 0);
        assert_eq!(report.bytes_read, 0);
        assert!(report.is_clean());
    }
}
