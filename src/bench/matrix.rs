//! Benchmark matrix driver
//!
//! Sweeps the (file count, file size) experiment points strictly one
//! after another: generate the point's file set, time one batch per
//! (strategy, concurrency) cell through the barrier, delete the set,
//! emit the row. Points never overlap on disk, so the byte budget holds
//! and the cells stay comparable.

use std::io::Write;

use crate::bench::pool::{run_batch, WorkerPools};
use crate::config::Settings;
use crate::io::fileset::FileSet;
use crate::io::reader::BufferLimits;
use crate::io::strategy::STRATEGIES;
use crate::models::result::{ExperimentPoint, MatrixRow, TimingResult};
use crate::{BenchError, Result, CONCURRENCY_LEVELS};

/// Drives the full benchmark sweep against a set of worker pools
pub struct MatrixDriver<'a> {
    settings: Settings,
    pools: &'a WorkerPools,
    limits: BufferLimits,
}

impl<'a> MatrixDriver<'a> {
    /// Create a driver over validated settings and pre-built pools
    pub fn new(settings: Settings, pools: &'a WorkerPools) -> Result<Self> {
        settings.validate()?;
        let limits = BufferLimits::from_settings(&settings);
        Ok(Self {
            settings,
            pools,
            limits,
        })
    }

    /// The output table header
    pub fn header() -> String {
        let mut header = String::from("Filesize\tNumFiles\t|");
        for strategy in STRATEGIES {
            for concurrency in CONCURRENCY_LEVELS {
                header.push_str(&format!("\t{}{}", strategy.label(), concurrency));
            }
            header.push_str("\t|");
        }
        // No group separator after the last strategy
        header.truncate(header.len() - "\t|".len());
        header
    }

    /// Run the full sweep, writing the header, one row per experiment
    /// point, and the trailing completion marker to `out`.
    ///
    /// A generation failure scraps only the failing point; the sweep
    /// continues with the next one.
    pub fn run(&self, out: &mut dyn Write) -> Result<Vec<MatrixRow>> {
        writeln!(out, "{}", Self::header())?;

        let mut rows = Vec::new();
        for point in ExperimentPoint::sweep(&self.settings) {
            match self.run_point(&point) {
                Ok(row) => {
                    writeln!(out, "{}", row.render())?;
                    rows.push(row);
                }
                Err(e) => {
                    eprintln!(
                        "Skipping point ({} files of {} bytes): {}",
                        point.file_count, point.file_size, e
                    );
                }
            }
        }

        writeln!(out, "\nFinished.")?;
        Ok(rows)
    }

    /// Run one experiment point: generate, read all cells, clean up.
    ///
    /// Cleanup runs whether or not the reading phase succeeded, so no
    /// point leaves its files behind for the next one.
    pub fn run_point(&self, point: &ExperimentPoint) -> Result<MatrixRow> {
        let set = FileSet::generate(
            &self.settings.work_dir(),
            point.file_count,
            point.file_size,
            self.settings.shard_size,
        )?;

        let outcome = self.read_cells(point, &set);
        set.cleanup();
        outcome.map(|cells| MatrixRow::new(point.clone(), cells))
    }

    fn read_cells(&self, point: &ExperimentPoint, set: &FileSet) -> Result<Vec<TimingResult>> {
        let mut cells = Vec::with_capacity(STRATEGIES.len() * CONCURRENCY_LEVELS.len());
        for strategy in STRATEGIES {
            for concurrency in CONCURRENCY_LEVELS {
                let pool = self.pools.get(concurrency).ok_or_else(|| {
                    BenchError::Pool(format!("No worker pool of size {}", concurrency))
                })?;
                let report = run_batch(pool, set.files(), strategy, &self.limits);
                cells.push(TimingResult::new(
                    point.clone(),
                    strategy,
                    concurrency,
                    report.elapsed,
                ));
            }
        }
        Ok(cells)
    }
}
