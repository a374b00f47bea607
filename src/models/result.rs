//! Benchmark result data models
//!
//! Contains the experiment point sweep, per-cell timing results, and the
//! tab-separated row rendering used by the output table.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::io::strategy::Strategy;
use crate::util::units::{calculate_throughput_mbps, format_bytes};

/// One (file size, file count) combination in the benchmark sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentPoint {
    /// Size of each generated file in bytes
    pub file_size: u64,
    /// Number of files generated and read
    pub file_count: usize,
}

impl ExperimentPoint {
    /// Derive the point for a file count against a byte budget; file size
    /// is the ceiling division, so every point targets the same aggregate
    /// volume
    pub fn for_count(total_byte_budget: u64, file_count: usize) -> Self {
        Self {
            file_size: total_byte_budget.div_ceil(file_count as u64),
            file_count,
        }
    }

    /// Aggregate bytes this point materializes on disk
    pub fn total_bytes(&self) -> u64 {
        self.file_size * self.file_count as u64
    }

    /// The doubling file-count schedule between the settings' sweep bounds
    pub fn sweep(settings: &Settings) -> Vec<Self> {
        let mut points = Vec::new();
        let mut count = settings.min_files;
        while count <= settings.max_files {
            points.push(Self::for_count(settings.total_byte_budget, count));
            match count.checked_mul(2) {
                Some(next) => count = next,
                None => break,
            }
        }
        points
    }
}

/// One timed (point, strategy, concurrency) cell. Immutable once computed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingResult {
    /// When the cell was measured
    pub timestamp: DateTime<Utc>,
    /// The experiment point the batch ran against
    pub point: ExperimentPoint,
    /// The read strategy under test
    pub strategy: Strategy,
    /// Worker pool size the batch ran under
    pub concurrency: usize,
    /// Wall-clock time for the whole batch
    #[serde(with = "duration_serde")]
    pub elapsed: Duration,
}

impl TimingResult {
    /// Record a new timing cell
    pub fn new(
        point: ExperimentPoint,
        strategy: Strategy,
        concurrency: usize,
        elapsed: Duration,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            point,
            strategy,
            concurrency,
            elapsed,
        }
    }

    /// Elapsed batch time in seconds
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Batch throughput in MiB per second
    pub fn throughput_mbps(&self) -> f64 {
        calculate_throughput_mbps(self.point.total_bytes(), self.elapsed)
    }

    /// Human-readable one-line summary
    pub fn summary(&self) -> String {
        format!(
            "{}x{}: {} files of {} in {:.4}s ({:.2} MiB/s)",
            self.strategy.label(),
            self.concurrency,
            self.point.file_count,
            format_bytes(self.point.file_size),
            self.elapsed_secs(),
            self.throughput_mbps()
        )
    }
}

/// One row of the output table: an experiment point plus its timing cells
/// in fixed (strategy, concurrency) order
#[derive(Debug, Clone)]
pub struct MatrixRow {
    /// The point this row measured
    pub point: ExperimentPoint,
    /// The row's timing cells, stream cells before mapped cells
    pub cells: Vec<TimingResult>,
}

impl MatrixRow {
    /// Assemble a row from a point and its cells
    pub fn new(point: ExperimentPoint, cells: Vec<TimingResult>) -> Self {
        Self { point, cells }
    }

    /// Tab-separated rendering matching the table header, with a `|`
    /// separator between the strategy groups
    pub fn render(&self) -> String {
        let mut line = format!("{}\t{}\t|", self.point.file_size, self.point.file_count);
        let mut last_strategy = None;
        for cell in &self.cells {
            if let Some(prev) = last_strategy {
                if prev != cell.strategy {
                    line.push_str("\t|");
                }
            }
            line.push_str(&format!("\t{:.4}", cell.elapsed_secs()));
            last_strategy = Some(cell.strategy);
        }
        line
    }
}

// Custom serde module for Duration serialization
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_nanos() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let nanos = u64::deserialize(deserializer)?;
        Ok(Duration::from_nanos(nanos))
    }
}
