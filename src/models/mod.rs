//! Benchmark data models

pub mod result;

// Re-export commonly used types
pub use result::{ExperimentPoint, MatrixRow, TimingResult};
