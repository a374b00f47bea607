//! Benchmark engine module
//!
//! Contains the worker pools, the timed batch barrier, and the
//! matrix driver that sweeps the experiment points.

pub mod matrix;
pub mod pool;

// Re-export commonly used types
pub use matrix::MatrixDriver;
pub use pool::{run_batch, BatchReport, WorkerPools};
