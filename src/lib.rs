//! READMARK - file reading benchmark
//!
//! Measures and compares the throughput of buffered sequential stream reads
//! against memory-mapped reads, across a matrix of file sizes and
//! worker-pool concurrency levels.

use std::fmt;

// Public re-exports
pub mod bench;
pub mod config;
pub mod io;
pub mod models;
pub mod util;

// Common error types
#[derive(Debug)]
pub enum BenchError {
    /// I/O operation failed
    Io(std::io::Error),
    /// Configuration validation or parsing error
    Config(String),
    /// A buffer would have to grow past the maximum supported size
    CapacityExceeded {
        /// Bytes the read would have needed
        required: u64,
        /// Maximum the reader supports
        max: u64,
    },
    /// File set generation failed
    Generation(String),
    /// Worker pool construction failed
    Pool(String),
}

impl fmt::Display for BenchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BenchError::Io(err) => write!(f, "I/O error: {}", err),
            BenchError::Config(msg) => write!(f, "Configuration error: {}", msg),
            BenchError::CapacityExceeded { required, max } => write!(
                f,
                "Capacity exceeded: read requires {} bytes but at most {} are supported",
                required, max
            ),
            BenchError::Generation(msg) => write!(f, "File set generation error: {}", msg),
            BenchError::Pool(msg) => write!(f, "Worker pool error: {}", msg),
        }
    }
}

impl std::error::Error for BenchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BenchError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BenchError {
    fn from(err: std::io::Error) -> Self {
        BenchError::Io(err)
    }
}

impl From<toml::de::Error> for BenchError {
    fn from(err: toml::de::Error) -> Self {
        BenchError::Config(format!("TOML parsing error: {}", err))
    }
}

impl From<toml::ser::Error> for BenchError {
    fn from(err: toml::ser::Error) -> Self {
        BenchError::Config(format!("TOML serialization error: {}", err))
    }
}

/// Result type alias for benchmark operations
pub type Result<T> = std::result::Result<T, BenchError>;

// Common types and constants
pub const APP_NAME: &str = "readmark";
pub const CONFIG_FILE: &str = "readmark.toml";
pub const TEMP_DIR_PREFIX: &str = "READMARK_TMP_";

/// Worker pool sizes the matrix sweeps over. The output header hard-codes
/// one column per level and strategy, so this stays a constant.
pub const CONCURRENCY_LEVELS: [usize; 4] = [1, 2, 4, 8];
