//! Configuration management module
//!
//! Exposes the benchmark's tunable constants as settings with the
//! original defaults, and handles loading and saving them as TOML.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{BenchError, Result, APP_NAME, CONFIG_FILE};

/// Default aggregate data volume per experiment point (bytes).
/// Should be well past RAM size if page-cache effects must be excluded.
pub const DEFAULT_TOTAL_BYTE_BUDGET: u64 = 102_400_000;

/// Default maximum number of files per generated subdirectory
pub const DEFAULT_SHARD_SIZE: usize = 1000;

/// Default initial buffer size when no usable size hint is given (16 KiB)
pub const DEFAULT_BUFFER_SIZE: usize = 16 * 1024;

/// Largest initial allocation a size hint may request (16 MiB); hints
/// beyond this start smaller and grow, so a bad hint cannot force a
/// huge up-front allocation
pub const DEFAULT_MAX_INITIAL_BUFFER_SIZE: usize = 16 * 1024 * 1024;

/// Largest buffer the reader will ever grow to
pub const DEFAULT_MAX_BUFFER_SIZE: usize = i32::MAX as usize;

/// Benchmark settings covering the sweep bounds, the file set layout,
/// and the adaptive reader's buffer limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Total bytes to target per experiment point; file size is derived
    /// as the ceiling of this over the file count
    pub total_byte_budget: u64,
    /// Maximum files per generated subdirectory
    pub shard_size: usize,
    /// Smallest file count in the sweep
    pub min_files: usize,
    /// Largest file count in the sweep (the count doubles between points)
    pub max_files: usize,
    /// Initial reader buffer size when no usable size hint is given
    pub default_buffer_size: usize,
    /// Cap applied to size hints when choosing the initial buffer size
    pub max_initial_buffer_size: usize,
    /// Largest buffer the reader may grow to
    pub max_buffer_size: usize,
    /// Directory to generate file sets under; the OS temp directory if unset
    pub work_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            total_byte_budget: DEFAULT_TOTAL_BYTE_BUDGET,
            shard_size: DEFAULT_SHARD_SIZE,
            min_files: 100,
            max_files: 102_400,
            default_buffer_size: DEFAULT_BUFFER_SIZE,
            max_initial_buffer_size: DEFAULT_MAX_INITIAL_BUFFER_SIZE,
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
            work_dir: None,
        }
    }
}

impl Settings {
    /// Create settings with the original benchmark's defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the total byte budget per experiment point
    pub fn with_total_byte_budget(mut self, budget: u64) -> Self {
        self.total_byte_budget = budget;
        self
    }

    /// Set the maximum files per subdirectory
    pub fn with_shard_size(mut self, shard_size: usize) -> Self {
        self.shard_size = shard_size;
        self
    }

    /// Set the file count sweep bounds
    pub fn with_file_count_range(mut self, min_files: usize, max_files: usize) -> Self {
        self.min_files = min_files;
        self.max_files = max_files;
        self
    }

    /// Set the reader buffer limits
    pub fn with_buffer_limits(mut self, default: usize, max_initial: usize, max: usize) -> Self {
        self.default_buffer_size = default;
        self.max_initial_buffer_size = max_initial;
        self.max_buffer_size = max;
        self
    }

    /// Set the directory file sets are generated under
    pub fn with_work_dir(mut self, dir: PathBuf) -> Self {
        self.work_dir = Some(dir);
        self
    }

    /// Directory file sets are generated under
    pub fn work_dir(&self) -> PathBuf {
        self.work_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.total_byte_budget == 0 {
            return Err(BenchError::Config(
                "Total byte budget must be greater than 0".to_string(),
            ));
        }

        if self.shard_size == 0 {
            return Err(BenchError::Config(
                "Shard size must be greater than 0".to_string(),
            ));
        }

        if self.min_files == 0 {
            return Err(BenchError::Config(
                "Minimum file count must be greater than 0".to_string(),
            ));
        }

        if self.min_files > self.max_files {
            return Err(BenchError::Config(format!(
                "Minimum file count {} exceeds maximum {}",
                self.min_files, self.max_files
            )));
        }

        if self.default_buffer_size == 0 {
            return Err(BenchError::Config(
                "Default buffer size must be greater than 0".to_string(),
            ));
        }

        if self.default_buffer_size > self.max_initial_buffer_size {
            return Err(BenchError::Config(format!(
                "Default buffer size {} exceeds maximum initial size {}",
                self.default_buffer_size, self.max_initial_buffer_size
            )));
        }

        if self.max_initial_buffer_size > self.max_buffer_size {
            return Err(BenchError::Config(format!(
                "Maximum initial buffer size {} exceeds maximum buffer size {}",
                self.max_initial_buffer_size, self.max_buffer_size
            )));
        }

        if let Some(dir) = &self.work_dir {
            if !dir.is_dir() {
                return Err(BenchError::Config(format!(
                    "Work directory does not exist: {}",
                    dir.display()
                )));
            }
        }

        Ok(())
    }

    /// Load settings from the standard config file location.
    /// Returns defaults if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|e| {
            BenchError::Config(format!(
                "Failed to read config file {}: {}",
                config_path.display(),
                e
            ))
        })?;

        let settings: Self = toml::from_str(&content).map_err(|e| {
            BenchError::Config(format!(
                "Failed to parse config file {}: {}",
                config_path.display(),
                e
            ))
        })?;

        settings.validate()?;

        Ok(settings)
    }

    /// Save settings to the standard config file location
    pub fn save(&self) -> Result<()> {
        self.validate()?;

        let config_path = Self::config_file_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                BenchError::Config(format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let content = toml::to_string_pretty(self)?;

        fs::write(&config_path, content).map_err(|e| {
            BenchError::Config(format!(
                "Failed to write config file {}: {}",
                config_path.display(),
                e
            ))
        })?;

        Ok(())
    }

    /// Get the standard configuration file path,
    /// `<config_dir>/readmark/readmark.toml`
    pub fn config_file_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            BenchError::Config("Unable to determine config directory".to_string())
        })?;

        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }
}
