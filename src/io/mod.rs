//! File I/O module
//!
//! Contains the adaptive stream reader, the two whole-file read
//! strategies under comparison, and generated file set management.

pub mod fileset;
pub mod reader;
pub mod strategy;

// Re-export commonly used types
pub use fileset::FileSet;
pub use reader::{read_all, BufferLimits};
pub use strategy::{Strategy, STRATEGIES};
