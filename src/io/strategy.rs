//! Whole-file read routines under comparison
//!
//! `Stream` reads the file front to back through the adaptive reader;
//! `Mapped` maps the full byte range read-only and copies it out. Both
//! report the exact number of bytes read.

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;
use serde::{Deserialize, Serialize};

use crate::io::reader::{read_all, BufferLimits};
use crate::Result;

/// The file-reading technique being benchmarked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    /// Buffered sequential stream reads with adaptive buffer growth
    Stream,
    /// Memory-mapped read of the full byte range, copied into a fresh buffer
    Mapped,
}

/// The strategies in the order their columns appear in the output table
pub const STRATEGIES: [Strategy; 2] = [Strategy::Stream, Strategy::Mapped];

impl Strategy {
    /// Column label used in the output header
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Stream => "Stream",
            Strategy::Mapped => "Mapped",
        }
    }

    /// Read the whole file at `path` with this strategy, returning the
    /// byte count
    pub fn read_file(&self, path: &Path, limits: &BufferLimits) -> Result<u64> {
        match self {
            Strategy::Stream => read_stream(path, limits),
            Strategy::Mapped => read_mapped(path),
        }
    }
}

fn read_stream(path: &Path, limits: &BufferLimits) -> Result<u64> {
    let mut file = File::open(path)?;
    // The metadata length is advisory only; the reader still handles
    // files that shrink or grow between stat and read
    let hint = file.metadata().ok().map(|m| m.len());
    let content = read_all(&mut file, hint, limits)?;
    Ok(content.len() as u64)
}

fn read_mapped(path: &Path) -> Result<u64> {
    let file = File::open(path)?;
    let len = file.metadata()?.len();
    // Mapping a zero-length file errors on some platforms
    if len == 0 {
        return Ok(0);
    }

    let mmap = unsafe { Mmap::map(&file)? };
    #[cfg(unix)]
    let _ = mmap.advise(memmap2::Advice::WillNeed);

    let mut content = vec![0u8; mmap.len()];
    content.copy_from_slice(&mmap);
    Ok(content.len() as u64)
}
