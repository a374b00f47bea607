//! Adaptive whole-stream reader
//!
//! Reads the full contents of a byte stream of unknown or approximate
//! length into memory, growing the buffer geometrically. A size hint only
//! pre-sizes the buffer; it is capped so a wrong or hostile hint can
//! neither truncate the read nor force a huge up-front allocation.

use std::io::{ErrorKind, Read};

use crate::config::{
    Settings, DEFAULT_BUFFER_SIZE, DEFAULT_MAX_BUFFER_SIZE, DEFAULT_MAX_INITIAL_BUFFER_SIZE,
};
use crate::{BenchError, Result};

/// Buffer sizing bounds for the adaptive reader
#[derive(Debug, Clone, Copy)]
pub struct BufferLimits {
    /// Initial buffer size when no usable size hint is given
    pub default_buffer_size: usize,
    /// Cap applied to size hints when choosing the initial buffer size
    pub max_initial_buffer_size: usize,
    /// Largest buffer the reader may grow to
    pub max_buffer_size: usize,
}

impl Default for BufferLimits {
    fn default() -> Self {
        Self {
            default_buffer_size: DEFAULT_BUFFER_SIZE,
            max_initial_buffer_size: DEFAULT_MAX_INITIAL_BUFFER_SIZE,
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
        }
    }
}

impl BufferLimits {
    /// Pull the reader bounds out of the benchmark settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            default_buffer_size: settings.default_buffer_size,
            max_initial_buffer_size: settings.max_initial_buffer_size,
            max_buffer_size: settings.max_buffer_size,
        }
    }
}

/// Initial buffer size for a given size hint: the hint itself when usable,
/// capped at the maximum initial size; the default when absent or < 1
pub fn initial_capacity(size_hint: Option<u64>, limits: &BufferLimits) -> usize {
    match size_hint {
        Some(hint) if hint >= 1 => hint.min(limits.max_initial_buffer_size as u64) as usize,
        _ => limits.default_buffer_size,
    }
}

/// Read a stream to its end, returning the exact content.
///
/// Fails with `CapacityExceeded` if the hint, or the actual data, exceeds
/// `limits.max_buffer_size`; no partial content is returned in that case.
pub fn read_all<R: Read>(
    reader: &mut R,
    size_hint: Option<u64>,
    limits: &BufferLimits,
) -> Result<Vec<u8>> {
    if let Some(hint) = size_hint {
        if hint > limits.max_buffer_size as u64 {
            return Err(BenchError::CapacityExceeded {
                required: hint,
                max: limits.max_buffer_size as u64,
            });
        }
    }

    let mut buf = vec![0u8; initial_capacity(size_hint, limits)];
    let mut len = 0usize;

    loop {
        // Fill the buffer from the current write offset to its end
        while len < buf.len() {
            match reader.read(&mut buf[len..]) {
                Ok(0) => {
                    buf.truncate(len);
                    return Ok(buf);
                }
                Ok(n) => len += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        // Buffer full; probe before growing so an exactly-sized buffer
        // doesn't pay for a useless reallocation
        let mut probe = [0u8; 1];
        let probed = loop {
            match reader.read(&mut probe) {
                Ok(n) => break n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        };
        if probed == 0 {
            return Ok(buf);
        }

        if buf.len() >= limits.max_buffer_size {
            return Err(BenchError::CapacityExceeded {
                required: buf.len() as u64 + 1,
                max: limits.max_buffer_size as u64,
            });
        }

        let grown = buf.len().saturating_mul(2).min(limits.max_buffer_size);
        buf.resize(grown, 0);
        buf[len] = probe[0];
        len += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    fn tiny_limits() -> BufferLimits {
        BufferLimits {
            default_buffer_size: 4,
            max_initial_buffer_size: 16,
            max_buffer_size: 64,
        }
    }

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    /// Yields one byte per call, with an interrupt before each
    struct InterruptingReader {
        data: Vec<u8>,
        pos: usize,
        interrupt_next: bool,
    }

    impl Read for InterruptingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.interrupt_next {
                self.interrupt_next = false;
                return Err(io::Error::new(io::ErrorKind::Interrupted, "interrupted"));
            }
            self.interrupt_next = true;
            if self.pos >= self.data.len() {
                return Ok(0);
            }
            buf[0] = self.data[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    /// Fails after yielding a fixed number of bytes
    struct FailingReader {
        remaining: usize,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.remaining == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "disk on fire"));
            }
            let n = self.remaining.min(buf.len());
            buf[..n].fill(0xAB);
            self.remaining -= n;
            Ok(n)
        }
    }

    #[test]
    fn test_initial_capacity_follows_hint() {
        let limits = tiny_limits();
        assert_eq!(initial_capacity(None, &limits), 4);
        assert_eq!(initial_capacity(Some(0), &limits), 4);
        assert_eq!(initial_capacity(Some(1), &limits), 1);
        assert_eq!(initial_capacity(Some(10), &limits), 10);
        assert_eq!(initial_capacity(Some(16), &limits), 16);
        // Hints beyond the initial cap start at the cap, not the hint
        assert_eq!(initial_capacity(Some(17), &limits), 16);
        assert_eq!(initial_capacity(Some(u64::MAX), &limits), 16);
    }

    #[test]
    fn test_exact_content_regardless_of_hint() {
        let limits = tiny_limits();
        let data = pattern(37);

        for hint in [None, Some(0), Some(1), Some(37), Some(60), Some(64)] {
            let mut cursor = Cursor::new(data.clone());
            let out = read_all(&mut cursor, hint, &limits).unwrap();
            assert_eq!(out, data, "hint {:?}", hint);
        }
    }

    #[test]
    fn test_empty_stream() {
        let limits = tiny_limits();
        let mut cursor = Cursor::new(Vec::new());
        let out = read_all(&mut cursor, None, &limits).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_stream_length_equal_to_buffer_needs_no_growth() {
        let limits = tiny_limits();
        let data = pattern(4);
        let mut cursor = Cursor::new(data.clone());
        let out = read_all(&mut cursor, Some(4), &limits).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_growth_reaches_max_exactly() {
        let limits = tiny_limits();
        let data = pattern(64);
        let mut cursor = Cursor::new(data.clone());
        let out = read_all(&mut cursor, Some(1), &limits).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_oversized_hint_rejected_up_front() {
        let limits = tiny_limits();
        let mut cursor = Cursor::new(pattern(4));
        let err = read_all(&mut cursor, Some(65), &limits).unwrap_err();
        match err {
            BenchError::CapacityExceeded { required, max } => {
                assert_eq!(required, 65);
                assert_eq!(max, 64);
            }
            other => panic!("expected CapacityExceeded, got {}", other),
        }
        // Rejected before any read
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_stream_longer_than_max_fails() {
        let limits = tiny_limits();
        let mut cursor = Cursor::new(pattern(65));
        let err = read_all(&mut cursor, None, &limits).unwrap_err();
        assert!(matches!(err, BenchError::CapacityExceeded { .. }));
    }

    #[test]
    fn test_interrupted_reads_are_retried() {
        let limits = tiny_limits();
        let data = pattern(11);
        let mut reader = InterruptingReader {
            data: data.clone(),
            pos: 0,
            interrupt_next: false,
        };
        let out = read_all(&mut reader, None, &limits).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_underlying_error_propagates() {
        let limits = tiny_limits();
        let mut reader = FailingReader { remaining: 6 };
        let err = read_all(&mut reader, None, &limits).unwrap_err();
        assert!(matches!(err, BenchError::Io(_)));
    }

    #[test]
    fn test_default_limits_match_settings() {
        let limits = BufferLimits::from_settings(&Settings::default());
        assert_eq!(limits.default_buffer_size, 16 * 1024);
        assert_eq!(limits.max_initial_buffer_size, 16 * 1024 * 1024);
        assert_eq!(limits.max_buffer_size, i32::MAX as usize);
    }
}
