//! Units formatting and conversion utilities
//!
//! Provides human-readable formatting of byte sizes and throughput
//! calculation for result summaries and diagnostics.

use std::time::Duration;

/// Format bytes into human-readable size with appropriate units
///
/// # Examples
/// ```
/// use readmark::util::units::format_bytes;
///
/// assert_eq!(format_bytes(1024), "1.0 KiB");
/// assert_eq!(format_bytes(1048576), "1.0 MiB");
/// assert_eq!(format_bytes(1073741824), "1.0 GiB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB", "PiB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Calculate throughput in MiB/s from bytes and duration
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use readmark::util::units::calculate_throughput_mbps;
///
/// let throughput = calculate_throughput_mbps(1048576, Duration::from_secs(1));
/// assert!((throughput - 1.0).abs() < 0.01);
/// ```
pub fn calculate_throughput_mbps(bytes: u64, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 0.0;
    }

    let duration_secs = duration.as_secs_f64();
    let megabytes = bytes as f64 / 1_048_576.0; // 1 MiB = 1,048,576 bytes
    megabytes / duration_secs
}
