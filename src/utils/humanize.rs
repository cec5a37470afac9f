//! Human-readable renderings of byte counts and filesystem timestamps.

use std::time::SystemTime;

use chrono::{DateTime, Local};

const SIZE_SUFFIXES: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// Timestamp layout used for the created/modified columns.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Render a byte count using 1024-based units.
///
/// Values keep at most two decimals with trailing zeros dropped, so 1536 bytes
/// becomes `1.5 KB` and 1024 bytes becomes `1 KB`.
#[allow(clippy::cast_precision_loss)]
pub fn human_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_SUFFIXES.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rendered = format!("{value:.2}");
    let trimmed = rendered.trim_end_matches('0').trim_end_matches('.');

    format!("{trimmed} {}", SIZE_SUFFIXES[unit])
}

/// Render a filesystem timestamp in the local time zone at second precision.
pub fn local_timestamp(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format(TIMESTAMP_FORMAT)
        .to_string()
}
