//! Utility functions and helpers

use chrono::DateTime;

/// Arithmetic mean, `None` for an empty input
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// `part / total * 100`, zero when `total` is zero
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Format a nanosecond epoch timestamp as `Mon DD HH:MM:SS`
pub fn format_epoch_ns(ns: i64) -> String {
    DateTime::from_timestamp_nanos(ns)
        .format("%b %d %H:%M:%S")
        .to_string()
}

/// Format an optional float with fixed precision, blank when absent
pub fn format_opt(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{:.*}", precision, v))
        .unwrap_or_default()
}
