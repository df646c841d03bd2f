//! Progress arithmetic and human-readable formatting.

use std::time::Duration;

/// Percentage of `target` reached by `size`. Exceeds 100 on overshoot.
pub fn percent(size: u64, target: u64) -> f64 {
    if target == 0 {
        return 100.0;
    }
    size as f64 * 100.0 / target as f64
}

/// `HH:MM:SS`, with hours allowed to grow past 99.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

/// Byte count scaled to B, KB or MB (binary units).
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
