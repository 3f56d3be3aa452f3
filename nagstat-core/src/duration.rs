//! Human-readable durations for the "time in state" column.

use chrono::{DateTime, Utc};

/// Formats a number of seconds as `Xd Xh Xm Xs`, dropping leading zero units.
///
/// Negative inputs are clamped to zero.
pub fn human_duration_from_seconds(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    let secs = seconds % 60;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m {secs}s")
    } else if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}

/// Formats the time elapsed between a unix `timestamp` and `now`.
pub fn human_duration_since(timestamp: i64, now: DateTime<Utc>) -> String {
    human_duration_from_seconds(now.timestamp() - timestamp)
}
