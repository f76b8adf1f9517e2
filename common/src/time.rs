use chrono::{DateTime, Utc};

/// Wall clock in Unix milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// `HH:MM DD-MM-YYYY UTC`, the timestamp format used in digests.
pub fn format_ms(ts_ms: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(ts_ms) {
        Some(dt) => dt.format("%H:%M %d-%m-%Y UTC").to_string(),
        None => format!("{ts_ms}ms"),
    }
}
