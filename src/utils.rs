// Utility functions
use chrono::{Local, NaiveDateTime};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Current local wall-clock time, used as the capture instant of a record.
pub fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Formats a capture instant the way the output dataset stores it.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Cuts `text` down to at most `max` characters for log lines.
pub fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
