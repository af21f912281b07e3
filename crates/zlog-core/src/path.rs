//! Stream name to log file path normalization

use crate::constants::{CURRENT_DIR, LOG_EXTENSION};

/// Resolve the file path for a logical stream under `base_path`.
///
/// Backslashes become forward slashes, empty and `.` segments are dropped,
/// and an empty base falls back to `.`. A stream name that does not already
/// end in `.log` has its dots replaced by underscores before `.log` is
/// appended, so `"x.y"` never turns into a nested extension.
pub fn resolve_log_path(base_path: &str, stream_name: &str) -> String {
    format!("{}/{}", normalize_base(base_path), normalize_stream(stream_name))
}

fn normalize_base(base_path: &str) -> String {
    let unified = base_path.replace('\\', "/");
    let segments: Vec<&str> = unified
        .split('/')
        .filter(|s| !s.is_empty() && *s != CURRENT_DIR)
        .collect();

    if segments.is_empty() {
        CURRENT_DIR.to_string()
    } else {
        segments.join("/")
    }
}

fn normalize_stream(stream_name: &str) -> String {
    if stream_name.ends_with(LOG_EXTENSION) {
        stream_name.to_string()
    } else {
        format!("{}{}", stream_name.replace('.', "_"), LOG_EXTENSION)
    }
}
