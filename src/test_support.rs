// Shared fixtures for unit tests

use crate::log::{Log, SingletonGrouping};
use crate::record::{FormatVersion, TraceRecord};

/// Build a V18 record: `(line_index, raw_thread, caller, callee, latency, return)`
pub fn record(
    line_index: usize,
    raw_thread: i64,
    caller: &str,
    callee: &str,
    latency: i64,
    ret: &str,
) -> TraceRecord {
    let line = format!(
        "{};{};0;{};0;0;Call;{};{};0;;{}",
        line_index, latency, raw_thread, caller, callee, ret
    );
    TraceRecord::parse(&line, line_index, "fixture", FormatVersion::V18)
        .expect("fixture line parses")
}

/// Build a log from `(caller, callee, latency, return)` rows on one thread
pub fn log_of(file: &str, is_passing: bool, rows: &[(&str, &str, i64, &str)]) -> Log {
    let records = rows
        .iter()
        .enumerate()
        .map(|(i, (caller, callee, latency, ret))| {
            let mut r = record(i, 1, caller, callee, *latency, ret);
            r.file_name = file.to_string();
            r
        })
        .collect();
    Log::build(file, is_passing, records, &SingletonGrouping)
}
