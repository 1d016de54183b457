//! Per-file normalization passes
//!
//! Raw thread ids and occurrence counts are run-specific. These passes
//! rewrite them into values that line up across runs:
//! - thread ids become first-seen ordinals (1, 2, ...)
//! - each record gets the 1-based occurrence count of its line id
//!
//! Both are pure functions of one file's record order.

use crate::record::TraceRecord;
use fnv::FnvHashMap;

/// Replace raw thread ids with their first-seen ordinal, starting at 1
pub fn normalize_thread_ids(records: &mut [TraceRecord]) {
    let mut ordinals: FnvHashMap<i64, i64> = FnvHashMap::default();

    for record in records.iter_mut() {
        let next = ordinals.len() as i64 + 1;
        let ordinal = *ordinals.entry(record.raw_thread_id).or_insert(next);
        record.thread_id = ordinal;
    }
}

/// Number each occurrence of a line id in file order, starting at 1
pub fn assign_sequence_numbers(records: &mut [TraceRecord]) {
    let mut counters: FnvHashMap<String, u32> = FnvHashMap::default();

    for record in records.iter_mut() {
        let counter = counters.entry(record.line_id()).or_insert(0);
        *counter += 1;
        record.sequence_number = *counter;
    }
}

/// Run both passes
///
/// Thread ids go first: the line id embeds the normalized thread id, so
/// sequence numbers must be counted against the final line id.
pub fn normalize_records(records: &mut [TraceRecord]) {
    normalize_thread_ids(records);
    assign_sequence_numbers(records);
}
