//! Property-based tests for the analysis core
//!
//! Core properties covered:
//! 1. Record parsing is total and deterministic
//! 2. Normalization: sequence numbers run 1..N, threads numbered by first sight
//! 3. Relative signatures start with `true`
//! 4. Classification is complete and counts are consistent
//! 5. Range disjointness is symmetric

use proptest::prelude::*;
use rootfinder::classify::{classify, TimeRange};
use rootfinder::log::{Log, SingletonGrouping};
use rootfinder::predicate::{relative_pattern, Predicate, PredicateType};
use rootfinder::record::{FormatVersion, TraceRecord};
use rootfinder::report::Report;
use std::collections::{HashMap, HashSet};

/// (raw thread, callee index, latency, return value)
type Row = (i64, usize, i64, String);

const CALLEES: [&str; 4] = ["Db.Connect", "Db.Query", "Net.Send", "Cache.Get"];

fn row_strategy() -> impl Strategy<Value = Row> {
    (0i64..4, 0usize..CALLEES.len(), 0i64..200, "[a-c0-2]{0,2}")
}

fn file_strategy() -> impl Strategy<Value = Vec<Row>> {
    prop::collection::vec(row_strategy(), 1..25)
}

fn build_log(name: &str, is_passing: bool, rows: &[Row]) -> Log {
    let records = rows
        .iter()
        .enumerate()
        .map(|(i, (thread, callee, latency, ret))| {
            let line = format!(
                "{};{};0;{};0;0;Call;Main;{};0;;{}",
                i, latency, thread, CALLEES[*callee], ret
            );
            TraceRecord::parse(&line, i, name, FormatVersion::V18).unwrap()
        })
        .collect();
    Log::build(name, is_passing, records, &SingletonGrouping)
}

fn build_set(prefix: &str, is_passing: bool, files: &[Vec<Row>]) -> Vec<Log> {
    files
        .iter()
        .enumerate()
        .map(|(i, rows)| build_log(&format!("{}{}", prefix, i), is_passing, rows))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_parse_never_panics(line in "[0-9a-z;.]{0,80}") {
        // Property: any line either parses or is rejected, never panics
        let first = TraceRecord::parse(&line, 0, "f", FormatVersion::V20);
        let second = TraceRecord::parse(&line, 0, "f", FormatVersion::V20);
        prop_assert_eq!(first.is_ok(), second.is_ok());
        if let (Ok(a), Ok(b)) = (first, second) {
            prop_assert_eq!(a.epoch(), b.epoch());
            prop_assert_eq!(a.latency, b.latency);
        }
    }

    #[test]
    fn prop_bad_integers_default_to_minus_one(garbage in "[a-z]{1,6}") {
        let line = format!("0;{};0;1;0;0;Call;A;B;0;;x", garbage);
        let record = TraceRecord::parse(&line, 0, "f", FormatVersion::V18).unwrap();
        prop_assert_eq!(record.latency, -1);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_sequence_numbers_run_one_to_n(rows in file_strategy()) {
        let log = build_log("f", true, &rows);

        let mut by_line_id: HashMap<String, Vec<u32>> = HashMap::new();
        for record in log.records() {
            by_line_id.entry(record.line_id()).or_default().push(record.sequence_number);
        }
        for sequence in by_line_id.values() {
            let expected: Vec<u32> = (1..=sequence.len() as u32).collect();
            prop_assert_eq!(sequence, &expected);
        }
    }

    #[test]
    fn prop_threads_numbered_by_first_sight(rows in file_strategy()) {
        let log = build_log("f", true, &rows);

        let mut seen: Vec<i64> = Vec::new();
        for record in log.records() {
            let position = match seen.iter().position(|t| *t == record.raw_thread_id) {
                Some(p) => p,
                None => {
                    seen.push(record.raw_thread_id);
                    seen.len() - 1
                }
            };
            prop_assert_eq!(record.thread_id, position as i64 + 1);
        }
    }

    #[test]
    fn prop_relative_pattern_starts_true(rows in file_strategy()) {
        let log = build_log("f", true, &rows);
        let records: Vec<TraceRecord> = log.records().cloned().collect();
        let pattern = relative_pattern(&records);

        prop_assert_eq!(pattern.len(), records.len());
        prop_assert!(pattern[0]);
    }

    #[test]
    fn prop_disjoint_symmetric(
        a in prop::collection::vec(0i64..100, 1..6),
        b in prop::collection::vec(0i64..100, 1..6),
    ) {
        let ra = TimeRange::from_latencies(a).unwrap();
        let rb = TimeRange::from_latencies(b).unwrap();
        prop_assert_eq!(ra.disjoint(&rb), rb.disjoint(&ra));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn prop_classification_complete(
        passing_files in prop::collection::vec(file_strategy(), 1..4),
        failing_files in prop::collection::vec(file_strategy(), 1..4),
        timing in any::<bool>(),
    ) {
        let passing = build_set("p", true, &passing_files);
        let failing = build_set("f", false, &failing_files);
        let (predicate, predicate_type) = if timing {
            (Predicate::Slow, PredicateType::Slow)
        } else {
            (Predicate::Relative, PredicateType::Relative)
        };

        let key = |r: &TraceRecord| if timing { r.epoch() } else { r.line_id() };
        let expected: HashSet<String> = passing
            .iter()
            .chain(&failing)
            .flat_map(|log| log.records().map(key).collect::<Vec<_>>())
            .collect();

        let nodes = classify(&passing, &failing, &predicate, true).unwrap();
        let seen: HashSet<String> = nodes.iter().map(|n| n.epoch.clone()).collect();
        prop_assert_eq!(nodes.len(), seen.len());
        prop_assert_eq!(&seen, &expected);

        let report = Report::new(predicate_type, nodes);
        prop_assert_eq!(report.total, expected.len());
        prop_assert_eq!(report.counts.iter().map(|c| c.count).sum::<usize>(), report.total);
    }
}
