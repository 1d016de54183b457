//! Classification benchmark
//!
//! Measures index construction plus classification over synthetic
//! collections, sequential against parallel phase 1.
//!
//! # Run Instructions
//!
//! ```bash
//! cargo bench --bench classification
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rootfinder::classify::classify;
use rootfinder::config::AnalysisConfig;
use rootfinder::ingest::parse_trace_text;
use rootfinder::log::Log;
use rootfinder::predicate::Predicate;
use rootfinder::record::FormatVersion;

const CALLEES: [&str; 8] = [
    "Db.Connect",
    "Db.Query",
    "Db.Close",
    "Net.Send",
    "Net.Recv",
    "Cache.Get",
    "Cache.Put",
    "Log.Write",
];

/// Synthetic V20 trace text with `lines` records over four threads
fn synthetic_trace(seed: usize, lines: usize) -> String {
    let mut text = String::from("#Header: synthetic\n");
    for i in 0..lines {
        let callee = CALLEES[(i * 7 + seed) % CALLEES.len()];
        let thread = 100 + (i % 4);
        let latency = 10 + ((i * 31 + seed * 17) % 90);
        let ret = if (i + seed) % 11 == 0 { "false" } else { "true" };
        text.push_str(&format!(
            "{};0;{};0;0;Call;Main;{};0;0;{};0;{};{};\n",
            i,
            thread,
            callee,
            i % 3,
            latency,
            ret
        ));
    }
    text
}

fn collection(files: usize, lines: usize, is_passing: bool) -> Vec<Log> {
    let config = AnalysisConfig {
        format_version: FormatVersion::V20,
        ..AnalysisConfig::default()
    };
    (0..files)
        .map(|seed| {
            let name = format!("run{}", seed);
            parse_trace_text(&synthetic_trace(seed, lines), &name, &config, is_passing)
        })
        .collect()
}

fn bench_classify(c: &mut Criterion) {
    let passing = collection(8, 2_000, true);
    let failing = collection(4, 2_000, false);

    let mut group = c.benchmark_group("classify");
    for (name, predicate) in [("relative", Predicate::Relative), ("slow", Predicate::Slow)] {
        for parallel in [false, true] {
            let id = format!("{}/{}", name, if parallel { "parallel" } else { "sequential" });
            group.bench_with_input(BenchmarkId::from_parameter(id), &predicate, |b, predicate| {
                b.iter(|| {
                    let nodes = classify(&passing, &failing, predicate, parallel).unwrap();
                    black_box(nodes);
                });
            });
        }
    }
    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let text = synthetic_trace(1, 5_000);
    let config = AnalysisConfig::default();

    c.bench_function("parse_trace_text_5k", |b| {
        b.iter(|| black_box(parse_trace_text(black_box(&text), "run", &config, true)));
    });
}

criterion_group!(benches, bench_classify, bench_parse);
criterion_main!(benches);
