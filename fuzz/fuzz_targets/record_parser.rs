#![no_main]

use libfuzzer_sys::fuzz_target;
use rootfinder::config::AnalysisConfig;
use rootfinder::ingest::parse_trace_text;
use rootfinder::record::{FormatVersion, RecordParser};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Single lines under every layout: parse or reject, never panic
        for version in [FormatVersion::V18, FormatVersion::V19, FormatVersion::V20] {
            let parser = RecordParser::new(version);
            for (index, line) in input.lines().enumerate() {
                let _ = parser.parse_line(line, index, "fuzz");
            }
        }

        // Whole-file path including normalization
        let _ = parse_trace_text(input, "fuzz", &AnalysisConfig::default(), true);
    }
});
