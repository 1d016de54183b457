//! Trace file discovery and loading
//!
//! A collection is a directory tree; every file whose name matches the
//! configured pattern becomes one [`Log`]. Files are parsed on scoped threads
//! and come back in sorted path order.

use crate::config::AnalysisConfig;
use crate::log::{Log, SingletonGrouping};
use crate::parallel::map_ordered;
use anyhow::{bail, Context, Result};
use regex::Regex;
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively collect files under `dir` whose file name matches `pattern`
///
/// Sorted for determinism. An empty result is not an error.
pub fn discover_trace_files(dir: &Path, pattern: &Regex) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("Trace directory not found: {}", dir.display());
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| pattern.is_match(&e.file_name().to_string_lossy()))
        .map(|e| e.into_path())
        .collect();
    files.sort();

    tracing::info!("discovered {} trace files in {}", files.len(), dir.display());
    Ok(files)
}

/// Parse the text of one trace file into a normalized log
///
/// A leading byte-order mark is ignored. Lines that are too short to parse
/// are skipped with a warning.
pub fn parse_trace_text(
    text: &str,
    file_name: &str,
    config: &AnalysisConfig,
    is_passing: bool,
) -> Log {
    let parser = config.record_parser();
    let mut records = Vec::new();
    let mut skipped = 0usize;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    for (line_index, line) in text.lines().enumerate() {
        match parser.parse_line(line, line_index, file_name) {
            Ok(Some(record)) if config.keeps(&record) => records.push(record),
            Ok(_) => {}
            Err(e) => {
                skipped += 1;
                tracing::warn!("{}: skipping line: {}", file_name, e);
            }
        }
    }

    tracing::debug!(
        "{}: {} records kept, {} lines skipped",
        file_name,
        records.len(),
        skipped
    );
    Log::build(file_name, is_passing, records, &SingletonGrouping)
}

/// Read and parse one trace file; the path string is the file's identity
///
/// Invalid UTF-8 is replaced rather than failing the file.
pub fn load_trace_file(path: &Path, config: &AnalysisConfig, is_passing: bool) -> Result<Log> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read trace file: {}", path.display()))?;
    let text = String::from_utf8_lossy(&bytes);
    if let Cow::Owned(_) = text {
        tracing::warn!("{}: replaced invalid UTF-8 sequences", path.display());
    }
    Ok(parse_trace_text(
        &text,
        &path.display().to_string(),
        config,
        is_passing,
    ))
}

/// Load files in input order, in parallel when the config allows
pub fn load_logs(
    files: &[PathBuf],
    config: &AnalysisConfig,
    is_passing: bool,
) -> Result<Vec<Log>> {
    map_ordered(files, config.parallel, |path| {
        load_trace_file(path, config, is_passing)
    })
    .into_iter()
    .collect()
}

/// Discover and load one collection
pub fn load_collection(
    dir: &Path,
    config: &AnalysisConfig,
    is_passing: bool,
) -> Result<Vec<Log>> {
    let pattern = config.file_regex()?;
    let files = discover_trace_files(dir, &pattern)?;
    let logs = load_logs(&files, config, is_passing)?;
    tracing::info!(
        "loaded {} {} logs",
        logs.len(),
        if is_passing { "passing" } else { "failing" }
    );
    Ok(logs)
}
