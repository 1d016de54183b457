//! JSON output for analysis results
//!
//! Layout under the output directory:
//! - `<Predicate>.json`: the full outcome wrapped in a versioned envelope
//! - `CalleeList.txt`: callee set listing
//! - `predicate_files/<stem>.json`: optional per-file verdicts

use crate::analysis::AnalysisOutcome;
use crate::classify::FileVerdicts;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CALLEE_LIST_FILE: &str = "CalleeList.txt";
pub const PER_FILE_DIR: &str = "predicate_files";

/// Root JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<'a, T: Serialize> {
    /// Format version identifier
    pub version: String,
    /// Format name
    pub format: String,
    #[serde(flatten)]
    pub body: &'a T,
}

impl<'a, T: Serialize> JsonOutput<'a, T> {
    pub fn new(body: &'a T) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "rootfinder-json-v1".to_string(),
            body,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize JSON output")
    }
}

fn write_json<T: Serialize>(path: &Path, body: &T) -> Result<()> {
    let json = JsonOutput::new(body).to_json()?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

/// Write the outcome and callee listing; returns the paths written
pub fn write_outcome(outcome: &AnalysisOutcome, output_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir).with_context(|| {
        format!("Failed to create output directory: {}", output_dir.display())
    })?;

    let report_path = output_dir.join(format!("{}.json", outcome.report.predicate));
    write_json(&report_path, outcome)?;

    let callee_path = output_dir.join(CALLEE_LIST_FILE);
    fs::write(&callee_path, outcome.callee_sets.to_report_string())
        .with_context(|| format!("Failed to write {}", callee_path.display()))?;

    tracing::info!("wrote {} and {}", report_path.display(), callee_path.display());
    Ok(vec![report_path, callee_path])
}

/// Output name for a trace file: its file name up to the first `.`
pub fn file_stem(file_name: &str) -> String {
    let base = Path::new(file_name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());
    match base.split_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => base,
    }
}

/// Write one JSON file per trace file under `predicate_files/`
pub fn write_per_file_verdicts(
    listing: &[FileVerdicts],
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let dir = output_dir.join(PER_FILE_DIR);
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let mut written = Vec::with_capacity(listing.len());
    for verdicts in listing {
        let path = dir.join(format!("{}.json", file_stem(&verdicts.file_name)));
        write_json(&path, verdicts)?;
        written.push(path);
    }
    tracing::debug!("wrote {} per-file verdict listings", written.len());
    Ok(written)
}
