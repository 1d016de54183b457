// Analysis configuration
//
// Everything that used to be process-wide (format version, record selection,
// header marker) travels as a value through the pipeline. Loadable from a
// TOML file; command-line flags override what the file sets.

use crate::record::{FormatVersion, RecordParser, ReturnKind, TraceRecord, DEFAULT_HEADER_MARKER};
use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default pattern for trace file names
pub const DEFAULT_FILE_PATTERN: &str = r"\.torchlog\.decompressed";

/// Which records survive parsing when a method name is configured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSelection {
    /// Keep everything
    All,
    /// Keep records whose return value is a bool or an int
    BoolIntOnly,
    /// Keep records whose callee contains the method name
    #[default]
    MethodOnly,
}

/// Configuration for one analysis run
///
/// # Example
/// ```
/// use rootfinder::config::AnalysisConfig;
///
/// let config = AnalysisConfig::default();
/// assert_eq!(config.header_marker, "#Header:");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Column layout of the input files
    pub format_version: FormatVersion,

    /// Record selection policy, only applied when `method_name` is set
    pub selection: RecordSelection,

    /// Method of interest
    pub method_name: Option<String>,

    /// Lines starting with this marker are headers
    pub header_marker: String,

    /// Regex matched against file names during discovery
    pub file_pattern: String,

    /// Tag return values as Bool/Int/String instead of String only
    pub infer_return_types: bool,

    /// Parse files and build partial indices on scoped threads
    pub parallel: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            format_version: FormatVersion::default(),
            selection: RecordSelection::default(),
            method_name: None,
            header_marker: DEFAULT_HEADER_MARKER.to_string(),
            file_pattern: DEFAULT_FILE_PATTERN.to_string(),
            infer_return_types: false,
            parallel: true,
        }
    }
}

impl AnalysisConfig {
    /// Load a configuration from a TOML file; missing keys take defaults
    ///
    /// # Example TOML
    /// ```toml
    /// format_version = "v19"
    /// selection = "bool_int_only"
    /// method_name = "Connect"
    /// ```
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read config file: {}", path.as_ref().display())
        })?;

        let config: AnalysisConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML analysis config")?;
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", path.as_ref().display(), e))?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.header_marker.is_empty() {
            return Err("header_marker must not be empty".to_string());
        }

        if let Err(e) = Regex::new(&self.file_pattern) {
            return Err(format!("file_pattern is not a valid regex: {}", e));
        }

        if matches!(&self.method_name, Some(name) if name.trim().is_empty()) {
            return Err("method_name must not be blank".to_string());
        }

        Ok(())
    }

    pub fn file_regex(&self) -> Result<Regex> {
        Regex::new(&self.file_pattern)
            .with_context(|| format!("Invalid file pattern: {}", self.file_pattern))
    }

    /// Line parser for this configuration
    ///
    /// Bool/Int selection needs typed return values, so it forces inference.
    pub fn record_parser(&self) -> RecordParser {
        RecordParser {
            version: self.format_version,
            header_marker: self.header_marker.clone(),
            infer_return_types: self.infer_return_types
                || self.selection == RecordSelection::BoolIntOnly,
        }
    }

    /// Whether a parsed record survives the selection policy
    pub fn keeps(&self, record: &TraceRecord) -> bool {
        let Some(method) = &self.method_name else {
            return true;
        };
        match self.selection {
            RecordSelection::All => true,
            RecordSelection::MethodOnly => record.callee.contains(method.as_str()),
            RecordSelection::BoolIntOnly => matches!(
                record.return_value.kind,
                ReturnKind::Bool | ReturnKind::Int
            ),
        }
    }
}
