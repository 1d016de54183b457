//! Trace record model and line parser
//!
//! One line of a trace file becomes one [`TraceRecord`]. Columns are
//! `;`-delimited and their positions depend on the [`FormatVersion`] that
//! produced the file. Integer columns are 32-bit and parsed permissively:
//! anything that does not parse, or does not fit, becomes `-1` rather than
//! failing the run.

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Value substituted for any integer column that fails to parse
pub const PERMISSIVE_INT_DEFAULT: i64 = -1;

/// Default marker for header lines, which never become records
pub const DEFAULT_HEADER_MARKER: &str = "#Header:";

/// Trace file format version (selects the column layout)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatVersion {
    V18,
    V19,
    #[default]
    V20,
}

impl FormatVersion {
    fn layout(self) -> &'static ColumnLayout {
        match self {
            FormatVersion::V18 => &V18_LAYOUT,
            FormatVersion::V19 | FormatVersion::V20 => &V19_LAYOUT,
        }
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatVersion::V18 => write!(f, "V18"),
            FormatVersion::V19 => write!(f, "V19"),
            FormatVersion::V20 => write!(f, "V20"),
        }
    }
}

impl FromStr for FormatVersion {
    type Err = AnalysisError;

    /// Accepts `18`, `v18`, `V18` or `T18` (and the same for 19/20)
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let digits = trimmed.trim_start_matches(&['v', 'V', 't', 'T'][..]);
        match digits {
            "18" => Ok(FormatVersion::V18),
            "19" => Ok(FormatVersion::V19),
            "20" => Ok(FormatVersion::V20),
            _ => Err(AnalysisError::UnknownFormatVersion(s.to_string())),
        }
    }
}

/// Column positions for one format version
#[derive(Debug)]
struct ColumnLayout {
    ticks: usize,
    latency: usize,
    parent_thread_id: usize,
    raw_thread_id: usize,
    request_id: usize,
    object_id: usize,
    entry_type: usize,
    caller: usize,
    callee: usize,
    il_offset: usize,
    line_number: Option<usize>,
    return_value: usize,
    exception: usize,
    /// Lines with fewer columns than this cannot be parsed
    required: usize,
}

static V18_LAYOUT: ColumnLayout = ColumnLayout {
    ticks: 0,
    latency: 1,
    parent_thread_id: 2,
    raw_thread_id: 3,
    request_id: 4,
    object_id: 5,
    entry_type: 6,
    caller: 7,
    callee: 8,
    il_offset: 9,
    line_number: None,
    return_value: 11,
    exception: 10,
    required: 9,
};

static V19_LAYOUT: ColumnLayout = ColumnLayout {
    ticks: 0,
    latency: 12,
    parent_thread_id: 8,
    raw_thread_id: 2,
    request_id: 9,
    object_id: 4,
    entry_type: 5,
    caller: 6,
    callee: 7,
    il_offset: 10,
    line_number: Some(11),
    return_value: 13,
    exception: 14,
    required: 13,
};

/// Kind tag of a return value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReturnKind {
    Bool,
    Int,
    String,
    Undefined,
    Inconsistent,
}

/// Return value recorded for a call
///
/// The raw text is authoritative for equality; `kind` is informational.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReturnValue {
    pub raw: String,
    pub kind: ReturnKind,
}

impl ReturnValue {
    /// Default policy: every value is a string
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            kind: ReturnKind::String,
        }
    }

    /// Typed inference: bool, then 32-bit int, else string
    pub fn inferred(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let kind = if raw.parse::<bool>().is_ok() {
            ReturnKind::Bool
        } else if raw.parse::<i32>().is_ok() {
            ReturnKind::Int
        } else {
            ReturnKind::String
        };
        Self { raw, kind }
    }

    /// Placeholder for a record without a return-value column
    pub fn undefined() -> Self {
        Self {
            raw: String::new(),
            kind: ReturnKind::Undefined,
        }
    }
}

impl Default for ReturnValue {
    fn default() -> Self {
        Self::undefined()
    }
}

impl fmt::Display for ReturnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ReturnKind::String => write!(f, "\"{}\"", self.raw),
            _ => write!(f, "{}", self.raw),
        }
    }
}

/// (caller, callee) identity of a record
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CallPair {
    pub caller: String,
    pub callee: String,
}

impl fmt::Display for CallPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.caller, self.callee)
    }
}

/// One parsed trace line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceRecord {
    /// 0-based index of the line in its source file
    pub line_index: usize,
    pub ticks: i64,
    pub latency: i64,
    pub parent_thread_id: i64,
    /// Thread id as written by the tracer
    pub raw_thread_id: i64,
    /// First-seen ordinal of `raw_thread_id` within the file (0 until normalized)
    pub thread_id: i64,
    pub request_id: i64,
    pub object_id: i64,
    pub entry_type: String,
    pub caller: String,
    pub callee: String,
    pub il_offset: i64,
    pub line_number: i64,
    pub exception: Option<String>,
    pub return_value: ReturnValue,
    pub format_version: FormatVersion,
    pub file_name: String,
    /// Occurrence count of this record's line id within the file (0 until normalized)
    pub sequence_number: u32,
}

impl TraceRecord {
    /// Parse one line with string-typed return values
    pub fn parse(
        line: &str,
        line_index: usize,
        file_name: &str,
        version: FormatVersion,
    ) -> Result<Self> {
        Self::parse_with(line, line_index, file_name, version, false)
    }

    /// Parse one line, optionally inferring return value kinds
    pub fn parse_with(
        line: &str,
        line_index: usize,
        file_name: &str,
        version: FormatVersion,
        infer_return_types: bool,
    ) -> Result<Self> {
        let columns: Vec<&str> = line.split(';').collect();
        let layout = version.layout();

        if columns.len() < layout.required {
            return Err(AnalysisError::MalformedRecord {
                line_index,
                columns: columns.len(),
                required: layout.required,
            });
        }

        let int_at = |idx: usize| parse_int(columns[idx]);
        let opt_int_at = |idx: usize| columns.get(idx).map(|c| parse_int(c)).unwrap_or(0);

        let return_value = match columns.get(layout.return_value) {
            Some(raw) if infer_return_types => ReturnValue::inferred(*raw),
            Some(raw) => ReturnValue::new(*raw),
            None => ReturnValue::undefined(),
        };

        Ok(Self {
            line_index,
            ticks: int_at(layout.ticks),
            latency: int_at(layout.latency),
            parent_thread_id: int_at(layout.parent_thread_id),
            raw_thread_id: int_at(layout.raw_thread_id),
            thread_id: 0,
            request_id: int_at(layout.request_id),
            object_id: int_at(layout.object_id),
            entry_type: columns[layout.entry_type].to_string(),
            caller: columns[layout.caller].to_string(),
            callee: columns[layout.callee].to_string(),
            il_offset: opt_int_at(layout.il_offset),
            line_number: layout.line_number.map(opt_int_at).unwrap_or(0),
            exception: columns.get(layout.exception).map(|s| s.to_string()),
            return_value,
            format_version: version,
            file_name: file_name.to_string(),
            sequence_number: 0,
        })
    }

    /// Call-site identity independent of occurrence count
    ///
    /// Format: `offset:thread:caller:callee`
    pub fn line_id(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.il_offset, self.thread_id, self.caller, self.callee
        )
    }

    /// One specific occurrence of the call site: `line_id:sequence`
    pub fn epoch(&self) -> String {
        format!("{}:{}", self.line_id(), self.sequence_number)
    }

    pub fn call_pair(&self) -> CallPair {
        CallPair {
            caller: self.caller.clone(),
            callee: self.callee.clone(),
        }
    }

    /// True if both records call the same callee from the same caller
    pub fn same_call(&self, other: &TraceRecord) -> bool {
        self.caller == other.caller && self.callee == other.callee
    }
}

// Record equality is (caller, callee) only: used for distinct-call
// bookkeeping, never for epoch identity.
impl PartialEq for TraceRecord {
    fn eq(&self, other: &Self) -> bool {
        self.same_call(other)
    }
}

impl Eq for TraceRecord {}

impl Hash for TraceRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.caller.hash(state);
        self.callee.hash(state);
    }
}

fn parse_int(value: &str) -> i64 {
    value
        .trim()
        .parse::<i32>()
        .map(i64::from)
        .unwrap_or(PERMISSIVE_INT_DEFAULT)
}

/// Line parser carrying the per-run format settings
#[derive(Debug, Clone)]
pub struct RecordParser {
    pub version: FormatVersion,
    pub header_marker: String,
    pub infer_return_types: bool,
}

impl RecordParser {
    pub fn new(version: FormatVersion) -> Self {
        Self {
            version,
            header_marker: DEFAULT_HEADER_MARKER.to_string(),
            infer_return_types: false,
        }
    }

    /// Parse a line; header and blank lines yield `Ok(None)`
    pub fn parse_line(
        &self,
        line: &str,
        line_index: usize,
        file_name: &str,
    ) -> Result<Option<TraceRecord>> {
        if line.starts_with(&self.header_marker) || line.trim().is_empty() {
            return Ok(None);
        }
        TraceRecord::parse_with(
            line,
            line_index,
            file_name,
            self.version,
            self.infer_return_types,
        )
        .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const V20_LINE: &str =
        "1000;x;42;y;7;Call;Caller.M;Callee.N;3;9;12;55;250;true;IOException";
    const V18_LINE: &str = "1000;250;3;42;9;7;Call;Caller.M;Callee.N;12;Boom;false";

    #[test]
    fn test_parse_v20_layout() {
        let r = TraceRecord::parse(V20_LINE, 4, "a.log", FormatVersion::V20).unwrap();
        assert_eq!(r.line_index, 4);
        assert_eq!(r.ticks, 1000);
        assert_eq!(r.raw_thread_id, 42);
        assert_eq!(r.object_id, 7);
        assert_eq!(r.entry_type, "Call");
        assert_eq!(r.caller, "Caller.M");
        assert_eq!(r.callee, "Callee.N");
        assert_eq!(r.parent_thread_id, 3);
        assert_eq!(r.request_id, 9);
        assert_eq!(r.il_offset, 12);
        assert_eq!(r.line_number, 55);
        assert_eq!(r.latency, 250);
        assert_eq!(r.return_value.raw, "true");
        assert_eq!(r.return_value.kind, ReturnKind::String);
        assert_eq!(r.exception.as_deref(), Some("IOException"));
        assert_eq!(r.file_name, "a.log");
    }

    #[test]
    fn test_parse_v18_layout() {
        let r = TraceRecord::parse(V18_LINE, 0, "b.log", FormatVersion::V18).unwrap();
        assert_eq!(r.ticks, 1000);
        assert_eq!(r.latency, 250);
        assert_eq!(r.parent_thread_id, 3);
        assert_eq!(r.raw_thread_id, 42);
        assert_eq!(r.request_id, 9);
        assert_eq!(r.object_id, 7);
        assert_eq!(r.caller, "Caller.M");
        assert_eq!(r.callee, "Callee.N");
        assert_eq!(r.il_offset, 12);
        assert_eq!(r.exception.as_deref(), Some("Boom"));
        assert_eq!(r.return_value.raw, "false");
        assert_eq!(r.line_number, 0);
    }

    #[test]
    fn test_unparsable_integers_default_to_minus_one() {
        // Column 1 and 3 of the V20 line are "x" and "y"
        let line = "abc;x;zz;y;7;Call;A;B;p;q;r;s;t";
        let r = TraceRecord::parse(line, 0, "f", FormatVersion::V20).unwrap();
        assert_eq!(r.ticks, -1);
        assert_eq!(r.raw_thread_id, -1);
        assert_eq!(r.parent_thread_id, -1);
        assert_eq!(r.request_id, -1);
        assert_eq!(r.il_offset, -1);
        assert_eq!(r.line_number, -1);
        assert_eq!(r.latency, -1);
    }

    #[test]
    fn test_out_of_range_integers_default_to_minus_one() {
        let line = "9223372036854775807;2147483648;0;-2147483648;0;0;Call;A;B;2147483647;;x";
        let r = TraceRecord::parse(line, 0, "f", FormatVersion::V18).unwrap();
        assert_eq!(r.ticks, -1);
        assert_eq!(r.latency, -1);
        assert_eq!(r.raw_thread_id, i64::from(i32::MIN));
        assert_eq!(r.il_offset, i64::from(i32::MAX));
    }

    #[test]
    fn test_missing_optional_columns_use_defaults() {
        let line = "1;2;3;4;5;6;Call;A;B";
        let r = TraceRecord::parse(line, 0, "f", FormatVersion::V18).unwrap();
        assert_eq!(r.il_offset, 0);
        assert_eq!(r.exception, None);
        assert_eq!(r.return_value, ReturnValue::undefined());
    }

    #[test]
    fn test_too_few_columns_is_malformed() {
        let err = TraceRecord::parse("1;2;3", 8, "f", FormatVersion::V20).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::MalformedRecord {
                line_index: 8,
                columns: 3,
                required: 13
            }
        );
    }

    #[test]
    fn test_line_id_and_epoch() {
        let mut r = TraceRecord::parse(V20_LINE, 0, "a", FormatVersion::V20).unwrap();
        r.thread_id = 1;
        r.sequence_number = 2;
        assert_eq!(r.line_id(), "12:1:Caller.M:Callee.N");
        assert_eq!(r.epoch(), "12:1:Caller.M:Callee.N:2");
    }

    #[test]
    fn test_equality_is_caller_callee_only() {
        let a = TraceRecord::parse(V20_LINE, 0, "a", FormatVersion::V20).unwrap();
        let mut b = TraceRecord::parse(V20_LINE, 9, "b", FormatVersion::V20).unwrap();
        b.il_offset = 99;
        b.latency = 1;
        assert_eq!(a, b);

        let mut c = a.clone();
        c.callee = "Other".to_string();
        assert_ne!(a, c);
    }

    #[test]
    fn test_inferred_return_kinds() {
        assert_eq!(ReturnValue::inferred("true").kind, ReturnKind::Bool);
        assert_eq!(ReturnValue::inferred("-12").kind, ReturnKind::Int);
        assert_eq!(ReturnValue::inferred("hello").kind, ReturnKind::String);
        assert_eq!(ReturnValue::new("true").kind, ReturnKind::String);
    }

    #[test]
    fn test_return_value_display_quotes_strings() {
        assert_eq!(ReturnValue::new("1").to_string(), "\"1\"");
        assert_eq!(ReturnValue::inferred("1").to_string(), "1");
    }

    #[test]
    fn test_format_version_from_str() {
        assert_eq!("18".parse::<FormatVersion>().unwrap(), FormatVersion::V18);
        assert_eq!("v19".parse::<FormatVersion>().unwrap(), FormatVersion::V19);
        assert_eq!("T20".parse::<FormatVersion>().unwrap(), FormatVersion::V20);
        assert!("21".parse::<FormatVersion>().is_err());
    }

    #[test]
    fn test_parser_skips_header_and_blank_lines() {
        let parser = RecordParser::new(FormatVersion::V20);
        assert!(parser
            .parse_line("#Header: ticks;...", 0, "f")
            .unwrap()
            .is_none());
        assert!(parser.parse_line("   ", 1, "f").unwrap().is_none());
        assert!(parser.parse_line(V20_LINE, 2, "f").unwrap().is_some());
    }
}
