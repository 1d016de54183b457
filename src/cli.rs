//! CLI argument parsing for RootFinder

use crate::config::RecordSelection;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// What to print on stdout once results are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary (default)
    Text,
    /// The JSON outcome, as written to the output directory
    Json,
}

/// Record selection policy applied when a method name is given
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SelectionArg {
    /// Keep every record
    All,
    /// Keep records returning a bool or an int
    BoolIntOnly,
    /// Keep records whose callee contains the method name
    MethodOnly,
}

impl From<SelectionArg> for RecordSelection {
    fn from(arg: SelectionArg) -> Self {
        match arg {
            SelectionArg::All => RecordSelection::All,
            SelectionArg::BoolIntOnly => RecordSelection::BoolIntOnly,
            SelectionArg::MethodOnly => RecordSelection::MethodOnly,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "rootfinder")]
#[command(version)]
#[command(about = "Find call sites that behave consistently in passing runs but differently in failing runs", long_about = None)]
pub struct Cli {
    /// Directory holding traces of passing runs
    #[arg(long = "passing-dir", value_name = "DIR")]
    pub passing_dir: PathBuf,

    /// Directory holding traces of failing runs
    #[arg(long = "failing-dir", value_name = "DIR")]
    pub failing_dir: PathBuf,

    /// Predicate type: Relative, Absolute, Exception, Fast or Slow
    #[arg(short = 't', long = "type", value_name = "PREDICATE")]
    pub predicate_type: String,

    /// Predicate argument (expected value, expected exception or latency threshold)
    #[arg(short = 'v', long = "predicate-value", value_name = "VALUE")]
    pub predicate_values: Vec<String>,

    /// Trace format version (18, 19 or 20)
    #[arg(long = "format-version", value_name = "VERSION")]
    pub format_version: Option<String>,

    /// Method of interest for record selection
    #[arg(short = 'm', long = "method-name", value_name = "NAME")]
    pub method_name: Option<String>,

    /// Record selection policy
    #[arg(long = "selection", value_enum)]
    pub selection: Option<SelectionArg>,

    /// Only keep records whose callee contains this substring
    #[arg(short = 'k', long = "keyword", value_name = "KEYWORD")]
    pub keyword: Option<String>,

    /// Directory for JSON results and the callee listing
    #[arg(short = 'o', long = "output-dir", value_name = "DIR", default_value = "rootfinder-out")]
    pub output_dir: PathBuf,

    /// TOML configuration file (flags override its values)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Also write per-file verdicts under predicate_files/
    #[arg(long = "per-file")]
    pub per_file: bool,

    /// Build indices on a single thread
    #[arg(long = "sequential")]
    pub sequential: bool,

    /// Stdout format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [&str; 7] = [
        "rootfinder",
        "--passing-dir",
        "pass",
        "--failing-dir",
        "fail",
        "--type",
        "Relative",
    ];

    fn parse(extra: &[&str]) -> Cli {
        Cli::parse_from(REQUIRED.iter().chain(extra.iter()).copied())
    }

    #[test]
    fn test_cli_required_arguments() {
        let cli = parse(&[]);
        assert_eq!(cli.passing_dir, PathBuf::from("pass"));
        assert_eq!(cli.failing_dir, PathBuf::from("fail"));
        assert_eq!(cli.predicate_type, "Relative");
        assert!(cli.predicate_values.is_empty());
    }

    #[test]
    fn test_cli_missing_required() {
        assert!(Cli::try_parse_from(["rootfinder", "--passing-dir", "p"]).is_err());
    }

    #[test]
    fn test_cli_defaults() {
        let cli = parse(&[]);
        assert_eq!(cli.output_dir, PathBuf::from("rootfinder-out"));
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(cli.selection.is_none());
        assert!(cli.format_version.is_none());
        assert!(!cli.per_file);
        assert!(!cli.debug);
        assert!(!cli.sequential);
    }

    #[test]
    fn test_cli_predicate_value_repeatable() {
        let cli = parse(&["--predicate-value", "42", "-v", "extra"]);
        assert_eq!(cli.predicate_values, vec!["42", "extra"]);
    }

    #[test]
    fn test_cli_selection() {
        let cli = parse(&["--selection", "bool-int-only", "--method-name", "Connect"]);
        assert_eq!(cli.selection, Some(SelectionArg::BoolIntOnly));
        assert_eq!(
            RecordSelection::from(SelectionArg::BoolIntOnly),
            RecordSelection::BoolIntOnly
        );
        assert_eq!(cli.method_name.as_deref(), Some("Connect"));
    }

    #[test]
    fn test_cli_flags() {
        let cli = parse(&[
            "--per-file",
            "--debug",
            "--format",
            "json",
            "--format-version",
            "18",
            "--keyword",
            "Db.",
            "--config",
            "rf.toml",
        ]);
        assert!(cli.per_file);
        assert!(cli.debug);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.format_version.as_deref(), Some("18"));
        assert_eq!(cli.keyword.as_deref(), Some("Db."));
        assert_eq!(cli.config, Some(PathBuf::from("rf.toml")));
    }
}
