use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Predicate selector as named on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredicateType {
    Relative,
    Absolute,
    Exception,
    Fast,
    Slow,
}

impl PredicateType {
    pub const ALL: [PredicateType; 5] = [
        PredicateType::Relative,
        PredicateType::Absolute,
        PredicateType::Exception,
        PredicateType::Fast,
        PredicateType::Slow,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PredicateType::Relative => "Relative",
            PredicateType::Absolute => "Absolute",
            PredicateType::Exception => "Exception",
            PredicateType::Fast => "Fast",
            PredicateType::Slow => "Slow",
        }
    }
}

impl fmt::Display for PredicateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PredicateType {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        PredicateType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AnalysisError::UnrecognizedPredicate(s.to_string()))
    }
}

/// Which classification algorithm a predicate feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClassificationMode {
    /// Signature comparison, keyed by line id
    Signature,
    /// Latency range comparison, keyed by epoch
    Timing,
}

impl ClassificationMode {
    pub fn for_predicate(predicate: PredicateType) -> Self {
        match predicate {
            PredicateType::Fast | PredicateType::Slow => ClassificationMode::Timing,
            _ => ClassificationMode::Signature,
        }
    }
}

/// A predicate with its arguments bound
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Predicate {
    Relative,
    Absolute { expected: String },
    Exception { expected: String },
    Fast { threshold: i64 },
    Slow,
}

impl Predicate {
    /// Bind a predicate type to its arguments
    ///
    /// Absolute and Exception need the expected value, Fast needs an integer
    /// latency threshold. Extra arguments are ignored.
    pub fn from_args(predicate: PredicateType, args: &[String]) -> Result<Self> {
        let first = |argument: &'static str| {
            args.first()
                .cloned()
                .ok_or(AnalysisError::MissingPredicateArgument {
                    predicate,
                    argument,
                })
        };

        match predicate {
            PredicateType::Relative => Ok(Predicate::Relative),
            PredicateType::Absolute => Ok(Predicate::Absolute {
                expected: first("expected-value")?,
            }),
            PredicateType::Exception => Ok(Predicate::Exception {
                expected: first("expected-exception")?,
            }),
            PredicateType::Fast => {
                let value = first("threshold-latency")?;
                let threshold = value.trim().parse::<i64>().map_err(|e| {
                    AnalysisError::InvalidPredicateArgument {
                        predicate,
                        value: value.clone(),
                        reason: e.to_string(),
                    }
                })?;
                Ok(Predicate::Fast { threshold })
            }
            PredicateType::Slow => Ok(Predicate::Slow),
        }
    }

    pub fn predicate_type(&self) -> PredicateType {
        match self {
            Predicate::Relative => PredicateType::Relative,
            Predicate::Absolute { .. } => PredicateType::Absolute,
            Predicate::Exception { .. } => PredicateType::Exception,
            Predicate::Fast { .. } => PredicateType::Fast,
            Predicate::Slow => PredicateType::Slow,
        }
    }

    pub fn mode(&self) -> ClassificationMode {
        ClassificationMode::for_predicate(self.predicate_type())
    }
}
