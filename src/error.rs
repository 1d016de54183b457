//! Error type for the analysis core
//!
//! Parsing never fails on bad numbers (those default to -1), so the variants
//! here are contract violations: unknown predicates, missing predicate
//! arguments, reductions a predicate cannot perform, or lines too short to
//! carry the required columns.

use crate::predicate::PredicateType;
use thiserror::Error;

/// Errors raised by the analysis core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Unrecognized predicate type: {0}")]
    UnrecognizedPredicate(String),

    #[error("Predicate {predicate} requires argument <{argument}>")]
    MissingPredicateArgument {
        predicate: PredicateType,
        argument: &'static str,
    },

    #[error("Invalid argument '{value}' for predicate {predicate}: {reason}")]
    InvalidPredicateArgument {
        predicate: PredicateType,
        value: String,
        reason: String,
    },

    #[error("Predicate {predicate} does not reduce to a per-occurrence verdict")]
    UnsupportedReduction { predicate: PredicateType },

    #[error("Cannot reduce epoch {epoch}: no occurrences accumulated")]
    EmptyAccumulator { epoch: String },

    #[error("Structural diff needs at least one passing log as reference")]
    EmptyReferenceCollection,

    #[error("Unknown trace format version: {0} (expected 18, 19 or 20)")]
    UnknownFormatVersion(String),

    #[error("Malformed record at line {line_index}: {columns} columns, need at least {required}")]
    MalformedRecord {
        line_index: usize,
        columns: usize,
        required: usize,
    },
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
