//! RootFinder - differential trace analysis for flaky failures
//!
//! Given call traces from passing runs and from failing runs of the same
//! program, this library finds call sites whose behavior is consistent
//! within each set but differs between them. Behavior is judged by a
//! predicate: return value stability, expected value or exception, or
//! latency.

pub mod analysis;
pub mod callee_sets;
pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod ingest;
pub mod json_output;
pub mod log;
pub mod normalize;
pub mod parallel;
pub mod predicate;
pub mod record;
pub mod report;
pub mod structural;

#[cfg(test)]
mod test_support;

pub use analysis::{analyze, AnalysisOutcome, AnalysisRequest};
pub use error::{AnalysisError, Result};
