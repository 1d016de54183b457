//! Analysis entry point
//!
//! Binds the predicate, checks both collections are non-empty, runs the
//! structural diff and the classifier, and bundles everything into an
//! [`AnalysisOutcome`]. Writing the outcome to disk is the caller's job.

use crate::callee_sets::CalleeSets;
use crate::classify::classify;
use crate::error::Result;
use crate::log::Log;
use crate::predicate::{Predicate, PredicateType};
use crate::report::Report;
use crate::structural::{StructuralDiff, StructuralSummary};
use serde::Serialize;
use std::path::PathBuf;

/// Inputs for one analysis run
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub passing: Vec<Log>,
    pub failing: Vec<Log>,
    pub predicate_type: PredicateType,
    pub predicate_args: Vec<String>,
    /// Where the caller intends to write results
    pub output_dir: PathBuf,
}

/// Everything one run produces
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    pub report: Report,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structural: Option<StructuralSummary>,
    pub callee_sets: CalleeSets,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl AnalysisOutcome {
    pub fn is_skipped(&self) -> bool {
        self.diagnostic.is_some()
    }
}

/// Names the empty side(s), or `None` when both collections have logs
fn missing_collections(request: &AnalysisRequest) -> Option<String> {
    let missing: Vec<&str> = [
        (request.passing.is_empty(), "passing"),
        (request.failing.is_empty(), "failing"),
    ]
    .into_iter()
    .filter_map(|(empty, side)| empty.then_some(side))
    .collect();

    if missing.is_empty() {
        return None;
    }
    Some(format!("no logs found for {} set", missing.join(" and ")))
}

/// Run the analysis with parallel index construction
pub fn analyze(request: &AnalysisRequest) -> Result<AnalysisOutcome> {
    analyze_with(request, true)
}

/// Run the analysis
///
/// Predicate errors surface before anything else, so a bad request never
/// yields a partial report. An empty collection is not an error: the
/// outcome is skipped and carries a diagnostic.
pub fn analyze_with(request: &AnalysisRequest, parallel: bool) -> Result<AnalysisOutcome> {
    let predicate = Predicate::from_args(request.predicate_type, &request.predicate_args)?;
    let callee_sets = CalleeSets::from_logs(&request.passing, &request.failing);

    if let Some(diagnostic) = missing_collections(request) {
        tracing::warn!("skipping {} classification: {}", request.predicate_type, diagnostic);
        return Ok(AnalysisOutcome {
            report: Report::skipped(request.predicate_type, diagnostic.clone()),
            structural: None,
            callee_sets,
            diagnostic: Some(diagnostic),
        });
    }

    tracing::info!(
        "analyzing {} passing and {} failing logs under {}",
        request.passing.len(),
        request.failing.len(),
        request.predicate_type
    );

    let structural = StructuralDiff::new(&request.passing, &request.failing)?.summary();
    let nodes = classify(&request.passing, &request.failing, &predicate, parallel)?;
    let report = Report::new(request.predicate_type, nodes);

    Ok(AnalysisOutcome {
        report,
        structural: Some(structural),
        callee_sets,
        diagnostic: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use crate::report::ClassificationKind;
    use crate::test_support::log_of;

    fn request(
        passing: Vec<Log>,
        failing: Vec<Log>,
        predicate_type: PredicateType,
        args: &[&str],
    ) -> AnalysisRequest {
        AnalysisRequest {
            passing,
            failing,
            predicate_type,
            predicate_args: args.iter().map(|s| s.to_string()).collect(),
            output_dir: PathBuf::from("out"),
        }
    }

    fn sample_passing() -> Vec<Log> {
        vec![log_of("p1", true, &[("A", "B", 10, "1"), ("A", "C", 10, "1")])]
    }

    #[test]
    fn test_zero_failing_files_skips() {
        let outcome =
            analyze(&request(sample_passing(), Vec::new(), PredicateType::Relative, &[])).unwrap();

        assert!(outcome.is_skipped());
        assert_eq!(outcome.report.total, 0);
        assert!(outcome.structural.is_none());
        assert_eq!(
            outcome.diagnostic.as_deref(),
            Some("no logs found for failing set")
        );
        assert_eq!(outcome.report.diagnostic, outcome.diagnostic);
    }

    #[test]
    fn test_both_collections_empty() {
        let outcome = analyze(&request(Vec::new(), Vec::new(), PredicateType::Slow, &[])).unwrap();
        assert_eq!(
            outcome.diagnostic.as_deref(),
            Some("no logs found for passing and failing set")
        );
    }

    #[test]
    fn test_missing_argument_fails_before_skip() {
        let err = analyze(&request(Vec::new(), Vec::new(), PredicateType::Absolute, &[]))
            .unwrap_err();
        assert!(matches!(err, AnalysisError::MissingPredicateArgument { .. }));
    }

    #[test]
    fn test_full_run() {
        let failing = vec![log_of("f1", false, &[("A", "B", 10, "1"), ("A", "D", 10, "1")])];
        let outcome = analyze_with(
            &request(sample_passing(), failing, PredicateType::Absolute, &["1"]),
            false,
        )
        .unwrap();

        assert!(!outcome.is_skipped());
        let report = &outcome.report;
        assert_eq!(report.total, 3);
        assert_eq!(report.count(ClassificationKind::ConsistentAndMatching), 1);
        assert_eq!(
            report.count(ClassificationKind::ConsistentButDifferentMissingInFailing),
            1
        );
        assert_eq!(
            report.count(ClassificationKind::ConsistentButDifferentMissingInPassing),
            1
        );

        let structural = outcome.structural.unwrap();
        assert_eq!(structural.reference_file, "p1");
        assert_eq!(structural.first_divergences.len(), 1);
        let note = structural.annotations.get("p1").unwrap();
        assert!(note.compared.contains("f1"));

        assert!(outcome.callee_sets.only_in_passing.contains("C"));
        assert!(outcome.callee_sets.only_in_failing.contains("D"));
    }
}
