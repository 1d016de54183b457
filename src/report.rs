//! Classification results grouped and ranked for output
//!
//! Nodes arrive from the classifier in production order. The report groups
//! them by kind, ranks each group from 1, and keeps per-kind counts so a
//! reader can check `total == sum(counts)` at a glance.

use crate::predicate::{EpochAccumulator, PredicateType};
use serde::Serialize;
use std::fmt;

/// Outcome of comparing one epoch key across the two collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ClassificationKind {
    InconsistentInPassing,
    InconsistentInFailing,
    ConsistentAndMatching,
    ConsistentButDifferent,
    ConsistentButDifferentMissingInFailing,
    ConsistentButDifferentMissingInPassing,
}

impl ClassificationKind {
    /// Group order in reports, most interesting first
    pub const REPORT_ORDER: [ClassificationKind; 6] = [
        ClassificationKind::ConsistentButDifferent,
        ClassificationKind::ConsistentButDifferentMissingInFailing,
        ClassificationKind::ConsistentButDifferentMissingInPassing,
        ClassificationKind::InconsistentInPassing,
        ClassificationKind::InconsistentInFailing,
        ClassificationKind::ConsistentAndMatching,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ClassificationKind::InconsistentInPassing => "InconsistentInPassing",
            ClassificationKind::InconsistentInFailing => "InconsistentInFailing",
            ClassificationKind::ConsistentAndMatching => "ConsistentAndMatching",
            ClassificationKind::ConsistentButDifferent => "ConsistentButDifferent",
            ClassificationKind::ConsistentButDifferentMissingInFailing => {
                "ConsistentButDifferentMissingInFailing"
            }
            ClassificationKind::ConsistentButDifferentMissingInPassing => {
                "ConsistentButDifferentMissingInPassing"
            }
        }
    }

    /// Fixed human-readable explanation carried on every node of this kind
    pub fn message(self) -> &'static str {
        match self {
            ClassificationKind::InconsistentInPassing => {
                "Behavior varies across passing runs"
            }
            ClassificationKind::InconsistentInFailing => {
                "Behavior varies across failing runs"
            }
            ClassificationKind::ConsistentAndMatching => {
                "Consistent within each set and identical across sets"
            }
            ClassificationKind::ConsistentButDifferent => {
                "Consistent within each set but different between passing and failing runs"
            }
            ClassificationKind::ConsistentButDifferentMissingInFailing => {
                "Consistent in passing runs and never observed in failing runs"
            }
            ClassificationKind::ConsistentButDifferentMissingInPassing => {
                "Consistent in failing runs and never observed in passing runs"
            }
        }
    }
}

impl fmt::Display for ClassificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Envelope of the latencies behind a timing classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimingSummary {
    pub min: i64,
    pub max: i64,
    pub duration: i64,
}

/// One classified epoch key
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationNode {
    pub epoch: String,
    pub kind: ClassificationKind,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub passing: Vec<EpochAccumulator>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failing: Vec<EpochAccumulator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passing_signature: Option<Vec<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failing_signature: Option<Vec<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing: Option<TimingSummary>,
}

impl ClassificationNode {
    pub fn new(
        kind: ClassificationKind,
        epoch: impl Into<String>,
        passing: Vec<EpochAccumulator>,
        failing: Vec<EpochAccumulator>,
    ) -> Self {
        Self {
            epoch: epoch.into(),
            kind,
            message: kind.message(),
            passing,
            failing,
            passing_signature: None,
            failing_signature: None,
            timing: None,
        }
    }

    pub fn with_signatures(
        mut self,
        passing: Option<Vec<bool>>,
        failing: Option<Vec<bool>>,
    ) -> Self {
        self.passing_signature = passing;
        self.failing_signature = failing;
        self
    }

    pub fn with_timing(mut self, timing: Option<TimingSummary>) -> Self {
        self.timing = timing;
        self
    }
}

/// Node with its 1-based rank inside its group
#[derive(Debug, Clone, Serialize)]
pub struct RankedNode {
    pub rank: usize,
    #[serde(flatten)]
    pub node: ClassificationNode,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportGroup {
    pub kind: ClassificationKind,
    pub message: &'static str,
    pub nodes: Vec<RankedNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KindCount {
    pub kind: ClassificationKind,
    pub count: usize,
}

/// Ranked classification report for one predicate
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub predicate: PredicateType,
    pub total: usize,
    pub counts: Vec<KindCount>,
    pub groups: Vec<ReportGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl Report {
    /// Group nodes by kind in report order; ranks follow production order
    pub fn new(predicate: PredicateType, nodes: Vec<ClassificationNode>) -> Self {
        let total = nodes.len();
        let mut groups: Vec<ReportGroup> = ClassificationKind::REPORT_ORDER
            .iter()
            .map(|&kind| ReportGroup {
                kind,
                message: kind.message(),
                nodes: Vec::new(),
            })
            .collect();

        for node in nodes {
            if let Some(group) = groups.iter_mut().find(|g| g.kind == node.kind) {
                let rank = group.nodes.len() + 1;
                group.nodes.push(RankedNode { rank, node });
            }
        }

        let counts = groups
            .iter()
            .map(|g| KindCount {
                kind: g.kind,
                count: g.nodes.len(),
            })
            .collect();

        Self {
            predicate,
            total,
            counts,
            groups,
            diagnostic: None,
        }
    }

    /// Empty report for a run that could not classify
    pub fn skipped(predicate: PredicateType, diagnostic: impl Into<String>) -> Self {
        let mut report = Self::new(predicate, Vec::new());
        report.diagnostic = Some(diagnostic.into());
        report
    }

    pub fn is_skipped(&self) -> bool {
        self.diagnostic.is_some()
    }

    pub fn count(&self, kind: ClassificationKind) -> usize {
        self.counts
            .iter()
            .find(|c| c.kind == kind)
            .map_or(0, |c| c.count)
    }

    pub fn group(&self, kind: ClassificationKind) -> &[RankedNode] {
        self.groups
            .iter()
            .find(|g| g.kind == kind)
            .map(|g| g.nodes.as_slice())
            .unwrap_or_default()
    }

    /// All nodes in report order
    pub fn nodes(&self) -> impl Iterator<Item = &ClassificationNode> {
        self.groups
            .iter()
            .flat_map(|g| g.nodes.iter().map(|ranked| &ranked.node))
    }

    /// Human-readable summary
    pub fn to_report_string(&self) -> String {
        let mut report = String::new();

        report.push_str(&format!("=== {} Classification ===\n\n", self.predicate));

        if let Some(diagnostic) = &self.diagnostic {
            report.push_str(&format!("Skipped: {}\n", diagnostic));
            return report;
        }

        report.push_str(&format!("Total epochs: {}\n", self.total));
        for count in &self.counts {
            report.push_str(&format!("  {:<40} {}\n", count.kind.as_str(), count.count));
        }

        for group in &self.groups {
            if group.nodes.is_empty() || group.kind == ClassificationKind::ConsistentAndMatching {
                continue;
            }
            report.push_str(&format!("\n[{}] {}\n", group.kind, group.message));
            for ranked in &group.nodes {
                report.push_str(&format!("  {:>4}. {}", ranked.rank, ranked.node.epoch));
                if let Some(timing) = ranked.node.timing {
                    report.push_str(&format!(
                        " (min {} / max {} / span {})",
                        timing.min, timing.max, timing.duration
                    ));
                }
                report.push('\n');
            }
        }

        report
    }
}
