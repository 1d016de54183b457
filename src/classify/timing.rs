use super::index::{EpochIndex, EpochKeying, IndexEntry};
use crate::log::Log;
use crate::predicate::Predicate;
use crate::report::{ClassificationKind, ClassificationNode, TimingSummary};
use fnv::FnvHashMap;

/// Latency range over every occurrence contributing to one epoch key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRange {
    pub min: i64,
    pub max: i64,
    pub latencies: Vec<i64>,
}

impl TimeRange {
    /// `None` when there is nothing to range over
    pub fn from_latencies(latencies: impl IntoIterator<Item = i64>) -> Option<Self> {
        let latencies: Vec<i64> = latencies.into_iter().collect();
        let min = *latencies.iter().min()?;
        let max = *latencies.iter().max()?;
        Some(Self { min, max, latencies })
    }

    pub fn of_entry(entry: &IndexEntry) -> Option<Self> {
        Self::from_latencies(entry.accumulators.iter().flat_map(|acc| acc.latencies()))
    }

    pub fn duration(&self) -> i64 {
        self.max.saturating_sub(self.min)
    }

    /// Ranges that only touch at an endpoint count as disjoint
    pub fn disjoint(&self, other: &TimeRange) -> bool {
        self.min >= other.max || self.max <= other.min
    }

    pub fn summary(&self) -> TimingSummary {
        TimingSummary {
            min: self.min,
            max: self.max,
            duration: self.duration(),
        }
    }

    /// Smallest range covering both
    pub fn envelope(&self, other: &TimeRange) -> TimingSummary {
        let min = self.min.min(other.min);
        let max = self.max.max(other.max);
        TimingSummary {
            min,
            max,
            duration: max.saturating_sub(min),
        }
    }
}

/// Compare latency ranges per epoch
pub fn classify_timing(
    passing: &[Log],
    failing: &[Log],
    predicate: &Predicate,
    parallel: bool,
) -> Vec<ClassificationNode> {
    let passing_index = EpochIndex::build(passing, predicate, EpochKeying::Occurrence, parallel);
    let failing_index = EpochIndex::build(failing, predicate, EpochKeying::Occurrence, parallel);
    tracing::debug!(
        "timing indices: {} passing epochs, {} failing epochs",
        passing_index.len(),
        failing_index.len()
    );

    let mut remaining: Vec<Option<IndexEntry>> =
        failing_index.into_ordered().into_iter().map(Some).collect();
    let positions: FnvHashMap<String, usize> = remaining
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| entry.as_ref().map(|e| (e.key.clone(), i)))
        .collect();

    let mut nodes = Vec::new();

    for entry in passing_index.into_ordered() {
        let passing_range = TimeRange::of_entry(&entry);
        let counterpart = positions
            .get(&entry.key)
            .and_then(|&position| remaining[position].take());

        let node = match counterpart {
            None => ClassificationNode::new(
                ClassificationKind::InconsistentInPassing,
                entry.key,
                entry.accumulators,
                Vec::new(),
            )
            .with_timing(passing_range.as_ref().map(TimeRange::summary)),
            Some(other) => {
                let failing_range = TimeRange::of_entry(&other);
                let (kind, timing) = match (&passing_range, &failing_range) {
                    (Some(p), Some(f)) if p.disjoint(f) => {
                        (ClassificationKind::ConsistentButDifferent, Some(p.envelope(f)))
                    }
                    (Some(p), Some(f)) => {
                        (ClassificationKind::ConsistentAndMatching, Some(p.envelope(f)))
                    }
                    _ => (ClassificationKind::ConsistentAndMatching, None),
                };
                ClassificationNode::new(kind, entry.key, entry.accumulators, other.accumulators)
                    .with_timing(timing)
            }
        };
        nodes.push(node);
    }

    for entry in remaining.into_iter().flatten() {
        let timing = TimeRange::of_entry(&entry).map(|r| r.summary());
        nodes.push(
            ClassificationNode::new(
                ClassificationKind::InconsistentInFailing,
                entry.key,
                Vec::new(),
                entry.accumulators,
            )
            .with_timing(timing),
        );
    }

    nodes
}
