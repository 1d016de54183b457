use super::index::{EpochIndex, EpochKeying, IndexEntry};
use crate::error::Result;
use crate::log::Log;
use crate::predicate::{EpochAccumulator, Predicate};
use crate::report::{ClassificationKind, ClassificationNode};
use fnv::FnvHashMap;

/// Common signature of a key across its files
///
/// `None` when any file's signature differs from the others, or when no file
/// contributed.
pub fn common_signature(accumulators: &[EpochAccumulator]) -> Result<Option<Vec<bool>>> {
    let Some((first, rest)) = accumulators.split_first() else {
        return Ok(None);
    };
    let signature = first.signature()?;
    for acc in rest {
        if acc.signature()? != signature {
            return Ok(None);
        }
    }
    Ok(Some(signature))
}

/// Compare per-line-id signatures
pub fn classify_signatures(
    passing: &[Log],
    failing: &[Log],
    predicate: &Predicate,
    parallel: bool,
) -> Result<Vec<ClassificationNode>> {
    let passing_index = EpochIndex::build(passing, predicate, EpochKeying::LineId, parallel);
    let failing_index = EpochIndex::build(failing, predicate, EpochKeying::LineId, parallel);
    tracing::debug!(
        "signature indices: {} passing line ids, {} failing line ids",
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
        let passing_signature = common_signature(&entry.accumulators)?;
        let counterpart = positions
            .get(&entry.key)
            .and_then(|&position| remaining[position].take());

        let node = match counterpart {
            None => {
                let kind = if passing_signature.is_some() {
                    ClassificationKind::ConsistentButDifferentMissingInFailing
                } else {
                    ClassificationKind::InconsistentInPassing
                };
                ClassificationNode::new(kind, entry.key, entry.accumulators, Vec::new())
                    .with_signatures(passing_signature, None)
            }
            Some(other) => {
                let failing_signature = common_signature(&other.accumulators)?;
                // Both absent counts as matching
                let kind = if passing_signature == failing_signature {
                    ClassificationKind::ConsistentAndMatching
                } else {
                    ClassificationKind::ConsistentButDifferent
                };
                ClassificationNode::new(kind, entry.key, entry.accumulators, other.accumulators)
                    .with_signatures(passing_signature, failing_signature)
            }
        };
        nodes.push(node);
    }

    for entry in remaining.into_iter().flatten() {
        let failing_signature = common_signature(&entry.accumulators)?;
        let kind = if failing_signature.is_some() {
            ClassificationKind::ConsistentButDifferentMissingInPassing
        } else {
            ClassificationKind::InconsistentInFailing
        };
        nodes.push(
            ClassificationNode::new(kind, entry.key, Vec::new(), entry.accumulators)
                .with_signatures(None, failing_signature),
        );
    }

    Ok(nodes)
}
