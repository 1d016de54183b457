// Cross-Set Classification
//
// Given a passing and a failing log collection and one predicate, decide for
// every epoch key whether it behaves consistently within each collection and
// whether that behavior differs between them.
//
// Two modes:
// - Signature (Relative, Absolute, Exception): keyed by line id. A key's
//   signature is the verdict sequence shared by all files that saw it, or
//   absent when files disagree.
// - Timing (Fast, Slow): keyed by epoch (line id + occurrence). Latency
//   ranges are compared; non-overlapping ranges mean different behavior.
//
// Indices are built in two phases: one PartialIndex per file (parallel
// across files), then a single-threaded merge in log order. Keys are visited
// in order of the line index where they were first inserted.

mod index;
mod signature;
mod timing;
mod verdicts;

pub use index::{EpochIndex, EpochKeying, IndexEntry, PartialIndex};
pub use signature::{classify_signatures, common_signature};
pub use timing::{classify_timing, TimeRange};
pub use verdicts::{per_file_verdicts, FileVerdicts};

use crate::error::Result;
use crate::log::Log;
use crate::predicate::{ClassificationMode, Predicate};
use crate::report::ClassificationNode;

/// Classify every epoch key of both collections under `predicate`
///
/// Every key seen in either collection yields exactly one node.
pub fn classify(
    passing: &[Log],
    failing: &[Log],
    predicate: &Predicate,
    parallel: bool,
) -> Result<Vec<ClassificationNode>> {
    let nodes = match predicate.mode() {
        ClassificationMode::Signature => {
            classify_signatures(passing, failing, predicate, parallel)?
        }
        ClassificationMode::Timing => classify_timing(passing, failing, predicate, parallel),
    };
    tracing::info!(
        "classified {} epoch keys under {}",
        nodes.len(),
        predicate.predicate_type()
    );
    Ok(nodes)
}
