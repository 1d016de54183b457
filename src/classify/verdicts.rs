use super::index::{EpochKeying, PartialIndex};
use crate::error::{AnalysisError, Result};
use crate::log::Log;
use crate::predicate::{Predicate, Verdict};
use serde::Serialize;

/// Reduced verdict of every line id in one file
#[derive(Debug, Clone, Serialize)]
pub struct FileVerdicts {
    pub file_name: String,
    pub is_passing: bool,
    /// Ordered by the line index of the deciding occurrence
    pub verdicts: Vec<Verdict>,
}

impl FileVerdicts {
    pub fn collided(&self) -> usize {
        self.verdicts.iter().filter(|v| v.collided).count()
    }
}

/// Per-file listing of reduced verdicts, keyed by line id
///
/// Slow has no per-occurrence verdict and is rejected up front.
pub fn per_file_verdicts(logs: &[Log], predicate: &Predicate) -> Result<Vec<FileVerdicts>> {
    if let Predicate::Slow = predicate {
        return Err(AnalysisError::UnsupportedReduction {
            predicate: predicate.predicate_type(),
        });
    }

    logs.iter()
        .map(|log| {
            let partial = PartialIndex::build(log, predicate, EpochKeying::LineId);
            let mut verdicts = partial
                .into_accumulators()
                .map(|acc| acc.reduce())
                .collect::<Result<Vec<_>>>()?;
            verdicts.sort_by_key(|v| v.line_index);
            Ok(FileVerdicts {
                file_name: log.file_name().to_string(),
                is_passing: log.is_passing(),
                verdicts,
            })
        })
        .collect()
}
