use super::kind::Predicate;
use crate::error::{AnalysisError, Result};
use crate::record::TraceRecord;
use serde::Serialize;

/// Reduced verdict for one accumulator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub epoch: String,
    /// True when the predicate held ("collided") for the deciding occurrence
    pub collided: bool,
    /// Line index of the deciding occurrence
    pub line_index: usize,
}

/// Occurrences of one epoch key in one file, under one predicate
#[derive(Debug, Clone, Serialize)]
pub struct EpochAccumulator {
    pub predicate: Predicate,
    pub epoch: String,
    pub file_name: String,
    records: Vec<TraceRecord>,
}

impl EpochAccumulator {
    pub fn new(
        predicate: Predicate,
        epoch: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            predicate,
            epoch: epoch.into(),
            file_name: file_name.into(),
            records: Vec::new(),
        }
    }

    pub fn accumulate(&mut self, record: TraceRecord) {
        self.records.push(record);
    }

    /// Contributing occurrences in accumulation order
    pub fn records(&self) -> &[TraceRecord] {
        &self.records
    }

    pub fn latencies(&self) -> impl Iterator<Item = i64> + '_ {
        self.records.iter().map(|r| r.latency)
    }

    /// Reduce to a single verdict
    ///
    /// Absolute, Exception and Fast decide on the first occurrence; Relative
    /// reports the last element of its pattern. Slow has no verdict.
    pub fn reduce(&self) -> Result<Verdict> {
        if let Predicate::Slow = self.predicate {
            return Err(self.unsupported());
        }
        let first = self
            .records
            .first()
            .ok_or_else(|| AnalysisError::EmptyAccumulator {
                epoch: self.epoch.clone(),
            })?;

        let (collided, line_index) = match &self.predicate {
            Predicate::Relative => {
                let pattern = relative_pattern(&self.records);
                let last = self.records.len() - 1;
                (pattern[last], self.records[last].line_index)
            }
            Predicate::Absolute { expected } => {
                (first.return_value.raw == *expected, first.line_index)
            }
            Predicate::Exception { expected } => (
                first.exception.as_deref() == Some(expected.as_str()),
                first.line_index,
            ),
            Predicate::Fast { threshold } => (*threshold >= first.latency, first.line_index),
            Predicate::Slow => return Err(self.unsupported()),
        };

        Ok(Verdict {
            epoch: self.epoch.clone(),
            collided,
            line_index,
        })
    }

    /// Verdict sequence compared across files
    ///
    /// Relative yields one boolean per occurrence; the single-verdict
    /// predicates yield a one-element signature.
    pub fn signature(&self) -> Result<Vec<bool>> {
        match self.predicate {
            Predicate::Slow => Err(self.unsupported()),
            Predicate::Relative if !self.records.is_empty() => {
                Ok(relative_pattern(&self.records))
            }
            _ => Ok(vec![self.reduce()?.collided]),
        }
    }

    fn unsupported(&self) -> AnalysisError {
        tracing::error!(
            "reduction requested for {} accumulator {} ({})",
            self.predicate.predicate_type(),
            self.epoch,
            self.file_name
        );
        AnalysisError::UnsupportedReduction {
            predicate: self.predicate.predicate_type(),
        }
    }
}

/// Per occurrence: does the return value equal the previous occurrence's?
///
/// The first occurrence is compared with itself, so it is always `true`.
pub fn relative_pattern(records: &[TraceRecord]) -> Vec<bool> {
    let mut previous = match records.first() {
        Some(first) => &first.return_value.raw,
        None => return Vec::new(),
    };

    records
        .iter()
        .map(|record| {
            let current = &record.return_value.raw;
            let same = previous == current;
            previous = current;
            same
        })
        .collect()
}
