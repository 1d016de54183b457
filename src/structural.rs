//! Coarse shape comparison across a log collection
//!
//! Before looking at individual epochs it helps to know whether the runs
//! even have the same shape: same number of chunks, same start records, and
//! where the first failing run departs from a passing reference.

use crate::error::{AnalysisError, Result};
use crate::log::{Chunk, Log};
use crate::record::CallPair;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Comparison of a reference chunk with its counterpart at the same index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkComparison {
    pub chunk_index: usize,
    pub reference_file: String,
    pub reference_start: CallPair,
    pub counterpart_file: String,
    /// `None` when the counterpart log ran out of chunks
    pub counterpart_start: Option<CallPair>,
    pub same_start: bool,
    pub same_size: bool,
    pub same_sequence: bool,
    pub same_identities: bool,
}

impl ChunkComparison {
    fn compare(
        index: usize,
        reference: &Chunk,
        counterpart: Option<&Chunk>,
        counterpart_file: &str,
    ) -> Self {
        let mut comparison = Self {
            chunk_index: index,
            reference_file: reference.file.file_name.clone(),
            reference_start: reference.start().call_pair(),
            counterpart_file: counterpart_file.to_string(),
            counterpart_start: None,
            same_start: false,
            same_size: false,
            same_sequence: false,
            same_identities: false,
        };

        if let Some(other) = counterpart {
            comparison.counterpart_start = Some(other.start().call_pair());
            comparison.same_start = reference.same_start(other);
            comparison.same_size = reference.len() == other.len();
            comparison.same_sequence = reference.call_sequence() == other.call_sequence();
            comparison.same_identities = reference.identities() == other.identities();
        }

        comparison
    }
}

/// True iff every log has the same chunk count
pub fn uniform_size(logs: &[Log]) -> bool {
    logs.windows(2)
        .all(|pair| pair[0].chunk_count() == pair[1].chunk_count())
}

/// True iff adjacent logs agree on the start (caller, callee) of every chunk
///
/// Logs of different length never agree.
pub fn uniform_start(logs: &[Log]) -> bool {
    logs.windows(2).all(|pair| same_starts(&pair[0], &pair[1]))
}

fn same_starts(a: &Log, b: &Log) -> bool {
    a.chunk_count() == b.chunk_count()
        && a.chunks()
            .iter()
            .zip(b.chunks())
            .all(|(x, y)| x.same_start(y))
}

/// First chunk index where `failing` departs from `reference`
///
/// Scans the reference log from index 0. Returns a comparison without a
/// counterpart if `failing` runs out first, or `None` if no index differs.
pub fn first_divergence(reference: &Log, failing: &Log) -> Option<ChunkComparison> {
    for (index, chunk) in reference.chunks().iter().enumerate() {
        match failing.chunks().get(index) {
            None => {
                return Some(ChunkComparison::compare(
                    index,
                    chunk,
                    None,
                    failing.file_name(),
                ));
            }
            Some(other) if !chunk.same_start(other) => {
                return Some(ChunkComparison::compare(
                    index,
                    chunk,
                    Some(other),
                    failing.file_name(),
                ));
            }
            Some(_) => {}
        }
    }
    None
}

/// Per-log bookkeeping kept outside [`Log`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct LogAnnotation {
    /// Logs this one was compared against
    pub compared: BTreeSet<String>,
    /// Compared logs whose chunk count differs from this one
    pub size_differs: BTreeSet<String>,
}

/// Optional annotations keyed by log file name
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct DiffAnnotations {
    entries: BTreeMap<String, LogAnnotation>,
}

impl DiffAnnotations {
    pub fn record_comparison(&mut self, log: &Log, other: &Log) {
        let entry = self.entries.entry(log.file_name().to_string()).or_default();
        entry.compared.insert(other.file_name().to_string());
        if log.chunk_count() != other.chunk_count() {
            entry.size_differs.insert(other.file_name().to_string());
        }
    }

    pub fn get(&self, file_name: &str) -> Option<&LogAnnotation> {
        self.entries.get(file_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Structural view over a passing and a failing collection
#[derive(Debug)]
pub struct StructuralDiff<'a> {
    passing: &'a [Log],
    failing: &'a [Log],
    divergences: Option<Vec<ChunkComparison>>,
    annotations: DiffAnnotations,
}

impl<'a> StructuralDiff<'a> {
    /// The first passing log is the reference, so one must exist
    pub fn new(passing: &'a [Log], failing: &'a [Log]) -> Result<Self> {
        if passing.is_empty() {
            return Err(AnalysisError::EmptyReferenceCollection);
        }
        Ok(Self {
            passing,
            failing,
            divergences: None,
            annotations: DiffAnnotations::default(),
        })
    }

    pub fn reference(&self) -> &'a Log {
        &self.passing[0]
    }

    /// First divergence of every failing log from the reference
    ///
    /// Computed on first call; later calls return the cached result.
    pub fn first_divergences(&mut self) -> &[ChunkComparison] {
        if self.divergences.is_none() {
            let reference = self.reference();
            let mut found = Vec::new();
            for failing in self.failing {
                self.annotations.record_comparison(reference, failing);
                if let Some(divergence) = first_divergence(reference, failing) {
                    tracing::debug!(
                        "{} diverges from {} at chunk {}",
                        failing.file_name(),
                        reference.file_name(),
                        divergence.chunk_index
                    );
                    found.push(divergence);
                }
            }
            self.divergences = Some(found);
        }
        self.divergences.as_deref().unwrap_or_default()
    }

    pub fn annotations(&self) -> &DiffAnnotations {
        &self.annotations
    }

    /// Serializable summary of both collections
    pub fn summary(&mut self) -> StructuralSummary {
        let first_divergences = self.first_divergences().to_vec();
        StructuralSummary {
            reference_file: self.reference().file_name().to_string(),
            passing_count: self.passing.len(),
            failing_count: self.failing.len(),
            passing_uniform_size: uniform_size(self.passing),
            failing_uniform_size: uniform_size(self.failing),
            passing_uniform_start: uniform_start(self.passing),
            first_divergences,
            annotations: self.annotations.clone(),
        }
    }
}

/// Shape summary handed to the report layer
#[derive(Debug, Clone, Serialize)]
pub struct StructuralSummary {
    pub reference_file: String,
    pub passing_count: usize,
    pub failing_count: usize,
    pub passing_uniform_size: bool,
    pub failing_uniform_size: bool,
    pub passing_uniform_start: bool,
    pub first_divergences: Vec<ChunkComparison>,
    pub annotations: DiffAnnotations,
}
