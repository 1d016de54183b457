use crate::log::Log;
use crate::parallel::map_ordered;
use crate::predicate::{EpochAccumulator, Predicate};
use crate::record::TraceRecord;
use fnv::FnvHashMap;

/// How records are keyed into the index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpochKeying {
    /// `il_offset:thread:caller:callee`, all occurrences share a key
    LineId,
    /// `line_id:sequence`, one key per occurrence
    Occurrence,
}

impl EpochKeying {
    pub fn key(self, record: &TraceRecord) -> String {
        match self {
            EpochKeying::LineId => record.line_id(),
            EpochKeying::Occurrence => record.epoch(),
        }
    }
}

/// All accumulators for one key, across files
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub key: String,
    /// Line index of the record that first created the key
    pub first_line_index: usize,
    /// One accumulator per contributing file, in log order
    pub accumulators: Vec<EpochAccumulator>,
}

/// Single-file index built during phase 1
#[derive(Debug)]
pub struct PartialIndex {
    entries: Vec<(String, usize, EpochAccumulator)>,
    positions: FnvHashMap<String, usize>,
}

impl PartialIndex {
    pub fn build(log: &Log, predicate: &Predicate, keying: EpochKeying) -> Self {
        let mut partial = Self {
            entries: Vec::new(),
            positions: FnvHashMap::default(),
        };

        for record in log.records() {
            let key = keying.key(record);
            let position = match partial.positions.get(&key) {
                Some(&position) => position,
                None => {
                    let position = partial.entries.len();
                    let acc =
                        EpochAccumulator::new(predicate.clone(), key.clone(), log.file_name());
                    partial.entries.push((key.clone(), record.line_index, acc));
                    partial.positions.insert(key, position);
                    position
                }
            };
            partial.entries[position].2.accumulate(record.clone());
        }

        partial
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Accumulators in insertion order
    pub fn into_accumulators(self) -> impl Iterator<Item = EpochAccumulator> {
        self.entries.into_iter().map(|(_, _, acc)| acc)
    }
}

/// Merged index over one log collection
///
/// Only read once built. Iteration via [`EpochIndex::ordered`] is by the line
/// index of each key's first insertion; ties keep merge order.
#[derive(Debug, Default)]
pub struct EpochIndex {
    entries: Vec<IndexEntry>,
    positions: FnvHashMap<String, usize>,
}

impl EpochIndex {
    /// Phase 1 per file (parallel when allowed), phase 2 merge in log order
    pub fn build(
        logs: &[Log],
        predicate: &Predicate,
        keying: EpochKeying,
        parallel: bool,
    ) -> Self {
        let partials = map_ordered(logs, parallel, |log| {
            PartialIndex::build(log, predicate, keying)
        });
        Self::merge(partials)
    }

    /// Merge partial indices; the first partial to introduce a key fixes its
    /// first-insertion line index
    pub fn merge(partials: Vec<PartialIndex>) -> Self {
        let mut index = Self::default();

        for partial in partials {
            for (key, line_index, acc) in partial.entries {
                match index.positions.get(&key) {
                    Some(&position) => index.entries[position].accumulators.push(acc),
                    None => {
                        index.positions.insert(key.clone(), index.entries.len());
                        index.entries.push(IndexEntry {
                            key,
                            first_line_index: line_index,
                            accumulators: vec![acc],
                        });
                    }
                }
            }
        }

        tracing::debug!("merged epoch index: {} keys", index.entries.len());
        index
    }

    pub fn get(&self, key: &str) -> Option<&IndexEntry> {
        self.positions.get(key).map(|&position| &self.entries[position])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by first-insertion line index (stable)
    pub fn into_ordered(self) -> Vec<IndexEntry> {
        let mut entries = self.entries;
        entries.sort_by_key(|entry| entry.first_line_index);
        entries
    }
}
