//! Chunks and logs: the per-file containers handed to the analysis
//!
//! A [`Log`] is one parsed trace file, an ordered run of [`Chunk`]s. Each
//! chunk is anchored by a start record and may carry further records (e.g. a
//! nested call stack). The default grouping emits one record per chunk.

use crate::normalize::normalize_records;
use crate::record::{CallPair, TraceRecord};
use serde::Serialize;
use std::collections::HashSet;

/// Origin of a chunk: which file, and which outcome that run had
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FileProp {
    pub file_name: String,
    pub is_passing: bool,
}

impl FileProp {
    pub fn new(file_name: impl Into<String>, is_passing: bool) -> Self {
        Self {
            file_name: file_name.into(),
            is_passing,
        }
    }
}

/// Ordered run of records anchored by a start record
#[derive(Debug, Clone)]
pub struct Chunk {
    pub file: FileProp,
    start: TraceRecord,
    entries: Vec<TraceRecord>,
    identities: HashSet<CallPair>,
}

impl Chunk {
    pub fn new(start: TraceRecord, file: FileProp) -> Self {
        let mut identities = HashSet::new();
        identities.insert(start.call_pair());
        Self {
            file,
            start,
            entries: Vec::new(),
            identities,
        }
    }

    /// Append a record after the start record
    pub fn push(&mut self, record: TraceRecord) {
        self.identities.insert(record.call_pair());
        self.entries.push(record);
    }

    pub fn start(&self) -> &TraceRecord {
        &self.start
    }

    /// Records after the start record, in order
    pub fn entries(&self) -> &[TraceRecord] {
        &self.entries
    }

    /// All records, start first
    pub fn records(&self) -> impl Iterator<Item = &TraceRecord> {
        std::iter::once(&self.start).chain(self.entries.iter())
    }

    pub fn len(&self) -> usize {
        1 + self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Distinct (caller, callee) pairs seen in this chunk
    pub fn identities(&self) -> &HashSet<CallPair> {
        &self.identities
    }

    /// Ordered (caller, callee) sequence
    pub fn call_sequence(&self) -> Vec<CallPair> {
        self.records().map(TraceRecord::call_pair).collect()
    }

    pub fn same_start(&self, other: &Chunk) -> bool {
        self.start.same_call(&other.start)
    }

    /// Copy keeping only records whose callee contains `keyword`
    ///
    /// The first kept record becomes the new start record. Returns `None` if
    /// nothing matches.
    pub fn retain_callee(&self, keyword: &str) -> Option<Chunk> {
        let mut kept = self
            .records()
            .filter(|r| r.callee.contains(keyword))
            .cloned();

        let mut chunk = Chunk::new(kept.next()?, self.file.clone());
        for record in kept {
            chunk.push(record);
        }
        Some(chunk)
    }
}

/// Strategy for grouping a file's records into chunks
pub trait ChunkGrouping {
    fn group(&self, records: Vec<TraceRecord>, file: &FileProp) -> Vec<Chunk>;
}

/// One record per chunk
#[derive(Debug, Clone, Copy, Default)]
pub struct SingletonGrouping;

impl ChunkGrouping for SingletonGrouping {
    fn group(&self, records: Vec<TraceRecord>, file: &FileProp) -> Vec<Chunk> {
        records
            .into_iter()
            .map(|record| Chunk::new(record, file.clone()))
            .collect()
    }
}

/// One parsed trace file
#[derive(Debug, Clone)]
pub struct Log {
    pub file: FileProp,
    chunks: Vec<Chunk>,
}

impl Log {
    pub fn new(file: FileProp, chunks: Vec<Chunk>) -> Self {
        Self { file, chunks }
    }

    /// Normalize a file's records, then group them into chunks
    pub fn build(
        file_name: &str,
        is_passing: bool,
        mut records: Vec<TraceRecord>,
        grouping: &dyn ChunkGrouping,
    ) -> Self {
        normalize_records(&mut records);
        let file = FileProp::new(file_name, is_passing);
        let chunks = grouping.group(records, &file);
        Self { file, chunks }
    }

    pub fn file_name(&self) -> &str {
        &self.file.file_name
    }

    pub fn is_passing(&self) -> bool {
        self.file.is_passing
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Every record of every chunk, in file order
    pub fn records(&self) -> impl Iterator<Item = &TraceRecord> {
        self.chunks.iter().flat_map(Chunk::records)
    }

    pub fn callees(&self) -> impl Iterator<Item = &str> {
        self.records().map(|r| r.callee.as_str())
    }

    /// Copy keeping only records whose callee contains `keyword`
    ///
    /// Chunks without a match are dropped; `None` if no chunk survives.
    pub fn retain_callee(&self, keyword: &str) -> Option<Log> {
        let chunks: Vec<Chunk> = self
            .chunks
            .iter()
            .filter_map(|chunk| chunk.retain_callee(keyword))
            .collect();

        if chunks.is_empty() {
            return None;
        }
        Some(Log::new(self.file.clone(), chunks))
    }
}

/// Apply [`Log::retain_callee`] across a collection, dropping empty logs
pub fn retain_callee_all(logs: &[Log], keyword: &str) -> Vec<Log> {
    logs.iter()
        .filter_map(|log| log.retain_callee(keyword))
        .collect()
}
