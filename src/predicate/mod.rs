// Predicate Accumulators
//
// A predicate is a question asked of every occurrence of a call site:
// - Relative:  does this return value equal the previous occurrence's?
// - Absolute:  does the return value equal an expected value?
// - Exception: is the expected exception thrown?
// - Fast:      did the call finish within a latency threshold?
// - Slow:      collects latencies for range comparison only
//
// Occurrences are accumulated per (predicate, epoch key, file) and reduced
// to verdicts. The verdict sequence of one file is its "signature" for that
// epoch key; the classifier compares signatures across files.

mod accumulator;
mod kind;

pub use accumulator::{relative_pattern, EpochAccumulator, Verdict};
pub use kind::{ClassificationMode, Predicate, PredicateType};
