//! Order-preserving fan-out over crossbeam scoped threads
//!
//! Used for per-file work (parsing, partial index construction). Items are
//! split into contiguous batches, one per worker, and results come back in
//! input order. A panic in a worker is resumed on the calling thread.

use std::panic;
use std::thread;

/// Upper bound on worker threads for `len` items
pub fn worker_count(len: usize) -> usize {
    let available = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    available.min(len).max(1)
}

/// Map `f` over `items`, in parallel when `parallel` is set and there is more
/// than one item
pub fn map_ordered<T, R, F>(items: &[T], parallel: bool, f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
{
    let workers = worker_count(items.len());
    if !parallel || items.len() < 2 || workers < 2 {
        return items.iter().map(&f).collect();
    }

    let batch = items.len().div_ceil(workers);
    let f = &f;

    let joined = crossbeam::scope(|scope| {
        let handles: Vec<_> = items
            .chunks(batch)
            .map(|part| scope.spawn(move |_| part.iter().map(f).collect::<Vec<R>>()))
            .collect();

        handles
            .into_iter()
            .flat_map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|payload| panic::resume_unwind(payload))
            })
            .collect::<Vec<R>>()
    });

    joined.unwrap_or_else(|payload| panic::resume_unwind(payload))
}
