use tracing::debug;

use crate::pipe::Pipe;
use crate::request::{RequestState, RequestStatus};
use crate::results::FileMatches;

/// How many results the aggregator folds into one files-lock acquisition.
const DRAIN_BATCH: usize = 16;

/// Single consumer of the results pipe.
///
/// Counts down one terminal token per worker, appending bundles to the
/// request state as they arrive; returns once every worker has signalled
/// termination. The status is then moved `Pending -> Finished` unless the
/// controller aborted the request in the meantime.
pub fn run(results: &Pipe<FileMatches>, state: &RequestState, worker_count: usize) {
    let mut remaining = worker_count;
    let mut total_files = 0usize;

    while remaining > 0 {
        let mut batch = Vec::with_capacity(DRAIN_BATCH);
        batch.push(results.pop_blocking());
        batch.extend(results.drain_up_to(DRAIN_BATCH - 1));

        let mut bundles = Vec::new();
        for item in batch {
            match item {
                Some(bundle) => bundles.push(bundle),
                None => remaining -= 1,
            }
        }
        if !bundles.is_empty() {
            total_files += bundles.len();
            state.extend_files(bundles);
        }
    }

    debug_assert!(results.is_empty());
    debug!("Aggregated {} matching files", total_files);
    state.finish(RequestStatus::Finished);
}
