use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::{aggregator, walk, worker::MatchWorker};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::pattern::{Anchoring, Pattern};
use crate::pipe::Pipe;
use crate::request::{GrepRequest, RequestState, RequestStatus};
use crate::results::FileMatches;

/// Runs one request to completion on the calling thread, mapping compile
/// and spawn failures to their terminal statuses. On `Ok(())` the terminal
/// status has been set by the enumerate-only path or the aggregator.
pub(crate) fn run_request(
    config: &EngineConfig,
    request: &GrepRequest,
    state: &RequestState,
) -> EngineResult<()> {
    let started = Instant::now();
    let outcome = run_pipeline(config, request, state);
    if let Err(e) = &outcome {
        warn!("Request failed: {}", e);
        state.finish(e.status());
    }
    info!(
        "Request over {} took {} ms, status {:?}",
        request.path_root.display(),
        started.elapsed().as_millis(),
        state.status()
    );
    outcome
}

fn run_pipeline(
    config: &EngineConfig,
    request: &GrepRequest,
    state: &RequestState,
) -> EngineResult<()> {
    let filename_pattern = Pattern::compile(&request.pattern_filename, Anchoring::BufferEdges)
        .map_err(EngineError::BadFilenamePattern)?;

    // Enumerate-only: no content pattern, no worker pool
    if request.pattern_content.is_empty() {
        walk::visit_files(&request.path_root, &filename_pattern, state.cancel(), |path| {
            state.push_file(FileMatches::enumerated(path));
        });
        state.finish(RequestStatus::Finished);
        return Ok(());
    }

    let content_pattern = Pattern::compile(&request.pattern_content, Anchoring::Suppressed)
        .map_err(EngineError::BadPattern)?;

    let worker_count = config.worker_threads.get();
    let inputs = Arc::new(Pipe::bounded(config.input_queue_capacity()));
    let results = Arc::new(Pipe::bounded(config.result_queue_capacity()));

    let mut workers: Vec<JoinHandle<()>> = Vec::with_capacity(worker_count);
    for id in 0..worker_count {
        let worker = MatchWorker::new(
            content_pattern.clone(),
            state.cancel().clone(),
            Arc::clone(&inputs),
            Arc::clone(&results),
        );
        let spawned = thread::Builder::new()
            .name(format!("match-{}", id))
            .spawn(move || worker.run());
        match spawned {
            Ok(handle) => workers.push(handle),
            Err(e) => {
                // Wind down the workers that did start before failing the
                // request
                for _ in 0..workers.len() {
                    inputs.push_shutdown();
                }
                for handle in workers {
                    let _ = handle.join();
                }
                return Err(e.into());
            }
        }
    }

    walk::enumerate(
        &request.path_root,
        &filename_pattern,
        state.cancel(),
        &inputs,
        worker_count,
    );
    aggregator::run(&results, state, worker_count);

    for handle in workers {
        let _ = handle.join();
    }
    Ok(())
}

/// The engine handle the UI talks to: the data-source side of the
/// engine/UI contract.
///
/// One controller thread waits for requests and spawns a dedicated thread
/// per request, so a superseded request drains concurrently with its
/// successor. Request states queue up oldest-first; the UI polls
/// [`current_state`], discards stale states with [`discard_oldest_state`]
/// and renders the head.
///
/// [`current_state`]: SearchEngine::current_state
/// [`discard_oldest_state`]: SearchEngine::discard_oldest_state
pub struct SearchEngine {
    shared: Arc<Shared>,
    controller: Option<JoinHandle<()>>,
}

struct Shared {
    config: EngineConfig,
    inbox: Mutex<Inbox>,
    wake: Condvar,
}

#[derive(Default)]
struct Inbox {
    request: Option<GrepRequest>,
    shutdown: bool,
    states: VecDeque<Arc<RequestState>>,
}

impl SearchEngine {
    /// Spawns the controller thread.
    pub fn start(config: EngineConfig) -> std::io::Result<SearchEngine> {
        let shared = Arc::new(Shared {
            config,
            inbox: Mutex::new(Inbox::default()),
            wake: Condvar::new(),
        });
        let controller = thread::Builder::new()
            .name("grep-controller".to_string())
            .spawn({
                let shared = Arc::clone(&shared);
                move || controller_loop(shared)
            })?;
        Ok(SearchEngine {
            shared,
            controller: Some(controller),
        })
    }

    /// Enqueues a new request, superseding any in-flight one: every live
    /// state still pending is aborted and its cancellation flag raised.
    /// Non-blocking.
    pub fn put_request(&self, request: GrepRequest) {
        let mut inbox = self.shared.inbox.lock().unwrap();
        for state in &inbox.states {
            state.abort();
        }
        if inbox.request.replace(request).is_some() {
            debug!("Replaced an undispatched request");
        }
        drop(inbox);
        self.shared.wake.notify_one();
    }

    /// The oldest non-discarded request state, if any.
    pub fn current_state(&self) -> Option<Arc<RequestState>> {
        self.shared.inbox.lock().unwrap().states.front().cloned()
    }

    /// Drops the oldest request state; its byte views are released once the
    /// engine side has no further reference.
    pub fn discard_oldest_state(&self) {
        self.shared.inbox.lock().unwrap().states.pop_front();
    }

    /// Signals shutdown: live states are aborted and the controller stops
    /// accepting requests. Does not block; dropping the engine joins the
    /// controller.
    pub fn exit(&self) {
        let mut inbox = self.shared.inbox.lock().unwrap();
        inbox.shutdown = true;
        inbox.request = None;
        for state in &inbox.states {
            state.abort();
        }
        drop(inbox);
        self.shared.wake.notify_one();
    }
}

impl Drop for SearchEngine {
    fn drop(&mut self) {
        self.exit();
        if let Some(controller) = self.controller.take() {
            if controller.join().is_err() {
                error!("Controller thread panicked");
            }
        }
    }
}

fn controller_loop(shared: Arc<Shared>) {
    let mut active: Vec<JoinHandle<()>> = Vec::new();

    loop {
        let request = {
            let mut inbox = shared.inbox.lock().unwrap();
            loop {
                if inbox.shutdown {
                    break None;
                }
                if let Some(request) = inbox.request.take() {
                    break Some(request);
                }
                inbox = shared.wake.wait(inbox).unwrap();
            }
        };
        let Some(request) = request else {
            break;
        };

        active.retain(|handle| !handle.is_finished());

        let state = RequestState::new();
        shared
            .inbox
            .lock()
            .unwrap()
            .states
            .push_back(Arc::clone(&state));

        let config = shared.config.clone();
        let spawned = thread::Builder::new()
            .name("grep-request".to_string())
            .spawn(move || {
                let _ = run_request(&config, &request, &state);
            });
        match spawned {
            Ok(handle) => active.push(handle),
            Err(e) => {
                error!("Failed to spawn request thread: {}", e);
                // The state was already published; fail it so the UI is
                // not left polling a request nobody is running
                if let Some(state) = shared.inbox.lock().unwrap().states.back() {
                    state.finish(RequestStatus::Failure);
                }
            }
        }
    }

    // Superseded requests were cancelled when their successor arrived, so
    // these joins are short
    for handle in active {
        let _ = handle.join();
    }
}
