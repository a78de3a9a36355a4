use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::cancel::CancelFlag;
use crate::results::FileMatches;

/// A single search request from the UI.
///
/// An empty `pattern_content` means enumerate-only: report every file whose
/// basename matches `pattern_filename`, without opening it.
#[derive(Debug, Clone)]
pub struct GrepRequest {
    pub path_root: PathBuf,
    pub pattern_filename: String,
    pub pattern_content: String,
}

/// Status of a request. Everything but `Pending` is terminal and sticky.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RequestStatus {
    Pending = 0,
    Finished = 1,
    Aborted = 2,
    BadFilenamePattern = 3,
    BadPattern = 4,
    Failure = 5,
}

impl RequestStatus {
    pub fn is_terminal(self) -> bool {
        self != RequestStatus::Pending
    }

    fn from_u8(raw: u8) -> RequestStatus {
        match raw {
            0 => RequestStatus::Pending,
            1 => RequestStatus::Finished,
            2 => RequestStatus::Aborted,
            3 => RequestStatus::BadFilenamePattern,
            4 => RequestStatus::BadPattern,
            _ => RequestStatus::Failure,
        }
    }
}

/// Shared state of one request, written by the engine and read by the UI.
///
/// The status is a lock-free atomic; the files list is guarded by a mutex
/// that external readers must also take while iterating. The state owns the
/// byte views referenced by its entries, so previews stay readable until
/// the UI discards the state.
#[derive(Debug)]
pub struct RequestState {
    status: AtomicU8,
    files: Mutex<Vec<FileMatches>>,
    cancel: CancelFlag,
}

impl RequestState {
    pub fn new() -> Arc<RequestState> {
        Arc::new(RequestState {
            status: AtomicU8::new(RequestStatus::Pending as u8),
            files: Mutex::new(Vec::new()),
            cancel: CancelFlag::new(),
        })
    }

    pub fn status(&self) -> RequestStatus {
        RequestStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    pub fn cancel(&self) -> &CancelFlag {
        &self.cancel
    }

    /// Locks and returns the files list.
    pub fn files(&self) -> MutexGuard<'_, Vec<FileMatches>> {
        self.files.lock().unwrap()
    }

    /// Transitions `Pending -> status`. Terminal states are sticky: once a
    /// request has finished, aborted or failed, later transitions are
    /// no-ops. Returns whether this call performed the transition.
    pub fn finish(&self, status: RequestStatus) -> bool {
        debug_assert!(status.is_terminal());
        self.status
            .compare_exchange(
                RequestStatus::Pending as u8,
                status as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Marks the request aborted (if still pending) and raises its
    /// cancellation flag.
    pub fn abort(&self) {
        self.finish(RequestStatus::Aborted);
        self.cancel.raise();
    }

    pub(crate) fn push_file(&self, entry: FileMatches) {
        self.files.lock().unwrap().push(entry);
    }

    pub(crate) fn extend_files(&self, entries: Vec<FileMatches>) {
        self.files.lock().unwrap().extend(entries);
    }
}
