use crate::pattern::PatternError;
use crate::request::RequestStatus;

/// Errors that terminate a request before or outside the worker pipeline.
///
/// Per-file problems (map failures, unreadable directories) are not errors
/// at this level: they are logged and the file or subtree is skipped.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid filename pattern: {0}")]
    BadFilenamePattern(PatternError),
    #[error("invalid content pattern: {0}")]
    BadPattern(PatternError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// The terminal status this error maps to.
    pub fn status(&self) -> RequestStatus {
        match self {
            EngineError::BadFilenamePattern(_) => RequestStatus::BadFilenamePattern,
            EngineError::BadPattern(_) => RequestStatus::BadPattern,
            EngineError::Io(_) => RequestStatus::Failure,
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
