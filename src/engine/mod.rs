pub mod aggregator;
pub mod controller;
pub mod walk;
pub mod worker;

pub use controller::SearchEngine;

use std::sync::Arc;
use tracing::info;

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::request::{GrepRequest, RequestState};

/// Runs one request to completion on the calling thread and returns its
/// state.
///
/// This is the blocking, single-request counterpart of [`SearchEngine`]:
/// the same pipeline without the controller thread, for embedders that do
/// not need supersession. Compile failures are returned as errors and also
/// recorded as the state's terminal status.
pub fn search(config: &EngineConfig, request: &GrepRequest) -> EngineResult<Arc<RequestState>> {
    info!(
        "Searching {} for filename /{}/ content /{}/",
        request.path_root.display(),
        request.pattern_filename,
        request.pattern_content
    );
    let state = RequestState::new();
    controller::run_request(config, request, &state)?;
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::request::RequestStatus;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_search_finishes() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "one needle\n").unwrap();
        fs::write(dir.path().join("b.txt"), "no match\n").unwrap();

        let state = search(
            &EngineConfig::default(),
            &GrepRequest {
                path_root: dir.path().to_path_buf(),
                pattern_filename: r".*\.txt".to_string(),
                pattern_content: "needle".to_string(),
            },
        )
        .unwrap();

        assert_eq!(state.status(), RequestStatus::Finished);
        assert_eq!(state.files().len(), 1);
    }

    #[test]
    fn test_search_bad_content_pattern() {
        let dir = tempdir().unwrap();
        let result = search(
            &EngineConfig::default(),
            &GrepRequest {
                path_root: dir.path().to_path_buf(),
                pattern_filename: ".*".to_string(),
                pattern_content: "(".to_string(),
            },
        );
        assert!(matches!(result, Err(EngineError::BadPattern(_))));
    }
}
