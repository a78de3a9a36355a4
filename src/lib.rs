pub mod cancel;
pub mod config;
pub mod engine;
pub mod error;
pub mod line_index;
pub mod mapped;
pub mod pattern;
pub mod pipe;
pub mod request;
pub mod results;

// Re-export commonly used types
pub use cancel::CancelFlag;
pub use config::EngineConfig;
pub use engine::{search, SearchEngine};
pub use error::{EngineError, EngineResult};
pub use line_index::LineIndex;
pub use mapped::ByteView;
pub use pattern::{Anchoring, Pattern, PatternError};
pub use request::{GrepRequest, RequestState, RequestStatus};
pub use results::{FileMatches, LineInfo, Match};
