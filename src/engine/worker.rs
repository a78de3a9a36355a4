use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{trace, warn};

use crate::cancel::CancelFlag;
use crate::line_index::LineIndex;
use crate::mapped::ByteView;
use crate::pattern::Pattern;
use crate::pipe::Pipe;
use crate::results::{FileMatches, Match};

/// How many inputs a worker takes from the shared pipe per lock
/// acquisition. A small local queue amortises contention without starving
/// sibling workers.
const LOCAL_BATCH: usize = 2;

/// One matcher thread: pops paths, maps each file, runs the content pattern
/// over the mapping and pushes a bundle per file with at least one match.
pub struct MatchWorker {
    pattern: Pattern,
    cancel: CancelFlag,
    inputs: Arc<Pipe<PathBuf>>,
    results: Arc<Pipe<FileMatches>>,
}

impl MatchWorker {
    pub fn new(
        pattern: Pattern,
        cancel: CancelFlag,
        inputs: Arc<Pipe<PathBuf>>,
        results: Arc<Pipe<FileMatches>>,
    ) -> Self {
        Self {
            pattern,
            cancel,
            inputs,
            results,
        }
    }

    /// Runs until a shutdown token is consumed, then emits the terminal
    /// token on `results` so the aggregator's countdown stays well-defined.
    ///
    /// Once the cancellation flag is observed, remaining inputs are still
    /// consumed but discarded without mapping; this keeps the bounded input
    /// pipe draining so the enumerator can finish pushing its tokens.
    pub fn run(self) {
        let mut local: VecDeque<Option<PathBuf>> = VecDeque::new();
        loop {
            if local.is_empty() {
                local.extend(self.inputs.pop_blocking_batch(LOCAL_BATCH));
            }
            let Some(item) = local.pop_front() else {
                continue;
            };
            let Some(path) = item else {
                // Shutdown token; consumes exactly this one
                break;
            };
            if self.cancel.is_raised() {
                continue;
            }
            if let Some(bundle) = self.scan_file(path) {
                self.results.push(bundle);
            }
        }
        self.results.push_shutdown();
    }

    /// Maps and scans a single file. Returns a bundle when the file had at
    /// least one match; `None` on map failure, cancellation before the
    /// first match, or a clean no-match.
    fn scan_file(&self, path: PathBuf) -> Option<FileMatches> {
        trace!("Scanning {}", path.display());
        let view = match ByteView::open(&path) {
            Ok(view) => view,
            Err(e) => {
                warn!("Failed to map {}: {}", path.display(), e);
                return None;
            }
        };

        let bytes = view.bytes();
        let mut matches: Vec<Match> = Vec::new();
        let mut index: Option<LineIndex> = None;
        let mut offset = 0;

        loop {
            if self.cancel.is_raised() {
                break;
            }
            let Some((off_start, off_end)) = self.pattern.find_at(bytes, offset) else {
                break;
            };
            // The line index is only worth building once the file is known
            // to contain a match
            let lines = index.get_or_insert_with(|| LineIndex::scan(bytes));
            if self.cancel.is_raised() {
                break;
            }
            let idx_line = lines.line_containing(off_start);
            let line = lines
                .get(idx_line)
                .expect("line index covers every offset in the buffer");
            debug_assert!(line.off_start <= off_start && off_start <= line.off_end);
            matches.push(Match {
                off_start,
                off_end,
                idx_line,
                idx_column: off_start - line.off_start,
            });
            offset = off_end;
        }

        if matches.is_empty() {
            return None;
        }
        // A partial bundle from a cancelled scan is still delivered; the UI
        // discards aborted states wholesale
        let line_info = index.map(LineIndex::into_lines).unwrap_or_default();
        Some(FileMatches {
            path,
            matches,
            line_info,
            view: Some(view),
        })
    }
}
