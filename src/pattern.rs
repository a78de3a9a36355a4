use regex_automata::meta;
use regex_automata::Input;
use regex_syntax::hir::{Hir, HirKind, Look};
use std::sync::Arc;

/// Pattern compilation failure, surfaced to the UI as a terminal request
/// status.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error(transparent)]
    Parse(#[from] Box<regex_syntax::Error>),
    #[error(transparent)]
    Build(#[from] meta::BuildError),
}

/// How `^` and `$` behave at the ends of the haystack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchoring {
    /// Anchors match at the haystack edges. Used for filename patterns, so
    /// `"^README$"` matches the basename `README`.
    BufferEdges,
    /// Anchors never match at the haystack edges. Used for content
    /// patterns: a mapped buffer does not begin or end a line, so `^`/`$`
    /// must not spuriously match the mapping boundaries. `(?m)` line
    /// anchors are unaffected.
    Suppressed,
}

/// An immutable compiled pattern, cheaply cloneable across worker threads.
///
/// Patterns are UTF-8 text matched against arbitrary bytes; the engine does
/// not normalise. Zero-length matches are never reported by [`find_at`]:
/// the cursor skips past them, so iterating `find_at` always terminates and
/// every reported match is non-empty.
///
/// [`find_at`]: Pattern::find_at
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: meta::Regex,
    text: Arc<str>,
}

impl Pattern {
    /// Compiles `pattern` for byte haystacks.
    ///
    /// With [`Anchoring::Suppressed`], the parsed pattern's buffer-edge
    /// anchor assertions are rewritten to a never-matching node before
    /// compilation; the rest of the pattern is untouched.
    pub fn compile(pattern: &str, anchoring: Anchoring) -> Result<Pattern, PatternError> {
        let mut parser = regex_syntax::ParserBuilder::new().utf8(false).build();
        let hir = parser.parse(pattern).map_err(Box::new)?;
        let hir = match anchoring {
            Anchoring::BufferEdges => hir,
            Anchoring::Suppressed => suppress_edge_anchors(hir),
        };
        let regex = meta::Regex::builder()
            .configure(meta::Config::new().utf8_empty(false))
            .build_from_hir(&hir)?;
        Ok(Pattern {
            regex,
            text: Arc::from(pattern),
        })
    }

    /// Leftmost match at or after `offset`, as a `[start, end)` byte range.
    ///
    /// Zero-length matches are skipped. Matching cannot fail at runtime
    /// with this engine; `None` always means no further match.
    pub fn find_at(&self, haystack: &[u8], offset: usize) -> Option<(usize, usize)> {
        let mut at = offset;
        while at <= haystack.len() {
            let m = self.regex.find(Input::new(haystack).range(at..))?;
            if m.is_empty() {
                at = m.end() + 1;
                continue;
            }
            return Some((m.start(), m.end()));
        }
        None
    }

    /// Whether `haystack` contains a match anywhere. Empty matches count,
    /// mirroring the flag-free basename test of filename patterns.
    pub fn is_match(&self, haystack: &[u8]) -> bool {
        self.regex.is_match(haystack)
    }

    /// The original pattern text.
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Rewrites `^` (`Look::Start`) and `$` (`Look::End`) to a never-matching
/// node, recursively. Multi-line and word-boundary assertions pass through.
fn suppress_edge_anchors(hir: Hir) -> Hir {
    match hir.into_kind() {
        HirKind::Look(Look::Start | Look::End) => Hir::fail(),
        HirKind::Look(look) => Hir::look(look),
        HirKind::Empty => Hir::empty(),
        HirKind::Literal(literal) => Hir::literal(literal.0),
        HirKind::Class(class) => Hir::class(class),
        HirKind::Capture(mut capture) => {
            capture.sub = Box::new(suppress_edge_anchors(*capture.sub));
            Hir::capture(capture)
        }
        HirKind::Repetition(mut repetition) => {
            repetition.sub = Box::new(suppress_edge_anchors(*repetition.sub));
            Hir::repetition(repetition)
        }
        HirKind::Concat(subs) => Hir::concat(subs.into_iter().map(suppress_edge_anchors).collect()),
        HirKind::Alternation(subs) => {
            Hir::alternation(subs.into_iter().map(suppress_edge_anchors).collect())
        }
    }
}
