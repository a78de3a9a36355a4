use std::path::PathBuf;

use crate::mapped::ByteView;

/// Byte range of one line, exclusive of the terminating newline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineInfo {
    /// Offset of the first byte of the line
    pub off_start: usize,
    /// Offset one past the last byte of the line (the `\n` itself, or the
    /// end of the file for the final line)
    pub off_end: usize,
}

/// A single content match within a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    /// Byte offset where the match starts
    pub off_start: usize,
    /// Byte offset one past the end of the match
    pub off_end: usize,
    /// Index into the file's line info of the line containing the match
    pub idx_line: usize,
    /// Byte column of the match within that line
    pub idx_column: usize,
}

/// All matches found in a single file, plus the data the UI needs to render
/// them: the line index and a shared view of the file's bytes.
///
/// Enumerate-only requests produce entries with no matches, no line info and
/// no byte view.
#[derive(Debug)]
pub struct FileMatches {
    pub path: PathBuf,
    pub matches: Vec<Match>,
    pub line_info: Vec<LineInfo>,
    pub view: Option<ByteView>,
}

impl FileMatches {
    /// An entry for a file that matched the filename pattern only.
    pub fn enumerated(path: PathBuf) -> Self {
        Self {
            path,
            matches: Vec::new(),
            line_info: Vec::new(),
            view: None,
        }
    }

    /// The bytes of line `idx_line`, without the trailing newline.
    ///
    /// Returns `None` for enumerate-only entries and out-of-range indices.
    /// This is the sub-range the UI renders as a match preview.
    pub fn line_bytes(&self, idx_line: usize) -> Option<&[u8]> {
        let line = self.line_info.get(idx_line)?;
        let bytes = self.view.as_ref()?.bytes();
        bytes.get(line.off_start..line.off_end)
    }

    /// The exact bytes covered by `m`.
    pub fn match_bytes(&self, m: &Match) -> Option<&[u8]> {
        let bytes = self.view.as_ref()?.bytes();
        bytes.get(m.off_start..m.off_end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_enumerated_entry_is_bare() {
        let entry = FileMatches::enumerated(PathBuf::from("a.txt"));
        assert_eq!(entry.path, PathBuf::from("a.txt"));
        assert!(entry.matches.is_empty());
        assert!(entry.line_info.is_empty());
        assert!(entry.view.is_none());
        assert!(entry.line_bytes(0).is_none());
    }

    #[test]
    fn test_line_and_match_bytes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "foo\nbar\n").unwrap();
        let view = ByteView::open(&path).unwrap();

        let entry = FileMatches {
            path,
            matches: vec![Match {
                off_start: 4,
                off_end: 7,
                idx_line: 1,
                idx_column: 0,
            }],
            line_info: vec![
                LineInfo {
                    off_start: 0,
                    off_end: 3,
                },
                LineInfo {
                    off_start: 4,
                    off_end: 7,
                },
                LineInfo {
                    off_start: 8,
                    off_end: 8,
                },
            ],
            view: Some(view),
        };

        assert_eq!(entry.line_bytes(0).unwrap(), b"foo");
        assert_eq!(entry.line_bytes(1).unwrap(), b"bar");
        assert_eq!(entry.line_bytes(2).unwrap(), b"");
        assert!(entry.line_bytes(3).is_none());
        assert_eq!(entry.match_bytes(&entry.matches[0]).unwrap(), b"bar");
    }
}
