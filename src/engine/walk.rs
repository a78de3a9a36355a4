use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::cancel::CancelFlag;
use crate::pattern::Pattern;
use crate::pipe::Pipe;

/// Breadth-first traversal of `root`, calling `emit` for every regular file
/// whose *basename* matches `filename_pattern`.
///
/// Symbolic links are followed; cycles cause unbounded work and are not
/// detected. A directory or entry that cannot be read is logged and
/// skipped; the traversal never aborts. The cancellation flag is honoured
/// between directory pops.
pub fn visit_files<F>(root: &Path, filename_pattern: &Pattern, cancel: &CancelFlag, mut emit: F)
where
    F: FnMut(PathBuf),
{
    let mut directories = VecDeque::new();
    directories.push_back(root.to_path_buf());

    while let Some(directory) = directories.pop_front() {
        if cancel.is_raised() {
            break;
        }
        let entries = match fs::read_dir(&directory) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Skipping unreadable directory {}: {}", directory.display(), e);
                continue;
            }
        };
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping entry in {}: {}", directory.display(), e);
                    continue;
                }
            };
            let path = entry.path();
            // fs::metadata follows symlinks, so a link to a directory is
            // traversed and a link to a file is tested like a file
            let metadata = match fs::metadata(&path) {
                Ok(metadata) => metadata,
                Err(e) => {
                    debug!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            };
            if metadata.is_dir() {
                directories.push_back(path);
            } else if metadata.is_file() {
                let matched = path
                    .file_name()
                    .is_some_and(|name| filename_pattern.is_match(name.as_encoded_bytes()));
                if matched {
                    emit(path);
                }
            }
        }
    }
}

/// Runs the enumerator side of the pipeline: accepted paths are batched and
/// flushed into `inputs` one lock acquisition per batch (batch size =
/// worker count), followed by exactly `worker_count` shutdown tokens.
pub fn enumerate(
    root: &Path,
    filename_pattern: &Pattern,
    cancel: &CancelFlag,
    inputs: &Pipe<PathBuf>,
    worker_count: usize,
) {
    let mut batch = Vec::with_capacity(worker_count);
    visit_files(root, filename_pattern, cancel, |path| {
        batch.push(path);
        if batch.len() == worker_count {
            inputs.push_all(batch.drain(..));
        }
    });
    if !batch.is_empty() {
        inputs.push_all(batch.drain(..));
    }
    for _ in 0..worker_count {
        inputs.push_shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Anchoring;
    use std::fs::create_dir_all;
    use tempfile::tempdir;

    fn create_test_file(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn collect(root: &Path, pattern: &str) -> Vec<PathBuf> {
        let pattern = Pattern::compile(pattern, Anchoring::BufferEdges).unwrap();
        let cancel = CancelFlag::new();
        let mut found = Vec::new();
        visit_files(root, &pattern, &cancel, |path| found.push(path));
        found.sort();
        found
    }

    #[test]
    fn test_matches_basename_not_full_path() {
        let dir = tempdir().unwrap();
        create_test_file(dir.path(), "keep.txt", "");
        create_test_file(dir.path(), "txt/other.log", "");

        // "txt" appears in the directory name but the pattern is only
        // tested against basenames
        let found = collect(dir.path(), r"\.txt$");
        assert_eq!(found, vec![dir.path().join("keep.txt")]);
    }

    #[test]
    fn test_recurses_into_subdirectories() {
        let dir = tempdir().unwrap();
        create_test_file(dir.path(), "README", "");
        create_test_file(dir.path(), "readme", "");
        create_test_file(dir.path(), "sub/README", "");
        create_test_file(dir.path(), "sub/deeper/notes.txt", "");

        let found = collect(dir.path(), "^README$");
        assert_eq!(
            found,
            vec![dir.path().join("README"), dir.path().join("sub/README")]
        );
    }

    #[test]
    fn test_missing_root_emits_nothing() {
        let dir = tempdir().unwrap();
        let found = collect(&dir.path().join("does-not-exist"), ".*");
        assert!(found.is_empty());
    }

    #[test]
    fn test_cancellation_stops_traversal() {
        let dir = tempdir().unwrap();
        create_test_file(dir.path(), "a/one.txt", "");
        create_test_file(dir.path(), "b/two.txt", "");

        let pattern = Pattern::compile(".*", Anchoring::BufferEdges).unwrap();
        let cancel = CancelFlag::new();
        cancel.raise();
        let mut found = Vec::new();
        // The flag is checked before the first directory pop, so nothing
        // below the root is visited
        visit_files(dir.path(), &pattern, &cancel, |path| found.push(path));
        assert!(found.is_empty());
    }

    #[test]
    fn test_enumerate_pushes_paths_then_tokens() {
        let dir = tempdir().unwrap();
        create_test_file(dir.path(), "a.log", "");
        create_test_file(dir.path(), "b.log", "");
        create_test_file(dir.path(), "c.txt", "");

        let pattern = Pattern::compile(r"\.log$", Anchoring::BufferEdges).unwrap();
        let cancel = CancelFlag::new();
        let inputs = Pipe::bounded(16);
        enumerate(dir.path(), &pattern, &cancel, &inputs, 3);

        let mut paths = Vec::new();
        let mut tokens = 0;
        for item in inputs.drain_up_to(16) {
            match item {
                Some(path) => paths.push(path),
                None => tokens += 1,
            }
        }
        paths.sort();
        assert_eq!(paths, vec![dir.path().join("a.log"), dir.path().join("b.log")]);
        assert_eq!(tokens, 3);
        assert!(inputs.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        create_test_file(dir.path(), "ok.txt", "");
        create_test_file(dir.path(), "locked/hidden.txt", "");
        let locked = dir.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let found = collect(dir.path(), r"\.txt$");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(found, vec![dir.path().join("ok.txt")]);
    }
}
