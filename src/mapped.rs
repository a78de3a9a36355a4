use memmap2::Mmap;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A read-only, reference-counted byte view of a file.
///
/// Backed by a memory mapping for non-empty files. Cloning is cheap and
/// shares the mapping; the mapping is released when the last clone is
/// dropped. A worker hands its view to the result bundle, which transfers
/// the reference into the request state, so the bytes stay valid for as
/// long as the UI can reach them.
#[derive(Debug, Clone)]
pub struct ByteView {
    inner: Arc<MappedFile>,
}

#[derive(Debug)]
struct MappedFile {
    path: PathBuf,
    // Mapping a zero-length file is platform-dependent, so empty files
    // carry no mapping and serve an empty slice.
    map: Option<Mmap>,
}

impl ByteView {
    /// Opens and maps the file at `path`.
    pub fn open(path: &Path) -> io::Result<ByteView> {
        let file = File::open(path)?;
        let metadata = file.metadata()?;
        let map = if metadata.len() == 0 {
            None
        } else {
            Some(unsafe { Mmap::map(&file)? })
        };
        Ok(ByteView {
            inner: Arc::new(MappedFile {
                path: path.to_path_buf(),
                map,
            }),
        })
    }

    pub fn bytes(&self) -> &[u8] {
        self.inner.map.as_deref().unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }
}
