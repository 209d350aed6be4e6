//! Read-only memory-mapped access to a `.brd` file.

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;

use crate::error::BrdError;

/// A whole-file read-only mapping. Holds the backing `File` and `Mmap` alive
/// for as long as the map itself is alive; downstream `Index`/`Parser` state
/// borrows from `as_slice()` and must not outlive it.
#[derive(Debug)]
pub struct FileMap {
    _file: File,
    mmap: Mmap,
}

impl FileMap {
    /// Maps `path` read-only. Fails with [`BrdError::FileOpen`] if the file
    /// cannot be opened or mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, BrdError> {
        let file = File::open(path.as_ref()).map_err(|source| BrdError::FileOpen { source })?;
        let mmap = unsafe { Mmap::map(&file) }.map_err(|source| BrdError::FileOpen { source })?;
        Ok(FileMap { _file: file, mmap })
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.mmap
    }

    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_fails_open() {
        let err = FileMap::open("/nonexistent/path/does-not-exist.brd").unwrap_err();
        assert_eq!(err.to_string(), "Failed to open file.");
    }

    #[test]
    fn maps_existing_file() {
        let mut path = std::env::temp_dir();
        path.push(format!("brdreader-filemap-test-{}", std::process::id()));
        std::fs::write(&path, b"\x00\x00\x01\x00").unwrap();
        let map = FileMap::open(&path).unwrap();
        assert_eq!(map.len(), 4);
        assert_eq!(map.as_slice(), &[0x00, 0x00, 0x01, 0x00]);
        std::fs::remove_file(&path).ok();
    }
}
