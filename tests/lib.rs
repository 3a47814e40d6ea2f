//! Shared helpers for truncpad integration tests

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write `len` copies of `byte` to `name` inside `dir`
pub fn file_with(dir: &TempDir, name: &str, byte: u8, len: usize) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, vec![byte; len]).unwrap();
    path
}

/// Current length of `path`
pub fn len_of(path: &Path) -> u64 {
    fs::metadata(path).unwrap().len()
}

/// Preferred I/O block size the file system reports for `path`
#[cfg(unix)]
pub fn io_block_size(path: &Path) -> u64 {
    use std::os::unix::fs::MetadataExt;

    match fs::metadata(path).unwrap().blksize() {
        0 => truncpad_core::DEFAULT_BLOCK_SIZE,
        n => n,
    }
}

/// Preferred I/O block size the file system reports for `path`
#[cfg(not(unix))]
pub fn io_block_size(_path: &Path) -> u64 {
    truncpad_core::DEFAULT_BLOCK_SIZE
}
