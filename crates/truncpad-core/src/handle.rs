//! File-system primitives used by the resize engine.
//!
//! The engine only talks to targets through [`ResizeHandle`], which keeps
//! the state machine testable against in-memory handles that misbehave on
//! purpose (short writes, failing close, ...).

use crate::DEFAULT_BLOCK_SIZE;
use crate::error::RequestError;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::Path;

/// Metadata the engine needs about an open target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleStat {
    /// Size reported by the file system
    pub size: u64,
    /// Preferred I/O block size
    pub block_size: u64,
    /// Whether `size` can be trusted (regular files, symlinks); other file
    /// types are measured by seeking to the end
    pub size_reliable: bool,
}

/// An open, writable resize target.
pub trait ResizeHandle {
    /// Query metadata
    ///
    /// # Errors
    ///
    /// Returns the underlying stat error.
    fn stat(&self) -> io::Result<HandleStat>;

    /// Reposition; returns the new offset
    ///
    /// # Errors
    ///
    /// Returns the underlying seek error.
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64>;

    /// Truncate or extend to `len` bytes
    ///
    /// # Errors
    ///
    /// Returns the underlying truncate error.
    fn set_len(&mut self, len: u64) -> io::Result<()>;

    /// Write once at the current offset; may accept fewer bytes than given
    ///
    /// # Errors
    ///
    /// Returns the underlying write error.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Release the handle
    ///
    /// # Errors
    ///
    /// Returns the error reported by close, if any.
    fn close(self) -> io::Result<()>;
}

impl ResizeHandle for File {
    fn stat(&self) -> io::Result<HandleStat> {
        let meta = self.metadata()?;
        Ok(stat_from(&meta))
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        Seek::seek(self, pos)
    }

    fn set_len(&mut self, len: u64) -> io::Result<()> {
        File::set_len(self, len)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Write::write(self, buf)
    }

    #[cfg(unix)]
    fn close(self) -> io::Result<()> {
        use std::os::unix::io::IntoRawFd;

        let fd = self.into_raw_fd();
        // SAFETY: `fd` was just released by `into_raw_fd`, so we are its sole
        // owner and it is closed exactly once here.
        let rc = unsafe { libc::close(fd) };
        if rc == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }

    #[cfg(not(unix))]
    fn close(self) -> io::Result<()> {
        drop(self);
        Ok(())
    }
}

fn stat_from(meta: &fs::Metadata) -> HandleStat {
    let file_type = meta.file_type();
    HandleStat {
        size: meta.len(),
        block_size: block_size_of(meta),
        size_reliable: file_type.is_file() || file_type.is_symlink(),
    }
}

#[cfg(unix)]
fn block_size_of(meta: &fs::Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;

    match meta.blksize() {
        0 => DEFAULT_BLOCK_SIZE,
        n => n,
    }
}

#[cfg(not(unix))]
fn block_size_of(_meta: &fs::Metadata) -> u64 {
    DEFAULT_BLOCK_SIZE
}

/// Open `path` write-only for resizing.
///
/// On Unix the file is opened non-blocking so that FIFOs never stall the
/// run, and created with mode 0666 (before umask) when `create` is set.
///
/// # Errors
///
/// Returns the underlying open error.
pub fn open_target(path: &Path, create: bool) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(create);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o666).custom_flags(libc::O_NONBLOCK);
    }

    options.open(path)
}

/// Open a reference read-only; non-blocking on Unix like targets.
fn open_reference(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.read(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.custom_flags(libc::O_NONBLOCK);
    }

    options.open(path)
}

/// Size of a reference file.
///
/// Regular files report their metadata size; anything else is opened
/// read-only and measured by seeking to its end.
///
/// # Errors
///
/// Returns [`RequestError::ReferenceStat`] if the path cannot be stat'ed and
/// [`RequestError::ReferenceSize`] if no usable size can be determined.
pub fn measure_reference(path: &Path) -> Result<i64, RequestError> {
    let size_error = |source| RequestError::ReferenceSize {
        path: path.to_path_buf(),
        source,
    };

    let meta = fs::metadata(path).map_err(|source| RequestError::ReferenceStat {
        path: path.to_path_buf(),
        source,
    })?;
    let stat = stat_from(&meta);

    let size = if stat.size_reliable {
        stat.size
    } else {
        let mut file = open_reference(path).map_err(size_error)?;
        Seek::seek(&mut file, SeekFrom::End(0)).map_err(size_error)?
    };

    i64::try_from(size).map_err(|_| {
        size_error(io::Error::new(
            io::ErrorKind::InvalidData,
            "size exceeds the file offset range",
        ))
    })
}
