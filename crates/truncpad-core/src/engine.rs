//! Per-file resize state machine.
//!
//! ```text
//! Open -> (SizeQuery) -> Resize -> (Pad) -> Close
//!   \          \             \        \
//!    `----------`-------------`--------`--> Reported error
//! ```
//!
//! Close is attempted whenever open succeeded, even after a failed step.
//! Targets are processed one after another; a failure on one target never
//! stops the others.

use crate::DEFAULT_BLOCK_SIZE;
use crate::calc;
use crate::error::FileError;
use crate::handle::{HandleStat, ResizeHandle, open_target};
use crate::request::ResizeRequest;
use std::io::{self, SeekFrom};
use std::path::Path;

/// Sizes decided for one target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Length the target was set to
    pub final_size: u64,
    /// Length observed before resizing, when it had to be queried
    pub original_size: Option<u64>,
}

/// What happened to one target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// Target was resized
    Resized(ResolvedTarget),
    /// Target did not exist and creation was disabled
    Skipped,
}

/// Applies one [`ResizeRequest`] to any number of targets
#[derive(Debug, Clone)]
pub struct ResizeEngine {
    request: ResizeRequest,
}

impl ResizeEngine {
    /// Create an engine for `request`
    #[must_use]
    pub fn new(request: ResizeRequest) -> Self {
        Self { request }
    }

    /// The request this engine applies
    #[must_use]
    pub fn request(&self) -> &ResizeRequest {
        &self.request
    }

    /// Resize every target in order.
    ///
    /// # Errors
    ///
    /// Returns every per-file error encountered, in target order, if any
    /// target failed. Targets after a failing one are still processed.
    pub fn apply<P: AsRef<Path>>(&self, targets: &[P]) -> Result<(), Vec<FileError>> {
        let mut errors = Vec::new();

        for target in targets {
            if let Err(mut failed) = self.resize_path(target.as_ref()) {
                errors.append(&mut failed);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Open, resize and close a single target.
    ///
    /// # Errors
    ///
    /// Returns the errors for this target: at most the failing step plus a
    /// close failure.
    pub fn resize_path(&self, path: &Path) -> Result<FileOutcome, Vec<FileError>> {
        let file = match open_target(path, self.request.create) {
            Ok(file) => file,
            Err(e) if !self.request.create && e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("Skipping missing {:?} (creation disabled)", path);
                return Ok(FileOutcome::Skipped);
            }
            Err(source) => {
                return Err(vec![FileError::Open {
                    path: path.to_path_buf(),
                    source,
                }]);
            }
        };

        self.resize_handle(file, path).map(FileOutcome::Resized)
    }

    /// Resize through an already open handle, then close it.
    ///
    /// `path` is only used to label log lines and errors.
    ///
    /// # Errors
    ///
    /// Returns the failing step's error and/or the close error.
    pub fn resize_handle<H: ResizeHandle>(
        &self,
        mut handle: H,
        path: &Path,
    ) -> Result<ResolvedTarget, Vec<FileError>> {
        let resized = self.resize_open(&mut handle, path);
        let closed = handle.close().map_err(|source| FileError::Close {
            path: path.to_path_buf(),
            source,
        });

        match (resized, closed) {
            (Ok(target), Ok(())) => {
                tracing::info!(
                    "Resized {:?} to {} bytes (was {:?})",
                    path,
                    target.final_size,
                    target.original_size
                );
                Ok(target)
            }
            (Ok(_), Err(close)) => Err(vec![close]),
            (Err(step), Ok(())) => Err(vec![step]),
            (Err(step), Err(close)) => Err(vec![step, close]),
        }
    }

    fn resize_open<H: ResizeHandle>(
        &self,
        handle: &mut H,
        path: &Path,
    ) -> Result<ResolvedTarget, FileError> {
        let request = &self.request;

        let stat = if request.needs_current_size() {
            Some(handle.stat().map_err(|source| FileError::Stat {
                path: path.to_path_buf(),
                source,
            })?)
        } else {
            None
        };
        let block_size = stat.map_or(DEFAULT_BLOCK_SIZE, |s| effective_block_size(&s));

        let original_size = match stat {
            Some(stat) => Some(current_size(handle, &stat, path)?),
            None => None,
        };

        let resolve_error = |source| FileError::Resolve {
            path: path.to_path_buf(),
            source,
        };

        let mut spec = request.spec;
        if request.block_mode {
            spec = spec.in_blocks(block_size).map_err(resolve_error)?;
        }

        let new_size = calc::resolve(spec, original_size.unwrap_or(0), request.reference_size)
            .map_err(resolve_error)?;
        // resolve() clamps at zero
        let final_size = new_size.unsigned_abs();
        let original_size = original_size.map(i64::unsigned_abs);

        tracing::debug!(
            "{:?}: size {} applied to {:?} -> {} bytes",
            path,
            spec,
            original_size,
            final_size
        );

        handle
            .set_len(final_size)
            .map_err(|source| FileError::Truncate {
                path: path.to_path_buf(),
                size: final_size,
                source,
            })?;

        if let (Some(byte), Some(from)) = (request.pad_byte, original_size)
            && final_size > from
        {
            pad(handle, path, byte, from, final_size, block_size)?;
        }

        Ok(ResolvedTarget {
            final_size,
            original_size,
        })
    }
}

fn effective_block_size(stat: &HandleStat) -> u64 {
    match stat.block_size {
        0 => DEFAULT_BLOCK_SIZE,
        n => n,
    }
}

/// Current length of an open target, from metadata when trustworthy,
/// otherwise by seeking to the end.
fn current_size<H: ResizeHandle>(
    handle: &mut H,
    stat: &HandleStat,
    path: &Path,
) -> Result<i64, FileError> {
    let size = if stat.size_reliable {
        stat.size
    } else {
        handle
            .seek(SeekFrom::End(0))
            .map_err(|source| FileError::Size {
                path: path.to_path_buf(),
                source,
            })?
    };

    i64::try_from(size).map_err(|_| FileError::NegativeSize {
        path: path.to_path_buf(),
    })
}

/// Fill `from..to` with `byte`, one block-sized write at a time.
fn pad<H: ResizeHandle>(
    handle: &mut H,
    path: &Path,
    byte: u8,
    from: u64,
    to: u64,
    block_size: u64,
) -> Result<(), FileError> {
    let pos = handle
        .seek(SeekFrom::Start(from))
        .map_err(|source| FileError::Seek {
            path: path.to_path_buf(),
            source,
        })?;
    if pos != from {
        return Err(FileError::SeekPosition {
            path: path.to_path_buf(),
            expected: from,
            actual: pos,
        });
    }

    let chunk = usize::try_from(block_size).unwrap_or(usize::MAX);
    let block = vec![byte; chunk.min(usize::try_from(to - from).unwrap_or(usize::MAX))];

    let mut remaining = to - from;
    while remaining > 0 {
        let want = block
            .len()
            .min(usize::try_from(remaining).unwrap_or(usize::MAX));
        let written = handle
            .write(&block[..want])
            .map_err(|source| FileError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        if written < want {
            return Err(FileError::ShortWrite {
                path: path.to_path_buf(),
                written,
                requested: want,
            });
        }
        remaining -= want as u64;
        tracing::trace!("{:?}: padded {} bytes, {} left", path, want, remaining);
    }

    Ok(())
}
