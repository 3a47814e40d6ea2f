//! # truncpad core
//!
//! Shrink or extend files to a computed length.
//!
//! This crate provides:
//! - Size expressions with unit suffixes and relative modifiers
//! - Target length resolution against the file's own size or a reference
//! - A per-file resize state machine with optional explicit padding
//!
//! ```no_run
//! use truncpad_core::{ResizeEngine, ResizeRequest, size};
//!
//! let mut request = ResizeRequest::new(size::parse("%4K")?);
//! request.pad_byte = Some(0xff);
//! ResizeEngine::new(request)
//!     .apply(&["disk.img"])
//!     .map_err(|errors| errors.into_iter().next().unwrap())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod calc;
pub mod engine;
pub mod error;
pub mod handle;
pub mod request;
pub mod size;

pub use engine::{FileOutcome, ResizeEngine, ResolvedTarget};
pub use error::{CalcError, FileError, RequestError, Result, SizeError};
pub use request::{RequestOptions, ResizeRequest, parse_pad_byte};
pub use size::{Modifier, SizeParser, SizeSpec};

/// Block size used for padding writes and `--io-blocks` when the file
/// system reports none.
pub const DEFAULT_BLOCK_SIZE: u64 = 4096;
