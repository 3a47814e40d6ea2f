//! Error types for size parsing, size resolution, request validation and
//! per-file resizing.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while parsing a size expression.
///
/// Every variant carries the offending token as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SizeError {
    /// No digits and no recognised unit suffix
    #[error("Invalid number: \"{token}\"")]
    Invalid {
        /// Token as given
        token: String,
    },

    /// Characters left over after the number or after a unit suffix
    #[error("Invalid number: \"{token}\" (invalid suffix character)")]
    InvalidSuffix {
        /// Token as given
        token: String,
        /// The numeric part also overflowed before the bad character was hit
        overflowed: bool,
    },

    /// The digits, or the digits scaled by their unit, do not fit in 64 bits
    #[error("Invalid number: \"{token}\": Value too large for defined data type")]
    Overflow {
        /// Token as given
        token: String,
    },

    /// The value parsed cleanly but lies outside the representable file offset range
    #[error("Invalid number: \"{token}\": {value} is outside the file offset range")]
    OutOfRange {
        /// Token as given
        token: String,
        /// Parsed value
        value: i64,
    },

    /// A bracket/rounding modifier combined with a `+`/`-` sign
    #[error("multiple relative modifiers specified in \"{token}\"")]
    MultipleModifiers {
        /// Token as given
        token: String,
    },

    /// `/0` or `%0`
    #[error("division by zero")]
    DivisionByZero,
}

/// Arithmetic failures while turning a size spec into a target length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CalcError {
    /// Block count times block size overflowed
    #[error("overflow in {magnitude} * {block_size} byte blocks")]
    BlockOverflow {
        /// Block count from the size spec
        magnitude: i64,
        /// Block size reported for the file
        block_size: u64,
    },

    /// Base size plus the requested delta overflowed
    #[error("overflow extending size")]
    ExtendOverflow,
}

/// Fatal problems with the options themselves, detected before any file is
/// opened.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Neither `--size` nor `--reference`
    #[error("you must specify either --size or --reference")]
    MissingSizeOrReference,

    /// `--reference` combined with an absolute `--size`
    #[error("you must specify a relative --size with --reference")]
    AbsoluteSizeWithReference,

    /// `--io-blocks` without `--size`
    #[error("--io-blocks was specified but --size was not")]
    BlocksWithoutSize,

    /// Malformed size expression
    #[error(transparent)]
    Size(#[from] SizeError),

    /// Pad code that is not a number in 0..=255
    #[error("wrong character code argument \"{0}\"")]
    InvalidPadCode(String),

    /// Pad code that parsed but is out of range
    #[error("wrong character code value {0} (should be 0..255)")]
    PadCodeOutOfRange(i64),

    /// Reference file metadata unavailable
    #[error("cannot stat \"{}\": {source}", path.display())]
    ReferenceStat {
        /// Reference path
        path: PathBuf,
        /// Underlying cause
        #[source]
        source: io::Error,
    },

    /// Reference file size unavailable
    #[error("cannot get the size of \"{}\": {source}", path.display())]
    ReferenceSize {
        /// Reference path
        path: PathBuf,
        /// Underlying cause
        #[source]
        source: io::Error,
    },
}

/// A failure resizing one specific target file.
///
/// These never abort the run: the engine records them and moves on to the
/// next target.
#[derive(Debug, Error)]
pub enum FileError {
    /// Target could not be opened for writing
    #[error("cannot open \"{}\" for writing: {source}", path.display())]
    Open {
        /// Target path
        path: PathBuf,
        /// Underlying cause
        #[source]
        source: io::Error,
    },

    /// Target metadata unavailable
    #[error("cannot fstat \"{}\": {source}", path.display())]
    Stat {
        /// Target path
        path: PathBuf,
        /// Underlying cause
        #[source]
        source: io::Error,
    },

    /// Seeking to the end of a non-regular target failed
    #[error("cannot get the size of \"{}\": {source}", path.display())]
    Size {
        /// Target path
        path: PathBuf,
        /// Underlying cause
        #[source]
        source: io::Error,
    },

    /// Reported size does not fit a non-negative file offset
    #[error("\"{}\" has unusable, apparently negative size", path.display())]
    NegativeSize {
        /// Target path
        path: PathBuf,
    },

    /// Target length could not be computed
    #[error("{source} for file \"{}\"", path.display())]
    Resolve {
        /// Target path
        path: PathBuf,
        /// Underlying cause
        #[source]
        source: CalcError,
    },

    /// set_len failed
    #[error("failed to truncate \"{}\" at {size} bytes: {source}", path.display())]
    Truncate {
        /// Target path
        path: PathBuf,
        /// Requested length
        size: u64,
        /// Underlying cause
        #[source]
        source: io::Error,
    },

    /// Seeking to the start of the pad region failed
    #[error("failed to seek \"{}\": {source}", path.display())]
    Seek {
        /// Target path
        path: PathBuf,
        /// Underlying cause
        #[source]
        source: io::Error,
    },

    /// Seek succeeded but landed somewhere else
    #[error("wrong seek position got for \"{}\": expected {expected}, got {actual}", path.display())]
    SeekPosition {
        /// Target path
        path: PathBuf,
        /// Requested offset
        expected: u64,
        /// Offset reported by the handle
        actual: u64,
    },

    /// A pad write failed outright
    #[error("failure during writing \"{}\": {source}", path.display())]
    Write {
        /// Target path
        path: PathBuf,
        /// Underlying cause
        #[source]
        source: io::Error,
    },

    /// A pad write accepted fewer bytes than offered
    #[error("can't write block to \"{}\": wrote {written} of {requested} bytes", path.display())]
    ShortWrite {
        /// Target path
        path: PathBuf,
        /// Bytes accepted
        written: usize,
        /// Bytes offered
        requested: usize,
    },

    /// Closing the target failed
    #[error("failed to close \"{}\": {source}", path.display())]
    Close {
        /// Target path
        path: PathBuf,
        /// Underlying cause
        #[source]
        source: io::Error,
    },
}

impl FileError {
    /// Path of the file this error belongs to
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Open { path, .. }
            | Self::Stat { path, .. }
            | Self::Size { path, .. }
            | Self::NegativeSize { path }
            | Self::Resolve { path, .. }
            | Self::Truncate { path, .. }
            | Self::Seek { path, .. }
            | Self::SeekPosition { path, .. }
            | Self::Write { path, .. }
            | Self::ShortWrite { path, .. }
            | Self::Close { path, .. } => path,
        }
    }
}

/// Result type for request building
pub type Result<T> = std::result::Result<T, RequestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_error_messages_name_token() {
        let err = SizeError::Invalid {
            token: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid number: \"abc\"");

        let err = SizeError::MultipleModifiers {
            token: "<+5".to_string(),
        };
        assert!(err.to_string().contains("multiple relative modifiers"));
    }

    #[test]
    fn test_block_overflow_names_multiplicands() {
        let err = CalcError::BlockOverflow {
            magnitude: i64::MAX,
            block_size: 4096,
        };
        let msg = err.to_string();
        assert!(msg.contains(&i64::MAX.to_string()));
        assert!(msg.contains("4096"));
    }

    #[test]
    fn test_file_error_path_and_source() {
        use std::error::Error as _;

        let err = FileError::Resolve {
            path: PathBuf::from("data.bin"),
            source: CalcError::ExtendOverflow,
        };
        assert_eq!(err.path(), std::path::Path::new("data.bin"));
        assert_eq!(
            err.to_string(),
            "overflow extending size for file \"data.bin\""
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn test_request_error_from_size_error() {
        let err: RequestError = SizeError::DivisionByZero.into();
        assert!(matches!(err, RequestError::Size(SizeError::DivisionByZero)));
        assert_eq!(err.to_string(), "division by zero");
    }
}
