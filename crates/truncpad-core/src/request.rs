//! Request building: raw options in, one validated immutable
//! [`ResizeRequest`] out.

use crate::error::{RequestError, Result};
use crate::handle::measure_reference;
use crate::size::SizeSpec;
use std::path::PathBuf;

/// Options as collected from the command line, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Parsed `--size`
    pub size: Option<SizeSpec>,
    /// `--reference` file
    pub reference: Option<PathBuf>,
    /// `--io-blocks`
    pub block_mode: bool,
    /// `--no-create`
    pub no_create: bool,
    /// `--character`
    pub pad_byte: Option<u8>,
}

impl RequestOptions {
    /// Check option combinations without touching the file system.
    ///
    /// # Errors
    ///
    /// - [`RequestError::MissingSizeOrReference`] with neither a size nor a reference
    /// - [`RequestError::AbsoluteSizeWithReference`] for a reference plus an absolute size
    /// - [`RequestError::BlocksWithoutSize`] for block mode without a size
    pub fn validate(&self) -> Result<()> {
        match (&self.size, &self.reference) {
            (None, None) => return Err(RequestError::MissingSizeOrReference),
            (Some(spec), Some(_)) if !spec.modifier.is_relative() => {
                return Err(RequestError::AbsoluteSizeWithReference);
            }
            _ => {}
        }

        if self.block_mode && self.size.is_none() {
            return Err(RequestError::BlocksWithoutSize);
        }

        Ok(())
    }
}

/// Everything the engine needs to resize any number of targets the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeRequest {
    /// Size expression
    pub spec: SizeSpec,
    /// Base size taken from a reference file, for relative specs
    pub reference_size: Option<i64>,
    /// Multiply the magnitude by each target's block size
    pub block_mode: bool,
    /// Byte to write across newly added space
    pub pad_byte: Option<u8>,
    /// Create missing targets
    pub create: bool,
}

impl ResizeRequest {
    /// Request for `spec` with creation enabled and nothing else set
    #[must_use]
    pub fn new(spec: SizeSpec) -> Self {
        Self {
            spec,
            reference_size: None,
            block_mode: false,
            pad_byte: None,
            create: true,
        }
    }

    /// Validate `options` and measure the reference file, if any.
    ///
    /// # Errors
    ///
    /// Returns the validation error from [`RequestOptions::validate`], or a
    /// reference measurement error.
    pub fn from_options(options: RequestOptions) -> Result<Self> {
        options.validate()?;

        let measured = options
            .reference
            .as_deref()
            .map(measure_reference)
            .transpose()?;

        let (spec, reference_size) = match (options.size, measured) {
            (Some(spec), reference_size) => (spec, reference_size),
            (None, Some(size)) => (SizeSpec::absolute(size), None),
            (None, None) => return Err(RequestError::MissingSizeOrReference),
        };

        tracing::debug!(
            "Resize request: size {}, reference {:?}, blocks {}, pad {:?}, create {}",
            spec,
            reference_size,
            options.block_mode,
            options.pad_byte,
            !options.no_create
        );

        Ok(Self {
            spec,
            reference_size,
            block_mode: options.block_mode,
            pad_byte: options.pad_byte,
            create: !options.no_create,
        })
    }

    /// Whether each target's own size (or block size) must be queried
    #[must_use]
    pub fn needs_current_size(&self) -> bool {
        self.block_mode
            || self.pad_byte.is_some()
            || (self.spec.modifier.is_relative() && self.reference_size.is_none())
    }
}

/// Parse a pad byte code: decimal, `0x` hexadecimal or `0`-prefixed octal.
///
/// The whole string must be consumed and the value must lie in `0..=255`.
///
/// # Errors
///
/// Returns [`RequestError::InvalidPadCode`] for malformed input and
/// [`RequestError::PadCodeOutOfRange`] for values outside a byte.
pub fn parse_pad_byte(code: &str) -> Result<u8> {
    let invalid = || RequestError::InvalidPadCode(code.to_string());

    let trimmed = code.trim_start();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let (radix, digits) = if let Some(hex) = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        (16, hex)
    } else if unsigned.len() > 1 && unsigned.starts_with('0') {
        (8, &unsigned[1..])
    } else {
        (10, unsigned)
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(invalid());
    }

    let magnitude = i64::from_str_radix(digits, radix).unwrap_or(i64::MAX);
    let value = if negative { -magnitude } else { magnitude };

    u8::try_from(value).map_err(|_| RequestError::PadCodeOutOfRange(value))
}
