//! Target length resolution.
//!
//! Pure arithmetic: a [`SizeSpec`] plus the sizes observed for the target
//! (and optionally a reference file) give the new length. No I/O happens
//! here.

use crate::error::CalcError;
use crate::size::{Modifier, SizeSpec};

impl SizeSpec {
    /// Reinterpret the magnitude as a count of `block_size`-byte blocks.
    ///
    /// # Errors
    ///
    /// Returns [`CalcError::BlockOverflow`] if the byte count does not fit in
    /// an `i64`.
    pub fn in_blocks(self, block_size: u64) -> Result<Self, CalcError> {
        let overflow = CalcError::BlockOverflow {
            magnitude: self.magnitude,
            block_size,
        };
        let block_size = i64::try_from(block_size).map_err(|_| overflow)?;
        let magnitude = self.magnitude.checked_mul(block_size).ok_or(overflow)?;
        Ok(Self { magnitude, ..self })
    }
}

/// Compute the new length for a file.
///
/// With a reference size and an absolute spec the reference size wins.
/// Otherwise relative modifiers apply to the reference size when present,
/// else to `current_size`. Negative results clamp to zero.
///
/// # Errors
///
/// Returns [`CalcError::ExtendOverflow`] if growing the base overflows.
pub fn resolve(
    spec: SizeSpec,
    current_size: i64,
    reference_size: Option<i64>,
) -> Result<i64, CalcError> {
    if let (Some(reference), Modifier::Absolute) = (reference_size, spec.modifier) {
        return Ok(reference.max(0));
    }

    let base = reference_size.unwrap_or(current_size);
    let m = spec.magnitude;

    let size = match spec.modifier {
        Modifier::Absolute => m,
        Modifier::RelativeDelta => base.checked_add(m).ok_or(CalcError::ExtendOverflow)?,
        Modifier::AtLeast => base.max(m),
        Modifier::AtMost => base.min(m),
        // 0..m-1 -> 0
        Modifier::RoundDown => base - base % m,
        // 1..m -> m
        Modifier::RoundUp => {
            let r = base % m;
            let grow = if r == 0 { 0 } else { m - r };
            base.checked_add(grow).ok_or(CalcError::ExtendOverflow)?
        }
    };

    Ok(size.max(0))
}
