//! Size expression parsing.
//!
//! A size expression is an optional modifier character, an optional sign,
//! a decimal number and an optional unit suffix:
//!
//! ```text
//!   [ws] [< > / %] [ws] [+ -] digits [K|M|G|T|P|E|Z|Y] [iB | B | D]
//! ```
//!
//! Units are powers of 1024 by default (`K`, `KiB`) and powers of 1000 when
//! followed by `B` (`KB`). Lowercase `k`, `g`, `m`, `t` are accepted for
//! compatibility with BSD tools. A unit with no digits in front of it means
//! one unit, so `"M"` is 1048576.

use crate::error::SizeError;
use std::fmt;
use std::str::FromStr;

/// Suffix letters that may follow (or replace) the digits.
const SUFFIX_LETTERS: &[u8] = b"EgGkKmMPtTYZ";

/// How the magnitude of a [`SizeSpec`] is applied to the base size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Modifier {
    /// Set the size to exactly the magnitude
    #[default]
    Absolute,
    /// `+N` / `-N`: grow or shrink by the magnitude
    RelativeDelta,
    /// `>N`: grow to at least the magnitude
    AtLeast,
    /// `<N`: shrink to at most the magnitude
    AtMost,
    /// `/N`: round down to a multiple of the magnitude
    RoundDown,
    /// `%N`: round up to a multiple of the magnitude
    RoundUp,
}

impl Modifier {
    /// Modifier selected by a leading character, if any
    #[must_use]
    pub fn from_prefix(c: u8) -> Option<Self> {
        match c {
            b'<' => Some(Self::AtMost),
            b'>' => Some(Self::AtLeast),
            b'/' => Some(Self::RoundDown),
            b'%' => Some(Self::RoundUp),
            _ => None,
        }
    }

    /// Whether the result depends on a base size
    #[must_use]
    pub fn is_relative(self) -> bool {
        self != Self::Absolute
    }

    /// Whether the magnitude is used as a modulus
    #[must_use]
    pub fn is_rounding(self) -> bool {
        matches!(self, Self::RoundDown | Self::RoundUp)
    }
}

/// A parsed size expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SizeSpec {
    /// Byte (or block) count after unit scaling
    pub magnitude: i64,
    /// How the magnitude applies to the base size
    pub modifier: Modifier,
}

impl SizeSpec {
    /// An absolute size
    #[must_use]
    pub fn absolute(magnitude: i64) -> Self {
        Self {
            magnitude,
            modifier: Modifier::Absolute,
        }
    }
}

impl fmt::Display for SizeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.magnitude;
        match self.modifier {
            Modifier::Absolute => write!(f, "{m}"),
            Modifier::RelativeDelta => write!(f, "{m:+}"),
            Modifier::AtLeast => write!(f, ">{m}"),
            Modifier::AtMost => write!(f, "<{m}"),
            Modifier::RoundDown => write!(f, "/{m}"),
            Modifier::RoundUp => write!(f, "%{m}"),
        }
    }
}

impl FromStr for SizeSpec {
    type Err = SizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Parse a size expression against the full 64-bit offset range.
///
/// # Errors
///
/// See [`SizeParser::parse`].
pub fn parse(token: &str) -> Result<SizeSpec, SizeError> {
    SizeParser::default().parse(token)
}

/// Size expression parser bounded by a file offset range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeParser {
    min_offset: i64,
    max_offset: i64,
}

impl Default for SizeParser {
    fn default() -> Self {
        Self {
            min_offset: i64::MIN,
            max_offset: i64::MAX,
        }
    }
}

impl SizeParser {
    /// Parser accepting any 64-bit offset
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser for a platform whose file offsets span `min..=max`
    #[must_use]
    pub fn with_offset_range(min: i64, max: i64) -> Self {
        Self {
            min_offset: min,
            max_offset: max,
        }
    }

    /// Parse `token` into a [`SizeSpec`].
    ///
    /// # Errors
    ///
    /// - [`SizeError::MultipleModifiers`] for a modifier character followed by a sign
    /// - [`SizeError::Invalid`] when there are neither digits nor a unit
    /// - [`SizeError::InvalidSuffix`] for trailing garbage
    /// - [`SizeError::Overflow`] when the digits or the unit scaling overflow
    /// - [`SizeError::OutOfRange`] when the value falls outside the offset range
    /// - [`SizeError::DivisionByZero`] for `/0` and `%0`
    pub fn parse(&self, token: &str) -> Result<SizeSpec, SizeError> {
        let bytes = token.as_bytes();
        let mut pos = skip_space(bytes, 0);
        let mut modifier = Modifier::Absolute;

        if let Some(m) = bytes.get(pos).copied().and_then(Modifier::from_prefix) {
            modifier = m;
            pos = skip_space(bytes, pos + 1);
        }

        if matches!(bytes.get(pos), Some(b'+' | b'-')) {
            if modifier.is_relative() {
                return Err(SizeError::MultipleModifiers {
                    token: token.to_string(),
                });
            }
            modifier = Modifier::RelativeDelta;
        }

        let magnitude = self.parse_magnitude(&bytes[pos..], token)?;

        if modifier.is_rounding() && magnitude == 0 {
            return Err(SizeError::DivisionByZero);
        }

        Ok(SizeSpec {
            magnitude,
            modifier,
        })
    }

    fn parse_magnitude(&self, s: &[u8], token: &str) -> Result<i64, SizeError> {
        let (mut value, mut overflowed, rest) = match scan_decimal(s) {
            Some(scan) => scan,
            None if s.first().is_some_and(|c| SUFFIX_LETTERS.contains(c)) => (1, false, s),
            None => {
                return Err(SizeError::Invalid {
                    token: token.to_string(),
                });
            }
        };

        if let Some(&letter) = rest.first() {
            let Some(power) = suffix_power(letter) else {
                return Err(SizeError::InvalidSuffix {
                    token: token.to_string(),
                    overflowed,
                });
            };

            let (base, consumed) = match (rest.get(1), rest.get(2)) {
                (Some(b'i'), Some(b'B')) => (1024, 3),
                (Some(b'B' | b'D'), _) => (1000, 2),
                _ => (1024, 1),
            };

            overflowed |= scale_by_power(&mut value, base, power);

            if rest.len() > consumed {
                return Err(SizeError::InvalidSuffix {
                    token: token.to_string(),
                    overflowed,
                });
            }
        }

        if overflowed {
            return Err(SizeError::Overflow {
                token: token.to_string(),
            });
        }

        if value < self.min_offset || value > self.max_offset {
            return Err(SizeError::OutOfRange {
                token: token.to_string(),
                value,
            });
        }

        Ok(value)
    }
}

/// Same set as C `isspace` in the "C" locale.
fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}

fn skip_space(bytes: &[u8], mut pos: usize) -> usize {
    while bytes.get(pos).copied().is_some_and(is_space) {
        pos += 1;
    }
    pos
}

/// Parse an optionally signed run of decimal digits.
///
/// Returns the value (saturated on overflow), whether it overflowed, and
/// the unconsumed remainder. `None` when there are no digits at all.
fn scan_decimal(s: &[u8]) -> Option<(i64, bool, &[u8])> {
    let (negative, digits_at) = match s.first() {
        Some(b'-') => (true, 1),
        Some(b'+') => (false, 1),
        _ => (false, 0),
    };

    let digits = s[digits_at..]
        .iter()
        .take_while(|c| c.is_ascii_digit())
        .count();
    if digits == 0 {
        return None;
    }

    let mut value: i64 = 0;
    let mut overflowed = false;
    for &c in &s[digits_at..digits_at + digits] {
        let d = i64::from(c - b'0');
        let next = value.checked_mul(10).and_then(|v| {
            if negative {
                v.checked_sub(d)
            } else {
                v.checked_add(d)
            }
        });
        match next {
            Some(v) if !overflowed => value = v,
            _ => {
                overflowed = true;
                value = if negative { i64::MIN } else { i64::MAX };
            }
        }
    }

    Some((value, overflowed, &s[digits_at + digits..]))
}

fn suffix_power(letter: u8) -> Option<u32> {
    match letter {
        b'k' | b'K' => Some(1),
        b'm' | b'M' => Some(2),
        b'g' | b'G' => Some(3),
        b't' | b'T' => Some(4),
        b'P' => Some(5),
        b'E' => Some(6),
        b'Z' => Some(7),
        b'Y' => Some(8),
        _ => None,
    }
}

/// Multiply `value` by `base^power`, saturating on overflow.
///
/// Returns `true` if any step overflowed.
fn scale_by_power(value: &mut i64, base: i64, power: u32) -> bool {
    let mut overflowed = false;
    for _ in 0..power {
        match value.checked_mul(base) {
            Some(v) => *value = v,
            None => {
                *value = if *value < 0 { i64::MIN } else { i64::MAX };
                overflowed = true;
            }
        }
    }
    overflowed
}
