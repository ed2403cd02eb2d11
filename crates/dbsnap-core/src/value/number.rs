//! Exact decimal numbers.
//!
//! A [`Number`] keeps the text it was built from and a normalized
//! `digits × 10^-scale` form. Equality, ordering and hashing use the
//! normalized form, so `1.50` and `1.5` are the same number while
//! [`Number::as_str`] still returns the original text.

use crate::errors::{DbSnapError, Result};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// Largest accepted `|scale|`, the range of a 32-bit exponent
const MAX_SCALE: i64 = i32::MAX as i64;

/// Digits an `i64` can hold
const I64_DIGITS: usize = 19;

#[derive(Debug, Clone)]
pub struct Number {
    text: String,
    negative: bool,
    /// Significant digits without leading or trailing zeros; empty for zero.
    digits: String,
    scale: i64,
}

impl Number {
    /// Parse a decimal literal (`-12`, `3.50`, `.5`, `1.5E3`).
    ///
    /// # Errors
    ///
    /// `InvalidValue` when the text is not a decimal literal or its exponent
    /// puts the scale outside `±(2^31 - 1)`.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || DbSnapError::InvalidValue {
            reason: format!("<{}> is not a decimal number", text),
        };
        let trimmed = text.trim();
        let (negative, unsigned) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let (mantissa, exponent) = match unsigned.find(|c: char| c == 'e' || c == 'E') {
            Some(pos) => {
                let exp: i64 = unsigned[pos + 1..].parse().map_err(|_| invalid())?;
                (&unsigned[..pos], exp)
            }
            None => (unsigned, 0),
        };

        let (int_part, frac_part) = match mantissa.split_once('.') {
            Some((i, f)) => (i, f),
            None => (mantissa, ""),
        };
        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if (int_part.is_empty() && frac_part.is_empty())
            || !all_digits(int_part)
            || !all_digits(frac_part)
        {
            return Err(invalid());
        }

        let frac_len = i64::try_from(frac_part.len()).map_err(|_| invalid())?;
        let mut scale = frac_len.checked_sub(exponent).ok_or_else(invalid)?;
        let mut digits: String = int_part
            .chars()
            .chain(frac_part.chars())
            .skip_while(|c| *c == '0')
            .collect();
        while digits.ends_with('0') {
            digits.pop();
            scale = scale.checked_sub(1).ok_or_else(invalid)?;
        }
        if digits.is_empty() {
            scale = 0;
        }
        if !(-MAX_SCALE..=MAX_SCALE).contains(&scale) {
            return Err(DbSnapError::InvalidValue {
                reason: format!("<{}> has an exponent out of range", text),
            });
        }

        Ok(Self {
            text: text.to_string(),
            negative: negative && !digits.is_empty(),
            digits,
            scale,
        })
    }

    /// Build from a float using its shortest round-trip text.
    ///
    /// Returns `None` for NaN and infinities.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        Self::parse(&value.to_string()).ok()
    }

    /// The exact text this number was built from
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_zero(&self) -> bool {
        self.digits.is_empty()
    }

    /// Lossy conversion for callers needing a float
    pub fn to_f64(&self) -> f64 {
        self.text.trim().parse().unwrap_or(f64::NAN)
    }

    /// Integer value when the number is integral and fits
    pub fn to_i64(&self) -> Option<i64> {
        if self.scale > 0 {
            return None;
        }
        let zeros = usize::try_from(-self.scale).ok()?;
        if self.digits.len() + zeros > I64_DIGITS {
            return None;
        }
        let mut text = String::with_capacity(self.digits.len() + zeros + 1);
        if self.negative {
            text.push('-');
        }
        text.push_str(if self.digits.is_empty() { "0" } else { &self.digits });
        if !self.digits.is_empty() {
            text.extend(std::iter::repeat('0').take(zeros));
        }
        text.parse().ok()
    }

    /// Position of the most significant digit relative to the decimal point.
    fn magnitude(&self) -> i64 {
        i64::try_from(self.digits.len())
            .unwrap_or(i64::MAX)
            .saturating_sub(self.scale)
    }

    fn cmp_abs(&self, other: &Self) -> Ordering {
        match (self.digits.is_empty(), other.digits.is_empty()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {}
        }
        // Without trailing zeros, equal magnitudes compare digit-wise and a
        // longer digit string is the bigger one.
        self.magnitude()
            .cmp(&other.magnitude())
            .then_with(|| self.digits.as_bytes().cmp(other.digits.as_bytes()))
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.negative == other.negative && self.digits == other.digits && self.scale == other.scale
    }
}

impl Eq for Number {}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.negative.hash(state);
        self.digits.hash(state);
        self.scale.hash(state);
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => self.cmp_abs(other),
            (true, true) => other.cmp_abs(self),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

macro_rules! number_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Number {
                fn from(value: $t) -> Self {
                    let text = value.to_string();
                    let unsigned = text.trim_start_matches('-');
                    let mut digits = unsigned.to_string();
                    let mut scale = 0i64;
                    while digits.ends_with('0') {
                        digits.pop();
                        scale -= 1;
                    }
                    if digits.is_empty() {
                        scale = 0;
                    }
                    Self {
                        negative: text.starts_with('-'),
                        text,
                        digits,
                        scale,
                    }
                }
            }
        )*
    };
}

number_from_integer!(i8, i16, i32, i64, u8, u16, u32, u64);
