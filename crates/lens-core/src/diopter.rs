//! # Diopter Module
//!
//! Provides the `Diopter` type for optical powers.
//!
//! ## Why Integer Hundredths?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  With floats:                                                           │
//! │    -2.00 + -0.75 = -2.75 ... but -0.1 + -0.2 = -0.30000000000000004     │
//! │    and -0.0 prints as "-0.00" when transposing a zero cylinder          │
//! │                                                                         │
//! │  OUR SOLUTION: Integer hundredths of a diopter                          │
//! │    -275 = -2.75 D, always exactly two decimals, no negative zero        │
//! │    Range comparisons against catalog rules are exact                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use lens_core::diopter::Diopter;
//!
//! let sph = Diopter::parse("spherical", "-2.00").unwrap();
//! let cyl = Diopter::from_hundredths(-75);
//!
//! assert_eq!((sph + cyl).to_string(), "-2.75");
//! assert_eq!((-cyl).signed(), "+0.75");
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Neg};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::{GRID_STEP_HUNDREDTHS, MAX_ABS_POWER_HUNDREDTHS};

// =============================================================================
// Diopter Type
// =============================================================================

/// An optical power in hundredths of a diopter.
///
/// ## Design Decisions
/// - **i32 (signed)**: Negative powers are the common case (myopia)
/// - **Single field tuple struct**: Zero-cost abstraction over i32
/// - **Ord**: Lets powers act as grid and range keys
///
/// ## Where Diopter is Used
/// ```text
/// Request "-3.00" ──► Diopter(-300) ──┬──► Rule range check (exact)
///                                     ├──► LensRecord.spherical ("-3.00")
///                                     └──► Label display ("-3.00", "+0.75")
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Diopter(i32);

impl Diopter {
    /// Zero power (plano).
    pub const ZERO: Diopter = Diopter(0);

    /// Creates a power from hundredths of a diopter.
    ///
    /// ## Example
    /// ```rust
    /// use lens_core::diopter::Diopter;
    ///
    /// assert_eq!(Diopter::from_hundredths(-325).to_string(), "-3.25");
    /// ```
    #[inline]
    pub const fn from_hundredths(hundredths: i32) -> Self {
        Diopter(hundredths)
    }

    /// Returns the power in hundredths of a diopter.
    #[inline]
    pub const fn hundredths(&self) -> i32 {
        self.0
    }

    /// The power in diopters, for comparison against catalog bounds.
    #[inline]
    pub fn as_f64(&self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// Creates a power from a float, rounding to two decimals.
    ///
    /// Non-finite input is rejected as [`CoreError::InvalidNumericInput`];
    /// a magnitude above 99.99 D is a validation error.
    pub fn from_f64(field: &str, value: f64) -> CoreResult<Self> {
        if !value.is_finite() {
            return Err(CoreError::InvalidNumericInput {
                field: field.to_string(),
                input: value.to_string(),
            });
        }

        let hundredths = (value * 100.0).round();
        if hundredths.abs() > MAX_ABS_POWER_HUNDREDTHS as f64 {
            return Err(ValidationError::InvalidFormat {
                field: field.to_string(),
                reason: format!("{value} is outside -99.99..=+99.99"),
            }
            .into());
        }

        Ok(Diopter(hundredths as i32))
    }

    /// Parses a power typed by a user ("-3.00", "+1.5", " 0 ").
    ///
    /// ## Example
    /// ```rust
    /// use lens_core::diopter::Diopter;
    ///
    /// assert_eq!(Diopter::parse("spherical", "+1.5").unwrap().hundredths(), 150);
    /// assert!(Diopter::parse("spherical", "abc").is_err());
    /// assert!(Diopter::parse("spherical", "NaN").is_err());
    /// ```
    pub fn parse(field: &str, input: &str) -> CoreResult<Self> {
        let trimmed = input.trim();
        let value: f64 = trimmed
            .parse()
            .map_err(|_| CoreError::InvalidNumericInput {
                field: field.to_string(),
                input: input.to_string(),
            })?;

        if !value.is_finite() {
            return Err(CoreError::InvalidNumericInput {
                field: field.to_string(),
                input: input.to_string(),
            });
        }

        Self::from_f64(field, value)
    }

    /// Checks if the power is strictly positive.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the power sits on the 0.25 D grid.
    #[inline]
    pub const fn is_on_grid(&self) -> bool {
        self.0 % GRID_STEP_HUNDREDTHS == 0
    }

    /// Two decimals with an explicit `+` when strictly positive.
    ///
    /// ## Example
    /// ```rust
    /// use lens_core::diopter::Diopter;
    ///
    /// assert_eq!(Diopter::from_hundredths(50).signed(), "+0.50");
    /// assert_eq!(Diopter::from_hundredths(0).signed(), "0.00");
    /// assert_eq!(Diopter::from_hundredths(-75).signed(), "-0.75");
    /// ```
    pub fn signed(&self) -> String {
        if self.is_positive() {
            format!("+{self}")
        } else {
            self.to_string()
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Two decimals, native `-` for negatives, no sign otherwise.
impl fmt::Display for Diopter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Add for Diopter {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Diopter(self.0 + other.0)
    }
}

impl Neg for Diopter {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Diopter(-self.0)
    }
}

/// Serialized as the two-decimal string, e.g. `"-3.00"`.
impl Serialize for Diopter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Accepts a JSON number (`-6`, `-0.75`) or a string (`"-6.00"`).
impl<'de> Deserialize<'de> for Diopter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        let parsed = match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Diopter::from_f64("power", value),
            Raw::Text(text) => Diopter::parse("power", &text),
        };
        parsed.map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Diopter::from_hundredths(-300).to_string(), "-3.00");
        assert_eq!(Diopter::from_hundredths(-25).to_string(), "-0.25");
        assert_eq!(Diopter::from_hundredths(0).to_string(), "0.00");
        assert_eq!(Diopter::from_hundredths(1050).to_string(), "10.50");
    }

    #[test]
    fn test_negated_zero_has_no_sign() {
        let cyl = Diopter::ZERO;
        assert_eq!((-cyl).to_string(), "0.00");
        assert_eq!((-cyl).signed(), "0.00");
    }

    #[test]
    fn test_parse_rounds_to_two_decimals() {
        assert_eq!(Diopter::parse("spherical", "-3").unwrap().hundredths(), -300);
        assert_eq!(Diopter::parse("spherical", " -0.25 ").unwrap().hundredths(), -25);
        assert_eq!(Diopter::parse("spherical", "1.004").unwrap().hundredths(), 100);
        assert_eq!(Diopter::parse("spherical", "+2.5").unwrap().hundredths(), 250);
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        for input in ["", "abc", "-3.00D", "inf", "NaN"] {
            let err = Diopter::parse("cylinder", input).unwrap_err();
            assert!(
                matches!(err, CoreError::InvalidNumericInput { .. }),
                "{input:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_magnitude_limit() {
        assert!(Diopter::from_f64("spherical", 99.99).is_ok());
        assert!(Diopter::from_f64("spherical", -100.0).is_err());
    }

    #[test]
    fn test_grid_alignment() {
        assert!(Diopter::from_hundredths(-275).is_on_grid());
        assert!(Diopter::from_hundredths(0).is_on_grid());
        assert!(!Diopter::from_hundredths(-10).is_on_grid());
    }

    #[test]
    fn test_serde_accepts_numbers_and_strings() {
        let from_number: Diopter = serde_json::from_str("-6").unwrap();
        let from_text: Diopter = serde_json::from_str("\"-6.00\"").unwrap();
        assert_eq!(from_number, from_text);
        assert_eq!(serde_json::to_string(&from_number).unwrap(), "\"-6.00\"");
    }

    #[test]
    fn test_ordering() {
        assert!(Diopter::from_hundredths(-600) < Diopter::ZERO);
        assert!(Diopter::from_hundredths(25) > Diopter::ZERO);
    }
}
