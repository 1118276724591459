//! Exact decimal value for money amounts
//!
//! Accepted literal grammar: optional sign, one or more digits, optionally a
//! dot followed by one or more digits. Exponent notation, digit separators
//! and bare dots are rejected.

use rust_decimal::{Decimal as WrappedDecimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use crate::errors::GraphError;

/// Rounding rule for [`Decimal::round`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundingMode {
    /// Ties go to the even neighbour (banker's rounding)
    HalfEven,
    /// Ties go away from zero
    Plain,
    /// Toward negative infinity
    Down,
    /// Toward positive infinity
    Up,
}

impl RoundingMode {
    fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
            RoundingMode::Plain => RoundingStrategy::MidpointAwayFromZero,
            RoundingMode::Down => RoundingStrategy::ToNegativeInfinity,
            RoundingMode::Up => RoundingStrategy::ToPositiveInfinity,
        }
    }
}

/// Arbitrary-precision (28 significant digits) decimal number
///
/// Comparison and hashing are numeric, so `1.0 == 1.00`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Decimal(WrappedDecimal);

impl Decimal {
    pub const ZERO: Self = Self(WrappedDecimal::ZERO);

    /// Lenient parse used for payload values
    ///
    /// Malformed input yields zero and a warning instead of an error.
    pub fn parse(input: &str) -> Self {
        match input.parse::<Self>() {
            Ok(d) => d,
            Err(err) => {
                tracing::warn!(input = input, error = %err, "malformed decimal, using 0");
                Self::ZERO
            }
        }
    }

    pub fn from_int(value: i64) -> Self {
        Self(WrappedDecimal::from(value))
    }

    /// Convert a float through its shortest round-trip representation
    ///
    /// NaN, infinities and out-of-range values become zero with a warning.
    pub fn from_f64(value: f64) -> Self {
        if !value.is_finite() {
            tracing::warn!(value = value, "non-finite float, using 0");
            return Self::ZERO;
        }
        Self::parse(&format!("{}", value))
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    /// Multiply by an integer quantity (line totals)
    pub fn checked_mul_int(self, factor: i64) -> Option<Self> {
        self.0.checked_mul(WrappedDecimal::from(factor)).map(Self)
    }

    #[must_use]
    pub fn round(&self, dp: u32, mode: RoundingMode) -> Self {
        Self(self.0.round_dp_with_strategy(dp, mode.strategy()))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_sign_negative(&self) -> bool {
        !self.0.is_zero() && self.0.is_sign_negative()
    }

    /// Normalized textual form, identical to `Display`
    pub fn to_canonical_string(&self) -> String {
        self.0.normalize().to_string()
    }

    /// `"12.5 ₽"`
    pub fn format_with_suffix(&self, suffix: &str) -> String {
        if suffix.is_empty() {
            self.to_canonical_string()
        } else {
            format!("{} {}", self.to_canonical_string(), suffix)
        }
    }
}

fn is_plain_literal(s: &str) -> bool {
    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };
    let all_digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
    all_digits(int_part) && frac_part.map_or(true, all_digits)
}

impl FromStr for Decimal {
    type Err = GraphError;

    /// Strict parse
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: &str| GraphError::MalformedValue {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(malformed("empty decimal literal"));
        }
        if !is_plain_literal(trimmed) {
            return Err(malformed("expected [+-]digits[.digits]"));
        }

        let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
        WrappedDecimal::from_str_exact(unsigned)
            .map(Self)
            .map_err(|e| malformed(&e.to_string()))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl From<WrappedDecimal> for Decimal {
    fn from(value: WrappedDecimal) -> Self {
        Self(value)
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Self::from_int(value)
    }
}

impl Add for Decimal {
    type Output = Self;

    /// # Panics
    ///
    /// Panics on overflow, like the integer operators; use `checked_add` for
    /// untrusted magnitudes.
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Decimal {
    type Output = Self;

    /// # Panics
    ///
    /// Panics on overflow, like the integer operators; use `checked_sub` for
    /// untrusted magnitudes.
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Serialize for Decimal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_canonical_string())
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
