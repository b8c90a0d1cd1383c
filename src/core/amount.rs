//! Decimal Fixed-Point Token Amounts
//!
//! All balances, stakes, and rewards use integer arithmetic only - no floats
//! anywhere in accounting logic.
//!
//! ## Format
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Amount: u64 counting 1/10_000 token units                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  1 GT      = 10_000 units                                   │
//! │  0.5 GT    =  5_000 units                                   │
//! │  Range: ~1.8e15 whole tokens                                │
//! │  Precision: 0.0001 tokens (4 decimal places)                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why decimal fixed-point?
//!
//! - Reward multipliers (1.0x, 1.1x, 1.5x) are exact per-myriad factors
//! - No binary-fraction drift when settling stakes
//! - Checked arithmetic makes overflow a reportable error, not a wrap

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Units per whole token (4 decimal places).
pub const AMOUNT_SCALE: u64 = 10_000;

/// Denominator for per-myriad multipliers and conversion rates.
///
/// A factor of 10_000 means 1.0x; 11_000 means 1.1x.
pub const PER_MYRIAD: u64 = 10_000;

/// A non-negative token amount in 1/10_000 units.
///
/// Used for both GT and USDT balances; the two currencies are never mixed
/// inside a single `Amount` value.
#[derive(
    Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    /// Zero tokens.
    pub const ZERO: Self = Self(0);

    /// Create from raw 1/10_000 units.
    #[inline]
    pub const fn from_units(units: u64) -> Self {
        Self(units)
    }

    /// Create from a whole number of tokens.
    #[inline]
    pub const fn from_whole(tokens: u64) -> Self {
        Self(tokens * AMOUNT_SCALE)
    }

    /// Raw unit count.
    #[inline]
    pub const fn units(self) -> u64 {
        self.0
    }

    /// Whole-token part, truncated.
    #[inline]
    pub const fn whole(self) -> u64 {
        self.0 / AMOUNT_SCALE
    }

    /// Is this exactly zero?
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Checked addition. `None` on overflow.
    #[inline]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Checked subtraction. `None` if `rhs > self`.
    #[inline]
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    /// Saturating addition.
    #[inline]
    pub fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    /// Multiply by a per-myriad factor (10_000 = 1.0x).
    ///
    /// Widens to u128 so the intermediate product cannot overflow, then
    /// truncates toward zero when rescaling.
    #[inline]
    pub fn mul_per_myriad(self, factor: u32) -> Self {
        let wide = (self.0 as u128) * (factor as u128);
        Self((wide / PER_MYRIAD as u128) as u64)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / AMOUNT_SCALE;
        let frac = self.0 % AMOUNT_SCALE;
        if frac == 0 {
            write!(f, "{whole}")
        } else {
            let s = format!("{frac:04}");
            write!(f, "{}.{}", whole, s.trim_end_matches('0'))
        }
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amount({self})")
    }
}

/// Error parsing a decimal amount string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAmountError;

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid token amount")
    }
}

impl std::error::Error for ParseAmountError {}

impl FromStr for Amount {
    type Err = ParseAmountError;

    /// Parse `"12"`, `"12.5"`, or `"0.0001"` (at most 4 fractional digits).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (whole_str, frac_str) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole_str.is_empty() || frac_str.len() > 4 {
            return Err(ParseAmountError);
        }
        let whole: u64 = whole_str.parse().map_err(|_| ParseAmountError)?;
        let frac: u64 = if frac_str.is_empty() {
            0
        } else {
            let padded = format!("{frac_str:0<4}");
            padded.parse().map_err(|_| ParseAmountError)?
        };
        whole
            .checked_mul(AMOUNT_SCALE)
            .and_then(|u| u.checked_add(frac))
            .map(Amount)
            .ok_or(ParseAmountError)
    }
}

// =============================================================================
// TESTS
// =============================================================================
