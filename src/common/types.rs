//! Shared value types for the wagering engine
//!
//! Money and multipliers are exact integers so ledger arithmetic never drifts:
//! `Money` counts minor units (cents) and `Multiplier` counts hundredths.

use crate::errors::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Amount of virtual currency in minor units (1/100 of a display unit)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Create an amount from minor units
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Create an amount from whole display units, saturating at the largest
    /// representable amount. Caller-supplied amounts go through
    /// [`Money::try_from_f64`] instead.
    pub const fn from_units(units: u64) -> Self {
        Self(units.saturating_mul(100))
    }

    /// Minor units
    pub const fn cents(self) -> u64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Convert a display amount, rounding to the nearest cent.
    ///
    /// Rejects NaN, infinities and negative values.
    pub fn try_from_f64(amount: f64) -> Result<Self, ValidationError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(ValidationError::InvalidAmount(amount.to_string()));
        }
        let cents = (amount * 100.0).round();
        if cents > u64::MAX as f64 {
            return Err(ValidationError::InvalidAmount(amount.to_string()));
        }
        Ok(Self(cents as u64))
    }

    /// Display units as a float, for reporting only
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// `self × multiplier`, floored to the cent
    pub fn times(self, multiplier: Multiplier) -> Option<Money> {
        let scaled = (self.0 as u128).checked_mul(multiplier.hundredths() as u128)? / 100;
        u64::try_from(scaled).ok().map(Money)
    }

    /// Signed difference `self - other` in minor units
    pub fn signed_diff(self, other: Money) -> i128 {
        self.0 as i128 - other.0 as i128
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Payout multiplier in hundredths (198 = 1.98x). Zero is a total loss.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Multiplier(u64);

impl Multiplier {
    pub const ZERO: Multiplier = Multiplier(0);
    pub const ONE: Multiplier = Multiplier(100);

    pub const fn from_hundredths(hundredths: u64) -> Self {
        Self(hundredths)
    }

    /// Whole multiplier, e.g. `from_whole(35)` is 35.00x. Saturates.
    pub const fn from_whole(whole: u64) -> Self {
        Self(whole.saturating_mul(100))
    }

    pub const fn hundredths(self) -> u64 {
        self.0
    }

    /// Floor a real multiplier to two decimals.
    ///
    /// A tiny epsilon absorbs representation error so `99.0 / 50.0` floors to
    /// 1.98 rather than 1.97. Non-positive and NaN inputs map to zero;
    /// values beyond `u64` hundredths saturate.
    pub fn floor_from_f64(value: f64) -> Self {
        if value.is_nan() || value <= 0.0 {
            return Self::ZERO;
        }
        let hundredths = (value * 100.0 + 1e-9).floor();
        if hundredths >= u64::MAX as f64 {
            Self(u64::MAX)
        } else {
            Self(hundredths as u64)
        }
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Multiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}x", self.0 / 100, self.0 % 100)
    }
}

/// Wallet owner: a durable account or an anonymous browser session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum SubjectId {
    Account(String),
    Session(String),
}

impl SubjectId {
    pub fn account(id: impl Into<String>) -> Self {
        SubjectId::Account(id.into())
    }

    pub fn session(id: impl Into<String>) -> Self {
        SubjectId::Session(id.into())
    }

    /// Stable storage key, e.g. `account:alice`
    pub fn storage_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectId::Account(id) => write!(f, "account:{}", id),
            SubjectId::Session(id) => write!(f, "session:{}", id),
        }
    }
}
