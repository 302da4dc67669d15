//! # Money
//!
//! Exact, non-negative currency amounts in minor units (e.g. cents).
//!
//! Backed by a 256-bit unsigned integer. Every arithmetic operation is
//! checked; nothing wraps or truncates.

use super::errors::MoneyError;
use primitive_types::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A non-negative amount of money in minor currency units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(U256);

impl Money {
    /// Zero minor units.
    pub const ZERO: Money = Money(U256([0; 4]));

    /// Create from a count of minor units.
    pub fn from_minor_units(units: u128) -> Self {
        Money(U256::from(units))
    }

    /// Validate an amount entered on the display.
    ///
    /// Requested amounts arrive signed because the display is not trusted.
    /// Zero and negative values are rejected.
    pub fn from_requested(requested: i128) -> Result<Self, MoneyError> {
        if requested <= 0 {
            return Err(MoneyError::NonPositive(requested));
        }
        Ok(Money(U256::from(requested.unsigned_abs())))
    }

    /// Parse a decimal string of minor units.
    pub fn from_dec_str(value: &str) -> Result<Self, MoneyError> {
        U256::from_dec_str(value)
            .map(Money)
            .map_err(|_| MoneyError::Parse(value.to_string()))
    }

    /// Whether the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// The underlying integer.
    pub fn as_u256(&self) -> U256 {
        self.0
    }

    /// Checked addition.
    pub fn checked_add(self, other: Money) -> Result<Money, MoneyError> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or(MoneyError::Overflow)
    }

    /// Checked subtraction. Fails instead of going negative.
    pub fn checked_sub(self, other: Money) -> Result<Money, MoneyError> {
        self.0
            .checked_sub(other.0)
            .map(Money)
            .ok_or(MoneyError::Underflow)
    }
}

impl From<u64> for Money {
    fn from(units: u64) -> Self {
        Money(U256::from(units))
    }
}

impl From<u128> for Money {
    fn from(units: u128) -> Self {
        Money::from_minor_units(units)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Serialized as a decimal string so display payloads never lose precision.
impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Money::from_dec_str(&raw).map_err(serde::de::Error::custom)
    }
}
