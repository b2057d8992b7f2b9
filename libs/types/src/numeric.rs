//! Fixed-point decimal types for prices and quantities
//!
//! Newtypes over `rust_decimal::Decimal` so the type system keeps
//! quote-per-base prices and base-unit quantities apart. All arithmetic is
//! exact decimal arithmetic; fee rounding truncates toward zero (see the
//! `fee` module).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;
use thiserror::Error;

/// Errors constructing or parsing numeric values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NumericError {
    #[error("failed to parse decimal: {input}")]
    Parse { input: String },

    #[error("price must be strictly positive, got {value}")]
    NonPositivePrice { value: Decimal },

    #[error("quantity cannot be negative, got {value}")]
    NegativeQuantity { value: Decimal },
}

/// A strictly positive price, denominated in quote units per one base unit.
///
/// Prices are `Ord` so they can key the book's price levels.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Validate and wrap a decimal price.
    pub fn try_new(value: Decimal) -> Result<Self, NumericError> {
        if value <= Decimal::ZERO {
            return Err(NumericError::NonPositivePrice { value });
        }
        Ok(Self(value))
    }

    /// Whole-unit price constructor.
    ///
    /// # Panics
    /// Panics on zero; prices are strictly positive.
    pub fn from_u64(value: u64) -> Self {
        assert!(value > 0, "price must be strictly positive");
        Self(Decimal::from(value))
    }

    /// Parse a price from a decimal string.
    pub fn from_str(s: &str) -> Result<Self, NumericError> {
        let value = Decimal::from_str_exact(s).map_err(|_| NumericError::Parse {
            input: s.to_string(),
        })?;
        Self::try_new(value)
    }

    /// Raw decimal value.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A non-negative base-unit quantity.
///
/// Zero is representable (fill bookkeeping needs it) but a resting order
/// with zero remaining quantity is never stored; the book removes it the
/// moment it is exhausted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Quantity(Decimal);

impl Quantity {
    /// Validate and wrap a decimal quantity.
    pub fn try_new(value: Decimal) -> Result<Self, NumericError> {
        if value < Decimal::ZERO {
            return Err(NumericError::NegativeQuantity { value });
        }
        Ok(Self(value))
    }

    /// The zero quantity.
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Whole-unit quantity constructor.
    pub fn from_u64(value: u64) -> Self {
        Self(Decimal::from(value))
    }

    /// Parse a quantity from a decimal string.
    pub fn from_str(s: &str) -> Result<Self, NumericError> {
        let value = Decimal::from_str_exact(s).map_err(|_| NumericError::Parse {
            input: s.to_string(),
        })?;
        Self::try_new(value)
    }

    /// Raw decimal value.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Subtraction clamped at zero. Fills never exceed the remaining
    /// quantity, so the clamp only defends that invariant.
    pub fn saturating_sub(self, other: Quantity) -> Quantity {
        Self((self.0 - other.0).max(Decimal::ZERO))
    }
}

impl Add for Quantity {
    type Output = Quantity;

    fn add(self, rhs: Quantity) -> Quantity {
        Self(self.0 + rhs.0)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Quote-asset value of `quantity` at `price`.
pub fn notional(price: Price, quantity: Quantity) -> Decimal {
    price.as_decimal() * quantity.as_decimal()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_rejects_zero_and_negative() {
        assert!(Price::try_new(Decimal::ZERO).is_err());
        assert!(Price::try_new(Decimal::from(-1)).is_err());
        assert!(Price::try_new(Decimal::ONE).is_ok());
    }

    #[test]
    fn test_price_from_str() {
        let price = Price::from_str("50000.25").unwrap();
        assert_eq!(price.as_decimal(), Decimal::from_str_exact("50000.25").unwrap());
        assert!(Price::from_str("0").is_err());
        assert!(Price::from_str("not a number").is_err());
    }

    #[test]
    fn test_price_ordering() {
        assert!(Price::from_u64(100) < Price::from_u64(101));
        assert_eq!(Price::from_str("100.0").unwrap(), Price::from_u64(100));
    }

    #[test]
    fn test_quantity_rejects_negative() {
        assert!(Quantity::try_new(Decimal::from(-1)).is_err());
        assert!(Quantity::try_new(Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_quantity_saturating_sub() {
        let five = Quantity::from_u64(5);
        let three = Quantity::from_u64(3);
        assert_eq!(five.saturating_sub(three), Quantity::from_u64(2));
        assert_eq!(three.saturating_sub(five), Quantity::zero());
    }

    #[test]
    fn test_quantity_add() {
        let total = Quantity::from_str("1.5").unwrap() + Quantity::from_str("2.5").unwrap();
        assert_eq!(total, Quantity::from_u64(4));
    }

    #[test]
    fn test_notional() {
        let value = notional(Price::from_u64(100), Quantity::from_str("2.5").unwrap());
        assert_eq!(value, Decimal::from(250));
    }

    #[test]
    fn test_price_serde_transparent() {
        let price = Price::from_str("99.5").unwrap();
        let json = serde_json::to_string(&price).unwrap();
        assert_eq!(json, "\"99.5\"");
        let back: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(back, price);
    }
}
