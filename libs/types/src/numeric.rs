//! Fixed-point decimal types for prices and quantities
//!
//! Uses rust_decimal for deterministic arithmetic (no floating-point errors).
//! Monetary rounding is half-up (midpoint away from zero) at the owning
//! asset's configured precision.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// Round a monetary amount half-up to the given number of decimal places
pub fn round_half_up(value: Decimal, precision: u32) -> Decimal {
    value.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero)
}

/// A non-negative execution or limit price
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Create a price, panicking on a negative value
    ///
    /// # Panics
    /// Panics if `value` is negative
    pub fn new(value: Decimal) -> Self {
        Self::try_new(value).expect("price must be non-negative")
    }

    /// Create a price, returning None on a negative value
    pub fn try_new(value: Decimal) -> Option<Self> {
        if value.is_sign_negative() {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Convenience constructor for whole-number prices
    pub fn from_u64(value: u64) -> Self {
        Self(Decimal::from(value))
    }

    /// Parse from an exact decimal string
    pub fn from_str(s: &str) -> Option<Self> {
        Decimal::from_str_exact(s).ok().and_then(Self::try_new)
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Get the underlying decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A non-negative order or trade quantity
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Quantity(Decimal);

impl Quantity {
    /// Create a quantity, panicking on a negative value
    ///
    /// # Panics
    /// Panics if `value` is negative
    pub fn new(value: Decimal) -> Self {
        Self::try_new(value).expect("quantity must be non-negative")
    }

    /// Create a quantity, returning None on a negative value
    pub fn try_new(value: Decimal) -> Option<Self> {
        if value.is_sign_negative() {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Parse from an exact decimal string
    pub fn from_str(s: &str) -> Option<Self> {
        Decimal::from_str_exact(s).ok().and_then(Self::try_new)
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Get the underlying decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Subtract, clamping at zero instead of going negative
    pub fn saturating_sub(self, other: Quantity) -> Quantity {
        Quantity((self.0 - other.0).max(Decimal::ZERO))
    }

    /// Subtract, returning None if the result would be negative
    pub fn checked_sub(self, other: Quantity) -> Option<Quantity> {
        Self::try_new(self.0 - other.0)
    }
}

impl Add for Quantity {
    type Output = Quantity;

    fn add(self, other: Quantity) -> Quantity {
        Quantity(self.0 + other.0)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_price_ordering() {
        let low = Price::from_u64(49000);
        let high = Price::from_u64(50000);
        assert!(low < high);
    }

    #[test]
    fn test_price_rejects_negative() {
        assert!(Price::try_new(Decimal::from(-1)).is_none());
        assert!(Price::from_str("-0.5").is_none());
    }

    #[test]
    fn test_default_is_zero() {
        assert_eq!(Price::default(), Price::zero());
        assert_eq!(Quantity::default(), Quantity::zero());
    }

    #[test]
    fn test_quantity_arithmetic() {
        let a = Quantity::from_str("1.5").unwrap();
        let b = Quantity::from_str("0.5").unwrap();

        assert_eq!(a + b, Quantity::from_str("2.0").unwrap());
        assert_eq!(a.checked_sub(b), Quantity::from_str("1.0"));
        assert_eq!(b.checked_sub(a), None);
        assert_eq!(b.saturating_sub(a), Quantity::zero());
    }

    #[test]
    fn test_round_half_up() {
        let v = Decimal::from_str_exact("0.123455").unwrap();
        assert_eq!(round_half_up(v, 5), Decimal::from_str_exact("0.12346").unwrap());

        // Exactly at the midpoint rounds away from zero
        let mid = Decimal::from_str_exact("2.5").unwrap();
        assert_eq!(round_half_up(mid, 0), Decimal::from(3));

        let neg = Decimal::from_str_exact("-2.5").unwrap();
        assert_eq!(round_half_up(neg, 0), Decimal::from(-3));
    }

    #[test]
    fn test_serialization_roundtrip() {
        let price = Price::from_str("50000.25").unwrap();
        let json = serde_json::to_string(&price).unwrap();
        let back: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(price, back);
    }

    proptest! {
        #[test]
        fn prop_quantity_sub_never_negative(a in 0u64..1_000_000, b in 0u64..1_000_000) {
            let qa = Quantity::new(Decimal::from(a));
            let qb = Quantity::new(Decimal::from(b));
            prop_assert!(!qa.saturating_sub(qb).as_decimal().is_sign_negative());
        }

        #[test]
        fn prop_rounding_is_idempotent(n in 0i64..10_000_000, scale in 0u32..8) {
            let v = Decimal::new(n, scale);
            let once = round_half_up(v, 4);
            prop_assert_eq!(once, round_half_up(once, 4));
        }
    }
}
