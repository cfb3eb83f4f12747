//! Type-safe price representation using decimal arithmetic.
//!
//! The pharmacy sells in a single currency (Bangladeshi taka), so prices are
//! a transparent wrapper over [`Decimal`] rather than an amount/currency pair.
//! The API serializes decimal amounts as strings to avoid float rounding.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary amount in taka.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Currency symbol used for display.
    pub const SYMBOL: &'static str = "৳";

    /// Create a new price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole-taka amount.
    #[must_use]
    pub fn from_major(taka: i64) -> Self {
        Self(Decimal::from(taka))
    }

    /// A zero price.
    #[must_use]
    pub const fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Line total for `quantity` units of this price.
    #[must_use]
    pub fn line_total(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:.2}", Self::SYMBOL, self.0)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self {
        self.line_total(rhs)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), Add::add)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::prelude::FromStr;

    #[test]
    fn test_display() {
        let price = Price::new(Decimal::from_str("12.5").unwrap());
        assert_eq!(price.to_string(), "৳12.50");
    }

    #[test]
    fn test_line_total() {
        let price = Price::new(Decimal::from_str("9.99").unwrap());
        assert_eq!(
            price.line_total(3),
            Price::new(Decimal::from_str("29.97").unwrap())
        );
    }

    #[test]
    fn test_sum() {
        let total: Price = [Price::from_major(10), Price::from_major(15)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_major(25));
    }

    #[test]
    fn test_serde_string_amount() {
        let price = Price::new(Decimal::from_str("120.50").unwrap());
        let json = serde_json::to_string(&price).unwrap();
        assert_eq!(json, "\"120.50\"");

        let parsed: Price = serde_json::from_str("\"120.50\"").unwrap();
        assert_eq!(parsed, price);
    }
}
