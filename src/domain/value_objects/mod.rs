//! Value Objects for the cart

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::str::FromStr;

/// Stable product identifier assigned by the catalog supplier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(u64);

impl ProductId {
    pub fn new(value: u64) -> Self { Self(value) }
    pub fn value(&self) -> u64 { self.0 }
}

impl From<u64> for ProductId {
    fn from(value: u64) -> Self { Self(value) }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl FromStr for ProductId {
    type Err = std::num::ParseIntError;
    fn from_str(s: &str) -> Result<Self, Self::Err> { s.trim().parse().map(Self) }
}

/// Money value object in whole currency units
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn new(amount: u64) -> Self { Self(amount) }
    pub fn amount(&self) -> u64 { self.0 }
    pub fn add(&self, other: Money) -> Money { Money(self.0.saturating_add(other.0)) }
    pub fn multiply(&self, qty: Quantity) -> Money { Money(self.0.saturating_mul(u64::from(qty.value()))) }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money { iter.fold(Money::ZERO, |acc, m| acc.add(m)) }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{} ₽", self.0) }
}

/// Quantity value object
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    pub const ONE: Quantity = Quantity(1);

    pub const fn new(value: u32) -> Self { Self(value) }
    pub fn value(&self) -> u32 { self.0 }
    pub fn add(&self, other: Quantity) -> Self { Self(self.0.saturating_add(other.0)) }
    pub fn subtract(&self, other: Quantity) -> Option<Self> {
        if other.0 > self.0 { None } else { Some(Self(self.0 - other.0)) }
    }
    pub fn is_zero(&self) -> bool { self.0 == 0 }
}

impl From<u32> for Quantity {
    fn from(value: u32) -> Self { Self(value) }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_product_id_parse() { assert_eq!(" 42".parse::<ProductId>().unwrap(), ProductId::new(42)); }
    #[test]
    fn test_money_multiply_and_sum() {
        let line = Money::new(600).multiply(Quantity::new(2));
        assert_eq!(line.amount(), 1200);
        let total: Money = [line, Money::new(100)].into_iter().sum();
        assert_eq!(total, Money::new(1300));
    }
    #[test]
    fn test_quantity_subtract() {
        assert_eq!(Quantity::new(5).subtract(Quantity::new(2)), Some(Quantity::new(3)));
        assert!(Quantity::new(1).subtract(Quantity::new(2)).is_none());
    }
}
