//! Fixed-point money for prices, balances and budgets.
//!
//! Amounts are stored as integer hundredths so budget comparisons are exact.
//! On the wire they are plain JSON numbers (`15.5`, `200.0`), rounded to two
//! decimal places when read.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

/// Hundredths per unit.
pub const PRICE_SCALE: i64 = 100;

/// Largest magnitude accepted from a JSON number.
const MAX_UNITS: f64 = 1.0e12;

/// A monetary amount with two decimal places.
#[derive(
    Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "f64", into = "f64")]
pub struct Price(i64);

impl Price {
    pub const ZERO: Price = Price(0);

    /// Build from integer hundredths (`1500` is `15.00`).
    pub const fn from_cents(cents: i64) -> Self {
        Price(cents)
    }

    /// Build from whole units (`15` is `15.00`).
    pub const fn from_units(units: i64) -> Self {
        Price(units * PRICE_SCALE)
    }

    /// Raw hundredths.
    #[inline]
    pub fn cents(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Price(self.0.saturating_sub(rhs.0))
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / PRICE_SCALE as f64
    }

    /// Display helper for an optional price; `None` reads as "unknown".
    pub fn label(price: Option<Price>) -> String {
        match price {
            Some(p) => p.to_string(),
            None => "unknown".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid price amount: {0}")]
pub struct InvalidPrice(pub f64);

impl TryFrom<f64> for Price {
    type Error = InvalidPrice;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() || value.abs() > MAX_UNITS {
            return Err(InvalidPrice(value));
        }
        Ok(Price((value * PRICE_SCALE as f64).round() as i64))
    }
}

impl From<Price> for f64 {
    fn from(price: Price) -> Self {
        price.to_f64()
    }
}

impl Add for Price {
    type Output = Price;

    fn add(self, rhs: Self) -> Self::Output {
        Price(self.0 + rhs.0)
    }
}

impl AddAssign for Price {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Price {
    type Output = Price;

    fn sub(self, rhs: Self) -> Self::Output {
        Price(self.0 - rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Price>>(iter: I) -> Self {
        iter.fold(Price::ZERO, Add::add)
    }
}

impl fmt::Debug for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Price({})", self)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let scale = PRICE_SCALE as u64;
        write!(f, "{}{}.{:02}", sign, abs / scale, abs % scale)
    }
}
