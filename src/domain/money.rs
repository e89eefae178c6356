use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Currency of every amount handled by this core, in minor units (paise).
pub const CURRENCY: &str = "INR";

/// A monetary amount in integer minor-currency units.
///
/// Pricing arithmetic runs on `rust_decimal::Decimal` and is rounded back into
/// `Money` only at the output fields, so intermediate ratios never drift.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(pub i64);

impl Money {
    pub const ZERO: Self = Self(0);

    pub fn to_decimal(self) -> Decimal {
        Decimal::from(self.0)
    }
}

/// Rounds a decimal amount to whole minor units, half away from zero.
///
/// Amounts in this domain are bounded far below `i64::MAX`; saturating keeps
/// the function total without panicking on pathological inputs.
pub fn round_minor(value: Decimal) -> Money {
    let rounded = value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    Money(rounded.to_i64().unwrap_or(i64::MAX))
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
