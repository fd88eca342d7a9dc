//! Two-decimal money values held as integer cents.
//!
//! Keeping cents as integers makes the ledger sum exactly to zero; rounding only
//! happens when a decimal string is parsed.

use crate::utils::error::{HouseholdError, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;
use std::iter::Sum;
use std::str::FromStr;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    pub fn cents(self) -> i64 {
        self.0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn abs(self) -> Money {
        Money(self.0.abs())
    }

    /// Splits into `parts` shares that add back up to `self` exactly.
    /// The leftover cents go one each to the leading shares.
    pub fn split_evenly(self, parts: usize) -> Vec<Money> {
        if parts == 0 {
            return Vec::new();
        }
        let parts_i = parts as i64;
        let base = self.0 / parts_i;
        let leftover = (self.0 % parts_i).unsigned_abs() as usize;
        let step = self.0.signum();

        (0..parts)
            .map(|i| {
                if i < leftover {
                    Money(base + step)
                } else {
                    Money(base)
                }
            })
            .collect()
    }

    /// Parses `12`, `12.5`, `-3,75` and similar. Extra decimals are rounded
    /// half away from zero.
    pub fn parse(input: &str) -> Result<Money> {
        let invalid = |reason: &str| HouseholdError::InvalidAmount {
            value: input.to_string(),
            reason: reason.to_string(),
        };

        let normalized = input.trim().replace(',', ".");
        if normalized.is_empty() {
            return Err(invalid("no digits"));
        }
        let decimal =
            Decimal::from_str(&normalized).map_err(|_| invalid("expected a decimal number"))?;

        decimal
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.to_i64())
            .map(Money)
            .ok_or_else(|| invalid("amount is too large"))
    }

    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    /// Renders with an explicit `+` for positive values.
    pub fn signed(self) -> String {
        if self.0 > 0 {
            format!("+{}", self)
        } else {
            self.to_string()
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = HouseholdError;

    fn from_str(s: &str) -> Result<Self> {
        Money::parse(s)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        Money(iter.fold(0i64, |acc, m| acc.wrapping_add(m.0)))
    }
}
