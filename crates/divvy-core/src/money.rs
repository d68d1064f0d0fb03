use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use crate::error::CoreError;

/// Number of decimal places assumed when no currency is at hand.
pub const DEFAULT_DECIMALS: u32 = 2;

/// A signed amount in the smallest unit of its currency (cents, pence, yen).
///
/// All engine arithmetic happens on `Money`, so comparisons are exact and
/// sums never drift. Conversion to and from human decimal text happens only
/// at the edges via [`Money::parse_decimal`] and [`Money::format`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Create an amount from minor units.
    pub const fn from_minor(value: i64) -> Self {
        Self(value)
    }

    /// The raw value in minor units.
    pub const fn minor(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    /// Parse decimal text such as `"12.5"` or `"-3.07"` into minor units.
    ///
    /// More fractional digits than `decimals` is an error rather than a
    /// silent rounding.
    pub fn parse_decimal(input: &str, decimals: u32) -> Result<Self, CoreError> {
        let text = input.trim();
        let invalid = || CoreError::InvalidAmount(input.to_string());

        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };
        let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));

        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if !all_digits(whole) || !all_digits(frac) || frac.len() > decimals as usize {
            return Err(invalid());
        }

        let scale = 10i64.checked_pow(decimals).ok_or(CoreError::Overflow)?;
        let whole_value: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let frac_value: i64 = if frac.is_empty() {
            0
        } else {
            let padding = 10i64.pow(decimals - frac.len() as u32);
            frac.parse::<i64>().map_err(|_| invalid())? * padding
        };

        let value = whole_value
            .checked_mul(scale)
            .and_then(|v| v.checked_add(frac_value))
            .ok_or(CoreError::Overflow)?;

        Ok(Self(if negative { -value } else { value }))
    }

    /// Render as decimal text with the given number of fractional digits.
    pub fn format(self, decimals: u32) -> String {
        if decimals == 0 {
            return self.0.to_string();
        }
        let scale = 10u64.pow(decimals);
        let abs = self.0.unsigned_abs();
        let sign = if self.0 < 0 { "-" } else { "" };
        format!(
            "{}{}.{:0width$}",
            sign,
            abs / scale,
            abs % scale,
            width = decimals as usize
        )
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(DEFAULT_DECIMALS))
    }
}

impl FromStr for Money {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_decimal(s, DEFAULT_DECIMALS)
    }
}

// Operators saturate at the `i64` bounds; use `checked_*` where overflow
// has to be reported.
impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(self.0.saturating_neg())
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 = self.0.saturating_sub(rhs.0);
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}
