use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::money::Money;

/// A share expressed in basis points (hundredths of a percent).
///
/// `Percentage::HUNDRED` is 10 000 basis points. Values above one hundred
/// percent are representable so that over-allocation can be reported with
/// the exact sum the user entered.
///
/// Serialized as a plain percent number (`33.33`), which is what people type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Percentage(u32);

impl Percentage {
    pub const ZERO: Percentage = Percentage(0);
    pub const HUNDRED: Percentage = Percentage(10_000);

    pub const fn from_basis_points(bp: u32) -> Self {
        Self(bp)
    }

    pub const fn basis_points(self) -> u32 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Convert a percent number (`12.5` means 12.5 %) to basis points.
    ///
    /// Anything finer than a hundredth of a percent is rejected, the same
    /// way [`Money::parse_decimal`] rejects extra fractional digits.
    pub fn from_percent(value: f64) -> Result<Self, CoreError> {
        if !value.is_finite() || value < 0.0 {
            return Err(CoreError::InvalidPercentage(value.to_string()));
        }
        let scaled = value * 100.0;
        let bp = scaled.round();
        // Binary floats put 33.33 at 3332.9999...; only real extra digits fail.
        if (scaled - bp).abs() > 1e-6 {
            return Err(CoreError::InvalidPercentage(value.to_string()));
        }
        if bp > u32::MAX as f64 {
            return Err(CoreError::Overflow);
        }
        Ok(Self(bp as u32))
    }

    /// The percent number this value represents.
    pub fn as_percent(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// `amount × self`, split into the whole minor units and the leftover
    /// numerator over 10 000 (used for largest-remainder rounding).
    ///
    /// `amount` must not be negative.
    pub fn split_of(self, amount: Money) -> (Money, u64) {
        let product = amount.minor().max(0) as i128 * self.0 as i128;
        let whole = product / Self::HUNDRED.0 as i128;
        let rest = product % Self::HUNDRED.0 as i128;
        (Money::from_minor(whole as i64), rest as u64)
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 100 == 0 {
            write!(f, "{}%", self.0 / 100)
        } else {
            write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
        }
    }
}

impl FromStr for Percentage {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches('%');
        let parsed = Money::parse_decimal(trimmed, 2)
            .map_err(|_| CoreError::InvalidPercentage(s.to_string()))?;
        let bp = u32::try_from(parsed.minor())
            .map_err(|_| CoreError::InvalidPercentage(s.to_string()))?;
        Ok(Self(bp))
    }
}

impl TryFrom<f64> for Percentage {
    type Error = CoreError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_percent(value)
    }
}

impl From<Percentage> for f64 {
    fn from(value: Percentage) -> f64 {
        value.as_percent()
    }
}
