use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::money::Money;

/// Currencies whose minor unit is the major unit.
const ZERO_DECIMAL: &[&str] = &["CLP", "ISK", "JPY", "KRW", "UGX", "VND", "XAF", "XOF"];

/// Currencies with three decimal places.
const THREE_DECIMAL: &[&str] = &["BHD", "IQD", "JOD", "KWD", "LYD", "OMR", "TND"];

/// A currency code such as `USD` or `EUR`.
///
/// Codes are upper-case ASCII letters, three to eight characters long, so
/// that ISO 4217 codes and short token tickers are both accepted. No
/// conversion between currencies is ever performed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Validate and normalize a currency code.
    pub fn new(code: &str) -> Result<Self, CoreError> {
        let code = code.trim().to_ascii_uppercase();
        let valid_len = (3..=8).contains(&code.len());
        if !valid_len || !code.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(CoreError::InvalidCurrency(code));
        }
        Ok(Self(code))
    }

    pub fn code(&self) -> &str {
        &self.0
    }

    /// Number of decimal places of the minor unit.
    pub fn decimals(&self) -> u32 {
        if ZERO_DECIMAL.contains(&self.code()) {
            0
        } else if THREE_DECIMAL.contains(&self.code()) {
            3
        } else {
            2
        }
    }

    /// Parse decimal text in this currency's minor units.
    pub fn parse_amount(&self, text: &str) -> Result<Money, CoreError> {
        Money::parse_decimal(text, self.decimals())
    }

    /// Format an amount as `"12.34 USD"`.
    pub fn format(&self, amount: Money) -> String {
        format!("{} {}", amount.format(self.decimals()), self.0)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Currency {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> String {
        value.0
    }
}
