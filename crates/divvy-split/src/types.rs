use divvy_core::{CoreError, Currency, Money, Percentage};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A participant as entered by the user, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantInput {
    /// Caller-chosen identifier, carried through to the results.
    pub id: String,
    /// Display name. Must not be blank.
    pub name: String,
    /// What this person actually paid towards the bill.
    pub amount_paid: Money,
    /// Share of the non-fixed part of the bill.
    pub percentage_to_pay: Option<Percentage>,
    /// Exact amount this person should cover.
    pub fixed_amount_to_pay: Option<Money>,
}

impl ParticipantInput {
    /// An equal-split participant.
    pub fn new(id: impl Into<String>, name: impl Into<String>, amount_paid: Money) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            amount_paid,
            percentage_to_pay: None,
            fixed_amount_to_pay: None,
        }
    }

    pub fn with_percentage(mut self, pct: Percentage) -> Self {
        self.percentage_to_pay = Some(pct);
        self
    }

    pub fn with_fixed(mut self, amount: Money) -> Self {
        self.fixed_amount_to_pay = Some(amount);
        self
    }
}

/// How a participant's share is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareRule {
    Fixed(Money),
    Percentage(Percentage),
    Equal,
}

impl ShareRule {
    /// Classify raw inputs. A positive fixed amount wins over a positive
    /// percentage; anything else falls back to an equal share.
    pub fn classify(fixed: Option<Money>, percentage: Option<Percentage>) -> Self {
        match (fixed, percentage) {
            (Some(amount), _) if amount.is_positive() => Self::Fixed(amount),
            (_, Some(pct)) if !pct.is_zero() => Self::Percentage(pct),
            _ => Self::Equal,
        }
    }
}

/// A validated participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub paid: Money,
    pub rule: ShareRule,
}

/// A bill as submitted by the calling application.
///
/// On the wire every amount is a decimal in the bill currency's major units
/// (`300`, `300.50` or `"300.50"`), percentages are percent numbers (`50`),
/// and more fractional digits than the currency has is an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BillFile", into = "BillFile")]
pub struct Bill {
    /// Total to split. Missing is reported the same way as zero.
    pub total: Option<Money>,
    pub currency: Currency,
    pub participants: Vec<ParticipantInput>,
}

/// Decimal amount as written in a bill file. Strings keep every digit;
/// numbers are read back through their shortest decimal form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum DecimalAmount {
    Number(f64),
    Text(String),
}

impl DecimalAmount {
    fn to_money(&self, currency: &Currency) -> Result<Money, CoreError> {
        match self {
            Self::Number(value) if value.is_finite() => currency.parse_amount(&value.to_string()),
            Self::Number(value) => Err(CoreError::InvalidAmount(value.to_string())),
            Self::Text(text) => currency.parse_amount(text),
        }
    }

    fn from_money(amount: Money, currency: &Currency) -> Self {
        Self::Text(amount.format(currency.decimals()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ParticipantFile {
    #[serde(default)]
    id: String,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    amount_paid: Option<DecimalAmount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    percentage_to_pay: Option<Percentage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fixed_amount_to_pay: Option<DecimalAmount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BillFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    total: Option<DecimalAmount>,
    currency: Currency,
    #[serde(default)]
    participants: Vec<ParticipantFile>,
}

impl TryFrom<BillFile> for Bill {
    type Error = CoreError;

    fn try_from(file: BillFile) -> Result<Self, Self::Error> {
        let currency = file.currency;
        let total = file
            .total
            .map(|t| t.to_money(&currency))
            .transpose()?;
        let participants = file
            .participants
            .into_iter()
            .map(|p| {
                Ok(ParticipantInput {
                    id: p.id,
                    name: p.name,
                    amount_paid: p
                        .amount_paid
                        .map(|a| a.to_money(&currency))
                        .transpose()?
                        .unwrap_or(Money::ZERO),
                    percentage_to_pay: p.percentage_to_pay,
                    fixed_amount_to_pay: p
                        .fixed_amount_to_pay
                        .map(|a| a.to_money(&currency))
                        .transpose()?,
                })
            })
            .collect::<Result<Vec<_>, CoreError>>()?;
        Ok(Self {
            total,
            currency,
            participants,
        })
    }
}

impl From<Bill> for BillFile {
    fn from(bill: Bill) -> Self {
        let currency = bill.currency;
        let amount = |m: Money| DecimalAmount::from_money(m, &currency);
        Self {
            total: bill.total.map(amount),
            participants: bill
                .participants
                .into_iter()
                .map(|p| ParticipantFile {
                    id: p.id,
                    name: p.name,
                    amount_paid: Some(amount(p.amount_paid)),
                    percentage_to_pay: p.percentage_to_pay,
                    fixed_amount_to_pay: p.fixed_amount_to_pay.map(amount),
                })
                .collect(),
            currency: currency.clone(),
        }
    }
}

/// Which rule produced a participant's share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalculationMethod {
    Fixed,
    Percentage,
    Equal,
    /// Equal-split participant with nothing left over to absorb.
    None,
}

impl fmt::Display for CalculationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed => write!(f, "fixed"),
            Self::Percentage => write!(f, "percentage"),
            Self::Equal => write!(f, "equal"),
            Self::None => write!(f, "none"),
        }
    }
}

/// One participant's computed obligation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndividualContribution {
    pub participant_id: String,
    pub name: String,
    pub paid: Money,
    pub should_pay: Money,
    /// `paid - should_pay`: positive means the group owes this person.
    pub balance: Money,
    pub method: CalculationMethod,
}

/// A single payment that moves money from a debtor to a creditor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from_id: String,
    pub from: String,
    pub to_id: String,
    pub to: String,
    pub amount: Money,
}

impl fmt::Display for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}: {}", self.from, self.to, self.amount)
    }
}
