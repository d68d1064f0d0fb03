use chrono::{DateTime, Utc};
use divvy_core::{Currency, Money};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identity of the other party in a set of mutual debts.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CounterpartyId(pub String);

impl CounterpartyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CounterpartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CounterpartyId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Unique identifier for a debt record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DebtId(pub Uuid);

impl DebtId {
    /// Create a new time-ordered debt ID (UUID v7).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for DebtId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DebtId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettlementId(pub Uuid);

impl SettlementId {
    /// Create a new random settlement ID (UUID v7, so IDs sort by creation time).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for SettlementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SettlementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a payment against a debt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(pub Uuid);

impl PaymentId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// The id of the payment a settlement applies to a debt.
    ///
    /// Derived from both ids (first 16 bytes of their BLAKE3 digest), so the
    /// same settlement never produces two payments on one debt and the
    /// payment can be located again from the pair alone.
    pub fn for_settlement(settlement_id: SettlementId, debt_id: DebtId) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"divvy:settlement-payment:");
        hasher.update(settlement_id.0.as_bytes());
        hasher.update(debt_id.0.as_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest.as_bytes()[..16]);
        Self(Uuid::from_bytes(bytes))
    }
}

impl Default for PaymentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Direction of a debt from the current party's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebtKind {
    /// "I owe you": the current party owes the counterparty.
    Iou,
    /// "You owe me": the counterparty owes the current party.
    Uome,
}

impl fmt::Display for DebtKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iou => write!(f, "iou"),
            Self::Uome => write!(f, "uome"),
        }
    }
}

/// A payment made against a debt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub amount: Money,
    pub date: DateTime<Utc>,
    /// Set when the payment was generated by a netting event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settlement_id: Option<SettlementId>,
}

impl Payment {
    /// A regular payment recorded by the user.
    pub fn manual(amount: Money, date: DateTime<Utc>) -> Self {
        Self {
            id: PaymentId::new(),
            amount,
            date,
            settlement_id: None,
        }
    }

    /// A payment generated by `settlement_id` against `debt_id`.
    pub fn from_settlement(
        settlement_id: SettlementId,
        debt_id: DebtId,
        amount: Money,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: PaymentId::for_settlement(settlement_id, debt_id),
            amount,
            date,
            settlement_id: Some(settlement_id),
        }
    }

    pub fn is_settlement(&self) -> bool {
        self.settlement_id.is_some()
    }

    pub fn belongs_to(&self, settlement_id: SettlementId) -> bool {
        self.settlement_id == Some(settlement_id)
    }
}

/// A persisted debt between the current party and a counterparty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debt {
    pub id: DebtId,
    pub counterparty: CounterpartyId,
    pub kind: DebtKind,
    pub amount: Money,
    pub currency: Currency,
    pub created_at: DateTime<Utc>,
    /// Bumped by the store on every committed change.
    #[serde(default)]
    pub revision: u64,
    #[serde(default)]
    pub payments: Vec<Payment>,
}

impl Debt {
    pub fn new(
        counterparty: CounterpartyId,
        kind: DebtKind,
        amount: Money,
        currency: Currency,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: DebtId::new(),
            counterparty,
            kind,
            amount,
            currency,
            created_at,
            revision: 0,
            payments: Vec::new(),
        }
    }

    pub fn with_payment(mut self, payment: Payment) -> Self {
        self.payments.push(payment);
        self
    }

    /// Sum of all payments made so far.
    pub fn paid(&self) -> Money {
        self.payments.iter().map(|p| p.amount).sum()
    }

    /// `amount - paid`.
    pub fn remaining(&self) -> Money {
        self.amount - self.paid()
    }

    pub fn is_open(&self) -> bool {
        self.remaining().is_positive()
    }
}

/// A recorded netting event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub id: SettlementId,
    pub counterparty: CounterpartyId,
    pub date: DateTime<Utc>,
    pub amount_settled: Money,
    pub currency: Currency,
}

/// What is still owed in each direction between the current party and one
/// counterparty, in one currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterpartyTotals {
    pub counterparty: CounterpartyId,
    pub currency: Currency,
    /// Remaining on open `iou` debts.
    pub iou_total: Money,
    /// Remaining on open `uome` debts.
    pub uome_total: Money,
}

impl CounterpartyTotals {
    /// Sum remaining balances of the open debts matching `counterparty` and
    /// `currency`. Other debts in `debts` are ignored.
    pub fn from_debts(counterparty: &CounterpartyId, currency: &Currency, debts: &[Debt]) -> Self {
        let mut iou_total = Money::ZERO;
        let mut uome_total = Money::ZERO;
        for debt in debts
            .iter()
            .filter(|d| &d.counterparty == counterparty && &d.currency == currency && d.is_open())
        {
            match debt.kind {
                DebtKind::Iou => iou_total += debt.remaining(),
                DebtKind::Uome => uome_total += debt.remaining(),
            }
        }
        Self {
            counterparty: counterparty.clone(),
            currency: currency.clone(),
            iou_total,
            uome_total,
        }
    }

    /// Positive when the counterparty owes the current party overall.
    pub fn net(&self) -> Money {
        self.uome_total - self.iou_total
    }

    /// The amount a netting would clear on both sides.
    pub fn nettable(&self) -> Money {
        self.iou_total.min(self.uome_total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd() -> Currency {
        Currency::new("USD").unwrap()
    }

    fn debt(kind: DebtKind, amount: i64) -> Debt {
        Debt::new("bob".into(), kind, Money::from_minor(amount), usd(), Utc::now())
    }

    #[test]
    fn test_settlement_id_creation() {
        let id1 = SettlementId::new();
        let id2 = SettlementId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_settlement_payment_id_is_deterministic() {
        let sid = SettlementId::new();
        let d1 = DebtId::new();
        let d2 = DebtId::new();
        assert_eq!(PaymentId::for_settlement(sid, d1), PaymentId::for_settlement(sid, d1));
        assert_ne!(PaymentId::for_settlement(sid, d1), PaymentId::for_settlement(sid, d2));
        assert_ne!(
            PaymentId::for_settlement(sid, d1),
            PaymentId::for_settlement(SettlementId::new(), d1)
        );
    }

    #[test]
    fn test_debt_remaining() {
        let d = debt(DebtKind::Iou, 1000)
            .with_payment(Payment::manual(Money::from_minor(300), Utc::now()))
            .with_payment(Payment::manual(Money::from_minor(200), Utc::now()));
        assert_eq!(d.paid(), Money::from_minor(500));
        assert_eq!(d.remaining(), Money::from_minor(500));
        assert!(d.is_open());

        let closed = debt(DebtKind::Iou, 100)
            .with_payment(Payment::manual(Money::from_minor(100), Utc::now()));
        assert!(!closed.is_open());
    }

    #[test]
    fn test_debt_remaining_does_not_overflow() {
        let d = debt(DebtKind::Uome, 100)
            .with_payment(Payment::manual(Money::from_minor(i64::MAX), Utc::now()))
            .with_payment(Payment::manual(Money::from_minor(i64::MAX), Utc::now()));
        assert_eq!(d.paid(), Money::from_minor(i64::MAX));
        assert!(d.remaining().is_negative());
        assert!(!d.is_open());
    }

    #[test]
    fn test_payment_tagging() {
        let sid = SettlementId::new();
        let did = DebtId::new();
        let p = Payment::from_settlement(sid, did, Money::from_minor(50), Utc::now());
        assert!(p.is_settlement());
        assert!(p.belongs_to(sid));
        assert!(!p.belongs_to(SettlementId::new()));
        assert!(!Payment::manual(Money::from_minor(50), Utc::now()).is_settlement());
    }

    #[test]
    fn test_totals_from_debts() {
        let other_currency = Debt::new(
            "bob".into(),
            DebtKind::Iou,
            Money::from_minor(9999),
            Currency::new("EUR").unwrap(),
            Utc::now(),
        );
        let other_party = Debt::new(
            "carol".into(),
            DebtKind::Uome,
            Money::from_minor(9999),
            usd(),
            Utc::now(),
        );
        let debts = vec![
            debt(DebtKind::Iou, 300),
            debt(DebtKind::Iou, 200)
                .with_payment(Payment::manual(Money::from_minor(50), Utc::now())),
            debt(DebtKind::Uome, 400),
            other_currency,
            other_party,
        ];
        let totals = CounterpartyTotals::from_debts(&"bob".into(), &usd(), &debts);
        assert_eq!(totals.iou_total, Money::from_minor(450));
        assert_eq!(totals.uome_total, Money::from_minor(400));
        assert_eq!(totals.net(), Money::from_minor(-50));
        assert_eq!(totals.nettable(), Money::from_minor(400));
    }

    #[test]
    fn test_debt_json_shape() {
        let d = debt(DebtKind::Uome, 1500);
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["kind"], "uome");
        assert_eq!(json["amount"], 1500);
        assert_eq!(json["currency"], "USD");
        let back: Debt = serde_json::from_value(json).unwrap();
        assert_eq!(back, d);
    }
}
