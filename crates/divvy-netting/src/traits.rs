use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::{CounterpartyId, Debt, DebtId, Payment, PaymentId, Settlement, SettlementId};

/// Append `payment` to a debt last seen at `expected_revision`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentAppend {
    pub debt_id: DebtId,
    pub expected_revision: u64,
    pub payment: Payment,
}

/// Remove payments from a debt last seen at `expected_revision`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRemoval {
    pub debt_id: DebtId,
    pub expected_revision: u64,
    pub payment_ids: Vec<PaymentId>,
}

/// One unit of work against the ledger.
///
/// A store must apply every part of a `LedgerWrite` or none of it. When any
/// touched debt is no longer at its expected revision the whole write is
/// rejected with [`StoreError::Conflict`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerWrite {
    pub appends: Vec<PaymentAppend>,
    pub removals: Vec<PaymentRemoval>,
    pub insert_settlement: Option<Settlement>,
    pub delete_settlement: Option<SettlementId>,
}

impl LedgerWrite {
    pub fn is_empty(&self) -> bool {
        self.appends.is_empty()
            && self.removals.is_empty()
            && self.insert_settlement.is_none()
            && self.delete_settlement.is_none()
    }
}

/// Persistence collaborator for the netting engine.
///
/// Each implementation bridges the engine to a concrete store (document
/// database, SQL, in-memory). The engine never writes except through
/// [`LedgerStore::commit`].
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// All debts with the counterparty, open or fully paid.
    async fn debts_for(&self, counterparty: &CounterpartyId) -> Result<Vec<Debt>, StoreError>;

    /// Look up a settlement by ID.
    async fn get_settlement(&self, id: SettlementId) -> Result<Settlement, StoreError>;

    /// Settlements, optionally restricted to one counterparty, oldest first.
    async fn list_settlements(
        &self,
        counterparty: Option<&CounterpartyId>,
    ) -> Result<Vec<Settlement>, StoreError>;

    /// Apply a unit of work atomically.
    async fn commit(&self, write: LedgerWrite) -> Result<(), StoreError>;

    /// Return the unique identifier of this store (e.g. "ledger-memory").
    fn store_id(&self) -> &str;
}
