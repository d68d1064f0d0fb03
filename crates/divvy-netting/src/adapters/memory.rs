use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::traits::{LedgerStore, LedgerWrite};
use crate::types::{CounterpartyId, Debt, DebtId, Settlement, SettlementId};

/// Serializable image of a ledger, used to load and save it as a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    #[serde(default)]
    pub debts: Vec<Debt>,
    #[serde(default)]
    pub settlements: Vec<Settlement>,
}

/// In-memory ledger state. Vectors keep insertion order, which is the
/// enumeration order callers see.
#[derive(Debug, Default)]
struct LedgerState {
    debts: Vec<Debt>,
    settlements: Vec<Settlement>,
}

impl LedgerState {
    fn debt_index(&self, id: DebtId) -> Option<usize> {
        self.debts.iter().position(|d| d.id == id)
    }

    fn settlement_index(&self, id: SettlementId) -> Option<usize> {
        self.settlements.iter().position(|s| s.id == id)
    }
}

/// In-memory [`LedgerStore`].
///
/// Commits are staged on copies of the touched debts and validated in full
/// before anything is swapped in, all under one write lock, so readers see
/// either the whole write or none of it. Useful for tests and for tools that
/// load a ledger file, operate on it, and save it back.
pub struct InMemoryLedger {
    state: RwLock<LedgerState>,
    /// When set, the next commit fails before touching any state.
    fail_next: AtomicBool,
}

impl InMemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(LedgerState::default()),
            fail_next: AtomicBool::new(false),
        }
    }

    /// Create a ledger pre-populated from a snapshot.
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Self {
        Self {
            state: RwLock::new(LedgerState {
                debts: snapshot.debts,
                settlements: snapshot.settlements,
            }),
            fail_next: AtomicBool::new(false),
        }
    }

    /// Copy out the current contents.
    pub async fn snapshot(&self) -> LedgerSnapshot {
        let state = self.state.read().await;
        LedgerSnapshot {
            debts: state.debts.clone(),
            settlements: state.settlements.clone(),
        }
    }

    /// Add a new debt. Fails if a debt with the same ID exists.
    pub async fn insert_debt(&self, debt: Debt) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if state.debt_index(debt.id).is_some() {
            return Err(StoreError::DebtExists(debt.id));
        }
        state.debts.push(debt);
        Ok(())
    }

    /// Look up a debt by ID.
    pub async fn debt(&self, id: DebtId) -> Result<Debt, StoreError> {
        let state = self.state.read().await;
        state
            .debt_index(id)
            .map(|i| state.debts[i].clone())
            .ok_or(StoreError::DebtNotFound(id))
    }

    /// All counterparties that appear on at least one debt, sorted.
    pub async fn counterparties(&self) -> Vec<CounterpartyId> {
        let state = self.state.read().await;
        let mut ids: Vec<CounterpartyId> =
            state.debts.iter().map(|d| d.counterparty.clone()).collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Make the next [`commit`](LedgerStore::commit) fail with
    /// [`StoreError::Unavailable`].
    pub fn fail_next_commit(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedger {
    async fn debts_for(&self, counterparty: &CounterpartyId) -> Result<Vec<Debt>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .debts
            .iter()
            .filter(|d| &d.counterparty == counterparty)
            .cloned()
            .collect())
    }

    async fn get_settlement(&self, id: SettlementId) -> Result<Settlement, StoreError> {
        let state = self.state.read().await;
        state
            .settlement_index(id)
            .map(|i| state.settlements[i].clone())
            .ok_or(StoreError::SettlementNotFound(id))
    }

    async fn list_settlements(
        &self,
        counterparty: Option<&CounterpartyId>,
    ) -> Result<Vec<Settlement>, StoreError> {
        let state = self.state.read().await;
        let mut settlements: Vec<Settlement> = state
            .settlements
            .iter()
            .filter(|s| counterparty.map_or(true, |c| &s.counterparty == c))
            .cloned()
            .collect();
        settlements.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        Ok(settlements)
    }

    async fn commit(&self, write: LedgerWrite) -> Result<(), StoreError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected commit failure".into()));
        }
        if write.is_empty() {
            return Ok(());
        }

        let mut state = self.state.write().await;
        let mut staged: HashMap<DebtId, (usize, Debt)> = HashMap::new();

        // Fetch a staged copy of a debt, checking its revision on first touch.
        fn stage<'a>(
            state: &LedgerState,
            staged: &'a mut HashMap<DebtId, (usize, Debt)>,
            debt_id: DebtId,
            expected_revision: u64,
        ) -> Result<&'a mut Debt, StoreError> {
            let index = state
                .debt_index(debt_id)
                .ok_or(StoreError::DebtNotFound(debt_id))?;
            let current = &state.debts[index];
            if current.revision != expected_revision {
                return Err(StoreError::Conflict {
                    debt_id,
                    expected: expected_revision,
                    actual: current.revision,
                });
            }
            let entry = staged
                .entry(debt_id)
                .or_insert_with(|| (index, current.clone()));
            Ok(&mut entry.1)
        }

        for append in &write.appends {
            let debt = stage(&state, &mut staged, append.debt_id, append.expected_revision)?;
            if debt.payments.iter().any(|p| p.id == append.payment.id) {
                return Err(StoreError::DuplicatePayment {
                    debt_id: append.debt_id,
                    payment_id: append.payment.id,
                });
            }
            debt.payments.push(append.payment.clone());
        }

        for removal in &write.removals {
            let debt = stage(&state, &mut staged, removal.debt_id, removal.expected_revision)?;
            for payment_id in &removal.payment_ids {
                let position = debt
                    .payments
                    .iter()
                    .position(|p| &p.id == payment_id)
                    .ok_or(StoreError::PaymentNotFound {
                        debt_id: removal.debt_id,
                        payment_id: *payment_id,
                    })?;
                debt.payments.remove(position);
            }
        }

        if let Some(settlement) = &write.insert_settlement {
            if state.settlement_index(settlement.id).is_some() {
                return Err(StoreError::SettlementExists(settlement.id));
            }
        }
        let deleted_index = match write.delete_settlement {
            Some(id) => Some(
                state
                    .settlement_index(id)
                    .ok_or(StoreError::SettlementNotFound(id))?,
            ),
            None => None,
        };

        // Everything validated; apply.
        let touched = staged.len();
        for (_, (index, mut debt)) in staged {
            debt.revision += 1;
            state.debts[index] = debt;
        }
        if let Some(index) = deleted_index {
            state.settlements.remove(index);
        }
        if let Some(settlement) = write.insert_settlement {
            state.settlements.push(settlement);
        }

        tracing::debug!(debts = touched, "ledger write committed");
        Ok(())
    }

    fn store_id(&self) -> &str {
        "ledger-memory"
    }
}
