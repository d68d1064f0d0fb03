use std::sync::Arc;

use dashmap::DashMap;
use divvy_core::Currency;
use tokio::sync::Mutex;

use crate::engine::{DebtNettingEngine, NettingPlan, ReversalPlan};
use crate::error::NettingError;
use crate::traits::LedgerStore;
use crate::types::{CounterpartyId, CounterpartyTotals, Settlement, SettlementId};

/// Drives the [`DebtNettingEngine`] against its store on behalf of an
/// application.
///
/// Operations on the same counterparty run one at a time: the snapshot is
/// loaded, planned against, and committed while holding that counterparty's
/// lock. Different counterparties proceed independently. A counterparty's
/// lock is dropped from the map once nobody holds or waits on it.
pub struct NettingManager {
    engine: DebtNettingEngine,
    locks: DashMap<CounterpartyId, Arc<Mutex<()>>>,
}

impl NettingManager {
    pub fn new(engine: DebtNettingEngine) -> Self {
        Self {
            engine,
            locks: DashMap::new(),
        }
    }

    fn lock_for(&self, counterparty: &CounterpartyId) -> Arc<Mutex<()>> {
        self.locks
            .entry(counterparty.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Forget the lock for `counterparty` unless another caller still holds
    /// a handle to it. The map's own handle is the only one left when the
    /// strong count is 1.
    fn release(&self, counterparty: &CounterpartyId) {
        self.locks
            .remove_if(counterparty, |_, lock| Arc::strong_count(lock) == 1);
    }

    /// Current totals with a counterparty in one currency.
    pub async fn totals(
        &self,
        counterparty: &CounterpartyId,
        currency: &Currency,
    ) -> Result<CounterpartyTotals, NettingError> {
        let debts = self.engine.store().debts_for(counterparty).await?;
        Ok(CounterpartyTotals::from_debts(counterparty, currency, &debts))
    }

    /// Net everything currently owed in both directions with `counterparty`.
    pub async fn settle_counterparty(
        &self,
        counterparty: &CounterpartyId,
        currency: &Currency,
    ) -> Result<NettingPlan, NettingError> {
        let lock = self.lock_for(counterparty);
        let result = {
            let _guard = lock.lock().await;
            self.settle_locked(counterparty, currency).await
        };
        drop(lock);
        self.release(counterparty);
        result
    }

    async fn settle_locked(
        &self,
        counterparty: &CounterpartyId,
        currency: &Currency,
    ) -> Result<NettingPlan, NettingError> {
        let debts = self.engine.store().debts_for(counterparty).await?;
        let totals = CounterpartyTotals::from_debts(counterparty, currency, &debts);
        tracing::debug!(
            %counterparty,
            iou = %totals.iou_total,
            uome = %totals.uome_total,
            "netting counterparty"
        );

        self.engine
            .net_and_settle(
                counterparty,
                totals.iou_total,
                totals.uome_total,
                currency,
                &debts,
            )
            .await
    }

    /// Reverse a recorded settlement by ID.
    pub async fn reverse_settlement(
        &self,
        settlement_id: SettlementId,
    ) -> Result<ReversalPlan, NettingError> {
        let settlement = self.engine.store().get_settlement(settlement_id).await?;
        let counterparty = settlement.counterparty.clone();
        let lock = self.lock_for(&counterparty);
        let result = {
            let _guard = lock.lock().await;
            match self.engine.store().debts_for(&counterparty).await {
                Ok(debts) => self.engine.reverse(&settlement, &debts).await,
                Err(err) => Err(err.into()),
            }
        };
        drop(lock);
        self.release(&counterparty);
        result
    }

    /// Recorded settlements, optionally for one counterparty.
    pub async fn settlements(
        &self,
        counterparty: Option<&CounterpartyId>,
    ) -> Result<Vec<Settlement>, NettingError> {
        Ok(self.engine.store().list_settlements(counterparty).await?)
    }
}
