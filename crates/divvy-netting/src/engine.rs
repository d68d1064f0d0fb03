use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use divvy_core::{Currency, Money};
use serde::{Deserialize, Serialize};

use crate::error::NettingError;
use crate::traits::{LedgerStore, LedgerWrite, PaymentAppend, PaymentRemoval};
use crate::types::{CounterpartyId, Debt, DebtId, DebtKind, Payment, Settlement, SettlementId};

/// Order in which a settlement is spread across the debts of one kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationOrder {
    /// Oldest debt first, ties broken by debt ID.
    #[default]
    CreatedAt,
    /// Whatever order the caller's snapshot lists the debts in.
    AsGiven,
}

/// Configuration for the [`DebtNettingEngine`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NettingConfig {
    #[serde(default)]
    pub allocation_order: AllocationOrder,
}

/// A settlement payment destined for one debt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentAllocation {
    pub debt_id: DebtId,
    /// Revision of the debt in the snapshot the plan was computed from.
    pub base_revision: u64,
    pub payment: Payment,
}

/// The result of netting: one settlement plus the payments it spawns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NettingPlan {
    pub settlement: Settlement,
    /// The kind with the larger total; its side keeps the residual.
    pub larger_side: DebtKind,
    pub payments: Vec<PaymentAllocation>,
}

impl NettingPlan {
    /// The unit of work that records this plan.
    pub fn to_write(&self) -> LedgerWrite {
        LedgerWrite {
            appends: self
                .payments
                .iter()
                .map(|a| PaymentAppend {
                    debt_id: a.debt_id,
                    expected_revision: a.base_revision,
                    payment: a.payment.clone(),
                })
                .collect(),
            insert_settlement: Some(self.settlement.clone()),
            ..Default::default()
        }
    }
}

/// The result of reversing a settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReversalPlan {
    pub deleted_settlement_id: SettlementId,
    /// Affected debts as they will read after the reversal commits.
    pub updated_debts: Vec<Debt>,
    pub removals: Vec<PaymentRemoval>,
}

impl ReversalPlan {
    pub fn to_write(&self) -> LedgerWrite {
        LedgerWrite {
            removals: self.removals.clone(),
            delete_settlement: Some(self.deleted_settlement_id),
            ..Default::default()
        }
    }
}

/// Nets the mutual debts with one counterparty into a single settlement.
///
/// Planning is pure: [`plan_netting`](Self::plan_netting) and
/// [`plan_reversal`](Self::plan_reversal) only read the snapshot they are
/// given. [`net_and_settle`](Self::net_and_settle) and
/// [`reverse`](Self::reverse) commit the plan through the injected
/// [`LedgerStore`] as one [`LedgerWrite`].
///
/// The snapshot is the caller's to keep fresh; concurrent operations on the
/// same counterparty must be serialized (see
/// [`NettingManager`](crate::manager::NettingManager)). Stale snapshots are
/// caught by the store's revision check rather than silently applied.
pub struct DebtNettingEngine {
    config: NettingConfig,
    store: Arc<dyn LedgerStore>,
}

impl DebtNettingEngine {
    pub fn new(config: NettingConfig, store: Arc<dyn LedgerStore>) -> Self {
        Self { config, store }
    }

    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.store
    }

    /// Open debts of `kind` with the counterparty in `currency`, in
    /// allocation order. A debt listed twice is considered once.
    fn allocation_list<'a>(
        &self,
        counterparty: &CounterpartyId,
        currency: &Currency,
        kind: DebtKind,
        live_debts: &'a [Debt],
    ) -> Vec<&'a Debt> {
        let mut seen = HashSet::new();
        let mut list: Vec<&Debt> = live_debts
            .iter()
            .filter(|d| {
                &d.counterparty == counterparty
                    && &d.currency == currency
                    && d.kind == kind
                    && d.is_open()
            })
            .filter(|d| seen.insert(d.id))
            .collect();

        if self.config.allocation_order == AllocationOrder::CreatedAt {
            list.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        }
        list
    }

    /// Compute a netting without writing anything.
    pub fn plan_netting(
        &self,
        counterparty: &CounterpartyId,
        iou_total: Money,
        uome_total: Money,
        currency: &Currency,
        live_debts: &[Debt],
        now: DateTime<Utc>,
    ) -> Result<NettingPlan, NettingError> {
        if iou_total.is_negative() || uome_total.is_negative() {
            return Err(NettingError::NegativeTotal {
                iou_total,
                uome_total,
            });
        }

        let settlement_amount = iou_total.min(uome_total);
        if !settlement_amount.is_positive() {
            return Err(NettingError::NothingToNet {
                counterparty: counterparty.clone(),
                iou_total,
                uome_total,
            });
        }

        let settlement_id = SettlementId::new();
        let (larger_side, smaller_side) = if iou_total > uome_total {
            (DebtKind::Iou, DebtKind::Uome)
        } else {
            (DebtKind::Uome, DebtKind::Iou)
        };

        let mut payments = Vec::new();
        for kind in [larger_side, smaller_side] {
            let list = self.allocation_list(counterparty, currency, kind, live_debts);
            let mut to_allocate = settlement_amount;

            for debt in list {
                if !to_allocate.is_positive() {
                    break;
                }
                let apply = debt.remaining().min(to_allocate);
                if !apply.is_positive() {
                    continue;
                }
                tracing::debug!(
                    settlement_id = %settlement_id,
                    debt_id = %debt.id,
                    %kind,
                    amount = %apply,
                    "allocating settlement to debt"
                );
                payments.push(PaymentAllocation {
                    debt_id: debt.id,
                    base_revision: debt.revision,
                    payment: Payment::from_settlement(settlement_id, debt.id, apply, now),
                });
                to_allocate -= apply;
            }

            if to_allocate.is_positive() {
                return Err(NettingError::InsufficientOpenBalance {
                    counterparty: counterparty.clone(),
                    kind,
                    required: settlement_amount,
                    available: settlement_amount - to_allocate,
                });
            }
        }

        Ok(NettingPlan {
            settlement: Settlement {
                id: settlement_id,
                counterparty: counterparty.clone(),
                date: now,
                amount_settled: settlement_amount,
                currency: currency.clone(),
            },
            larger_side,
            payments,
        })
    }

    /// Compute the reversal of `settlement` without writing anything.
    ///
    /// Only payments tagged with this settlement are removed; every other
    /// payment keeps its position.
    pub fn plan_reversal(&self, settlement: &Settlement, live_debts: &[Debt]) -> ReversalPlan {
        let mut updated_debts = Vec::new();
        let mut removals = Vec::new();

        for debt in live_debts {
            let payment_ids: Vec<_> = debt
                .payments
                .iter()
                .filter(|p| p.belongs_to(settlement.id))
                .map(|p| p.id)
                .collect();
            if payment_ids.is_empty() {
                continue;
            }

            let mut updated = debt.clone();
            updated.payments.retain(|p| !p.belongs_to(settlement.id));
            updated.revision = debt.revision + 1;

            removals.push(PaymentRemoval {
                debt_id: debt.id,
                expected_revision: debt.revision,
                payment_ids,
            });
            updated_debts.push(updated);
        }

        if removals.is_empty() {
            tracing::warn!(
                settlement_id = %settlement.id,
                "no live debt carries payments from this settlement"
            );
        }

        ReversalPlan {
            deleted_settlement_id: settlement.id,
            updated_debts,
            removals,
        }
    }

    /// Net the given totals against `live_debts` and record the result in
    /// one transaction.
    pub async fn net_and_settle(
        &self,
        counterparty: &CounterpartyId,
        iou_total: Money,
        uome_total: Money,
        currency: &Currency,
        live_debts: &[Debt],
    ) -> Result<NettingPlan, NettingError> {
        let plan = self.plan_netting(
            counterparty,
            iou_total,
            uome_total,
            currency,
            live_debts,
            Utc::now(),
        )?;

        if let Err(source) = self.store.commit(plan.to_write()).await {
            tracing::warn!(
                store = self.store.store_id(),
                %counterparty,
                error = %source,
                "settlement commit rejected"
            );
            return Err(NettingError::CommitFailed {
                counterparty: counterparty.clone(),
                iou_total,
                uome_total,
                settlement_amount: plan.settlement.amount_settled,
                source,
            });
        }

        tracing::info!(
            settlement_id = %plan.settlement.id,
            %counterparty,
            amount = %currency.format(plan.settlement.amount_settled),
            payments = plan.payments.len(),
            "settlement recorded"
        );
        Ok(plan)
    }

    /// Undo `settlement` in one transaction.
    pub async fn reverse(
        &self,
        settlement: &Settlement,
        live_debts: &[Debt],
    ) -> Result<ReversalPlan, NettingError> {
        let plan = self.plan_reversal(settlement, live_debts);

        if let Err(source) = self.store.commit(plan.to_write()).await {
            tracing::warn!(
                store = self.store.store_id(),
                settlement_id = %settlement.id,
                error = %source,
                "reversal commit rejected"
            );
            return Err(NettingError::ReversalFailed {
                settlement_id: settlement.id,
                counterparty: settlement.counterparty.clone(),
                amount: settlement.amount_settled,
                source,
            });
        }

        tracing::info!(
            settlement_id = %settlement.id,
            counterparty = %settlement.counterparty,
            debts = plan.updated_debts.len(),
            "settlement reversed"
        );
        Ok(plan)
    }
}
