use divvy_core::Money;

use crate::types::{CounterpartyId, DebtId, DebtKind, PaymentId, SettlementId};

/// Failures reported by a [`LedgerStore`](crate::traits::LedgerStore).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("debt not found: {0}")]
    DebtNotFound(DebtId),

    #[error("debt already exists: {0}")]
    DebtExists(DebtId),

    #[error("settlement not found: {0}")]
    SettlementNotFound(SettlementId),

    #[error("settlement already exists: {0}")]
    SettlementExists(SettlementId),

    #[error("payment {payment_id} not found on debt {debt_id}")]
    PaymentNotFound {
        debt_id: DebtId,
        payment_id: PaymentId,
    },

    #[error("payment {payment_id} already recorded on debt {debt_id}")]
    DuplicatePayment {
        debt_id: DebtId,
        payment_id: PaymentId,
    },

    #[error("debt {debt_id} changed concurrently: expected revision {expected}, found {actual}")]
    Conflict {
        debt_id: DebtId,
        expected: u64,
        actual: u64,
    },

    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// Netting and reversal errors.
#[derive(Debug, thiserror::Error)]
pub enum NettingError {
    #[error("totals must not be negative: iou {iou_total}, uome {uome_total}")]
    NegativeTotal { iou_total: Money, uome_total: Money },

    #[error("nothing to net with {counterparty}: iou {iou_total}, uome {uome_total}")]
    NothingToNet {
        counterparty: CounterpartyId,
        iou_total: Money,
        uome_total: Money,
    },

    #[error(
        "open {kind} debts with {counterparty} cover only {available} of the {required} to settle"
    )]
    InsufficientOpenBalance {
        counterparty: CounterpartyId,
        kind: DebtKind,
        required: Money,
        available: Money,
    },

    #[error(
        "failed to record settlement of {settlement_amount} with {counterparty} \
         (iou {iou_total}, uome {uome_total}): {source}"
    )]
    CommitFailed {
        counterparty: CounterpartyId,
        iou_total: Money,
        uome_total: Money,
        settlement_amount: Money,
        #[source]
        source: StoreError,
    },

    #[error("failed to reverse settlement {settlement_id} of {amount} with {counterparty}: {source}")]
    ReversalFailed {
        settlement_id: SettlementId,
        counterparty: CounterpartyId,
        amount: Money,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}
