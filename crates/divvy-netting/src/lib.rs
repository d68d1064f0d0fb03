//! Divvy Netting Layer
//!
//! Consolidates the mutual debts between the current party and one
//! counterparty into a single settlement, records it as tagged payments on
//! the underlying debts, and reverses it exactly. Writes go through the
//! pluggable [`LedgerStore`] unit of work so every netting or reversal lands
//! all at once or not at all.

pub mod adapters;
pub mod engine;
pub mod error;
pub mod manager;
pub mod traits;
pub mod types;

pub use adapters::memory::{InMemoryLedger, LedgerSnapshot};
pub use engine::{
    AllocationOrder, DebtNettingEngine, NettingConfig, NettingPlan, PaymentAllocation,
    ReversalPlan,
};
pub use error::{NettingError, StoreError};
pub use manager::NettingManager;
pub use traits::{LedgerStore, LedgerWrite, PaymentAppend, PaymentRemoval};
pub use types::{
    CounterpartyId, CounterpartyTotals, Debt, DebtId, DebtKind, Payment, PaymentId, Settlement,
    SettlementId,
};
