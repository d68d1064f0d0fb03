//! Fixtures shared by the cross-crate integration tests.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use divvy_core::{Currency, Money};
use divvy_netting::{
    CounterpartyId, Debt, DebtKind, DebtNettingEngine, InMemoryLedger, NettingConfig,
    NettingManager,
};

pub fn usd() -> Currency {
    Currency::new("USD").expect("USD is a valid code")
}

pub fn money(minor: i64) -> Money {
    Money::from_minor(minor)
}

/// A fixed point in time; debt `n` is created `n` minutes after it.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// Debts with `counterparty`, created one minute apart in list order.
pub fn debts(counterparty: &str, specs: &[(DebtKind, i64)]) -> Vec<Debt> {
    specs
        .iter()
        .enumerate()
        .map(|(i, (kind, amount))| {
            Debt::new(
                CounterpartyId::new(counterparty),
                *kind,
                money(*amount),
                usd(),
                epoch() + Duration::minutes(i as i64),
            )
        })
        .collect()
}

/// A ledger seeded with `debts` and a manager on top of it.
pub async fn ledger_with(debts: Vec<Debt>) -> (Arc<InMemoryLedger>, NettingManager) {
    let ledger = Arc::new(InMemoryLedger::new());
    for debt in debts {
        ledger.insert_debt(debt).await.expect("fresh debt id");
    }
    let engine = DebtNettingEngine::new(NettingConfig::default(), ledger.clone());
    (ledger, NettingManager::new(engine))
}
