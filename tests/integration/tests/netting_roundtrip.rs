//! Integration test: netting and reversal against the in-memory ledger.
//!
//! Covers settling mutual debts through the manager, reversing the result,
//! saving and reloading the ledger, and the all-or-nothing guarantee when a
//! commit fails.

use std::sync::Arc;

use divvy_core::Money;
use divvy_integration_tests::{debts, epoch, ledger_with, money, usd};
use divvy_netting::{
    CounterpartyId, DebtKind, DebtNettingEngine, InMemoryLedger, LedgerSnapshot, LedgerStore,
    NettingConfig, NettingError, NettingManager, PaymentId,
};

// =========================================================================
// Allocation across several debts
// =========================================================================

#[tokio::test]
async fn test_partial_allocation_across_uome_debts() {
    let seed = debts(
        "bob",
        &[
            (DebtKind::Uome, 150),
            (DebtKind::Uome, 100),
            (DebtKind::Iou, 300),
            (DebtKind::Iou, 200),
        ],
    );
    let ids: Vec<_> = seed.iter().map(|d| d.id).collect();
    let (ledger, _mgr) = ledger_with(seed.clone()).await;
    let engine = DebtNettingEngine::new(NettingConfig::default(), ledger.clone());
    let bob = CounterpartyId::new("bob");

    let plan = engine
        .net_and_settle(&bob, money(500), money(200), &usd(), &seed)
        .await
        .unwrap();

    assert_eq!(plan.settlement.amount_settled, money(200));
    assert_eq!(plan.larger_side, DebtKind::Iou);

    let paid = |id| {
        plan.payments
            .iter()
            .filter(move |p| p.debt_id == id)
            .map(|p| p.payment.amount)
            .sum::<Money>()
    };
    assert_eq!(paid(ids[0]), money(150));
    assert_eq!(paid(ids[1]), money(50));
    assert_eq!(paid(ids[2]), money(200));
    assert_eq!(paid(ids[3]), Money::ZERO);

    let stored = ledger.debt(ids[0]).await.unwrap();
    assert!(!stored.is_open());
    assert_eq!(stored.revision, 1);
    assert_eq!(
        stored.payments[0].id,
        PaymentId::for_settlement(plan.settlement.id, ids[0])
    );
}

// =========================================================================
// Net, reverse, and the ledger reads exactly as before
// =========================================================================

#[tokio::test]
async fn test_net_then_reverse_restores_balances() {
    let seed = debts(
        "carol",
        &[
            (DebtKind::Iou, 700),
            (DebtKind::Uome, 250),
            (DebtKind::Uome, 250),
        ],
    );
    let (ledger, mgr) = ledger_with(seed).await;
    let carol = CounterpartyId::new("carol");
    let before = mgr.totals(&carol, &usd()).await.unwrap();

    let plan = mgr.settle_counterparty(&carol, &usd()).await.unwrap();
    assert_eq!(plan.settlement.amount_settled, money(500));
    let during = mgr.totals(&carol, &usd()).await.unwrap();
    assert_eq!(during.iou_total, money(200));
    assert_eq!(during.uome_total, Money::ZERO);
    assert_eq!(during.net(), before.net());

    mgr.reverse_settlement(plan.settlement.id).await.unwrap();
    let after = mgr.totals(&carol, &usd()).await.unwrap();
    assert_eq!(after, before);
    assert!(ledger
        .debts_for(&carol)
        .await
        .unwrap()
        .iter()
        .all(|d| d.payments.is_empty()));
}

#[tokio::test]
async fn test_reverse_after_reload_from_snapshot() {
    let (ledger, mgr) = ledger_with(debts(
        "dan",
        &[(DebtKind::Iou, 400), (DebtKind::Uome, 100)],
    ))
    .await;
    let dan = CounterpartyId::new("dan");
    let plan = mgr.settle_counterparty(&dan, &usd()).await.unwrap();

    // Save and reload, as the CLI does between invocations.
    let json = serde_json::to_string(&ledger.snapshot().await).unwrap();
    let snapshot: LedgerSnapshot = serde_json::from_str(&json).unwrap();
    let reloaded = Arc::new(InMemoryLedger::from_snapshot(snapshot));
    let mgr = NettingManager::new(DebtNettingEngine::new(
        NettingConfig::default(),
        reloaded.clone(),
    ));

    let reversal = mgr.reverse_settlement(plan.settlement.id).await.unwrap();
    assert_eq!(reversal.updated_debts.len(), 2);
    let totals = mgr.totals(&dan, &usd()).await.unwrap();
    assert_eq!(totals.iou_total, money(400));
    assert_eq!(totals.uome_total, money(100));
    assert!(reloaded.list_settlements(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_settlements_are_per_counterparty() {
    let mut seed = debts("erin", &[(DebtKind::Iou, 100), (DebtKind::Uome, 100)]);
    seed.extend(debts("frank", &[(DebtKind::Iou, 50), (DebtKind::Uome, 80)]));
    let (_ledger, mgr) = ledger_with(seed).await;

    mgr.settle_counterparty(&"erin".into(), &usd()).await.unwrap();
    let frank = mgr.settle_counterparty(&"frank".into(), &usd()).await.unwrap();
    assert_eq!(frank.settlement.amount_settled, money(50));
    assert_eq!(frank.larger_side, DebtKind::Uome);

    assert_eq!(mgr.settlements(None).await.unwrap().len(), 2);
    let only_frank = mgr.settlements(Some(&"frank".into())).await.unwrap();
    assert_eq!(only_frank.len(), 1);
    assert_eq!(only_frank[0].id, frank.settlement.id);
    assert!(only_frank[0].date >= epoch());
}

// =========================================================================
// Failure leaves the ledger untouched
// =========================================================================

#[tokio::test]
async fn test_failed_commit_writes_nothing() {
    let (ledger, mgr) = ledger_with(debts(
        "gina",
        &[(DebtKind::Iou, 300), (DebtKind::Uome, 300)],
    ))
    .await;
    let before = ledger.snapshot().await;

    ledger.fail_next_commit();
    let err = mgr
        .settle_counterparty(&"gina".into(), &usd())
        .await
        .unwrap_err();
    assert!(matches!(err, NettingError::CommitFailed { .. }));
    assert_eq!(ledger.snapshot().await, before);

    // The injected failure is one-shot; a retry goes through.
    let plan = mgr.settle_counterparty(&"gina".into(), &usd()).await.unwrap();
    assert_eq!(plan.settlement.amount_settled, money(300));
}

#[tokio::test]
async fn test_failed_reversal_keeps_settlement() {
    let (ledger, mgr) = ledger_with(debts(
        "hank",
        &[(DebtKind::Iou, 300), (DebtKind::Uome, 120)],
    ))
    .await;
    let plan = mgr.settle_counterparty(&"hank".into(), &usd()).await.unwrap();
    let settled = ledger.snapshot().await;

    ledger.fail_next_commit();
    let err = mgr
        .reverse_settlement(plan.settlement.id)
        .await
        .unwrap_err();
    assert!(matches!(err, NettingError::ReversalFailed { .. }));
    assert_eq!(ledger.snapshot().await, settled);
}
