//! `divvy reverse` — Undo a recorded settlement.

use clap::Args;
use divvy_netting::SettlementId;
use uuid::Uuid;

use crate::config::DivvyConfig;
use crate::ledger_file;

#[derive(Args, Debug)]
pub struct ReverseArgs {
    /// ID of the settlement to reverse.
    pub settlement_id: Uuid,
}

pub async fn run(args: &ReverseArgs, config: &DivvyConfig) -> anyhow::Result<()> {
    let (ledger, manager) = ledger_file::open(&config.ledger.path, config.netting.clone())?;

    let plan = manager
        .reverse_settlement(SettlementId::from_uuid(args.settlement_id))
        .await?;

    println!("Reversed settlement {}", plan.deleted_settlement_id);
    if plan.updated_debts.is_empty() {
        println!("  No debts carried payments from this settlement.");
    }
    for debt in &plan.updated_debts {
        println!(
            "  {} {} with {}: {} remaining",
            debt.kind,
            debt.id,
            debt.counterparty,
            debt.currency.format(debt.remaining())
        );
    }

    ledger_file::save(&config.ledger.path, &ledger.snapshot().await)
}
