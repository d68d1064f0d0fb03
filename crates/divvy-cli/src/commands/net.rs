//! `divvy net` — Net the mutual debts with a counterparty into one settlement.

use clap::Args;
use divvy_core::Currency;
use divvy_netting::CounterpartyId;

use crate::config::DivvyConfig;
use crate::ledger_file;

#[derive(Args, Debug)]
pub struct NetArgs {
    /// Counterparty to net with.
    #[arg(short = 'p', long)]
    pub counterparty: String,

    /// Currency of the debts to net.
    #[arg(short, long, default_value = "USD")]
    pub currency: Currency,

    /// Show what would be recorded without saving the ledger.
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn run(args: &NetArgs, config: &DivvyConfig) -> anyhow::Result<()> {
    let (ledger, manager) = ledger_file::open(&config.ledger.path, config.netting.clone())?;
    let counterparty = CounterpartyId::new(args.counterparty.as_str());
    let currency = &args.currency;

    let plan = manager.settle_counterparty(&counterparty, currency).await?;
    let settlement = &plan.settlement;

    println!("Settlement {}", settlement.id);
    println!("  Counterparty: {}", settlement.counterparty);
    println!("  Settled:      {}", currency.format(settlement.amount_settled));
    println!("  Residual on:  {}", plan.larger_side);
    println!("  Payments:");
    for allocation in &plan.payments {
        println!(
            "    {} <- {} ({})",
            allocation.debt_id,
            currency.format(allocation.payment.amount),
            allocation.payment.id
        );
    }

    let totals = manager.totals(&counterparty, currency).await?;
    println!(
        "  Remaining:    you owe {}, owed to you {}",
        currency.format(totals.iou_total),
        currency.format(totals.uome_total)
    );

    if args.dry_run {
        println!("Dry run: ledger not saved.");
        return Ok(());
    }
    ledger_file::save(&config.ledger.path, &ledger.snapshot().await)
}
