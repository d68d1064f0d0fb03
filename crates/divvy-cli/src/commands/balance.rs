//! `divvy balance` — Show what is owed in each direction per counterparty.

use std::collections::BTreeSet;

use clap::Args;
use divvy_core::{Currency, Money};
use divvy_netting::{CounterpartyId, CounterpartyTotals, LedgerStore};

use crate::config::DivvyConfig;
use crate::ledger_file;

#[derive(Args, Debug)]
pub struct BalanceArgs {
    /// Only show this counterparty.
    #[arg(short = 'p', long)]
    pub counterparty: Option<String>,

    /// Only show this currency.
    #[arg(short, long)]
    pub currency: Option<Currency>,

    /// Print the balances as JSON.
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: &BalanceArgs, config: &DivvyConfig) -> anyhow::Result<()> {
    let (ledger, manager) = ledger_file::open(&config.ledger.path, config.netting.clone())?;

    let counterparties = match &args.counterparty {
        Some(id) => vec![CounterpartyId::new(id.as_str())],
        None => ledger.counterparties().await,
    };

    let mut rows: Vec<CounterpartyTotals> = Vec::new();
    for counterparty in &counterparties {
        let currencies: BTreeSet<Currency> = ledger
            .debts_for(counterparty)
            .await?
            .into_iter()
            .map(|d| d.currency)
            .filter(|c| args.currency.as_ref().map_or(true, |wanted| wanted == c))
            .collect();
        for currency in &currencies {
            let totals = manager.totals(counterparty, currency).await?;
            if totals.iou_total.is_zero() && totals.uome_total.is_zero() {
                continue;
            }
            rows.push(totals);
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No open debts.");
        return Ok(());
    }

    println!(
        "{:<20} {:>16} {:>16} {:>16}",
        "COUNTERPARTY", "YOU OWE", "OWED TO YOU", "NET"
    );
    for totals in &rows {
        let currency = &totals.currency;
        println!(
            "{:<20} {:>16} {:>16} {:>16}",
            totals.counterparty.as_str(),
            currency.format(totals.iou_total),
            currency.format(totals.uome_total),
            currency.format(totals.net()),
        );
    }

    let nettable: Vec<&CounterpartyTotals> = rows
        .iter()
        .filter(|t| t.nettable() > Money::ZERO)
        .collect();
    if !nettable.is_empty() {
        println!();
        for totals in nettable {
            println!(
                "  {} can be netted with {} ('divvy net -p {} -c {}')",
                totals.currency.format(totals.nettable()),
                totals.counterparty,
                totals.counterparty,
                totals.currency
            );
        }
    }

    Ok(())
}
