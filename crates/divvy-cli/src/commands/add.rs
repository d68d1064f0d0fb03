//! `divvy add` — Record a debt with a counterparty.

use chrono::Utc;
use clap::{Args, ValueEnum};
use divvy_core::Currency;
use divvy_netting::{Debt, DebtKind};

use crate::config::DivvyConfig;
use crate::ledger_file;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum KindArg {
    /// You owe the counterparty.
    Iou,
    /// The counterparty owes you.
    Uome,
}

impl From<KindArg> for DebtKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Iou => DebtKind::Iou,
            KindArg::Uome => DebtKind::Uome,
        }
    }
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Counterparty identifier.
    #[arg(short = 'p', long)]
    pub counterparty: String,

    /// Direction of the debt.
    #[arg(short, long, value_enum)]
    pub kind: KindArg,

    /// Amount in major units (e.g., 12.50).
    #[arg(short, long)]
    pub amount: String,

    /// Currency code (e.g., USD, EUR, JPY).
    #[arg(short, long, default_value = "USD")]
    pub currency: Currency,
}

pub fn run(args: &AddArgs, config: &DivvyConfig) -> anyhow::Result<()> {
    let amount = args.currency.parse_amount(&args.amount)?;
    if !amount.is_positive() {
        anyhow::bail!("debt amount must be positive, got {}", args.amount);
    }

    let mut snapshot = ledger_file::load(&config.ledger.path)?;
    let debt = Debt::new(
        args.counterparty.as_str().into(),
        args.kind.into(),
        amount,
        args.currency.clone(),
        Utc::now(),
    );
    tracing::info!(debt = %debt.id, counterparty = %debt.counterparty, kind = %debt.kind, %amount, "recording debt");

    println!("Recorded {} debt {}", debt.kind, debt.id);
    println!("  Counterparty: {}", debt.counterparty);
    println!("  Amount:       {}", args.currency.format(amount));

    snapshot.debts.push(debt);
    ledger_file::save(&config.ledger.path, &snapshot)
}
