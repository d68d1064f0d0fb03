use divvy_core::Money;
use serde::{Deserialize, Serialize};

use crate::types::{IndividualContribution, Transfer};

/// Configuration for the [`SettlementMatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Balances whose magnitude is below this are treated as settled.
    /// Never less than one minor unit.
    #[serde(default = "default_settle_threshold")]
    pub settle_threshold: Money,
}

fn default_settle_threshold() -> Money {
    Money::from_minor(1)
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            settle_threshold: default_settle_threshold(),
        }
    }
}

/// Greedy matcher that pairs the largest debtor with the largest creditor
/// until one side runs out.
///
/// Produces at most `debtors + creditors - 1` transfers. Among equal
/// balances the input order is kept; that order carries no meaning.
#[derive(Debug, Clone, Default)]
pub struct SettlementMatcher {
    config: MatcherConfig,
}

/// A party with an open balance, by magnitude.
#[derive(Debug, Clone, Copy)]
struct Position {
    index: usize,
    outstanding: Money,
}

impl SettlementMatcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    fn threshold(&self) -> Money {
        self.config.settle_threshold.max(Money::from_minor(1))
    }

    /// Turn balances into transfers. Empty when nobody owes or nobody is owed.
    pub fn match_balances(&self, contributions: &[IndividualContribution]) -> Vec<Transfer> {
        let threshold = self.threshold();

        let mut debtors: Vec<Position> = contributions
            .iter()
            .enumerate()
            .filter(|(_, c)| -c.balance >= threshold)
            .map(|(index, c)| Position {
                index,
                outstanding: -c.balance,
            })
            .collect();
        let mut creditors: Vec<Position> = contributions
            .iter()
            .enumerate()
            .filter(|(_, c)| c.balance >= threshold)
            .map(|(index, c)| Position {
                index,
                outstanding: c.balance,
            })
            .collect();

        // Largest magnitude first on both sides; sort_by is stable.
        debtors.sort_by(|a, b| b.outstanding.cmp(&a.outstanding));
        creditors.sort_by(|a, b| b.outstanding.cmp(&a.outstanding));

        let mut transfers = Vec::new();
        let (mut d, mut c) = (0, 0);
        while d < debtors.len() && c < creditors.len() {
            let debtor = &mut debtors[d];
            let creditor = &mut creditors[c];
            let amount = debtor.outstanding.min(creditor.outstanding);

            if amount.is_positive() {
                let from = &contributions[debtor.index];
                let to = &contributions[creditor.index];
                tracing::debug!(from = %from.name, to = %to.name, %amount, "matched transfer");
                transfers.push(Transfer {
                    from_id: from.participant_id.clone(),
                    from: from.name.clone(),
                    to_id: to.participant_id.clone(),
                    to: to.name.clone(),
                    amount,
                });
                debtor.outstanding -= amount;
                creditor.outstanding -= amount;
            }

            if debtor.outstanding < threshold {
                d += 1;
            }
            if creditor.outstanding < threshold {
                c += 1;
            }
        }

        transfers
    }
}
