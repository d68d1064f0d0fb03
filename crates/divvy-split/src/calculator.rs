use divvy_core::{Money, Percentage};
use serde::{Deserialize, Serialize};

use crate::error::SplitError;
use crate::types::{
    Bill, CalculationMethod, IndividualContribution, Participant, ParticipantInput, ShareRule,
};

/// Tolerances applied by the calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitPolicy {
    /// Largest shortfall or overshoot (in minor units) still accepted as
    /// rounding. One cent by default.
    #[serde(default = "default_tolerance")]
    pub tolerance: Money,
    /// Highest accepted sum of percentages.
    #[serde(default = "default_max_percentage")]
    pub max_percentage: Percentage,
}

fn default_tolerance() -> Money {
    Money::from_minor(1)
}

fn default_max_percentage() -> Percentage {
    Percentage::from_basis_points(10_001)
}

impl Default for SplitPolicy {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            max_percentage: default_max_percentage(),
        }
    }
}

/// Computes what each participant should pay towards a bill.
///
/// Fixed amounts come off the top, percentages apply to what is left after
/// fixed amounts, and whatever remains is shared equally by everyone with
/// neither a fixed amount nor a percentage.
#[derive(Debug, Clone, Default)]
pub struct SplitCalculator {
    policy: SplitPolicy,
}

impl SplitCalculator {
    pub fn new(policy: SplitPolicy) -> Self {
        Self { policy }
    }

    /// Compute a submitted [`Bill`]. A missing total is an invalid total.
    pub fn compute_bill(&self, bill: &Bill) -> Result<Vec<IndividualContribution>, SplitError> {
        let total = bill.total.ok_or(SplitError::InvalidTotal)?;
        self.compute(total, &bill.participants)
    }

    /// Validate inputs, in the order the user should see problems, and turn
    /// them into participants with an explicit [`ShareRule`].
    pub fn validate(
        &self,
        total_bill: Money,
        inputs: &[ParticipantInput],
    ) -> Result<Vec<Participant>, SplitError> {
        if !total_bill.is_positive() {
            return Err(SplitError::InvalidTotal);
        }
        if inputs.is_empty() {
            return Err(SplitError::NoParticipants);
        }
        if let Some(position) = inputs.iter().position(|p| p.name.trim().is_empty()) {
            return Err(SplitError::UnnamedParticipant {
                position: position + 1,
            });
        }
        if let Some(p) = inputs.iter().find(|p| p.amount_paid.is_negative()) {
            return Err(SplitError::NegativePayment {
                name: p.name.trim().to_string(),
            });
        }

        Ok(inputs
            .iter()
            .map(|p| Participant {
                id: p.id.clone(),
                name: p.name.trim().to_string(),
                paid: p.amount_paid,
                rule: ShareRule::classify(p.fixed_amount_to_pay, p.percentage_to_pay),
            })
            .collect())
    }

    /// Split `total_bill` across `inputs`.
    pub fn compute(
        &self,
        total_bill: Money,
        inputs: &[ParticipantInput],
    ) -> Result<Vec<IndividualContribution>, SplitError> {
        let participants = self.validate(total_bill, inputs)?;
        let tolerance = self.policy.tolerance;

        let mut fixed_total: i128 = 0;
        let mut percentage_total: u64 = 0;
        let mut equal_count: i64 = 0;
        for p in &participants {
            match p.rule {
                ShareRule::Fixed(amount) => fixed_total += amount.minor() as i128,
                ShareRule::Percentage(pct) => percentage_total += pct.basis_points() as u64,
                ShareRule::Equal => equal_count += 1,
            }
        }

        if percentage_total > self.policy.max_percentage.basis_points() as u64 {
            return Err(SplitError::PercentageOverAllocated {
                total: Percentage::from_basis_points(
                    u32::try_from(percentage_total).unwrap_or(u32::MAX),
                ),
            });
        }
        let percentage_total = Percentage::from_basis_points(percentage_total as u32);

        let available = total_bill.minor() as i128 - fixed_total;
        if available < -(tolerance.minor() as i128) {
            return Err(SplitError::FixedExceedsTotal {
                fixed: clamp_money(fixed_total),
                total: total_bill,
            });
        }
        // Within tolerance: fixed amounts cover the whole bill.
        let available = clamp_money(available.max(0));

        let (covered_by_percentage, _) = percentage_total.split_of(available);
        let remaining = available - covered_by_percentage;
        if remaining < -tolerance {
            return Err(SplitError::SharesExceedTotal { excess: -remaining });
        }
        let remaining = remaining.max(Money::ZERO);

        if equal_count == 0 && remaining > tolerance {
            return Err(SplitError::UncoveredRemainder {
                remainder: remaining,
            });
        }

        let percentage_shares =
            allocate_percentages(&participants, available, covered_by_percentage);
        let equal_shares = allocate_equal(&participants, remaining, equal_count);

        let contributions: Vec<IndividualContribution> = participants
            .into_iter()
            .enumerate()
            .map(|(i, p)| {
                let (should_pay, method) = match p.rule {
                    ShareRule::Fixed(amount) => (amount, CalculationMethod::Fixed),
                    ShareRule::Percentage(_) => (percentage_shares[i], CalculationMethod::Percentage),
                    ShareRule::Equal if remaining.is_positive() => {
                        (equal_shares[i], CalculationMethod::Equal)
                    }
                    ShareRule::Equal => (Money::ZERO, CalculationMethod::None),
                };
                IndividualContribution {
                    participant_id: p.id,
                    name: p.name,
                    paid: p.paid,
                    should_pay,
                    balance: p.paid - should_pay,
                    method,
                }
            })
            .collect();

        tracing::debug!(
            total = %total_bill,
            fixed = %clamp_money(fixed_total),
            percentage = %percentage_total,
            covered_by_percentage = %covered_by_percentage,
            remaining = %remaining,
            equal_count,
            "bill split computed"
        );

        Ok(contributions)
    }
}

fn clamp_money(value: i128) -> Money {
    Money::from_minor(value.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
}

/// Percentage shares indexed like `participants` (zero for non-percentage
/// entries). Each share is floored, then the minor units lost to flooring
/// go one each to the largest fractional remainders, ties in input order.
fn allocate_percentages(
    participants: &[Participant],
    available: Money,
    covered: Money,
) -> Vec<Money> {
    let mut shares = vec![Money::ZERO; participants.len()];
    let mut remainders: Vec<(usize, u64)> = Vec::new();

    for (i, p) in participants.iter().enumerate() {
        if let ShareRule::Percentage(pct) = p.rule {
            let (whole, rest) = pct.split_of(available);
            shares[i] = whole;
            remainders.push((i, rest));
        }
    }

    let floored: Money = shares.iter().sum();
    let leftover = (covered - floored).minor().max(0) as usize;
    remainders.sort_by(|a, b| b.1.cmp(&a.1));
    for &(i, _) in remainders.iter().take(leftover) {
        shares[i] += Money::from_minor(1);
    }
    shares
}

/// Equal shares indexed like `participants`. Indivisible minor units go to
/// the first equal-split participants in input order.
fn allocate_equal(participants: &[Participant], remaining: Money, equal_count: i64) -> Vec<Money> {
    let mut shares = vec![Money::ZERO; participants.len()];
    if equal_count == 0 || !remaining.is_positive() {
        return shares;
    }

    let base = remaining.minor() / equal_count;
    let mut extra = remaining.minor() % equal_count;
    for (i, p) in participants.iter().enumerate() {
        if p.rule == ShareRule::Equal {
            let bump = if extra > 0 {
                extra -= 1;
                1
            } else {
                0
            };
            shares[i] = Money::from_minor(base + bump);
        }
    }
    shares
}
