//! Integration test: bill splitting through settlement matching.
//!
//! Drives divvy-split end to end from a JSON bill, and checks that the
//! matcher's transfers settle every balance the calculator produces.

use divvy_core::{Money, Percentage};
use divvy_integration_tests::{money, usd};
use divvy_split::{
    Bill, CalculationMethod, IndividualContribution, ParticipantInput, SettlementMatcher,
    SplitCalculator, SplitError,
};

fn split(bill: &Bill) -> Result<Vec<IndividualContribution>, SplitError> {
    SplitCalculator::default().compute_bill(bill)
}

/// Apply transfers to balances and return what is left per participant.
fn residuals(contributions: &[IndividualContribution]) -> Vec<Money> {
    let transfers = SettlementMatcher::default().match_balances(contributions);
    contributions
        .iter()
        .map(|c| {
            let sent: Money = transfers
                .iter()
                .filter(|t| t.from_id == c.participant_id)
                .map(|t| t.amount)
                .sum();
            let received: Money = transfers
                .iter()
                .filter(|t| t.to_id == c.participant_id)
                .map(|t| t.amount)
                .sum();
            c.balance + sent - received
        })
        .collect()
}

// =========================================================================
// Mixed bill from JSON
// =========================================================================

#[test]
fn test_mixed_bill_from_json() {
    let json = r#"{
        "total": 300,
        "currency": "USD",
        "participants": [
            { "id": "a", "name": "A", "amount_paid": 300, "fixed_amount_to_pay": 100 },
            { "id": "b", "name": "B", "percentage_to_pay": 50 },
            { "id": "c", "name": "C" }
        ]
    }"#;
    let bill: Bill = serde_json::from_str(json).unwrap();
    let contributions = split(&bill).unwrap();

    let should_pay: Vec<i64> = contributions.iter().map(|c| c.should_pay.minor()).collect();
    assert_eq!(should_pay, vec![10000, 10000, 10000]);
    let methods: Vec<CalculationMethod> = contributions.iter().map(|c| c.method).collect();
    assert_eq!(
        methods,
        vec![
            CalculationMethod::Fixed,
            CalculationMethod::Percentage,
            CalculationMethod::Equal
        ]
    );

    let transfers = SettlementMatcher::default().match_balances(&contributions);
    assert_eq!(transfers.len(), 2);
    assert!(transfers.iter().all(|t| t.to_id == "a" && t.amount == money(10000)));
    let mut payers: Vec<&str> = transfers.iter().map(|t| t.from_id.as_str()).collect();
    payers.sort();
    assert_eq!(payers, vec!["b", "c"]);
}

#[test]
fn test_json_bill_with_cents_and_string_amounts() {
    let json = r#"{
        "total": "100.01",
        "currency": "USD",
        "participants": [
            { "id": "a", "name": "A", "amount_paid": 100.01 },
            { "id": "b", "name": "B" }
        ]
    }"#;
    let bill: Bill = serde_json::from_str(json).unwrap();
    let contributions = split(&bill).unwrap();
    let should_pay: Vec<i64> = contributions.iter().map(|c| c.should_pay.minor()).collect();
    assert_eq!(should_pay, vec![5001, 5000]);
}

#[test]
fn test_json_percentages_at_basis_point_precision() {
    let bill = |pcts: [&str; 3]| {
        format!(
            r#"{{ "total": 99.99, "currency": "USD", "participants": [
                {{ "id": "a", "name": "A", "amount_paid": 99.99, "percentage_to_pay": {} }},
                {{ "id": "b", "name": "B", "percentage_to_pay": {} }},
                {{ "id": "c", "name": "C", "percentage_to_pay": {} }}
            ] }}"#,
            pcts[0], pcts[1], pcts[2]
        )
    };

    let exact: Bill = serde_json::from_str(&bill(["33.33", "33.33", "33.34"])).unwrap();
    let total: Money = split(&exact).unwrap().iter().map(|c| c.should_pay).sum();
    assert_eq!(total, money(9999));

    // Finer than a hundredth of a percent is refused, not rounded.
    assert!(serde_json::from_str::<Bill>(&bill(["33.336", "33.336", "33.336"])).is_err());
    assert!(serde_json::from_str::<Bill>(&bill(["0.004", "50", "49.996"])).is_err());
}

#[test]
fn test_json_bill_without_total_is_rejected() {
    let bill: Bill =
        serde_json::from_str(r#"{ "currency": "USD", "participants": [{ "name": "A" }] }"#)
            .unwrap();
    assert_eq!(split(&bill), Err(SplitError::InvalidTotal));
}

// =========================================================================
// Conservation: shares add up and transfers settle everyone
// =========================================================================

#[test]
fn test_uneven_equal_split_settles_exactly() {
    let bill = Bill {
        total: Some(money(10000)),
        currency: usd(),
        participants: vec![
            ParticipantInput::new("a", "A", money(10000)),
            ParticipantInput::new("b", "B", Money::ZERO),
            ParticipantInput::new("c", "C", Money::ZERO),
        ],
    };
    let contributions = split(&bill).unwrap();

    let total: Money = contributions.iter().map(|c| c.should_pay).sum();
    assert_eq!(total, money(10000));
    let balance: Money = contributions.iter().map(|c| c.balance).sum();
    assert_eq!(balance, Money::ZERO);
    assert!(residuals(&contributions).iter().all(|r| r.is_zero()));
}

#[test]
fn test_odd_percentages_settle_exactly() {
    let pct = |bp| Percentage::from_basis_points(bp);
    let bill = Bill {
        total: Some(money(9999)),
        currency: usd(),
        participants: vec![
            ParticipantInput::new("a", "A", money(5000)).with_percentage(pct(3333)),
            ParticipantInput::new("b", "B", money(4999)).with_percentage(pct(3333)),
            ParticipantInput::new("c", "C", Money::ZERO).with_percentage(pct(3334)),
        ],
    };
    let contributions = split(&bill).unwrap();

    let total: Money = contributions.iter().map(|c| c.should_pay).sum();
    assert_eq!(total, money(9999));
    assert!(residuals(&contributions).iter().all(|r| r.is_zero()));
}

#[test]
fn test_many_payers_few_transfers() {
    let participants: Vec<ParticipantInput> = (0..6)
        .map(|i| {
            let paid = if i < 2 { money(3000) } else { Money::ZERO };
            ParticipantInput::new(format!("p{i}"), format!("P{i}"), paid)
        })
        .collect();
    let bill = Bill {
        total: Some(money(6000)),
        currency: usd(),
        participants,
    };
    let contributions = split(&bill).unwrap();
    let transfers = SettlementMatcher::default().match_balances(&contributions);

    // Two creditors and four debtors never need more than five transfers.
    assert!(transfers.len() <= 5);
    assert!(transfers.iter().all(|t| t.amount.is_positive()));
    assert!(residuals(&contributions).iter().all(|r| r.is_zero()));
}

// =========================================================================
// Rejections surface with the offending values
// =========================================================================

#[test]
fn test_over_allocated_percentages() {
    let bill = Bill {
        total: Some(money(10000)),
        currency: usd(),
        participants: vec![
            ParticipantInput::new("a", "A", money(10000))
                .with_percentage(Percentage::from_basis_points(6000)),
            ParticipantInput::new("b", "B", Money::ZERO)
                .with_percentage(Percentage::from_basis_points(4002)),
        ],
    };
    let err = split(&bill).unwrap_err();
    assert!(matches!(err, SplitError::PercentageOverAllocated { .. }));
    assert!(err.to_string().contains("100.02%"));
}

#[test]
fn test_fixed_amounts_exceeding_total() {
    let bill = Bill {
        total: Some(money(5000)),
        currency: usd(),
        participants: vec![
            ParticipantInput::new("a", "A", money(5000)).with_fixed(money(3000)),
            ParticipantInput::new("b", "B", Money::ZERO).with_fixed(money(3000)),
        ],
    };
    assert!(matches!(
        split(&bill),
        Err(SplitError::FixedExceedsTotal { .. })
    ));
}
