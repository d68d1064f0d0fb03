//! Divvy Split — turns a shared bill into per-person obligations.
//!
//! This crate provides:
//! - [`SplitCalculator`] — validates participant inputs and computes how much
//!   each person should pay (fixed amounts, percentages, equal shares).
//! - [`SettlementMatcher`] — a greedy two-pointer matcher that turns signed
//!   balances into a short list of point-to-point [`Transfer`]s.

pub mod calculator;
pub mod error;
pub mod matcher;
pub mod types;

pub use calculator::{SplitCalculator, SplitPolicy};
pub use error::SplitError;
pub use matcher::{MatcherConfig, SettlementMatcher};
pub use types::{
    Bill, CalculationMethod, IndividualContribution, Participant, ParticipantInput, ShareRule,
    Transfer,
};
