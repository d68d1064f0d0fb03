use divvy_core::{Money, Percentage};

/// Validation failures of a bill split.
///
/// Messages are meant to be shown to the person editing the bill as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SplitError {
    #[error("enter a total bill amount greater than zero")]
    InvalidTotal,

    #[error("add at least one participant")]
    NoParticipants,

    #[error("participant #{position} needs a name")]
    UnnamedParticipant { position: usize },

    #[error("{name} cannot have paid a negative amount")]
    NegativePayment { name: String },

    #[error("percentages add up to {total}, which is more than 100%")]
    PercentageOverAllocated { total: Percentage },

    #[error("fixed amounts ({fixed}) are more than the total bill ({total})")]
    FixedExceedsTotal { fixed: Money, total: Money },

    #[error("fixed amounts and percentages together exceed the total bill by {excess}")]
    SharesExceedTotal { excess: Money },

    #[error("{remainder} of the bill is not covered and nobody is splitting the rest equally")]
    UncoveredRemainder { remainder: Money },
}
