/// Errors raised while building or combining core primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid percentage: {0}")]
    InvalidPercentage(String),

    #[error("invalid currency code: {0}")]
    InvalidCurrency(String),

    #[error("arithmetic overflow")]
    Overflow,
}
