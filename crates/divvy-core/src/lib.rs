pub mod currency;
pub mod error;
pub mod money;
pub mod percentage;

pub use currency::Currency;
pub use error::CoreError;
pub use money::Money;
pub use percentage::Percentage;
