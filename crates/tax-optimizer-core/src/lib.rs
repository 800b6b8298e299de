pub mod error;
pub mod types;

#[cfg(feature = "tax")]
pub mod tax;

pub use error::TaxOptimizerError;
pub use types::*;

/// Standard result type for all tax-optimizer operations
pub type TaxOptimizerResult<T> = Result<T, TaxOptimizerError>;
