use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaxOptimizerError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid configuration: {field} — {reason}")]
    InvalidConfiguration { field: String, reason: String },

    #[error("Date error: {0}")]
    DateError(String),
}
