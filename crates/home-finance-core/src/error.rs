use thiserror::Error;

#[derive(Debug, Error)]
pub enum HomeFinanceError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Financial impossibility: {0}")]
    FinancialImpossibility(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Unauthorized: user {user_id} may not edit this listing")]
    Unauthorized { user_id: String },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Persistence failed: {0}")]
    PersistenceFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl HomeFinanceError {
    /// Shorthand for the common validation failure.
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        HomeFinanceError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for HomeFinanceError {
    fn from(e: serde_json::Error) -> Self {
        HomeFinanceError::SerializationError(e.to_string())
    }
}
