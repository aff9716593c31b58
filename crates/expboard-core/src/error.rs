//! Centralized error types for the experiment board.

use thiserror::Error;

/// Main error type for board operations.
#[derive(Error, Debug)]
pub enum ExpError {
    #[error("Experiment not found: {0}")]
    ExperimentNotFound(i64),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    Database(#[from] expboard_db::DbError),
}

/// Result type for board operations.
pub type ExpResult<T> = Result<T, ExpError>;

impl ExpError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }
}
