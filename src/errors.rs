use thiserror::Error;
use uuid::Uuid;

/// Error type that captures common engine failures.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Validation failed for `{field}`: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("Rule not found: {0}")]
    RuleNotFound(Uuid),
    #[error("Reorder id set does not match the stored rules")]
    ReorderMismatch,
    #[error("A bulk run is already in progress for this rulebook")]
    RunInProgress,
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Transaction source error: {0}")]
    Source(String),
}

impl EngineError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}
