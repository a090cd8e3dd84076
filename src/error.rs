use thiserror::Error;

use crate::llm::LlmError;

/// Every failure a chat or escalation request can end in.
///
/// The HTTP boundary does not distinguish between kinds; each one is logged
/// and rendered as a 500 with its `Display` text as the `error` field.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("{0}")]
    Validation(String),
    #[error("Database error: {0}")]
    Dependency(String),
    #[error(transparent)]
    Upstream(#[from] LlmError),
    #[error("{0}")]
    Configuration(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<duckdb::Error> for ChatError {
    fn from(err: duckdb::Error) -> Self {
        ChatError::Dependency(err.to_string())
    }
}

impl From<config::ConfigError> for ChatError {
    fn from(err: config::ConfigError) -> Self {
        ChatError::Configuration(err.to_string())
    }
}
