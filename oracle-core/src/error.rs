//! Error types for the oracle

use thiserror::Error;

/// Oracle-wide error type
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Provider error ({provider}): {message}")]
    Provider { provider: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl OracleError {
    pub fn api(msg: impl Into<String>) -> Self {
        OracleError::Api(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        OracleError::Network(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        OracleError::Parse(msg.into())
    }

    pub fn invalid_price(msg: impl Into<String>) -> Self {
        OracleError::InvalidPrice(msg.into())
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        OracleError::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        OracleError::Config(msg.into())
    }

    pub fn cancelled(msg: impl Into<String>) -> Self {
        OracleError::Cancelled(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        OracleError::Internal(msg.into())
    }
}

/// Result type alias for oracle operations
pub type OracleResult<T> = Result<T, OracleError>;
