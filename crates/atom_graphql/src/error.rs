//! Error types for the Hasura client

use atom_common::{AtomError, HttpStatusCode};
use thiserror::Error;

/// Errors that can occur when talking to Hasura
#[derive(Debug, Error)]
pub enum GraphqlError {
    /// URL or admin secret missing
    #[error("Hasura GraphQL URL or Admin Secret is not configured: {0}")]
    Config(String),

    /// The response carried an `errors` array
    #[error("GraphQL error executing operation '{operation}'")]
    Execution {
        operation: String,
        errors: serde_json::Value,
    },

    /// A single attempt ran past its timeout
    #[error("GraphQL operation '{operation}' timed out after {timeout_secs}s")]
    Timeout { operation: String, timeout_secs: u64 },

    /// Connection failures and other transport errors
    #[error("Network error executing operation '{operation}': {message}")]
    Network { operation: String, message: String },

    /// A 4xx other than 429; never retried
    #[error("HTTP error {status} executing operation '{operation}'. Not retrying.")]
    Http {
        operation: String,
        status: u16,
        body: String,
    },

    /// Retries exhausted on 5xx or 429 answers
    #[error("Failed GraphQL operation '{operation}' after {attempts} attempts: {message}")]
    AllRetriesFailed {
        operation: String,
        attempts: u32,
        message: String,
    },

    /// `data` missing or not in the expected shape
    #[error("Unexpected response for operation '{operation}': {message}")]
    Decode { operation: String, message: String },

    /// A mutation matched nothing
    #[error("{0}")]
    NoRowsAffected(String),
}

impl GraphqlError {
    pub fn code(&self) -> String {
        match self {
            GraphqlError::Config(_) => "CONFIG_ERROR".to_string(),
            GraphqlError::Execution { .. } => "GRAPHQL_EXECUTION_ERROR".to_string(),
            GraphqlError::Timeout { .. } => "TIMEOUT_ERROR".to_string(),
            GraphqlError::Network { .. } => "NETWORK_ERROR".to_string(),
            GraphqlError::Http { status, .. } => format!("HTTP_{}", status),
            GraphqlError::AllRetriesFailed { .. } => "ALL_RETRIES_FAILED".to_string(),
            GraphqlError::Decode { .. } => "GRAPHQL_DECODE_ERROR".to_string(),
            GraphqlError::NoRowsAffected(_) => "DB_NO_ROWS_AFFECTED".to_string(),
        }
    }
}

impl HttpStatusCode for GraphqlError {
    fn status_code(&self) -> u16 {
        match self {
            GraphqlError::Timeout { .. } => 504,
            GraphqlError::Network { .. }
            | GraphqlError::AllRetriesFailed { .. }
            | GraphqlError::Http { .. } => 502,
            _ => 500,
        }
    }
}

impl From<GraphqlError> for AtomError {
    fn from(err: GraphqlError) -> Self {
        AtomError::coded(err.code(), err.to_string(), err.status_code())
    }
}
