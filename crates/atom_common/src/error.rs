// --- File: crates/atom_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type for all Atom errors.
///
/// Each integration crate has its own error enum and converts into this one via
/// `From<SpecificError> for AtomError`.
#[derive(Error, Debug)]
pub enum AtomError {
    /// Error occurred during an HTTP request
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error occurred during authentication or authorization
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Error occurred during validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error occurred during a GraphQL/database operation
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Error occurred during external service call
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// Error occurred due to a conflict (e.g., resource already exists)
    #[error("Conflict: {0}")]
    ConflictError(String),

    /// Error occurred due to a resource not being found
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Error occurred due to a timeout
    #[error("Timeout: {0}")]
    TimeoutError(String),

    /// Error occurred due to rate limiting
    #[error("Rate limited: {0}")]
    RateLimitError(String),

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),

    /// An error that already carries its wire code, e.g. `TOKEN_SAVE_FAILED`.
    #[error("{message}")]
    Coded {
        code: String,
        message: String,
        status: u16,
    },
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for AtomError {
    fn status_code(&self) -> u16 {
        match self {
            AtomError::HttpError(_) => 500,
            AtomError::ParseError(_) => 400,
            AtomError::ConfigError(_) => 500,
            AtomError::AuthError(_) => 401,
            AtomError::ValidationError(_) => 400,
            AtomError::DatabaseError(_) => 500,
            AtomError::ExternalServiceError { .. } => 502,
            AtomError::ConflictError(_) => 409,
            AtomError::NotFoundError(_) => 404,
            AtomError::TimeoutError(_) => 504,
            AtomError::RateLimitError(_) => 429,
            AtomError::InternalError(_) => 500,
            AtomError::Coded { status, .. } => *status,
        }
    }
}

impl AtomError {
    /// The machine readable code sent to clients, e.g. `CONFIG_ERROR`.
    pub fn code(&self) -> &str {
        match self {
            AtomError::HttpError(_) => "HTTP_ERROR",
            AtomError::ParseError(_) => "PARSE_ERROR",
            AtomError::ConfigError(_) => "CONFIG_ERROR",
            AtomError::AuthError(_) => "AUTH_ERROR",
            AtomError::ValidationError(_) => "VALIDATION_ERROR",
            AtomError::DatabaseError(_) => "DATABASE_ERROR",
            AtomError::ExternalServiceError { .. } => "EXTERNAL_SERVICE_ERROR",
            AtomError::ConflictError(_) => "CONFLICT",
            AtomError::NotFoundError(_) => "NOT_FOUND",
            AtomError::TimeoutError(_) => "TIMEOUT_ERROR",
            AtomError::RateLimitError(_) => "RATE_LIMITED",
            AtomError::InternalError(_) => "INTERNAL_ERROR",
            AtomError::Coded { code, .. } => code,
        }
    }

    /// Build an error with an explicit wire code.
    pub fn coded(code: impl Into<String>, message: impl Into<String>, status: u16) -> Self {
        AtomError::Coded {
            code: code.into(),
            message: message.into(),
            status,
        }
    }
}

/// A trait for adding context to errors.
pub trait Context<T, E> {
    /// Adds context to an error.
    fn context<C>(self, context: C) -> Result<T, AtomError>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Adds context to an error with a lazy context provider.
    fn with_context<C, F>(self, f: F) -> Result<T, AtomError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E: std::error::Error + Send + Sync + 'static> Context<T, E> for Result<T, E> {
    fn context<C>(self, context: C) -> Result<T, AtomError>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|error| AtomError::InternalError(format!("{}: {}", context, error)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T, AtomError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|error| AtomError::InternalError(format!("{}: {}", f(), error)))
    }
}

impl From<reqwest::Error> for AtomError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AtomError::TimeoutError(err.to_string())
        } else {
            AtomError::HttpError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AtomError {
    fn from(err: serde_json::Error) -> Self {
        AtomError::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for AtomError {
    fn from(err: std::io::Error) -> Self {
        AtomError::InternalError(err.to_string())
    }
}

// Utility functions for error handling
pub fn config_error<T: fmt::Display>(message: T) -> AtomError {
    AtomError::ConfigError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> AtomError {
    AtomError::ValidationError(message.to_string())
}

pub fn auth_error<T: fmt::Display>(message: T) -> AtomError {
    AtomError::AuthError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> AtomError {
    AtomError::NotFoundError(message.to_string())
}

pub fn conflict<T: fmt::Display>(message: T) -> AtomError {
    AtomError::ConflictError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> AtomError {
    AtomError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}

pub fn internal_error<T: fmt::Display>(message: T) -> AtomError {
    AtomError::InternalError(message.to_string())
}
