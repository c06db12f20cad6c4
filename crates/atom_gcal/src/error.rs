// --- File: crates/atom_gcal/src/error.rs ---
use atom_common::{AtomError, HttpStatusCode, OAuthError};
use thiserror::Error;

/// Errors raised by the Google Calendar integration.
#[derive(Error, Debug)]
pub enum GcalError {
    #[error("Google Calendar is not configured: {0}")]
    NotConfigured(String),

    #[error("Failed to build Calendar client: {0}")]
    Client(String),

    #[error("Google API Error: {0}")]
    Api(#[from] google_calendar3::Error),

    #[error(transparent)]
    OAuth(#[from] OAuthError),

    #[error("Google returned an event without an id")]
    MissingEventId,
}

impl HttpStatusCode for GcalError {
    fn status_code(&self) -> u16 {
        match self {
            GcalError::NotConfigured(_) | GcalError::Client(_) => 500,
            GcalError::Api(_) | GcalError::MissingEventId => 502,
            GcalError::OAuth(e) => e.status_code(),
        }
    }
}

impl From<GcalError> for AtomError {
    fn from(err: GcalError) -> Self {
        match err {
            GcalError::NotConfigured(msg) => AtomError::ConfigError(msg),
            GcalError::OAuth(e) => e.into(),
            GcalError::Api(e) => AtomError::coded("GCAL_API_ERROR", e.to_string(), 502),
            other => AtomError::coded("GCAL_ERROR", other.to_string(), other.status_code()),
        }
    }
}
