// --- File: crates/atom_quickbooks/src/error.rs ---
use atom_common::{AtomError, HttpStatusCode, SkillError};
use thiserror::Error;

/// Errors of the QuickBooks Online integration.
#[derive(Error, Debug)]
pub enum QboError {
    #[error("{0}")]
    Config(String),

    #[error("{0}")]
    Validation(String),

    #[error("OAuth state mismatch. Possible CSRF attack.")]
    InvalidState,

    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    #[error("OAuth response is missing realmId.")]
    MissingRealmId,

    #[error("Stored QBO token is invalid (missing realmId).")]
    InvalidTokenStructure,

    #[error("Failed to save QuickBooks Online tokens: {0}")]
    TokenSave(String),

    #[error("No QuickBooks tokens found. Please authorize.")]
    AuthRequired,

    #[error("Refresh token missing or expired. Please re-authorize.")]
    RefreshTokenExpired,

    #[error("Token refresh API call failed: {0}")]
    RefreshFailed(String),

    /// A `Fault` returned by the accounting API.
    #[error("{message}")]
    Api {
        code: String,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("QuickBooks request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Store(AtomError),
}

impl QboError {
    pub fn code(&self) -> String {
        match self {
            QboError::Config(_) => "QBO_CONFIG_ERROR".to_string(),
            QboError::Validation(_) => "VALIDATION_ERROR".to_string(),
            QboError::InvalidState => "INVALID_OAUTH_STATE".to_string(),
            QboError::TokenExchange(_) => "OAUTH_TOKEN_EXCHANGE_FAILED".to_string(),
            QboError::MissingRealmId => "QBO_AUTH_INVALID_RESPONSE".to_string(),
            QboError::InvalidTokenStructure => "QBO_TOKEN_INVALID_STRUCTURE".to_string(),
            QboError::TokenSave(_) => "TOKEN_SAVE_FAILED".to_string(),
            QboError::AuthRequired => "QBO_AUTH_REQUIRED".to_string(),
            QboError::RefreshTokenExpired => "QBO_REFRESH_TOKEN_EXPIRED".to_string(),
            QboError::RefreshFailed(_) => "QBO_REFRESH_FAILED".to_string(),
            QboError::Api { code, .. } => format!("QBO_API_ERROR_{}", code),
            QboError::Http(_) => "NETWORK_ERROR".to_string(),
            QboError::Store(e) => e.code().to_string(),
        }
    }
}

impl HttpStatusCode for QboError {
    fn status_code(&self) -> u16 {
        match self {
            QboError::Config(_) | QboError::TokenSave(_) | QboError::InvalidTokenStructure => 500,
            QboError::Validation(_) | QboError::InvalidState => 400,
            QboError::AuthRequired | QboError::RefreshTokenExpired => 401,
            QboError::TokenExchange(_)
            | QboError::MissingRealmId
            | QboError::RefreshFailed(_)
            | QboError::Api { .. }
            | QboError::Http(_) => 502,
            QboError::Store(e) => e.status_code(),
        }
    }
}

impl From<QboError> for SkillError {
    fn from(err: QboError) -> Self {
        let status = err.status_code();
        let code = err.code();
        let details = match &err {
            QboError::Api { details, .. } => details.clone(),
            _ => None,
        };
        let mut skill_error = SkillError::new(code, err.to_string()).with_status(status);
        skill_error.details = details;
        skill_error
    }
}
