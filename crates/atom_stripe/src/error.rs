// --- File: crates/atom_stripe/src/error.rs ---
use atom_common::{AtomError, HttpStatusCode, SkillError};
use thiserror::Error;

/// Stripe-specific error types.
#[derive(Error, Debug)]
pub enum StripeError {
    /// Error occurred during a Stripe API request
    #[error("Stripe API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Error returned by the Stripe API
    #[error("{message}")]
    ApiError {
        status_code: u16,
        /// Stripe's `error.code`, e.g. `resource_missing`.
        code: Option<String>,
        message: String,
        raw: Option<serde_json::Value>,
    },

    /// Error parsing Stripe API response
    #[error("Failed to parse Stripe API response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// No Stripe key stored for the user
    #[error("Stripe Secret Key not configured.")]
    ConfigError,

    #[error("{0}")]
    ValidationError(String),

    #[error("PaymentIntent with ID {id} not found.")]
    PaymentIntentNotFound {
        id: String,
        raw: Option<serde_json::Value>,
    },

    #[error(transparent)]
    Store(#[from] AtomError),
}

impl StripeError {
    pub fn code(&self) -> &str {
        match self {
            StripeError::ConfigError => "STRIPE_CONFIG_ERROR",
            StripeError::ValidationError(_) => "VALIDATION_ERROR",
            StripeError::PaymentIntentNotFound { .. } => "PAYMENT_INTENT_NOT_FOUND",
            StripeError::ApiError { .. } | StripeError::ParseError(_) => "STRIPE_API_ERROR",
            StripeError::RequestError(_) => "NETWORK_ERROR",
            StripeError::Store(e) => e.code(),
        }
    }
}

impl HttpStatusCode for StripeError {
    fn status_code(&self) -> u16 {
        match self {
            StripeError::RequestError(_) => 502,
            StripeError::ApiError { status_code, .. } => *status_code,
            StripeError::ParseError(_) => 502,
            StripeError::ConfigError => 500,
            StripeError::ValidationError(_) => 400,
            StripeError::PaymentIntentNotFound { .. } => 404,
            StripeError::Store(e) => e.status_code(),
        }
    }
}

impl From<StripeError> for SkillError {
    fn from(err: StripeError) -> Self {
        let details = match &err {
            StripeError::ApiError { raw, .. } | StripeError::PaymentIntentNotFound { raw, .. } => {
                raw.clone()
            }
            _ => None,
        };
        let mut skill_error =
            SkillError::new(err.code(), err.to_string()).with_status(err.status_code());
        skill_error.details = details;
        skill_error
    }
}
