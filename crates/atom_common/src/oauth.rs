// --- File: crates/atom_common/src/oauth.rs ---
//! OAuth 2.0 provider abstraction shared by the Google, Microsoft and Intuit
//! integrations.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::error::{AtomError, HttpStatusCode};
use crate::http::client::post_form;
use crate::services::UserToken;

pub mod lifecycle;

pub use lifecycle::{
    ensure_fresh_token, needs_refresh, RefreshGuard, RefreshLocks, EXPIRY_SKEW_MINUTES,
};

/// Token endpoint response.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TokenSet {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    /// Provider specific fields, e.g. `x_refresh_token_expires_in`.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TokenSet {
    /// Absolute expiry computed from `expires_in`.
    pub fn expiry_from(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.expires_in.map(|secs| now + Duration::seconds(secs))
    }

    /// Integer field from the provider extras.
    pub fn extra_i64(&self, key: &str) -> Option<i64> {
        self.extra.get(key).and_then(|v| v.as_i64())
    }

    /// Build the `user_tokens` row for a freshly exchanged token.
    pub fn into_user_token(
        self,
        user_id: &str,
        service_name: &str,
        meta: Option<serde_json::Value>,
        now: DateTime<Utc>,
    ) -> UserToken {
        UserToken {
            user_id: user_id.to_string(),
            service_name: service_name.to_string(),
            expiry_date: self.expiry_from(now),
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            scope: self.scope,
            token_type: self.token_type,
            id_token: self.id_token,
            meta,
            updated_at: Some(now),
        }
    }
}

/// Errors in the authorization and refresh flows.
#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("OAuth provider {0} is not configured")]
    NotConfigured(String),

    #[error("OAuth state mismatch")]
    InvalidState,

    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    #[error("Token refresh failed: {0}")]
    Refresh(String),

    #[error("Token revoke failed: {0}")]
    Revoke(String),

    #[error("No {service} token stored for user")]
    TokenMissing { service: String },

    #[error("{service} token expired and no refresh token is available")]
    TokenExpiredNoRefresh { service: String },

    #[error("Token store error: {0}")]
    Store(#[from] AtomError),

    #[error("OAuth request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl OAuthError {
    pub fn code(&self) -> &'static str {
        match self {
            OAuthError::NotConfigured(_) => "CONFIG_ERROR",
            OAuthError::InvalidState => "INVALID_OAUTH_STATE",
            OAuthError::TokenExchange(_) => "OAUTH_TOKEN_EXCHANGE_FAILED",
            OAuthError::Refresh(_) => "TOKEN_REFRESH_FAILED",
            OAuthError::Revoke(_) => "TOKEN_REVOKE_FAILED",
            OAuthError::TokenMissing { .. } => "AUTH_REQUIRED",
            OAuthError::TokenExpiredNoRefresh { .. } => "TOKEN_EXPIRED_NO_REFRESH",
            OAuthError::Store(_) => "TOKEN_STORE_ERROR",
            OAuthError::Http(_) => "NETWORK_ERROR",
        }
    }
}

impl HttpStatusCode for OAuthError {
    fn status_code(&self) -> u16 {
        match self {
            OAuthError::NotConfigured(_) => 500,
            OAuthError::InvalidState => 400,
            OAuthError::TokenExchange(_) | OAuthError::Refresh(_) | OAuthError::Revoke(_) => 502,
            OAuthError::TokenMissing { .. } | OAuthError::TokenExpiredNoRefresh { .. } => 401,
            OAuthError::Store(e) => e.status_code(),
            OAuthError::Http(_) => 502,
        }
    }
}

impl From<OAuthError> for AtomError {
    fn from(err: OAuthError) -> Self {
        match err {
            OAuthError::Store(inner) => inner,
            other => AtomError::coded(other.code(), other.to_string(), other.status_code()),
        }
    }
}

/// An OAuth 2.0 authorization-code provider.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Short provider id for logs (`google`, `microsoft`, `intuit`).
    fn id(&self) -> &'static str;

    /// The `user_tokens.service_name` this provider's tokens are stored under.
    fn service_name(&self) -> &'static str;

    /// Consent URL the browser is sent to.
    fn auth_url(&self, state: &str) -> Result<String, OAuthError>;

    /// Exchange an authorization code for tokens.
    async fn exchange_code(&self, code: &str) -> Result<TokenSet, OAuthError>;

    /// Obtain a new access token from a refresh token.
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenSet, OAuthError>;

    /// Revoke a token at the provider. Providers without revocation succeed.
    async fn revoke(&self, _token: &str) -> Result<(), OAuthError> {
        Ok(())
    }

    /// `meta` stored with a token. Receives the previous row's meta on refresh.
    fn token_meta(
        &self,
        _tokens: &TokenSet,
        previous: Option<&serde_json::Value>,
        _now: DateTime<Utc>,
    ) -> Option<serde_json::Value> {
        previous.cloned()
    }
}

/// POST a token request and parse the response.
///
/// Non-2xx answers are reported through `on_error`, so callers can pick
/// between exchange and refresh failures.
pub async fn request_tokens<F>(
    token_url: &str,
    form: &[(&str, &str)],
    basic_auth: Option<(&str, &str)>,
    on_error: F,
) -> Result<TokenSet, OAuthError>
where
    F: Fn(String) -> OAuthError,
{
    let response = post_form(token_url, form, basic_auth).await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        warn!(status = %status, token_url, "Token endpoint rejected request");
        return Err(on_error(format!("HTTP {}: {}", status.as_u16(), body)));
    }

    let tokens: TokenSet =
        serde_json::from_str(&body).map_err(|e| on_error(format!("invalid token response: {e}")))?;
    if tokens.access_token.is_empty() {
        return Err(on_error("token response carried no access_token".to_string()));
    }
    Ok(tokens)
}

/// Exchange `code` and persist the resulting row for `user_id`.
pub async fn complete_authorization(
    store: &dyn crate::services::TokenStore,
    provider: &dyn OAuthProvider,
    user_id: &str,
    code: &str,
) -> Result<UserToken, OAuthError> {
    let tokens = provider.exchange_code(code).await?;
    let now = Utc::now();
    let meta = provider.token_meta(&tokens, None, now);
    let row = tokens.into_user_token(user_id, provider.service_name(), meta, now);
    store.save_token(row.clone()).await?;
    Ok(row)
}
