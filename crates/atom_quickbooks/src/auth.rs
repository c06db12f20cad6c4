// File: crates/atom_quickbooks/src/auth.rs
//! Intuit OAuth 2.0 for QuickBooks Online.

use async_trait::async_trait;
use atom_common::oauth::{request_tokens, OAuthError, OAuthProvider, TokenSet};
use atom_common::http::client::HTTP_CLIENT;
use atom_common::services::service_names;
use atom_config::{configured_value, QuickBooksConfig};
use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use tracing::warn;

pub const INTUIT_AUTH_URL: &str = "https://appcenter.intuit.com/connect/oauth2";
pub const INTUIT_TOKEN_URL: &str = "https://oauth.platform.intuit.com/oauth2/v1/tokens/bearer";
pub const INTUIT_REVOKE_URL: &str = "https://developer.api.intuit.com/v2/oauth2/tokens/revoke";
pub const SANDBOX_API_BASE: &str = "https://sandbox-quickbooks.api.intuit.com";
pub const PRODUCTION_API_BASE: &str = "https://quickbooks.api.intuit.com";

/// Accounting API base for the configured environment.
pub fn api_base(config: &QuickBooksConfig) -> String {
    if let Some(base) = configured_value(&config.api_base) {
        return base.trim_end_matches('/').to_string();
    }
    match config.environment.as_deref() {
        Some("production") => PRODUCTION_API_BASE.to_string(),
        _ => SANDBOX_API_BASE.to_string(),
    }
}

/// `meta` for a QuickBooks row. Timestamps are epoch milliseconds.
pub fn qbo_meta(realm_id: &str, tokens: &TokenSet, now: DateTime<Utc>) -> serde_json::Value {
    let refresh_expires_at = tokens
        .extra_i64("x_refresh_token_expires_in")
        .map(|secs| (now + Duration::seconds(secs)).timestamp_millis());
    json!({
        "realmId": realm_id,
        "refreshTokenExpiresAt": refresh_expires_at,
        "tokenCreatedAt": now.timestamp_millis(),
    })
}

/// Intuit OAuth client; token calls authenticate with HTTP Basic.
#[derive(Debug, Clone)]
pub struct QuickBooksProvider {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scopes: Vec<String>,
    auth_url: String,
    token_url: String,
    revoke_url: String,
}

impl QuickBooksProvider {
    /// Requires client id, secret, redirect URI and at least one scope.
    pub fn from_config(config: &QuickBooksConfig) -> Result<Self, OAuthError> {
        let client_id = configured_value(&config.client_id);
        let client_secret = configured_value(&config.client_secret);
        let redirect_uri = configured_value(&config.redirect_uri);
        match (client_id, client_secret, redirect_uri) {
            (Some(id), Some(secret), Some(redirect)) if !config.scopes.is_empty() => Ok(Self {
                client_id: id.to_string(),
                client_secret: secret.to_string(),
                redirect_uri: redirect.to_string(),
                scopes: config.scopes.clone(),
                auth_url: config
                    .auth_url
                    .clone()
                    .unwrap_or_else(|| INTUIT_AUTH_URL.to_string()),
                token_url: config
                    .token_url
                    .clone()
                    .unwrap_or_else(|| INTUIT_TOKEN_URL.to_string()),
                revoke_url: config
                    .revoke_url
                    .clone()
                    .unwrap_or_else(|| INTUIT_REVOKE_URL.to_string()),
            }),
            _ => Err(OAuthError::NotConfigured(
                "QuickBooks OAuth client credentials or scopes not configured.".to_string(),
            )),
        }
    }

    fn basic_auth(&self) -> Option<(&str, &str)> {
        Some((self.client_id.as_str(), self.client_secret.as_str()))
    }
}

#[async_trait]
impl OAuthProvider for QuickBooksProvider {
    fn id(&self) -> &'static str {
        "intuit"
    }

    fn service_name(&self) -> &'static str {
        service_names::QUICKBOOKS
    }

    fn auth_url(&self, state: &str) -> Result<String, OAuthError> {
        let scope = self.scopes.join(" ");
        let url = url::Url::parse_with_params(
            &self.auth_url,
            &[
                ("client_id", self.client_id.as_str()),
                ("scope", scope.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("state", state),
            ],
        )
        .map_err(|e| OAuthError::NotConfigured(format!("quickbooks auth_url: {e}")))?;
        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenSet, OAuthError> {
        request_tokens(
            &self.token_url,
            &[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ],
            self.basic_auth(),
            OAuthError::TokenExchange,
        )
        .await
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenSet, OAuthError> {
        request_tokens(
            &self.token_url,
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ],
            self.basic_auth(),
            OAuthError::Refresh,
        )
        .await
    }

    async fn revoke(&self, token: &str) -> Result<(), OAuthError> {
        let response = HTTP_CLIENT
            .post(&self.revoke_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&json!({ "token": token }))
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            warn!(status = %status, "Intuit token revoke rejected");
            return Err(OAuthError::Revoke(format!("HTTP {}", status.as_u16())));
        }
        Ok(())
    }

    /// Keeps the realm and moves the refresh-token expiry forward on refresh.
    fn token_meta(
        &self,
        tokens: &TokenSet,
        previous: Option<&serde_json::Value>,
        now: DateTime<Utc>,
    ) -> Option<serde_json::Value> {
        let realm_id = previous?.get("realmId")?.as_str()?;
        let mut meta = qbo_meta(realm_id, tokens, now);
        if meta["refreshTokenExpiresAt"].is_null() {
            meta["refreshTokenExpiresAt"] = previous?
                .get("refreshTokenExpiresAt")
                .cloned()
                .unwrap_or_default();
        }
        Some(meta)
    }
}
