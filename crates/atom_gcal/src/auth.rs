// File: crates/atom_gcal/src/auth.rs
use async_trait::async_trait;
use atom_common::oauth::{request_tokens, OAuthError, OAuthProvider, TokenSet};
use atom_common::post_form;
use atom_common::services::service_names;
use atom_config::{configured_value, GoogleConfig};
use google_calendar3::{
    hyper_rustls::{self, HttpsConnectorBuilder},
    hyper_util::client::legacy::connect::HttpConnector,
    hyper_util::client::legacy::Client,
    CalendarHub,
};
use tracing::{info, warn};

use crate::error::GcalError;

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_REVOKE_URL: &str = "https://oauth2.googleapis.com/revoke";

const DEFAULT_SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/calendar.readonly",
    "https://www.googleapis.com/auth/calendar.events",
];

// Type aliases for clarity
type Connector = hyper_rustls::HttpsConnector<HttpConnector>;

pub type HubType = CalendarHub<Connector>;

/// Calendar hub authorised with a single user's access token.
///
/// `api_base` replaces `https://www.googleapis.com/` for tests and proxies.
pub fn create_user_hub(access_token: String, api_base: Option<&str>) -> Result<HubType, GcalError> {
    let https = HttpsConnectorBuilder::new()
        .with_native_roots()
        .map_err(|e| GcalError::Client(e.to_string()))?
        .https_or_http()
        .enable_http1()
        .build();

    let client = Client::builder(hyper_util::rt::TokioExecutor::new()).build(https);

    let mut hub = CalendarHub::new(client, access_token);
    if let Some(base) = api_base {
        let root = format!("{}/", base.trim_end_matches('/'));
        hub.base_url(format!("{}calendar/v3/", root));
        hub.root_url(root);
    }
    Ok(hub)
}

/// Google's OAuth 2.0 web-server flow for Calendar access.
#[derive(Debug, Clone)]
pub struct GoogleOAuthProvider {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scopes: Vec<String>,
    auth_url: String,
    token_url: String,
    revoke_url: String,
}

impl GoogleOAuthProvider {
    /// Fails with `NotConfigured` when the client id or secret is unset.
    pub fn from_config(config: &GoogleConfig) -> Result<Self, OAuthError> {
        let (client_id, client_secret) = match (
            configured_value(&config.client_id),
            configured_value(&config.client_secret),
        ) {
            (Some(id), Some(secret)) => (id.to_string(), secret.to_string()),
            _ => return Err(OAuthError::NotConfigured("google".to_string())),
        };

        let scopes = if config.scopes.is_empty() {
            DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect()
        } else {
            config.scopes.clone()
        };

        Ok(Self {
            client_id,
            client_secret,
            redirect_uri: config.redirect_uri.clone(),
            scopes,
            auth_url: config
                .auth_url
                .clone()
                .unwrap_or_else(|| GOOGLE_AUTH_URL.to_string()),
            token_url: config
                .token_url
                .clone()
                .unwrap_or_else(|| GOOGLE_TOKEN_URL.to_string()),
            revoke_url: config
                .revoke_url
                .clone()
                .unwrap_or_else(|| GOOGLE_REVOKE_URL.to_string()),
        })
    }
}

#[async_trait]
impl OAuthProvider for GoogleOAuthProvider {
    fn id(&self) -> &'static str {
        "google"
    }

    fn service_name(&self) -> &'static str {
        service_names::GOOGLE_CALENDAR
    }

    fn auth_url(&self, state: &str) -> Result<String, OAuthError> {
        let scope = self.scopes.join(" ");
        let url = url::Url::parse_with_params(
            &self.auth_url,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", scope.as_str()),
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("state", state),
            ],
        )
        .map_err(|e| OAuthError::NotConfigured(format!("google auth_url: {e}")))?;
        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenSet, OAuthError> {
        let tokens = request_tokens(
            &self.token_url,
            &[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ],
            None,
            OAuthError::TokenExchange,
        )
        .await?;
        info!(
            refresh_token_present = tokens.refresh_token.is_some(),
            scope = ?tokens.scope,
            "Google tokens received"
        );
        Ok(tokens)
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenSet, OAuthError> {
        request_tokens(
            &self.token_url,
            &[
                ("refresh_token", refresh_token),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "refresh_token"),
            ],
            None,
            OAuthError::Refresh,
        )
        .await
    }

    async fn revoke(&self, token: &str) -> Result<(), OAuthError> {
        let response = post_form(&self.revoke_url, &[("token", token)], None).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Google token revoke rejected");
            return Err(OAuthError::Revoke(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }
        Ok(())
    }
}
