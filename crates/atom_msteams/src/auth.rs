// File: crates/atom_msteams/src/auth.rs
//! Microsoft identity platform (v2.0 endpoints) for Graph access.

use async_trait::async_trait;
use atom_common::oauth::{request_tokens, OAuthError, OAuthProvider, TokenSet};
use atom_common::services::service_names;
use atom_config::{configured_value, MsTeamsConfig};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";
pub const DEFAULT_TENANT: &str = "common";
/// `accountEnvironment` stored with every Teams token.
pub const ACCOUNT_ENVIRONMENT: &str = "login.microsoftonline.com";

const DEFAULT_SCOPES: [&str; 4] = [
    "Chat.Read",
    "ChannelMessage.Read.All",
    "User.Read",
    "offline_access",
];

/// Identity claims read from the id_token.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct IdTokenClaims {
    pub oid: Option<String>,
    pub tid: Option<String>,
    pub preferred_username: Option<String>,
}

/// Decode the payload of an id_token.
///
/// The token came straight from the token endpoint over TLS, so the
/// signature is not checked here.
pub fn decode_id_token_claims(id_token: &str) -> Option<IdTokenClaims> {
    let payload = id_token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// `meta` for a Teams token: home account id `{oid}.{tid}`, environment and tenant.
pub fn account_meta(claims: &IdTokenClaims) -> serde_json::Value {
    let home_account_id = match (&claims.oid, &claims.tid) {
        (Some(oid), Some(tid)) => Some(format!("{}.{}", oid, tid)),
        _ => None,
    };
    json!({
        "accountHomeAccountId": home_account_id,
        "accountEnvironment": ACCOUNT_ENVIRONMENT,
        "accountTenantId": claims.tid,
    })
}

#[derive(Debug, Clone)]
pub struct MsTeamsOAuthProvider {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scopes: Vec<String>,
    authority: String,
}

impl MsTeamsOAuthProvider {
    /// Fails with `NotConfigured` when the client id or secret is unset.
    pub fn from_config(config: &MsTeamsConfig) -> Result<Self, OAuthError> {
        let (client_id, client_secret) = match (
            configured_value(&config.client_id),
            configured_value(&config.client_secret),
        ) {
            (Some(id), Some(secret)) => (id.to_string(), secret.to_string()),
            _ => return Err(OAuthError::NotConfigured("msteams".to_string())),
        };
        let base = config
            .authority_base
            .as_deref()
            .unwrap_or(DEFAULT_AUTHORITY)
            .trim_end_matches('/');
        let tenant = configured_value(&config.tenant).unwrap_or(DEFAULT_TENANT);

        Ok(Self {
            client_id,
            client_secret,
            redirect_uri: config.redirect_uri.clone(),
            scopes: if config.scopes.is_empty() {
                DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect()
            } else {
                config.scopes.clone()
            },
            authority: format!("{}/{}/oauth2/v2.0", base, tenant),
        })
    }

    fn token_url(&self) -> String {
        format!("{}/token", self.authority)
    }

    fn scope(&self) -> String {
        self.scopes.join(" ")
    }
}

#[async_trait]
impl OAuthProvider for MsTeamsOAuthProvider {
    fn id(&self) -> &'static str {
        "microsoft"
    }

    fn service_name(&self) -> &'static str {
        service_names::MSTEAMS
    }

    fn auth_url(&self, state: &str) -> Result<String, OAuthError> {
        let scope = self.scope();
        let url = url::Url::parse_with_params(
            &format!("{}/authorize", self.authority),
            &[
                ("client_id", self.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_mode", "query"),
                ("scope", scope.as_str()),
                ("state", state),
            ],
        )
        .map_err(|e| OAuthError::NotConfigured(format!("msteams authority: {e}")))?;
        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenSet, OAuthError> {
        let scope = self.scope();
        let tokens = request_tokens(
            &self.token_url(),
            &[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
                ("scope", scope.as_str()),
            ],
            None,
            OAuthError::TokenExchange,
        )
        .await?;
        info!(
            refresh_token_present = tokens.refresh_token.is_some(),
            "Microsoft tokens received"
        );
        Ok(tokens)
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenSet, OAuthError> {
        let scope = self.scope();
        request_tokens(
            &self.token_url(),
            &[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
                ("scope", scope.as_str()),
            ],
            None,
            OAuthError::Refresh,
        )
        .await
    }

    fn token_meta(
        &self,
        tokens: &TokenSet,
        previous: Option<&serde_json::Value>,
        _now: DateTime<Utc>,
    ) -> Option<serde_json::Value> {
        match tokens.id_token.as_deref().map(decode_id_token_claims) {
            Some(Some(claims)) => Some(account_meta(&claims)),
            Some(None) => {
                warn!("Microsoft id_token could not be decoded; keeping previous account meta");
                previous.cloned()
            }
            None => previous.cloned(),
        }
    }
}
