// --- File: crates/atom_common/src/session.rs ---
//! SuperTokens session verification against the SuperTokens core.

use axum::http::{header, HeaderMap};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::error::{auth_error, external_service_error, AtomError};
use crate::http::client::HTTP_CLIENT;
use crate::services::{BoxFuture, Session, SessionVerifier};

/// Cookie SuperTokens stores the access token in.
pub const ACCESS_TOKEN_COOKIE: &str = "sAccessToken";

const CDI_VERSION: &str = "2.21";

/// Access token from `Authorization: Bearer`, else from the `sAccessToken` cookie.
pub fn access_token_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(bearer) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return Some(bearer.to_string());
    }

    cookie_value(headers, ACCESS_TOKEN_COOKIE)
}

/// Non-empty value of the named request cookie.
pub fn cookie_value(headers: &HeaderMap, cookie: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Verify the request's session, or fail with an `AuthError`.
pub async fn require_session(
    verifier: &dyn SessionVerifier,
    headers: &HeaderMap,
) -> Result<Session, AtomError> {
    let token = access_token_from_headers(headers)
        .ok_or_else(|| auth_error("No session access token on request"))?;
    verifier.verify(&token).await
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    status: String,
    session: Option<VerifySession>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifySession {
    handle: Option<String>,
    user_id: String,
}

/// Verifies sessions through `POST {core}/recipe/session/verify`.
pub struct SuperTokensVerifier {
    connection_uri: String,
    api_key: Option<String>,
}

impl SuperTokensVerifier {
    pub fn new(connection_uri: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            connection_uri: connection_uri.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    async fn verify_token(&self, access_token: &str) -> Result<Session, AtomError> {
        let url = format!("{}/recipe/session/verify", self.connection_uri);
        let mut request = HTTP_CLIENT
            .post(&url)
            .header("cdi-version", CDI_VERSION)
            .json(&json!({
                "accessToken": access_token,
                "doAntiCsrfCheck": false,
                "enableAntiCsrf": false,
                "checkDatabase": false,
            }));
        if let Some(api_key) = atom_config::configured_value(&self.api_key) {
            request = request.header("api-key", api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "SuperTokens core rejected verify call");
            return Err(external_service_error(
                "SuperTokens",
                format!("HTTP {}: {}", status.as_u16(), body),
            ));
        }

        let body: VerifyResponse = response.json().await?;
        match (body.status.as_str(), body.session) {
            ("OK", Some(session)) => {
                debug!(user_id = %session.user_id, "Session verified");
                Ok(Session {
                    user_id: session.user_id,
                    handle: session.handle,
                })
            }
            ("TRY_REFRESH_TOKEN", _) => Err(auth_error("Session expired, refresh required")),
            (other, _) => Err(auth_error(format!(
                "Session verification failed: {} {}",
                other,
                body.message.unwrap_or_default()
            ))),
        }
    }
}

impl SessionVerifier for SuperTokensVerifier {
    fn verify(&self, access_token: &str) -> BoxFuture<'_, Session, AtomError> {
        let access_token = access_token.to_string();
        Box::pin(async move { self.verify_token(&access_token).await })
    }
}
