// --- File: crates/atom_msteams/src/logic.rs ---

use atom_common::oauth::lifecycle::{ensure_fresh_token, needs_refresh};
use atom_common::oauth::{complete_authorization, OAuthError, OAuthProvider};
use atom_common::services::{service_names, TokenStore};
use atom_common::AtomError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

#[cfg(feature = "openapi")]
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(IntoParams))]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CallbackFailure {
    InvalidState,
    /// `error` sent by the identity platform.
    Provider(String),
    NoCode,
    /// Client id or secret missing; answered with a JSON 500 instead of a redirect.
    NotConfigured,
    TokenExchange,
    TokenSave,
}

impl CallbackFailure {
    /// Value of the `msteams_auth_error` flag; `None` for failures that are not redirected.
    pub fn flag(&self) -> Option<String> {
        match self {
            CallbackFailure::InvalidState => Some("invalid_state".to_string()),
            CallbackFailure::Provider(error) => Some(error.clone()),
            CallbackFailure::NoCode => Some("no_code".to_string()),
            CallbackFailure::NotConfigured => None,
            CallbackFailure::TokenExchange => Some("token_exchange_failed".to_string()),
            CallbackFailure::TokenSave => Some("token_save_failed".to_string()),
        }
    }
}

/// Validate the redirect, exchange the code and store the Graph token.
///
/// The state is checked before anything else: it must be the signed-in user.
pub async fn handle_callback(
    store: &dyn TokenStore,
    provider: Option<&dyn OAuthProvider>,
    user_id: &str,
    query: &CallbackQuery,
) -> Result<(), CallbackFailure> {
    if query.state.as_deref() != Some(user_id) {
        error!(user_id, received_state = ?query.state, "Invalid state or session mismatch");
        return Err(CallbackFailure::InvalidState);
    }
    if let Some(error) = query.error.as_deref().filter(|e| !e.is_empty()) {
        error!(
            user_id,
            error,
            description = query.error_description.as_deref().unwrap_or_default(),
            "Error from Microsoft identity platform"
        );
        return Err(CallbackFailure::Provider(error.to_string()));
    }
    let code = query
        .code
        .as_deref()
        .filter(|c| !c.is_empty())
        .ok_or(CallbackFailure::NoCode)?;
    let provider = provider.ok_or_else(|| {
        error!("MS Teams client id or secret not configured");
        CallbackFailure::NotConfigured
    })?;

    match complete_authorization(store, provider, user_id, code).await {
        Ok(row) => {
            info!(
                user_id,
                tenant = row.meta_str("accountTenantId").unwrap_or_default(),
                "MS Teams connected and tokens stored"
            );
            Ok(())
        }
        Err(OAuthError::Store(e)) => {
            error!(user_id, error = %e, "Failed to save MS Teams tokens");
            Err(CallbackFailure::TokenSave)
        }
        Err(e) => {
            error!(user_id, error = %e, "MS Teams token acquisition failed");
            Err(CallbackFailure::TokenExchange)
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TeamsStatus {
    pub is_connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TeamsStatus {
    fn disconnected(error: Option<&str>) -> Self {
        Self {
            is_connected: false,
            tenant_id: None,
            error: error.map(str::to_string),
        }
    }
}

/// Connection state from the stored row, refreshing a token close to expiry.
pub async fn connection_status(
    store: &dyn TokenStore,
    provider: Option<&dyn OAuthProvider>,
    user_id: &str,
) -> TeamsStatus {
    let token = match store.latest_token(user_id, service_names::MSTEAMS).await {
        Ok(Some(token)) if !token.access_token.is_empty() => token,
        Ok(_) => return TeamsStatus::disconnected(None),
        Err(e) => {
            error!(user_id, error = %e, "Token lookup failed during MS Teams status check");
            return TeamsStatus::disconnected(Some("status_check_exception"));
        }
    };

    if needs_refresh(&token, Utc::now()) {
        if token.usable_refresh_token().is_none() {
            return TeamsStatus::disconnected(Some("token_expired_no_refresh"));
        }
        if let Some(provider) = provider {
            if let Err(e) = ensure_fresh_token(store, provider, user_id).await {
                warn!(user_id, error = %e, "MS Teams token refresh failed");
                return TeamsStatus::disconnected(Some("token_invalid_or_expired"));
            }
        }
    }

    TeamsStatus {
        is_connected: true,
        tenant_id: token.meta_str("accountTenantId").map(str::to_string),
        error: None,
    }
}

/// Delete the stored Graph token. Microsoft has no revoke endpoint for it.
pub async fn disconnect(store: &dyn TokenStore, user_id: &str) -> Result<u64, AtomError> {
    let deleted = store.delete_tokens(user_id, service_names::MSTEAMS).await?;
    info!(user_id, deleted, "MS Teams disconnected");
    Ok(deleted)
}
