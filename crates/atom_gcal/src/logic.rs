// --- File: crates/atom_gcal/src/logic.rs ---
//! Callback, status and disconnect flows for the Google Calendar connection.
//!
//! The flows only see `TokenStore`, `OAuthProvider` and [`CalendarProbe`], so
//! the handlers stay thin and the flows are testable with in-memory doubles.

use async_trait::async_trait;
use atom_common::oauth::lifecycle::{ensure_fresh_token, needs_refresh};
use atom_common::oauth::{complete_authorization, OAuthError, OAuthProvider};
use atom_common::services::{service_names, TokenStore};
use atom_common::AtomError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

#[cfg(feature = "openapi")]
use utoipa::{IntoParams, ToSchema};

use crate::auth::create_user_hub;

/// Query string Google appends to the redirect URI.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(IntoParams))]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Why a callback did not connect the calendar.
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackFailure {
    /// `error` parameter sent by Google, e.g. `access_denied`.
    Provider(String),
    InvalidState,
    NoCode,
    TokenExchange,
    /// Message of the failed save.
    Save(String),
    Processing,
}

impl CallbackFailure {
    /// Value of the `calendar_auth_error` redirect flag.
    pub fn flag(&self) -> String {
        match self {
            CallbackFailure::Provider(error) => error.clone(),
            CallbackFailure::InvalidState => "invalid_state".to_string(),
            CallbackFailure::NoCode => "no_code_received".to_string(),
            CallbackFailure::TokenExchange => "token_exchange_failed".to_string(),
            CallbackFailure::Save(message) => message.clone(),
            CallbackFailure::Processing => "callback_processing_failed".to_string(),
        }
    }
}

/// Validate the callback, exchange the code and persist the token row.
pub async fn handle_callback(
    store: &dyn TokenStore,
    provider: Option<&dyn OAuthProvider>,
    user_id: &str,
    query: &CallbackQuery,
) -> Result<(), CallbackFailure> {
    if let Some(error) = query.error.as_deref().filter(|e| !e.is_empty()) {
        warn!(user_id, error, "Error from Google OAuth provider");
        return Err(CallbackFailure::Provider(error.to_string()));
    }
    if query.state.as_deref() != Some(user_id) {
        error!(user_id, received_state = ?query.state, "Invalid OAuth state");
        return Err(CallbackFailure::InvalidState);
    }
    let code = match query.code.as_deref().filter(|c| !c.is_empty()) {
        Some(code) => code,
        None => {
            error!(user_id, "No authorization code received from Google");
            return Err(CallbackFailure::NoCode);
        }
    };
    let provider = provider.ok_or_else(|| {
        error!(user_id, "Google OAuth client is not configured");
        CallbackFailure::Processing
    })?;

    match complete_authorization(store, provider, user_id, code).await {
        Ok(_) => {
            info!(user_id, "Google Calendar connected and tokens saved");
            Ok(())
        }
        Err(OAuthError::Store(e)) => {
            error!(user_id, error = %e, "Failed to save Google tokens");
            Err(CallbackFailure::Save(e.to_string()))
        }
        Err(OAuthError::TokenExchange(reason)) => {
            error!(user_id, reason, "Google code exchange failed");
            Err(CallbackFailure::TokenExchange)
        }
        Err(e) => {
            error!(user_id, error = %e, "Google OAuth callback failed");
            Err(CallbackFailure::Processing)
        }
    }
}

/// `GET /atom/auth/calendar/status` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CalendarStatus {
    pub is_connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CalendarStatus {
    pub fn connected(email: Option<String>) -> Self {
        Self {
            is_connected: true,
            email,
            error: None,
        }
    }

    pub fn disconnected(error: Option<&str>) -> Self {
        Self {
            is_connected: false,
            email: None,
            error: error.map(str::to_string),
        }
    }
}

/// Outcome of a lightweight authenticated call to the Calendar API.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeError {
    /// 401 or `invalid_grant`
    Unauthorized,
    Api(String),
}

/// Checks that an access token can reach the user's calendar.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CalendarProbe: Send + Sync {
    /// The primary calendar id, which is the account email.
    async fn primary_calendar(&self, access_token: &str) -> Result<Option<String>, ProbeError>;
}

/// [`CalendarProbe`] calling `calendarList.get("primary")`.
#[derive(Debug, Clone, Default)]
pub struct GoogleCalendarProbe {
    api_base: Option<String>,
}

impl GoogleCalendarProbe {
    pub fn new(api_base: Option<String>) -> Self {
        Self { api_base }
    }
}

fn is_unauthorized(error: &google_calendar3::Error) -> bool {
    match error {
        google_calendar3::Error::BadRequest(body) => {
            body["error"]["code"].as_i64() == Some(401)
                || body["error"].as_str() == Some("invalid_grant")
                || body["error"]["status"].as_str() == Some("UNAUTHENTICATED")
        }
        google_calendar3::Error::Failure(response) => response.status().as_u16() == 401,
        _ => false,
    }
}

#[async_trait]
impl CalendarProbe for GoogleCalendarProbe {
    async fn primary_calendar(&self, access_token: &str) -> Result<Option<String>, ProbeError> {
        let hub = create_user_hub(access_token.to_string(), self.api_base.as_deref())
            .map_err(|e| ProbeError::Api(e.to_string()))?;
        match hub.calendar_list().get("primary").doit().await {
            Ok((_, entry)) => Ok(entry.id),
            Err(e) if is_unauthorized(&e) => Err(ProbeError::Unauthorized),
            Err(e) => Err(ProbeError::Api(e.to_string())),
        }
    }
}

/// Report whether the user's stored Google token still works.
///
/// A token close to expiry is refreshed (and persisted) before probing. When
/// the OAuth client is not configured the stored row alone counts as
/// connected.
pub async fn connection_status(
    store: &dyn TokenStore,
    provider: Option<&dyn OAuthProvider>,
    probe: &dyn CalendarProbe,
    user_id: &str,
) -> CalendarStatus {
    let token = match store
        .latest_token(user_id, service_names::GOOGLE_CALENDAR)
        .await
    {
        Ok(Some(token)) if !token.access_token.is_empty() => token,
        Ok(_) => return CalendarStatus::disconnected(None),
        Err(e) => {
            error!(user_id, error = %e, "Token lookup failed during status check");
            return CalendarStatus::disconnected(Some("status_check_exception"));
        }
    };

    if needs_refresh(&token, Utc::now()) && token.usable_refresh_token().is_none() {
        info!(user_id, "Access token expired and no refresh token found");
        return CalendarStatus::disconnected(Some("token_expired_no_refresh"));
    }

    let provider = match provider {
        Some(provider) => provider,
        None => {
            warn!("Google OAuth client not configured; skipping API probe");
            return CalendarStatus::connected(None);
        }
    };

    let token = match ensure_fresh_token(store, provider, user_id).await {
        Ok(token) => token,
        Err(OAuthError::Refresh(reason)) => {
            warn!(user_id, reason, "Refreshing Google token failed");
            return CalendarStatus::disconnected(Some("token_invalid_or_expired"));
        }
        Err(e) => {
            error!(user_id, error = %e, "Status check failed");
            return CalendarStatus::disconnected(Some("status_check_exception"));
        }
    };

    match probe.primary_calendar(&token.access_token).await {
        Ok(email) => {
            debug!(user_id, "Google token valid");
            CalendarStatus::connected(email)
        }
        Err(ProbeError::Unauthorized) => {
            CalendarStatus::disconnected(Some("token_invalid_or_expired"))
        }
        Err(ProbeError::Api(message)) => {
            warn!(user_id, message, "Google API probe failed");
            CalendarStatus::disconnected(Some("api_call_failed"))
        }
    }
}

/// Why a disconnect failed.
#[derive(Debug)]
pub enum DisconnectFailure {
    Lookup(AtomError),
    Delete(AtomError),
}

impl DisconnectFailure {
    pub fn message(&self) -> &'static str {
        match self {
            DisconnectFailure::Lookup(_) => {
                "An unexpected error occurred while disconnecting Google Calendar."
            }
            DisconnectFailure::Delete(_) => {
                "Failed to remove calendar connection details from the database."
            }
        }
    }
}

/// Revoke the stored grant at Google and delete the rows.
///
/// Revocation is best effort; the local rows are removed either way. Returns
/// the number of deleted rows.
pub async fn disconnect(
    store: &dyn TokenStore,
    provider: Option<&dyn OAuthProvider>,
    user_id: &str,
) -> Result<u64, DisconnectFailure> {
    let token = store
        .latest_token(user_id, service_names::GOOGLE_CALENDAR)
        .await
        .map_err(DisconnectFailure::Lookup)?;

    let revocable = token.as_ref().and_then(|t| {
        t.usable_refresh_token()
            .map(str::to_string)
            .or_else(|| Some(t.access_token.clone()).filter(|a| !a.is_empty()))
    });

    match (revocable, provider) {
        (Some(grant), Some(provider)) => match provider.revoke(&grant).await {
            Ok(()) => info!(user_id, "Google token revoked"),
            Err(e) => warn!(user_id, error = %e, "Failed to revoke Google token; deleting local copy anyway"),
        },
        (Some(_), None) => warn!(user_id, "Google OAuth client not configured; skipping revoke"),
        (None, _) => debug!(user_id, "No Google token to revoke"),
    }

    let deleted = store
        .delete_tokens(user_id, service_names::GOOGLE_CALENDAR)
        .await
        .map_err(DisconnectFailure::Delete)?;
    info!(user_id, deleted, "Google Calendar disconnected");
    Ok(deleted)
}
