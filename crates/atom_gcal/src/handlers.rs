// File: crates/atom_gcal/src/handlers.rs
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use std::sync::Arc;
use tracing::{error, info, warn};

use atom_common::oauth::OAuthProvider;
use atom_common::services::{ServiceFactory, Session, TokenStore};
use atom_common::{config_error, redirect_with_flags, require_session, AtomError};
use atom_config::AppConfig;

use crate::logic::{
    connection_status, disconnect, handle_callback, CalendarProbe, CalendarStatus, CallbackQuery,
};

/// Shared state for the calendar connection routes.
#[derive(Clone)]
pub struct GcalState {
    pub config: Arc<AppConfig>,
    pub services: Arc<dyn ServiceFactory>,
    /// `None` when the Google client id or secret is not configured.
    pub provider: Option<Arc<dyn OAuthProvider>>,
    pub probe: Arc<dyn CalendarProbe>,
}

impl GcalState {
    fn settings_redirect(&self, flags: &[(&str, &str)]) -> Redirect {
        redirect_with_flags(&self.config.frontend.settings_path, flags)
    }

    fn token_store(&self) -> Result<Arc<dyn TokenStore>, AtomError> {
        self.services
            .token_store()
            .ok_or_else(|| config_error("Token store is not configured"))
    }

    async fn session(&self, headers: &HeaderMap) -> Result<Session, AtomError> {
        let verifier = self
            .services
            .session_verifier()
            .ok_or_else(|| config_error("Session verification is not configured"))?;
        require_session(verifier.as_ref(), headers).await
    }
}

/// Start the Google consent flow for the signed-in user.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/atom/auth/calendar/initiate",
    responses(
        (status = 302, description = "Redirect to Google consent screen"),
        (status = 401, description = "No valid session"),
        (status = 500, description = "Google OAuth client not configured")
    ),
    tag = "Google Calendar"
))]
pub async fn initiate_handler(State(state): State<Arc<GcalState>>, headers: HeaderMap) -> Response {
    let session = match state.session(&headers).await {
        Ok(session) => session,
        Err(e) => {
            warn!(error = %e, "Calendar initiate without a valid session");
            return e.into_response();
        }
    };
    let provider = match &state.provider {
        Some(provider) => provider,
        None => {
            error!("Google OAuth client id/secret not configured");
            return config_error("Google OAuth is not configured on the server.").into_response();
        }
    };
    match provider.auth_url(&session.user_id) {
        Ok(url) => {
            info!(user_id = %session.user_id, "Redirecting to Google consent");
            Redirect::to(&url).into_response()
        }
        Err(e) => AtomError::from(e).into_response(),
    }
}

/// Google redirect target; stores the tokens and sends the browser back to settings.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/atom/auth/calendar/callback",
    params(CallbackQuery),
    responses(
        (status = 302, description = "Redirect to the settings page with calendar_auth_success or calendar_auth_error")
    ),
    tag = "Google Calendar"
))]
pub async fn callback_handler(
    State(state): State<Arc<GcalState>>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let session = match state.session(&headers).await {
        Ok(session) => session,
        Err(e) => {
            warn!(error = %e, "Session invalid during Google OAuth callback");
            return redirect_with_flags(
                &state.config.frontend.login_path,
                &[("error", "session_expired_oauth_callback")],
            )
            .into_response();
        }
    };

    let store = match state.token_store() {
        Ok(store) => store,
        Err(e) => {
            error!(error = %e, "Cannot store Google tokens");
            return state
                .settings_redirect(&[
                    ("calendar_auth_error", "callback_processing_failed"),
                    ("atom_agent", "true"),
                ])
                .into_response();
        }
    };

    match handle_callback(
        store.as_ref(),
        state.provider.as_deref(),
        &session.user_id,
        &query,
    )
    .await
    {
        Ok(()) => state
            .settings_redirect(&[("calendar_auth_success", "true"), ("atom_agent", "true")])
            .into_response(),
        Err(failure) => {
            let flag = failure.flag();
            state
                .settings_redirect(&[("calendar_auth_error", flag.as_str()), ("atom_agent", "true")])
                .into_response()
        }
    }
}

/// Whether the user's stored Google token still works.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/atom/auth/calendar/status",
    responses(
        (status = 200, description = "Connection status", body = CalendarStatus),
        (status = 401, description = "No valid session", body = CalendarStatus)
    ),
    tag = "Google Calendar"
))]
pub async fn status_handler(State(state): State<Arc<GcalState>>, headers: HeaderMap) -> Response {
    let session = match state.session(&headers).await {
        Ok(session) => session,
        Err(_) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(CalendarStatus::disconnected(Some("User not authenticated."))),
            )
                .into_response();
        }
    };
    let store = match state.token_store() {
        Ok(store) => store,
        Err(e) => {
            error!(error = %e, "Status check without a token store");
            return Json(CalendarStatus::disconnected(Some("status_check_exception")))
                .into_response();
        }
    };

    let status = connection_status(
        store.as_ref(),
        state.provider.as_deref(),
        state.probe.as_ref(),
        &session.user_id,
    )
    .await;
    Json(status).into_response()
}

/// Revoke and delete the user's Google Calendar connection.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/atom/auth/calendar/disconnect",
    responses(
        (status = 302, description = "Redirect to settings with calendar_disconnect_success=true"),
        (status = 401, description = "No valid session"),
        (status = 500, description = "Lookup or delete failed")
    ),
    tag = "Google Calendar"
))]
pub async fn disconnect_handler(
    State(state): State<Arc<GcalState>>,
    headers: HeaderMap,
) -> Response {
    let session = match state.session(&headers).await {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };
    let store = match state.token_store() {
        Ok(store) => store,
        Err(e) => return e.into_response(),
    };

    match disconnect(store.as_ref(), state.provider.as_deref(), &session.user_id).await {
        Ok(_) => state
            .settings_redirect(&[("calendar_disconnect_success", "true"), ("atom_agent", "true")])
            .into_response(),
        Err(failure) => {
            error!(user_id = %session.user_id, ?failure, "Google Calendar disconnect failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "success": false, "message": failure.message() })),
            )
                .into_response()
        }
    }
}
