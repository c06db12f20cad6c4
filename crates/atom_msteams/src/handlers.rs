// File: crates/atom_msteams/src/handlers.rs
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

use crate::logic::{connection_status, disconnect, handle_callback, CallbackQuery, TeamsStatus};

#[derive(Clone)]
pub struct MsTeamsState {
    pub config: Arc<AppConfig>,
    pub services: Arc<dyn ServiceFactory>,
    pub provider: Option<Arc<dyn OAuthProvider>>,
}

impl MsTeamsState {
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

    fn settings_redirect(&self, flags: &[(&str, &str)]) -> Response {
        redirect_with_flags(&self.config.frontend.settings_path, flags).into_response()
    }
}

fn not_configured() -> Response {
    config_error("MS Teams OAuth configuration error on server.").into_response()
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/atom/auth/msteams/initiate",
    responses(
        (status = 302, description = "Redirect to the Microsoft sign-in page"),
        (status = 401, description = "No valid session"),
        (status = 500, description = "MS Teams OAuth client not configured")
    ),
    tag = "MS Teams"
))]
pub async fn initiate_handler(
    State(state): State<Arc<MsTeamsState>>,
    headers: HeaderMap,
) -> Response {
    let session = match state.session(&headers).await {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };
    let Some(provider) = &state.provider else {
        error!("MS Teams client id or secret not configured");
        return not_configured();
    };
    match provider.auth_url(&session.user_id) {
        Ok(url) => {
            info!(user_id = %session.user_id, "Redirecting to Microsoft sign-in");
            Redirect::to(&url).into_response()
        }
        Err(e) => AtomError::from(e).into_response(),
    }
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/atom/auth/msteams/callback",
    params(CallbackQuery),
    responses(
        (status = 302, description = "Redirect to settings with msteams_auth_success or msteams_auth_error"),
        (status = 500, description = "MS Teams OAuth client not configured")
    ),
    tag = "MS Teams"
))]
pub async fn callback_handler(
    State(state): State<Arc<MsTeamsState>>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let session = match state.session(&headers).await {
        Ok(session) => session,
        Err(e) => {
            warn!(error = %e, "Session verification failed in MS Teams callback");
            return redirect_with_flags(
                &state.config.frontend.msteams_login_path,
                &[("error", "session_expired_oauth")],
            )
            .into_response();
        }
    };
    let store = match state.token_store() {
        Ok(store) => store,
        Err(e) => return e.into_response(),
    };

    match handle_callback(
        store.as_ref(),
        state.provider.as_deref(),
        &session.user_id,
        &query,
    )
    .await
    {
        Ok(()) => state.settings_redirect(&[("msteams_auth_success", "true")]),
        Err(failure) => match failure.flag() {
            Some(flag) => state.settings_redirect(&[("msteams_auth_error", flag.as_str())]),
            None => not_configured(),
        },
    }
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/atom/auth/msteams/status",
    responses(
        (status = 200, description = "Connection status", body = TeamsStatus),
        (status = 401, description = "No valid session", body = TeamsStatus)
    ),
    tag = "MS Teams"
))]
pub async fn status_handler(
    State(state): State<Arc<MsTeamsState>>,
    headers: HeaderMap,
) -> Response {
    let session = match state.session(&headers).await {
        Ok(session) => session,
        Err(_) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(TeamsStatus {
                    is_connected: false,
                    tenant_id: None,
                    error: Some("User not authenticated.".to_string()),
                }),
            )
                .into_response()
        }
    };
    let store = match state.token_store() {
        Ok(store) => store,
        Err(e) => return e.into_response(),
    };
    Json(connection_status(store.as_ref(), state.provider.as_deref(), &session.user_id).await)
        .into_response()
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/atom/auth/msteams/disconnect",
    responses(
        (status = 302, description = "Redirect to settings with msteams_disconnect_success=true"),
        (status = 401, description = "No valid session"),
        (status = 500, description = "Delete failed")
    ),
    tag = "MS Teams"
))]
pub async fn disconnect_handler(
    State(state): State<Arc<MsTeamsState>>,
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
    match disconnect(store.as_ref(), &session.user_id).await {
        Ok(_) => state.settings_redirect(&[("msteams_disconnect_success", "true")]),
        Err(e) => {
            error!(user_id = %session.user_id, error = %e, "MS Teams disconnect failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "success": false,
                    "message": "Failed to remove MS Teams connection details from the database."
                })),
            )
                .into_response()
        }
    }
}
