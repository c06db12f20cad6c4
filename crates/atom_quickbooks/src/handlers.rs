// File: crates/atom_quickbooks/src/handlers.rs
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use atom_common::services::{ServiceFactory, Session};
use atom_common::{config_error, cookie_value, redirect_with_flags, require_session, AtomError};
use atom_config::AppConfig;

use crate::api::ListInvoicesOptions;
use crate::skills::{QboCallbackQuery, QuickBooksSkills};

/// Cookie holding the OAuth state between initiate and callback.
pub const STATE_COOKIE: &str = "qbo_oauth_state";
const STATE_COOKIE_PATH: &str = "/atom/auth/quickbooks";

#[derive(Clone)]
pub struct QboState {
    pub config: Arc<AppConfig>,
    pub services: Arc<dyn ServiceFactory>,
    pub skills: QuickBooksSkills,
}

impl QboState {
    async fn session(&self, headers: &HeaderMap) -> Result<Session, AtomError> {
        let verifier = self
            .services
            .session_verifier()
            .ok_or_else(|| config_error("Session verification is not configured"))?;
        require_session(verifier.as_ref(), headers).await
    }
}

fn state_cookie(value: &str, max_age: u32) -> String {
    format!(
        "{}={}; Path={}; Max-Age={}; HttpOnly; SameSite=Lax",
        STATE_COOKIE, value, STATE_COOKIE_PATH, max_age
    )
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/atom/auth/quickbooks/initiate",
    responses(
        (status = 303, description = "Redirect to Intuit with a fresh state cookie"),
        (status = 401, description = "No valid session"),
        (status = 500, description = "QuickBooks OAuth not configured")
    ),
    tag = "QuickBooks"
))]
pub async fn initiate_handler(State(state): State<Arc<QboState>>, headers: HeaderMap) -> Response {
    let session = match state.session(&headers).await {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };
    let oauth_state = Uuid::new_v4().simple().to_string();
    let response = state.skills.auth_uri(&oauth_state);
    match response.data.clone() {
        Some(url) if response.ok => {
            info!(user_id = %session.user_id, "Redirecting to Intuit consent");
            (
                [(header::SET_COOKIE, state_cookie(&oauth_state, 600))],
                Redirect::to(&url),
            )
                .into_response()
        }
        _ => response.into_response(),
    }
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/atom/auth/quickbooks/callback",
    params(QboCallbackQuery),
    responses(
        (status = 303, description = "Redirect to settings with quickbooks_auth_success or quickbooks_auth_error")
    ),
    tag = "QuickBooks"
))]
pub async fn callback_handler(
    State(state): State<Arc<QboState>>,
    headers: HeaderMap,
    Query(query): Query<QboCallbackQuery>,
) -> Response {
    let session = match state.session(&headers).await {
        Ok(session) => session,
        Err(e) => {
            warn!(error = %e, "Session invalid during QuickBooks callback");
            return redirect_with_flags(
                &state.config.frontend.login_path,
                &[("error", "session_expired_oauth_callback")],
            )
            .into_response();
        }
    };

    let original_state = cookie_value(&headers, STATE_COOKIE);
    let response = state
        .skills
        .handle_callback(&session.user_id, &query, original_state.as_deref())
        .await;

    let settings = &state.config.frontend.settings_path;
    let redirect = match response.error_code() {
        None => redirect_with_flags(settings, &[("quickbooks_auth_success", "true")]),
        Some(code) => redirect_with_flags(settings, &[("quickbooks_auth_error", code)]),
    };
    ([(header::SET_COOKIE, state_cookie("", 0))], redirect).into_response()
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/atom/quickbooks/invoices",
    params(ListInvoicesOptions),
    responses(
        (status = 200, description = "Invoices for the connected company"),
        (status = 401, description = "No session or QuickBooks not connected")
    ),
    tag = "QuickBooks"
))]
pub async fn list_invoices_handler(
    State(state): State<Arc<QboState>>,
    headers: HeaderMap,
    Query(options): Query<ListInvoicesOptions>,
) -> Response {
    let session = match state.session(&headers).await {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };
    state
        .skills
        .list_invoices(&session.user_id, &options)
        .await
        .into_response()
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/atom/quickbooks/invoices/{id}",
    params(("id" = String, Path, description = "QuickBooks invoice id")),
    responses(
        (status = 200, description = "The invoice, or no data when it does not exist"),
        (status = 401, description = "No session or QuickBooks not connected")
    ),
    tag = "QuickBooks"
))]
pub async fn invoice_details_handler(
    State(state): State<Arc<QboState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let session = match state.session(&headers).await {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };
    state
        .skills
        .get_invoice_details(&session.user_id, &id)
        .await
        .into_response()
}
