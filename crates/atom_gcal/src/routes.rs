// --- File: crates/atom_gcal/src/routes.rs ---

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tracing::warn;

use atom_common::method_not_allowed;
use atom_common::oauth::OAuthProvider;
use atom_common::services::ServiceFactory;
use atom_config::AppConfig;

use crate::auth::GoogleOAuthProvider;
use crate::handlers::{
    callback_handler, disconnect_handler, initiate_handler, status_handler, GcalState,
};
use crate::logic::GoogleCalendarProbe;

/// Creates a router containing the Google Calendar connection routes.
///
/// A missing or incomplete `google` section still mounts the routes; they
/// answer with configuration errors.
pub fn routes(config: Arc<AppConfig>, services: Arc<dyn ServiceFactory>) -> Router {
    let google = config.google.clone().unwrap_or_default();
    let provider: Option<Arc<dyn OAuthProvider>> = match GoogleOAuthProvider::from_config(&google)
    {
        Ok(provider) => Some(Arc::new(provider)),
        Err(e) => {
            warn!(error = %e, "Google OAuth disabled");
            None
        }
    };

    let state = Arc::new(GcalState {
        config,
        services,
        provider,
        probe: Arc::new(GoogleCalendarProbe::new(google.calendar_api_base)),
    });
    router_with_state(state)
}

/// The routes over an already built state.
pub fn router_with_state(state: Arc<GcalState>) -> Router {
    Router::new()
        .route(
            "/atom/auth/calendar/initiate",
            get(initiate_handler).fallback(|| async { method_not_allowed("GET") }),
        )
        .route(
            "/atom/auth/calendar/callback",
            get(callback_handler).fallback(|| async { method_not_allowed("GET") }),
        )
        .route(
            "/atom/auth/calendar/status",
            get(status_handler).fallback(|| async { method_not_allowed("GET") }),
        )
        .route(
            "/atom/auth/calendar/disconnect",
            post(disconnect_handler).fallback(|| async { method_not_allowed("POST") }),
        )
        .with_state(state)
}
