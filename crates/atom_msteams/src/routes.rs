// --- File: crates/atom_msteams/src/routes.rs ---

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

use crate::auth::MsTeamsOAuthProvider;
use crate::handlers::{
    callback_handler, disconnect_handler, initiate_handler, status_handler, MsTeamsState,
};

/// Creates a router containing the MS Teams connection routes.
pub fn routes(config: Arc<AppConfig>, services: Arc<dyn ServiceFactory>) -> Router {
    let provider: Option<Arc<dyn OAuthProvider>> = config
        .msteams
        .as_ref()
        .map(MsTeamsOAuthProvider::from_config)
        .transpose()
        .unwrap_or_else(|e| {
            warn!(error = %e, "MS Teams OAuth disabled");
            None
        })
        .map(|p| Arc::new(p) as Arc<dyn OAuthProvider>);

    router_with_state(Arc::new(MsTeamsState {
        config,
        services,
        provider,
    }))
}

pub fn router_with_state(state: Arc<MsTeamsState>) -> Router {
    Router::new()
        .route(
            "/atom/auth/msteams/initiate",
            get(initiate_handler).fallback(|| async { method_not_allowed("GET") }),
        )
        .route(
            "/atom/auth/msteams/callback",
            get(callback_handler).fallback(|| async { method_not_allowed("GET") }),
        )
        .route(
            "/atom/auth/msteams/status",
            get(status_handler).fallback(|| async { method_not_allowed("GET") }),
        )
        .route(
            "/atom/auth/msteams/disconnect",
            post(disconnect_handler).fallback(|| async { method_not_allowed("POST") }),
        )
        .with_state(state)
}
