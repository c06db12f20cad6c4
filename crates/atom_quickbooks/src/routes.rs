// --- File: crates/atom_quickbooks/src/routes.rs ---

use axum::{routing::get, Router};
use std::sync::Arc;
use tracing::warn;

use atom_common::method_not_allowed;
use atom_common::oauth::OAuthProvider;
use atom_common::services::ServiceFactory;
use atom_config::AppConfig;

use crate::api::QboApi;
use crate::auth::{api_base, QuickBooksProvider};
use crate::handlers::{
    callback_handler, initiate_handler, invoice_details_handler, list_invoices_handler, QboState,
};
use crate::skills::QuickBooksSkills;

/// QuickBooks OAuth and invoice routes.
pub fn routes(config: Arc<AppConfig>, services: Arc<dyn ServiceFactory>) -> Router {
    let qbo = config.quickbooks.clone().unwrap_or_default();
    let provider: Option<Arc<dyn OAuthProvider>> = match QuickBooksProvider::from_config(&qbo) {
        Ok(provider) => Some(Arc::new(provider)),
        Err(e) => {
            warn!(error = %e, "QuickBooks OAuth disabled");
            None
        }
    };
    let skills = QuickBooksSkills::new(services.token_store(), provider, QboApi::new(api_base(&qbo)));
    router_with_state(Arc::new(QboState {
        config,
        services,
        skills,
    }))
}

pub fn router_with_state(state: Arc<QboState>) -> Router {
    Router::new()
        .route(
            "/atom/auth/quickbooks/initiate",
            get(initiate_handler).fallback(|| async { method_not_allowed("GET") }),
        )
        .route(
            "/atom/auth/quickbooks/callback",
            get(callback_handler).fallback(|| async { method_not_allowed("GET") }),
        )
        .route(
            "/atom/quickbooks/invoices",
            get(list_invoices_handler).fallback(|| async { method_not_allowed("GET") }),
        )
        .route(
            "/atom/quickbooks/invoices/{id}",
            get(invoice_details_handler).fallback(|| async { method_not_allowed("GET") }),
        )
        .with_state(state)
}
