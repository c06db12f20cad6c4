// --- File: crates/atom_stripe/src/routes.rs ---

use axum::{routing::get, Router};
use std::sync::Arc;

use atom_common::method_not_allowed;
use atom_common::services::ServiceFactory;
use atom_config::AppConfig;

use crate::handlers::{list_payments_handler, payment_details_handler, StripeState};
use crate::logic::StripeSkills;

/// Creates a router containing the Stripe payment routes.
pub fn routes(config: Arc<AppConfig>, services: Arc<dyn ServiceFactory>) -> Router {
    let api_base = config.stripe.as_ref().and_then(|s| s.api_base.clone());
    let skills = StripeSkills::new(services.credential_store(), api_base);
    router_with_state(Arc::new(StripeState { services, skills }))
}

pub fn router_with_state(state: Arc<StripeState>) -> Router {
    Router::new()
        .route(
            "/atom/stripe/payments",
            get(list_payments_handler).fallback(|| async { method_not_allowed("GET") }),
        )
        .route(
            "/atom/stripe/payments/{id}",
            get(payment_details_handler).fallback(|| async { method_not_allowed("GET") }),
        )
        .with_state(state)
}
