// --- File: crates/atom_stripe/src/handlers.rs ---
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use atom_common::services::{ServiceFactory, Session};
use atom_common::{config_error, require_session, AtomError};

use crate::logic::StripeSkills;
use crate::models::ListPaymentsOptions;

#[derive(Clone)]
pub struct StripeState {
    pub services: Arc<dyn ServiceFactory>,
    pub skills: StripeSkills,
}

impl StripeState {
    async fn session(&self, headers: &HeaderMap) -> Result<Session, AtomError> {
        let verifier = self
            .services
            .session_verifier()
            .ok_or_else(|| config_error("Session verification is not configured"))?;
        require_session(verifier.as_ref(), headers).await
    }
}

/// Handler for listing the user's PaymentIntents.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/atom/stripe/payments",
    params(ListPaymentsOptions),
    responses(
        (status = 200, description = "Payments, newest first", body = crate::models::PaymentList),
        (status = 500, description = "No Stripe key stored for the user")
    ),
    tag = "Stripe"
))]
pub async fn list_payments_handler(
    State(state): State<Arc<StripeState>>,
    headers: HeaderMap,
    Query(options): Query<ListPaymentsOptions>,
) -> Response {
    let session = match state.session(&headers).await {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };
    state
        .skills
        .list_payments(&session.user_id, &options)
        .await
        .into_response()
}

/// Handler for one PaymentIntent with its latest charge and customer expanded.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/atom/stripe/payments/{id}",
    params(("id" = String, Path, description = "PaymentIntent id (pi_...)")),
    responses(
        (status = 200, description = "The PaymentIntent", body = crate::models::StripePaymentIntent),
        (status = 404, description = "PAYMENT_INTENT_NOT_FOUND")
    ),
    tag = "Stripe"
))]
pub async fn payment_details_handler(
    State(state): State<Arc<StripeState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let session = match state.session(&headers).await {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };
    state
        .skills
        .get_payment_details(&session.user_id, &id)
        .await
        .into_response()
}
