// --- File: crates/atom_stripe/src/doc.rs ---
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::handlers::{__path_list_payments_handler, __path_payment_details_handler};
use crate::models::{PaymentList, StripeCharge, StripePaymentIntent};

#[derive(OpenApi)]
#[openapi(
    paths(list_payments_handler, payment_details_handler),
    components(schemas(StripePaymentIntent, StripeCharge, PaymentList)),
    tags(
        (name = "Stripe", description = "Stripe payment lookups")
    ),
    servers(
        (url = "/api", description = "Atom API server")
    )
)]
pub struct StripeApiDoc;
