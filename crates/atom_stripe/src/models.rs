// --- File: crates/atom_stripe/src/models.rs ---
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::{IntoParams, ToSchema};

/// A Stripe field that is either an id or the expanded object.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum Expandable<T> {
    Id(String),
    Object(Box<T>),
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiCharge {
    pub id: String,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created: i64,
    pub receipt_url: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiCustomer {
    pub id: String,
}

/// PaymentIntent as Stripe returns it.
#[derive(Deserialize, Debug, Clone)]
pub struct ApiPaymentIntent {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub created: i64,
    pub customer: Option<Expandable<ApiCustomer>>,
    pub description: Option<String>,
    pub latest_charge: Option<Expandable<ApiCharge>>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiList<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct StripeCharge {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub created: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct StripePaymentIntent {
    pub id: String,
    #[cfg_attr(feature = "openapi", schema(example = 2000))]
    pub amount: i64,
    #[cfg_attr(feature = "openapi", schema(example = "usd"))]
    pub currency: String,
    #[cfg_attr(feature = "openapi", schema(example = "succeeded"))]
    pub status: String,
    pub created: i64,
    pub customer: Option<String>,
    pub description: Option<String>,
    pub latest_charge: Option<StripeCharge>,
}

impl From<ApiPaymentIntent> for StripePaymentIntent {
    fn from(pi: ApiPaymentIntent) -> Self {
        let latest_charge = pi.latest_charge.map(|charge| match charge {
            // Unexpanded: only the id is known.
            Expandable::Id(id) => StripeCharge {
                id,
                amount: 0,
                currency: String::new(),
                status: "pending".to_string(),
                created: 0,
                receipt_url: None,
                description: None,
            },
            Expandable::Object(charge) => StripeCharge {
                id: charge.id,
                amount: charge.amount,
                currency: charge.currency,
                status: charge.status,
                created: charge.created,
                receipt_url: charge.receipt_url,
                description: charge.description,
            },
        });
        Self {
            id: pi.id,
            amount: pi.amount,
            currency: pi.currency,
            status: pi.status,
            created: pi.created,
            customer: pi.customer.map(|c| match c {
                Expandable::Id(id) => id,
                Expandable::Object(customer) => customer.id,
            }),
            description: pi.description,
            latest_charge,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct PaymentList {
    pub payments: Vec<StripePaymentIntent>,
    pub has_more: bool,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[cfg_attr(feature = "openapi", derive(IntoParams))]
pub struct ListPaymentsOptions {
    /// Defaults to 10.
    pub limit: Option<u32>,
    pub starting_after: Option<String>,
    pub customer: Option<String>,
}
