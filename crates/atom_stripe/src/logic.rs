// --- File: crates/atom_stripe/src/logic.rs ---
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

use atom_common::services::{service_names, CredentialStore};
use atom_common::{SkillError, SkillResponse, HTTP_CLIENT};

use crate::error::StripeError;
use crate::models::{
    ApiList, ApiPaymentIntent, ListPaymentsOptions, PaymentList, StripePaymentIntent,
};

pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";
/// Pinned API version sent as `Stripe-Version`.
pub const STRIPE_API_VERSION: &str = "2024-04-10";

#[derive(Deserialize, Debug)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Deserialize, Debug)]
struct StripeErrorDetail {
    code: Option<String>,
    message: Option<String>,
}

/// GET a Stripe resource with the user's secret key.
async fn stripe_get<T: DeserializeOwned>(
    api_base: &str,
    secret_key: &str,
    path: &str,
    query: &[(&str, String)],
) -> Result<T, StripeError> {
    let url = format!("{}{}", api_base.trim_end_matches('/'), path);
    let response = HTTP_CLIENT
        .get(&url)
        .basic_auth(secret_key, None::<&str>)
        .header("Stripe-Version", STRIPE_API_VERSION)
        .query(query)
        .send()
        .await?;

    let status = response.status();
    let body_text = response.text().await?;
    if !status.is_success() {
        let raw: Option<serde_json::Value> = serde_json::from_str(&body_text).ok();
        let detail = serde_json::from_str::<StripeErrorBody>(&body_text)
            .ok()
            .map(|b| b.error);
        error!("[Stripe] {} {} failed: {}", path, status, body_text);
        return Err(StripeError::ApiError {
            status_code: status.as_u16(),
            code: detail.as_ref().and_then(|d| d.code.clone()),
            message: detail
                .and_then(|d| d.message)
                .unwrap_or_else(|| format!("Stripe API returned {}", status)),
            raw: raw.and_then(|r| r.get("error").cloned()),
        });
    }
    Ok(serde_json::from_str(&body_text)?)
}

/// Payment skills over the user's stored Stripe secret key.
#[derive(Clone)]
pub struct StripeSkills {
    credentials: Option<Arc<dyn CredentialStore>>,
    api_base: String,
}

impl StripeSkills {
    pub fn new(credentials: Option<Arc<dyn CredentialStore>>, api_base: Option<String>) -> Self {
        Self {
            credentials,
            api_base: api_base.unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        }
    }

    async fn secret_key(&self, user_id: &str) -> Result<String, StripeError> {
        let store = self.credentials.as_ref().ok_or(StripeError::ConfigError)?;
        store
            .decrypted_secret(user_id, service_names::STRIPE_API_KEY)
            .await?
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                error!("[Stripe] Secret key not configured for user {}", user_id);
                StripeError::ConfigError
            })
    }

    async fn list(
        &self,
        user_id: &str,
        options: &ListPaymentsOptions,
    ) -> Result<PaymentList, StripeError> {
        let key = self.secret_key(user_id).await?;
        let mut query = vec![
            ("limit", options.limit.unwrap_or(10).to_string()),
            ("expand[]", "data.latest_charge".to_string()),
        ];
        if let Some(after) = options.starting_after.as_deref().filter(|s| !s.is_empty()) {
            query.push(("starting_after", after.to_string()));
        }
        if let Some(customer) = options.customer.as_deref().filter(|s| !s.is_empty()) {
            query.push(("customer", customer.to_string()));
        }
        let list: ApiList<ApiPaymentIntent> =
            stripe_get(&self.api_base, &key, "/v1/payment_intents", &query).await?;
        Ok(PaymentList {
            payments: list.data.into_iter().map(StripePaymentIntent::from).collect(),
            has_more: list.has_more,
        })
    }

    pub async fn list_payments(
        &self,
        user_id: &str,
        options: &ListPaymentsOptions,
    ) -> SkillResponse<PaymentList> {
        let result = self.list(user_id, options).await;
        if let Err(e) = &result {
            error!("[Stripe] Error listing payments for {}: {}", user_id, e);
        }
        result.map_err(SkillError::from).into()
    }

    async fn details(
        &self,
        user_id: &str,
        payment_intent_id: &str,
    ) -> Result<StripePaymentIntent, StripeError> {
        let key = self.secret_key(user_id).await?;
        if payment_intent_id.trim().is_empty() {
            return Err(StripeError::ValidationError(
                "PaymentIntent ID is required.".to_string(),
            ));
        }
        let path = format!("/v1/payment_intents/{}", payment_intent_id);
        let query = [
            ("expand[]", "latest_charge".to_string()),
            ("expand[]", "customer".to_string()),
        ];
        match stripe_get::<ApiPaymentIntent>(&self.api_base, &key, &path, &query).await {
            Ok(pi) => {
                info!("[Stripe] Retrieved PaymentIntent {}", pi.id);
                Ok(pi.into())
            }
            Err(StripeError::ApiError { code, raw, .. })
                if code.as_deref() == Some("resource_missing") =>
            {
                Err(StripeError::PaymentIntentNotFound {
                    id: payment_intent_id.to_string(),
                    raw,
                })
            }
            Err(e) => Err(e),
        }
    }

    pub async fn get_payment_details(
        &self,
        user_id: &str,
        payment_intent_id: &str,
    ) -> SkillResponse<StripePaymentIntent> {
        self.details(user_id, payment_intent_id)
            .await
            .map_err(SkillError::from)
            .into()
    }
}
