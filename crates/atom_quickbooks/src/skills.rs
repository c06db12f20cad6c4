// --- File: crates/atom_quickbooks/src/skills.rs ---
//! QuickBooks skills. Every call answers with a [`SkillResponse`].

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

#[cfg(feature = "openapi")]
use utoipa::{IntoParams, ToSchema};

use atom_common::oauth::OAuthProvider;
use atom_common::services::TokenStore;
use atom_common::{SkillError, SkillResponse};

use crate::api::{build_invoice_query, is_not_found, Invoice, ListInvoicesOptions, QboApi};
use crate::error::QboError;
use crate::tokens::{get_valid_tokens, save_tokens, QboTokens};

/// Shortest state accepted by [`QuickBooksSkills::auth_uri`].
pub const MIN_STATE_LEN: usize = 10;

/// Query Intuit appends to the redirect URI.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(IntoParams))]
pub struct QboCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    #[serde(rename = "realmId")]
    pub realm_id: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CallbackData {
    pub message: String,
    pub realm_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct InvoiceList {
    pub invoices: Vec<Invoice>,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub query_response: serde_json::Value,
}

/// The QuickBooks skill set for one deployment.
#[derive(Clone)]
pub struct QuickBooksSkills {
    store: Option<Arc<dyn TokenStore>>,
    provider: Option<Arc<dyn OAuthProvider>>,
    api: QboApi,
}

impl QuickBooksSkills {
    pub fn new(
        store: Option<Arc<dyn TokenStore>>,
        provider: Option<Arc<dyn OAuthProvider>>,
        api: QboApi,
    ) -> Self {
        Self {
            store,
            provider,
            api,
        }
    }

    fn provider(&self) -> Result<&dyn OAuthProvider, QboError> {
        self.provider.as_deref().ok_or_else(|| {
            QboError::Config(
                "QuickBooks Online OAuth client credentials or scopes not configured.".to_string(),
            )
        })
    }

    fn store(&self) -> Result<&dyn TokenStore, SkillError> {
        self.store.as_deref().ok_or_else(|| {
            SkillError::new("CONFIG_ERROR", "Token store (Hasura) is not configured.")
        })
    }

    async fn tokens(&self, user_id: &str) -> Result<QboTokens, SkillError> {
        let store = self.store()?;
        let provider = self.provider()?;
        Ok(get_valid_tokens(store, provider, user_id).await?)
    }

    /// Intuit consent URL carrying `state`.
    pub fn auth_uri(&self, state: &str) -> SkillResponse<String> {
        let result = (|| {
            let provider = self.provider()?;
            if state.trim().len() < MIN_STATE_LEN {
                return Err(QboError::Validation(
                    "A sufficiently long state parameter is required for CSRF protection."
                        .to_string(),
                ));
            }
            provider
                .auth_url(state)
                .map_err(|e| QboError::Config(e.to_string()))
        })();
        result.map_err(SkillError::from).into()
    }

    /// Exchange the callback code and store the tokens with the company's realm id.
    pub async fn handle_callback(
        &self,
        user_id: &str,
        query: &QboCallbackQuery,
        original_state: Option<&str>,
    ) -> SkillResponse<CallbackData> {
        self.callback(user_id, query, original_state).await.into()
    }

    async fn callback(
        &self,
        user_id: &str,
        query: &QboCallbackQuery,
        original_state: Option<&str>,
    ) -> Result<CallbackData, SkillError> {
        let store = self.store()?;
        let provider = self.provider()?;

        match original_state {
            Some(expected) if query.state.as_deref() != Some(expected) => {
                error!(user_id, "QBO OAuth state mismatch");
                return Err(QboError::InvalidState.into());
            }
            Some(_) => {}
            None => warn!(user_id, "QBO callback without original state; CSRF check skipped"),
        }

        if let Some(err) = &query.error {
            return Err(QboError::TokenExchange(err.clone()).into());
        }
        let code = query
            .code
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| QboError::TokenExchange("No authorization code received.".into()))?;

        let tokens = provider
            .exchange_code(code)
            .await
            .map_err(|e| QboError::TokenExchange(e.to_string()))?;

        let realm_id = query
            .realm_id
            .as_deref()
            .filter(|r| !r.is_empty())
            .ok_or(QboError::MissingRealmId)?;

        save_tokens(store, user_id, realm_id, tokens, Utc::now()).await?;
        info!(user_id, realm_id, "QuickBooks connected");
        Ok(CallbackData {
            message: "QuickBooks authorization successful. Tokens saved.".to_string(),
            realm_id: realm_id.to_string(),
        })
    }

    pub async fn list_invoices(
        &self,
        user_id: &str,
        options: &ListInvoicesOptions,
    ) -> SkillResponse<InvoiceList> {
        let result = async {
            let tokens = self.tokens(user_id).await?;
            let query = build_invoice_query(options, Utc::now().date_naive());
            let response = self
                .api
                .query(&tokens.access_token, &tokens.realm_id, &query)
                .await?;
            let invoices = response
                .get("Invoice")
                .cloned()
                .map(serde_json::from_value::<Vec<Invoice>>)
                .transpose()
                .map_err(|e| QboError::Api {
                    code: "PARSE".to_string(),
                    message: e.to_string(),
                    details: None,
                })?
                .unwrap_or_default();
            Ok::<_, SkillError>(InvoiceList {
                invoices,
                query_response: response,
            })
        }
        .await;
        result.into()
    }

    /// `ok` without data when the invoice does not exist.
    pub async fn get_invoice_details(
        &self,
        user_id: &str,
        invoice_id: &str,
    ) -> SkillResponse<Invoice> {
        if invoice_id.trim().is_empty() {
            return SkillResponse::from_error(
                QboError::Validation("Invoice ID is required.".to_string()).into(),
            );
        }
        let tokens = match self.tokens(user_id).await {
            Ok(tokens) => tokens,
            Err(e) => return SkillResponse::from_error(e),
        };
        match self
            .api
            .invoice(&tokens.access_token, &tokens.realm_id, invoice_id)
            .await
        {
            Ok(Some(invoice)) => SkillResponse::success(invoice),
            Ok(None) => SkillResponse::empty(),
            Err(e) if is_not_found(&e) => {
                info!(user_id, invoice_id, "QBO invoice not found");
                SkillResponse::empty()
            }
            Err(e) => SkillResponse::from_error(e.into()),
        }
    }
}
