// --- File: crates/atom_quickbooks/src/api.rs ---
//! QuickBooks Online accounting API: invoice query and lookup.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[cfg(feature = "openapi")]
use utoipa::{IntoParams, ToSchema};

use atom_common::http::client::HTTP_CLIENT;

use crate::error::QboError;

/// Accounting API minor version sent with every call.
const MINOR_VERSION: &str = "65";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct QboRef {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "PascalCase")]
pub struct EmailAddress {
    pub address: Option<String>,
}

/// The invoice fields the agent works with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "PascalCase")]
pub struct Invoice {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txn_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_ref: Option<QboRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bill_email: Option<EmailAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_ref: Option<QboRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub line: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub customer_memo: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_status: Option<String>,
}

/// Filters for [`build_invoice_query`].
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(IntoParams))]
#[serde(rename_all = "camelCase")]
pub struct ListInvoicesOptions {
    pub limit: Option<u32>,
    /// 1-based start position.
    pub offset: Option<u32>,
    pub customer_id: Option<String>,
    /// Paid, Open, Void, Overdue, Pending or Draft.
    pub status: Option<String>,
}

fn status_condition(status: &str, today: NaiveDate) -> Option<String> {
    let condition = match status {
        "Paid" => "Balance = 0 AND TotalAmt > 0".to_string(),
        "Open" => "Balance > 0".to_string(),
        "Void" => "EmailStatus = 'Void'".to_string(),
        "Overdue" => format!("DueDate < '{}' AND Balance > 0", today.format("%Y-%m-%d")),
        "Pending" => "EmailStatus = 'Pending'".to_string(),
        "Draft" => "EmailStatus = 'Draft'".to_string(),
        other => {
            warn!(status = other, "Unsupported invoice status filter ignored");
            return None;
        }
    };
    Some(condition)
}

/// QBO SQL for an invoice listing.
pub fn build_invoice_query(options: &ListInvoicesOptions, today: NaiveDate) -> String {
    let limit = options.limit.filter(|l| *l > 0).unwrap_or(10);
    let offset = options.offset.filter(|o| *o > 0).unwrap_or(1);

    let mut conditions = Vec::new();
    if let Some(customer) = options.customer_id.as_deref().filter(|c| !c.is_empty()) {
        conditions.push(format!("CustomerRef = '{}'", customer.replace('\'', "\\'")));
    }
    if let Some(condition) = options
        .status
        .as_deref()
        .and_then(|s| status_condition(s, today))
    {
        conditions.push(condition);
    }

    let mut query = "SELECT * FROM Invoice".to_string();
    if !conditions.is_empty() {
        query.push_str(" WHERE ");
        query.push_str(&conditions.join(" AND "));
    }
    query.push_str(&format!(
        " ORDERBY MetaData.LastUpdatedTime DESC STARTPOSITION {} MAXRESULTS {}",
        offset, limit
    ));
    query
}

#[derive(Debug, Deserialize)]
struct FaultEnvelope {
    #[serde(rename = "Fault", alias = "fault")]
    fault: Option<serde_json::Value>,
}

/// Turn a `Fault` body into [`QboError::Api`].
fn fault_error(body: &serde_json::Value, fallback: &str) -> QboError {
    let fault = serde_json::from_value::<FaultEnvelope>(body.clone())
        .ok()
        .and_then(|f| f.fault);
    let first = fault
        .as_ref()
        .and_then(|f| f.get("Error"))
        .and_then(|e| e.get(0));
    let code = first
        .and_then(|e| e.get("code"))
        .and_then(|c| c.as_str())
        .unwrap_or("UNKNOWN")
        .to_string();
    let message = first
        .and_then(|e| e.get("Message"))
        .and_then(|m| m.as_str())
        .unwrap_or(fallback)
        .to_string();
    QboError::Api {
        code,
        message,
        details: fault.or_else(|| Some(body.clone())),
    }
}

/// True for the "object not found" fault an unknown invoice id produces.
pub fn is_not_found(err: &QboError) -> bool {
    match err {
        QboError::Api { code, message, .. } => {
            code == "6240" || message.to_lowercase().contains("object not found")
        }
        _ => false,
    }
}

/// REST client for one API base.
#[derive(Debug, Clone)]
pub struct QboApi {
    api_base: String,
}

impl QboApi {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    async fn get_json(
        &self,
        access_token: &str,
        url: &str,
        params: &[(&str, &str)],
        fallback: &str,
    ) -> Result<serde_json::Value, QboError> {
        let response = HTTP_CLIENT
            .get(url)
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(params)
            .send()
            .await?;
        let status = response.status();
        let body: serde_json::Value = response.json().await.unwrap_or_default();
        if !status.is_success() || body.get("Fault").is_some() {
            return Err(fault_error(&body, fallback));
        }
        Ok(body)
    }

    /// Run a query and return the `QueryResponse` object.
    pub async fn query(
        &self,
        access_token: &str,
        realm_id: &str,
        query: &str,
    ) -> Result<serde_json::Value, QboError> {
        debug!(realm_id, query, "QBO query");
        let url = format!("{}/v3/company/{}/query", self.api_base, realm_id);
        let body = self
            .get_json(
                access_token,
                &url,
                &[("query", query), ("minorversion", MINOR_VERSION)],
                "Failed to list QBO invoices.",
            )
            .await?;
        Ok(body.get("QueryResponse").cloned().unwrap_or_default())
    }

    pub async fn invoice(
        &self,
        access_token: &str,
        realm_id: &str,
        invoice_id: &str,
    ) -> Result<Option<Invoice>, QboError> {
        let url = format!(
            "{}/v3/company/{}/invoice/{}",
            self.api_base, realm_id, invoice_id
        );
        let body = self
            .get_json(
                access_token,
                &url,
                &[("minorversion", MINOR_VERSION)],
                "Failed to get QBO invoice.",
            )
            .await?;
        match body.get("Invoice") {
            Some(invoice) => serde_json::from_value(invoice.clone())
                .map(Some)
                .map_err(|e| QboError::Api {
                    code: "PARSE".to_string(),
                    message: e.to_string(),
                    details: None,
                }),
            None => Ok(None),
        }
    }
}
