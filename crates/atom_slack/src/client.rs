// --- File: crates/atom_slack/src/client.rs ---
//! Minimal Slack Web API client over the shared HTTP client.

use reqwest::Response;
use serde_json::Value;
use tracing::debug;

use atom_common::http::client::HTTP_CLIENT;

use crate::error::SlackError;

pub const DEFAULT_API_BASE: &str = "https://slack.com/api";

/// One user's Slack token bound to an API base.
#[derive(Debug, Clone)]
pub struct SlackClient {
    api_base: String,
    token: String,
}

impl SlackClient {
    pub fn new(api_base: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.api_base, method)
    }

    /// Read method with query parameters.
    pub async fn get(&self, method: &str, params: &[(&str, String)]) -> Result<Value, SlackError> {
        debug!(method, "Slack API call");
        let response = HTTP_CLIENT
            .get(self.url(method))
            .bearer_auth(&self.token)
            .query(params)
            .send()
            .await?;
        Self::finish(response).await
    }

    /// Write method with a JSON body.
    pub async fn post(&self, method: &str, body: &Value) -> Result<Value, SlackError> {
        debug!(method, "Slack API call");
        let response = HTTP_CLIENT
            .post(self.url(method))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        Self::finish(response).await
    }

    async fn finish(response: Response) -> Result<Value, SlackError> {
        let status = response.status();
        let body: Value = response.json().await.unwrap_or_default();
        if body.get("ok").and_then(Value::as_bool) == Some(true) {
            return Ok(body);
        }
        let error = body
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("unknown_slack_api_error (HTTP {})", status.as_u16()));
        Err(SlackError::Api {
            error,
            details: body,
        })
    }
}
