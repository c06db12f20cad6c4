//! Hasura GraphQL client
//!
//! Every query and mutation goes through [`HasuraClient::execute`], which
//! posts `{query, variables, operationName}` to the configured endpoint and
//! retries transient failures with exponential backoff:
//!
//! - 5xx, 429, timeouts, connection errors and GraphQL `errors` are retried;
//! - any other 4xx fails immediately with `HTTP_{status}`;
//! - attempt `n` is followed by a pause of `2^(n-1)` seconds.
//!
//! Requests run as the `user` role with `X-Hasura-User-Id` when a user id is
//! given, otherwise as `admin`.

use atom_common::HTTP_CLIENT;
use atom_config::{configured_str, HasuraConfig};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::error::GraphqlError;

const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<Value>,
    errors: Option<Value>,
}

/// Client for the Hasura GraphQL endpoint
#[derive(Debug, Clone)]
pub struct HasuraClient {
    client: Client,
    url: String,
    admin_secret: String,
    max_retries: u32,
    timeout: Duration,
    backoff_base: Duration,
}

impl HasuraClient {
    /// Build a client from the `hasura` config section.
    ///
    /// Fails with `CONFIG_ERROR` when the URL or the admin secret is missing
    /// or still an unresolved `secret_from_env` marker.
    pub fn from_config(config: &HasuraConfig) -> Result<Self, GraphqlError> {
        let url = configured_str(&config.graphql_url)
            .ok_or_else(|| GraphqlError::Config("graphql_url is missing".to_string()))?;
        let admin_secret = configured_str(&config.admin_secret)
            .ok_or_else(|| GraphqlError::Config("admin_secret is missing".to_string()))?;

        Ok(Self {
            client: HTTP_CLIENT.clone(),
            url: url.to_string(),
            admin_secret: admin_secret.to_string(),
            max_retries: config.max_retries.unwrap_or(DEFAULT_MAX_RETRIES).max(1),
            timeout: Duration::from_secs(config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            backoff_base: Duration::from_secs(1),
        })
    }

    /// Override the first backoff pause. Tests use `Duration::ZERO`.
    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Run a query and deserialize its `data`.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
        operation_name: &str,
        user_id: Option<&str>,
    ) -> Result<T, GraphqlError> {
        let data = self
            .execute_raw(query, variables, operation_name, user_id)
            .await?;
        serde_json::from_value(data).map_err(|e| GraphqlError::Decode {
            operation: operation_name.to_string(),
            message: e.to_string(),
        })
    }

    /// Mutations use the same endpoint and request shape as queries.
    pub async fn execute_mutation<T: DeserializeOwned>(
        &self,
        mutation: &str,
        variables: Value,
        operation_name: &str,
        user_id: Option<&str>,
    ) -> Result<T, GraphqlError> {
        self.execute(mutation, variables, operation_name, user_id)
            .await
    }

    /// Run a query and return `data` untouched.
    pub async fn execute_raw(
        &self,
        query: &str,
        variables: Value,
        operation_name: &str,
        user_id: Option<&str>,
    ) -> Result<Value, GraphqlError> {
        let body = json!({
            "query": query,
            "variables": variables,
            "operationName": operation_name,
        });

        let mut last_error: Option<GraphqlError> = None;
        let mut attempt = 0;

        while attempt < self.max_retries {
            debug!(operation = operation_name, attempt = attempt + 1, "GraphQL attempt");
            match self.attempt(&body, operation_name, user_id).await {
                Ok(data) => return Ok(data),
                Err(err @ (GraphqlError::Http { .. } | GraphqlError::Decode { .. })) => {
                    last_error = Some(err);
                    attempt += 1;
                    break;
                }
                Err(err) => {
                    warn!(operation = operation_name, attempt = attempt + 1, error = %err, "GraphQL attempt failed");
                    last_error = Some(err);
                }
            }

            attempt += 1;
            if attempt < self.max_retries {
                let factor = 2u32.saturating_pow(attempt - 1);
                tokio::time::sleep(self.backoff_base * factor).await;
            }
        }

        let err = match last_error {
            // 5xx and 429 are reported as exhausted retries; typed errors pass through.
            Some(GraphqlError::AllRetriesFailed { message, .. }) => GraphqlError::AllRetriesFailed {
                operation: operation_name.to_string(),
                attempts: attempt,
                message,
            },
            Some(err) => err,
            None => GraphqlError::AllRetriesFailed {
                operation: operation_name.to_string(),
                attempts: attempt,
                message: "Unknown error".to_string(),
            },
        };
        error!(operation = operation_name, attempts = attempt, code = %err.code(), "GraphQL operation failed");
        Err(err)
    }

    async fn attempt(
        &self,
        body: &Value,
        operation_name: &str,
        user_id: Option<&str>,
    ) -> Result<Value, GraphqlError> {
        let mut request = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .header("X-Hasura-Admin-Secret", &self.admin_secret)
            .json(body);
        request = match user_id {
            Some(user_id) => request
                .header("X-Hasura-Role", "user")
                .header("X-Hasura-User-Id", user_id),
            None => request.header("X-Hasura-Role", "admin"),
        };

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                GraphqlError::Timeout {
                    operation: operation_name.to_string(),
                    timeout_secs: self.timeout.as_secs(),
                }
            } else {
                GraphqlError::Network {
                    operation: operation_name.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if status.is_server_error() || status.as_u16() == 429 {
            let body = response.text().await.unwrap_or_default();
            return Err(GraphqlError::AllRetriesFailed {
                operation: operation_name.to_string(),
                attempts: 0,
                message: format!("HTTP {}: {}", status.as_u16(), body),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GraphqlError::Http {
                operation: operation_name.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GraphqlResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                GraphqlError::Timeout {
                    operation: operation_name.to_string(),
                    timeout_secs: self.timeout.as_secs(),
                }
            } else {
                GraphqlError::Decode {
                    operation: operation_name.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        if let Some(errors) = parsed.errors.filter(|e| !e.is_null()) {
            return Err(GraphqlError::Execution {
                operation: operation_name.to_string(),
                errors,
            });
        }
        parsed.data.ok_or_else(|| GraphqlError::Decode {
            operation: operation_name.to_string(),
            message: "response carried no data".to_string(),
        })
    }
}
