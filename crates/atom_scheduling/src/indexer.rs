//! Search-index writes for scheduled events.
//!
//! Every scheduled meeting lands in the all-events index. Meetings the user
//! cares about (priority above 1 or with preferred time ranges) also go into
//! the training index used by the planner.

use async_trait::async_trait;
use atom_common::{external_service_error, AtomError, HTTP_CLIENT};
use atom_config::{configured_str, configured_value, SearchConfig};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error};

pub const DEFAULT_EVENT_INDEX: &str = "event-index";
pub const DEFAULT_TRAIN_EVENT_INDEX: &str = "training-event-index";

/// The document written per event.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IndexedEvent {
    /// `{providerEventId}#{calendarId}`
    pub event_id: String,
    pub user_id: String,
    pub title: String,
    /// RFC 3339
    pub start_date: String,
    pub end_date: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventIndexer: Send + Sync {
    async fn index_train_event(&self, event: &IndexedEvent) -> Result<(), AtomError>;

    async fn index_all_event(&self, event: &IndexedEvent) -> Result<(), AtomError>;
}

/// Writes through the OpenSearch document API.
#[derive(Debug, Clone)]
pub struct OpenSearchIndexer {
    client: Client,
    url: String,
    username: Option<String>,
    password: Option<String>,
    event_index: String,
    train_event_index: String,
}

impl OpenSearchIndexer {
    /// `None` when no search URL is configured.
    pub fn from_config(config: &SearchConfig) -> Option<Self> {
        let url = configured_str(&config.url)?;
        Some(Self {
            client: HTTP_CLIENT.clone(),
            url: url.trim_end_matches('/').to_string(),
            username: configured_value(&config.username).map(str::to_string),
            password: configured_value(&config.password).map(str::to_string),
            event_index: configured_value(&config.event_index)
                .unwrap_or(DEFAULT_EVENT_INDEX)
                .to_string(),
            train_event_index: configured_value(&config.train_event_index)
                .unwrap_or(DEFAULT_TRAIN_EVENT_INDEX)
                .to_string(),
        })
    }

    async fn put(&self, index: &str, event: &IndexedEvent) -> Result<(), AtomError> {
        let url = format!(
            "{}/{}/_doc/{}",
            self.url,
            index,
            url_encode_id(&event.event_id)
        );
        let mut request = self.client.put(&url).json(event);
        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_deref());
        }

        let response = request.send().await.map_err(|e| {
            error!(index, error = %e, "Search index request failed");
            external_service_error("OpenSearch", e)
        })?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(index, status = status.as_u16(), body = %body, "Search index rejected document");
            return Err(external_service_error(
                "OpenSearch",
                format!("HTTP {}: {}", status.as_u16(), body),
            ));
        }
        debug!(index, event_id = %event.event_id, "Event indexed");
        Ok(())
    }
}

/// `#` would start a URL fragment.
fn url_encode_id(id: &str) -> String {
    url::form_urlencoded::byte_serialize(id.as_bytes()).collect()
}

#[async_trait]
impl EventIndexer for OpenSearchIndexer {
    async fn index_train_event(&self, event: &IndexedEvent) -> Result<(), AtomError> {
        self.put(&self.train_event_index, event).await
    }

    async fn index_all_event(&self, event: &IndexedEvent) -> Result<(), AtomError> {
        self.put(&self.event_index, event).await
    }
}

/// Used when no search backend is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopIndexer;

#[async_trait]
impl EventIndexer for NoopIndexer {
    async fn index_train_event(&self, _event: &IndexedEvent) -> Result<(), AtomError> {
        Ok(())
    }

    async fn index_all_event(&self, _event: &IndexedEvent) -> Result<(), AtomError> {
        Ok(())
    }
}
