// --- File: crates/atom_scheduling/src/routes.rs ---

use axum::{routing::post, Router};
use std::sync::Arc;
use tracing::warn;

use atom_common::method_not_allowed;
use atom_common::services::ServiceFactory;
use atom_config::AppConfig;
use atom_graphql::HasuraClient;

use crate::datetime::FALLBACK_DURATION_MINUTES;
use crate::extractor::{MeetingExtractor, OpenAiExtractor};
use crate::handlers::{schedule_meeting_handler, SchedulingState};
use crate::hasura::HasuraSchedulingStore;
use crate::indexer::{EventIndexer, NoopIndexer, OpenSearchIndexer};
use crate::pipeline::DEFAULT_CALENDAR_RESOURCE;
use crate::responder::TemplateResponder;
use crate::store::SchedulingStore;

/// Creates a router containing the scheduling route.
pub fn routes(config: Arc<AppConfig>, services: Arc<dyn ServiceFactory>) -> Router {
    let store: Option<Arc<dyn SchedulingStore>> = match config.hasura.as_ref() {
        Some(hasura) => match HasuraClient::from_config(hasura) {
            Ok(client) => Some(Arc::new(HasuraSchedulingStore::new(client))),
            Err(e) => {
                warn!(error = %e, "Scheduling store disabled");
                None
            }
        },
        None => None,
    };
    let extractor: Option<Arc<dyn MeetingExtractor>> = config
        .openai
        .as_ref()
        .and_then(OpenAiExtractor::from_config)
        .map(|e| Arc::new(e) as Arc<dyn MeetingExtractor>);
    let indexer: Arc<dyn EventIndexer> = match config
        .search
        .as_ref()
        .and_then(OpenSearchIndexer::from_config)
    {
        Some(indexer) => Arc::new(indexer),
        None => Arc::new(NoopIndexer),
    };

    let scheduling = config.scheduling.clone().unwrap_or_default();
    let state = SchedulingState {
        services,
        store,
        extractor,
        responder: Arc::new(TemplateResponder),
        indexer,
        calendar_resource: scheduling
            .calendar_resource
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CALENDAR_RESOURCE.to_string()),
        default_duration: scheduling
            .default_duration_minutes
            .filter(|d| *d > 0)
            .unwrap_or(FALLBACK_DURATION_MINUTES),
    };
    router_with_state(Arc::new(state))
}

pub fn router_with_state(state: Arc<SchedulingState>) -> Router {
    Router::new()
        .route(
            "/atom/scheduling/meeting",
            post(schedule_meeting_handler).fallback(|| async { method_not_allowed("POST") }),
        )
        .with_state(state)
}
