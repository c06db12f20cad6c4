// --- File: crates/atom_slack/src/routes.rs ---

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use atom_common::method_not_allowed;
use atom_common::services::ServiceFactory;
use atom_config::AppConfig;

use crate::handlers::{
    briefing_handler, list_channels_handler, read_message_handler, search_handler,
    send_message_handler, SlackState,
};
use crate::skills::SlackSkills;

/// Slack skill routes.
pub fn routes(config: Arc<AppConfig>, services: Arc<dyn ServiceFactory>) -> Router {
    let api_base = config.slack.as_ref().and_then(|s| s.api_base.clone());
    let skills = SlackSkills::new(services.token_store(), api_base);
    router_with_state(Arc::new(SlackState { services, skills }))
}

pub fn router_with_state(state: Arc<SlackState>) -> Router {
    Router::new()
        .route(
            "/atom/slack/channels",
            get(list_channels_handler).fallback(|| async { method_not_allowed("GET") }),
        )
        .route(
            "/atom/slack/messages",
            post(send_message_handler).fallback(|| async { method_not_allowed("POST") }),
        )
        .route(
            "/atom/slack/search",
            get(search_handler).fallback(|| async { method_not_allowed("GET") }),
        )
        .route(
            "/atom/slack/messages/{channel}/{ts}",
            get(read_message_handler).fallback(|| async { method_not_allowed("GET") }),
        )
        .route(
            "/atom/slack/briefing",
            get(briefing_handler).fallback(|| async { method_not_allowed("GET") }),
        )
        .with_state(state)
}
