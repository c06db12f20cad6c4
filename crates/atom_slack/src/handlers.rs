// File: crates/atom_slack/src/handlers.rs
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use std::sync::Arc;

#[cfg(feature = "openapi")]
use utoipa::IntoParams;

use atom_common::services::{ServiceFactory, Session};
use atom_common::{config_error, require_session, AtomError, SkillResponse};

use crate::models::SendMessageRequest;
use crate::skills::SlackSkills;

#[derive(Clone)]
pub struct SlackState {
    pub services: Arc<dyn ServiceFactory>,
    pub skills: SlackSkills,
}

impl SlackState {
    async fn session(&self, headers: &HeaderMap) -> Result<Session, AtomError> {
        let verifier = self
            .services
            .session_verifier()
            .ok_or_else(|| config_error("Session verification is not configured"))?;
        require_session(verifier.as_ref(), headers).await
    }
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(IntoParams))]
pub struct ChannelsQuery {
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(IntoParams))]
pub struct SearchQuery {
    pub query: String,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(IntoParams))]
pub struct BriefingQuery {
    /// `YYYY-MM-DD`, today (UTC) when omitted.
    pub date: Option<NaiveDate>,
    pub count: Option<u32>,
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/atom/slack/channels",
    params(ChannelsQuery),
    responses((status = 200, description = "Channels visible to the user's Slack token")),
    tag = "Slack"
))]
pub async fn list_channels_handler(
    State(state): State<Arc<SlackState>>,
    headers: HeaderMap,
    Query(query): Query<ChannelsQuery>,
) -> Response {
    let session = match state.session(&headers).await {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };
    state
        .skills
        .list_channels(&session.user_id, query.limit, query.cursor.as_deref())
        .await
        .into_response()
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/atom/slack/messages",
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Message posted"),
        (status = 400, description = "Missing channel or text"),
        (status = 404, description = "Channel could not be resolved")
    ),
    tag = "Slack"
))]
pub async fn send_message_handler(
    State(state): State<Arc<SlackState>>,
    headers: HeaderMap,
    Json(body): Json<SendMessageRequest>,
) -> Response {
    let session = match state.session(&headers).await {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };
    state
        .skills
        .send_message(&session.user_id, &body.channel, &body.text)
        .await
        .into_response()
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/atom/slack/search",
    params(SearchQuery),
    responses((status = 200, description = "Matching messages, empty on failure")),
    tag = "Slack"
))]
pub async fn search_handler(
    State(state): State<Arc<SlackState>>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> Response {
    let session = match state.session(&headers).await {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };
    let messages = state
        .skills
        .search_messages(&session.user_id, &query.query, query.limit)
        .await;
    SkillResponse::success(messages).into_response()
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/atom/slack/messages/{channel}/{ts}",
    params(
        ("channel" = String, Path, description = "Channel id"),
        ("ts" = String, Path, description = "Message timestamp")
    ),
    responses((status = 200, description = "The message, or no data when it cannot be read")),
    tag = "Slack"
))]
pub async fn read_message_handler(
    State(state): State<Arc<SlackState>>,
    headers: HeaderMap,
    Path((channel, ts)): Path<(String, String)>,
) -> Response {
    let session = match state.session(&headers).await {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };
    match state.skills.read_message(&session.user_id, &channel, &ts).await {
        Some(message) => SkillResponse::success(message).into_response(),
        None => SkillResponse::<()>::empty().into_response(),
    }
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/atom/slack/briefing",
    params(BriefingQuery),
    responses((status = 200, description = "Recent DMs and mentions for the day")),
    tag = "Slack"
))]
pub async fn briefing_handler(
    State(state): State<Arc<SlackState>>,
    headers: HeaderMap,
    Query(query): Query<BriefingQuery>,
) -> Response {
    let session = match state.session(&headers).await {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    state
        .skills
        .recent_dms_and_mentions_for_briefing(&session.user_id, date, query.count)
        .await
        .into_response()
}
