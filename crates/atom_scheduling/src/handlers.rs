// --- File: crates/atom_scheduling/src/handlers.rs ---
use axum::{extract::State, http::HeaderMap, Json};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use atom_common::services::{ServiceFactory, Session};
use atom_common::{config_error, require_session, AtomError};

use crate::extractor::MeetingExtractor;
use crate::indexer::EventIndexer;
use crate::pipeline::{schedule_meeting_control_center, SchedulingDeps};
use crate::responder::AssistantResponder;
use crate::store::SchedulingStore;
use crate::types::{MeetingQuery, SkillMessageHistory};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

#[derive(Clone)]
pub struct SchedulingState {
    pub services: Arc<dyn ServiceFactory>,
    pub store: Option<Arc<dyn SchedulingStore>>,
    pub extractor: Option<Arc<dyn MeetingExtractor>>,
    pub responder: Arc<dyn AssistantResponder>,
    pub indexer: Arc<dyn EventIndexer>,
    pub calendar_resource: String,
    pub default_duration: i64,
}

impl SchedulingState {
    async fn session(&self, headers: &HeaderMap) -> Result<Session, AtomError> {
        let verifier = self
            .services
            .session_verifier()
            .ok_or_else(|| config_error("Session verification is not configured"))?;
        require_session(verifier.as_ref(), headers).await
    }

    /// Every collaborator, or `CONFIG_ERROR` naming the missing one.
    pub fn deps(&self) -> Result<SchedulingDeps, AtomError> {
        let store = self
            .store
            .clone()
            .ok_or_else(|| config_error("Scheduling store (Hasura) is not configured"))?;
        let extractor = self
            .extractor
            .clone()
            .ok_or_else(|| config_error("Meeting extraction (OpenAI) is not configured"))?;
        let calendar = self
            .services
            .calendar_provider()
            .ok_or_else(|| config_error("Google Calendar is not configured"))?;
        Ok(SchedulingDeps {
            store,
            calendar,
            extractor,
            responder: self.responder.clone(),
            indexer: self.indexer.clone(),
            calendar_resource: self.calendar_resource.clone(),
            default_duration: self.default_duration,
        })
    }
}

#[derive(Deserialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ScheduleMeetingRequest {
    /// IANA zone of the user
    pub timezone: String,
    /// RFC 3339
    pub user_current_time: String,
    /// Defaults to `pending`
    #[serde(default)]
    pub query: Option<MeetingQuery>,
    #[serde(default)]
    pub message_history: SkillMessageHistory,
}

/// One turn of the scheduling conversation.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/atom/scheduling/meeting",
    request_body = ScheduleMeetingRequest,
    responses(
        (status = 200, description = "Updated message history", body = SkillMessageHistory),
        (status = 400, description = "VALIDATION_ERROR or SCHEDULING_CONTEXT_MISSING"),
        (status = 401, description = "No valid session"),
        (status = 404, description = "PRIMARY_CALENDAR_NOT_FOUND")
    ),
    tag = "Scheduling"
))]
pub async fn schedule_meeting_handler(
    State(state): State<Arc<SchedulingState>>,
    headers: HeaderMap,
    Json(request): Json<ScheduleMeetingRequest>,
) -> Result<Json<SkillMessageHistory>, AtomError> {
    let session = state.session(&headers).await?;
    let deps = state.deps()?;
    let query = request.query.unwrap_or(MeetingQuery::Pending);
    info!(user_id = %session.user_id, ?query, "Scheduling turn");

    let history = schedule_meeting_control_center(
        &deps,
        &session.user_id,
        &request.timezone,
        request.message_history,
        &request.user_current_time,
        query,
    )
    .await?;
    Ok(Json(history))
}
