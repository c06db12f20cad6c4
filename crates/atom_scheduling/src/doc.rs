#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::handlers::{__path_schedule_meeting_handler, ScheduleMeetingRequest};
use crate::types::{
    ActionData, BufferTime, ChatMessage, ChatRole, DateParts, DateTimeJson, DateTimeRequired,
    MeetingAttendee, MeetingQuery, RecurJson, RecurrenceRule, RelativeTime, RequiredField,
    RequiredFields, ScheduleMeetingBody, SkillMessageHistory, TimePreference, TimeRange,
    UserInputJson, UserInputParams,
};

#[derive(OpenApi)]
#[openapi(
    paths(schedule_meeting_handler),
    components(schemas(
        ScheduleMeetingRequest,
        SkillMessageHistory,
        ChatMessage,
        ChatRole,
        MeetingQuery,
        RequiredFields,
        RequiredField,
        DateTimeRequired,
        ActionData,
        ScheduleMeetingBody,
        MeetingAttendee,
        BufferTime,
        RecurrenceRule,
        TimePreference,
        TimeRange,
        UserInputJson,
        UserInputParams,
        DateTimeJson,
        DateParts,
        RecurJson,
        RelativeTime
    )),
    tags(
        (name = "Scheduling", description = "Conversational meeting scheduling")
    ),
    servers(
        (url = "/api", description = "Atom API server")
    )
)]
pub struct SchedulingApiDoc;
