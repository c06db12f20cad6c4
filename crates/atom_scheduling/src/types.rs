// --- File: crates/atom_scheduling/src/types.rs ---
//! Wire types of the scheduling conversation.
//!
//! All JSON is camelCase. The extracted documents (`UserInputJson`,
//! `DateTimeJson`) and the partial [`ScheduleMeetingBody`] travel back to the
//! client inside [`SkillMessageHistory`] and are returned on the next turn,
//! so every field is optional on the way in.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

pub const SKILL_NAME: &str = "scheduleMeeting";
pub const SCHEDULED_MESSAGE: &str = "successfully scheduled meeting";
pub const EVENT_NOT_FOUND_MESSAGE: &str = "Oops... I couldn't find the event. Sorry :(";

fn pick<T: Clone>(current: &Option<T>, previous: &Option<T>) -> Option<T> {
    current.clone().or_else(|| previous.clone())
}

fn pick_text(current: &Option<String>, previous: &Option<String>) -> Option<String> {
    present(current).or_else(|| present(previous))
}

/// A non-blank string value.
pub(crate) fn present(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}

// --- Extracted user input ---

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TaskItem {
    pub task: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct MeetingAttendee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub is_host: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ConferenceParam {
    pub app: Option<String>,
}

/// Minutes blocked before and after a meeting.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct BufferTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_event: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_event: Option<i64>,
}

impl BufferTime {
    pub fn before(&self) -> Option<i64> {
        self.before_event.filter(|m| *m > 0)
    }

    pub fn after(&self) -> Option<i64> {
        self.after_event.filter(|m| *m > 0)
    }

    pub fn is_set(&self) -> bool {
        self.before().is_some() || self.after().is_some()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceParam {
    pub frequency: Option<String>,
    pub interval: Option<i64>,
    pub end_date: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct UserInputParams {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub task_list: Option<Vec<TaskItem>>,
    pub attendees: Option<Vec<MeetingAttendee>>,
    /// ISO 8601 date-time.
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub conference: Option<ConferenceParam>,
    pub buffer_time: Option<BufferTime>,
    /// Reminder minutes before the event.
    pub alarms: Option<Vec<i64>>,
    pub priority: Option<i64>,
    pub location: Option<String>,
    pub transparency: Option<String>,
    pub visibility: Option<String>,
    pub recurrence: Option<RecurrenceParam>,
}

impl UserInputParams {
    /// First of title, summary, description and the first task.
    pub fn title_candidate(&self) -> Option<String> {
        present(&self.title)
            .or_else(|| present(&self.summary))
            .or_else(|| present(&self.description))
            .or_else(|| {
                self.task_list
                    .as_ref()
                    .and_then(|tasks| tasks.first())
                    .map(|t| t.task.clone())
                    .filter(|t| !t.trim().is_empty())
            })
    }

    /// Field-wise `self || previous`.
    pub fn or(&self, previous: &UserInputParams) -> UserInputParams {
        UserInputParams {
            title: pick_text(&self.title, &previous.title),
            summary: pick_text(&self.summary, &previous.summary),
            description: pick_text(&self.description, &previous.description),
            notes: pick_text(&self.notes, &previous.notes),
            task_list: pick(&self.task_list, &previous.task_list),
            attendees: pick(&self.attendees, &previous.attendees),
            start_time: pick_text(&self.start_time, &previous.start_time),
            end_time: pick_text(&self.end_time, &previous.end_time),
            conference: pick(&self.conference, &previous.conference),
            buffer_time: pick(&self.buffer_time, &previous.buffer_time),
            alarms: pick(&self.alarms, &previous.alarms),
            priority: pick(&self.priority, &previous.priority),
            location: pick_text(&self.location, &previous.location),
            transparency: pick_text(&self.transparency, &previous.transparency),
            visibility: pick_text(&self.visibility, &previous.visibility),
            recurrence: pick(&self.recurrence, &previous.recurrence),
        }
    }
}

/// What the extractor understood from the user's message.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UserInputJson {
    #[serde(default)]
    pub params: UserInputParams,
}

// --- Extracted date and time ---

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RelativeTime {
    /// `minute`, `hour`, `day`, `week`, `month` or `year` (plural accepted).
    pub unit: String,
    pub value: i64,
}

/// Date components; absolute parts win over relative ones.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct DateParts {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    /// 1 = Monday ... 7 = Sunday
    pub iso_weekday: Option<u32>,
    pub hour: Option<u32>,
    pub minute: Option<u32>,
    /// `HH:mm`
    pub start_time: Option<String>,
    /// `add` or `subtract`
    pub relative_time_change_from_now: Option<String>,
    pub relative_time_from_now: Option<Vec<RelativeTime>>,
}

impl DateParts {
    pub fn is_empty(&self) -> bool {
        self.year.is_none()
            && self.month.is_none()
            && self.day.is_none()
            && self.iso_weekday.is_none()
            && self.hour.is_none()
            && self.minute.is_none()
            && present(&self.start_time).is_none()
            && self
                .relative_time_from_now
                .as_ref()
                .map_or(true, |r| r.is_empty())
    }

    pub fn or(&self, previous: &DateParts) -> DateParts {
        DateParts {
            year: self.year.or(previous.year),
            month: self.month.or(previous.month),
            day: self.day.or(previous.day),
            iso_weekday: self.iso_weekday.or(previous.iso_weekday),
            hour: self.hour.or(previous.hour),
            minute: self.minute.or(previous.minute),
            start_time: pick_text(&self.start_time, &previous.start_time),
            relative_time_change_from_now: pick_text(
                &self.relative_time_change_from_now,
                &previous.relative_time_change_from_now,
            ),
            relative_time_from_now: pick(
                &self.relative_time_from_now,
                &previous.relative_time_from_now,
            ),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct RecurJson {
    /// `daily`, `weekly`, `monthly` or `yearly`
    pub frequency: Option<String>,
    pub interval: Option<i64>,
    /// `MO`, `TU`, ... (full day names are accepted)
    pub by_week_day: Option<Vec<String>>,
    pub by_month_day: Option<Vec<i64>>,
    pub occurrence: Option<i64>,
    pub end_date: Option<DateParts>,
}

impl RecurJson {
    pub fn or(&self, previous: &RecurJson) -> RecurJson {
        RecurJson {
            frequency: pick_text(&self.frequency, &previous.frequency),
            interval: self.interval.or(previous.interval),
            by_week_day: pick(&self.by_week_day, &previous.by_week_day),
            by_month_day: pick(&self.by_month_day, &previous.by_month_day),
            occurrence: self.occurrence.or(previous.occurrence),
            end_date: match (&self.end_date, &previous.end_date) {
                (Some(current), Some(prev)) => Some(current.or(prev)),
                (current, prev) => pick(current, prev),
            },
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    /// `HH:mm`
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TimePreference {
    #[serde(default)]
    pub day_of_week: Vec<String>,
    #[serde(default)]
    pub time_range: TimeRange,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct DateTimeJson {
    #[serde(flatten)]
    pub date: DateParts,
    /// `HH:mm`
    pub end_time: Option<String>,
    /// Minutes
    pub duration: Option<i64>,
    pub method: Option<String>,
    pub recur: Option<RecurJson>,
    pub time_preferences: Option<Vec<TimePreference>>,
}

impl DateTimeJson {
    pub fn or(&self, previous: &DateTimeJson) -> DateTimeJson {
        DateTimeJson {
            date: self.date.or(&previous.date),
            end_time: pick_text(&self.end_time, &previous.end_time),
            duration: self.duration.filter(|d| *d > 0).or(previous.duration),
            method: pick_text(&self.method, &previous.method),
            recur: match (&self.recur, &previous.recur) {
                (Some(current), Some(prev)) => Some(current.or(prev)),
                (current, prev) => pick(current, prev),
            },
            time_preferences: pick(&self.time_preferences, &previous.time_preferences),
        }
    }
}

// --- The meeting being assembled ---

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRule {
    pub frequency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_week_day: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_month_day: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrence: Option<i64>,
    /// RFC 3339
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

/// The partial meeting request carried between turns as `prevData`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleMeetingBody {
    pub user_id: String,
    pub timezone: String,
    pub title: Option<String>,
    pub attendees: Vec<MeetingAttendee>,
    pub method: Option<String>,
    /// Minutes; 0 when unknown.
    pub duration: i64,
    pub description: Option<String>,
    pub conference_app: Option<String>,
    /// RFC 3339 in the user's timezone.
    pub start_date: Option<String>,
    pub buffer_time: Option<BufferTime>,
    pub reminders: Vec<i64>,
    /// 0 when unknown.
    pub priority: i64,
    pub time_preferences: Vec<TimePreference>,
    pub location: Option<String>,
    pub transparency: Option<String>,
    pub visibility: Option<String>,
    pub recur: Option<RecurrenceRule>,
}

/// `Chat_Meeting_Preference` row: the user's defaults for new meetings.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct MeetingPreferences {
    pub id: Option<String>,
    pub user_id: Option<String>,
    pub timezone: Option<String>,
    pub name: Option<String>,
    pub primary_email: Option<String>,
    pub send_updates: Option<String>,
    pub guests_can_invite_others: Option<bool>,
    pub guests_can_see_other_guests: Option<bool>,
    pub anyone_can_add_self: Option<bool>,
    pub transparency: Option<String>,
    pub visibility: Option<String>,
    pub use_default_alarms: Option<bool>,
    pub reminders: Option<Vec<i64>>,
    pub duration: Option<i64>,
    pub buffer_time: Option<BufferTime>,
    pub conference_app: Option<String>,
}

// --- Conversation state ---

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RequiredField {
    pub value: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub and: Option<Vec<RequiredField>>,
}

impl RequiredField {
    fn chat(value: &str) -> Self {
        Self {
            value: value.to_string(),
            kind: "chat".to_string(),
            and: None,
        }
    }

    pub fn title() -> Self {
        Self::chat("title")
    }

    /// Attendees with their sub-requirements: `and[1]` is the host email,
    /// `and[2]` a name or email for an attendee that could not be resolved.
    pub fn attendees() -> Self {
        Self {
            and: Some(vec![
                Self::chat("name"),
                Self::chat("email"),
                Self::chat("name/email"),
            ]),
            ..Self::chat("attendees")
        }
    }

    pub fn attendee_part(index: usize) -> Self {
        Self::attendees()
            .and
            .and_then(|parts| parts.into_iter().nth(index))
            .unwrap_or_else(|| Self::chat("attendees"))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct DateTimeRequired {
    #[serde(default)]
    pub required: Vec<RequiredField>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RequiredFields {
    #[serde(default)]
    pub required: Vec<RequiredField>,
    #[serde(default)]
    pub date_time: DateTimeRequired,
}

impl RequiredFields {
    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.date_time.required.is_empty()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum MeetingQuery {
    Pending,
    MissingFields,
    Completed,
    EventNotFound,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(untagged)]
pub enum ActionData {
    Message(String),
    Required(RequiredFields),
}

/// Result of one pipeline step.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ResponseAction {
    pub query: MeetingQuery,
    pub data: ActionData,
    pub skill: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_data: Option<ScheduleMeetingBody>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_data_extra: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_json_body: Option<UserInputJson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_date_json_body: Option<DateTimeJson>,
}

impl ResponseAction {
    pub fn completed(message: &str) -> Self {
        Self {
            query: MeetingQuery::Completed,
            data: ActionData::Message(message.to_string()),
            skill: SKILL_NAME.to_string(),
            prev_data: None,
            prev_data_extra: None,
            prev_json_body: None,
            prev_date_json_body: None,
        }
    }

    pub fn missing_fields(
        required: RequiredFields,
        prev_data: ScheduleMeetingBody,
        prev_json_body: UserInputJson,
        prev_date_json_body: DateTimeJson,
    ) -> Self {
        Self {
            query: MeetingQuery::MissingFields,
            data: ActionData::Required(required),
            skill: SKILL_NAME.to_string(),
            prev_data: Some(prev_data),
            prev_data_extra: None,
            prev_json_body: Some(prev_json_body),
            prev_date_json_body: Some(prev_date_json_body),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Conversation state the client sends back on every turn.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct SkillMessageHistory {
    pub messages: Vec<ChatMessage>,
    pub query: Option<MeetingQuery>,
    pub required: Option<RequiredFields>,
    pub prev_data: Option<ScheduleMeetingBody>,
    pub prev_data_extra: Option<Value>,
    pub prev_json_body: Option<UserInputJson>,
    pub prev_date_json_body: Option<DateTimeJson>,
}

impl SkillMessageHistory {
    /// Content of the most recent user message.
    pub fn latest_user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::User)
            .map(|m| m.content.as_str())
    }

    /// The user message before `current` and the assistant reply that followed it.
    ///
    /// Messages are compared and returned trimmed.
    pub fn prior_exchange(&self, current: &str) -> Option<(String, String)> {
        let current = current.trim();
        let mut assistant: Option<&str> = None;
        for message in self.messages.iter().rev() {
            match message.role {
                ChatRole::Assistant => assistant = Some(message.content.trim()),
                ChatRole::User if message.content.trim() != current => {
                    let user = message.content.trim();
                    return match assistant {
                        Some(reply) if !user.is_empty() && !reply.is_empty() => {
                            Some((user.to_string(), reply.to_string()))
                        }
                        _ => None,
                    };
                }
                _ => {}
            }
        }
        None
    }
}
