// --- File: crates/atom_scheduling/src/store.rs ---
//! Persistence seam for the scheduling pipeline: contact lookups, meeting
//! preferences and the rows written for a scheduled meeting.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use atom_common::AtomError;

use crate::types::{BufferTime, MeetingPreferences, RecurrenceRule};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContactEmail {
    #[serde(default)]
    pub primary: bool,
    pub value: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Contact {
    pub id: String,
    pub user_id: String,
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub emails: Vec<ContactEmail>,
}

impl Contact {
    /// The primary email, else the first one.
    pub fn best_email(&self) -> Option<&str> {
        self.emails
            .iter()
            .find(|e| e.primary && !e.value.is_empty())
            .or_else(|| self.emails.iter().find(|e| !e.value.is_empty()))
            .map(|e| e.value.as_str())
    }

    /// `name`, else `firstName lastName`.
    pub fn display_name(&self) -> Option<String> {
        if let Some(name) = self.name.as_ref().filter(|n| !n.is_empty()) {
            return Some(name.clone());
        }
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|p| !p.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }
}

/// `User_Contact_Info` row. For email entries `id` is the address itself.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserContactInfo {
    pub id: String,
    pub user_id: String,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub primary: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserRecord {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CalendarRecord {
    pub id: String,
    pub user_id: String,
    pub title: Option<String>,
    pub resource: Option<String>,
    pub global_primary: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventLocation {
    pub title: Option<String>,
}

/// `Event` row.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EventRow {
    /// `{providerEventId}#{calendarId}`
    pub id: String,
    pub user_id: String,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub all_day: bool,
    pub notes: Option<String>,
    pub timezone: String,
    pub priority: i64,
    pub is_follow_up: bool,
    pub is_pre_event: bool,
    pub is_post_event: bool,
    pub for_event_id: Option<String>,
    pub pre_event_id: Option<String>,
    pub post_event_id: Option<String>,
    pub modifiable: bool,
    pub anyone_can_add_self: Option<bool>,
    pub guests_can_invite_others: Option<bool>,
    pub guests_can_see_other_guests: Option<bool>,
    pub transparency: Option<String>,
    pub visibility: Option<String>,
    pub calendar_id: String,
    /// Provider event id.
    pub event_id: Option<String>,
    pub conference_id: Option<String>,
    pub send_updates: Option<String>,
    pub duration: i64,
    pub method: Option<String>,
    pub time_blocking: Option<BufferTime>,
    pub user_modified_availability: bool,
    pub user_modified_time_blocking: bool,
    pub user_modified_time_preference: bool,
    pub user_modified_reminders: bool,
    pub user_modified_priority_level: bool,
    pub user_modified_modifiable: bool,
    pub user_modified_duration: bool,
    pub location: Option<EventLocation>,
    pub recurrence: Option<Vec<String>>,
    pub recurrence_rule: Option<RecurrenceRule>,
    pub created_date: String,
    pub updated_at: String,
    pub deleted: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeRow {
    pub id: String,
    pub user_id: String,
    pub event_id: String,
    pub name: Option<String>,
    pub contact_id: Option<String>,
    pub emails: Vec<ContactEmail>,
    pub updated_at: String,
    pub created_date: String,
    pub deleted: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReminderRow {
    pub id: String,
    pub user_id: String,
    pub event_id: String,
    pub timezone: String,
    pub minutes: i64,
    pub use_default: bool,
    pub updated_at: String,
    pub created_date: String,
    pub deleted: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreferredTimeRangeRow {
    pub id: String,
    pub user_id: String,
    pub event_id: String,
    /// 1 = Monday ... 7 = Sunday; `None` for every day.
    pub day_of_week: Option<u32>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub updated_at: String,
    pub created_date: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConferenceRow {
    pub id: String,
    pub user_id: String,
    pub calendar_id: String,
    /// `google`
    pub app: String,
    pub request_id: String,
    pub name: Option<String>,
    pub notes: Option<String>,
    pub join_url: Option<String>,
    pub is_host: bool,
    pub updated_at: String,
    pub created_date: String,
    pub deleted: bool,
}

/// Reads and writes of the scheduling pipeline.
#[async_trait]
pub trait SchedulingStore: Send + Sync {
    async fn meeting_preferences(
        &self,
        user_id: &str,
    ) -> Result<Option<MeetingPreferences>, AtomError>;

    /// First contact whose name matches the `ILIKE` pattern, e.g. `%ada%`.
    async fn contact_by_name(
        &self,
        user_id: &str,
        pattern: &str,
    ) -> Result<Option<Contact>, AtomError>;

    async fn contact_by_email(
        &self,
        user_id: &str,
        email: &str,
    ) -> Result<Option<Contact>, AtomError>;

    /// The user's own contact infos.
    async fn user_contact_infos(&self, user_id: &str) -> Result<Vec<UserContactInfo>, AtomError>;

    /// Contact infos with the given ids (email addresses) across all users.
    async fn user_contact_infos_by_ids(
        &self,
        ids: &[String],
    ) -> Result<Vec<UserContactInfo>, AtomError>;

    async fn user(&self, user_id: &str) -> Result<Option<UserRecord>, AtomError>;

    /// The calendar flagged `globalPrimary` for the given resource.
    async fn primary_calendar(
        &self,
        user_id: &str,
        resource: &str,
    ) -> Result<Option<CalendarRecord>, AtomError>;

    async fn upsert_events(&self, events: &[EventRow]) -> Result<(), AtomError>;

    async fn insert_reminders(&self, reminders: &[ReminderRow]) -> Result<(), AtomError>;

    async fn upsert_preferred_time_ranges(
        &self,
        ranges: &[PreferredTimeRangeRow],
    ) -> Result<(), AtomError>;

    async fn upsert_attendees(&self, attendees: &[AttendeeRow]) -> Result<(), AtomError>;

    async fn upsert_conference(&self, conference: &ConferenceRow) -> Result<(), AtomError>;
}
