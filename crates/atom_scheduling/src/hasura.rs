//! [`SchedulingStore`] over Hasura.

use async_trait::async_trait;
use atom_common::AtomError;
use atom_graphql::{GraphqlError, HasuraClient};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::store::{
    AttendeeRow, CalendarRecord, ConferenceRow, Contact, EventRow, PreferredTimeRangeRow,
    ReminderRow, SchedulingStore, UserContactInfo, UserRecord,
};
use crate::types::MeetingPreferences;

const GET_MEETING_PREFERENCES: &str = r#"
query GetChatMeetingPreferences($userId: uuid!) {
  Chat_Meeting_Preference(where: {userId: {_eq: $userId}}, limit: 1) {
    id
    userId
    timezone
    name
    primaryEmail
    sendUpdates
    guestsCanInviteOthers
    guestsCanSeeOtherGuests
    anyoneCanAddSelf
    transparency
    visibility
    useDefaultAlarms
    reminders
    duration
    bufferTime
    conferenceApp
  }
}
"#;

const GET_CONTACT_BY_NAME: &str = r#"
query GetContactByNameForUserId($userId: uuid!, $name: String!) {
  Contact(where: {userId: {_eq: $userId}, name: {_ilike: $name}}, limit: 1) {
    id
    userId
    name
    firstName
    lastName
    emails
  }
}
"#;

const GET_CONTACT_BY_EMAIL: &str = r#"
query GetContactByEmailForUserId($userId: uuid!, $emailFilter: jsonb!) {
  Contact(where: {userId: {_eq: $userId}, emails: {_contains: $emailFilter}}, limit: 1) {
    id
    userId
    name
    firstName
    lastName
    emails
  }
}
"#;

const LIST_USER_CONTACT_INFO: &str = r#"
query ListUserContactInfoByUserId($userId: uuid!) {
  User_Contact_Info(where: {userId: {_eq: $userId}}) {
    id
    userId
    name
    type
    primary
  }
}
"#;

const LIST_USER_CONTACT_INFO_BY_IDS: &str = r#"
query ListUserContactInfosByIds($ids: [String!]!) {
  User_Contact_Info(where: {id: {_in: $ids}}) {
    id
    userId
    name
    type
    primary
  }
}
"#;

const GET_USER: &str = r#"
query GetUserById($id: uuid!) {
  User_by_pk(id: $id) {
    id
    name
    email
  }
}
"#;

const GET_GLOBAL_PRIMARY_CALENDAR: &str = r#"
query GetGlobalPrimaryCalendar($userId: uuid!, $resource: String!) {
  Calendar(where: {globalPrimary: {_eq: true}, userId: {_eq: $userId}, resource: {_eq: $resource}}, limit: 1) {
    id
    userId
    title
    resource
    globalPrimary
  }
}
"#;

const UPSERT_EVENTS: &str = r#"
mutation InsertEvent($events: [Event_insert_input!]!) {
  insert_Event(
    objects: $events,
    on_conflict: {
      constraint: Event_pkey,
      update_columns: [
        startDate, endDate, allDay, title, summary, notes, timezone, priority,
        isFollowUp, isPreEvent, isPostEvent, forEventId, preEventId, postEventId,
        modifiable, anyoneCanAddSelf, guestsCanInviteOthers, guestsCanSeeOtherGuests,
        transparency, visibility, calendarId, eventId, conferenceId, sendUpdates,
        duration, method, timeBlocking, location, recurrence, recurrenceRule,
        userModifiedAvailability, userModifiedTimeBlocking, userModifiedTimePreference,
        userModifiedReminders, userModifiedPriorityLevel, userModifiedModifiable,
        userModifiedDuration, updatedAt, deleted
      ]
    }
  ) {
    affected_rows
  }
}
"#;

const INSERT_REMINDERS: &str = r#"
mutation InsertReminder($reminders: [Reminder_insert_input!]!) {
  insert_Reminder(objects: $reminders) {
    affected_rows
  }
}
"#;

const UPSERT_PREFERRED_TIME_RANGES: &str = r#"
mutation InsertPreferredTimeRange($preferredTimeRanges: [PreferredTimeRange_insert_input!]!) {
  insert_PreferredTimeRange(
    objects: $preferredTimeRanges,
    on_conflict: {
      constraint: PreferredTimeRange_pkey,
      update_columns: [dayOfWeek, startTime, endTime, updatedAt]
    }
  ) {
    affected_rows
  }
}
"#;

const UPSERT_ATTENDEES: &str = r#"
mutation InsertAttendee($attendees: [Attendee_insert_input!]!) {
  insert_Attendee(
    objects: $attendees,
    on_conflict: {
      constraint: Attendee_pkey,
      update_columns: [contactId, name, emails, eventId, deleted, updatedAt]
    }
  ) {
    affected_rows
  }
}
"#;

const UPSERT_CONFERENCE: &str = r#"
mutation InsertConference($conference: Conference_insert_input!) {
  insert_Conference_one(
    object: $conference,
    on_conflict: {
      constraint: Conference_pkey,
      update_columns: [app, requestId, name, notes, joinUrl, isHost, calendarId, deleted, updatedAt]
    }
  ) {
    id
  }
}
"#;

#[derive(Debug, Deserialize)]
struct AffectedRows {
    affected_rows: u64,
}

#[derive(Debug, Deserialize)]
struct PreferencesData {
    #[serde(rename = "Chat_Meeting_Preference")]
    preferences: Vec<MeetingPreferences>,
}

#[derive(Debug, Deserialize)]
struct ContactData {
    #[serde(rename = "Contact")]
    contacts: Vec<Contact>,
}

#[derive(Debug, Deserialize)]
struct ContactInfoData {
    #[serde(rename = "User_Contact_Info")]
    infos: Vec<UserContactInfo>,
}

#[derive(Debug, Deserialize)]
struct UserData {
    #[serde(rename = "User_by_pk")]
    user: Option<UserRecord>,
}

#[derive(Debug, Deserialize)]
struct CalendarData {
    #[serde(rename = "Calendar")]
    calendars: Vec<CalendarRecord>,
}

/// Scheduling reads and writes against the Atom Hasura schema.
#[derive(Debug, Clone)]
pub struct HasuraSchedulingStore {
    client: HasuraClient,
}

impl HasuraSchedulingStore {
    pub fn new(client: HasuraClient) -> Self {
        Self { client }
    }

    async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
        operation: &str,
    ) -> Result<T, AtomError> {
        self.client
            .execute(query, variables, operation, None)
            .await
            .map_err(AtomError::from)
    }

    /// Runs an insert mutation and returns the affected row count under `field`.
    async fn insert(
        &self,
        mutation: &str,
        variables: Value,
        operation: &str,
        field: &str,
    ) -> Result<u64, AtomError> {
        let mut data: Value = self
            .client
            .execute_mutation(mutation, variables, operation, None)
            .await
            .map_err(AtomError::from)?;
        let affected = serde_json::from_value::<Option<AffectedRows>>(data[field].take())
            .map_err(|e| {
                AtomError::from(GraphqlError::Decode {
                    operation: operation.to_string(),
                    message: e.to_string(),
                })
            })?
            .map_or(0, |r| r.affected_rows);
        debug!(operation, affected, "Scheduling rows written");
        Ok(affected)
    }
}

#[async_trait]
impl SchedulingStore for HasuraSchedulingStore {
    async fn meeting_preferences(
        &self,
        user_id: &str,
    ) -> Result<Option<MeetingPreferences>, AtomError> {
        let data: PreferencesData = self
            .query(
                GET_MEETING_PREFERENCES,
                json!({ "userId": user_id }),
                "GetChatMeetingPreferences",
            )
            .await?;
        Ok(data.preferences.into_iter().next())
    }

    async fn contact_by_name(
        &self,
        user_id: &str,
        pattern: &str,
    ) -> Result<Option<Contact>, AtomError> {
        let data: ContactData = self
            .query(
                GET_CONTACT_BY_NAME,
                json!({ "userId": user_id, "name": pattern }),
                "GetContactByNameForUserId",
            )
            .await?;
        Ok(data.contacts.into_iter().next())
    }

    async fn contact_by_email(
        &self,
        user_id: &str,
        email: &str,
    ) -> Result<Option<Contact>, AtomError> {
        let data: ContactData = self
            .query(
                GET_CONTACT_BY_EMAIL,
                json!({ "userId": user_id, "emailFilter": [{ "value": email }] }),
                "GetContactByEmailForUserId",
            )
            .await?;
        Ok(data.contacts.into_iter().next())
    }

    async fn user_contact_infos(&self, user_id: &str) -> Result<Vec<UserContactInfo>, AtomError> {
        let data: ContactInfoData = self
            .query(
                LIST_USER_CONTACT_INFO,
                json!({ "userId": user_id }),
                "ListUserContactInfoByUserId",
            )
            .await?;
        Ok(data.infos)
    }

    async fn user_contact_infos_by_ids(
        &self,
        ids: &[String],
    ) -> Result<Vec<UserContactInfo>, AtomError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let data: ContactInfoData = self
            .query(
                LIST_USER_CONTACT_INFO_BY_IDS,
                json!({ "ids": ids }),
                "ListUserContactInfosByIds",
            )
            .await?;
        Ok(data.infos)
    }

    async fn user(&self, user_id: &str) -> Result<Option<UserRecord>, AtomError> {
        let data: UserData = self
            .query(GET_USER, json!({ "id": user_id }), "GetUserById")
            .await?;
        Ok(data.user)
    }

    async fn primary_calendar(
        &self,
        user_id: &str,
        resource: &str,
    ) -> Result<Option<CalendarRecord>, AtomError> {
        let data: CalendarData = self
            .query(
                GET_GLOBAL_PRIMARY_CALENDAR,
                json!({ "userId": user_id, "resource": resource }),
                "GetGlobalPrimaryCalendar",
            )
            .await?;
        Ok(data.calendars.into_iter().next())
    }

    async fn upsert_events(&self, events: &[EventRow]) -> Result<(), AtomError> {
        if events.is_empty() {
            return Ok(());
        }
        let affected = self
            .insert(
                UPSERT_EVENTS,
                json!({ "events": events }),
                "InsertEvent",
                "insert_Event",
            )
            .await?;
        info!(affected, "Events upserted");
        Ok(())
    }

    async fn insert_reminders(&self, reminders: &[ReminderRow]) -> Result<(), AtomError> {
        if reminders.is_empty() {
            return Ok(());
        }
        self.insert(
            INSERT_REMINDERS,
            json!({ "reminders": reminders }),
            "InsertReminder",
            "insert_Reminder",
        )
        .await
        .map(|_| ())
    }

    async fn upsert_preferred_time_ranges(
        &self,
        ranges: &[PreferredTimeRangeRow],
    ) -> Result<(), AtomError> {
        if ranges.is_empty() {
            return Ok(());
        }
        self.insert(
            UPSERT_PREFERRED_TIME_RANGES,
            json!({ "preferredTimeRanges": ranges }),
            "InsertPreferredTimeRange",
            "insert_PreferredTimeRange",
        )
        .await
        .map(|_| ())
    }

    async fn upsert_attendees(&self, attendees: &[AttendeeRow]) -> Result<(), AtomError> {
        if attendees.is_empty() {
            return Ok(());
        }
        self.insert(
            UPSERT_ATTENDEES,
            json!({ "attendees": attendees }),
            "InsertAttendee",
            "insert_Attendee",
        )
        .await
        .map(|_| ())
    }

    async fn upsert_conference(&self, conference: &ConferenceRow) -> Result<(), AtomError> {
        let _: Value = self
            .client
            .execute_mutation(
                UPSERT_CONFERENCE,
                json!({ "conference": conference }),
                "InsertConference",
                None,
            )
            .await
            .map_err(AtomError::from)?;
        info!(conference_id = %conference.id, "Conference upserted");
        Ok(())
    }
}
