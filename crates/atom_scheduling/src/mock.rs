// --- File: crates/atom_scheduling/src/mock.rs ---
//! In-memory scheduling store and a recording indexer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use atom_common::{external_service_error, AtomError};

use crate::indexer::{EventIndexer, IndexedEvent};
use crate::store::{
    AttendeeRow, CalendarRecord, ConferenceRow, Contact, ContactEmail, EventRow,
    PreferredTimeRangeRow, ReminderRow, SchedulingStore, UserContactInfo, UserRecord,
};
use crate::types::MeetingPreferences;

/// Everything a scheduled meeting wrote.
#[derive(Debug, Default, Clone)]
pub struct Written {
    pub events: Vec<EventRow>,
    pub reminders: Vec<ReminderRow>,
    pub time_ranges: Vec<PreferredTimeRangeRow>,
    pub attendees: Vec<AttendeeRow>,
    pub conferences: Vec<ConferenceRow>,
}

#[derive(Default)]
pub struct InMemorySchedulingStore {
    preferences: Vec<MeetingPreferences>,
    contacts: Vec<Contact>,
    contact_infos: Vec<UserContactInfo>,
    users: Vec<UserRecord>,
    calendars: Vec<CalendarRecord>,
    written: Mutex<Written>,
    fail_preferences: AtomicBool,
}

impl InMemorySchedulingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preferences(mut self, preferences: MeetingPreferences) -> Self {
        self.preferences.push(preferences);
        self
    }

    /// A contact of `user_id` with a single primary email.
    pub fn with_contact(mut self, user_id: &str, name: &str, email: &str) -> Self {
        self.contacts.push(Contact {
            id: format!("contact-{}", self.contacts.len() + 1),
            user_id: user_id.to_string(),
            name: Some(name.to_string()),
            emails: vec![ContactEmail {
                primary: true,
                value: email.to_string(),
            }],
            ..Default::default()
        });
        self
    }

    pub fn with_contact_info(mut self, user_id: &str, email: &str, primary: bool) -> Self {
        self.contact_infos.push(UserContactInfo {
            id: email.to_string(),
            user_id: user_id.to_string(),
            name: None,
            kind: "email".to_string(),
            primary,
        });
        self
    }

    pub fn with_user(mut self, user_id: &str, name: &str, email: &str) -> Self {
        self.users.push(UserRecord {
            id: user_id.to_string(),
            name: Some(name.to_string()),
            email: Some(email.to_string()),
        });
        self
    }

    pub fn with_calendar(mut self, user_id: &str, calendar_id: &str, resource: &str) -> Self {
        self.calendars.push(CalendarRecord {
            id: calendar_id.to_string(),
            user_id: user_id.to_string(),
            title: None,
            resource: Some(resource.to_string()),
            global_primary: true,
        });
        self
    }

    /// Make preference lookups fail.
    pub fn fail_preferences(&self, fail: bool) {
        self.fail_preferences.store(fail, Ordering::SeqCst);
    }

    pub fn written(&self) -> Written {
        self.written.lock().unwrap().clone()
    }
}

#[async_trait]
impl SchedulingStore for InMemorySchedulingStore {
    async fn meeting_preferences(
        &self,
        user_id: &str,
    ) -> Result<Option<MeetingPreferences>, AtomError> {
        if self.fail_preferences.load(Ordering::SeqCst) {
            return Err(external_service_error("Hasura", "preferences unavailable"));
        }
        Ok(self
            .preferences
            .iter()
            .find(|p| p.user_id.as_deref() == Some(user_id))
            .cloned())
    }

    async fn contact_by_name(
        &self,
        user_id: &str,
        pattern: &str,
    ) -> Result<Option<Contact>, AtomError> {
        let needle = pattern.trim_matches('%').to_lowercase();
        Ok(self
            .contacts
            .iter()
            .filter(|c| c.user_id == user_id)
            .find(|c| {
                c.name
                    .as_deref()
                    .is_some_and(|n| n.to_lowercase().contains(&needle))
            })
            .cloned())
    }

    async fn contact_by_email(
        &self,
        user_id: &str,
        email: &str,
    ) -> Result<Option<Contact>, AtomError> {
        Ok(self
            .contacts
            .iter()
            .filter(|c| c.user_id == user_id)
            .find(|c| c.emails.iter().any(|e| e.value == email))
            .cloned())
    }

    async fn user_contact_infos(&self, user_id: &str) -> Result<Vec<UserContactInfo>, AtomError> {
        Ok(self
            .contact_infos
            .iter()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn user_contact_infos_by_ids(
        &self,
        ids: &[String],
    ) -> Result<Vec<UserContactInfo>, AtomError> {
        Ok(self
            .contact_infos
            .iter()
            .filter(|i| ids.contains(&i.id))
            .cloned()
            .collect())
    }

    async fn user(&self, user_id: &str) -> Result<Option<UserRecord>, AtomError> {
        Ok(self.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn primary_calendar(
        &self,
        user_id: &str,
        resource: &str,
    ) -> Result<Option<CalendarRecord>, AtomError> {
        Ok(self
            .calendars
            .iter()
            .find(|c| {
                c.user_id == user_id && c.global_primary && c.resource.as_deref() == Some(resource)
            })
            .cloned())
    }

    async fn upsert_events(&self, events: &[EventRow]) -> Result<(), AtomError> {
        let mut written = self.written.lock().unwrap();
        for event in events {
            written.events.retain(|e| e.id != event.id);
            written.events.push(event.clone());
        }
        Ok(())
    }

    async fn insert_reminders(&self, reminders: &[ReminderRow]) -> Result<(), AtomError> {
        self.written
            .lock()
            .unwrap()
            .reminders
            .extend_from_slice(reminders);
        Ok(())
    }

    async fn upsert_preferred_time_ranges(
        &self,
        ranges: &[PreferredTimeRangeRow],
    ) -> Result<(), AtomError> {
        self.written
            .lock()
            .unwrap()
            .time_ranges
            .extend_from_slice(ranges);
        Ok(())
    }

    async fn upsert_attendees(&self, attendees: &[AttendeeRow]) -> Result<(), AtomError> {
        self.written
            .lock()
            .unwrap()
            .attendees
            .extend_from_slice(attendees);
        Ok(())
    }

    async fn upsert_conference(&self, conference: &ConferenceRow) -> Result<(), AtomError> {
        self.written
            .lock()
            .unwrap()
            .conferences
            .push(conference.clone());
        Ok(())
    }
}

/// Records indexed events; can be told to fail.
#[derive(Default)]
pub struct RecordingIndexer {
    train: Mutex<Vec<IndexedEvent>>,
    all: Mutex<Vec<IndexedEvent>>,
    fail: AtomicBool,
}

impl RecordingIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_indexing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn train_events(&self) -> Vec<IndexedEvent> {
        self.train.lock().unwrap().clone()
    }

    pub fn all_events(&self) -> Vec<IndexedEvent> {
        self.all.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventIndexer for RecordingIndexer {
    async fn index_train_event(&self, event: &IndexedEvent) -> Result<(), AtomError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(external_service_error("OpenSearch", "index unavailable"));
        }
        self.train.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn index_all_event(&self, event: &IndexedEvent) -> Result<(), AtomError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(external_service_error("OpenSearch", "index unavailable"));
        }
        self.all.lock().unwrap().push(event.clone());
        Ok(())
    }
}
