// --- File: crates/atom_gcal/src/service.rs ---
//! Google Calendar implementation of [`CalendarProvider`].
//!
//! Events are created with the requesting user's own OAuth token, refreshed
//! through the shared token lifecycle when it is about to expire.

use std::sync::Arc;

use atom_common::oauth::lifecycle::ensure_fresh_token;
use atom_common::oauth::OAuthProvider;
use atom_common::services::{
    BoxFuture, CalendarProvider, CreatedCalendarEvent, NewCalendarEvent, TokenStore,
};
use atom_common::AtomError;
use google_calendar3::api::{
    ConferenceData, ConferenceSolutionKey, CreateConferenceRequest, Event, EventAttendee,
    EventDateTime, EventReminder, EventReminders,
};
use tracing::info;

use crate::auth::create_user_hub;
use crate::error::GcalError;

/// Google Calendar service implementation.
pub struct GoogleCalendarService {
    store: Arc<dyn TokenStore>,
    provider: Arc<dyn OAuthProvider>,
    api_base: Option<String>,
}

impl GoogleCalendarService {
    pub fn new(
        store: Arc<dyn TokenStore>,
        provider: Arc<dyn OAuthProvider>,
        api_base: Option<String>,
    ) -> Self {
        Self {
            store,
            provider,
            api_base,
        }
    }

    async fn insert_event(
        &self,
        user_id: &str,
        calendar_id: &str,
        event: NewCalendarEvent,
    ) -> Result<CreatedCalendarEvent, GcalError> {
        let token = ensure_fresh_token(self.store.as_ref(), self.provider.as_ref(), user_id).await?;
        let hub = create_user_hub(token.access_token, self.api_base.as_deref())?;

        let send_updates = event.send_updates.clone().unwrap_or_else(|| "all".to_string());
        let with_conference = event.conference.is_some();
        let mut call = hub
            .events()
            .insert(to_google_event(&event), calendar_id)
            .send_updates(&send_updates);
        if with_conference {
            call = call.conference_data_version(1);
        }
        let (_, created) = call.doit().await?;

        let id = created.id.clone().ok_or(GcalError::MissingEventId)?;
        info!(user_id, event_id = %id, calendar_id, "Calendar event created");
        Ok(CreatedCalendarEvent {
            id,
            html_link: created.html_link,
            hangout_link: created.hangout_link,
            conference_id: created.conference_data.and_then(|c| c.conference_id),
        })
    }
}

impl CalendarProvider for GoogleCalendarService {
    fn create_event(
        &self,
        user_id: &str,
        calendar_id: &str,
        event: NewCalendarEvent,
    ) -> BoxFuture<'_, CreatedCalendarEvent, AtomError> {
        let user_id = user_id.to_string();
        let calendar_id = calendar_id.to_string();
        Box::pin(async move {
            self.insert_event(&user_id, &calendar_id, event)
                .await
                .map_err(AtomError::from)
        })
    }
}

/// Build the Calendar API body for a new event.
pub fn to_google_event(event: &NewCalendarEvent) -> Event {
    let at = |instant| EventDateTime {
        date_time: Some(instant),
        time_zone: Some(event.time_zone.clone()),
        ..Default::default()
    };

    let attendees = (!event.attendees.is_empty()).then(|| {
        event
            .attendees
            .iter()
            .map(|a| EventAttendee {
                email: Some(a.email.clone()),
                display_name: a.display_name.clone(),
                optional: a.optional.then_some(true),
                organizer: a.organizer.then_some(true),
                ..Default::default()
            })
            .collect()
    });

    let reminders = event.reminder_minutes.as_ref().map(|minutes| EventReminders {
        use_default: Some(false),
        overrides: Some(
            minutes
                .iter()
                .map(|m| EventReminder {
                    method: Some("email".to_string()),
                    minutes: Some(*m),
                })
                .collect(),
        ),
    });

    let conference_data = event.conference.as_ref().map(|c| ConferenceData {
        create_request: Some(CreateConferenceRequest {
            request_id: Some(c.request_id.clone()),
            conference_solution_key: Some(ConferenceSolutionKey {
                type_: Some(c.solution_type.clone()),
            }),
            ..Default::default()
        }),
        ..Default::default()
    });

    Event {
        summary: event.summary.clone(),
        description: event.description.clone(),
        location: event.location.clone(),
        start: Some(at(event.start)),
        end: Some(at(event.end)),
        attendees,
        recurrence: event.recurrence.clone(),
        reminders,
        conference_data,
        transparency: event.transparency.clone(),
        visibility: event.visibility.clone(),
        guests_can_invite_others: event.guests_can_invite_others,
        guests_can_modify: event.guests_can_modify,
        guests_can_see_other_guests: event.guests_can_see_other_guests,
        ..Default::default()
    }
}
