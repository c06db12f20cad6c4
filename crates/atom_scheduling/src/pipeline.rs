// --- File: crates/atom_scheduling/src/pipeline.rs ---
//! The scheduling conversation.
//!
//! A turn extracts the user's request, assembles a [`ScheduleMeetingBody`]
//! and either asks for what is missing or creates the meeting:
//!
//! 1. the main event on the user's primary calendar,
//! 2. optional buffer events before and after it,
//! 3. the Hasura rows for events, reminders, preferred time ranges,
//!    attendees and the conference,
//! 4. the search-index documents.
//!
//! Nothing is written and no calendar call is made while a required field
//! is missing.

use std::sync::Arc;

use atom_common::services::{
    CalendarProvider, ConferenceRequest, CreatedCalendarEvent, EventAttendee, NewCalendarEvent,
};
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use tracing::{info, warn};
use uuid::Uuid;

use crate::body::{build_body_missing_fields, build_body_pending, merge_into_previous, BodyContext};
use crate::datetime::{parse_current_time, parse_instant, parse_timezone};
use crate::error::SchedulingError;
use crate::extractor::MeetingExtractor;
use crate::indexer::{EventIndexer, IndexedEvent};
use crate::recurrence::{create_rrule_string, week_day_code};
use crate::responder::AssistantResponder;
use crate::store::{
    AttendeeRow, ConferenceRow, ContactEmail, EventLocation, EventRow, PreferredTimeRangeRow,
    ReminderRow, SchedulingStore,
};
use crate::types::{
    present, ActionData, ChatMessage, DateTimeJson, MeetingAttendee, MeetingPreferences,
    MeetingQuery, RequiredField, RequiredFields, ResponseAction, ScheduleMeetingBody,
    SkillMessageHistory, UserInputJson, UserInputParams, EVENT_NOT_FOUND_MESSAGE,
    SCHEDULED_MESSAGE,
};

pub const DEFAULT_CALENDAR_RESOURCE: &str = "google";
const BUFFER_TITLE: &str = "Buffer time";
const GOOGLE_CONFERENCE_APP: &str = "google";
const HANGOUTS_MEET: &str = "hangoutsMeet";

/// Collaborators of the pipeline.
#[derive(Clone)]
pub struct SchedulingDeps {
    pub store: Arc<dyn SchedulingStore>,
    pub calendar: Arc<dyn CalendarProvider>,
    pub extractor: Arc<dyn MeetingExtractor>,
    pub responder: Arc<dyn AssistantResponder>,
    pub indexer: Arc<dyn EventIndexer>,
    /// `resource` of the calendar events are created on.
    pub calendar_resource: String,
    /// Minutes, when nothing else gives a duration.
    pub default_duration: i64,
}

async fn load_preferences(deps: &SchedulingDeps, user_id: &str) -> Option<MeetingPreferences> {
    match deps.store.meeting_preferences(user_id).await {
        Ok(prefs) => prefs,
        Err(e) => {
            warn!(user_id, error = %e, "Meeting preferences unavailable; continuing without");
            None
        }
    }
}

/// Fill in attendee emails from the user's contacts.
///
/// Returns the attendees that have an email and whether any could not be
/// resolved.
pub async fn resolve_attendees(
    deps: &SchedulingDeps,
    user_id: &str,
    attendees: &[MeetingAttendee],
) -> Result<(Vec<MeetingAttendee>, bool), SchedulingError> {
    let mut resolved = Vec::with_capacity(attendees.len());
    let mut unresolved = false;

    for attendee in attendees {
        if present(&attendee.email).is_some() {
            resolved.push(attendee.clone());
            continue;
        }
        let Some(name) = present(&attendee.name) else {
            unresolved = true;
            continue;
        };
        let contact = deps
            .store
            .contact_by_name(user_id, &format!("%{}%", name.trim()))
            .await?;
        match contact.as_ref().and_then(|c| c.best_email()) {
            Some(email) => resolved.push(MeetingAttendee {
                name: Some(name),
                email: Some(email.to_string()),
                is_host: attendee.is_host,
            }),
            None => {
                info!(user_id, attendee = %name, "Attendee not found in contacts");
                unresolved = true;
            }
        }
    }

    Ok((resolved, unresolved))
}

/// The scheduling user as an attendee.
///
/// The email comes from the primary email contact info, else from the user
/// record. `None` when neither has one.
pub async fn host_attendee(
    deps: &SchedulingDeps,
    user_id: &str,
    prefs: Option<&MeetingPreferences>,
) -> Result<Option<MeetingAttendee>, SchedulingError> {
    let infos = deps.store.user_contact_infos(user_id).await?;
    let info_email = infos
        .iter()
        .filter(|i| i.kind == "email" && !i.id.is_empty())
        .max_by_key(|i| i.primary)
        .map(|i| (i.id.clone(), i.name.clone()));

    let (email, info_name) = match info_email {
        Some((email, name)) => (Some(email), name),
        None => (None, None),
    };
    let user = if email.is_none() || info_name.is_none() {
        deps.store.user(user_id).await?
    } else {
        None
    };

    let Some(email) = email.or_else(|| user.as_ref().and_then(|u| present(&u.email))) else {
        return Ok(None);
    };
    let name = prefs
        .and_then(|p| present(&p.name))
        .or(info_name)
        .or_else(|| user.and_then(|u| u.name));

    Ok(Some(MeetingAttendee {
        name,
        email: Some(email),
        is_host: true,
    }))
}

/// Checks the body and resolves attendees.
///
/// `body.attendees` is narrowed to the resolved attendees. The host is
/// returned separately so it is not carried into `prevData`.
async fn check_body(
    deps: &SchedulingDeps,
    body: &mut ScheduleMeetingBody,
    prefs: Option<&MeetingPreferences>,
) -> Result<(RequiredFields, Option<MeetingAttendee>), SchedulingError> {
    let mut required = RequiredFields::default();

    if body.title.is_none() {
        required.required.push(RequiredField::title());
    }
    if body.attendees.is_empty() {
        required.required.push(RequiredField::attendees());
    } else {
        let (resolved, unresolved) =
            resolve_attendees(deps, &body.user_id, &body.attendees).await?;
        body.attendees = resolved;
        if unresolved {
            required.required.push(RequiredField::attendee_part(2));
        }
    }

    let mut host = None;
    if !body.attendees.iter().any(|a| a.is_host) {
        host = host_attendee(deps, &body.user_id, prefs).await?;
        if host.is_none() {
            required.required.push(RequiredField::attendee_part(1));
        }
    }

    Ok((required, host))
}

async fn process_body(
    deps: &SchedulingDeps,
    mut body: ScheduleMeetingBody,
    prefs: Option<&MeetingPreferences>,
    input: UserInputJson,
    date: DateTimeJson,
) -> Result<ResponseAction, SchedulingError> {
    let (required, host) = check_body(deps, &mut body, prefs).await?;
    if !required.is_empty() {
        info!(
            user_id = %body.user_id,
            missing = required.required.len(),
            "Meeting request incomplete"
        );
        return Ok(ResponseAction::missing_fields(required, body, input, date));
    }

    let mut attendees = body.attendees.clone();
    attendees.extend(host);
    final_step_schedule_meeting(deps, &body, &attendees, prefs).await
}

/// First turn of a request.
pub async fn process_pending(
    deps: &SchedulingDeps,
    user_id: &str,
    now: DateTime<Tz>,
    input: UserInputJson,
    date: DateTimeJson,
) -> Result<ResponseAction, SchedulingError> {
    let prefs = load_preferences(deps, user_id).await;
    let ctx = BodyContext {
        user_id,
        now,
        prefs: prefs.as_ref(),
        default_duration: deps.default_duration,
    };
    let body = build_body_pending(&ctx, &input, &date);
    process_body(deps, body, prefs.as_ref(), input, date).await
}

/// Attendees of `new` that `body` does not list yet, by email or name.
fn append_new_attendees(mut body: ScheduleMeetingBody, new: &ScheduleMeetingBody) -> ScheduleMeetingBody {
    for attendee in &new.attendees {
        let known = body.attendees.iter().any(|a| {
            (attendee.email.is_some() && a.email == attendee.email)
                || (attendee.name.is_some() && a.name == attendee.name)
        });
        if !known {
            body.attendees.push(attendee.clone());
        }
    }
    body
}

/// A turn answering a missing-fields question.
pub async fn process_missing_fields(
    deps: &SchedulingDeps,
    user_id: &str,
    now: DateTime<Tz>,
    input: UserInputJson,
    date: DateTimeJson,
    history: &SkillMessageHistory,
) -> Result<ResponseAction, SchedulingError> {
    let prefs = load_preferences(deps, user_id).await;
    let ctx = BodyContext {
        user_id,
        now,
        prefs: prefs.as_ref(),
        default_duration: deps.default_duration,
    };
    let prev_input = history.prev_json_body.as_ref();
    let prev_date = history.prev_date_json_body.as_ref();

    let new_body = build_body_missing_fields(&ctx, &input, &date, prev_input, prev_date);
    let body = match history.prev_data.clone() {
        Some(prev) => append_new_attendees(merge_into_previous(prev, &new_body), &new_body),
        None => new_body,
    };

    let empty = UserInputParams::default();
    let merged_input = UserInputJson {
        params: input.params.or(prev_input.map_or(&empty, |p| &p.params)),
    };
    let merged_date = match prev_date {
        Some(prev) => date.or(prev),
        None => date,
    };

    process_body(deps, body, prefs.as_ref(), merged_input, merged_date).await
}

fn day_of_week_number(day: &str) -> Option<u32> {
    let code = week_day_code(day)?;
    ["MO", "TU", "WE", "TH", "FR", "SA", "SU"]
        .iter()
        .position(|d| *d == code)
        .map(|i| i as u32 + 1)
}

fn buffer_event(
    summary: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    time_zone: &str,
) -> NewCalendarEvent {
    NewCalendarEvent {
        summary: Some(summary.to_string()),
        description: Some(summary.to_string()),
        location: None,
        start,
        end,
        time_zone: time_zone.to_string(),
        attendees: Vec::new(),
        recurrence: None,
        reminder_minutes: None,
        conference: None,
        transparency: Some("opaque".to_string()),
        visibility: Some("private".to_string()),
        guests_can_invite_others: None,
        guests_can_modify: None,
        guests_can_see_other_guests: None,
        send_updates: None,
    }
}

/// Creates the meeting and everything that belongs to it.
pub async fn final_step_schedule_meeting(
    deps: &SchedulingDeps,
    body: &ScheduleMeetingBody,
    attendees: &[MeetingAttendee],
    prefs: Option<&MeetingPreferences>,
) -> Result<ResponseAction, SchedulingError> {
    let user_id = body.user_id.as_str();
    let tz: Tz = parse_timezone(&body.timezone)?;

    let calendar = deps
        .store
        .primary_calendar(user_id, &deps.calendar_resource)
        .await?
        .ok_or_else(|| SchedulingError::NoPrimaryCalendar(user_id.to_string()))?;

    let start = body
        .start_date
        .as_deref()
        .and_then(|s| parse_instant(s, tz))
        .ok_or_else(|| SchedulingError::Validation("Missing or invalid startDate".to_string()))?
        .with_timezone(&Utc);
    let duration = if body.duration > 0 {
        body.duration
    } else {
        deps.default_duration
    };
    let end = shift_minutes(start, duration, "duration")?;
    // Buffer windows are checked before any calendar call.
    let buffer = body.buffer_time.as_ref();
    let pre_buffer = buffer
        .and_then(|b| b.before())
        .map(|before| {
            shift_minutes(start, -before, "bufferTime.beforeEvent").map(|at| (before, at))
        })
        .transpose()?;
    let post_buffer = buffer
        .and_then(|b| b.after())
        .map(|after| shift_minutes(end, after, "bufferTime.afterEvent").map(|at| (after, at)))
        .transpose()?;
    let stamp = Utc::now().to_rfc3339();

    let title = body.title.clone();
    let notes = present(&body.description).or_else(|| title.clone());
    let modifiable = body.priority > 1 || !body.time_preferences.is_empty();
    let transparency = present(&body.transparency)
        .or_else(|| prefs.and_then(|p| present(&p.transparency)));
    let visibility =
        present(&body.visibility).or_else(|| prefs.and_then(|p| present(&p.visibility)));
    let send_updates = prefs.and_then(|p| present(&p.send_updates));

    // Any requested conference app becomes a Google Meet link.
    let conference = present(&body.conference_app).map(|_| ConferenceRequest {
        request_id: Uuid::new_v4().to_string(),
        solution_type: HANGOUTS_MEET.to_string(),
    });

    let reminder_minutes: Option<Vec<i32>> = (!body.reminders.is_empty()).then(|| {
        body.reminders
            .iter()
            .filter_map(|m| i32::try_from(*m).ok())
            .collect()
    });

    let recurrence = body
        .recur
        .as_ref()
        .and_then(|rule| create_rrule_string(rule, tz));

    let event = NewCalendarEvent {
        summary: title.clone(),
        description: notes.clone(),
        location: present(&body.location),
        start,
        end,
        time_zone: tz.name().to_string(),
        attendees: attendees
            .iter()
            .filter_map(|a| {
                present(&a.email).map(|email| EventAttendee {
                    email,
                    display_name: present(&a.name),
                    optional: false,
                    organizer: a.is_host,
                })
            })
            .collect(),
        recurrence: recurrence.clone(),
        reminder_minutes,
        conference: conference.clone(),
        transparency: transparency.clone(),
        visibility: visibility.clone(),
        guests_can_invite_others: prefs.and_then(|p| p.guests_can_invite_others),
        guests_can_modify: None,
        guests_can_see_other_guests: prefs.and_then(|p| p.guests_can_see_other_guests),
        send_updates: send_updates.clone(),
    };

    let created: CreatedCalendarEvent = deps
        .calendar
        .create_event(user_id, &calendar.id, event)
        .await
        .map_err(SchedulingError::Calendar)?;
    let event_id = format!("{}#{}", created.id, calendar.id);
    info!(user_id, event_id = %event_id, "Meeting created");

    let conference_row = conference.as_ref().map(|c| ConferenceRow {
        id: created
            .conference_id
            .clone()
            .unwrap_or_else(|| c.request_id.clone()),
        user_id: user_id.to_string(),
        calendar_id: calendar.id.clone(),
        app: GOOGLE_CONFERENCE_APP.to_string(),
        request_id: c.request_id.clone(),
        name: title.clone(),
        notes: notes.clone(),
        join_url: created.hangout_link.clone(),
        is_host: true,
        updated_at: stamp.clone(),
        created_date: stamp.clone(),
        deleted: false,
    });

    let mut main = EventRow {
        id: event_id.clone(),
        user_id: user_id.to_string(),
        title: title.clone(),
        summary: title.clone(),
        start_date: start.with_timezone(&tz).to_rfc3339(),
        end_date: end.with_timezone(&tz).to_rfc3339(),
        notes: notes.clone(),
        timezone: tz.name().to_string(),
        priority: body.priority.max(1),
        modifiable,
        anyone_can_add_self: prefs.and_then(|p| p.anyone_can_add_self),
        guests_can_invite_others: prefs.and_then(|p| p.guests_can_invite_others),
        guests_can_see_other_guests: prefs.and_then(|p| p.guests_can_see_other_guests),
        transparency: transparency.clone(),
        visibility: visibility.clone(),
        calendar_id: calendar.id.clone(),
        event_id: Some(created.id.clone()),
        conference_id: conference_row.as_ref().map(|c| c.id.clone()),
        send_updates: send_updates.clone(),
        duration,
        method: body.method.clone(),
        time_blocking: body.buffer_time.clone().filter(|b| b.is_set()),
        user_modified_availability: body.transparency.is_some(),
        user_modified_time_blocking: body.buffer_time.as_ref().is_some_and(|b| b.is_set()),
        user_modified_time_preference: !body.time_preferences.is_empty(),
        user_modified_reminders: !body.reminders.is_empty(),
        user_modified_priority_level: body.priority > 1,
        user_modified_modifiable: modifiable,
        user_modified_duration: true,
        location: present(&body.location).map(|l| EventLocation { title: Some(l) }),
        recurrence,
        recurrence_rule: body.recur.clone(),
        created_date: stamp.clone(),
        updated_at: stamp.clone(),
        ..Default::default()
    };

    let mut events = Vec::with_capacity(3);
    if let Some((before, pre_start)) = pre_buffer {
        let pre = deps
            .calendar
            .create_event(
                user_id,
                &calendar.id,
                buffer_event(BUFFER_TITLE, pre_start, start, tz.name()),
            )
            .await
            .map_err(SchedulingError::Calendar)?;
        let pre_id = format!("{}#{}", pre.id, calendar.id);
        main.pre_event_id = Some(pre_id.clone());
        events.push(buffer_row(
            &main, pre_id, pre.id, pre_start, start, tz, before, true,
        ));
    }
    if let Some((after, post_end)) = post_buffer {
        let post = deps
            .calendar
            .create_event(
                user_id,
                &calendar.id,
                buffer_event(BUFFER_TITLE, end, post_end, tz.name()),
            )
            .await
            .map_err(SchedulingError::Calendar)?;
        let post_id = format!("{}#{}", post.id, calendar.id);
        main.post_event_id = Some(post_id.clone());
        events.push(buffer_row(
            &main, post_id, post.id, end, post_end, tz, after, false,
        ));
    }
    events.insert(0, main);

    let reminders: Vec<ReminderRow> = body
        .reminders
        .iter()
        .map(|minutes| ReminderRow {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            event_id: event_id.clone(),
            timezone: tz.name().to_string(),
            minutes: *minutes,
            use_default: false,
            updated_at: stamp.clone(),
            created_date: stamp.clone(),
            deleted: false,
        })
        .collect();

    let mut ranges = Vec::new();
    for preference in &body.time_preferences {
        let days: Vec<Option<u32>> = if preference.day_of_week.is_empty() {
            vec![None]
        } else {
            preference
                .day_of_week
                .iter()
                .filter_map(|d| day_of_week_number(d))
                .map(Some)
                .collect()
        };
        for day in days {
            ranges.push(PreferredTimeRangeRow {
                id: Uuid::new_v4().to_string(),
                user_id: user_id.to_string(),
                event_id: event_id.clone(),
                day_of_week: day,
                start_time: present(&preference.time_range.start_time),
                end_time: present(&preference.time_range.end_time),
                updated_at: stamp.clone(),
                created_date: stamp.clone(),
            });
        }
    }

    let mut attendee_rows = Vec::with_capacity(attendees.len());
    for attendee in attendees {
        let Some(email) = present(&attendee.email) else {
            continue;
        };
        let contact = deps.store.contact_by_email(user_id, &email).await?;
        attendee_rows.push(AttendeeRow {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            event_id: event_id.clone(),
            name: present(&attendee.name).or_else(|| contact.as_ref().and_then(|c| c.display_name())),
            contact_id: contact.map(|c| c.id),
            emails: vec![ContactEmail {
                primary: true,
                value: email,
            }],
            updated_at: stamp.clone(),
            created_date: stamp.clone(),
            deleted: false,
        });
    }

    deps.store.upsert_events(&events).await?;
    deps.store.insert_reminders(&reminders).await?;
    deps.store.upsert_preferred_time_ranges(&ranges).await?;
    deps.store.upsert_attendees(&attendee_rows).await?;
    if let Some(conference_row) = conference_row.as_ref() {
        deps.store.upsert_conference(conference_row).await?;
    }

    let document = IndexedEvent {
        event_id: event_id.clone(),
        user_id: user_id.to_string(),
        title: title.unwrap_or_default(),
        start_date: start.to_rfc3339(),
        end_date: end.to_rfc3339(),
    };
    if modifiable {
        if let Err(e) = deps.indexer.index_train_event(&document).await {
            warn!(event_id = %event_id, error = %e, "Training index write failed");
        }
    }
    if let Err(e) = deps.indexer.index_all_event(&document).await {
        warn!(event_id = %event_id, error = %e, "Event index write failed");
    }

    Ok(ResponseAction::completed(SCHEDULED_MESSAGE))
}

#[allow(clippy::too_many_arguments)]
fn buffer_row(
    main: &EventRow,
    id: String,
    provider_id: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    tz: Tz,
    minutes: i64,
    is_pre_event: bool,
) -> EventRow {
    EventRow {
        id,
        user_id: main.user_id.clone(),
        title: Some(BUFFER_TITLE.to_string()),
        summary: Some(BUFFER_TITLE.to_string()),
        start_date: start.with_timezone(&tz).to_rfc3339(),
        end_date: end.with_timezone(&tz).to_rfc3339(),
        notes: Some(BUFFER_TITLE.to_string()),
        timezone: main.timezone.clone(),
        priority: 1,
        is_pre_event,
        is_post_event: !is_pre_event,
        for_event_id: Some(main.id.clone()),
        modifiable: true,
        transparency: Some("opaque".to_string()),
        visibility: Some("private".to_string()),
        calendar_id: main.calendar_id.clone(),
        event_id: Some(provider_id),
        duration: minutes,
        user_modified_availability: true,
        user_modified_priority_level: true,
        user_modified_modifiable: true,
        user_modified_time_blocking: true,
        created_date: main.created_date.clone(),
        updated_at: main.updated_at.clone(),
        ..Default::default()
    }
}

/// Run one conversational turn and return the updated history.
///
/// Incoming `completed` and `event_not_found` turns are finished
/// conversations and come back unchanged.
pub async fn schedule_meeting_control_center(
    deps: &SchedulingDeps,
    user_id: &str,
    timezone: &str,
    mut history: SkillMessageHistory,
    current_time: &str,
    query: MeetingQuery,
) -> Result<SkillMessageHistory, SchedulingError> {
    let tz = parse_timezone(timezone)?;
    let now = parse_current_time(current_time, tz)?;

    let action = match query {
        MeetingQuery::Completed | MeetingQuery::EventNotFound => return Ok(history),
        MeetingQuery::Pending => {
            let user_input = latest_user_input(&history)?;
            let (input, date) = deps
                .extractor
                .extract_pending(&user_input, current_time, timezone)
                .await?;
            process_pending(deps, user_id, now, input, date).await?
        }
        MeetingQuery::MissingFields => {
            let user_input = latest_user_input(&history)?;
            let (prior_user, prior_assistant) = history
                .prior_exchange(&user_input)
                .ok_or(SchedulingError::MissingContext)?;
            let (input, date) = deps
                .extractor
                .extract_missing_fields(
                    &user_input,
                    &prior_user,
                    &prior_assistant,
                    current_time,
                    timezone,
                )
                .await?;
            process_missing_fields(deps, user_id, now, input, date, &history).await?
        }
    };

    apply_action(deps, &mut history, action).await;
    Ok(history)
}

/// `at + minutes`, or a validation error when it leaves chrono's range.
fn shift_minutes(
    at: DateTime<Utc>,
    minutes: i64,
    field: &str,
) -> Result<DateTime<Utc>, SchedulingError> {
    Duration::try_minutes(minutes)
        .and_then(|delta| at.checked_add_signed(delta))
        .ok_or_else(|| SchedulingError::Validation(format!("{} is out of range: {}", field, minutes)))
}

fn latest_user_input(history: &SkillMessageHistory) -> Result<String, SchedulingError> {
    history
        .latest_user_message()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .ok_or_else(|| SchedulingError::Validation("No user message to schedule from".to_string()))
}

async fn apply_action(
    deps: &SchedulingDeps,
    history: &mut SkillMessageHistory,
    action: ResponseAction,
) {
    match (action.query, action.data) {
        (MeetingQuery::Completed, data) => {
            let text = match &data {
                ActionData::Message(message) => message.clone(),
                ActionData::Required(_) => SCHEDULED_MESSAGE.to_string(),
            };
            let reply = deps.responder.completed(&text, history).await;
            history.messages.push(reply);
            history.query = Some(MeetingQuery::Completed);
            history.required = None;
            history.prev_data = None;
            history.prev_data_extra = None;
            history.prev_json_body = None;
            history.prev_date_json_body = None;
        }
        (MeetingQuery::MissingFields, data) => {
            let required = match data {
                ActionData::Required(required) => required,
                ActionData::Message(_) => RequiredFields::default(),
            };
            let reply = deps.responder.missing_fields(&required, history).await;
            history.messages.push(reply);
            history.query = Some(MeetingQuery::MissingFields);
            history.required = Some(required);
            history.prev_data = action.prev_data;
            history.prev_data_extra = action.prev_data_extra;
            history.prev_json_body = action.prev_json_body;
            history.prev_date_json_body = action.prev_date_json_body;
        }
        (MeetingQuery::EventNotFound, _) => {
            history
                .messages
                .push(ChatMessage::assistant(EVENT_NOT_FOUND_MESSAGE));
            history.query = Some(MeetingQuery::EventNotFound);
            history.required = None;
        }
        (MeetingQuery::Pending, _) => {}
    }
}
