// --- File: crates/atom_scheduling/src/body.rs ---
//! Assembling the partial meeting request from extracted JSON, the previous
//! turn and the user's meeting preferences.

use chrono::DateTime;
use chrono_tz::Tz;

use crate::datetime::{compute_duration, extrapolate_start_date, Turn};
use crate::recurrence::build_recurrence;
use crate::types::{
    present, DateTimeJson, MeetingPreferences, RecurrenceParam, ScheduleMeetingBody,
    UserInputJson, UserInputParams,
};

/// Inputs shared by both body builders.
pub struct BodyContext<'a> {
    pub user_id: &'a str,
    pub now: DateTime<Tz>,
    pub prefs: Option<&'a MeetingPreferences>,
    pub default_duration: i64,
}

fn assemble(
    ctx: &BodyContext<'_>,
    params: &UserInputParams,
    date: &DateTimeJson,
    turn: Turn,
    recurrence_fallbacks: &[Option<&RecurrenceParam>],
) -> ScheduleMeetingBody {
    let tz = ctx.now.timezone();
    let prefs = ctx.prefs;
    let start_date = present(&params.start_time)
        .unwrap_or_else(|| extrapolate_start_date(ctx.now, &date.date).to_rfc3339());

    ScheduleMeetingBody {
        user_id: ctx.user_id.to_string(),
        timezone: tz.name().to_string(),
        title: params.title_candidate(),
        attendees: params.attendees.clone().unwrap_or_default(),
        method: present(&date.method),
        duration: compute_duration(date, params, prefs, tz, turn, ctx.default_duration),
        description: present(&params.description).or_else(|| present(&params.notes)),
        conference_app: params
            .conference
            .as_ref()
            .and_then(|c| present(&c.app))
            .or_else(|| prefs.and_then(|p| present(&p.conference_app))),
        start_date: Some(start_date),
        buffer_time: params
            .buffer_time
            .clone()
            .or_else(|| prefs.and_then(|p| p.buffer_time.clone())),
        reminders: params
            .alarms
            .clone()
            .filter(|a| !a.is_empty())
            .or_else(|| prefs.and_then(|p| p.reminders.clone()))
            .unwrap_or_default(),
        priority: params.priority.filter(|p| *p > 0).unwrap_or(1),
        time_preferences: date.time_preferences.clone().unwrap_or_default(),
        location: present(&params.location),
        transparency: present(&params.transparency),
        visibility: present(&params.visibility),
        recur: build_recurrence(ctx.now, date.recur.as_ref(), recurrence_fallbacks),
    }
}

/// Body for the first turn of a scheduling request.
pub fn build_body_pending(
    ctx: &BodyContext<'_>,
    input: &UserInputJson,
    date: &DateTimeJson,
) -> ScheduleMeetingBody {
    assemble(
        ctx,
        &input.params,
        date,
        Turn::Pending,
        &[input.params.recurrence.as_ref()],
    )
}

/// Body for a turn answering a missing-fields request: every field is taken
/// from the new extraction first and from the previous turn's extraction
/// second.
pub fn build_body_missing_fields(
    ctx: &BodyContext<'_>,
    input: &UserInputJson,
    date: &DateTimeJson,
    prev_input: Option<&UserInputJson>,
    prev_date: Option<&DateTimeJson>,
) -> ScheduleMeetingBody {
    let empty_params = UserInputParams::default();
    let prev_params = prev_input.map_or(&empty_params, |p| &p.params);
    let params = input.params.or(prev_params);
    let date = match prev_date {
        Some(prev) => date.or(prev),
        None => date.clone(),
    };

    let mut body = assemble(
        ctx,
        &params,
        &date,
        Turn::MissingFields,
        &[
            prev_params.recurrence.as_ref(),
            input.params.recurrence.as_ref(),
        ],
    );
    body.title = input
        .params
        .title_candidate()
        .or_else(|| prev_params.title_candidate());
    body
}

/// Fill every empty field of `prev` from `new`.
///
/// Fields that already hold a value are never overwritten, so merging the
/// same `new` body again leaves the result unchanged.
pub fn merge_into_previous(
    prev: ScheduleMeetingBody,
    new: &ScheduleMeetingBody,
) -> ScheduleMeetingBody {
    fn text(prev: Option<String>, new: &Option<String>) -> Option<String> {
        present(&prev).or_else(|| present(new))
    }

    ScheduleMeetingBody {
        user_id: if prev.user_id.is_empty() {
            new.user_id.clone()
        } else {
            prev.user_id
        },
        timezone: if prev.timezone.is_empty() {
            new.timezone.clone()
        } else {
            prev.timezone
        },
        title: text(prev.title, &new.title),
        attendees: if prev.attendees.is_empty() {
            new.attendees.clone()
        } else {
            prev.attendees
        },
        method: text(prev.method, &new.method),
        duration: if prev.duration > 0 {
            prev.duration
        } else {
            new.duration
        },
        description: text(prev.description, &new.description),
        conference_app: text(prev.conference_app, &new.conference_app),
        start_date: text(prev.start_date, &new.start_date),
        buffer_time: prev.buffer_time.or_else(|| new.buffer_time.clone()),
        reminders: if prev.reminders.is_empty() {
            new.reminders.clone()
        } else {
            prev.reminders
        },
        priority: if prev.priority > 0 {
            prev.priority
        } else {
            new.priority
        },
        time_preferences: if prev.time_preferences.is_empty() {
            new.time_preferences.clone()
        } else {
            prev.time_preferences
        },
        location: text(prev.location, &new.location),
        transparency: text(prev.transparency, &new.transparency),
        visibility: text(prev.visibility, &new.visibility),
        recur: prev.recur.or_else(|| new.recur.clone()),
    }
}
