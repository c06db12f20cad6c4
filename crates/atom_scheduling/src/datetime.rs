// --- File: crates/atom_scheduling/src/datetime.rs ---
use chrono::{
    DateTime, Datelike, Duration, LocalResult, Months, NaiveDate, NaiveDateTime, NaiveTime,
    TimeZone, Timelike,
};
use chrono_tz::Tz;
use tracing::warn;

use crate::error::SchedulingError;
use crate::types::{DateParts, DateTimeJson, MeetingPreferences, UserInputParams};

pub const FALLBACK_DURATION_MINUTES: i64 = 30;

/// Parse an IANA zone name.
pub fn parse_timezone(name: &str) -> Result<Tz, SchedulingError> {
    name.parse::<Tz>()
        .map_err(|_| SchedulingError::Validation(format!("Unknown timezone: {}", name)))
}

/// The client's current time, moved into `tz`.
pub fn parse_current_time(value: &str, tz: Tz) -> Result<DateTime<Tz>, SchedulingError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&tz))
        .map_err(|e| SchedulingError::Validation(format!("Invalid userCurrentTime: {}", e)))
}

/// `HH:mm` (seconds allowed).
pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

/// An ISO date-time with or without offset.
pub fn parse_instant(value: &str, tz: Tz) -> Option<DateTime<Tz>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(value.trim()) {
        return Some(t.with_timezone(&tz));
    }
    NaiveDateTime::parse_from_str(value.trim(), "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value.trim(), "%Y-%m-%dT%H:%M"))
        .ok()
        .and_then(|naive| local(tz, naive))
}

fn local(tz: Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(t) => Some(t),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        // Inside a DST gap: shift past it.
        LocalResult::None => naive
            .checked_add_signed(Duration::hours(1))
            .and_then(|shifted| tz.from_local_datetime(&shifted).earliest()),
    }
}

/// `at` moved by `value` units; `None` for an unknown unit or when the
/// result leaves chrono's range.
fn shift(at: DateTime<Tz>, unit: &str, value: i64) -> Option<DateTime<Tz>> {
    let delta = match unit {
        "minute" | "min" => Duration::try_minutes(value),
        "hour" => Duration::try_hours(value),
        "day" => Duration::try_days(value),
        "week" => Duration::try_weeks(value),
        "month" | "year" => {
            let months = if unit == "year" { value.checked_mul(12)? } else { value };
            let months = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
            return if value >= 0 {
                at.checked_add_months(months)
            } else {
                at.checked_sub_months(months)
            };
        }
        _ => return None,
    };
    at.checked_add_signed(delta?)
}

/// Applies relative changes; a change that cannot be applied is skipped.
fn apply_relative(now: DateTime<Tz>, parts: &DateParts) -> DateTime<Tz> {
    let subtract = parts
        .relative_time_change_from_now
        .as_deref()
        .is_some_and(|c| c.eq_ignore_ascii_case("subtract"));
    let mut result = now;
    for change in parts.relative_time_from_now.iter().flatten() {
        let value = if subtract {
            change.value.checked_neg()
        } else {
            Some(change.value)
        };
        let unit = change.unit.trim().to_ascii_lowercase();
        match value.and_then(|v| shift(result, unit.trim_end_matches('s'), v)) {
            Some(shifted) => result = shifted,
            None => warn!(
                unit = %change.unit,
                value = change.value,
                "Skipping relative time change"
            ),
        }
    }
    result
}

fn explicit_time(parts: &DateParts) -> Option<NaiveTime> {
    if let Some(time) = parts.start_time.as_deref().and_then(parse_hhmm) {
        return Some(time);
    }
    parts
        .hour
        .and_then(|h| NaiveTime::from_hms_opt(h, parts.minute.unwrap_or(0), 0))
}

/// Resolve extracted date parts against `now`.
///
/// Absolute year/month/day override the current date; a weekday alone picks
/// its next occurrence; otherwise relative changes are applied. An explicit
/// `startTime` or hour/minute sets the time of day.
pub fn extrapolate_start_date(now: DateTime<Tz>, parts: &DateParts) -> DateTime<Tz> {
    let tz = now.timezone();
    let now = now.with_second(0).and_then(|t| t.with_nanosecond(0)).unwrap_or(now);
    let time = explicit_time(parts);

    let date: NaiveDate = if parts.year.is_some() || parts.month.is_some() || parts.day.is_some()
    {
        NaiveDate::from_ymd_opt(
            parts.year.unwrap_or(now.year()),
            parts.month.unwrap_or(now.month()),
            parts.day.unwrap_or(now.day()),
        )
        .unwrap_or(now.date_naive())
    } else if let Some(weekday) = parts.iso_weekday.filter(|d| (1..=7).contains(d)) {
        let today = now.weekday().number_from_monday();
        let mut days_ahead = (weekday + 7 - today) % 7;
        if days_ahead == 0 && time.map_or(true, |t| t <= now.time()) {
            days_ahead = 7;
        }
        now.date_naive() + Duration::days(i64::from(days_ahead))
    } else {
        let shifted = apply_relative(now, parts);
        match time {
            Some(t) => return local(tz, shifted.date_naive().and_time(t)).unwrap_or(shifted),
            None => return shifted,
        }
    };

    let time = time.unwrap_or(now.time());
    local(tz, date.and_time(time)).unwrap_or(now)
}

/// Like [`extrapolate_start_date`], but `None` when no part is given.
pub fn extrapolate_date(now: DateTime<Tz>, parts: Option<&DateParts>) -> Option<DateTime<Tz>> {
    parts
        .filter(|p| !p.is_empty())
        .map(|p| extrapolate_start_date(now, p))
}

/// Which conversational turn the duration is computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Pending,
    MissingFields,
}

fn hhmm_difference(date: &DateTimeJson) -> Option<i64> {
    let start = date.date.start_time.as_deref().and_then(parse_hhmm)?;
    let end = date.end_time.as_deref().and_then(parse_hhmm)?;
    Some((end - start).num_minutes()).filter(|m| *m > 0)
}

fn params_difference(params: &UserInputParams, tz: Tz) -> Option<i64> {
    let start = params.start_time.as_deref().and_then(|s| parse_instant(s, tz))?;
    let end = params.end_time.as_deref().and_then(|s| parse_instant(s, tz))?;
    Some((end - start).num_minutes()).filter(|m| *m > 0)
}

/// Meeting length in minutes.
///
/// Pending turn: explicit duration, `endTime - startTime`, the params'
/// start/end difference, the preference, then `fallback`. In the
/// missing-fields turn the preference is consulted before the params.
pub fn compute_duration(
    date: &DateTimeJson,
    params: &UserInputParams,
    prefs: Option<&MeetingPreferences>,
    tz: Tz,
    turn: Turn,
    fallback: i64,
) -> i64 {
    let explicit = date.duration.filter(|d| *d > 0);
    let preference = prefs.and_then(|p| p.duration).filter(|d| *d > 0);
    let from_params = || params_difference(params, tz);

    explicit
        .or_else(|| hhmm_difference(date))
        .or_else(|| match turn {
            Turn::Pending => from_params().or(preference),
            Turn::MissingFields => preference.or_else(from_params),
        })
        .unwrap_or(fallback)
}
