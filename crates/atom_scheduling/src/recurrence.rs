// --- File: crates/atom_scheduling/src/recurrence.rs ---
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::datetime::{extrapolate_date, parse_instant};
use crate::types::{present, RecurJson, RecurrenceParam, RecurrenceRule};

/// Build the recurrence rule of a meeting.
///
/// Only present when the extracted date JSON carries a frequency. A missing
/// interval or end date falls back to the params' `recurrence`, in the order
/// given.
pub fn build_recurrence(
    now: DateTime<Tz>,
    recur: Option<&RecurJson>,
    fallbacks: &[Option<&RecurrenceParam>],
) -> Option<RecurrenceRule> {
    let recur = recur?;
    let params = || fallbacks.iter().flatten();

    let frequency = present(&recur.frequency)?;
    let interval = recur
        .interval
        .or_else(|| params().find_map(|p| p.interval));
    let end_date = extrapolate_date(now, recur.end_date.as_ref())
        .map(|d| d.to_rfc3339())
        .or_else(|| params().find_map(|p| present(&p.end_date)));

    Some(RecurrenceRule {
        frequency: frequency.to_ascii_lowercase(),
        interval,
        by_week_day: recur.by_week_day.clone().filter(|d| !d.is_empty()),
        by_month_day: recur.by_month_day.clone().filter(|d| !d.is_empty()),
        occurrence: recur.occurrence.filter(|o| *o > 0),
        end_date,
    })
}

/// `MO`, `monday`, `Mon` -> `MO`
pub(crate) fn week_day_code(day: &str) -> Option<String> {
    let code: String = day.trim().chars().take(2).collect::<String>().to_ascii_uppercase();
    matches!(code.as_str(), "MO" | "TU" | "WE" | "TH" | "FR" | "SA" | "SU").then_some(code)
}

/// RFC 5545 recurrence lines for the calendar API.
///
/// `None` without a frequency or an interval. `COUNT` and `UNTIL` are
/// mutually exclusive; the occurrence count wins.
pub fn create_rrule_string(rule: &RecurrenceRule, tz: Tz) -> Option<Vec<String>> {
    let frequency = rule.frequency.trim();
    if frequency.is_empty() {
        return None;
    }
    let interval = rule.interval.filter(|i| *i > 0)?;

    let mut parts = vec![
        format!("FREQ={}", frequency.to_ascii_uppercase()),
        format!("INTERVAL={}", interval),
    ];

    let days: Vec<String> = rule
        .by_week_day
        .iter()
        .flatten()
        .filter_map(|d| week_day_code(d))
        .collect();
    if !days.is_empty() {
        parts.push(format!("BYDAY={}", days.join(",")));
    }

    if let Some(month_days) = rule.by_month_day.as_ref().filter(|d| !d.is_empty()) {
        let month_days: Vec<String> = month_days.iter().map(i64::to_string).collect();
        parts.push(format!("BYMONTHDAY={}", month_days.join(",")));
    }

    if let Some(count) = rule.occurrence.filter(|o| *o > 0) {
        parts.push(format!("COUNT={}", count));
    } else if let Some(until) = rule
        .end_date
        .as_deref()
        .and_then(|d| parse_instant(d, tz))
    {
        parts.push(format!(
            "UNTIL={}",
            until.with_timezone(&Utc).format("%Y%m%dT%H%M%SZ")
        ));
    }

    Some(vec![format!("RRULE:{}", parts.join(";"))])
}
