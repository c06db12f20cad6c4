#[cfg(test)]
mod tests {
    use crate::body::merge_into_previous;
    use crate::types::{BufferTime, MeetingAttendee, RecurrenceRule, ScheduleMeetingBody};
    use proptest::prelude::*;

    fn text() -> impl Strategy<Value = Option<String>> {
        prop::option::of(prop_oneof![Just(String::new()), "[a-z ]{1,12}"])
    }

    fn attendees() -> impl Strategy<Value = Vec<MeetingAttendee>> {
        prop::collection::vec(
            ("[a-z]{1,8}", any::<bool>()).prop_map(|(name, is_host)| MeetingAttendee {
                email: Some(format!("{}@example.com", name)),
                name: Some(name),
                is_host,
            }),
            0..3,
        )
    }

    prop_compose! {
        fn body()(
            (user_id, timezone, title, method, description, conference_app) in (
                prop_oneof![Just(String::new()), "user-[0-9]{1,3}"],
                prop_oneof![Just(String::new()), Just("Europe/Zurich".to_string())],
                text(),
                text(),
                text(),
                text(),
            ),
            (start_date, location, transparency, visibility) in (text(), text(), text(), text()),
            attendees in attendees(),
            duration in 0..120i64,
            before in prop::option::of(0..30i64),
            reminders in prop::collection::vec(0..60i64, 0..3),
            priority in 0..5i64,
            frequency in prop::option::of("(daily|weekly|monthly)"),
        ) -> ScheduleMeetingBody {
            ScheduleMeetingBody {
                user_id,
                timezone,
                title,
                attendees,
                method,
                duration,
                description,
                conference_app,
                start_date,
                buffer_time: before.map(|m| BufferTime { before_event: Some(m), after_event: None }),
                reminders,
                priority,
                time_preferences: Vec::new(),
                location,
                transparency,
                visibility,
                recur: frequency.map(|frequency| RecurrenceRule {
                    frequency,
                    interval: Some(1),
                    ..Default::default()
                }),
            }
        }
    }

    proptest! {
        // Merging the same new body twice changes nothing the second time
        #[test]
        fn test_merge_is_idempotent(prev in body(), new in body()) {
            let once = merge_into_previous(prev, &new);
            let twice = merge_into_previous(once.clone(), &new);
            prop_assert_eq!(once, twice);
        }

        // Fields that already hold a value survive the merge
        #[test]
        fn test_merge_keeps_filled_fields(prev in body(), new in body()) {
            let merged = merge_into_previous(prev.clone(), &new);
            if !prev.user_id.is_empty() {
                prop_assert_eq!(&merged.user_id, &prev.user_id);
            }
            if !prev.attendees.is_empty() {
                prop_assert_eq!(&merged.attendees, &prev.attendees);
            }
            if prev.duration > 0 {
                prop_assert_eq!(merged.duration, prev.duration);
            }
            if prev.title.as_deref().is_some_and(|t| !t.trim().is_empty()) {
                prop_assert_eq!(&merged.title, &prev.title);
            }
        }

        // Merging an empty body keeps every value
        #[test]
        fn test_merge_with_empty_body_keeps_values(prev in body()) {
            let merged = merge_into_previous(prev.clone(), &ScheduleMeetingBody::default());
            prop_assert_eq!(merged.duration, prev.duration);
            prop_assert_eq!(merged.reminders, prev.reminders);
            prop_assert_eq!(merged.recur, prev.recur);
        }
    }
}
