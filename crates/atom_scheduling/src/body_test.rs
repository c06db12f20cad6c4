#[cfg(test)]
mod tests {
    use crate::body::{build_body_missing_fields, build_body_pending, merge_into_previous, BodyContext};
    use crate::datetime::parse_current_time;
    use crate::types::{
        BufferTime, ConferenceParam, DateParts, DateTimeJson, MeetingAttendee, MeetingPreferences,
        RecurJson, ScheduleMeetingBody, TaskItem, UserInputJson, UserInputParams,
    };
    use chrono_tz::Tz;

    fn prefs() -> MeetingPreferences {
        MeetingPreferences {
            user_id: Some("user-1".to_string()),
            reminders: Some(vec![10]),
            duration: Some(45),
            conference_app: Some("google".to_string()),
            buffer_time: Some(BufferTime {
                before_event: Some(5),
                after_event: None,
            }),
            ..Default::default()
        }
    }

    fn ctx(prefs: Option<&MeetingPreferences>) -> BodyContext<'_> {
        BodyContext {
            user_id: "user-1",
            now: parse_current_time("2026-03-04T10:15:00+01:00", Tz::Europe__Zurich).unwrap(),
            prefs,
            default_duration: 30,
        }
    }

    fn attendee(name: &str) -> MeetingAttendee {
        MeetingAttendee {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_pending_body_uses_preferences_as_defaults() {
        let prefs = prefs();
        let input = UserInputJson {
            params: UserInputParams {
                task_list: Some(vec![TaskItem {
                    task: "Quarterly review".to_string(),
                }]),
                attendees: Some(vec![attendee("Ada")]),
                ..Default::default()
            },
        };
        let date = DateTimeJson {
            date: DateParts {
                iso_weekday: Some(5),
                start_time: Some("09:30".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        let body = build_body_pending(&ctx(Some(&prefs)), &input, &date);

        assert_eq!(body.user_id, "user-1");
        assert_eq!(body.timezone, "Europe/Zurich");
        assert_eq!(body.title.as_deref(), Some("Quarterly review"));
        assert_eq!(body.start_date.as_deref(), Some("2026-03-06T09:30:00+01:00"));
        assert_eq!(body.duration, 45);
        assert_eq!(body.reminders, vec![10]);
        assert_eq!(body.priority, 1);
        assert_eq!(body.conference_app.as_deref(), Some("google"));
        assert_eq!(body.buffer_time.and_then(|b| b.before()), Some(5));
        assert!(body.recur.is_none());
    }

    #[test]
    fn test_pending_body_explicit_values_win() {
        let prefs = prefs();
        let input = UserInputJson {
            params: UserInputParams {
                title: Some("Standup".to_string()),
                summary: Some("ignored".to_string()),
                alarms: Some(vec![1, 15]),
                priority: Some(3),
                conference: Some(ConferenceParam {
                    app: Some("zoom".to_string()),
                }),
                start_time: Some("2026-03-05T08:00:00+01:00".to_string()),
                ..Default::default()
            },
        };
        let date = DateTimeJson {
            duration: Some(15),
            recur: Some(RecurJson {
                frequency: Some("daily".to_string()),
                interval: Some(1),
                ..Default::default()
            }),
            ..Default::default()
        };

        let body = build_body_pending(&ctx(Some(&prefs)), &input, &date);

        assert_eq!(body.title.as_deref(), Some("Standup"));
        assert_eq!(body.start_date.as_deref(), Some("2026-03-05T08:00:00+01:00"));
        assert_eq!(body.duration, 15);
        assert_eq!(body.reminders, vec![1, 15]);
        assert_eq!(body.priority, 3);
        assert_eq!(body.conference_app.as_deref(), Some("zoom"));
        assert_eq!(body.recur.map(|r| r.frequency), Some("daily".to_string()));
    }

    #[test]
    fn test_pending_body_without_preferences() {
        let body = build_body_pending(&ctx(None), &UserInputJson::default(), &DateTimeJson::default());
        assert_eq!(body.title, None);
        assert!(body.attendees.is_empty());
        assert!(body.reminders.is_empty());
        assert_eq!(body.duration, 30);
        assert_eq!(body.start_date.as_deref(), Some("2026-03-04T10:15:00+01:00"));
    }

    #[test]
    fn test_missing_fields_body_combines_turns() {
        let previous = UserInputJson {
            params: UserInputParams {
                attendees: Some(vec![attendee("Ada")]),
                description: Some("Roadmap".to_string()),
                ..Default::default()
            },
        };
        let previous_date = DateTimeJson {
            date: DateParts {
                day: Some(12),
                hour: Some(14),
                ..Default::default()
            },
            ..Default::default()
        };
        let answer = UserInputJson {
            params: UserInputParams {
                title: Some("Roadmap sync".to_string()),
                ..Default::default()
            },
        };

        let body = build_body_missing_fields(
            &ctx(None),
            &answer,
            &DateTimeJson::default(),
            Some(&previous),
            Some(&previous_date),
        );

        assert_eq!(body.title.as_deref(), Some("Roadmap sync"));
        assert_eq!(body.attendees, vec![attendee("Ada")]);
        assert_eq!(body.description.as_deref(), Some("Roadmap"));
        assert_eq!(body.start_date.as_deref(), Some("2026-03-12T14:00:00+01:00"));
    }

    #[test]
    fn test_missing_fields_title_falls_back_to_previous_turn() {
        let previous = UserInputJson {
            params: UserInputParams {
                summary: Some("Hiring loop".to_string()),
                ..Default::default()
            },
        };
        let body = build_body_missing_fields(
            &ctx(None),
            &UserInputJson::default(),
            &DateTimeJson::default(),
            Some(&previous),
            None,
        );
        assert_eq!(body.title.as_deref(), Some("Hiring loop"));
    }

    #[test]
    fn test_merge_fills_only_empty_fields() {
        let prev = ScheduleMeetingBody {
            user_id: "user-1".to_string(),
            timezone: "Europe/Zurich".to_string(),
            title: None,
            attendees: vec![attendee("Ada")],
            duration: 30,
            ..Default::default()
        };
        let new = ScheduleMeetingBody {
            user_id: "user-2".to_string(),
            title: Some("Design review".to_string()),
            attendees: vec![attendee("Grace")],
            duration: 60,
            reminders: vec![5],
            location: Some("Room 4".to_string()),
            ..Default::default()
        };

        let merged = merge_into_previous(prev, &new);

        assert_eq!(merged.user_id, "user-1");
        assert_eq!(merged.title.as_deref(), Some("Design review"));
        assert_eq!(merged.attendees, vec![attendee("Ada")]);
        assert_eq!(merged.duration, 30);
        assert_eq!(merged.reminders, vec![5]);
        assert_eq!(merged.location.as_deref(), Some("Room 4"));
    }
}
