#[cfg(test)]
mod tests {
    use crate::error::SchedulingError;
    use crate::extractor::MockMeetingExtractor;
    use crate::mock::{InMemorySchedulingStore, RecordingIndexer};
    use crate::pipeline::{schedule_meeting_control_center, SchedulingDeps};
    use crate::responder::TemplateResponder;
    use crate::types::{
        BufferTime, ChatMessage, ChatRole, ConferenceParam, DateParts, DateTimeJson,
        MeetingAttendee, MeetingPreferences, MeetingQuery, RequiredField, ScheduleMeetingBody,
        SkillMessageHistory, UserInputJson, UserInputParams,
    };
    use atom_common::mock::RecordingCalendarProvider;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    const USER: &str = "user-1";
    const TZ: &str = "Europe/Zurich";
    // Wednesday
    const NOW: &str = "2026-03-04T10:15:00+01:00";

    struct Harness {
        store: Arc<InMemorySchedulingStore>,
        calendar: Arc<RecordingCalendarProvider>,
        indexer: Arc<RecordingIndexer>,
    }

    impl Harness {
        fn new(store: InMemorySchedulingStore) -> Self {
            Self {
                store: Arc::new(store),
                calendar: Arc::new(RecordingCalendarProvider::new()),
                indexer: Arc::new(RecordingIndexer::new()),
            }
        }

        fn deps(&self, extractor: MockMeetingExtractor) -> SchedulingDeps {
            SchedulingDeps {
                store: self.store.clone(),
                calendar: self.calendar.clone(),
                extractor: Arc::new(extractor),
                responder: Arc::new(TemplateResponder),
                indexer: self.indexer.clone(),
                calendar_resource: "google".to_string(),
                default_duration: 30,
            }
        }
    }

    fn seeded_store() -> InMemorySchedulingStore {
        InMemorySchedulingStore::new()
            .with_calendar(USER, "cal-1", "google")
            .with_contact(USER, "Ada Lovelace", "ada@example.com")
            .with_contact_info(USER, "max@atom.test", true)
            .with_user(USER, "Max", "max@atom.test")
    }

    fn ada() -> MeetingAttendee {
        MeetingAttendee {
            name: Some("Ada".to_string()),
            ..Default::default()
        }
    }

    fn friday_nine() -> DateTimeJson {
        DateTimeJson {
            date: DateParts {
                iso_weekday: Some(5),
                hour: Some(9),
                ..Default::default()
            },
            duration: Some(30),
            ..Default::default()
        }
    }

    fn history(messages: &[(ChatRole, &str)]) -> SkillMessageHistory {
        SkillMessageHistory {
            messages: messages
                .iter()
                .map(|(role, content)| ChatMessage {
                    role: *role,
                    content: content.to_string(),
                })
                .collect(),
            ..Default::default()
        }
    }

    fn pending_extractor(input: UserInputJson, date: DateTimeJson) -> MockMeetingExtractor {
        let mut extractor = MockMeetingExtractor::new();
        extractor
            .expect_extract_pending()
            .times(1)
            .returning(move |_, _, _| Ok((input.clone(), date.clone())));
        extractor
    }

    async fn run_pending(
        harness: &Harness,
        input: UserInputJson,
        date: DateTimeJson,
    ) -> Result<SkillMessageHistory, SchedulingError> {
        let deps = harness.deps(pending_extractor(input, date));
        schedule_meeting_control_center(
            &deps,
            USER,
            TZ,
            history(&[(ChatRole::User, "Set up a meeting with Ada on Friday at 9")]),
            NOW,
            MeetingQuery::Pending,
        )
        .await
    }

    #[tokio::test]
    async fn test_missing_title_asks_and_never_calls_calendar() {
        let harness = Harness::new(seeded_store());
        let input = UserInputJson {
            params: UserInputParams {
                attendees: Some(vec![ada()]),
                ..Default::default()
            },
        };

        let result = run_pending(&harness, input, friday_nine()).await.unwrap();

        assert!(harness.calendar.created().is_empty());
        assert!(harness.store.written().events.is_empty());
        assert_eq!(result.query, Some(MeetingQuery::MissingFields));
        let required = result.required.unwrap();
        assert_eq!(required.required, vec![RequiredField::title()]);
        let prev = result.prev_data.unwrap();
        assert_eq!(prev.attendees[0].email.as_deref(), Some("ada@example.com"));
        assert!(result.prev_json_body.is_some());
        assert!(result.prev_date_json_body.is_some());
        let reply = result.messages.last().unwrap();
        assert_eq!(reply.role, ChatRole::Assistant);
        assert!(reply.content.contains("a title for the meeting"));
    }

    #[tokio::test]
    async fn test_missing_attendees_asks_and_never_calls_calendar() {
        let harness = Harness::new(seeded_store());
        let input = UserInputJson {
            params: UserInputParams {
                title: Some("Planning".to_string()),
                ..Default::default()
            },
        };

        let result = run_pending(&harness, input, friday_nine()).await.unwrap();

        assert!(harness.calendar.created().is_empty());
        assert_eq!(
            result.required.unwrap().required,
            vec![RequiredField::attendees()]
        );
    }

    #[tokio::test]
    async fn test_unknown_attendee_asks_for_name_or_email() {
        let harness = Harness::new(seeded_store());
        let input = UserInputJson {
            params: UserInputParams {
                title: Some("Planning".to_string()),
                attendees: Some(vec![MeetingAttendee {
                    name: Some("Grace".to_string()),
                    ..Default::default()
                }]),
                ..Default::default()
            },
        };

        let result = run_pending(&harness, input, friday_nine()).await.unwrap();

        assert!(harness.calendar.created().is_empty());
        let required = result.required.unwrap().required;
        assert_eq!(required.len(), 1);
        assert_eq!(required[0].value, "name/email");
        assert!(result.prev_data.unwrap().attendees.is_empty());
    }

    #[tokio::test]
    async fn test_missing_host_email_asks_for_it() {
        let store = InMemorySchedulingStore::new().with_calendar(USER, "cal-1", "google");
        let harness = Harness::new(store);
        let input = UserInputJson {
            params: UserInputParams {
                title: Some("Planning".to_string()),
                attendees: Some(vec![MeetingAttendee {
                    email: Some("grace@example.com".to_string()),
                    ..Default::default()
                }]),
                ..Default::default()
            },
        };

        let result = run_pending(&harness, input, friday_nine()).await.unwrap();

        assert!(harness.calendar.created().is_empty());
        assert_eq!(result.required.unwrap().required[0].value, "email");
    }

    #[tokio::test]
    async fn test_no_attendees_and_no_host_email_asks_for_both() {
        let store = InMemorySchedulingStore::new().with_calendar(USER, "cal-1", "google");
        let harness = Harness::new(store);
        let input = UserInputJson {
            params: UserInputParams {
                title: Some("Planning".to_string()),
                ..Default::default()
            },
        };

        let result = run_pending(&harness, input, friday_nine()).await.unwrap();

        assert!(harness.calendar.created().is_empty());
        assert_eq!(result.query, Some(MeetingQuery::MissingFields));
        assert_eq!(
            result.required.unwrap().required,
            vec![RequiredField::attendees(), RequiredField::attendee_part(1)]
        );
    }

    #[tokio::test]
    async fn test_schedules_meeting_with_buffers_and_side_effects() {
        let harness = Harness::new(seeded_store());
        let input = UserInputJson {
            params: UserInputParams {
                title: Some("Roadmap".to_string()),
                attendees: Some(vec![ada()]),
                alarms: Some(vec![10]),
                priority: Some(2),
                conference: Some(ConferenceParam {
                    app: Some("google".to_string()),
                }),
                buffer_time: Some(BufferTime {
                    before_event: Some(10),
                    after_event: Some(5),
                }),
                ..Default::default()
            },
        };

        let result = run_pending(&harness, input, friday_nine()).await.unwrap();

        assert_eq!(result.query, Some(MeetingQuery::Completed));
        assert_eq!(result.required, None);
        assert_eq!(result.prev_data, None);
        assert_eq!(
            result.messages.last().unwrap().content,
            "Successfully scheduled meeting."
        );

        let created = harness.calendar.created();
        assert_eq!(created.len(), 3);
        let (user, calendar_id, main) = &created[0];
        assert_eq!(user, USER);
        assert_eq!(calendar_id, "cal-1");
        assert_eq!(main.summary.as_deref(), Some("Roadmap"));
        assert_eq!(main.description.as_deref(), Some("Roadmap"));
        assert_eq!(main.start, Utc.with_ymd_and_hms(2026, 3, 6, 8, 0, 0).unwrap());
        assert_eq!(main.end, Utc.with_ymd_and_hms(2026, 3, 6, 8, 30, 0).unwrap());
        assert_eq!(main.time_zone, TZ);
        assert_eq!(main.reminder_minutes, Some(vec![10]));
        assert!(main.conference.is_some());
        let emails: Vec<(&str, bool)> = main
            .attendees
            .iter()
            .map(|a| (a.email.as_str(), a.organizer))
            .collect();
        assert_eq!(
            emails,
            vec![("ada@example.com", false), ("max@atom.test", true)]
        );

        let (_, _, pre) = &created[1];
        assert_eq!(pre.summary.as_deref(), Some("Buffer time"));
        assert_eq!(pre.start, Utc.with_ymd_and_hms(2026, 3, 6, 7, 50, 0).unwrap());
        assert_eq!(pre.end, main.start);
        let (_, _, post) = &created[2];
        assert_eq!(post.start, main.end);
        assert_eq!(post.end, Utc.with_ymd_and_hms(2026, 3, 6, 8, 35, 0).unwrap());

        let written = harness.store.written();
        assert_eq!(written.events.len(), 3);
        let main_row = &written.events[0];
        assert_eq!(main_row.id, "evt-1#cal-1");
        assert_eq!(main_row.event_id.as_deref(), Some("evt-1"));
        assert_eq!(main_row.pre_event_id.as_deref(), Some("evt-2#cal-1"));
        assert_eq!(main_row.post_event_id.as_deref(), Some("evt-3#cal-1"));
        assert!(main_row.modifiable);
        assert_eq!(main_row.priority, 2);
        assert!(written.events[1].is_pre_event);
        assert!(written.events[2].is_post_event);
        assert_eq!(
            written.events[1].for_event_id.as_deref(),
            Some("evt-1#cal-1")
        );

        assert_eq!(written.reminders.len(), 1);
        assert_eq!(written.reminders[0].minutes, 10);
        assert_eq!(written.reminders[0].event_id, "evt-1#cal-1");
        assert_eq!(written.attendees.len(), 2);
        assert!(written.attendees.iter().all(|a| a.event_id == "evt-1#cal-1"));
        assert_eq!(written.attendees[0].contact_id.as_deref(), Some("contact-1"));
        assert_eq!(written.conferences.len(), 1);
        assert_eq!(written.conferences[0].app, "google");
        assert!(written.conferences[0]
            .join_url
            .as_deref()
            .is_some_and(|u| u.starts_with("https://meet.google.com/")));
        assert_eq!(main_row.conference_id, Some(written.conferences[0].id.clone()));

        assert_eq!(harness.indexer.train_events().len(), 1);
        assert_eq!(harness.indexer.all_events().len(), 1);
        assert_eq!(harness.indexer.all_events()[0].event_id, "evt-1#cal-1");
    }

    #[tokio::test]
    async fn test_low_priority_meeting_skips_training_index() {
        let harness = Harness::new(seeded_store());
        let input = UserInputJson {
            params: UserInputParams {
                title: Some("Coffee".to_string()),
                attendees: Some(vec![ada()]),
                ..Default::default()
            },
        };

        run_pending(&harness, input, friday_nine()).await.unwrap();

        assert_eq!(harness.calendar.created().len(), 1);
        assert!(harness.indexer.train_events().is_empty());
        assert_eq!(harness.indexer.all_events().len(), 1);
        assert!(!harness.store.written().events[0].modifiable);
    }

    #[tokio::test]
    async fn test_index_and_preference_failures_do_not_fail_the_turn() {
        let harness = Harness::new(seeded_store());
        harness.indexer.fail_indexing(true);
        harness.store.fail_preferences(true);
        let input = UserInputJson {
            params: UserInputParams {
                title: Some("Coffee".to_string()),
                attendees: Some(vec![ada()]),
                ..Default::default()
            },
        };

        let result = run_pending(&harness, input, friday_nine()).await.unwrap();

        assert_eq!(result.query, Some(MeetingQuery::Completed));
        assert_eq!(harness.store.written().events.len(), 1);
    }

    #[tokio::test]
    async fn test_preferences_fill_reminders_and_duration() {
        let store = seeded_store().with_preferences(MeetingPreferences {
            user_id: Some(USER.to_string()),
            name: Some("Max M.".to_string()),
            reminders: Some(vec![30]),
            duration: Some(50),
            send_updates: Some("all".to_string()),
            ..Default::default()
        });
        let harness = Harness::new(store);
        let input = UserInputJson {
            params: UserInputParams {
                title: Some("Coffee".to_string()),
                attendees: Some(vec![ada()]),
                ..Default::default()
            },
        };
        let date = DateTimeJson {
            duration: None,
            ..friday_nine()
        };

        run_pending(&harness, input, date).await.unwrap();

        let created = harness.calendar.created();
        let (_, _, event) = &created[0];
        assert_eq!(event.end - event.start, chrono::Duration::minutes(50));
        assert_eq!(event.reminder_minutes, Some(vec![30]));
        assert_eq!(event.send_updates.as_deref(), Some("all"));
        assert_eq!(event.attendees[1].display_name.as_deref(), Some("Max M."));
    }

    #[tokio::test]
    async fn test_out_of_range_duration_is_validation_error() {
        let harness = Harness::new(seeded_store());
        let input = UserInputJson {
            params: UserInputParams {
                title: Some("Coffee".to_string()),
                attendees: Some(vec![ada()]),
                ..Default::default()
            },
        };
        let date = DateTimeJson {
            duration: Some(i64::MAX / 2),
            ..friday_nine()
        };

        let err = run_pending(&harness, input, date).await.unwrap_err();

        assert!(matches!(err, SchedulingError::Validation(_)));
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert!(harness.calendar.created().is_empty());
        assert!(harness.store.written().events.is_empty());
    }

    #[tokio::test]
    async fn test_out_of_range_buffer_fails_before_any_calendar_call() {
        let harness = Harness::new(seeded_store());
        let input = UserInputJson {
            params: UserInputParams {
                title: Some("Coffee".to_string()),
                attendees: Some(vec![ada()]),
                buffer_time: Some(BufferTime {
                    before_event: None,
                    after_event: Some(i64::MAX),
                }),
                ..Default::default()
            },
        };

        let err = run_pending(&harness, input, friday_nine()).await.unwrap_err();

        assert!(matches!(err, SchedulingError::Validation(_)));
        assert!(harness.calendar.created().is_empty());
        assert!(harness.store.written().events.is_empty());
    }

    #[tokio::test]
    async fn test_no_primary_calendar_is_an_error() {
        let store = InMemorySchedulingStore::new()
            .with_contact(USER, "Ada Lovelace", "ada@example.com")
            .with_contact_info(USER, "max@atom.test", true);
        let harness = Harness::new(store);
        let input = UserInputJson {
            params: UserInputParams {
                title: Some("Coffee".to_string()),
                attendees: Some(vec![ada()]),
                ..Default::default()
            },
        };

        let err = run_pending(&harness, input, friday_nine()).await.unwrap_err();

        assert!(matches!(err, SchedulingError::NoPrimaryCalendar(_)));
        assert_eq!(err.code(), "PRIMARY_CALENDAR_NOT_FOUND");
        assert!(harness.calendar.created().is_empty());
    }

    #[tokio::test]
    async fn test_answer_to_missing_fields_completes_meeting() {
        let harness = Harness::new(seeded_store());
        let mut extractor = MockMeetingExtractor::new();
        extractor
            .expect_extract_missing_fields()
            .withf(|input, prior_user, prior_assistant, _, _| {
                input.to_string() == "Call it Roadmap sync"
                    && prior_user.to_string() == "Meet Ada on Friday at 9"
                    && prior_assistant.to_string()
                        == "To schedule this meeting I still need a title for the meeting."
            })
            .times(1)
            .returning(|_, _, _, _, _| {
                Ok((
                    UserInputJson {
                        params: UserInputParams {
                            title: Some("Roadmap sync".to_string()),
                            ..Default::default()
                        },
                    },
                    DateTimeJson::default(),
                ))
            });
        let deps = harness.deps(extractor);

        let mut turn = history(&[
            (ChatRole::User, "Meet Ada on Friday at 9"),
            (
                ChatRole::Assistant,
                "To schedule this meeting I still need a title for the meeting.",
            ),
            (ChatRole::User, "Call it Roadmap sync"),
        ]);
        turn.query = Some(MeetingQuery::MissingFields);
        turn.prev_data = Some(ScheduleMeetingBody {
            user_id: USER.to_string(),
            timezone: TZ.to_string(),
            attendees: vec![MeetingAttendee {
                name: Some("Ada".to_string()),
                email: Some("ada@example.com".to_string()),
                is_host: false,
            }],
            duration: 30,
            start_date: Some("2026-03-06T09:00:00+01:00".to_string()),
            priority: 1,
            ..Default::default()
        });
        turn.prev_json_body = Some(UserInputJson {
            params: UserInputParams {
                attendees: Some(vec![ada()]),
                ..Default::default()
            },
        });
        turn.prev_date_json_body = Some(friday_nine());

        let result = schedule_meeting_control_center(
            &deps,
            USER,
            TZ,
            turn,
            NOW,
            MeetingQuery::MissingFields,
        )
        .await
        .unwrap();

        assert_eq!(result.query, Some(MeetingQuery::Completed));
        let created = harness.calendar.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].2.summary.as_deref(), Some("Roadmap sync"));
        assert_eq!(
            created[0].2.start,
            Utc.with_ymd_and_hms(2026, 3, 6, 8, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_answer_with_trailing_newline_uses_prior_request() {
        let harness = Harness::new(seeded_store());
        let mut extractor = MockMeetingExtractor::new();
        extractor
            .expect_extract_missing_fields()
            .withf(|input, prior_user, prior_assistant, _, _| {
                input.to_string() == "Budget review"
                    && prior_user.to_string() == "Meet Ada friday"
                    && prior_assistant.to_string() == "What is the title?"
            })
            .times(1)
            .returning(|_, _, _, _, _| {
                Ok((
                    UserInputJson {
                        params: UserInputParams {
                            title: Some("Budget review".to_string()),
                            ..Default::default()
                        },
                    },
                    DateTimeJson::default(),
                ))
            });
        let deps = harness.deps(extractor);

        let mut turn = history(&[
            (ChatRole::User, "Meet Ada friday"),
            (ChatRole::Assistant, "What is the title?"),
            (ChatRole::User, "Budget review\n"),
        ]);
        turn.query = Some(MeetingQuery::MissingFields);
        turn.prev_data = Some(ScheduleMeetingBody {
            user_id: USER.to_string(),
            timezone: TZ.to_string(),
            attendees: vec![MeetingAttendee {
                name: Some("Ada".to_string()),
                email: Some("ada@example.com".to_string()),
                is_host: false,
            }],
            duration: 30,
            start_date: Some("2026-03-06T09:00:00+01:00".to_string()),
            priority: 1,
            ..Default::default()
        });
        turn.prev_json_body = Some(UserInputJson {
            params: UserInputParams {
                attendees: Some(vec![ada()]),
                ..Default::default()
            },
        });
        turn.prev_date_json_body = Some(friday_nine());

        let result = schedule_meeting_control_center(
            &deps,
            USER,
            TZ,
            turn,
            NOW,
            MeetingQuery::MissingFields,
        )
        .await
        .unwrap();

        assert_eq!(result.query, Some(MeetingQuery::Completed));
        let created = harness.calendar.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].2.summary.as_deref(), Some("Budget review"));
    }

    #[tokio::test]
    async fn test_missing_fields_without_prior_exchange_is_rejected() {
        let harness = Harness::new(seeded_store());
        let deps = harness.deps(MockMeetingExtractor::new());

        let err = schedule_meeting_control_center(
            &deps,
            USER,
            TZ,
            history(&[(ChatRole::User, "Call it Roadmap sync")]),
            NOW,
            MeetingQuery::MissingFields,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, SchedulingError::MissingContext));
    }

    #[tokio::test]
    async fn test_finished_conversation_is_returned_unchanged() {
        let harness = Harness::new(seeded_store());
        let deps = harness.deps(MockMeetingExtractor::new());
        let mut done = history(&[
            (ChatRole::User, "Meet Ada"),
            (ChatRole::Assistant, "Successfully scheduled meeting."),
        ]);
        done.query = Some(MeetingQuery::Completed);

        let result = schedule_meeting_control_center(
            &deps,
            USER,
            TZ,
            done.clone(),
            NOW,
            MeetingQuery::Completed,
        )
        .await
        .unwrap();

        assert_eq!(result, done);
    }

    #[tokio::test]
    async fn test_blank_user_message_is_validation_error() {
        let harness = Harness::new(seeded_store());
        let deps = harness.deps(MockMeetingExtractor::new());

        let err = schedule_meeting_control_center(
            &deps,
            USER,
            TZ,
            history(&[(ChatRole::User, "   ")]),
            NOW,
            MeetingQuery::Pending,
        )
        .await
        .unwrap_err();

        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
}
