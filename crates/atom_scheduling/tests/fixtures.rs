//! Test fixtures for the scheduling route tests

use atom_common::mock::{RecordingCalendarProvider, StaticServiceFactory, StaticSessionVerifier};
use atom_scheduling::extractor::{MeetingExtractor, OpenAiExtractor};
use atom_scheduling::mock::{InMemorySchedulingStore, RecordingIndexer};
use atom_scheduling::responder::TemplateResponder;
use atom_scheduling::SchedulingState;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub struct Fixture {
    pub state: Arc<SchedulingState>,
    pub calendar: Arc<RecordingCalendarProvider>,
    pub store: Arc<InMemorySchedulingStore>,
}

/// A user with a primary Google calendar, one contact and an email.
pub fn store() -> InMemorySchedulingStore {
    InMemorySchedulingStore::new()
        .with_calendar("user-1", "cal-1", "google")
        .with_contact("user-1", "Ada Lovelace", "ada@example.com")
        .with_contact_info("user-1", "max@atom.test", true)
}

/// State whose extractor talks to the chat-completions mock on `server`.
pub fn fixture(server: &MockServer, store: InMemorySchedulingStore) -> Fixture {
    let calendar = Arc::new(RecordingCalendarProvider::new());
    let store = Arc::new(store);
    let services = Arc::new(StaticServiceFactory {
        session_verifier: Some(Arc::new(
            StaticSessionVerifier::new().with_session("good", "user-1"),
        )),
        calendar_provider: Some(calendar.clone()),
        ..Default::default()
    });
    let extractor: Arc<dyn MeetingExtractor> = Arc::new(OpenAiExtractor::new(
        "sk-test".to_string(),
        None,
        Some(server.uri()),
    ));
    let state = Arc::new(SchedulingState {
        services,
        store: Some(store.clone()),
        extractor: Some(extractor),
        responder: Arc::new(TemplateResponder),
        indexer: Arc::new(RecordingIndexer::new()),
        calendar_resource: "google".to_string(),
        default_duration: 30,
    });
    Fixture {
        state,
        calendar,
        store,
    }
}

fn completion(content: &Value) -> Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content.to_string() },
            "finish_reason": "stop"
        }]
    })
}

/// Answers the user-input prompt with `params` and the date prompt with `date`.
pub async fn mount_extraction(server: &MockServer, params: Value, date: Value) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("You extract meeting details"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(&json!({
            "params": params
        }))))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("You extract date and time"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(&date)))
        .mount(server)
        .await;
}
