// --- File: crates/atom_scheduling/src/extractor.rs ---
//! Turning a chat message into `UserInputJson` and `DateTimeJson`.

use async_trait::async_trait;
use atom_common::HTTP_CLIENT;
use atom_config::{configured_str, configured_value, OpenAiConfig};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::error::SchedulingError;
use crate::types::{DateTimeJson, UserInputJson};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

const USER_INPUT_PROMPT: &str = r#"You extract meeting details from a user's request.
Answer with a single JSON object {"params": {...}} using only these optional keys:
title, summary, description, notes, taskList [{task}], attendees [{name, email, isHost}],
startTime and endTime (ISO 8601), conference {app}, bufferTime {beforeEvent, afterEvent} in minutes,
alarms [minutes before], priority (integer), location, transparency (opaque|transparent),
visibility (default|public|private), recurrence {frequency, interval, endDate}.
Leave out anything the user did not say."#;

const DATE_TIME_PROMPT: &str = r#"You extract date and time information from a user's request.
The current time is {current_time} in the {timezone} timezone.
Answer with a single JSON object using only these optional keys:
year, month, day, isoWeekday (1 = Monday), hour, minute, startTime and endTime ("HH:mm"),
duration (minutes), method (create-event-forward|create-event-backward),
relativeTimeChangeFromNow (add|subtract), relativeTimeFromNow [{unit, value}],
recur {frequency (daily|weekly|monthly|yearly), interval, byWeekDay ["MO", ...], byMonthDay [int],
occurrence, endDate {year, month, day, hour, minute}},
timePreferences [{dayOfWeek ["MO", ...], timeRange {startTime, endTime}}].
Leave out anything the user did not say."#;

const FOLLOW_UP_NOTE: &str = "The user is answering the assistant's question. \
Combine the earlier request with the answer.";

/// Understands scheduling requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MeetingExtractor: Send + Sync {
    /// First turn: only the user's message.
    async fn extract_pending(
        &self,
        user_input: &str,
        current_time: &str,
        timezone: &str,
    ) -> Result<(UserInputJson, DateTimeJson), SchedulingError>;

    /// Follow-up turn: the answer plus the earlier request and question.
    async fn extract_missing_fields(
        &self,
        user_input: &str,
        prior_user_input: &str,
        prior_assistant_output: &str,
        current_time: &str,
        timezone: &str,
    ) -> Result<(UserInputJson, DateTimeJson), SchedulingError>;
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// OpenAI chat completions in JSON mode.
#[derive(Debug, Clone)]
pub struct OpenAiExtractor {
    client: Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl OpenAiExtractor {
    pub fn new(api_key: String, model: Option<String>, api_base: Option<String>) -> Self {
        Self {
            client: HTTP_CLIENT.clone(),
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_base: api_base
                .map(|b| b.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        }
    }

    /// `None` without an API key.
    pub fn from_config(config: &OpenAiConfig) -> Option<Self> {
        let api_key = configured_str(&config.api_key)?;
        Some(Self::new(
            api_key.to_string(),
            configured_value(&config.model).map(str::to_string),
            configured_value(&config.api_base).map(str::to_string),
        ))
    }

    async fn complete<T: DeserializeOwned>(
        &self,
        system: &str,
        messages: Vec<Value>,
    ) -> Result<T, SchedulingError> {
        let mut all = vec![json!({ "role": "system", "content": system })];
        all.extend(messages);
        let body = json!({
            "model": self.model,
            "messages": all,
            "temperature": 0,
            "response_format": { "type": "json_object" },
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Chat completion request failed");
                SchedulingError::Extraction(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %text, "Chat completion rejected");
            return Err(SchedulingError::Extraction(format!(
                "HTTP {}: {}",
                status.as_u16(),
                text
            )));
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| SchedulingError::Extraction(e.to_string()))?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| SchedulingError::Extraction("empty completion".to_string()))?;
        debug!(content = %content, "Chat completion content");

        serde_json::from_str(&content).map_err(|e| SchedulingError::Extraction(e.to_string()))
    }

    async fn extract(
        &self,
        conversation: Vec<Value>,
        current_time: &str,
        timezone: &str,
    ) -> Result<(UserInputJson, DateTimeJson), SchedulingError> {
        let input: UserInputJson = self
            .complete(USER_INPUT_PROMPT, conversation.clone())
            .await?;
        let date_prompt = DATE_TIME_PROMPT
            .replace("{current_time}", current_time)
            .replace("{timezone}", timezone);
        let date: DateTimeJson = self.complete(&date_prompt, conversation).await?;
        Ok((input, date))
    }
}

#[async_trait]
impl MeetingExtractor for OpenAiExtractor {
    async fn extract_pending(
        &self,
        user_input: &str,
        current_time: &str,
        timezone: &str,
    ) -> Result<(UserInputJson, DateTimeJson), SchedulingError> {
        let conversation = vec![json!({ "role": "user", "content": user_input })];
        self.extract(conversation, current_time, timezone).await
    }

    async fn extract_missing_fields(
        &self,
        user_input: &str,
        prior_user_input: &str,
        prior_assistant_output: &str,
        current_time: &str,
        timezone: &str,
    ) -> Result<(UserInputJson, DateTimeJson), SchedulingError> {
        let conversation = vec![
            json!({ "role": "system", "content": FOLLOW_UP_NOTE }),
            json!({ "role": "user", "content": prior_user_input }),
            json!({ "role": "assistant", "content": prior_assistant_output }),
            json!({ "role": "user", "content": user_input }),
        ];
        self.extract(conversation, current_time, timezone).await
    }
}
