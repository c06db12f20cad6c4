//! Assistant replies appended to the conversation.

use async_trait::async_trait;

use crate::types::{ChatMessage, RequiredField, RequiredFields, SkillMessageHistory};

#[async_trait]
pub trait AssistantResponder: Send + Sync {
    /// Reply after the skill finished with `data`.
    async fn completed(&self, data: &str, history: &SkillMessageHistory) -> ChatMessage;

    /// Question asking the user for what is still missing.
    async fn missing_fields(
        &self,
        required: &RequiredFields,
        history: &SkillMessageHistory,
    ) -> ChatMessage;
}

/// Fixed English templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateResponder;

fn describe(field: &RequiredField) -> &str {
    match field.value.as_str() {
        "title" => "a title for the meeting",
        "attendees" => "who should attend",
        "name" => "your name",
        "email" => "your email address",
        "name/email" => "the name or email of each attendee I could not find in your contacts",
        other => other,
    }
}

fn join_list(items: &[&str]) -> String {
    match items {
        [] => String::new(),
        [one] => (*one).to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

#[async_trait]
impl AssistantResponder for TemplateResponder {
    async fn completed(&self, data: &str, _history: &SkillMessageHistory) -> ChatMessage {
        let mut text = data.trim().to_string();
        if let Some(first) = text.get(..1) {
            text.replace_range(..1, &first.to_uppercase());
        }
        if !text.ends_with(['.', '!', '?']) {
            text.push('.');
        }
        ChatMessage::assistant(text)
    }

    async fn missing_fields(
        &self,
        required: &RequiredFields,
        _history: &SkillMessageHistory,
    ) -> ChatMessage {
        let items: Vec<&str> = required
            .required
            .iter()
            .chain(required.date_time.required.iter())
            .map(describe)
            .collect();
        if items.is_empty() {
            return ChatMessage::assistant("Could you tell me a bit more about the meeting?");
        }
        ChatMessage::assistant(format!(
            "To schedule this meeting I still need {}.",
            join_list(&items)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completed_capitalizes_and_terminates() {
        let reply = TemplateResponder
            .completed("successfully scheduled meeting", &SkillMessageHistory::default())
            .await;
        assert_eq!(reply.content, "Successfully scheduled meeting.");
    }

    #[tokio::test]
    async fn missing_fields_lists_every_requirement() {
        let required = RequiredFields {
            required: vec![RequiredField::title(), RequiredField::attendees()],
            ..Default::default()
        };
        let reply = TemplateResponder
            .missing_fields(&required, &SkillMessageHistory::default())
            .await;
        assert_eq!(
            reply.content,
            "To schedule this meeting I still need a title for the meeting and who should attend."
        );
    }
}
