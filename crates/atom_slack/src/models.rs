// --- File: crates/atom_slack/src/models.rs ---
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// A conversation as returned by `conversations.list`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SlackChannel {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub is_channel: bool,
    #[serde(default)]
    pub is_group: bool,
    #[serde(default)]
    pub is_im: bool,
    #[serde(default)]
    pub is_private: bool,
    /// DM partner for `is_im` conversations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Remaining Slack fields, passed through.
    #[serde(flatten)]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ChannelList {
    pub channels: Vec<SlackChannel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_cursor: Option<String>,
}

/// Body of `POST /atom/slack/messages`.
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SendMessageRequest {
    /// Channel id, `#channel-name` or `@USERID`.
    pub channel: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SentMessage {
    pub ts: String,
    pub channel: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub message: Option<Value>,
}

/// A Slack message normalised for the agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SlackMessage {
    /// The message `ts`.
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub blocks: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub files: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub reactions: Option<Value>,
    /// RFC 3339 form of `id`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permalink: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub raw: Value,
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

/// `1712345678.000200` → `2024-04-05T19:34:38.000Z`.
pub fn ts_to_rfc3339(ts: &str) -> Option<String> {
    let (secs, frac) = ts.split_once('.').unwrap_or((ts, "0"));
    let secs: i64 = secs.parse().ok()?;
    let micros: u32 = format!("{:0<6}", frac).get(..6)?.parse().ok()?;
    let at: DateTime<Utc> = Utc.timestamp_opt(secs, micros * 1_000).single()?;
    Some(at.to_rfc3339_opts(SecondsFormat::Millis, true))
}

impl SlackMessage {
    /// From a `search.messages` match, which carries its channel inline.
    pub fn from_search_match(raw: &Value) -> Self {
        let channel = raw.get("channel");
        let channel_id = channel.and_then(|c| str_field(c, "id"));
        let channel_name = channel.and_then(|c| str_field(c, "name"));
        Self {
            channel_id,
            channel_name,
            permalink: str_field(raw, "permalink"),
            ..Self::from_history(raw, None)
        }
    }

    /// From a `conversations.history` entry, which does not name its channel.
    pub fn from_history(raw: &Value, channel_id: Option<&str>) -> Self {
        let id = str_field(raw, "ts").unwrap_or_default();
        let user_id = str_field(raw, "user");
        Self {
            timestamp: ts_to_rfc3339(&id),
            id,
            thread_id: str_field(raw, "thread_ts"),
            user_name: str_field(raw, "username"),
            user_id,
            bot_id: str_field(raw, "bot_id"),
            channel_id: channel_id.map(str::to_string),
            channel_name: None,
            text: str_field(raw, "text"),
            blocks: raw.get("blocks").cloned(),
            files: raw.get("files").cloned(),
            reactions: raw.get("reactions").cloned(),
            permalink: None,
            raw: raw.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BriefingData {
    pub results: Vec<SlackMessage>,
    pub query_executed: String,
}
