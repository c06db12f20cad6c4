// --- File: crates/atom_slack/src/skills.rs ---
//! Slack skills on the user's stored Slack token.

use chrono::{Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use atom_common::services::{service_names, TokenStore};
use atom_common::{SkillError, SkillResponse};

use crate::client::{SlackClient, DEFAULT_API_BASE};
use crate::enrich::NameCache;
use crate::error::SlackError;
use crate::models::{BriefingData, ChannelList, SentMessage, SlackChannel, SlackMessage};

/// Page size used when resolving `#channel` names.
const LOOKUP_PAGE_SIZE: u32 = 200;
const LOOKUP_MAX_PAGES: usize = 10;

static SLACK_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[UCGDWF][A-Z0-9]{8,10}$").expect("Invalid Slack id pattern"));

/// True for raw Slack ids such as `C024BE91L` or `U0G9QF9C6`.
pub fn is_slack_id(identifier: &str) -> bool {
    SLACK_ID.is_match(identifier)
}

/// Search query for the morning briefing on `date`.
pub fn briefing_query(slack_user_id: Option<&str>, date: NaiveDate) -> String {
    let who = match slack_user_id {
        Some(id) => format!("(@{id} OR to:{id} OR in:{id})"),
        None => "(is:dm)".to_string(),
    };
    format!(
        "{} after:{} before:{} sort:timestamp dir:desc",
        who,
        date.format("%Y-%m-%d"),
        (date + Duration::days(1)).format("%Y-%m-%d")
    )
}

#[derive(Clone)]
pub struct SlackSkills {
    store: Option<Arc<dyn TokenStore>>,
    api_base: String,
}

impl SlackSkills {
    pub fn new(store: Option<Arc<dyn TokenStore>>, api_base: Option<String>) -> Self {
        Self {
            store,
            api_base: api_base.unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        }
    }

    async fn client(&self, user_id: &str) -> Result<SlackClient, SlackError> {
        let store = self.store.as_ref().ok_or(SlackError::NotConfigured)?;
        match store.latest_token(user_id, service_names::SLACK).await? {
            Some(row) if !row.access_token.is_empty() => {
                Ok(SlackClient::new(self.api_base.clone(), row.access_token))
            }
            _ => {
                error!(user_id, "Slack token not found for user");
                Err(SlackError::NotConfigured)
            }
        }
    }

    async fn channel_page(
        client: &SlackClient,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<ChannelList, SlackError> {
        let mut params = vec![
            ("limit", limit.to_string()),
            ("types", "public_channel,private_channel,mpim,im".to_string()),
            ("exclude_archived", "true".to_string()),
        ];
        if let Some(cursor) = cursor.filter(|c| !c.is_empty()) {
            params.push(("cursor", cursor.to_string()));
        }
        let body = client.get("conversations.list", &params).await?;
        let channels: Vec<SlackChannel> = body
            .get("channels")
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| SlackError::Api {
                error: format!("invalid channel list: {e}"),
                details: Value::Null,
            })?
            .unwrap_or_default();
        let next_page_cursor = body
            .pointer("/response_metadata/next_cursor")
            .and_then(Value::as_str)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        Ok(ChannelList {
            channels,
            next_page_cursor,
        })
    }

    pub async fn list_channels(
        &self,
        user_id: &str,
        limit: Option<u32>,
        cursor: Option<&str>,
    ) -> SkillResponse<ChannelList> {
        debug!(user_id, ?limit, ?cursor, "list_channels");
        let result = async {
            let client = self.client(user_id).await?;
            Self::channel_page(&client, limit.unwrap_or(100), cursor).await
        }
        .await;
        result
            .map_err(|e| e.into_skill_error("Failed to list channels"))
            .into()
    }

    /// `#name` → channel id, `@USERID` → DM channel id.
    async fn resolve_channel(
        client: &SlackClient,
        identifier: &str,
    ) -> Result<String, SlackError> {
        if let Some(name) = identifier.strip_prefix('#') {
            let mut cursor: Option<String> = None;
            for _ in 0..LOOKUP_MAX_PAGES {
                let page = Self::channel_page(client, LOOKUP_PAGE_SIZE, cursor.as_deref()).await?;
                if let Some(found) = page.channels.iter().find(|ch| {
                    ch.name.as_deref() == Some(name) && (ch.is_channel || ch.is_group)
                }) {
                    return Ok(found.id.clone());
                }
                match page.next_page_cursor {
                    Some(next) => cursor = Some(next),
                    None => break,
                }
            }
            warn!(channel = name, "Slack channel not found");
            return Err(SlackError::ChannelNotFound(identifier.to_string()));
        }

        if let Some(user) = identifier.strip_prefix('@') {
            if is_slack_id(user) {
                return match client.post("conversations.open", &json!({ "users": user })).await {
                    Ok(body) => body
                        .pointer("/channel/id")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .ok_or_else(|| SlackError::DmOpenFailed {
                            user: user.to_string(),
                            error: "no channel id returned".to_string(),
                        }),
                    Err(SlackError::Api { error, .. }) => Err(SlackError::DmOpenFailed {
                        user: user.to_string(),
                        error,
                    }),
                    Err(other) => Err(other),
                };
            }
            warn!(identifier, "DM target is a user name, not a user id");
        }
        Err(SlackError::ChannelNotFound(identifier.to_string()))
    }

    /// Post `text` to a channel id, `#channel` or `@USERID`.
    pub async fn send_message(
        &self,
        user_id: &str,
        identifier: &str,
        text: &str,
    ) -> SkillResponse<SentMessage> {
        let result = async {
            let client = self.client(user_id).await?;
            if identifier.trim().is_empty() || text.trim().is_empty() {
                return Err(SlackError::Validation(
                    "Channel identifier and text are required.".to_string(),
                ));
            }
            let channel = if is_slack_id(identifier) {
                identifier.to_string()
            } else {
                Self::resolve_channel(&client, identifier).await?
            };
            let body = client
                .post("chat.postMessage", &json!({ "channel": channel, "text": text }))
                .await?;
            let ts = body
                .get("ts")
                .and_then(Value::as_str)
                .ok_or_else(|| SlackError::Api {
                    error: "unknown_slack_api_error_on_post".to_string(),
                    details: body.clone(),
                })?
                .to_string();
            info!(user_id, channel = %channel, ts = %ts, "Slack message sent");
            Ok(SentMessage {
                ts,
                channel: body.get("channel").and_then(Value::as_str).map(str::to_string),
                message: body.get("message").cloned(),
            })
        }
        .await;
        result
            .map_err(|e| e.into_skill_error("Failed to send message"))
            .into()
    }

    async fn search_with(
        client: &SlackClient,
        query: &str,
        limit: u32,
    ) -> Result<Vec<SlackMessage>, SlackError> {
        let body = client
            .get(
                "search.messages",
                &[
                    ("query", query.to_string()),
                    ("count", limit.to_string()),
                    ("sort", "timestamp".to_string()),
                    ("sort_dir", "desc".to_string()),
                ],
            )
            .await?;
        let messages: Vec<SlackMessage> = body
            .pointer("/messages/matches")
            .and_then(Value::as_array)
            .map(|matches| matches.iter().map(SlackMessage::from_search_match).collect())
            .unwrap_or_default();
        if messages.is_empty() {
            return Ok(messages);
        }
        Ok(NameCache::new().enrich(client, messages).await)
    }

    /// Search the user's messages. Failures yield an empty list.
    pub async fn search_messages(
        &self,
        user_id: &str,
        query: &str,
        limit: Option<u32>,
    ) -> Vec<SlackMessage> {
        let client = match self.client(user_id).await {
            Ok(client) => client,
            Err(e) => {
                error!(user_id, error = %e, "Slack search unavailable");
                return Vec::new();
            }
        };
        match Self::search_with(&client, query, limit.unwrap_or(10)).await {
            Ok(messages) => {
                info!(user_id, count = messages.len(), "Slack search done");
                messages
            }
            Err(e) => {
                error!(user_id, query, error = %e, "search.messages failed");
                Vec::new()
            }
        }
    }

    async fn permalink_with(client: &SlackClient, channel: &str, ts: &str) -> Option<String> {
        match client
            .get(
                "chat.getPermalink",
                &[("channel", channel.to_string()), ("message_ts", ts.to_string())],
            )
            .await
        {
            Ok(body) => body
                .get("permalink")
                .and_then(Value::as_str)
                .map(str::to_string),
            Err(e) => {
                warn!(channel, ts, error = %e, "chat.getPermalink failed");
                None
            }
        }
    }

    pub async fn get_permalink(&self, user_id: &str, channel: &str, ts: &str) -> Option<String> {
        let client = self.client(user_id).await.ok()?;
        Self::permalink_with(&client, channel, ts).await
    }

    /// One message by channel and `ts`, or `None` when it cannot be read.
    pub async fn read_message(
        &self,
        user_id: &str,
        channel: &str,
        ts: &str,
    ) -> Option<SlackMessage> {
        let client = match self.client(user_id).await {
            Ok(client) => client,
            Err(e) => {
                error!(user_id, error = %e, "Slack read unavailable");
                return None;
            }
        };
        let body = match client
            .get(
                "conversations.history",
                &[
                    ("channel", channel.to_string()),
                    ("latest", ts.to_string()),
                    ("oldest", ts.to_string()),
                    ("inclusive", "true".to_string()),
                    ("limit", "1".to_string()),
                ],
            )
            .await
        {
            Ok(body) => body,
            Err(e) => {
                warn!(channel, ts, error = %e, "conversations.history failed");
                return None;
            }
        };
        let raw = body.pointer("/messages/0")?;
        let mut message = SlackMessage::from_history(raw, Some(channel));
        message.permalink = Self::permalink_with(&client, channel, &message.id).await;
        NameCache::new()
            .enrich(&client, vec![message])
            .await
            .into_iter()
            .next()
    }

    /// DMs and mentions of the user on `date`, newest first.
    pub async fn recent_dms_and_mentions_for_briefing(
        &self,
        user_id: &str,
        date: NaiveDate,
        count: Option<u32>,
    ) -> SkillResponse<BriefingData> {
        let client = match self.client(user_id).await {
            Ok(client) => client,
            Err(SlackError::NotConfigured) => {
                return SkillResponse::from_error(SlackError::NotConfigured.into())
            }
            Err(e) => {
                return SkillResponse::from_error(SkillError::new(
                    "SLACK_BRIEFING_FETCH_FAILED",
                    e.to_string(),
                ))
            }
        };

        let slack_user_id = match client.get("auth.test", &[]).await {
            Ok(body) => body.get("user_id").and_then(Value::as_str).map(str::to_string),
            Err(e) => {
                warn!(user_id, error = %e, "auth.test failed; searching DMs only");
                None
            }
        };
        let query = briefing_query(slack_user_id.as_deref(), date);
        info!(user_id, query = %query, "Slack briefing search");

        let results = match Self::search_with(&client, &query, count.unwrap_or(3)).await {
            Ok(results) => results,
            Err(e) => {
                error!(user_id, error = %e, "Slack briefing search failed");
                return SkillResponse::from_error(SkillError::new(
                    "SLACK_BRIEFING_FETCH_FAILED",
                    e.to_string(),
                ));
            }
        };
        SkillResponse::success(BriefingData {
            results,
            query_executed: query,
        })
    }
}
