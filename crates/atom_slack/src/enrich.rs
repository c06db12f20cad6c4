// --- File: crates/atom_slack/src/enrich.rs ---
//! Fill in user and channel names on messages. Lookups are best effort:
//! a failed lookup leaves the raw id in place.

use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::client::SlackClient;
use crate::models::SlackMessage;

/// Per-request name caches.
#[derive(Debug, Default)]
pub struct NameCache {
    users: HashMap<String, String>,
    channels: HashMap<String, String>,
}

fn user_display_name(user: &Value) -> Option<String> {
    ["real_name", "name"]
        .iter()
        .filter_map(|key| user.get(*key).and_then(Value::as_str))
        .find(|name| !name.is_empty())
        .map(str::to_string)
}

impl NameCache {
    pub fn new() -> Self {
        Self::default()
    }

    async fn user_name(&mut self, client: &SlackClient, id: &str) -> String {
        if let Some(name) = self.users.get(id) {
            return name.clone();
        }
        let name = match client.get("users.info", &[("user", id.to_string())]).await {
            Ok(body) => body.get("user").and_then(user_display_name),
            Err(e) => {
                debug!(user = id, error = %e, "users.info failed");
                None
            }
        };
        let name = match name {
            Some(name) => name,
            None if id.starts_with('B') => self.bot_name(client, id).await,
            None => {
                warn!(user = id, "Could not resolve Slack user name");
                id.to_string()
            }
        };
        self.users.insert(id.to_string(), name.clone());
        name
    }

    async fn bot_name(&self, client: &SlackClient, id: &str) -> String {
        match client.get("bots.info", &[("bot", id.to_string())]).await {
            Ok(body) => body
                .get("bot")
                .and_then(|b| b.get("name"))
                .and_then(Value::as_str)
                .unwrap_or(id)
                .to_string(),
            Err(e) => {
                warn!(bot = id, error = %e, "bots.info failed");
                id.to_string()
            }
        }
    }

    async fn channel_name(&mut self, client: &SlackClient, id: &str) -> String {
        if let Some(name) = self.channels.get(id) {
            return name.clone();
        }
        let name = match client
            .get("conversations.info", &[("channel", id.to_string())])
            .await
        {
            Ok(body) => {
                let channel = body.get("channel").cloned().unwrap_or_default();
                let named = channel
                    .get("name")
                    .and_then(Value::as_str)
                    .filter(|n| !n.is_empty())
                    .map(str::to_string);
                let partner = channel
                    .get("user")
                    .and_then(Value::as_str)
                    .filter(|_| channel.get("is_im").and_then(Value::as_bool) == Some(true))
                    .map(str::to_string);
                match (named, partner) {
                    (Some(name), _) => name,
                    (None, Some(partner)) => self.user_name(client, &partner).await,
                    (None, None) => id.to_string(),
                }
            }
            Err(e) => {
                warn!(channel = id, error = %e, "conversations.info failed");
                id.to_string()
            }
        };
        self.channels.insert(id.to_string(), name.clone());
        name
    }

    /// Resolve missing `user_name` and `channel_name` fields.
    pub async fn enrich(
        &mut self,
        client: &SlackClient,
        messages: Vec<SlackMessage>,
    ) -> Vec<SlackMessage> {
        let mut enriched = Vec::with_capacity(messages.len());
        for mut message in messages {
            if message.user_name.is_none() {
                message.user_name = match (&message.user_id, &message.bot_id) {
                    (Some(user), _) => Some(self.user_name(client, user).await),
                    (None, Some(bot)) => {
                        let name = self.user_name(client, bot).await;
                        Some(if name == *bot { format!("Bot ({})", bot) } else { name })
                    }
                    (None, None) => None,
                };
            }
            if message.channel_name.is_none() {
                if let Some(channel) = message.channel_id.clone() {
                    message.channel_name = Some(self.channel_name(client, &channel).await);
                }
            }
            enriched.push(message);
        }
        enriched
    }
}
