// --- File: crates/atom_slack/src/error.rs ---
use atom_common::{AtomError, HttpStatusCode, SkillError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlackError {
    #[error("Slack Bot Token not configured.")]
    NotConfigured,

    #[error("{0}")]
    Validation(String),

    /// Slack answered with `ok: false`.
    #[error("{error}")]
    Api {
        error: String,
        details: serde_json::Value,
    },

    #[error("Could not open DM with {user}. Error: {error}")]
    DmOpenFailed { user: String, error: String },

    #[error("Channel or user \"{0}\" not found.")]
    ChannelNotFound(String),

    #[error("Slack request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Store(#[from] AtomError),
}

impl SlackError {
    pub fn code(&self) -> &str {
        match self {
            SlackError::NotConfigured => "CONFIG_ERROR",
            SlackError::Validation(_) => "VALIDATION_ERROR",
            SlackError::Api { .. } => "SLACK_API_ERROR",
            SlackError::DmOpenFailed { .. } => "DM_OPEN_FAILED",
            SlackError::ChannelNotFound(_) => "CHANNEL_NOT_FOUND",
            SlackError::Http(_) => "NETWORK_ERROR",
            SlackError::Store(e) => e.code(),
        }
    }

    /// Skill error with `context` prepended to Slack API failures.
    pub fn into_skill_error(self, context: &str) -> SkillError {
        match self {
            SlackError::Api { error, details } => {
                SkillError::new("SLACK_API_ERROR", format!("{}: {}", context, error))
                    .with_details(details)
                    .with_status(502)
            }
            other => other.into(),
        }
    }
}

impl HttpStatusCode for SlackError {
    fn status_code(&self) -> u16 {
        match self {
            SlackError::NotConfigured => 500,
            SlackError::Validation(_) => 400,
            SlackError::ChannelNotFound(_) => 404,
            SlackError::Api { .. } | SlackError::DmOpenFailed { .. } | SlackError::Http(_) => 502,
            SlackError::Store(e) => e.status_code(),
        }
    }
}

impl From<SlackError> for SkillError {
    fn from(err: SlackError) -> Self {
        SkillError::new(err.code(), err.to_string()).with_status(err.status_code())
    }
}
