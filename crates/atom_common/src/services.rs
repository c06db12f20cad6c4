// --- File: crates/atom_common/src/services.rs ---
//! Service abstractions for persistence and external services.
//!
//! Handlers and skills only see these traits; the backend wires Hasura, the
//! SuperTokens core and Google Calendar behind them, and tests use the
//! in-memory versions from [`crate::mock`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::AtomError;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// `service_name` values used in `user_tokens` and `user_credentials`.
pub mod service_names {
    pub const GOOGLE_CALENDAR: &str = "google_calendar";
    pub const MSTEAMS: &str = "msteams_graph";
    pub const QUICKBOOKS: &str = "quickbooks_online";
    pub const SLACK: &str = "slack";
    pub const STRIPE_API_KEY: &str = "stripe_api_key";
    pub const GITHUB_API_KEY: &str = "github_api_key";
}

/// One row of `user_tokens`. `(user_id, service_name)` identifies it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct UserToken {
    pub user_id: String,
    pub service_name: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub scope: Option<String>,
    pub token_type: Option<String>,
    pub id_token: Option<String>,
    /// Provider extras: MS account ids, QuickBooks realmId and refresh-token expiry.
    pub meta: Option<serde_json::Value>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserToken {
    /// Refresh token if present and non-empty.
    pub fn usable_refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref().filter(|t| !t.is_empty())
    }

    /// A string field of `meta`.
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.meta.as_ref()?.get(key)?.as_str()
    }
}

/// Persistence for OAuth tokens.
pub trait TokenStore: Send + Sync {
    /// Insert or overwrite the row for `(token.user_id, token.service_name)`.
    fn save_token(&self, token: UserToken) -> BoxFuture<'_, (), AtomError>;

    /// The most recently updated row for the pair, if any.
    fn latest_token(
        &self,
        user_id: &str,
        service_name: &str,
    ) -> BoxFuture<'_, Option<UserToken>, AtomError>;

    /// Delete all rows for the pair and return how many were removed.
    fn delete_tokens(&self, user_id: &str, service_name: &str) -> BoxFuture<'_, u64, AtomError>;
}

/// Read access to encrypted static API keys (`user_credentials`).
pub trait CredentialStore: Send + Sync {
    /// The decrypted secret, or `None` when the user has not stored one.
    fn decrypted_secret(
        &self,
        user_id: &str,
        service_name: &str,
    ) -> BoxFuture<'_, Option<String>, AtomError>;
}

/// A verified user session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub user_id: String,
    pub handle: Option<String>,
}

/// Verifies a session access token.
pub trait SessionVerifier: Send + Sync {
    fn verify(&self, access_token: &str) -> BoxFuture<'_, Session, AtomError>;
}

/// Attendee on a calendar event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct EventAttendee {
    pub email: String,
    pub display_name: Option<String>,
    pub optional: bool,
    pub organizer: bool,
}

/// Request for a provider-created conference (Google Meet).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConferenceRequest {
    pub request_id: String,
    /// e.g. `hangoutsMeet`
    pub solution_type: String,
}

/// A new event to create on a user's calendar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewCalendarEvent {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// IANA zone the event is displayed in.
    pub time_zone: String,
    pub attendees: Vec<EventAttendee>,
    /// RRULE lines, e.g. `RRULE:FREQ=WEEKLY;INTERVAL=1`.
    pub recurrence: Option<Vec<String>>,
    /// Email reminder overrides in minutes; `None` keeps calendar defaults.
    pub reminder_minutes: Option<Vec<i32>>,
    pub conference: Option<ConferenceRequest>,
    pub transparency: Option<String>,
    pub visibility: Option<String>,
    pub guests_can_invite_others: Option<bool>,
    pub guests_can_modify: Option<bool>,
    pub guests_can_see_other_guests: Option<bool>,
    /// `all`, `externalOnly` or `none`.
    pub send_updates: Option<String>,
}

/// What the provider returned for a created event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CreatedCalendarEvent {
    pub id: String,
    pub html_link: Option<String>,
    pub hangout_link: Option<String>,
    pub conference_id: Option<String>,
}

/// Creates events on a user's calendar.
pub trait CalendarProvider: Send + Sync {
    fn create_event(
        &self,
        user_id: &str,
        calendar_id: &str,
        event: NewCalendarEvent,
    ) -> BoxFuture<'_, CreatedCalendarEvent, AtomError>;
}

/// A factory for the shared service instances.
///
/// `None` means the service is not configured; handlers answer with a
/// configuration error in that case.
pub trait ServiceFactory: Send + Sync {
    fn token_store(&self) -> Option<Arc<dyn TokenStore>>;

    fn credential_store(&self) -> Option<Arc<dyn CredentialStore>>;

    fn session_verifier(&self) -> Option<Arc<dyn SessionVerifier>>;

    fn calendar_provider(&self) -> Option<Arc<dyn CalendarProvider>>;
}
