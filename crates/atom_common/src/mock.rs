//! In-memory service implementations for tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{auth_error, AtomError};
use crate::oauth::{OAuthError, OAuthProvider, TokenSet};
use crate::services::{
    BoxFuture, CalendarProvider, CreatedCalendarEvent, CredentialStore, NewCalendarEvent,
    ServiceFactory, Session, SessionVerifier, TokenStore, UserToken,
};

/// Token store keyed by `(user_id, service_name)`.
#[derive(Default)]
pub struct InMemoryTokenStore {
    rows: Mutex<HashMap<(String, String), UserToken>>,
    fail_writes: AtomicBool,
    fail_deletes: AtomicBool,
    saves: AtomicUsize,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a row directly.
    pub fn insert(&self, token: UserToken) {
        self.rows
            .lock()
            .unwrap()
            .insert((token.user_id.clone(), token.service_name.clone()), token);
    }

    pub fn get(&self, user_id: &str, service_name: &str) -> Option<UserToken> {
        self.rows
            .lock()
            .unwrap()
            .get(&(user_id.to_string(), service_name.to_string()))
            .cloned()
    }

    /// Rows stored for a pair; the store keeps at most one.
    pub fn count(&self, user_id: &str, service_name: &str) -> usize {
        usize::from(self.get(user_id, service_name).is_some())
    }

    pub fn save_calls(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }
}

impl TokenStore for InMemoryTokenStore {
    fn save_token(&self, token: UserToken) -> BoxFuture<'_, (), AtomError> {
        Box::pin(async move {
            self.saves.fetch_add(1, Ordering::SeqCst);
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(AtomError::coded(
                    "DB_NO_ROWS_AFFECTED",
                    "Token save did not affect any rows",
                    500,
                ));
            }
            self.insert(token);
            Ok(())
        })
    }

    fn latest_token(
        &self,
        user_id: &str,
        service_name: &str,
    ) -> BoxFuture<'_, Option<UserToken>, AtomError> {
        let found = self.get(user_id, service_name);
        Box::pin(async move { Ok(found) })
    }

    fn delete_tokens(&self, user_id: &str, service_name: &str) -> BoxFuture<'_, u64, AtomError> {
        let key = (user_id.to_string(), service_name.to_string());
        Box::pin(async move {
            if self.fail_deletes.load(Ordering::SeqCst) {
                return Err(AtomError::DatabaseError("delete failed".to_string()));
            }
            Ok(u64::from(self.rows.lock().unwrap().remove(&key).is_some()))
        })
    }
}

/// Plaintext credentials keyed by `(user_id, service_name)`.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    secrets: Mutex<HashMap<(String, String), String>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(self, user_id: &str, service_name: &str, secret: &str) -> Self {
        self.secrets.lock().unwrap().insert(
            (user_id.to_string(), service_name.to_string()),
            secret.to_string(),
        );
        self
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn decrypted_secret(
        &self,
        user_id: &str,
        service_name: &str,
    ) -> BoxFuture<'_, Option<String>, AtomError> {
        let found = self
            .secrets
            .lock()
            .unwrap()
            .get(&(user_id.to_string(), service_name.to_string()))
            .cloned();
        Box::pin(async move { Ok(found) })
    }
}

/// Accepts any token listed in the map.
#[derive(Default)]
pub struct StaticSessionVerifier {
    sessions: HashMap<String, String>,
}

impl StaticSessionVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(mut self, access_token: &str, user_id: &str) -> Self {
        self.sessions
            .insert(access_token.to_string(), user_id.to_string());
        self
    }
}

impl SessionVerifier for StaticSessionVerifier {
    fn verify(&self, access_token: &str) -> BoxFuture<'_, Session, AtomError> {
        let found = self.sessions.get(access_token).cloned();
        Box::pin(async move {
            found
                .map(|user_id| Session {
                    user_id,
                    handle: None,
                })
                .ok_or_else(|| auth_error("unknown session"))
        })
    }
}

/// Records created events and hands out sequential ids.
#[derive(Default)]
pub struct RecordingCalendarProvider {
    events: Mutex<Vec<(String, String, NewCalendarEvent)>>,
    fail: AtomicBool,
}

impl RecordingCalendarProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(user_id, calendar_id, event)` in creation order.
    pub fn created(&self) -> Vec<(String, String, NewCalendarEvent)> {
        self.events.lock().unwrap().clone()
    }

    pub fn fail_creates(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl CalendarProvider for RecordingCalendarProvider {
    fn create_event(
        &self,
        user_id: &str,
        calendar_id: &str,
        event: NewCalendarEvent,
    ) -> BoxFuture<'_, CreatedCalendarEvent, AtomError> {
        let user_id = user_id.to_string();
        let calendar_id = calendar_id.to_string();
        Box::pin(async move {
            if self.fail.load(Ordering::SeqCst) {
                return Err(crate::error::external_service_error(
                    "Google Calendar",
                    "insert failed",
                ));
            }
            let mut events = self.events.lock().unwrap();
            let id = format!("evt-{}", events.len() + 1);
            let hangout_link = event
                .conference
                .as_ref()
                .map(|c| format!("https://meet.google.com/{}", c.request_id));
            events.push((user_id, calendar_id, event));
            Ok(CreatedCalendarEvent {
                id,
                html_link: None,
                hangout_link,
                conference_id: None,
            })
        })
    }
}

/// OAuth provider with canned responses that counts its calls.
pub struct StaticOAuthProvider {
    pub service_name: &'static str,
    pub exchange_result: Mutex<Option<TokenSet>>,
    pub refresh_result: Mutex<Option<TokenSet>>,
    pub revoke_fails: AtomicBool,
    pub exchanges: AtomicUsize,
    pub refreshes: AtomicUsize,
    pub revokes: Mutex<Vec<String>>,
}

impl StaticOAuthProvider {
    pub fn new(service_name: &'static str) -> Self {
        Self {
            service_name,
            exchange_result: Mutex::new(None),
            refresh_result: Mutex::new(None),
            revoke_fails: AtomicBool::new(false),
            exchanges: AtomicUsize::new(0),
            refreshes: AtomicUsize::new(0),
            revokes: Mutex::new(Vec::new()),
        }
    }

    pub fn with_exchange(self, tokens: TokenSet) -> Self {
        *self.exchange_result.lock().unwrap() = Some(tokens);
        self
    }

    pub fn with_refresh(self, tokens: TokenSet) -> Self {
        *self.refresh_result.lock().unwrap() = Some(tokens);
        self
    }
}

#[async_trait]
impl OAuthProvider for StaticOAuthProvider {
    fn id(&self) -> &'static str {
        "static"
    }

    fn service_name(&self) -> &'static str {
        self.service_name
    }

    fn auth_url(&self, state: &str) -> Result<String, OAuthError> {
        Ok(format!("https://auth.example.com/authorize?state={}", state))
    }

    async fn exchange_code(&self, _code: &str) -> Result<TokenSet, OAuthError> {
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        self.exchange_result
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| OAuthError::TokenExchange("invalid_grant".to_string()))
    }

    async fn refresh_token(&self, _refresh_token: &str) -> Result<TokenSet, OAuthError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        // Yield so concurrent callers actually contend for the refresh lock.
        tokio::task::yield_now().await;
        self.refresh_result
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| OAuthError::Refresh("invalid_grant".to_string()))
    }

    async fn revoke(&self, token: &str) -> Result<(), OAuthError> {
        self.revokes.lock().unwrap().push(token.to_string());
        if self.revoke_fails.load(Ordering::SeqCst) {
            return Err(OAuthError::Revoke("HTTP 400".to_string()));
        }
        Ok(())
    }
}

/// A factory over fixed instances.
#[derive(Default, Clone)]
pub struct StaticServiceFactory {
    pub token_store: Option<Arc<dyn TokenStore>>,
    pub credential_store: Option<Arc<dyn CredentialStore>>,
    pub session_verifier: Option<Arc<dyn SessionVerifier>>,
    pub calendar_provider: Option<Arc<dyn CalendarProvider>>,
}

impl ServiceFactory for StaticServiceFactory {
    fn token_store(&self) -> Option<Arc<dyn TokenStore>> {
        self.token_store.clone()
    }

    fn credential_store(&self) -> Option<Arc<dyn CredentialStore>> {
        self.credential_store.clone()
    }

    fn session_verifier(&self) -> Option<Arc<dyn SessionVerifier>> {
        self.session_verifier.clone()
    }

    fn calendar_provider(&self) -> Option<Arc<dyn CalendarProvider>> {
        self.calendar_provider.clone()
    }
}

/// A `user_tokens` row for seeding stores in tests.
pub fn token_row(
    user_id: &str,
    service_name: &str,
    access_token: &str,
    refresh_token: Option<&str>,
    expiry: Option<DateTime<Utc>>,
) -> UserToken {
    UserToken {
        user_id: user_id.to_string(),
        service_name: service_name.to_string(),
        access_token: access_token.to_string(),
        refresh_token: refresh_token.map(str::to_string),
        expiry_date: expiry,
        updated_at: Some(Utc::now()),
        ..Default::default()
    }
}
