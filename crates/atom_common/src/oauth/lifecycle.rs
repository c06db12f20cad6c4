//! Load → check expiry → refresh → persist, shared by every OAuth integration.
//!
//! Refreshes for the same `(user_id, service_name)` are serialised through
//! [`RefreshLocks`]; a second caller waiting on the lock re-reads the row and
//! finds it already refreshed.

use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info};

use super::{OAuthError, OAuthProvider, TokenSet};
use crate::services::{TokenStore, UserToken};

/// A token is refreshed when it expires within this many minutes.
pub const EXPIRY_SKEW_MINUTES: i64 = 5;

/// True when the token is expired or expires within [`EXPIRY_SKEW_MINUTES`].
/// Rows without an expiry are treated as valid.
pub fn needs_refresh(token: &UserToken, now: DateTime<Utc>) -> bool {
    match token.expiry_date {
        Some(expiry) => expiry - Duration::minutes(EXPIRY_SKEW_MINUTES) <= now,
        None => false,
    }
}

type LockKey = (String, String);

/// Per `(user, service)` async locks.
///
/// An entry lives while a caller holds or waits for it; the last
/// [`RefreshGuard`] to drop removes it.
#[derive(Default)]
pub struct RefreshLocks {
    inner: Mutex<HashMap<LockKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl RefreshLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> MutexGuard<'_, HashMap<LockKey, Arc<tokio::sync::Mutex<()>>>> {
        match self.inner.lock() {
            Ok(map) => map,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Wait for the lock of a pair, creating it on first use.
    pub async fn acquire(&self, user_id: &str, service_name: &str) -> RefreshGuard<'_> {
        let key = (user_id.to_string(), service_name.to_string());
        let lock = self.map().entry(key.clone()).or_default().clone();
        let guard = lock.clone().lock_owned().await;
        RefreshGuard {
            locks: self,
            key,
            lock,
            guard: Some(guard),
        }
    }

    /// Number of pairs with a holder or waiter.
    pub fn len(&self) -> usize {
        self.map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Held lock of one pair.
pub struct RefreshGuard<'a> {
    locks: &'a RefreshLocks,
    key: LockKey,
    lock: Arc<tokio::sync::Mutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        // Released first: the owned guard holds its own clone of `lock`.
        drop(self.guard.take());
        let mut map = self.locks.map();
        let idle = map
            .get(&self.key)
            .is_some_and(|entry| Arc::ptr_eq(entry, &self.lock) && Arc::strong_count(entry) == 2);
        if idle {
            map.remove(&self.key);
        }
    }
}

static REFRESH_LOCKS: Lazy<RefreshLocks> = Lazy::new(RefreshLocks::new);

/// Merge a refresh response into the stored row.
///
/// Providers may omit the refresh token on refresh; the old one is kept then.
pub fn apply_refresh(
    provider: &dyn OAuthProvider,
    previous: &UserToken,
    tokens: TokenSet,
    now: DateTime<Utc>,
) -> UserToken {
    let meta = provider.token_meta(&tokens, previous.meta.as_ref(), now);
    let mut refreshed = tokens.into_user_token(&previous.user_id, &previous.service_name, meta, now);
    if refreshed.usable_refresh_token().is_none() {
        refreshed.refresh_token = previous.refresh_token.clone();
    }
    if refreshed.scope.is_none() {
        refreshed.scope = previous.scope.clone();
    }
    if refreshed.id_token.is_none() {
        refreshed.id_token = previous.id_token.clone();
    }
    refreshed
}

/// Return a usable access token row for `user_id`, refreshing it if needed.
pub async fn ensure_fresh_token(
    store: &dyn TokenStore,
    provider: &dyn OAuthProvider,
    user_id: &str,
) -> Result<UserToken, OAuthError> {
    ensure_fresh_token_with_locks(&REFRESH_LOCKS, store, provider, user_id).await
}

/// [`ensure_fresh_token`] with an explicit lock table.
pub async fn ensure_fresh_token_with_locks(
    locks: &RefreshLocks,
    store: &dyn TokenStore,
    provider: &dyn OAuthProvider,
    user_id: &str,
) -> Result<UserToken, OAuthError> {
    let service_name = provider.service_name();
    let missing = || OAuthError::TokenMissing {
        service: service_name.to_string(),
    };

    let token = store
        .latest_token(user_id, service_name)
        .await?
        .ok_or_else(missing)?;
    if !needs_refresh(&token, Utc::now()) {
        return Ok(token);
    }

    let _guard = locks.acquire(user_id, service_name).await;

    // Another task may have refreshed while we waited.
    let token = store
        .latest_token(user_id, service_name)
        .await?
        .ok_or_else(missing)?;
    let now = Utc::now();
    if !needs_refresh(&token, now) {
        debug!(user_id, service = service_name, "Token refreshed by concurrent caller");
        return Ok(token);
    }

    let refresh_token = token
        .usable_refresh_token()
        .ok_or_else(|| OAuthError::TokenExpiredNoRefresh {
            service: service_name.to_string(),
        })?
        .to_string();

    info!(user_id, service = service_name, provider = provider.id(), "Refreshing access token");
    let tokens = provider.refresh_token(&refresh_token).await?;
    let refreshed = apply_refresh(provider, &token, tokens, now);
    store.save_token(refreshed.clone()).await?;
    Ok(refreshed)
}
