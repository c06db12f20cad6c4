#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use std::sync::atomic::Ordering;

    use crate::mock::{token_row, InMemoryTokenStore, StaticOAuthProvider};
    use crate::oauth::lifecycle::{ensure_fresh_token_with_locks, needs_refresh, RefreshLocks};
    use crate::oauth::{complete_authorization, OAuthError, TokenSet};
    use crate::services::TokenStore;

    const SERVICE: &str = "google_calendar";

    fn refreshed_set(access: &str) -> TokenSet {
        TokenSet {
            access_token: access.to_string(),
            expires_in: Some(3600),
            token_type: Some("Bearer".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn skew_window_triggers_refresh() {
        let now = Utc::now();
        let soon = token_row("u1", SERVICE, "at", None, Some(now + Duration::minutes(4)));
        let later = token_row("u1", SERVICE, "at", None, Some(now + Duration::minutes(6)));
        let open = token_row("u1", SERVICE, "at", None, None);
        assert!(needs_refresh(&soon, now));
        assert!(!needs_refresh(&later, now));
        assert!(!needs_refresh(&open, now));
    }

    #[tokio::test]
    async fn fresh_token_is_returned_without_refresh() {
        let store = InMemoryTokenStore::new();
        store.insert(token_row(
            "u1",
            SERVICE,
            "live",
            Some("rt"),
            Some(Utc::now() + Duration::hours(1)),
        ));
        let provider = StaticOAuthProvider::new(SERVICE);

        let token = ensure_fresh_token_with_locks(&RefreshLocks::new(), &store, &provider, "u1")
            .await
            .unwrap();
        assert_eq!(token.access_token, "live");
        assert_eq!(provider.refreshes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_row_is_token_missing() {
        let store = InMemoryTokenStore::new();
        let provider = StaticOAuthProvider::new(SERVICE);
        let err = ensure_fresh_token_with_locks(&RefreshLocks::new(), &store, &provider, "u1")
            .await
            .unwrap_err();
        assert!(matches!(err, OAuthError::TokenMissing { .. }));
        assert_eq!(err.code(), "AUTH_REQUIRED");
    }

    #[tokio::test]
    async fn expired_without_refresh_token_fails() {
        let store = InMemoryTokenStore::new();
        store.insert(token_row(
            "u1",
            SERVICE,
            "stale",
            Some(""),
            Some(Utc::now() - Duration::minutes(1)),
        ));
        let provider = StaticOAuthProvider::new(SERVICE).with_refresh(refreshed_set("new"));

        let err = ensure_fresh_token_with_locks(&RefreshLocks::new(), &store, &provider, "u1")
            .await
            .unwrap_err();
        assert!(matches!(err, OAuthError::TokenExpiredNoRefresh { .. }));
        assert_eq!(provider.refreshes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn refresh_keeps_previous_refresh_token_and_scope() {
        let store = InMemoryTokenStore::new();
        let mut row = token_row(
            "u1",
            SERVICE,
            "stale",
            Some("rt-original"),
            Some(Utc::now() - Duration::minutes(10)),
        );
        row.scope = Some("calendar".to_string());
        store.insert(row);
        let provider = StaticOAuthProvider::new(SERVICE).with_refresh(refreshed_set("new"));

        let token = ensure_fresh_token_with_locks(&RefreshLocks::new(), &store, &provider, "u1")
            .await
            .unwrap();
        assert_eq!(token.access_token, "new");
        assert_eq!(token.refresh_token.as_deref(), Some("rt-original"));
        assert_eq!(token.scope.as_deref(), Some("calendar"));
        assert!(token.expiry_date.unwrap() > Utc::now() + Duration::minutes(50));

        let stored = store.get("u1", SERVICE).unwrap();
        assert_eq!(stored.access_token, "new");
        assert_eq!(store.count("u1", SERVICE), 1);
    }

    #[tokio::test]
    async fn concurrent_callers_refresh_once() {
        let store = InMemoryTokenStore::new();
        store.insert(token_row(
            "u1",
            SERVICE,
            "stale",
            Some("rt"),
            Some(Utc::now() - Duration::minutes(1)),
        ));
        let provider = StaticOAuthProvider::new(SERVICE).with_refresh(refreshed_set("new"));
        let locks = RefreshLocks::new();

        let (a, b, c) = tokio::join!(
            ensure_fresh_token_with_locks(&locks, &store, &provider, "u1"),
            ensure_fresh_token_with_locks(&locks, &store, &provider, "u1"),
            ensure_fresh_token_with_locks(&locks, &store, &provider, "u1"),
        );

        for result in [a, b, c] {
            assert_eq!(result.unwrap().access_token, "new");
        }
        assert_eq!(provider.refreshes.load(Ordering::SeqCst), 1);
        assert_eq!(store.save_calls(), 1);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn lock_entry_is_dropped_after_failed_refresh() {
        let store = InMemoryTokenStore::new();
        store.insert(token_row(
            "u1",
            SERVICE,
            "stale",
            Some("rt"),
            Some(Utc::now() - Duration::minutes(1)),
        ));
        let provider = StaticOAuthProvider::new(SERVICE);
        let locks = RefreshLocks::new();

        ensure_fresh_token_with_locks(&locks, &store, &provider, "u1")
            .await
            .unwrap_err();
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn lock_entry_outlives_first_holder_while_another_waits() {
        let locks = RefreshLocks::new();
        let first = locks.acquire("u1", SERVICE).await;
        let other = locks.acquire("u2", SERVICE).await;
        assert_eq!(locks.len(), 2);
        drop(other);
        assert_eq!(locks.len(), 1);

        let release = async {
            tokio::task::yield_now().await;
            drop(first);
            assert_eq!(locks.len(), 1);
        };
        let (second, ()) = tokio::join!(locks.acquire("u1", SERVICE), release);
        assert_eq!(locks.len(), 1);
        drop(second);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn failed_refresh_leaves_row_untouched() {
        let store = InMemoryTokenStore::new();
        store.insert(token_row(
            "u1",
            SERVICE,
            "stale",
            Some("rt"),
            Some(Utc::now() - Duration::minutes(1)),
        ));
        let provider = StaticOAuthProvider::new(SERVICE);

        let err = ensure_fresh_token_with_locks(&RefreshLocks::new(), &store, &provider, "u1")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "TOKEN_REFRESH_FAILED");
        assert_eq!(store.get("u1", SERVICE).unwrap().access_token, "stale");
    }

    #[tokio::test]
    async fn authorization_upserts_single_row() {
        let store = InMemoryTokenStore::new();
        let provider = StaticOAuthProvider::new(SERVICE).with_exchange(TokenSet {
            access_token: "first".to_string(),
            refresh_token: Some("rt".to_string()),
            expires_in: Some(3600),
            ..Default::default()
        });

        complete_authorization(&store, &provider, "u1", "code-1").await.unwrap();
        complete_authorization(&store, &provider, "u1", "code-2").await.unwrap();

        assert_eq!(store.count("u1", SERVICE), 1);
        assert_eq!(provider.exchanges.load(Ordering::SeqCst), 2);
        assert!(store.latest_token("u1", SERVICE).await.unwrap().is_some());
    }
}
