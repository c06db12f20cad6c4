#[cfg(test)]
mod tests {
    use crate::error::QboError;
    use crate::tokens::{get_valid_tokens, save_tokens};
    use atom_common::mock::{token_row, InMemoryTokenStore, StaticOAuthProvider};
    use atom_common::oauth::TokenSet;
    use atom_common::services::service_names::QUICKBOOKS;
    use atom_common::services::UserToken;
    use chrono::{Duration, Utc};
    use serde_json::json;
    use std::sync::atomic::Ordering;

    fn qbo_row(expiry_in: Duration, refresh_expires_in: Option<Duration>) -> UserToken {
        let now = Utc::now();
        let mut row = token_row("user-1", QUICKBOOKS, "old-at", Some("rt"), Some(now + expiry_in));
        row.meta = Some(json!({
            "realmId": "9130",
            "refreshTokenExpiresAt": refresh_expires_in.map(|d| (now + d).timestamp_millis()),
            "tokenCreatedAt": now.timestamp_millis(),
        }));
        row
    }

    #[tokio::test]
    async fn save_records_realm_and_refresh_expiry() {
        let store = InMemoryTokenStore::new();
        let now = Utc::now();
        let mut tokens = TokenSet {
            access_token: "at".to_string(),
            refresh_token: Some("rt".to_string()),
            expires_in: Some(3600),
            ..Default::default()
        };
        tokens
            .extra
            .insert("x_refresh_token_expires_in".to_string(), json!(8_726_400));

        save_tokens(&store, "user-1", "9130", tokens, now).await.unwrap();

        let row = store.get("user-1", QUICKBOOKS).unwrap();
        let meta = row.meta.unwrap();
        assert_eq!(meta["realmId"], "9130");
        assert_eq!(
            meta["refreshTokenExpiresAt"],
            (now + Duration::seconds(8_726_400)).timestamp_millis()
        );
        assert_eq!(row.expiry_date, Some(now + Duration::seconds(3600)));
    }

    #[tokio::test]
    async fn save_without_realm_is_invalid_structure() {
        let store = InMemoryTokenStore::new();
        let err = save_tokens(&store, "user-1", "", TokenSet::default(), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "QBO_TOKEN_INVALID_STRUCTURE");
        assert_eq!(store.count("user-1", QUICKBOOKS), 0);
    }

    #[tokio::test]
    async fn missing_row_requires_auth() {
        let store = InMemoryTokenStore::new();
        let provider = StaticOAuthProvider::new(QUICKBOOKS);
        let err = get_valid_tokens(&store, &provider, "user-1").await.unwrap_err();
        assert!(matches!(err, QboError::AuthRequired));
    }

    #[tokio::test]
    async fn row_without_realm_is_invalid() {
        let store = InMemoryTokenStore::new();
        store.insert(token_row("user-1", QUICKBOOKS, "at", Some("rt"), None));
        let provider = StaticOAuthProvider::new(QUICKBOOKS);
        let err = get_valid_tokens(&store, &provider, "user-1").await.unwrap_err();
        assert_eq!(err.code(), "QBO_TOKEN_INVALID_STRUCTURE");
    }

    #[tokio::test]
    async fn valid_token_is_returned_untouched() {
        let store = InMemoryTokenStore::new();
        store.insert(qbo_row(Duration::hours(1), Some(Duration::days(90))));
        let provider = StaticOAuthProvider::new(QUICKBOOKS);

        let tokens = get_valid_tokens(&store, &provider, "user-1").await.unwrap();
        assert_eq!(tokens.access_token, "old-at");
        assert_eq!(tokens.realm_id, "9130");
        assert_eq!(provider.refreshes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn expired_refresh_token_is_reported_without_calling_intuit() {
        let store = InMemoryTokenStore::new();
        store.insert(qbo_row(Duration::minutes(-5), Some(Duration::minutes(-1))));
        let provider = StaticOAuthProvider::new(QUICKBOOKS);

        let err = get_valid_tokens(&store, &provider, "user-1").await.unwrap_err();
        assert_eq!(err.code(), "QBO_REFRESH_TOKEN_EXPIRED");
        assert_eq!(provider.refreshes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn near_expiry_refreshes_and_keeps_realm() {
        let store = InMemoryTokenStore::new();
        store.insert(qbo_row(Duration::minutes(2), Some(Duration::days(30))));
        let provider = StaticOAuthProvider::new(QUICKBOOKS).with_refresh(TokenSet {
            access_token: "new-at".to_string(),
            expires_in: Some(3600),
            ..Default::default()
        });

        let tokens = get_valid_tokens(&store, &provider, "user-1").await.unwrap();
        assert_eq!(tokens.access_token, "new-at");
        assert_eq!(tokens.realm_id, "9130");
        assert_eq!(tokens.refresh_token.as_deref(), Some("rt"));
        assert_eq!(store.count("user-1", QUICKBOOKS), 1);
    }

    #[tokio::test]
    async fn refresh_failure_is_qbo_refresh_failed() {
        let store = InMemoryTokenStore::new();
        store.insert(qbo_row(Duration::minutes(-1), None));
        let provider = StaticOAuthProvider::new(QUICKBOOKS);

        let err = get_valid_tokens(&store, &provider, "user-1").await.unwrap_err();
        assert_eq!(err.code(), "QBO_REFRESH_FAILED");
    }
}
