mod fixtures;

use atom_common::services::{CredentialStore, TokenStore, UserToken};
use atom_config::secrets::encrypt_with_key;
use atom_graphql::{HasuraCredentialStore, HasuraTokenStore};
use chrono::{TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fixtures::{hasura_client, test_key};

fn sample_token() -> UserToken {
    UserToken {
        user_id: "user-1".to_string(),
        service_name: "google_calendar".to_string(),
        access_token: "ya29.token".to_string(),
        refresh_token: Some("1//refresh".to_string()),
        expiry_date: Some(Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()),
        scope: Some("https://www.googleapis.com/auth/calendar".to_string()),
        token_type: Some("Bearer".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn save_token_upserts_on_user_service_constraint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/graphql"))
        .and(body_partial_json(json!({
            "operationName": "UpsertUserToken",
            "variables": {"objects": [{"user_id": "user-1", "service_name": "google_calendar"}]}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"insert_user_tokens": {"affected_rows": 1}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = HasuraTokenStore::new(hasura_client(&server));
    store.save_token(sample_token()).await.unwrap();
}

#[tokio::test]
async fn zero_affected_rows_fails_the_save() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"insert_user_tokens": {"affected_rows": 0}}
        })))
        .mount(&server)
        .await;

    let store = HasuraTokenStore::new(hasura_client(&server));
    let err = store.save_token(sample_token()).await.unwrap_err();
    assert_eq!(err.code(), "DB_NO_ROWS_AFFECTED");
}

#[tokio::test]
async fn latest_token_reads_first_row() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"operationName": "GetUserToken"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"user_tokens": [{
                "user_id": "user-1",
                "service_name": "quickbooks_online",
                "access_token": "at",
                "refresh_token": "rt",
                "expiry_date": "2026-01-01T12:00:00+00:00",
                "scope": null,
                "token_type": "bearer",
                "id_token": null,
                "meta": {"realmId": "9130"},
                "updated_at": "2025-12-31T12:00:00.123456+00:00"
            }]}
        })))
        .mount(&server)
        .await;

    let store = HasuraTokenStore::new(hasura_client(&server));
    let token = store
        .latest_token("user-1", "quickbooks_online")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(token.access_token, "at");
    assert_eq!(token.meta_str("realmId"), Some("9130"));
}

#[tokio::test]
async fn latest_token_none_when_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"user_tokens": []}})),
        )
        .mount(&server)
        .await;

    let store = HasuraTokenStore::new(hasura_client(&server));
    assert!(store.latest_token("user-1", "slack").await.unwrap().is_none());
}

#[tokio::test]
async fn delete_reports_affected_rows_including_zero() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"operationName": "DeleteUserTokens"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"delete_user_tokens": {"affected_rows": 0}}
        })))
        .mount(&server)
        .await;

    let store = HasuraTokenStore::new(hasura_client(&server));
    assert_eq!(store.delete_tokens("user-1", "msteams_graph").await.unwrap(), 0);
}

#[tokio::test]
async fn credential_is_decrypted() {
    let server = MockServer::start().await;
    let encrypted = encrypt_with_key(&test_key(), "sk_test_123").unwrap();
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "operationName": "GetUserCredential",
            "variables": {"serviceName": "stripe_api_key"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"user_credentials": [{"encrypted_secret": encrypted}]}
        })))
        .mount(&server)
        .await;

    let store = HasuraCredentialStore::with_key(hasura_client(&server), test_key());
    let secret = store
        .decrypted_secret("user-1", "stripe_api_key")
        .await
        .unwrap();
    assert_eq!(secret.as_deref(), Some("sk_test_123"));
}

#[tokio::test]
async fn missing_credential_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"user_credentials": []}})),
        )
        .mount(&server)
        .await;

    let store = HasuraCredentialStore::with_key(hasura_client(&server), test_key());
    assert!(store
        .decrypted_secret("user-1", "github_api_key")
        .await
        .unwrap()
        .is_none());
}
