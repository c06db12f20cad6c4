use atom_common::mock::{InMemoryTokenStore, StaticServiceFactory, StaticSessionVerifier};
use atom_common::services::service_names::MSTEAMS;
use atom_config::{AppConfig, MsTeamsConfig};
use atom_msteams::routes;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app(server: Option<&MockServer>, store: Arc<InMemoryTokenStore>) -> axum::Router {
    let config = AppConfig {
        use_msteams: true,
        msteams: server.map(|s| MsTeamsConfig {
            client_id: Some("app-id".to_string()),
            client_secret: Some("app-secret".to_string()),
            tenant: Some("contoso".to_string()),
            redirect_uri: "http://localhost:8080/api/atom/auth/msteams/callback".to_string(),
            authority_base: Some(s.uri()),
            ..Default::default()
        }),
        ..Default::default()
    };
    let services = StaticServiceFactory {
        token_store: Some(store),
        session_verifier: Some(Arc::new(
            StaticSessionVerifier::new().with_session("good", "user-1"),
        )),
        ..Default::default()
    };
    routes(Arc::new(config), Arc::new(services))
}

fn callback(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, format!("sAccessToken={}", token))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn callback_stores_graph_token_with_account_meta() {
    let server = MockServer::start().await;
    let claims = URL_SAFE_NO_PAD.encode(json!({"oid": "o-1", "tid": "t-9"}).to_string());
    Mock::given(method("POST"))
        .and(path("/contoso/oauth2/v2.0/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "scope": "Chat.Read User.Read",
            "expires_in": 3600,
            "access_token": "eyJ0.graph",
            "refresh_token": "M.R3",
            "id_token": format!("e30.{}.sig", claims)
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryTokenStore::new());
    let response = app(Some(&server), store.clone())
        .oneshot(callback(
            "/atom/auth/msteams/callback?code=0.AX&state=user-1",
            "good",
        ))
        .await
        .unwrap();

    assert_eq!(
        response.headers()[header::LOCATION],
        "/Settings/UserViewSettings?msteams_auth_success=true"
    );
    let row = store.get("user-1", MSTEAMS).unwrap();
    assert_eq!(row.meta_str("accountHomeAccountId"), Some("o-1.t-9"));
    assert_eq!(row.meta_str("accountTenantId"), Some("t-9"));
}

#[tokio::test]
async fn rejected_code_redirects_with_exchange_flag() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})))
        .mount(&server)
        .await;

    let response = app(Some(&server), Arc::new(InMemoryTokenStore::new()))
        .oneshot(callback("/atom/auth/msteams/callback?code=bad&state=user-1", "good"))
        .await
        .unwrap();
    assert_eq!(
        response.headers()[header::LOCATION],
        "/Settings/UserViewSettings?msteams_auth_error=token_exchange_failed"
    );
}

#[tokio::test]
async fn missing_client_is_json_config_error() {
    let response = app(None, Arc::new(InMemoryTokenStore::new()))
        .oneshot(callback("/atom/auth/msteams/callback?code=c&state=user-1", "good"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"]["code"], "CONFIG_ERROR");
}

#[tokio::test]
async fn expired_session_goes_to_teams_login() {
    let response = app(None, Arc::new(InMemoryTokenStore::new()))
        .oneshot(callback("/atom/auth/msteams/callback?code=c&state=user-1", "stale"))
        .await
        .unwrap();
    assert_eq!(
        response.headers()[header::LOCATION],
        "/Auth/UserLogin?error=session_expired_oauth"
    );
}
