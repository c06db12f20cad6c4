#[cfg(test)]
mod tests {
    use crate::auth::{GoogleOAuthProvider, GOOGLE_AUTH_URL};
    use atom_common::oauth::{OAuthError, OAuthProvider};
    use atom_config::GoogleConfig;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn google_config(server: Option<&MockServer>) -> GoogleConfig {
        GoogleConfig {
            client_id: Some("client-123".to_string()),
            client_secret: Some("shh".to_string()),
            redirect_uri: "https://app.example.com/api/atom/auth/calendar/callback".to_string(),
            token_url: server.map(|s| format!("{}/token", s.uri())),
            revoke_url: server.map(|s| format!("{}/revoke", s.uri())),
            ..Default::default()
        }
    }

    #[test]
    fn missing_secret_is_not_configured() {
        let mut config = google_config(None);
        config.client_secret = Some("secret_from_env".to_string());
        let err = GoogleOAuthProvider::from_config(&config).unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }

    #[test]
    fn auth_url_requests_offline_consent() {
        let provider = GoogleOAuthProvider::from_config(&google_config(None)).unwrap();
        let url = url::Url::parse(&provider.auth_url("user-42").unwrap()).unwrap();
        assert!(url.as_str().starts_with(GOOGLE_AUTH_URL));

        let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(params["client_id"], "client-123");
        assert_eq!(params["access_type"], "offline");
        assert_eq!(params["prompt"], "consent");
        assert_eq!(params["state"], "user-42");
        assert_eq!(params["response_type"], "code");
        assert!(params["scope"].contains("calendar.events"));
    }

    #[tokio::test]
    async fn exchange_code_posts_authorization_code_grant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "ya29.a",
                "refresh_token": "1//r",
                "expires_in": 3599,
                "scope": "https://www.googleapis.com/auth/calendar.events",
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = GoogleOAuthProvider::from_config(&google_config(Some(&server))).unwrap();
        let tokens = provider.exchange_code("abc").await.unwrap();
        assert_eq!(tokens.access_token, "ya29.a");
        assert_eq!(tokens.refresh_token.as_deref(), Some("1//r"));
    }

    #[tokio::test]
    async fn rejected_refresh_is_refresh_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})),
            )
            .mount(&server)
            .await;

        let provider = GoogleOAuthProvider::from_config(&google_config(Some(&server))).unwrap();
        match provider.refresh_token("stale").await {
            Err(OAuthError::Refresh(reason)) => assert!(reason.contains("invalid_grant")),
            other => panic!("expected refresh error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn revoke_reports_failure_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/revoke"))
            .and(body_string_contains("token=1%2F%2Fr"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let provider = GoogleOAuthProvider::from_config(&google_config(Some(&server))).unwrap();
        let err = provider.revoke("1//r").await.unwrap_err();
        assert_eq!(err.code(), "TOKEN_REVOKE_FAILED");
    }
}
