#[cfg(test)]
mod tests {
    use crate::handlers::GcalState;
    use crate::logic::MockCalendarProbe;
    use crate::routes::{router_with_state, routes};
    use atom_common::mock::{
        token_row, InMemoryTokenStore, StaticOAuthProvider, StaticServiceFactory,
        StaticSessionVerifier,
    };
    use atom_common::oauth::{OAuthProvider, TokenSet};
    use atom_common::services::service_names::GOOGLE_CALENDAR;
    use atom_config::AppConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct Harness {
        store: Arc<InMemoryTokenStore>,
        router: Router,
    }

    fn harness(provider: Option<StaticOAuthProvider>, probe: MockCalendarProbe) -> Harness {
        let store = Arc::new(InMemoryTokenStore::new());
        let services = StaticServiceFactory {
            token_store: Some(store.clone()),
            session_verifier: Some(Arc::new(
                StaticSessionVerifier::new().with_session("good", "user-1"),
            )),
            ..Default::default()
        };
        let state = Arc::new(GcalState {
            config: Arc::new(AppConfig::default()),
            services: Arc::new(services),
            provider: provider.map(|p| Arc::new(p) as Arc<dyn OAuthProvider>),
            probe: Arc::new(probe),
        });
        Harness {
            store,
            router: router_with_state(state),
        }
    }

    fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("sAccessToken={}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn location(response: &axum::response::Response) -> String {
        response.headers()[header::LOCATION]
            .to_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn initiate_redirects_with_user_state() {
        let h = harness(
            Some(StaticOAuthProvider::new(GOOGLE_CALENDAR)),
            MockCalendarProbe::new(),
        );
        let response = h
            .router
            .oneshot(get("/atom/auth/calendar/initiate", Some("good")))
            .await
            .unwrap();
        assert!(response.status().is_redirection());
        assert!(location(&response).ends_with("state=user-1"));
    }

    #[tokio::test]
    async fn initiate_requires_session() {
        let h = harness(None, MockCalendarProbe::new());
        let response = h
            .router
            .oneshot(get("/atom/auth/calendar/initiate", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn callback_with_expired_session_goes_to_login() {
        let h = harness(None, MockCalendarProbe::new());
        let response = h
            .router
            .oneshot(get(
                "/atom/auth/calendar/callback?code=x&state=user-1",
                Some("stale"),
            ))
            .await
            .unwrap();
        assert_eq!(
            location(&response),
            "/User/Login/UserLogin?error=session_expired_oauth_callback"
        );
    }

    #[tokio::test]
    async fn callback_success_stores_token() {
        let provider = StaticOAuthProvider::new(GOOGLE_CALENDAR).with_exchange(TokenSet {
            access_token: "ya29".to_string(),
            refresh_token: Some("rt".to_string()),
            expires_in: Some(3600),
            ..Default::default()
        });
        let h = harness(Some(provider), MockCalendarProbe::new());
        let response = h
            .router
            .oneshot(get(
                "/atom/auth/calendar/callback?code=abc&state=user-1",
                Some("good"),
            ))
            .await
            .unwrap();
        assert_eq!(
            location(&response),
            "/Settings/UserViewSettings?calendar_auth_success=true&atom_agent=true"
        );
        assert_eq!(h.store.count("user-1", GOOGLE_CALENDAR), 1);
    }

    #[tokio::test]
    async fn callback_provider_error_is_url_encoded() {
        let h = harness(None, MockCalendarProbe::new());
        let response = h
            .router
            .oneshot(get(
                "/atom/auth/calendar/callback?error=access%20denied&state=user-1",
                Some("good"),
            ))
            .await
            .unwrap();
        assert_eq!(
            location(&response),
            "/Settings/UserViewSettings?calendar_auth_error=access+denied&atom_agent=true"
        );
    }

    #[tokio::test]
    async fn status_is_401_json_without_session() {
        let h = harness(None, MockCalendarProbe::new());
        let response = h
            .router
            .oneshot(get("/atom/auth/calendar/status", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["isConnected"], false);
        assert_eq!(json["error"], "User not authenticated.");
    }

    #[tokio::test]
    async fn status_reports_probe_email() {
        let mut probe = MockCalendarProbe::new();
        probe
            .expect_primary_calendar()
            .returning(|_| Ok(Some("ada@example.com".to_string())));
        let h = harness(Some(StaticOAuthProvider::new(GOOGLE_CALENDAR)), probe);
        h.store
            .insert(token_row("user-1", GOOGLE_CALENDAR, "at", Some("rt"), None));

        let response = h
            .router
            .oneshot(get("/atom/auth/calendar/status", Some("good")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["isConnected"], true);
        assert_eq!(json["email"], "ada@example.com");
        assert!(json.get("error").is_none());
    }

    #[tokio::test]
    async fn disconnect_rejects_get_with_allow_header() {
        let h = harness(None, MockCalendarProbe::new());
        let response = h
            .router
            .oneshot(get("/atom/auth/calendar/disconnect", Some("good")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "POST");
    }

    #[tokio::test]
    async fn disconnect_removes_row_and_redirects() {
        let h = harness(
            Some(StaticOAuthProvider::new(GOOGLE_CALENDAR)),
            MockCalendarProbe::new(),
        );
        h.store
            .insert(token_row("user-1", GOOGLE_CALENDAR, "at", Some("rt"), None));
        let request = Request::builder()
            .method("POST")
            .uri("/atom/auth/calendar/disconnect")
            .header(header::AUTHORIZATION, "Bearer good")
            .body(Body::empty())
            .unwrap();

        let response = h.router.oneshot(request).await.unwrap();
        assert_eq!(
            location(&response),
            "/Settings/UserViewSettings?calendar_disconnect_success=true&atom_agent=true"
        );
        assert!(h.store.get("user-1", GOOGLE_CALENDAR).is_none());
    }

    #[tokio::test]
    async fn disconnect_db_failure_is_500() {
        let h = harness(None, MockCalendarProbe::new());
        h.store.fail_deletes(true);
        let request = Request::builder()
            .method("POST")
            .uri("/atom/auth/calendar/disconnect")
            .header(header::AUTHORIZATION, "Bearer good")
            .body(Body::empty())
            .unwrap();

        let response = h.router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
    }

    #[test]
    fn routes_build_without_google_section() {
        let _router: Router = routes(
            Arc::new(AppConfig::default()),
            Arc::new(StaticServiceFactory::default()),
        );
    }
}
