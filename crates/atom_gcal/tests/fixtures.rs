//! Test fixtures for the Google Calendar route tests

use atom_common::mock::{InMemoryTokenStore, StaticServiceFactory, StaticSessionVerifier};
use atom_config::{AppConfig, GoogleConfig};
use std::sync::Arc;
use wiremock::MockServer;

/// Config with a Google client whose token and revoke endpoints live on `server`.
pub fn config_for(server: &MockServer) -> Arc<AppConfig> {
    Arc::new(AppConfig {
        use_gcal: true,
        google: Some(GoogleConfig {
            client_id: Some("client-123".to_string()),
            client_secret: Some("shh".to_string()),
            redirect_uri: "http://localhost:8080/api/atom/auth/calendar/callback".to_string(),
            token_url: Some(format!("{}/token", server.uri())),
            revoke_url: Some(format!("{}/revoke", server.uri())),
            calendar_api_base: Some(server.uri()),
            ..Default::default()
        }),
        ..Default::default()
    })
}

/// Services with one valid session (`good` → `user-1`) over the given store.
pub fn services(store: Arc<InMemoryTokenStore>) -> Arc<StaticServiceFactory> {
    Arc::new(StaticServiceFactory {
        token_store: Some(store),
        session_verifier: Some(Arc::new(
            StaticSessionVerifier::new().with_session("good", "user-1"),
        )),
        ..Default::default()
    })
}
