//! Test fixtures for the QuickBooks route tests

use atom_common::mock::{InMemoryTokenStore, StaticServiceFactory, StaticSessionVerifier};
use atom_config::{AppConfig, QuickBooksConfig};
use std::sync::Arc;
use wiremock::MockServer;

/// Config whose Intuit token endpoint and accounting API both live on `server`.
pub fn config_for(server: &MockServer) -> Arc<AppConfig> {
    Arc::new(AppConfig {
        use_quickbooks: true,
        quickbooks: Some(QuickBooksConfig {
            client_id: Some("qbo-client".to_string()),
            client_secret: Some("qbo-secret".to_string()),
            redirect_uri: Some("http://localhost:8080/api/atom/auth/quickbooks/callback".to_string()),
            environment: Some("sandbox".to_string()),
            scopes: vec!["com.intuit.quickbooks.accounting".to_string()],
            api_base: Some(server.uri()),
            token_url: Some(format!("{}/oauth2/v1/tokens/bearer", server.uri())),
            ..Default::default()
        }),
        ..Default::default()
    })
}

pub fn services(store: Arc<InMemoryTokenStore>) -> Arc<StaticServiceFactory> {
    Arc::new(StaticServiceFactory {
        token_store: Some(store),
        session_verifier: Some(Arc::new(
            StaticSessionVerifier::new().with_session("good", "user-1"),
        )),
        ..Default::default()
    })
}
