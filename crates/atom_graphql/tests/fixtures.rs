//! Test fixtures for the Hasura store tests

use atom_config::HasuraConfig;
use atom_graphql::HasuraClient;
use std::time::Duration;
use wiremock::MockServer;

/// A client pointed at the mock server, without backoff pauses.
pub fn hasura_client(server: &MockServer) -> HasuraClient {
    HasuraClient::from_config(&HasuraConfig {
        graphql_url: format!("{}/v1/graphql", server.uri()),
        admin_secret: "test-admin-secret".to_string(),
        max_retries: Some(2),
        timeout_secs: Some(5),
    })
    .expect("valid hasura config")
    .with_backoff_base(Duration::ZERO)
}

/// A fixed AES-256 key for credential tests.
pub fn test_key() -> [u8; 32] {
    [7u8; 32]
}
