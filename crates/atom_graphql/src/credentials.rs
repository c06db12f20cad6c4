//! `user_credentials` lookups: encrypted static API keys such as Stripe and GitHub.

use atom_common::services::{BoxFuture, CredentialStore};
use atom_common::{config_error, AtomError};
use atom_config::secrets::{self, ENCRYPTED_MARKER};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::client::HasuraClient;

const GET_USER_CREDENTIAL: &str = r#"
query GetUserCredential($userId: String!, $serviceName: String!) {
  user_credentials(where: {user_id: {_eq: $userId}, service_name: {_eq: $serviceName}}) {
    encrypted_secret
  }
}
"#;

#[derive(Debug, Deserialize)]
struct CredentialRow {
    encrypted_secret: String,
}

#[derive(Debug, Deserialize)]
struct CredentialData {
    user_credentials: Vec<CredentialRow>,
}

/// [`CredentialStore`] reading `user_credentials` and decrypting with AES-256-GCM.
#[derive(Debug, Clone)]
pub struct HasuraCredentialStore {
    client: HasuraClient,
    key: Option<[u8; 32]>,
}

impl HasuraCredentialStore {
    /// Decrypts with the key from `ATOM_ENCRYPTION_KEY`, read on each lookup.
    pub fn new(client: HasuraClient) -> Self {
        Self { client, key: None }
    }

    pub fn with_key(client: HasuraClient, key: [u8; 32]) -> Self {
        Self {
            client,
            key: Some(key),
        }
    }

    fn decrypt(&self, stored: &str) -> Result<String, AtomError> {
        let ciphertext = stored.strip_prefix(ENCRYPTED_MARKER).unwrap_or(stored);
        let key = match self.key {
            Some(key) => key,
            None => secrets::encryption_key().map_err(|e| config_error(e.to_string()))?,
        };
        secrets::decrypt_with_key(&key, ciphertext).map_err(|e| {
            error!(error = %e, "Failed to decrypt stored credential");
            AtomError::coded("CREDENTIAL_DECRYPT_FAILED", e.to_string(), 500)
        })
    }

    pub async fn secret(
        &self,
        user_id: &str,
        service_name: &str,
    ) -> Result<Option<String>, AtomError> {
        let data: CredentialData = self
            .client
            .execute(
                GET_USER_CREDENTIAL,
                json!({ "userId": user_id, "serviceName": service_name }),
                "GetUserCredential",
                Some(user_id),
            )
            .await?;

        match data.user_credentials.first() {
            Some(row) => self.decrypt(&row.encrypted_secret).map(Some),
            None => Ok(None),
        }
    }
}

impl CredentialStore for HasuraCredentialStore {
    fn decrypted_secret(
        &self,
        user_id: &str,
        service_name: &str,
    ) -> BoxFuture<'_, Option<String>, AtomError> {
        let user_id = user_id.to_string();
        let service_name = service_name.to_string();
        Box::pin(async move { self.secret(&user_id, &service_name).await })
    }
}
