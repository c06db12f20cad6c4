// --- File: crates/services/atom_backend/src/service_factory.rs ---
//! Service factory implementation.
//!
//! Builds the concrete services behind the [`ServiceFactory`] trait from the
//! loaded configuration: the Hasura-backed token and credential stores, the
//! SuperTokens session verifier and, with the `gcal` feature, the Google
//! Calendar event provider used by the scheduling pipeline.
//!
//! A service whose configuration is missing or incomplete is left out; the
//! routes that need it answer with `CONFIG_ERROR` instead of failing startup.
use atom_common::services::{
    CalendarProvider, CredentialStore, ServiceFactory, SessionVerifier, TokenStore,
};
use atom_common::SuperTokensVerifier;
use atom_config::{configured_str, AppConfig};
use atom_graphql::{HasuraClient, HasuraCredentialStore, HasuraTokenStore};
use std::sync::Arc;
use tracing::{info, warn};

#[cfg(feature = "gcal")]
use {
    atom_common::oauth::OAuthProvider,
    atom_gcal::{GoogleCalendarService, GoogleOAuthProvider},
};

/// The backend's [`ServiceFactory`].
pub struct AtomServiceFactory {
    token_store: Option<Arc<dyn TokenStore>>,
    credential_store: Option<Arc<dyn CredentialStore>>,
    session_verifier: Option<Arc<dyn SessionVerifier>>,
    calendar_provider: Option<Arc<dyn CalendarProvider>>,
}

impl AtomServiceFactory {
    pub fn new(config: Arc<AppConfig>) -> Self {
        let client = hasura_client(&config);

        let token_store: Option<Arc<dyn TokenStore>> = client
            .clone()
            .map(|c| Arc::new(HasuraTokenStore::new(c)) as Arc<dyn TokenStore>);
        let credential_store: Option<Arc<dyn CredentialStore>> = client
            .map(|c| Arc::new(HasuraCredentialStore::new(c)) as Arc<dyn CredentialStore>);

        let session_verifier = session_verifier(&config);
        let calendar_provider = calendar_provider(&config, token_store.clone());

        Self {
            token_store,
            credential_store,
            session_verifier,
            calendar_provider,
        }
    }
}

fn hasura_client(config: &AppConfig) -> Option<HasuraClient> {
    let Some(hasura) = config.hasura.as_ref() else {
        warn!("No hasura section; token and credential stores are disabled");
        return None;
    };
    match HasuraClient::from_config(hasura) {
        Ok(client) => {
            info!(url = %hasura.graphql_url, "Hasura client initialized");
            Some(client)
        }
        Err(e) => {
            warn!(error = %e, "Hasura client disabled");
            None
        }
    }
}

fn session_verifier(config: &AppConfig) -> Option<Arc<dyn SessionVerifier>> {
    let session = config.session.as_ref()?;
    let Some(uri) = configured_str(&session.connection_uri) else {
        warn!("session.connection_uri is empty; every session check will fail");
        return None;
    };
    info!(connection_uri = %uri, "SuperTokens session verification enabled");
    Some(Arc::new(SuperTokensVerifier::new(uri, session.api_key.clone())))
}

#[cfg(feature = "gcal")]
fn calendar_provider(
    config: &AppConfig,
    token_store: Option<Arc<dyn TokenStore>>,
) -> Option<Arc<dyn CalendarProvider>> {
    if !config.use_gcal {
        return None;
    }
    let google = config.google.as_ref()?;
    let store = token_store?;
    match GoogleOAuthProvider::from_config(google) {
        Ok(provider) => {
            info!("Google Calendar event provider initialized");
            let provider: Arc<dyn OAuthProvider> = Arc::new(provider);
            Some(Arc::new(GoogleCalendarService::new(
                store,
                provider,
                google.calendar_api_base.clone(),
            )))
        }
        Err(e) => {
            warn!(error = %e, "Google Calendar event provider disabled");
            None
        }
    }
}

#[cfg(not(feature = "gcal"))]
fn calendar_provider(
    _config: &AppConfig,
    _token_store: Option<Arc<dyn TokenStore>>,
) -> Option<Arc<dyn CalendarProvider>> {
    None
}

impl ServiceFactory for AtomServiceFactory {
    fn token_store(&self) -> Option<Arc<dyn TokenStore>> {
        self.token_store.clone()
    }

    fn credential_store(&self) -> Option<Arc<dyn CredentialStore>> {
        self.credential_store.clone()
    }

    fn session_verifier(&self) -> Option<Arc<dyn SessionVerifier>> {
        self.session_verifier.clone()
    }

    fn calendar_provider(&self) -> Option<Arc<dyn CalendarProvider>> {
        self.calendar_provider.clone()
    }
}
