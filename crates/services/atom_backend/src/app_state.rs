// --- File: crates/services/atom_backend/src/app_state.rs ---
use atom_common::services::ServiceFactory;
use atom_config::AppConfig;
use std::sync::Arc;

use crate::service_factory::AtomServiceFactory;

/// Application state shared by the router assembly.
///
/// Every integration router receives the same config and service factory,
/// so a test can swap the factory for one holding in-memory services.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub service_factory: Arc<dyn ServiceFactory>,
}

/// Builder for [`AppState`].
pub struct AppStateBuilder {
    config: Arc<AppConfig>,
    service_factory: Option<Arc<dyn ServiceFactory>>,
}

impl AppStateBuilder {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            config,
            service_factory: None,
        }
    }

    pub fn with_service_factory(mut self, service_factory: Arc<dyn ServiceFactory>) -> Self {
        self.service_factory = Some(service_factory);
        self
    }

    /// Falls back to an [`AtomServiceFactory`] built from the config.
    pub fn build(self) -> AppState {
        let service_factory = match self.service_factory {
            Some(factory) => factory,
            None => Arc::new(AtomServiceFactory::new(self.config.clone())),
        };
        AppState {
            config: self.config,
            service_factory,
        }
    }
}

impl AppState {
    pub fn builder(config: Arc<AppConfig>) -> AppStateBuilder {
        AppStateBuilder::new(config)
    }

    /// State with the services described by `config`.
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self::builder(config).build()
    }
}
