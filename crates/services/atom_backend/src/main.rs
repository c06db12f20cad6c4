// File: services/atom_backend/src/main.rs
use atom_backend::{build_app, AppState};
use atom_common::logging::{self, LogOptions};
use atom_config::load_config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let _log_guard = logging::init_with_options(&LogOptions::from_env());

    let config = match load_config() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            error!(error = %e, "Failed to load config");
            std::process::exit(1);
        }
    };

    let state = AppState::new(config.clone());
    let app = build_app(&state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, %addr, "Failed to bind");
            std::process::exit(1);
        }
    };
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    if let Err(e) = axum::serve(listener, app.into_make_service()).await {
        error!(error = %e, "Server stopped");
        std::process::exit(1);
    }
}
