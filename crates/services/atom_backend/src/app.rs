// --- File: crates/services/atom_backend/src/app.rs ---
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
#[allow(unused_imports)]
use tracing::{info, warn};

use crate::app_state::AppState;

/// Assemble the service: every enabled integration is merged under `/api`.
///
/// An integration is mounted when its cargo feature is compiled in and its
/// `use_*` flag is set. A mounted integration whose config section is
/// missing still answers, with `CONFIG_ERROR`.
pub fn build_app(state: &AppState) -> Router {
    let config = state.config.clone();
    #[allow(unused_variables)]
    let services = state.service_factory.clone();

    #[allow(unused_mut)] // for the features it needs to be mutable
    let mut router: Router = Router::new().route("/", get(|| async { "Welcome to the Atom API!" }));

    #[cfg(feature = "gcal")]
    if config.use_gcal {
        if !atom_common::is_gcal_enabled(&config) {
            warn!("Google Calendar is enabled without a google section");
        }
        router = router.merge(atom_gcal::routes(config.clone(), services.clone()));
        info!("Mounted Google Calendar routes");
    }

    #[cfg(feature = "msteams")]
    if config.use_msteams {
        if !atom_common::is_msteams_enabled(&config) {
            warn!("Microsoft Teams is enabled without an msteams section");
        }
        router = router.merge(atom_msteams::routes(config.clone(), services.clone()));
        info!("Mounted Microsoft Teams routes");
    }

    #[cfg(feature = "quickbooks")]
    if config.use_quickbooks {
        if !atom_common::is_quickbooks_enabled(&config) {
            warn!("QuickBooks is enabled without a quickbooks section");
        }
        router = router.merge(atom_quickbooks::routes(config.clone(), services.clone()));
        info!("Mounted QuickBooks routes");
    }

    #[cfg(feature = "slack")]
    if atom_common::is_slack_enabled(&config) {
        router = router.merge(atom_slack::routes(config.clone(), services.clone()));
        info!("Mounted Slack routes");
    }

    #[cfg(feature = "stripe")]
    if atom_common::is_stripe_enabled(&config) {
        router = router.merge(atom_stripe::routes(config.clone(), services.clone()));
        info!("Mounted Stripe routes");
    }

    #[cfg(feature = "github")]
    if atom_common::is_github_enabled(&config) {
        router = router.merge(atom_github::routes(config.clone(), services.clone()));
        info!("Mounted GitHub routes");
    }

    #[cfg(feature = "scheduling")]
    if config.use_scheduling {
        if !atom_common::is_scheduling_enabled(&config) {
            warn!("Scheduling is enabled without a hasura section");
        }
        router = router.merge(atom_scheduling::routes(config.clone(), services.clone()));
        info!("Mounted scheduling routes");
    }

    #[allow(unused_mut)]
    let mut app = Router::new().nest("/api", router);

    #[cfg(feature = "openapi")]
    {
        use utoipa_swagger_ui::SwaggerUi;
        info!("Adding Swagger UI at /api/docs");
        app = app.merge(
            SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", crate::doc::merged_openapi()),
        );
    }

    app.layer(TraceLayer::new_for_http())
}
