// --- File: crates/services/atom_backend/src/doc.rs ---
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Atom API",
        version = "0.1.0",
        description = "Atom integrations: calendar, Teams and QuickBooks connections, Slack, Stripe and GitHub skills, meeting scheduling",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    components(),
    tags( (name = "Atom", description = "Core service endpoints")),
    servers( (url = "/api", description = "Main API Prefix")),
)]
pub struct ApiDoc;

/// The service document with every compiled-in integration merged in.
pub fn merged_openapi() -> utoipa::openapi::OpenApi {
    #[allow(unused_mut)] // for the features it needs to be mutable
    let mut doc = ApiDoc::openapi();
    #[cfg(feature = "gcal")]
    doc.merge(atom_gcal::doc::GcalApiDoc::openapi());
    #[cfg(feature = "msteams")]
    doc.merge(atom_msteams::doc::MsTeamsApiDoc::openapi());
    #[cfg(feature = "quickbooks")]
    doc.merge(atom_quickbooks::doc::QuickBooksApiDoc::openapi());
    #[cfg(feature = "slack")]
    doc.merge(atom_slack::doc::SlackApiDoc::openapi());
    #[cfg(feature = "stripe")]
    doc.merge(atom_stripe::doc::StripeApiDoc::openapi());
    #[cfg(feature = "github")]
    doc.merge(atom_github::doc::GithubApiDoc::openapi());
    #[cfg(feature = "scheduling")]
    doc.merge(atom_scheduling::doc::SchedulingApiDoc::openapi());
    doc
}
