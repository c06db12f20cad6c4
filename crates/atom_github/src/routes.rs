// --- File: crates/atom_github/src/routes.rs ---

use axum::{routing::get, Router};
use std::sync::Arc;

use atom_common::method_not_allowed;
use atom_common::services::ServiceFactory;
use atom_config::AppConfig;

use crate::handlers::{
    create_issue_handler, list_issues_handler, list_pull_requests_handler,
    list_repositories_handler, GithubState,
};
use crate::logic::GithubSkills;

/// Creates a router containing the GitHub routes.
pub fn routes(config: Arc<AppConfig>, services: Arc<dyn ServiceFactory>) -> Router {
    let github = config.github.clone().unwrap_or_default();
    let skills = GithubSkills::new(
        services.credential_store(),
        github.api_base,
        github.user_agent,
    );
    router_with_state(Arc::new(GithubState { services, skills }))
}

pub fn router_with_state(state: Arc<GithubState>) -> Router {
    Router::new()
        .route(
            "/atom/github/repos",
            get(list_repositories_handler).fallback(|| async { method_not_allowed("GET") }),
        )
        .route(
            "/atom/github/repos/{owner}/{repo}/issues",
            get(list_issues_handler)
                .post(create_issue_handler)
                .fallback(|| async { method_not_allowed("GET, POST") }),
        )
        .route(
            "/atom/github/repos/{owner}/{repo}/pulls",
            get(list_pull_requests_handler).fallback(|| async { method_not_allowed("GET") }),
        )
        .with_state(state)
}
