// --- File: crates/atom_github/src/handlers.rs ---
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use atom_common::services::{ServiceFactory, Session};
use atom_common::{config_error, require_session, AtomError};

use crate::logic::GithubSkills;
use crate::models::{NewIssue, PageOptions, StateOptions};

#[derive(Clone)]
pub struct GithubState {
    pub services: Arc<dyn ServiceFactory>,
    pub skills: GithubSkills,
}

impl GithubState {
    async fn session(&self, headers: &HeaderMap) -> Result<Session, AtomError> {
        let verifier = self
            .services
            .session_verifier()
            .ok_or_else(|| config_error("Session verification is not configured"))?;
        require_session(verifier.as_ref(), headers).await
    }
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/atom/github/repos",
    params(PageOptions),
    responses(
        (status = 200, description = "Repositories, most recently updated first", body = [crate::models::Repository]),
        (status = 500, description = "No GitHub key stored for the user")
    ),
    tag = "GitHub"
))]
pub async fn list_repositories_handler(
    State(state): State<Arc<GithubState>>,
    headers: HeaderMap,
    Query(options): Query<PageOptions>,
) -> Response {
    let session = match state.session(&headers).await {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };
    state
        .skills
        .list_repositories(&session.user_id, &options)
        .await
        .into_response()
}

/// Open issues of a repository, pull requests excluded.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/atom/github/repos/{owner}/{repo}/issues",
    params(
        ("owner" = String, Path, description = "Repository owner"),
        ("repo" = String, Path, description = "Repository name"),
        StateOptions
    ),
    responses(
        (status = 200, description = "Issues", body = [crate::models::Issue]),
        (status = 404, description = "GITHUB_NOT_FOUND")
    ),
    tag = "GitHub"
))]
pub async fn list_issues_handler(
    State(state): State<Arc<GithubState>>,
    headers: HeaderMap,
    Path((owner, repo)): Path<(String, String)>,
    Query(options): Query<StateOptions>,
) -> Response {
    let session = match state.session(&headers).await {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };
    state
        .skills
        .list_issues(&session.user_id, &owner, &repo, &options)
        .await
        .into_response()
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/atom/github/repos/{owner}/{repo}/issues",
    params(
        ("owner" = String, Path, description = "Repository owner"),
        ("repo" = String, Path, description = "Repository name")
    ),
    request_body = NewIssue,
    responses(
        (status = 200, description = "The created issue", body = crate::models::Issue),
        (status = 400, description = "Missing title")
    ),
    tag = "GitHub"
))]
pub async fn create_issue_handler(
    State(state): State<Arc<GithubState>>,
    headers: HeaderMap,
    Path((owner, repo)): Path<(String, String)>,
    Json(issue): Json<NewIssue>,
) -> Response {
    let session = match state.session(&headers).await {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };
    state
        .skills
        .create_issue(&session.user_id, &owner, &repo, &issue)
        .await
        .into_response()
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/atom/github/repos/{owner}/{repo}/pulls",
    params(
        ("owner" = String, Path, description = "Repository owner"),
        ("repo" = String, Path, description = "Repository name"),
        StateOptions
    ),
    responses(
        (status = 200, description = "Pull requests", body = [crate::models::PullRequest])
    ),
    tag = "GitHub"
))]
pub async fn list_pull_requests_handler(
    State(state): State<Arc<GithubState>>,
    headers: HeaderMap,
    Path((owner, repo)): Path<(String, String)>,
    Query(options): Query<StateOptions>,
) -> Response {
    let session = match state.session(&headers).await {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };
    state
        .skills
        .list_pull_requests(&session.user_id, &owner, &repo, &options)
        .await
        .into_response()
}
