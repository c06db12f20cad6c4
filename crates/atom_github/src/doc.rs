#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::handlers::{
    __path_create_issue_handler, __path_list_issues_handler, __path_list_pull_requests_handler,
    __path_list_repositories_handler,
};
use crate::models::{BranchRef, GithubUser, Issue, Label, NewIssue, PullRequest, Repository};

#[derive(OpenApi)]
#[openapi(
    paths(
        list_repositories_handler,
        list_issues_handler,
        create_issue_handler,
        list_pull_requests_handler
    ),
    components(schemas(Repository, Issue, PullRequest, NewIssue, GithubUser, Label, BranchRef)),
    tags(
        (name = "GitHub", description = "Repositories, issues and pull requests")
    ),
    servers(
        (url = "/api", description = "Atom API server")
    )
)]
pub struct GithubApiDoc;
