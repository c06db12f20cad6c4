// --- File: crates/atom_github/src/logic.rs ---
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

use atom_common::services::{service_names, CredentialStore};
use atom_common::{SkillError, SkillResponse, HTTP_CLIENT};

use crate::error::GithubError;
use crate::models::{Issue, NewIssue, PageOptions, PullRequest, Repository, StateOptions};

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_USER_AGENT: &str = "atom-agent";
const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";

#[derive(Deserialize, Debug)]
struct GithubErrorBody {
    message: Option<String>,
}

/// Repository, issue and pull request skills over the user's stored token.
#[derive(Clone)]
pub struct GithubSkills {
    credentials: Option<Arc<dyn CredentialStore>>,
    api_base: String,
    user_agent: String,
}

impl GithubSkills {
    pub fn new(
        credentials: Option<Arc<dyn CredentialStore>>,
        api_base: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            credentials,
            api_base: api_base
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            user_agent: user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        }
    }

    async fn api_key(&self, user_id: &str) -> Result<String, GithubError> {
        let store = self.credentials.as_ref().ok_or(GithubError::ConfigError)?;
        store
            .decrypted_secret(user_id, service_names::GITHUB_API_KEY)
            .await?
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                error!("[GitHub] API key not configured for user {}", user_id);
                GithubError::ConfigError
            })
    }

    fn request(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        HTTP_CLIENT
            .request(method, format!("{}{}", self.api_base, path))
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, ACCEPT)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        path: &str,
    ) -> Result<T, GithubError> {
        let response = builder.send().await?;
        let status = response.status();
        let body_text = response.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<GithubErrorBody>(&body_text)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| format!("GitHub API returned {}", status));
            error!("[GitHub] {} {} failed: {}", path, status, message);
            return Err(match status {
                StatusCode::NOT_FOUND => GithubError::NotFound(message),
                StatusCode::UNAUTHORIZED => GithubError::Unauthorized(message),
                _ => GithubError::ApiError {
                    status: status.as_u16(),
                    message,
                },
            });
        }
        Ok(serde_json::from_str(&body_text)?)
    }

    async fn repositories(
        &self,
        user_id: &str,
        options: &PageOptions,
    ) -> Result<Vec<Repository>, GithubError> {
        let token = self.api_key(user_id).await?;
        let path = "/user/repos";
        let query = [
            ("per_page", options.per_page.unwrap_or(30).to_string()),
            ("page", options.page.unwrap_or(1).to_string()),
            ("sort", "updated".to_string()),
        ];
        self.send(self.request(Method::GET, path, &token).query(&query), path)
            .await
    }

    pub async fn list_repositories(
        &self,
        user_id: &str,
        options: &PageOptions,
    ) -> SkillResponse<Vec<Repository>> {
        self.repositories(user_id, options)
            .await
            .map_err(SkillError::from)
            .into()
    }

    fn state_query(options: &StateOptions) -> [(&'static str, String); 3] {
        [
            (
                "state",
                options.state.clone().unwrap_or_else(|| "open".to_string()),
            ),
            ("per_page", options.per_page.unwrap_or(30).to_string()),
            ("page", options.page.unwrap_or(1).to_string()),
        ]
    }

    async fn issues(
        &self,
        user_id: &str,
        owner: &str,
        repo: &str,
        options: &StateOptions,
    ) -> Result<Vec<Issue>, GithubError> {
        let token = self.api_key(user_id).await?;
        let path = format!("/repos/{}/{}/issues", owner, repo);
        let query = Self::state_query(options);
        let issues: Vec<Issue> = self
            .send(self.request(Method::GET, &path, &token).query(&query), &path)
            .await?;
        // The issues endpoint also returns pull requests.
        Ok(issues
            .into_iter()
            .filter(|issue| issue.pull_request.is_none())
            .collect())
    }

    pub async fn list_issues(
        &self,
        user_id: &str,
        owner: &str,
        repo: &str,
        options: &StateOptions,
    ) -> SkillResponse<Vec<Issue>> {
        self.issues(user_id, owner, repo, options)
            .await
            .map_err(SkillError::from)
            .into()
    }

    async fn pulls(
        &self,
        user_id: &str,
        owner: &str,
        repo: &str,
        options: &StateOptions,
    ) -> Result<Vec<PullRequest>, GithubError> {
        let token = self.api_key(user_id).await?;
        let path = format!("/repos/{}/{}/pulls", owner, repo);
        let query = Self::state_query(options);
        self.send(self.request(Method::GET, &path, &token).query(&query), &path)
            .await
    }

    pub async fn list_pull_requests(
        &self,
        user_id: &str,
        owner: &str,
        repo: &str,
        options: &StateOptions,
    ) -> SkillResponse<Vec<PullRequest>> {
        self.pulls(user_id, owner, repo, options)
            .await
            .map_err(SkillError::from)
            .into()
    }

    async fn create(
        &self,
        user_id: &str,
        owner: &str,
        repo: &str,
        issue: &NewIssue,
    ) -> Result<Issue, GithubError> {
        let token = self.api_key(user_id).await?;
        if issue.title.trim().is_empty() {
            return Err(GithubError::ValidationError(
                "Issue title is required.".to_string(),
            ));
        }
        let path = format!("/repos/{}/{}/issues", owner, repo);
        let created: Issue = self
            .send(self.request(Method::POST, &path, &token).json(issue), &path)
            .await?;
        info!(
            "[GitHub] Created issue #{} in {}/{}",
            created.number, owner, repo
        );
        Ok(created)
    }

    pub async fn create_issue(
        &self,
        user_id: &str,
        owner: &str,
        repo: &str,
        issue: &NewIssue,
    ) -> SkillResponse<Issue> {
        self.create(user_id, owner, repo, issue)
            .await
            .map_err(SkillError::from)
            .into()
    }
}
