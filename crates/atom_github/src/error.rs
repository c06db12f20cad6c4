// --- File: crates/atom_github/src/error.rs ---
use atom_common::{AtomError, HttpStatusCode, SkillError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GithubError {
    #[error("GitHub API key not configured.")]
    ConfigError,

    #[error("{0}")]
    ValidationError(String),

    #[error("GitHub resource not found: {0}")]
    NotFound(String),

    #[error("GitHub rejected the credentials: {0}")]
    Unauthorized(String),

    #[error("GitHub API returned {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("GitHub request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Failed to parse GitHub response: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] AtomError),
}

impl GithubError {
    pub fn code(&self) -> &str {
        match self {
            GithubError::ConfigError => "GITHUB_CONFIG_ERROR",
            GithubError::ValidationError(_) => "VALIDATION_ERROR",
            GithubError::NotFound(_) => "GITHUB_NOT_FOUND",
            GithubError::Unauthorized(_) => "GITHUB_AUTH_ERROR",
            GithubError::ApiError { .. } | GithubError::ParseError(_) => "GITHUB_API_ERROR",
            GithubError::RequestError(_) => "NETWORK_ERROR",
            GithubError::Store(e) => e.code(),
        }
    }
}

impl HttpStatusCode for GithubError {
    fn status_code(&self) -> u16 {
        match self {
            GithubError::ConfigError => 500,
            GithubError::ValidationError(_) => 400,
            GithubError::NotFound(_) => 404,
            GithubError::Unauthorized(_) => 401,
            GithubError::ApiError { .. } | GithubError::ParseError(_) | GithubError::RequestError(_) => 502,
            GithubError::Store(e) => e.status_code(),
        }
    }
}

impl From<GithubError> for SkillError {
    fn from(err: GithubError) -> Self {
        SkillError::new(err.code(), err.to_string()).with_status(err.status_code())
    }
}
