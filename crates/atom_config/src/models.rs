// --- File: crates/atom_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

// --- Frontend redirect targets ---
// OAuth callbacks redirect the browser back into the web app with status flags.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FrontendConfig {
    #[serde(default = "default_settings_path")]
    pub settings_path: String,
    #[serde(default = "default_login_path")]
    pub login_path: String,
    #[serde(default = "default_msteams_login_path")]
    pub msteams_login_path: String,
}

fn default_settings_path() -> String {
    "/Settings/UserViewSettings".to_string()
}

fn default_login_path() -> String {
    "/User/Login/UserLogin".to_string()
}

fn default_msteams_login_path() -> String {
    "/Auth/UserLogin".to_string()
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            settings_path: default_settings_path(),
            login_path: default_login_path(),
            msteams_login_path: default_msteams_login_path(),
        }
    }
}

// --- Hasura GraphQL ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct HasuraConfig {
    pub graphql_url: String,
    pub admin_secret: String, // Loaded via HASURA_ADMIN_SECRET with "secret_from_env"
    pub max_retries: Option<u32>,
    pub timeout_secs: Option<u64>,
}

// --- SuperTokens core ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SessionConfig {
    pub connection_uri: String,
    pub api_key: Option<String>,
}

// --- Google Calendar OAuth ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct GoogleConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Overrides for tests or proxies; the public Google endpoints are used otherwise.
    pub auth_url: Option<String>,
    pub token_url: Option<String>,
    pub revoke_url: Option<String>,
    pub calendar_api_base: Option<String>,
}

// --- Microsoft Teams / Graph OAuth ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct MsTeamsConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub tenant: Option<String>,
    pub redirect_uri: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    pub authority_base: Option<String>,
}

// --- QuickBooks Online ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct QuickBooksConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    /// "sandbox" or "production"
    pub environment: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
    pub api_base: Option<String>,
    pub auth_url: Option<String>,
    pub token_url: Option<String>,
    pub revoke_url: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SlackConfig {
    pub api_base: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct StripeConfig {
    pub api_base: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct GithubConfig {
    pub api_base: Option<String>,
    pub user_agent: Option<String>,
}

// --- Meeting scheduling ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SchedulingConfig {
    /// Used when neither the request nor the user's preferences carry a duration.
    pub default_duration_minutes: Option<i64>,
    /// Calendar integration name stored on created events.
    pub calendar_resource: Option<String>,
}

// --- Search index (OpenSearch) ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SearchConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub event_index: Option<String>,
    pub train_event_index: Option<String>,
}

// --- OpenAI (meeting extraction) ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: Option<String>,
    pub api_base: Option<String>,
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,
    #[serde(default)]
    pub frontend: FrontendConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_gcal: bool,
    #[serde(default)]
    pub use_msteams: bool,
    #[serde(default)]
    pub use_quickbooks: bool,
    #[serde(default)]
    pub use_slack: bool,
    #[serde(default)]
    pub use_stripe: bool,
    #[serde(default)]
    pub use_github: bool,
    #[serde(default)]
    pub use_scheduling: bool,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub hasura: Option<HasuraConfig>,
    #[serde(default)]
    pub session: Option<SessionConfig>,
    #[serde(default)]
    pub google: Option<GoogleConfig>,
    #[serde(default)]
    pub msteams: Option<MsTeamsConfig>,
    #[serde(default)]
    pub quickbooks: Option<QuickBooksConfig>,
    #[serde(default)]
    pub slack: Option<SlackConfig>,
    #[serde(default)]
    pub stripe: Option<StripeConfig>,
    #[serde(default)]
    pub github: Option<GithubConfig>,
    #[serde(default)]
    pub scheduling: Option<SchedulingConfig>,
    #[serde(default)]
    pub search: Option<SearchConfig>,
    #[serde(default)]
    pub openai: Option<OpenAiConfig>,
}
