// --- File: crates/atom_common/src/lib.rs ---

// Declare modules within this crate
pub mod error; // Error handling
pub mod features; // Feature flag handling
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
pub mod oauth; // OAuth provider trait and token lifecycle
pub mod services; // Service abstractions
pub mod session; // SuperTokens session verification
pub mod skill; // `{ ok, data | error }` skill envelope

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(test)]
mod oauth_test;

// Re-export error types and utilities for easier access
pub use error::{
    auth_error, config_error, conflict, external_service_error, internal_error, not_found,
    validation_error, AtomError, Context, HttpStatusCode,
};

// Re-export HTTP utilities for easier access
pub use http::{
    client::{create_client, get_bearer, post_bearer, post_form, HTTP_CLIENT},
    handle_json_result, handle_result, map_error, method_not_allowed, redirect_with_flags,
    url_with_flags, IntoHttpResponse,
};

// Re-export logging utilities for easier access
pub use logging::{init, init_with_level, init_with_options, log_error, log_result, LogOptions};

pub use oauth::{OAuthError, OAuthProvider, TokenSet};
pub use session::{access_token_from_headers, cookie_value, require_session, SuperTokensVerifier};
pub use skill::{SkillError, SkillResponse};

// Re-export feature flag handling utilities for easier access
pub use features::is_feature_enabled;

#[cfg(feature = "gcal")]
pub use features::is_gcal_enabled;

#[cfg(feature = "msteams")]
pub use features::is_msteams_enabled;

#[cfg(feature = "quickbooks")]
pub use features::is_quickbooks_enabled;

#[cfg(feature = "slack")]
pub use features::is_slack_enabled;

#[cfg(feature = "stripe")]
pub use features::is_stripe_enabled;

#[cfg(feature = "github")]
pub use features::is_github_enabled;

#[cfg(feature = "scheduling")]
pub use features::is_scheduling_enabled;
