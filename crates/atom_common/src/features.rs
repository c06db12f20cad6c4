//! Feature flag handling.
//!
//! Integrations are switched on twice: at compile time through the backend's
//! cargo features (`gcal`, `msteams`, `quickbooks`, `slack`, `stripe`,
//! `github`, `scheduling`, `openapi`) and at runtime through the `use_*` flags
//! of [`AppConfig`]. The helpers below answer the runtime half.

use atom_config::AppConfig;
use std::sync::Arc;

/// A feature is enabled when its flag is set and its config section is present.
pub fn is_feature_enabled<T>(use_feature: bool, feature_config: Option<&T>) -> bool {
    use_feature && feature_config.is_some()
}

#[cfg(feature = "gcal")]
pub fn is_gcal_enabled(config: &Arc<AppConfig>) -> bool {
    is_feature_enabled(config.use_gcal, config.google.as_ref())
}

#[cfg(feature = "msteams")]
pub fn is_msteams_enabled(config: &Arc<AppConfig>) -> bool {
    is_feature_enabled(config.use_msteams, config.msteams.as_ref())
}

#[cfg(feature = "quickbooks")]
pub fn is_quickbooks_enabled(config: &Arc<AppConfig>) -> bool {
    is_feature_enabled(config.use_quickbooks, config.quickbooks.as_ref())
}

/// Slack needs no section of its own; the bot token lives in `user_tokens`.
#[cfg(feature = "slack")]
pub fn is_slack_enabled(config: &Arc<AppConfig>) -> bool {
    config.use_slack
}

#[cfg(feature = "stripe")]
pub fn is_stripe_enabled(config: &Arc<AppConfig>) -> bool {
    config.use_stripe
}

#[cfg(feature = "github")]
pub fn is_github_enabled(config: &Arc<AppConfig>) -> bool {
    config.use_github
}

#[cfg(feature = "scheduling")]
pub fn is_scheduling_enabled(config: &Arc<AppConfig>) -> bool {
    is_feature_enabled(config.use_scheduling, config.hasura.as_ref())
}
