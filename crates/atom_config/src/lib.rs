// --- File: crates/atom_config/src/lib.rs ---
use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use std::env;
use std::path::PathBuf;
use tracing::warn;

pub mod env_vars;
pub mod models;
pub mod secrets;

pub use models::*;

/// Loads the application configuration.
///
/// Sources, later ones winning:
/// 1. `config/default.*`
/// 2. `config/{RUN_ENV}.*` (RUN_ENV defaults to `debug`)
/// 3. `ATOM__SECTION__KEY` environment variables (prefix overridable via `PREFIX`)
///
/// Afterwards `secret_from_env` markers are resolved and `encrypted:` values
/// decrypted.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let prefix = env_vars::get_config_prefix();
    let config_dir = config_dir();

    let default_path = config_dir.join("default");
    let env_path = config_dir.join(&run_env);

    let builder = Config::builder()
        .add_source(File::with_name(&default_path.to_string_lossy()).required(false))
        .add_source(File::with_name(&env_path.to_string_lossy()).required(false))
        .add_source(Environment::with_prefix(&prefix).separator("__"));

    let raw_config: AppConfig = builder.build()?.try_deserialize()?;
    apply_env_overrides_from_marker(raw_config)
}

/// Directory holding the config files: `ATOM_CONFIG_DIR`, else `<workspace>/config`.
fn config_dir() -> PathBuf {
    if let Ok(dir) = env::var("ATOM_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    let workspace_config = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map(|root| root.join("config"));
    match workspace_config {
        Some(dir) if dir.exists() => dir,
        _ => PathBuf::from("config"),
    }
}

/// Applies environment overrides for `secret_from_env` markers and decrypts
/// `encrypted:` values in the serialized config.
pub fn apply_env_overrides_from_marker(config: AppConfig) -> Result<AppConfig, ConfigError> {
    let mut json = serde_json::to_value(&config)
        .map_err(|err| ConfigError::Message(format!("failed to serialize config: {err}")))?;

    for path in env_vars::inject_env_vars(&mut json) {
        warn!("env var for {} not found for secret_from_env", path);
    }

    if secrets::contains_encrypted(&json) {
        secrets::process_json_for_decryption(&mut json)
            .map_err(|err| ConfigError::Message(format!("failed to decrypt config: {err}")))?;
    }

    serde_json::from_value(json)
        .map_err(|err| ConfigError::Message(format!("failed to rebuild config: {err}")))
}

/// A config value that is present, non-empty and not an unresolved `secret_from_env` marker.
pub fn configured_value(value: &Option<String>) -> Option<&str> {
    value.as_deref().and_then(configured_str)
}

/// [`configured_value`] for required string fields.
pub fn configured_str(value: &str) -> Option<&str> {
    Some(value.trim()).filter(|v| !v.is_empty() && *v != env_vars::SECRET_FROM_ENV_MARKER)
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Ensures that the dotenv file is loaded into the environment variables.
///
/// The file is `DOTENV_OVERRIDE` if set, else a first CLI argument starting
/// with `.env`, else `.env`. Loading happens once per process; the chosen path
/// is returned.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path_override = env::var("DOTENV_OVERRIDE").ok();
    let dotenv_path_arg = env::args().nth(1).filter(|s| s.starts_with(".env"));

    let dotenv_path = dotenv_path_override
        .or(dotenv_path_arg)
        .unwrap_or_else(|| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_is_replaced_from_plain_env_name() {
        env::set_var("HASURA_ADMIN_SECRET", "from-env");
        let config = AppConfig {
            hasura: Some(HasuraConfig {
                graphql_url: "http://localhost:8080/v1/graphql".to_string(),
                admin_secret: "secret_from_env".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        };

        let config = apply_env_overrides_from_marker(config).unwrap();

        assert_eq!(config.hasura.unwrap().admin_secret, "from-env");
        env::remove_var("HASURA_ADMIN_SECRET");
    }

    #[test]
    fn unresolved_marker_is_not_configured() {
        assert_eq!(configured_value(&Some("secret_from_env".to_string())), None);
        assert_eq!(configured_value(&Some("  ".to_string())), None);
        assert_eq!(configured_value(&None), None);
        assert_eq!(configured_value(&Some("abc".to_string())), Some("abc"));
        assert_eq!(configured_str(""), None);
        assert_eq!(configured_str("https://hasura/v1/graphql"), Some("https://hasura/v1/graphql"));
    }

    #[test]
    fn frontend_defaults_apply_when_section_missing() {
        let config: AppConfig = serde_json::from_value(serde_json::json!({
            "server": { "host": "0.0.0.0", "port": 3000 }
        }))
        .unwrap();
        assert_eq!(config.frontend.settings_path, "/Settings/UserViewSettings");
        assert_eq!(config.frontend.login_path, "/User/Login/UserLogin");
        assert!(!config.use_gcal);
        assert!(config.hasura.is_none());
    }
}
