//! Environment variable naming for the Atom service.
//!
//! Configuration values map to `ATOM__SECTION__KEY`, secrets to
//! `ATOM_SECRET_SECTION_KEY`. Values written as `secret_from_env` in a config
//! file are resolved through [`inject_env_vars`].

use std::env;

/// The default prefix for configuration environment variables
pub const DEFAULT_PREFIX: &str = "ATOM";

/// The prefix for secret environment variables
pub const SECRET_PREFIX: &str = "ATOM_SECRET";

/// The separator for configuration environment variables
pub const CONFIG_SEPARATOR: &str = "__";

/// The separator for secret environment variables
pub const SECRET_SEPARATOR: &str = "_";

/// Marker value that defers a config entry to the environment
pub const SECRET_FROM_ENV_MARKER: &str = "secret_from_env";

/// Get the prefix for configuration environment variables
pub fn get_config_prefix() -> String {
    env::var("PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string())
}

/// Convert a configuration path to an environment variable name
///
/// `"server.host"` becomes `"ATOM__SERVER__HOST"`.
pub fn config_path_to_env_var(path: &str) -> String {
    let prefix = get_config_prefix();
    let path = path.replace('.', CONFIG_SEPARATOR);
    format!("{}{}{}", prefix, CONFIG_SEPARATOR, path).to_uppercase()
}

/// Convert a secret path to an environment variable name
///
/// `"google.client_secret"` becomes `"ATOM_SECRET_GOOGLE_CLIENT_SECRET"`.
pub fn secret_path_to_env_var(path: &str) -> String {
    let path = path.replace('.', SECRET_SEPARATOR);
    format!("{}{}{}", SECRET_PREFIX, SECRET_SEPARATOR, path).to_uppercase()
}

/// Plain name of a secret path, the form most deployments already export.
///
/// `"hasura.admin_secret"` becomes `"HASURA_ADMIN_SECRET"`.
pub fn legacy_secret_path_to_env_var(path: &str) -> String {
    path.replace('.', SECRET_SEPARATOR).to_uppercase()
}

/// Get an environment variable for a configuration path
pub fn get_config_env_var(path: &str) -> Option<String> {
    env::var(config_path_to_env_var(path)).ok()
}

/// Get an environment variable for a secret path, trying the prefixed name first.
pub fn get_secret_env_var(path: &str) -> Option<String> {
    if let Ok(value) = env::var(secret_path_to_env_var(path)) {
        return Some(value);
    }
    env::var(legacy_secret_path_to_env_var(path)).ok()
}

/// Paths containing "secret", "key", "password" or "token" are treated as secrets.
pub fn is_secret_path(path: &str) -> bool {
    let path_lower = path.to_lowercase();
    path_lower.contains("secret")
        || path_lower.contains("key")
        || path_lower.contains("password")
        || path_lower.contains("token")
}

/// Resolve a `secret_from_env` path.
///
/// Lookup order: `HASURA_ADMIN_SECRET` style, then the prefixed secret or
/// config name.
pub fn get_env_var(path: &str) -> Option<String> {
    if let Ok(value) = env::var(legacy_secret_path_to_env_var(path)) {
        return Some(value);
    }
    if is_secret_path(path) {
        get_secret_env_var(path)
    } else {
        get_config_env_var(path)
    }
}

/// Replace every `secret_from_env` string in `value` with its environment value.
///
/// Returns the dotted paths that could not be resolved.
pub fn inject_env_vars(value: &mut serde_json::Value) -> Vec<String> {
    use serde_json::Value;

    fn walk(path: Vec<String>, obj: &mut Value, missing: &mut Vec<String>) {
        match obj {
            Value::Object(map) => {
                for (k, v) in map.iter_mut() {
                    let mut new_path = path.clone();
                    new_path.push(k.to_string());
                    walk(new_path, v, missing);
                }
            }
            Value::Array(arr) => {
                for (i, v) in arr.iter_mut().enumerate() {
                    let mut new_path = path.clone();
                    new_path.push(i.to_string());
                    walk(new_path, v, missing);
                }
            }
            Value::String(s) if s == SECRET_FROM_ENV_MARKER => {
                let path_str = path.join(".");
                match get_env_var(&path_str) {
                    Some(env_val) => *s = env_val,
                    None => missing.push(path_str),
                }
            }
            _ => {}
        }
    }

    let mut missing = Vec::new();
    walk(vec![], value, &mut missing);
    missing
}
