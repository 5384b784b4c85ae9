//! Configuration loading and environment variable interpolation

use crate::error::{Error, Result};
use regex::Regex;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::Config;

pub const CONFIG_FILENAME: &str = "easyauth.toml";

/// Load configuration from easyauth.toml
pub fn load_config() -> Result<Config> {
    let config_path = find_config_file()?;
    load_config_from_path(&config_path)
}

/// Load configuration from a specific path
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|_| Error::ConfigNotFound)?;
    let config = parse_config(&content)?;
    tracing::debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Parse and validate configuration text
pub fn parse_config(content: &str) -> Result<Config> {
    let content = interpolate_env_vars(content);
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Write configuration to a path
pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
    fs::write(path, content)?;
    Ok(())
}

/// Find the configuration file, searching upward from current directory
fn find_config_file() -> Result<PathBuf> {
    let mut current = env::current_dir().map_err(|e| Error::Config(e.to_string()))?;

    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Ok(config_path);
        }

        if !current.pop() {
            return Err(Error::ConfigNotFound);
        }
    }
}

/// Interpolate environment variables in the format ${VAR_NAME} or ${VAR_NAME:-default}
fn interpolate_env_vars(content: &str) -> String {
    // This regex is a compile-time constant, panicking is acceptable here
    // as it indicates a programming error in the codebase, not a runtime issue
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}")
        .expect("Invalid regex pattern - this is a bug in the codebase");

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");

        env::var(var_name).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}

/// Generate a default configuration file content with the given salts
pub fn default_config_content(login_hash_salt: &str, password_salt: &str) -> String {
    format!(
        r#"# EasyAuth Configuration

[server]
host = "0.0.0.0"
port = 3456

[auth]
driver_id = "easyauth"
table_name = "users"
# Columns selected on lookups; must include id, login_id, password,
# last_login and login_hash when not "*"
table_columns = ["*"]
login_hash_salt = "{login_hash_salt}"
password_salt = "{password_salt}"
# db_connection = "default"
# Rotate the session id on force_login as login does
rotate_on_force_login = false

[auth.fields]
id = "id"
username = "name"
login_id = "login_id"
password = "password"
last_login = "last_login"
login_hash = "login_hash"

[session]
cookie_name = "easyauth_session"
idle_timeout_minutes = 30

[database.connections.default]
url = "${{EASYAUTH_DATABASE_URL:-host=localhost user=postgres password=postgres dbname=app}}"
"#
    )
}
