//! CLI command implementations

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use crate::auth::hash;
use crate::auth::{Clock, SystemClock};
use crate::cli::{confirm, error, info, print_config_summary, success, warn, OutputFormat};
use crate::config::{self, loader::CONFIG_FILENAME, Config};

const SALT_LENGTH: usize = 32;

/// Initialize a new easyauth.toml configuration file
pub async fn init(force: bool) -> Result<()> {
    let config_path = Path::new(CONFIG_FILENAME);

    if config_path.exists() && !force && !confirm("easyauth.toml already exists. Overwrite?") {
        warn("Keeping existing easyauth.toml");
        return Ok(());
    }

    let content = config::loader::default_config_content(
        &hash::generate_salt(SALT_LENGTH),
        &hash::generate_salt(SALT_LENGTH),
    );
    fs::write(config_path, content)?;

    success("Created easyauth.toml");
    info("Set EASYAUTH_DATABASE_URL or edit [database.connections.default], then run 'easyauth serve'");

    Ok(())
}

/// Start the HTTP login server
pub async fn serve(config_path: Option<PathBuf>, host: Option<String>, port: Option<u16>) -> Result<()> {
    let config = load_config(config_path)?;
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    info(&format!("Starting server at http://{}:{}", host, port));

    if let Err(e) = crate::api::run_server(config, &host, port).await {
        error(&format!("Server stopped: {}", e));
        return Err(e.into());
    }
    Ok(())
}

/// Print the stored form of a password
pub async fn hash_password(config_path: Option<PathBuf>, password: &str, salt: Option<String>) -> Result<()> {
    let salt = match salt {
        Some(salt) => salt,
        None => load_config(config_path)?.auth.password_salt,
    };

    println!("{}", hash::hash_password(password, &salt));
    Ok(())
}

/// Print the login hash for a login id
pub async fn login_hash(
    config_path: Option<PathBuf>,
    login_id: &str,
    timestamp: Option<i64>,
    salt: Option<String>,
) -> Result<()> {
    let salt = match salt {
        Some(salt) => salt,
        None => load_config(config_path)?.auth.login_hash_salt,
    };
    let timestamp = timestamp.unwrap_or_else(|| SystemClock.now());

    println!("{}", hash::login_hash(&salt, login_id, timestamp));
    Ok(())
}

/// Load, validate and print the configuration
pub async fn check_config(config_path: Option<PathBuf>, format: OutputFormat) -> Result<()> {
    let config = load_config(config_path)?;
    if config.connection().is_err() {
        warn("No database connection configured for auth.db_connection");
    }

    match format {
        OutputFormat::Table => {
            print_config_summary(&config);
            println!();
            success("Configuration is valid");
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&redacted(config))?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(&redacted(config))?;
            println!("{}", yaml);
        }
    }

    Ok(())
}

/// Replace salts and connection strings before printing
fn redacted(mut config: Config) -> Config {
    const MASK: &str = "********";

    if !config.auth.login_hash_salt.is_empty() {
        config.auth.login_hash_salt = MASK.to_string();
    }
    if !config.auth.password_salt.is_empty() {
        config.auth.password_salt = MASK.to_string();
    }
    for connection in config.database.connections.values_mut() {
        connection.url = MASK.to_string();
    }
    config
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => config::load_config_from_path(&path),
        None => config::load_config(),
    };
    config.map_err(|e| anyhow::anyhow!("{}", e))
}
