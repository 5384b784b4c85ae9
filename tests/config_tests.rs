//! Configuration loading tests

use easyauth::config::{self, loader, Config};
use easyauth::error::Error;
use std::fs;

#[test]
fn test_empty_file_uses_defaults() {
    let config = loader::parse_config("").expect("empty config should parse");

    assert_eq!(config.server.port, 3456);
    assert_eq!(config.auth.driver_id, "easyauth");
    assert_eq!(config.auth.table_name, "users");
    assert_eq!(config.auth.fields.username, "name");
    assert_eq!(config.auth.table_columns, vec!["*".to_string()]);
    assert!(config.auth.login_hash_salt.is_empty());
    assert!(config.auth.db_connection.is_none());
    assert!(!config.auth.rotate_on_force_login);
    assert_eq!(config.session.cookie_name, "easyauth_session");
}

#[test]
fn test_custom_field_mapping() {
    let content = r#"
[auth]
table_name = "members"
table_columns = ["member_id", "email", "pass", "seen_at", "token", "nick"]
login_hash_salt = "abc"
db_connection = "accounts"

[auth.fields]
id = "member_id"
username = "nick"
login_id = "email"
password = "pass"
last_login = "seen_at"
login_hash = "token"

[database.connections.accounts]
url = "host=db user=app"
"#;

    let config = loader::parse_config(content).expect("config should parse");
    assert_eq!(config.auth.table_name, "members");
    assert_eq!(config.auth.fields.login_hash, "token");
    assert_eq!(config.auth.projection().map(|p| p.len()), Some(6));
    assert_eq!(config.connection().unwrap().url, "host=db user=app");
}

#[test]
fn test_projection_must_include_required_columns() {
    let content = r#"
[auth]
table_columns = ["id", "login_id", "password"]
"#;

    let result = loader::parse_config(content);
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_rejects_unsafe_column_name() {
    let content = r#"
[auth.fields]
login_hash = "login_hash = '' --"
"#;

    let result = loader::parse_config(content);
    assert!(matches!(result, Err(Error::InvalidIdentifier(_))));
}

#[test]
fn test_rejects_non_positive_idle_timeout() {
    let result = loader::parse_config("[session]\nidle_timeout_minutes = -1\n");
    assert!(matches!(result, Err(Error::Config(_))));

    let result = loader::parse_config("[session]\nidle_timeout_minutes = 0\n");
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_env_var_in_salt() {
    std::env::set_var("EASYAUTH_CONFIG_TEST_SALT", "from-env");
    let content = r#"
[auth]
login_hash_salt = "${EASYAUTH_CONFIG_TEST_SALT}"
password_salt = "${EASYAUTH_CONFIG_TEST_MISSING:-fallback}"
"#;

    let config = loader::parse_config(content).expect("config should parse");
    assert_eq!(config.auth.login_hash_salt, "from-env");
    assert_eq!(config.auth.password_salt, "fallback");
    std::env::remove_var("EASYAUTH_CONFIG_TEST_SALT");
}

#[test]
fn test_load_from_path() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("easyauth.toml");
    fs::write(&path, loader::default_config_content("salt", "pepper")).unwrap();

    let config = config::load_config_from_path(&path).expect("config should load");
    assert_eq!(config.auth.login_hash_salt, "salt");
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let result = config::load_config_from_path(&dir.path().join("nope.toml"));
    assert!(matches!(result, Err(Error::ConfigNotFound)));
}

#[test]
fn test_save_and_reload() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("easyauth.toml");

    let mut config = Config::default();
    config.auth.login_hash_salt = "roundtrip".to_string();
    config.auth.rotate_on_force_login = true;
    config::save_config(&config, &path).expect("config should save");

    let loaded = config::load_config_from_path(&path).expect("config should load");
    assert_eq!(loaded.auth.login_hash_salt, "roundtrip");
    assert!(loaded.auth.rotate_on_force_login);
}
