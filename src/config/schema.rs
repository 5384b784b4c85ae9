//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::auth::UserField;
use crate::error::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Server configuration for the HTTP API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3456
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Settings for the login driver itself
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Identifier reported alongside the user id by `get_user_id`
    #[serde(default = "default_driver_id")]
    pub driver_id: String,

    /// Name of the user table
    #[serde(default = "default_table_name")]
    pub table_name: String,

    /// Physical column names for each logical user field
    #[serde(default)]
    pub fields: FieldMap,

    /// Columns selected on lookups. `["*"]` selects everything; otherwise it
    /// must include the id, login_id, password, last_login and login_hash columns.
    #[serde(default = "default_table_columns")]
    pub table_columns: Vec<String>,

    /// Salt prepended when computing the login hash
    #[serde(default)]
    pub login_hash_salt: String,

    /// Salt used by the fixed password hash
    #[serde(default)]
    pub password_salt: String,

    /// Named connection under `[database.connections]`, `default` when unset
    #[serde(default)]
    pub db_connection: Option<String>,

    /// Rotate the session id on `force_login` the same way `login` does
    #[serde(default)]
    pub rotate_on_force_login: bool,
}

fn default_driver_id() -> String {
    "easyauth".to_string()
}

fn default_table_name() -> String {
    "users".to_string()
}

fn default_table_columns() -> Vec<String> {
    vec!["*".to_string()]
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            driver_id: default_driver_id(),
            table_name: default_table_name(),
            fields: FieldMap::default(),
            table_columns: default_table_columns(),
            login_hash_salt: String::new(),
            password_salt: String::new(),
            db_connection: None,
            rotate_on_force_login: false,
        }
    }
}

impl AuthConfig {
    /// Projection used for lookups, `None` meaning all columns
    pub fn projection(&self) -> Option<&[String]> {
        if self.table_columns.is_empty() || self.table_columns.iter().any(|c| c == "*") {
            None
        } else {
            Some(&self.table_columns)
        }
    }

    /// Check identifier syntax and that the projection can populate a record
    pub fn validate(&self) -> Result<()> {
        validate_identifier(&self.table_name)?;
        for field in UserField::ALL {
            validate_identifier(self.fields.column(field))?;
        }

        if let Some(columns) = self.projection() {
            for column in columns {
                validate_identifier(column)?;
            }
            for field in UserField::REQUIRED {
                let column = self.fields.column(field);
                if !columns.iter().any(|c| c == column) {
                    return Err(Error::Config(format!(
                        "table_columns must include '{}'",
                        column
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Column name mapping for the user table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMap {
    #[serde(default = "default_field_id")]
    pub id: String,

    #[serde(default = "default_field_username")]
    pub username: String,

    #[serde(default = "default_field_login_id")]
    pub login_id: String,

    #[serde(default = "default_field_password")]
    pub password: String,

    #[serde(default = "default_field_last_login")]
    pub last_login: String,

    #[serde(default = "default_field_login_hash")]
    pub login_hash: String,
}

fn default_field_id() -> String {
    "id".to_string()
}

fn default_field_username() -> String {
    "name".to_string()
}

fn default_field_login_id() -> String {
    "login_id".to_string()
}

fn default_field_password() -> String {
    "password".to_string()
}

fn default_field_last_login() -> String {
    "last_login".to_string()
}

fn default_field_login_hash() -> String {
    "login_hash".to_string()
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            id: default_field_id(),
            username: default_field_username(),
            login_id: default_field_login_id(),
            password: default_field_password(),
            last_login: default_field_last_login(),
            login_hash: default_field_login_hash(),
        }
    }
}

impl FieldMap {
    /// Physical column name for a logical field
    pub fn column(&self, field: UserField) -> &str {
        match field {
            UserField::Id => &self.id,
            UserField::Username => &self.username,
            UserField::LoginId => &self.login_id,
            UserField::Password => &self.password,
            UserField::LastLogin => &self.last_login,
            UserField::LoginHash => &self.login_hash,
        }
    }
}

/// Session cookie and expiry settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Sessions untouched for longer than this are discarded
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_minutes: i64,
}

fn default_cookie_name() -> String {
    "easyauth_session".to_string()
}

fn default_idle_timeout() -> i64 {
    30
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            idle_timeout_minutes: default_idle_timeout(),
        }
    }
}

/// Named database connections
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub connections: HashMap<String, ConnectionConfig>,
}

/// A single PostgreSQL connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// libpq-style connection string
    pub url: String,
}

impl Config {
    /// Connection selected by `auth.db_connection`
    pub fn connection(&self) -> Result<&ConnectionConfig> {
        let name = self.auth.db_connection.as_deref().unwrap_or("default");
        self.database
            .connections
            .get(name)
            .ok_or_else(|| Error::Config(format!("Database connection '{}' not configured", name)))
    }

    /// Validate all sections
    pub fn validate(&self) -> Result<()> {
        self.auth.validate()?;
        if self.session.cookie_name.is_empty() {
            return Err(Error::Config("session.cookie_name must not be empty".to_string()));
        }
        if self.session.idle_timeout_minutes <= 0 {
            return Err(Error::Config(
                "session.idle_timeout_minutes must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Only `[A-Za-z0-9_]` identifiers may be interpolated into SQL
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(Error::InvalidIdentifier(name.to_string()));
    }
    Ok(())
}
