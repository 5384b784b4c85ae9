//! Error types for EasyAuth

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("User not logged in, can't create login hash")]
    NotLoggedIn,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config file not found. Run 'easyauth init' first.")]
    ConfigNotFound,

    #[error("Invalid SQL identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    #[error("Session store error: {0}")]
    Session(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
