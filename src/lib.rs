//! EasyAuth - session-bound login hash authentication
//!
//! This is the library interface for EasyAuth: a login driver that checks
//! credentials against a user table and keeps each session tied to a login
//! hash stored on the user's row.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;

pub use auth::{Authenticator, SessionAuthenticator};
pub use config::Config;
pub use error::Error;
