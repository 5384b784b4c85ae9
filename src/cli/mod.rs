//! CLI interface for EasyAuth

pub mod commands;
mod output;

pub use output::*;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "easyauth")]
#[command(version)]
#[command(about = "Session-bound login hash authentication", long_about = None)]
pub struct Cli {
    /// Path to easyauth.toml (searched upward from the current directory by default)
    #[arg(short, long, global = true, env = "EASYAUTH_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an easyauth.toml with freshly generated salts
    Init {
        /// Overwrite an existing file without asking
        #[arg(short, long)]
        force: bool,
    },

    /// Start the HTTP login server
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the stored form of a password
    HashPassword {
        password: String,

        /// Salt to use instead of auth.password_salt
        #[arg(long)]
        salt: Option<String>,
    },

    /// Print the login hash for a login id at a given time
    LoginHash {
        /// Login id of the user
        #[arg(short, long)]
        login_id: String,

        /// Unix timestamp (defaults to now)
        #[arg(short, long)]
        timestamp: Option<i64>,

        /// Salt to use instead of auth.login_hash_salt
        #[arg(long)]
        salt: Option<String>,
    },

    /// Load and validate the configuration
    CheckConfig {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}
