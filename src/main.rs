use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use easyauth::cli::{self, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "easyauth=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force } => cli::commands::init(force).await,
        Commands::Serve { host, port } => cli::commands::serve(cli.config, host, port).await,
        Commands::HashPassword { password, salt } => {
            cli::commands::hash_password(cli.config, &password, salt).await
        }
        Commands::LoginHash {
            login_id,
            timestamp,
            salt,
        } => cli::commands::login_hash(cli.config, &login_id, timestamp, salt).await,
        Commands::CheckConfig { format } => cli::commands::check_config(cli.config, format).await,
    }
}
