//! CLI output formatting utilities

use colored::Colorize;

use crate::config::Config;

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print a warning message
pub fn warn(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

/// Print a summary of the loaded configuration, without secrets
pub fn print_config_summary(config: &Config) {
    let auth = &config.auth;

    println!("{}", "Configuration".bold().underline());
    println!();
    println!("  {} {}:{}", "Server:".bold(), config.server.host, config.server.port);
    println!("  {} {}", "Driver:".bold(), auth.driver_id);
    println!("  {} {}", "Table:".bold(), auth.table_name);
    println!("  {} {}", "Columns:".bold(), auth.table_columns.join(", "));
    println!(
        "  {} {}",
        "Connection:".bold(),
        auth.db_connection.as_deref().unwrap_or("default")
    );
    println!(
        "  {} {}",
        "Login hash salt:".bold(),
        if auth.login_hash_salt.is_empty() {
            "not set".yellow()
        } else {
            "set".green()
        }
    );
    println!(
        "  {} {}",
        "Rotate on force login:".bold(),
        auth.rotate_on_force_login
    );

    println!();
    println!("  {}", "Fields:".bold());
    println!("    id         -> {}", auth.fields.id);
    println!("    username   -> {}", auth.fields.username);
    println!("    login_id   -> {}", auth.fields.login_id);
    println!("    password   -> {}", auth.fields.password);
    println!("    last_login -> {}", auth.fields.last_login);
    println!("    login_hash -> {}", auth.fields.login_hash);

    println!();
    println!(
        "  {} {} ({} min idle)",
        "Session cookie:".bold(),
        config.session.cookie_name,
        config.session.idle_timeout_minutes
    );
}

/// Confirm an action with the user
pub fn confirm(message: &str) -> bool {
    use std::io::{self, Write};

    print!("{} [y/N] ", message);
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }

    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}
