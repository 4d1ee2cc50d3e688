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

fn row(label: &str, value: impl std::fmt::Display) {
    println!("  {:<22} {}", label.cyan(), value);
}

/// Print a summary of a loaded configuration, without secrets
pub fn print_config_summary(config: &Config) {
    println!("{}", "Server".bold());
    row("listen", format!("{}:{}", config.server.host, config.server.port));
    row("staging_dir", config.server.staging_dir.display());
    row(
        "cors_origin",
        config.server.cors_origin.as_deref().unwrap_or("* (permissive)"),
    );

    println!("{}", "Auth".bold());
    row("access_token_ttl", format!("{}s", config.auth.access_token_ttl_secs));
    row("refresh_token_ttl", format!("{}s", config.auth.refresh_token_ttl_secs));
    row("bcrypt_cost", config.auth.bcrypt_cost);
    row("secure_cookies", config.auth.secure_cookies);
    row("secrets", "<redacted>");

    println!("{}", "Media".bold());
    row("provider", format!("{:?}", config.media.provider).to_lowercase());
    match &config.media.cloudinary {
        Some(cloudinary) => row("cloud_name", &cloudinary.cloud_name),
        None => row("local_dir", config.media.local_dir.display()),
    }
}
