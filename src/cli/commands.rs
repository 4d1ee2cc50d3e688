//! CLI command implementations

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::{error, info, print_config_summary, success, warn};
use crate::config::{self, loader::CONFIG_FILENAME, Config};

/// Write a default vidtube.toml configuration file
pub async fn init(force: bool) -> Result<()> {
    let config_path = Path::new(CONFIG_FILENAME);

    if config_path.exists() && !force {
        warn("vidtube.toml already exists (use --force to overwrite)");
        return Ok(());
    }

    fs::write(config_path, config::loader::default_config_content())?;

    success("Created vidtube.toml");
    info("Set ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET, then run 'vidtube serve'");

    Ok(())
}

/// Start the HTTP API server
pub async fn serve(host: Option<String>, port: Option<u16>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path.as_deref())?;
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    info(&format!("Starting server at http://{}:{}", host, port));

    crate::api::run_server(config, &host, port).await?;
    Ok(())
}

/// Load, validate and summarise the configuration
pub async fn check(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path.as_deref())?;
    print_config_summary(&config);
    success("Configuration is valid");
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let result = match path {
        Some(path) => config::load_config_from_path(path),
        None => config::load_config(),
    };
    result.map_err(|e| {
        error(&e.to_string());
        e.into()
    })
}
