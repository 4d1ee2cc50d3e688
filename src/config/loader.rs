//! Configuration loading and environment variable interpolation

use crate::error::{Error, Result};
use regex::Regex;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::Config;

pub const CONFIG_FILENAME: &str = "vidtube.toml";

/// Load and validate configuration from vidtube.toml
pub fn load_config() -> Result<Config> {
    let config_path = find_config_file()?;
    load_config_from_path(&config_path)
}

/// Load and validate configuration from a specific path
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|_| Error::ConfigNotFound)?;
    let config = parse_config(&content)?;
    tracing::debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Parse configuration text, interpolating environment variables first
pub fn parse_config(content: &str) -> Result<Config> {
    let content = interpolate_env_vars(content);
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Find the configuration file, searching upward from current directory
fn find_config_file() -> Result<PathBuf> {
    let mut current = env::current_dir().map_err(|e| Error::Config(e.to_string()))?;

    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Ok(config_path);
        }

        if !current.pop() {
            return Err(Error::ConfigNotFound);
        }
    }
}

/// Interpolate environment variables in the format ${VAR_NAME} or ${VAR_NAME:-default}
fn interpolate_env_vars(content: &str) -> String {
    // Compile-time constant pattern; a failure here is a bug, not a runtime condition
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}")
        .expect("Invalid regex pattern - this is a bug in the codebase");

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");

        env::var(var_name).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}

/// Generate a default configuration file content
pub fn default_config_content() -> &'static str {
    r#"# vidtube configuration

[server]
host = "0.0.0.0"
port = 8000
staging_dir = "./public/temp"
# cors_origin = "http://localhost:5173"

[auth]
access_token_secret = "${ACCESS_TOKEN_SECRET}"
access_token_ttl_secs = 86400     # 1 day
refresh_token_secret = "${REFRESH_TOKEN_SECRET}"
refresh_token_ttl_secs = 864000   # 10 days
bcrypt_cost = 10
secure_cookies = true

[media]
provider = "local"  # or "cloudinary"
local_dir = "./public/media"
public_base_url = "/media"

# [media.cloudinary]
# cloud_name = "${CLOUDINARY_CLOUD_NAME}"
# upload_preset = "${CLOUDINARY_UPLOAD_PRESET}"
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_interpolation() {
        env::set_var("VIDTUBE_TEST_VAR", "hello");
        let content = "value = \"${VIDTUBE_TEST_VAR}\"";
        let result = interpolate_env_vars(content);
        assert_eq!(result, "value = \"hello\"");
        env::remove_var("VIDTUBE_TEST_VAR");
    }

    #[test]
    fn test_env_interpolation_with_default() {
        let content = "value = \"${NONEXISTENT_VAR:-default_value}\"";
        let result = interpolate_env_vars(content);
        assert_eq!(result, "value = \"default_value\"");
    }

    #[test]
    fn test_default_config_with_secrets_parses() {
        let content = default_config_content()
            .replace("${ACCESS_TOKEN_SECRET}", "a-secret")
            .replace("${REFRESH_TOKEN_SECRET}", "r-secret");
        let config = parse_config(&content).expect("default config should parse");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.auth.access_token_ttl_secs, 86400);
    }

    #[test]
    fn test_default_config_without_secrets_rejected() {
        let content = default_config_content()
            .replace("${ACCESS_TOKEN_SECRET}", "")
            .replace("${REFRESH_TOKEN_SECRET}", "");
        assert!(matches!(parse_config(&content), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config_from_path(Path::new("/nonexistent/vidtube.toml"));
        assert!(matches!(result, Err(Error::ConfigNotFound)));
    }
}
