//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub media: MediaConfig,
}

/// Server configuration for the HTTP API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Where multipart uploads are written before being handed to the media provider
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,

    /// Allowed CORS origin. Permissive when unset.
    #[serde(default)]
    pub cors_origin: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_staging_dir() -> PathBuf {
    PathBuf::from("./public/temp")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            staging_dir: default_staging_dir(),
            cors_origin: None,
        }
    }
}

/// Token secrets, lifetimes and password hashing cost
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub access_token_secret: String,

    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_secs: u64,

    #[serde(default)]
    pub refresh_token_secret: String,

    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl_secs: u64,

    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,

    /// Mark session cookies `Secure`. Only disable for plain-HTTP development.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,
}

fn default_access_ttl() -> u64 {
    24 * 60 * 60
}

fn default_refresh_ttl() -> u64 {
    10 * 24 * 60 * 60
}

fn default_bcrypt_cost() -> u32 {
    10
}

fn default_secure_cookies() -> bool {
    true
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: String::new(),
            access_token_ttl_secs: default_access_ttl(),
            refresh_token_secret: String::new(),
            refresh_token_ttl_secs: default_refresh_ttl(),
            bcrypt_cost: default_bcrypt_cost(),
            secure_cookies: default_secure_cookies(),
        }
    }
}

// Secrets stay out of logs and `check` output.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("access_token_secret", &"<redacted>")
            .field("access_token_ttl_secs", &self.access_token_ttl_secs)
            .field("refresh_token_secret", &"<redacted>")
            .field("refresh_token_ttl_secs", &self.refresh_token_ttl_secs)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("secure_cookies", &self.secure_cookies)
            .finish()
    }
}

/// Explicit token configuration injected into the token issuer and verifier
#[derive(Clone)]
pub struct TokenConfig {
    pub access_secret: String,
    pub access_ttl: Duration,
    pub refresh_secret: String,
    pub refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl AuthConfig {
    /// Check secrets, lifetimes and hashing cost
    pub fn validate(&self) -> Result<()> {
        if self.access_token_secret.trim().is_empty() {
            return Err(Error::Config("auth.access_token_secret must be set".to_string()));
        }
        if self.refresh_token_secret.trim().is_empty() {
            return Err(Error::Config("auth.refresh_token_secret must be set".to_string()));
        }
        if self.access_token_secret == self.refresh_token_secret {
            return Err(Error::Config(
                "access and refresh token secrets must differ".to_string(),
            ));
        }
        if self.access_token_ttl_secs == 0 || self.refresh_token_ttl_secs == 0 {
            return Err(Error::Config("token lifetimes must be positive".to_string()));
        }
        if self.access_token_ttl_secs >= self.refresh_token_ttl_secs {
            return Err(Error::Config(
                "access token lifetime must be shorter than refresh token lifetime".to_string(),
            ));
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(Error::Config(format!(
                "bcrypt_cost must be between 4 and 31, got {}",
                self.bcrypt_cost
            )));
        }
        Ok(())
    }

    pub fn token_config(&self) -> TokenConfig {
        TokenConfig {
            access_secret: self.access_token_secret.clone(),
            access_ttl: Duration::from_secs(self.access_token_ttl_secs),
            refresh_secret: self.refresh_token_secret.clone(),
            refresh_ttl: Duration::from_secs(self.refresh_token_ttl_secs),
        }
    }
}

/// Where uploaded profile images end up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    #[serde(default)]
    pub provider: MediaProvider,

    #[serde(default = "default_local_dir")]
    pub local_dir: PathBuf,

    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    #[serde(default)]
    pub cloudinary: Option<CloudinaryConfig>,
}

fn default_local_dir() -> PathBuf {
    PathBuf::from("./public/media")
}

fn default_public_base_url() -> String {
    "/media".to_string()
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            provider: MediaProvider::default(),
            local_dir: default_local_dir(),
            public_base_url: default_public_base_url(),
            cloudinary: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum MediaProvider {
    #[default]
    Local,
    Cloudinary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub upload_preset: String,
}

impl Config {
    /// Validate every section that has constraints beyond its types
    pub fn validate(&self) -> Result<()> {
        self.auth.validate()?;
        if self.media.provider == MediaProvider::Cloudinary && self.media.cloudinary.is_none() {
            return Err(Error::Config(
                "media.provider is cloudinary but [media.cloudinary] is missing".to_string(),
            ));
        }
        Ok(())
    }
}
