//! Client configuration
//!
//! Loaded with the `config` crate from defaults, optional config files and
//! environment variables (`.env` is honoured through `dotenvy`).

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:4001";

/// Key the access token is persisted under
pub const TOKEN_STORAGE_KEY: &str = "bookingToken";

/// Main client configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub session: SessionConfig,
}

/// Remote booking API configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Base URL of the booking backend, without the `/api` suffix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Optional request timeout; the HTTP client default applies when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

/// Client-side session storage
#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// File the access token is persisted to
    #[serde(default = "default_token_path")]
    pub token_path: PathBuf,
}

fn default_token_path() -> PathBuf {
    PathBuf::from(".hotel-booking-session.json")
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_path: default_token_path(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment and optional config files
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let mut builder = Config::builder()
            .set_default("api.base_url", DEFAULT_API_BASE_URL)?
            .set_default("session.token_path", ".hotel-booking-session.json")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(
                Environment::with_prefix("HOTEL")
                    .separator("__")
                    .try_parsing(true),
            );

        // Plain API_BASE_URL takes precedence over HOTEL__API__BASE_URL
        if let Ok(base_url) = env::var("API_BASE_URL") {
            builder = builder.set_override("api.base_url", base_url)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("api.base_url", DEFAULT_API_BASE_URL)?
            .set_default("session.token_path", ".hotel-booking-session.json")?
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("HOTEL").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// `<base_url>/api`, with any trailing slash removed first
    pub fn api_root(&self) -> String {
        format!("{}/api", self.api.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:4001");
        assert!(config.api.timeout_secs.is_none());
        assert_eq!(config.api_root(), "http://localhost:4001/api");
    }

    #[test]
    fn test_api_root_trims_slash() {
        let mut config = ClientConfig::default();
        config.api.base_url = "https://booking.example.com/".to_string();
        assert_eq!(config.api_root(), "https://booking.example.com/api");
    }
}
