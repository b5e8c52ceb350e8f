//! Environment-driven configuration. `.env` is loaded by the binaries before
//! any of these readers run.

pub mod session;
pub mod upload;

use std::env;

pub use session::{SessionConfig, SessionLayer};
pub use upload::{UploadBackend, UploadConfig};

pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8080";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
    #[error("{0}")]
    Insecure(String),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub public_base_url: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = match env::var("PORT") {
            Ok(value) => value.parse().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value,
            })?,
            Err(_) => 8080,
        };
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PUBLIC_BASE_URL.to_string());

        Ok(ServerConfig {
            host,
            port,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub fn current_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string())
}

pub fn is_production() -> bool {
    current_environment() == "production"
}

pub(crate) fn env_flag_enabled(key: &str) -> bool {
    env::var(key)
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "True"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_server_config_defaults() {
        env::remove_var("HOST");
        env::remove_var("PORT");
        env::remove_var("PUBLIC_BASE_URL");

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.public_base_url, DEFAULT_PUBLIC_BASE_URL);
    }

    #[test]
    #[serial]
    fn test_server_config_overrides() {
        env::set_var("PORT", "3000");
        env::set_var("PUBLIC_BASE_URL", "https://looks.example.com/");

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.public_base_url, "https://looks.example.com");

        env::set_var("PORT", "not-a-port");
        assert!(matches!(
            ServerConfig::from_env(),
            Err(ConfigError::Invalid { key: "PORT", .. })
        ));

        env::remove_var("PORT");
        env::remove_var("PUBLIC_BASE_URL");
    }
}
