//! Server configuration loaded from environment variables

use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Expected key for `/api/generate` when `require_api_key` is set
    pub api_key: Option<String>,
    pub require_api_key: bool,
    /// Template used by `/api/generate` when no PDF is uploaded
    pub default_template: PathBuf,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8002".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            api_key: std::env::var("API_KEY").ok(),
            require_api_key: std::env::var("REQUIRE_API_KEY")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            default_template: std::env::var("DEFAULT_TEMPLATE")
                .unwrap_or_else(|_| "recto.pdf".to_string())
                .into(),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_env() {
        // Only assert the fields no test environment is expected to set
        let config = Config::from_env().unwrap();
        assert!(!config.host.is_empty());
        assert!(config.port > 0);
    }
}
