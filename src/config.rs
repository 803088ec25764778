//! Application configuration.
//!
//! Handles loading configuration from environment variables and .env files.
//! The store endpoint can also be baked in at build time through the same
//! variable name.

use dotenv::dotenv;
use std::env;
use std::path::PathBuf;
use crate::error::{Error, Result};

/// Environment variable holding the remote store base URL.
pub const ENDPOINT_VAR: &str = "TRIPBOARD_ENDPOINT";
/// Environment variable overriding the log file location.
pub const LOG_FILE_VAR: &str = "TRIPBOARD_LOG";
/// Environment variable holding the log filter directive.
pub const LOG_LEVEL_VAR: &str = "TRIPBOARD_LOG_LEVEL";

/// Configuration for the application.
#[derive(Debug, Clone)]
pub struct Config {
    /// The application name
    pub app_name: String,
    /// The application version
    pub app_version: String,
    /// Base URL of the remote store
    pub endpoint: Option<String>,
    /// Where log output is appended
    pub log_file: Option<PathBuf>,
    /// `tracing` filter directive (e.g. "info", "tripboard=debug")
    pub log_level: String,
}

impl Config {
    /// Get the application name.
    #[must_use]
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Get the application version.
    #[must_use]
    pub fn app_version(&self) -> &str {
        &self.app_version
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: env!("CARGO_PKG_NAME").to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            endpoint: option_env!("TRIPBOARD_ENDPOINT")
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
            log_file: default_log_file(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    #[allow(clippy::unnecessary_wraps)] // Returns Result for forward-compatible API
    pub fn load() -> Result<Self> {
        // Try to load .env file if present
        dotenv().ok();

        let mut config = Self::default();

        if let Ok(endpoint) = env::var(ENDPOINT_VAR) {
            let endpoint = endpoint.trim();
            if !endpoint.is_empty() {
                config.endpoint = Some(endpoint.to_string());
            }
        }

        if let Ok(path) = env::var(LOG_FILE_VAR) {
            config.log_file = Some(PathBuf::from(shellexpand::tilde(&path).to_string()));
        }

        if let Ok(level) = env::var(LOG_LEVEL_VAR) {
            config.log_level = level;
        }

        Ok(config)
    }

    /// Check if a store endpoint is configured
    pub const fn has_endpoint(&self) -> bool {
        self.endpoint.is_some()
    }

    /// The configured endpoint, or an actionable configuration error
    pub fn require_endpoint(&self) -> Result<&str> {
        self.endpoint.as_deref().ok_or_else(|| {
            Error::config(
                "No remote store endpoint configured",
                "Set TRIPBOARD_ENDPOINT to the deployed script URL (env or .env)",
            )
        })
    }
}

/// Default log location under the platform's local data directory
fn default_log_file() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("tripboard").join("tripboard.log"))
}
