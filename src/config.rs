//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration files (config/default.toml, config/local.toml)
//! 3. Environment variables (override)

use serde::Deserialize;
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub upstream: UpstreamConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 8080)
    pub port: u16,
    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,
}

impl ServerConfig {
    /// Socket address string for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration (SQLite only)
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    pub path: PathBuf,
}

/// Remote post/user API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL, e.g. "https://jsonplaceholder.typicode.com"
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
    /// User-Agent header sent upstream
    pub user_agent: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (POSTMIRROR__*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.max_body_bytes", 65536)?
            .set_default("database.path", "data/posts.db")?
            .set_default("upstream.base_url", "https://jsonplaceholder.typicode.com")?
            .set_default("upstream.timeout_seconds", 30)?
            .set_default("upstream.user_agent", "postmirror/0.1.0")?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("POSTMIRROR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    fn validate(&self) -> Result<(), crate::error::AppError> {
        let base_url = url::Url::parse(&self.upstream.base_url).map_err(|e| {
            crate::error::AppError::Config(format!("upstream.base_url is not a valid URL: {e}"))
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(crate::error::AppError::Config(
                "upstream.base_url must use http or https".to_string(),
            ));
        }

        if self.upstream.timeout_seconds == 0 {
            return Err(crate::error::AppError::Config(
                "upstream.timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(crate::error::AppError::Config(format!(
                "logging.format must be \"pretty\" or \"json\", got {:?}",
                self.logging.format
            )));
        }

        Ok(())
    }
}
