//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `BETTERHEAP` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use betterheap_setup::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {:?}", config.server.socket_addr());
//! ```

mod ai;
mod database;
mod error;
mod server;

pub use ai::AiConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration; sessions stay in memory when absent
    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    /// AI provider configuration (OpenAI)
    #[serde(default)]
    pub ai: AiConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `BETTERHEAP` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `BETTERHEAP__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `BETTERHEAP__DATABASE__URL=...` -> `database.url = ...`
    /// - `BETTERHEAP__AI__OPENAI_API_KEY=...` -> `ai.openai_api_key = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("BETTERHEAP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        if let Some(database) = &self.database {
            database.validate()?;
        }
        self.ai.validate()?;

        // The HTTP layer must outlive one extraction, or a slow turn is
        // cancelled before the user's message is saved.
        if self.server.request_timeout_secs <= self.ai.extraction_timeout_secs {
            return Err(ValidationError::RequestTimeoutBelowExtraction {
                request_secs: self.server.request_timeout_secs,
                extraction_secs: self.ai.extraction_timeout_secs,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global; tests touching them take this lock.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "BETTERHEAP__AI__OPENAI_API_KEY",
        "BETTERHEAP__AI__TEMPERATURE",
        "BETTERHEAP__DATABASE__URL",
        "BETTERHEAP__SERVER__PORT",
        "BETTERHEAP__SERVER__ENVIRONMENT",
    ];

    fn set_minimal_env() {
        env::set_var("BETTERHEAP__AI__OPENAI_API_KEY", "sk-test");
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.expect("config should load");
        assert_eq!(config.ai.openai_api_key.as_deref(), Some("sk-test"));
        assert!(config.database.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_database_section_is_optional() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("BETTERHEAP__DATABASE__URL", "postgres://localhost/betterheap");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        let database = config.database.expect("database section");
        assert_eq!(database.url, "postgres://localhost/betterheap");
        assert_eq!(database.max_connections, 10);
    }

    #[test]
    fn test_server_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("BETTERHEAP__SERVER__PORT", "3000");
        env::set_var("BETTERHEAP__SERVER__ENVIRONMENT", "production");
        env::set_var("BETTERHEAP__AI__TEMPERATURE", "0.2");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert!(config.server.is_production());
        assert!((config.ai.temperature - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn test_missing_api_key_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();

        assert_eq!(
            config.validate(),
            Err(ValidationError::NoAiProviderConfigured)
        );
    }

    fn configured() -> AppConfig {
        AppConfig {
            server: ServerConfig::default(),
            database: None,
            ai: AiConfig {
                openai_api_key: Some("sk-test".to_string()),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_default_timeouts_validate() {
        assert!(configured().validate().is_ok());
    }

    #[test]
    fn test_request_timeout_must_exceed_extraction_timeout() {
        let mut config = configured();
        config.server.request_timeout_secs = 30;
        config.ai.extraction_timeout_secs = 90;
        assert_eq!(
            config.validate(),
            Err(ValidationError::RequestTimeoutBelowExtraction {
                request_secs: 30,
                extraction_secs: 90,
            })
        );

        config.server.request_timeout_secs = 90;
        assert!(config.validate().is_err());

        config.server.request_timeout_secs = 91;
        assert!(config.validate().is_ok());
    }
}
