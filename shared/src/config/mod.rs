//! Configuration module
//!
//! - `auth` - Token signing and session lookup configuration
//! - `cache` - Redis configuration for the shared stores
//! - `environment` - Environment detection and logging configuration

pub mod auth;
pub mod cache;
pub mod environment;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use auth::{JwtConfig, SessionStoreConfig, MIN_SECRET_LENGTH};
pub use cache::CacheConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// Token signing configuration
    #[serde(default)]
    pub jwt: JwtConfig,

    /// Redis configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Session record lookup configuration
    #[serde(default)]
    pub session: SessionStoreConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        let mut logging = LoggingConfig::for_environment(environment);
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            logging.level = level;
        }

        Self {
            environment,
            jwt: JwtConfig::from_env(),
            cache: CacheConfig::from_env(),
            session: SessionStoreConfig::from_env(),
            logging,
        }
    }
}
