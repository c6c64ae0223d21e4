//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for the JWT service,
//! following Clean Architecture principles. It provides the concrete
//! collaborators the core services are generic over.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Cache**: Redis client plus the Redis-backed revocation and session stores
//! - **Logging**: tracing subscriber initialisation
//! - **Wiring**: [`initialize`] builds the full token service graph from [`AppConfig`]

use std::sync::Arc;
use std::time::Duration;

use jwt_core::errors::ConfigError;
use jwt_core::services::{Authenticator, RotationCoordinator, SessionValidator, TokenService};
use jwt_shared::config::AppConfig;

/// Cache module - Redis client and stores
pub mod cache;

/// Logging module - tracing subscriber setup
pub mod logging;

pub use cache::{CacheConfig, RedisClient, RedisRevocationStore, RedisSessionStore};
pub use logging::init_tracing;

/// Token services wired against Redis
pub struct TokenServices {
    pub tokens: Arc<TokenService<RedisRevocationStore>>,
    pub rotation: RotationCoordinator<RedisRevocationStore>,
    pub authenticator: Authenticator<RedisRevocationStore, RedisSessionStore>,
}

/// Initialize infrastructure services
///
/// This function sets up:
/// - The Redis connection (with retry)
/// - The token service, validated against `config.jwt`
/// - The rotation coordinator and authenticator sharing that service
pub async fn initialize(config: &AppConfig) -> Result<TokenServices, InfrastructureError> {
    tracing::info!(environment = %config.environment, "Initializing token services...");

    let client = RedisClient::new(config.cache.clone()).await?;
    if !client.health_check().await? {
        return Err(InfrastructureError::General(
            "Redis health check returned an unexpected response".to_string(),
        ));
    }

    let tokens = Arc::new(TokenService::from_jwt_config(
        RedisRevocationStore::new(client.clone()),
        &config.jwt,
    )?);

    let sessions = SessionValidator::new(
        RedisSessionStore::new(client, &config.session),
        Duration::from_millis(config.session.lookup_timeout_ms),
    );

    let services = TokenServices {
        rotation: RotationCoordinator::new(Arc::clone(&tokens)),
        authenticator: Authenticator::new(Arc::clone(&tokens), sessions),
        tokens,
    };

    tracing::info!("Token services initialized successfully");
    Ok(services)
}

/// Load configuration from the environment
///
/// Reads the environment-specific `.env` file first, then a plain `.env`,
/// without overriding variables already set in the process.
pub fn load_config() -> AppConfig {
    let environment = jwt_shared::config::Environment::from_env();
    dotenvy::from_filename(environment.env_file()).ok();
    dotenvy::dotenv().ok();

    AppConfig::from_env()
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Token service rejected its configuration
    #[error("Token configuration error: {0}")]
    Token(#[from] ConfigError),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}
