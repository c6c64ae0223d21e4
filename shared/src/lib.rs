//! Shared utilities and common types for the JWT service
//!
//! This crate provides common functionality used across all service crates:
//! - Configuration types loaded from the environment
//! - The duration-string grammar used for token lifetimes
//! - Error response structures and stable error codes
//! - Input validators

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, Environment, JwtConfig, LogFormat, LoggingConfig,
    SessionStoreConfig,
};
pub use errors::{error_codes, ErrorResponse, IntoErrorResponse};
pub use utils::{duration, validation};
