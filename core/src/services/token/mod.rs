//! Token service module for JWT management
//!
//! This module handles all token-related operations including:
//! - Signing access/refresh token pairs (HS256, one secret per kind)
//! - Verification with blacklist lookup against the shared store
//! - Revocation of single tokens, raw `jti`s and whole pairs
//! - Refresh-token rotation under a store-held lock

mod config;
mod rotation;
mod service;

#[cfg(test)]
mod tests;

pub use config::TokenServiceConfig;
pub use rotation::RotationCoordinator;
pub use service::{TokenService, VerifyOptions};
