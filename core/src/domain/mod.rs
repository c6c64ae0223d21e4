//! Domain layer containing token, revocation and session entities.

pub mod entities;

// Re-export commonly used domain types
pub use entities::*;
