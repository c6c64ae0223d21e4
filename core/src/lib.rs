//! # JWT Service Core
//!
//! Token lifecycle domain for the JWT service: entities, the error taxonomy,
//! store interfaces, and the services that sign, verify, rotate and revoke
//! bearer credentials. All cross-worker state lives behind the
//! [`RevocationStore`](repositories::RevocationStore) trait; nothing in this
//! crate keeps authoritative state in-process.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::{
    BlacklistEntry, RevocationReason, Role, RotationLock, SessionRecord, TokenPair, TokenPayload,
    TokenRequest, TokenType,
};
pub use errors::{AuthError, ConfigError, SessionError, StoreError, TokenError, TokenResult};
pub use repositories::{MemoryRevocationStore, MemorySessionStore, RevocationStore, SessionStore};
pub use services::{
    AuthenticatedSession, Authenticator, RotationCoordinator, SessionValidator, TokenService,
    TokenServiceConfig, VerifyOptions,
};
