//! Domain entities of the token lifecycle.

pub mod blacklist;
pub mod session;
pub mod token;


// Re-export commonly used types
pub use blacklist::{BlacklistEntry, RevocationReason, RotationLock, ROTATION_LOCK_TTL_SECONDS};
pub use session::SessionRecord;
pub use token::{Role, TokenPair, TokenPayload, TokenRequest, TokenType};
