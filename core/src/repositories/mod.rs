//! Store interfaces the token subsystem coordinates through.

pub mod revocation;
pub mod session;

pub use revocation::{MemoryRevocationStore, RevocationStore};
pub use session::{MemorySessionStore, SessionStore};
