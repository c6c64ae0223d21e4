//! Services implementing the token lifecycle.

pub mod session;
pub mod token;

// Re-export commonly used types
pub use session::{AuthenticatedSession, Authenticator, SessionValidator};
pub use token::{RotationCoordinator, TokenService, TokenServiceConfig, VerifyOptions};
