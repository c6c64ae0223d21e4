//! Error taxonomy of the token subsystem.
//!
//! [`TokenError`] is the closed set every public token operation returns.
//! [`ConfigError`] is only produced while constructing a service.

mod types;


pub use types::{AuthError, ConfigError, SessionError, StoreError, TokenError};

pub type TokenResult<T> = Result<T, TokenError>;
