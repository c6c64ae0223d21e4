//! Session cross-check and full request authentication

mod authenticator;
mod validator;

#[cfg(test)]
mod tests;

pub use authenticator::{AuthenticatedSession, Authenticator};
pub use validator::SessionValidator;
