//! Token verification followed by the session cross-check

use std::sync::Arc;

use tracing::debug;

use crate::domain::entities::{SessionRecord, TokenPayload};
use crate::errors::AuthError;
use crate::repositories::{RevocationStore, SessionStore};
use crate::services::token::{TokenService, VerifyOptions};

use super::validator::SessionValidator;

/// Result of a successful authentication
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedSession {
    pub claims: TokenPayload,
    pub session: SessionRecord,
}

/// Authenticates an access token end to end.
///
/// Succeeds only when the token verifies (signature, issuer, audience,
/// expiry, blacklist) and its session passes [`SessionValidator`].
pub struct Authenticator<S: RevocationStore, R: SessionStore> {
    tokens: Arc<TokenService<S>>,
    sessions: SessionValidator<R>,
}

impl<S: RevocationStore, R: SessionStore> Authenticator<S, R> {
    pub fn new(tokens: Arc<TokenService<S>>, sessions: SessionValidator<R>) -> Self {
        Self { tokens, sessions }
    }

    pub async fn authenticate(&self, access_token: &str) -> Result<AuthenticatedSession, AuthError> {
        self.authenticate_with_options(access_token, &VerifyOptions::default())
            .await
    }

    pub async fn authenticate_with_options(
        &self,
        access_token: &str,
        options: &VerifyOptions,
    ) -> Result<AuthenticatedSession, AuthError> {
        let claims = self.tokens.verify(access_token, options).await?;
        let session = self.sessions.validate(&claims).await?;

        debug!(sub = %claims.sub, session_id = %session.session_id, "Request authenticated");
        Ok(AuthenticatedSession { claims, session })
    }
}
