//! Refresh-token rotation under a store-held lock

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::entities::{RevocationReason, RotationLock, TokenPair, TokenPayload, TokenType};
use crate::errors::TokenError;
use crate::repositories::RevocationStore;

use super::service::{PairSubject, TokenService, VerifyOptions};

/// Exchanges a refresh token for a new pair, at most once per token.
///
/// Mutual exclusion between workers comes from a `SET NX`-style lock in
/// the revocation store, keyed by the refresh token's `jti` and bounded by
/// the configured lock TTL. The consumed token is blacklisted for the rest
/// of its lifetime, so replaying it always fails with `TOKEN_BLACKLISTED`.
pub struct RotationCoordinator<S: RevocationStore> {
    tokens: Arc<TokenService<S>>,
}

impl<S: RevocationStore> Clone for RotationCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            tokens: Arc::clone(&self.tokens),
        }
    }
}

impl<S: RevocationStore> RotationCoordinator<S> {
    pub fn new(tokens: Arc<TokenService<S>>) -> Self {
        Self { tokens }
    }

    pub fn token_service(&self) -> &Arc<TokenService<S>> {
        &self.tokens
    }

    /// Rotates `refresh_token` with default options
    pub async fn rotate(&self, refresh_token: &str) -> Result<TokenPair, TokenError> {
        self.rotate_with_options(refresh_token, &VerifyOptions::default())
            .await
    }

    /// Rotates `refresh_token`
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - New pair carrying the old subject, role, session and metadata
    /// * `Err(TokenError::Blacklisted)` - Token already rotated or revoked
    /// * `Err(TokenError::RotationInProgress)` - Another caller holds the lock
    /// * `Err(TokenError::Server)` - Store failure; the old token stays usable
    pub async fn rotate_with_options(
        &self,
        refresh_token: &str,
        options: &VerifyOptions,
    ) -> Result<TokenPair, TokenError> {
        let timeout = self.tokens.store_timeout(options);

        let claims = self
            .tokens
            .decode_token(refresh_token, TokenType::Refresh, self.tokens.leeway_secs(options), true)?;
        self.tokens
            .ensure_not_blacklisted(&claims.jti, timeout)
            .await?;

        let lock_key = self.tokens.rotation_lock_key(&claims.jti);
        let lock = RotationLock::new(&claims.jti);
        let lock_value = serde_json::to_string(&lock)
            .map_err(|e| TokenError::server(format!("failed to serialize rotation lock: {}", e)))?;
        let lock_ttl = self.tokens.config().rotation_lock_ttl.as_secs();

        let acquired = self
            .tokens
            .with_deadline(
                timeout,
                "rotation_lock_acquire",
                self.tokens
                    .store()
                    .set_if_absent(&lock_key, &lock_value, lock_ttl),
            )
            .await?;

        if !acquired {
            warn!(jti = %claims.jti, "Rotation already in progress");
            return Err(TokenError::RotationInProgress);
        }
        debug!(jti = %claims.jti, holder = %lock.holder, "Rotation lock acquired");

        let outcome = self.rotate_locked(&claims, timeout).await;
        self.release_lock(&lock_key, &lock_value, &claims.jti, timeout)
            .await;

        match &outcome {
            Ok(_) => info!(
                sub = %claims.sub,
                session_id = %claims.session_id,
                jti = %claims.jti,
                "Refresh token rotated"
            ),
            Err(e) => warn!(jti = %claims.jti, code = e.code(), "Rotation failed"),
        }
        outcome
    }

    async fn rotate_locked(
        &self,
        claims: &TokenPayload,
        timeout: std::time::Duration,
    ) -> Result<TokenPair, TokenError> {
        // A rotation that finished between the first check and the lock
        // leaves its blacklist entry behind
        self.tokens
            .ensure_not_blacklisted(&claims.jti, timeout)
            .await?;

        self.tokens
            .revoke_claims(claims, RevocationReason::Rotated, timeout)
            .await?;

        self.tokens.issue_pair(PairSubject::from(claims))
    }

    /// Deletes the lock only while it still carries this caller's value, so
    /// a lock that expired and was re-acquired by another caller survives
    async fn release_lock(&self, lock_key: &str, lock_value: &str, jti: &str, timeout: std::time::Duration) {
        let released = self
            .tokens
            .with_deadline(
                timeout,
                "rotation_lock_release",
                self.tokens.store().delete_if_value(lock_key, lock_value),
            )
            .await;

        match released {
            Ok(true) => debug!(jti = %jti, "Rotation lock released"),
            Ok(false) => warn!(jti = %jti, "Rotation lock expired or taken over before release"),
            Err(e) => warn!(jti = %jti, error = %e, "Failed to release rotation lock; it will expire on its own"),
        }
    }
}
