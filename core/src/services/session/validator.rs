//! Cross-checks verified token claims against the external session store

use std::time::Duration;

use chrono::Utc;
use jwt_shared::config::SessionStoreConfig;
use tracing::{debug, warn};

use crate::domain::entities::{SessionRecord, TokenPayload};
use crate::errors::{SessionError, StoreError};
use crate::repositories::SessionStore;

/// Validates that the session a token names is still live.
///
/// A token can be well-signed and unrevoked while its session has been
/// invalidated elsewhere; authentication needs both checks.
pub struct SessionValidator<R: SessionStore> {
    store: R,
    timeout: Duration,
}

impl<R: SessionStore> SessionValidator<R> {
    pub fn new(store: R, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub fn from_config(store: R, config: &SessionStoreConfig) -> Self {
        Self::new(store, Duration::from_millis(config.lookup_timeout_ms))
    }

    pub fn store(&self) -> &R {
        &self.store
    }

    /// Look up and check the session named by `claims`
    ///
    /// # Returns
    ///
    /// * `Ok(SessionRecord)` - Session exists, is active, unexpired and owned by `claims.sub`
    /// * `Err(SessionError::Store)` - Lookup failed or timed out
    pub async fn validate(&self, claims: &TokenPayload) -> Result<SessionRecord, SessionError> {
        let session_id = &claims.session_id;

        let record = tokio::time::timeout(self.timeout, self.store.find_session(session_id))
            .await
            .map_err(|_| StoreError::Timeout(self.timeout))??
            .ok_or_else(|| SessionError::NotFound {
                session_id: session_id.clone(),
            })?;

        if !record.active {
            warn!(session_id = %session_id, sub = %claims.sub, "Token presented for invalidated session");
            return Err(SessionError::Inactive {
                session_id: session_id.clone(),
            });
        }

        if record.is_expired(Utc::now()) {
            return Err(SessionError::Expired {
                session_id: session_id.clone(),
            });
        }

        if record.user_id != claims.sub {
            warn!(session_id = %session_id, sub = %claims.sub, "Session owner does not match token subject");
            return Err(SessionError::SubjectMismatch {
                session_id: session_id.clone(),
            });
        }

        debug!(session_id = %session_id, "Session validated");
        Ok(record)
    }
}
