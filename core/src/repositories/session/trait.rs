//! Session store trait for the externally owned session records.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::entities::session::SessionRecord;
use crate::errors::StoreError;

/// Read-only lookup of session records owned by another subsystem.
///
/// The token subsystem never writes sessions; it only cross-checks that the
/// session a token names is still valid.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Find a session record by id
    ///
    /// # Returns
    /// * `Ok(Some(SessionRecord))` - Session found
    /// * `Ok(None)` - No such session
    /// * `Err(StoreError)` - Lookup failed
    async fn find_session(&self, session_id: &str) -> Result<Option<SessionRecord>, StoreError>;
}

#[async_trait]
impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    async fn find_session(&self, session_id: &str) -> Result<Option<SessionRecord>, StoreError> {
        (**self).find_session(session_id).await
    }
}
