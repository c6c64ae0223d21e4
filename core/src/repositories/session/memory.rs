//! In-memory implementation of SessionStore for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::session::SessionRecord;
use crate::errors::StoreError;

use super::r#trait::SessionStore;

/// Session records keyed by session id; clones share the same map
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionRecord>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a session record
    pub async fn insert(&self, record: SessionRecord) {
        let mut sessions = self.sessions.write().await;
        sessions.insert(record.session_id.clone(), record);
    }

    /// Mark a session inactive, returning whether it existed
    pub async fn invalidate(&self, session_id: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(session_id) {
            Some(record) => {
                record.active = false;
                true
            }
            None => false,
        }
    }

    pub async fn remove(&self, session_id: &str) -> Option<SessionRecord> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(session_id)
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn find_session(&self, session_id: &str) -> Result<Option<SessionRecord>, StoreError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).cloned())
    }
}
