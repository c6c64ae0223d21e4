//! Session records read from Redis

use async_trait::async_trait;
use tracing::error;

use jwt_core::domain::entities::SessionRecord;
use jwt_core::errors::StoreError;
use jwt_core::repositories::SessionStore;
use jwt_shared::config::SessionStoreConfig;

use super::redis_client::RedisClient;
use super::revocation_store::to_store_error;

/// Looks up session records written as JSON by the session owner,
/// under `<key_prefix><session_id>`
#[derive(Debug, Clone)]
pub struct RedisSessionStore {
    client: RedisClient,
    key_prefix: String,
}

impl RedisSessionStore {
    pub fn new(client: RedisClient, config: &SessionStoreConfig) -> Self {
        Self {
            client,
            key_prefix: config.key_prefix.clone(),
        }
    }

    pub fn session_key(&self, session_id: &str) -> String {
        format!("{}{}", self.key_prefix, session_id)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn find_session(&self, session_id: &str) -> Result<Option<SessionRecord>, StoreError> {
        let key = self.session_key(session_id);
        let raw = self.client.get(&key).await.map_err(to_store_error)?;

        match raw {
            Some(value) => serde_json::from_str(&value).map(Some).map_err(|e| {
                error!("Unreadable session record under '{}': {}", key, e);
                StoreError::Corrupt {
                    key,
                    message: e.to_string(),
                }
            }),
            None => Ok(None),
        }
    }
}
