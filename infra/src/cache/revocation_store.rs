//! Redis-backed revocation store shared by every worker

use async_trait::async_trait;
use tracing::debug;

use jwt_core::errors::StoreError;
use jwt_core::repositories::RevocationStore;

use super::redis_client::RedisClient;
use crate::InfrastructureError;

/// Blacklist entries and rotation locks kept in Redis.
///
/// Expiry is delegated to Redis key TTLs; nothing here sweeps stale keys.
#[derive(Debug, Clone)]
pub struct RedisRevocationStore {
    client: RedisClient,
}

impl RedisRevocationStore {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RedisClient {
        &self.client
    }
}

pub(crate) fn to_store_error(err: InfrastructureError) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

#[async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        self.client.exists(key).await.map_err(to_store_error)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.client.get(key).await.map_err(to_store_error)
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), StoreError> {
        // Redis rejects EX 0
        if ttl_seconds == 0 {
            debug!("Skipping write of '{}' with zero TTL", key);
            return Ok(());
        }
        self.client
            .set_with_expiry(key, value, ttl_seconds)
            .await
            .map_err(to_store_error)
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<bool, StoreError> {
        self.client
            .set_if_absent(key, value, ttl_seconds.max(1))
            .await
            .map_err(to_store_error)
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        self.client.delete(key).await.map_err(to_store_error)
    }

    async fn delete_if_value(&self, key: &str, expected: &str) -> Result<bool, StoreError> {
        self.client
            .delete_if_equals(key, expected)
            .await
            .map_err(to_store_error)
    }
}
