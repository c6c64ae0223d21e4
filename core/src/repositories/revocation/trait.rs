//! Revocation store trait: the shared, TTL-capable key-value store every
//! worker coordinates through.

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::StoreError;

/// Thin interface over a shared key-value store with per-key expiry.
///
/// Blacklist entries and rotation locks are both written through this trait.
/// Implementations must be reachable by every worker; an in-process map is
/// only acceptable for tests and single-process development.
///
/// # Failure model
/// Every call may fail or hang. Callers bound each call with a deadline and
/// treat any error as a server failure, never as "key absent".
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Check whether a live (unexpired) key exists
    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Read the value stored under `key`
    ///
    /// # Returns
    /// * `Ok(Some(value))` - Key present and unexpired
    /// * `Ok(None)` - Key absent or expired
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value` under `key`, replacing any previous value, expiring
    /// after `ttl_seconds`
    async fn set_with_ttl(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), StoreError>;

    /// Write `value` only if no live value exists under `key`
    ///
    /// # Returns
    /// * `Ok(true)` - The write happened; the caller now owns the key
    /// * `Ok(false)` - Another value was already present
    ///
    /// The check and the write must be a single atomic step on the store.
    async fn set_if_absent(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<bool, StoreError>;

    /// Delete `key`, returning whether it was present
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Delete `key` only while it still holds `expected`
    ///
    /// # Returns
    /// * `Ok(true)` - The value matched and the key was removed
    /// * `Ok(false)` - Key absent, expired, or now holding another value
    ///
    /// The comparison and the delete must be a single atomic step on the store.
    async fn delete_if_value(&self, key: &str, expected: &str) -> Result<bool, StoreError>;
}

#[async_trait]
impl<T: RevocationStore + ?Sized> RevocationStore for Arc<T> {
    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        (**self).exists(key).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key).await
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), StoreError> {
        (**self).set_with_ttl(key, value, ttl_seconds).await
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<bool, StoreError> {
        (**self).set_if_absent(key, value, ttl_seconds).await
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        (**self).delete(key).await
    }

    async fn delete_if_value(&self, key: &str, expected: &str) -> Result<bool, StoreError> {
        (**self).delete_if_value(key, expected).await
    }
}
