//! In-memory implementation of RevocationStore for tests and
//! single-process development

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::errors::StoreError;

use super::r#trait::RevocationStore;

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: String,
    expires_at: Instant,
}

impl MemoryEntry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// TTL-aware map behind a shared lock.
///
/// Clones share the same map, so several service instances built from
/// clones observe each other's writes. Expired keys are treated as absent
/// and purged lazily on write.
#[derive(Debug, Clone, Default)]
pub struct MemoryRevocationStore {
    entries: Arc<RwLock<HashMap<String, MemoryEntry>>>,
}

impl MemoryRevocationStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries.values().filter(|e| e.is_live(now)).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Remaining lifetime of a live key
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.expires_at - now)
    }

    fn purge_expired(entries: &mut HashMap<String, MemoryEntry>, now: Instant) {
        entries.retain(|_, entry| entry.is_live(now));
    }
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        Ok(entries.get(key).map(|e| e.is_live(now)).unwrap_or(false))
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.value.clone()))
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), StoreError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        Self::purge_expired(&mut entries, now);

        entries.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_string(),
                expires_at: now + Duration::from_secs(ttl_seconds),
            },
        );
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<bool, StoreError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        Self::purge_expired(&mut entries, now);

        if entries.contains_key(key) {
            return Ok(false);
        }

        entries.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_string(),
                expires_at: now + Duration::from_secs(ttl_seconds),
            },
        );
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        Ok(entries
            .remove(key)
            .map(|e| e.is_live(now))
            .unwrap_or(false))
    }

    async fn delete_if_value(&self, key: &str, expected: &str) -> Result<bool, StoreError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        let matches = entries
            .get(key)
            .map(|e| e.is_live(now) && e.value == expected)
            .unwrap_or(false);
        if matches {
            entries.remove(key);
        }
        Ok(matches)
    }
}
