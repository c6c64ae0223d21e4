mod config_tests;
mod revocation_tests;

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};

use crate::domain::entities::{Role, TokenPayload, TokenRequest, TokenType};
use crate::errors::StoreError;
use crate::repositories::{MemoryRevocationStore, RevocationStore};
use crate::services::token::{TokenService, TokenServiceConfig};

pub(super) const ACCESS_SECRET: &str = "access-secret-for-unit-tests-0123456789";
pub(super) const REFRESH_SECRET: &str = "refresh-secret-for-unit-tests-0123456789";

pub(super) fn test_config() -> TokenServiceConfig {
    TokenServiceConfig::new(ACCESS_SECRET, REFRESH_SECRET)
}

pub(super) fn memory_service() -> (TokenService<MemoryRevocationStore>, MemoryRevocationStore) {
    let store = MemoryRevocationStore::new();
    let service = TokenService::new(store.clone(), test_config()).unwrap();
    (service, store)
}

pub(super) fn user_request() -> TokenRequest {
    TokenRequest::new("u1", "u1@x.com", "user").with_session_id("s1")
}

/// Claims as the service would issue them, with an explicit lifetime window
pub(super) fn claims(kind: TokenType, iat: i64, exp: i64) -> TokenPayload {
    TokenPayload {
        sub: "u1".to_string(),
        email: "u1@x.com".to_string(),
        role: Role::User,
        session_id: "s1".to_string(),
        iat,
        exp,
        iss: "jwt-service".to_string(),
        aud: "jwt-service-users".to_string(),
        jti: uuid::Uuid::new_v4().to_string(),
        token_type: kind,
        metadata: None,
    }
}

/// Sign arbitrary claims with `secret`, bypassing the service's checks
pub(super) fn forge(claims: &TokenPayload, secret: &str) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

/// Claims that expired two minutes ago
pub(super) fn expired_claims(kind: TokenType) -> TokenPayload {
    let now = Utc::now().timestamp();
    claims(kind, now - 3600, now - 120)
}

/// Revocation store wrapper that injects failures and delays
#[derive(Clone, Default)]
pub(super) struct ScriptedStore {
    pub inner: MemoryRevocationStore,
    pub fail_reads: bool,
    pub fail_writes: bool,
    pub hang: bool,
    pub write_delay: Option<Duration>,
}

impl ScriptedStore {
    pub fn over(inner: MemoryRevocationStore) -> Self {
        Self {
            inner,
            ..Default::default()
        }
    }

    async fn gate(&self) {
        if self.hang {
            std::future::pending::<()>().await;
        }
    }
}

#[async_trait]
impl RevocationStore for ScriptedStore {
    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        self.gate().await;
        if self.fail_reads {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        self.inner.exists(key).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.gate().await;
        if self.fail_reads {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        self.inner.get(key).await
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), StoreError> {
        self.gate().await;
        if let Some(delay) = self.write_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_writes {
            return Err(StoreError::Unavailable("connection reset".to_string()));
        }
        self.inner.set_with_ttl(key, value, ttl_seconds).await
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<bool, StoreError> {
        self.gate().await;
        self.inner.set_if_absent(key, value, ttl_seconds).await
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        self.gate().await;
        self.inner.delete(key).await
    }

    async fn delete_if_value(&self, key: &str, expected: &str) -> Result<bool, StoreError> {
        self.gate().await;
        self.inner.delete_if_value(key, expected).await
    }
}
