//! Integration tests for the Redis-backed stores
//!
//! These tests require a running Redis instance to execute.
//! Run with: cargo test -p jwt_infra --test redis_integration -- --ignored

use std::sync::Arc;

use jwt_core::domain::entities::{RevocationReason, SessionRecord, TokenRequest};
use jwt_core::errors::TokenError;
use jwt_core::repositories::{RevocationStore, SessionStore};
use jwt_core::services::{RotationCoordinator, TokenService, TokenServiceConfig, VerifyOptions};
use jwt_infra::cache::{CacheConfig, RedisClient, RedisRevocationStore, RedisSessionStore};
use jwt_shared::config::SessionStoreConfig;

const SECRET: &str = "redis-integration-access-secret-0123456789";
const REFRESH_SECRET: &str = "redis-integration-refresh-secret-0123456789";

async fn client() -> RedisClient {
    let config = CacheConfig::new(
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string()),
    )
    .with_prefix(format!("jwt-it-{}", uuid::Uuid::new_v4()));

    RedisClient::new(config).await.expect("Failed to connect to Redis")
}

fn worker(client: &RedisClient) -> Arc<TokenService<RedisRevocationStore>> {
    Arc::new(
        TokenService::new(
            RedisRevocationStore::new(client.clone()),
            TokenServiceConfig::new(SECRET, REFRESH_SECRET),
        )
        .unwrap(),
    )
}

fn request() -> TokenRequest {
    TokenRequest::new("u1", "u1@x.com", "user").with_session_id("s1")
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_blacklist_visible_to_other_worker() {
    let client = client().await;
    let a = worker(&client);
    let b = worker(&client);

    let pair = a.sign(request()).unwrap();
    let entry = a
        .blacklist(&pair.access_token, RevocationReason::Revoked)
        .await
        .unwrap();

    let err = b
        .verify(&pair.access_token, &VerifyOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err, TokenError::Blacklisted);

    let ttl = client
        .ttl(&a.blacklist_key(&entry.jti))
        .await
        .unwrap()
        .unwrap();
    assert!(ttl > 0 && ttl <= 900);
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_rotation_through_redis() {
    let client = client().await;
    let coordinator = RotationCoordinator::new(worker(&client));
    let pair = coordinator.token_service().sign(request()).unwrap();

    let rotated = coordinator.rotate(&pair.refresh_token).await.unwrap();
    assert_ne!(rotated.refresh_token, pair.refresh_token);

    assert_eq!(
        coordinator.rotate(&pair.refresh_token).await.unwrap_err(),
        TokenError::Blacklisted
    );
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_concurrent_rotation_through_redis() {
    let client = client().await;
    let first = RotationCoordinator::new(worker(&client));
    let second = RotationCoordinator::new(worker(&client));
    let pair = first.token_service().sign(request()).unwrap();

    let (a, b) = tokio::join!(
        first.rotate(&pair.refresh_token),
        second.rotate(&pair.refresh_token)
    );

    let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "outcomes: {:?} / {:?}", a, b);
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_session_record_lookup() {
    let client = client().await;
    let config = SessionStoreConfig::default();
    let sessions = RedisSessionStore::new(client.clone(), &config);

    let record = SessionRecord::new("s1", "u1");
    client
        .set_with_expiry(
            &sessions.session_key("s1"),
            &serde_json::to_string(&record).unwrap(),
            60,
        )
        .await
        .unwrap();

    assert_eq!(sessions.find_session("s1").await.unwrap(), Some(record));
    assert_eq!(sessions.find_session("missing").await.unwrap(), None);

    client
        .set_with_expiry(&sessions.session_key("broken"), "not json", 60)
        .await
        .unwrap();
    assert!(sessions.find_session("broken").await.is_err());
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_compare_and_delete_spares_other_holders() {
    let client = client().await;
    let store = RedisRevocationStore::new(client.clone());

    assert!(store.set_if_absent("rotation:x", "holder-1", 5).await.unwrap());
    assert!(!store.delete_if_value("rotation:x", "holder-2").await.unwrap());
    assert_eq!(
        store.get("rotation:x").await.unwrap(),
        Some("holder-1".to_string())
    );

    assert!(store.delete_if_value("rotation:x", "holder-1").await.unwrap());
    assert!(!store.exists("rotation:x").await.unwrap());
}
