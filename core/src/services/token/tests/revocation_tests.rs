//! Blacklist and revocation behaviour

use std::time::Duration;

use chrono::Utc;

use super::*;
use crate::domain::entities::{RevocationReason, TokenRequest, TokenType};
use crate::errors::TokenError;
use crate::services::token::VerifyOptions;

#[tokio::test]
async fn test_blacklist_entry_lives_as_long_as_token() {
    let (service, store) = memory_service();
    let pair = service.sign(user_request()).unwrap();

    let entry = service
        .blacklist(&pair.access_token, RevocationReason::Logout)
        .await
        .unwrap();

    assert_eq!(entry.reason, RevocationReason::Logout);
    assert!(entry.ttl_seconds <= 900 && entry.ttl_seconds >= 898);

    let key = service.blacklist_key(&entry.jti);
    let ttl = store.ttl(&key).await.unwrap();
    assert!(ttl <= Duration::from_secs(900));

    assert!(service.is_blacklisted(&entry.jti).await.unwrap());
    assert_eq!(service.blacklist_entry(&entry.jti).await.unwrap(), Some(entry));
}

#[tokio::test]
async fn test_blacklist_accepts_refresh_tokens() {
    let (service, _) = memory_service();
    let pair = service.sign(user_request()).unwrap();

    let entry = service
        .blacklist(&pair.refresh_token, RevocationReason::Compromised)
        .await
        .unwrap();
    assert!(entry.ttl_seconds > 900);

    let err = service
        .verify_refresh(&pair.refresh_token, &VerifyOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err, TokenError::Blacklisted);

    // The access token of the same pair is untouched
    assert!(service
        .verify(&pair.access_token, &VerifyOptions::default())
        .await
        .is_ok());
}

#[tokio::test]
async fn test_blacklisting_expired_token_writes_nothing() {
    let (service, store) = memory_service();

    for (kind, secret) in [
        (TokenType::Access, ACCESS_SECRET),
        (TokenType::Refresh, REFRESH_SECRET),
    ] {
        let token = forge(&expired_claims(kind), secret);
        let err = service
            .blacklist(&token, RevocationReason::Revoked)
            .await
            .unwrap_err();
        assert_eq!(err, TokenError::Expired);
    }

    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_blacklisting_forged_token_is_invalid() {
    let (service, store) = memory_service();
    let now = Utc::now().timestamp();

    let token = forge(
        &claims(TokenType::Access, now, now + 600),
        "attacker-controlled-secret-0123456789",
    );
    let err = service
        .blacklist(&token, RevocationReason::Revoked)
        .await
        .unwrap_err();

    assert!(matches!(err, TokenError::Invalid { .. }));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_revoke_jti() {
    let (service, store) = memory_service();
    let now = Utc::now().timestamp();

    let entry = service
        .revoke_jti("jti-1", now + 60, RevocationReason::Revoked)
        .await
        .unwrap();
    assert!(entry.ttl_seconds <= 60);
    assert!(service.is_blacklisted("jti-1").await.unwrap());

    assert_eq!(
        service
            .revoke_jti("jti-2", now - 1, RevocationReason::Revoked)
            .await,
        Err(TokenError::Expired)
    );
    assert!(!service.is_blacklisted("jti-2").await.unwrap());

    assert!(matches!(
        service.revoke_jti(" ", now + 60, RevocationReason::Revoked).await,
        Err(TokenError::Validation { .. })
    ));
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_revoke_pair_blacklists_both_tokens() {
    let (service, _) = memory_service();
    let pair = service.sign(user_request()).unwrap();

    let written = service
        .revoke_pair(&pair.access_token, &pair.refresh_token, RevocationReason::Logout)
        .await
        .unwrap();
    assert_eq!(written, 2);

    assert_eq!(
        service
            .verify(&pair.access_token, &VerifyOptions::default())
            .await
            .unwrap_err(),
        TokenError::Blacklisted
    );
    assert_eq!(
        service
            .verify_refresh(&pair.refresh_token, &VerifyOptions::default())
            .await
            .unwrap_err(),
        TokenError::Blacklisted
    );
}

#[tokio::test]
async fn test_revoke_pair_skips_expired_access_token() {
    let (service, store) = memory_service();
    let now = Utc::now().timestamp();

    let access = forge(&expired_claims(TokenType::Access), ACCESS_SECRET);
    let refresh = forge(&claims(TokenType::Refresh, now, now + 3600), REFRESH_SECRET);

    let written = service
        .revoke_pair(&access, &refresh, RevocationReason::Logout)
        .await
        .unwrap();

    assert_eq!(written, 1);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_revoke_pair_rejects_mismatched_sessions() {
    let (service, store) = memory_service();

    let first = service.sign(user_request()).unwrap();
    let second = service
        .sign(TokenRequest::new("u1", "u1@x.com", "user").with_session_id("s2"))
        .unwrap();

    let err = service
        .revoke_pair(&first.access_token, &second.refresh_token, RevocationReason::Logout)
        .await
        .unwrap_err();

    assert!(matches!(err, TokenError::Invalid { .. }));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_unreadable_entry_is_server_error() {
    let (service, store) = memory_service();
    store
        .set_with_ttl(&service.blacklist_key("jti-x"), "{not json", 60)
        .await
        .unwrap();

    let err = service.blacklist_entry("jti-x").await.unwrap_err();
    assert_eq!(err.code(), "SERVER_ERROR");

    assert_eq!(service.blacklist_entry("missing").await.unwrap(), None);
}

#[tokio::test]
async fn test_failed_blacklist_write_is_server_error() {
    let store = ScriptedStore {
        fail_writes: true,
        ..Default::default()
    };
    let service = crate::services::token::TokenService::new(store, test_config()).unwrap();
    let pair = service.sign(user_request()).unwrap();

    let err = service
        .blacklist(&pair.access_token, RevocationReason::Revoked)
        .await
        .unwrap_err();
    assert!(matches!(err, TokenError::Server { .. }));
}

#[tokio::test]
async fn test_services_share_revocations_through_the_store() {
    let store = crate::repositories::MemoryRevocationStore::new();
    let worker_a = crate::services::token::TokenService::new(store.clone(), test_config()).unwrap();
    let worker_b = crate::services::token::TokenService::new(store.clone(), test_config()).unwrap();

    let pair = worker_a.sign(user_request()).unwrap();
    worker_a
        .blacklist(&pair.access_token, RevocationReason::Revoked)
        .await
        .unwrap();

    assert_eq!(
        worker_b
            .verify(&pair.access_token, &VerifyOptions::default())
            .await
            .unwrap_err(),
        TokenError::Blacklisted
    );
}
