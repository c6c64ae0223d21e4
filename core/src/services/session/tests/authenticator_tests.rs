//! End-to-end authentication tests

use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::{RevocationReason, SessionRecord, TokenRequest};
use crate::errors::{AuthError, SessionError, TokenError};
use crate::repositories::{MemoryRevocationStore, MemorySessionStore};
use crate::services::session::{Authenticator, SessionValidator};
use crate::services::token::{TokenService, TokenServiceConfig};

const SECRET: &str = "authenticator-access-secret-0123456789";
const REFRESH_SECRET: &str = "authenticator-refresh-secret-0123456789";

struct Fixture {
    tokens: Arc<TokenService<MemoryRevocationStore>>,
    sessions: MemorySessionStore,
    authenticator: Authenticator<MemoryRevocationStore, MemorySessionStore>,
}

fn fixture() -> Fixture {
    let tokens = Arc::new(
        TokenService::new(
            MemoryRevocationStore::new(),
            TokenServiceConfig::new(SECRET, REFRESH_SECRET),
        )
        .unwrap(),
    );
    let sessions = MemorySessionStore::new();
    let authenticator = Authenticator::new(
        Arc::clone(&tokens),
        SessionValidator::new(sessions.clone(), Duration::from_secs(1)),
    );

    Fixture {
        tokens,
        sessions,
        authenticator,
    }
}

#[tokio::test]
async fn test_valid_token_and_session_authenticate() {
    let f = fixture();
    f.sessions.insert(SessionRecord::new("s1", "u1")).await;
    let pair = f
        .tokens
        .sign(TokenRequest::new("u1", "u1@x.com", "moderator").with_session_id("s1"))
        .unwrap();

    let authenticated = f.authenticator.authenticate(&pair.access_token).await.unwrap();

    assert_eq!(authenticated.claims.sub, "u1");
    assert_eq!(authenticated.session.session_id, "s1");
}

#[tokio::test]
async fn test_invalidated_session_rejects_valid_token() {
    let f = fixture();
    f.sessions.insert(SessionRecord::new("s1", "u1")).await;
    let pair = f
        .tokens
        .sign(TokenRequest::new("u1", "u1@x.com", "user").with_session_id("s1"))
        .unwrap();

    f.sessions.invalidate("s1").await;

    let err = f
        .authenticator
        .authenticate(&pair.access_token)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Session(SessionError::Inactive { .. })));
    assert_eq!(err.code(), "SESSION_INVALID");
}

#[tokio::test]
async fn test_revoked_token_fails_before_session_lookup() {
    let f = fixture();
    f.sessions.insert(SessionRecord::new("s1", "u1")).await;
    let pair = f
        .tokens
        .sign(TokenRequest::new("u1", "u1@x.com", "user").with_session_id("s1"))
        .unwrap();

    f.tokens
        .blacklist(&pair.access_token, RevocationReason::Compromised)
        .await
        .unwrap();

    let err = f
        .authenticator
        .authenticate(&pair.access_token)
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::Token(TokenError::Blacklisted));
    assert_eq!(err.code(), "TOKEN_BLACKLISTED");
}

#[tokio::test]
async fn test_unknown_session_rejects_token() {
    let f = fixture();
    let pair = f
        .tokens
        .sign(TokenRequest::new("u1", "u1@x.com", "user"))
        .unwrap();

    let err = f
        .authenticator
        .authenticate(&pair.access_token)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Session(SessionError::NotFound { .. })));
}
