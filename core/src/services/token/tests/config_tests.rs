use std::time::Duration;

use jwt_shared::config::JwtConfig;

use super::*;
use crate::errors::ConfigError;
use crate::repositories::MemoryRevocationStore;
use crate::services::token::TokenService;

#[test]
fn test_short_secret_fails_construction() {
    let config = TokenServiceConfig::new("too-short!", REFRESH_SECRET);

    let err = TokenService::new(MemoryRevocationStore::new(), config).err().unwrap();
    assert_eq!(
        err,
        ConfigError::WeakSecret {
            field: "secret",
            min: 32,
            actual: 10
        }
    );
}

#[test]
fn test_short_refresh_secret_fails_construction() {
    let config = TokenServiceConfig::new(ACCESS_SECRET, "");

    assert!(matches!(
        config.validate(),
        Err(ConfigError::WeakSecret { field: "refresh_secret", .. })
    ));
}

#[test]
fn test_from_jwt_config_parses_expiry() {
    let jwt = JwtConfig::new(ACCESS_SECRET, REFRESH_SECRET).with_expiry("30m", "2w");

    let config = TokenServiceConfig::from_jwt_config(&jwt).unwrap();

    assert_eq!(config.access_token_ttl, Duration::from_secs(1800));
    assert_eq!(config.refresh_token_ttl, Duration::from_secs(14 * 86_400));
    assert_eq!(config.store_timeout, Duration::from_millis(2000));
    assert_eq!(config.rotation_lock_ttl, Duration::from_secs(5));
    assert_eq!(config.max_clock_skew, Duration::ZERO);
    assert!(config.validate().is_ok());
}

#[test]
fn test_malformed_expiry_is_rejected() {
    let jwt = JwtConfig::new(ACCESS_SECRET, REFRESH_SECRET).with_expiry("15 minutes", "7d");

    match TokenServiceConfig::from_jwt_config(&jwt) {
        Err(ConfigError::InvalidDuration { field, value, .. }) => {
            assert_eq!(field, "access_token_expiry");
            assert_eq!(value, "15 minutes");
        }
        other => panic!("expected InvalidDuration, got {:?}", other),
    }
}

#[test]
fn test_zero_expiry_is_rejected() {
    let config = test_config().with_expiry("0s", "7d").unwrap();

    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidDuration { field: "access_token_expiry", .. })
    ));
}

#[test]
fn test_invalid_limits_are_rejected() {
    assert!(matches!(
        test_config().with_max_payload_size(0).validate(),
        Err(ConfigError::InvalidValue { field: "max_payload_size", .. })
    ));

    assert!(matches!(
        test_config()
            .with_rotation_lock_ttl(Duration::from_millis(500))
            .validate(),
        Err(ConfigError::InvalidValue { field: "rotation_lock_ttl", .. })
    ));

    assert!(matches!(
        test_config().with_store_timeout(Duration::ZERO).validate(),
        Err(ConfigError::InvalidValue { field: "store_timeout", .. })
    ));

    assert!(matches!(
        test_config()
            .with_max_clock_skew(Duration::from_secs(7200))
            .validate(),
        Err(ConfigError::InvalidValue { field: "max_clock_skew", .. })
    ));
    assert!(test_config()
        .with_max_clock_skew(Duration::from_secs(60))
        .validate()
        .is_ok());

    let mut config = test_config();
    config.rotation_lock_prefix = config.blacklist_key_prefix.clone();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidValue { field: "rotation_lock_prefix", .. })
    ));
}

#[test]
fn test_debug_output_redacts_secrets() {
    let rendered = format!("{:?}", test_config());

    assert!(!rendered.contains(ACCESS_SECRET));
    assert!(!rendered.contains(REFRESH_SECRET));
    assert!(rendered.contains("[REDACTED]"));
}

#[test]
fn test_custom_issuer_is_enforced() {
    let service = TokenService::new(
        MemoryRevocationStore::new(),
        test_config().with_issuer("auth.example.com", "api.example.com"),
    )
    .unwrap();

    let pair = service.sign(user_request()).unwrap();
    let claims = service
        .decode_token(&pair.access_token, crate::domain::entities::TokenType::Access, 0, true)
        .unwrap();

    assert_eq!(claims.iss, "auth.example.com");
    assert_eq!(claims.aud, "api.example.com");
}
