//! Token signing and session lookup configuration

use serde::{Deserialize, Serialize};

/// Minimum length, in characters, accepted for either signing secret
pub const MIN_SECRET_LENGTH: usize = 32;

/// JWT configuration as read from the environment.
///
/// Values here are unvalidated; the token service validates them once at
/// construction and refuses to start on weak secrets or malformed
/// durations. Both secrets default to empty for that reason.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct JwtConfig {
    /// Secret for signing access tokens (HS256)
    pub secret: String,

    /// Secret for signing refresh tokens (HS256)
    pub refresh_secret: String,

    /// JWT issuer claim
    pub issuer: String,

    /// JWT audience claim
    pub audience: String,

    /// Access token lifetime, e.g. `"15m"`
    pub access_token_expiry: String,

    /// Refresh token lifetime, e.g. `"7d"`
    pub refresh_token_expiry: String,

    /// Key prefix for blacklist entries in the revocation store
    pub blacklist_key_prefix: String,

    /// Key prefix for rotation locks in the revocation store
    pub rotation_lock_prefix: String,

    /// Maximum serialized payload size in bytes
    pub max_payload_size: usize,

    /// Rotation lock lifetime in seconds
    pub rotation_lock_ttl_seconds: u64,

    /// Default deadline for a single revocation store call
    pub store_timeout_ms: u64,

    /// Largest clock skew, in seconds, a caller may ask verification to
    /// tolerate past `exp`
    pub max_clock_skew_seconds: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            refresh_secret: String::new(),
            issuer: String::from("jwt-service"),
            audience: String::from("jwt-service-users"),
            access_token_expiry: String::from("15m"),
            refresh_token_expiry: String::from("7d"),
            blacklist_key_prefix: String::from("blacklist:"),
            rotation_lock_prefix: String::from("rotation:"),
            max_payload_size: 8192,
            rotation_lock_ttl_seconds: 5,
            store_timeout_ms: 2000,
            max_clock_skew_seconds: 0,
        }
    }
}

impl JwtConfig {
    /// Create a configuration with both secrets and every other value defaulted
    pub fn new(secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            refresh_secret: refresh_secret.into(),
            ..Default::default()
        }
    }

    /// Set both token lifetimes
    pub fn with_expiry(mut self, access: impl Into<String>, refresh: impl Into<String>) -> Self {
        self.access_token_expiry = access.into();
        self.refresh_token_expiry = refresh.into();
        self
    }

    /// Set issuer and audience claims
    pub fn with_issuer(mut self, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self.audience = audience.into();
        self
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create from an arbitrary key lookup, falling back to defaults for
    /// anything missing or unparsable
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            secret: lookup("JWT_SECRET").unwrap_or(defaults.secret),
            refresh_secret: lookup("JWT_REFRESH_SECRET").unwrap_or(defaults.refresh_secret),
            issuer: lookup("JWT_ISSUER").unwrap_or(defaults.issuer),
            audience: lookup("JWT_AUDIENCE").unwrap_or(defaults.audience),
            access_token_expiry: lookup("JWT_ACCESS_TOKEN_EXPIRY")
                .unwrap_or(defaults.access_token_expiry),
            refresh_token_expiry: lookup("JWT_REFRESH_TOKEN_EXPIRY")
                .unwrap_or(defaults.refresh_token_expiry),
            blacklist_key_prefix: lookup("JWT_BLACKLIST_PREFIX")
                .unwrap_or(defaults.blacklist_key_prefix),
            rotation_lock_prefix: lookup("JWT_ROTATION_LOCK_PREFIX")
                .unwrap_or(defaults.rotation_lock_prefix),
            max_payload_size: lookup("JWT_MAX_PAYLOAD_SIZE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_payload_size),
            rotation_lock_ttl_seconds: lookup("JWT_ROTATION_LOCK_TTL")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.rotation_lock_ttl_seconds),
            store_timeout_ms: lookup("JWT_STORE_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.store_timeout_ms),
            max_clock_skew_seconds: lookup("JWT_MAX_CLOCK_SKEW")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_clock_skew_seconds),
        }
    }
}

/// Configuration for the externally owned session record lookup
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionStoreConfig {
    /// Key prefix under which session records are stored
    pub key_prefix: String,

    /// Deadline for a single session lookup
    pub lookup_timeout_ms: u64,
}

impl Default for SessionStoreConfig {
    fn default() -> Self {
        Self {
            key_prefix: String::from("session:"),
            lookup_timeout_ms: 2000,
        }
    }
}

impl SessionStoreConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            key_prefix: std::env::var("SESSION_KEY_PREFIX").unwrap_or(defaults.key_prefix),
            lookup_timeout_ms: std::env::var("SESSION_LOOKUP_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.lookup_timeout_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_jwt_config_default() {
        let config = JwtConfig::default();
        assert!(config.secret.is_empty());
        assert!(config.refresh_secret.is_empty());
        assert_eq!(config.issuer, "jwt-service");
        assert_eq!(config.audience, "jwt-service-users");
        assert_eq!(config.access_token_expiry, "15m");
        assert_eq!(config.refresh_token_expiry, "7d");
        assert_eq!(config.blacklist_key_prefix, "blacklist:");
        assert_eq!(config.rotation_lock_prefix, "rotation:");
        assert_eq!(config.max_payload_size, 8192);
        assert_eq!(config.max_clock_skew_seconds, 0);
    }

    #[test]
    fn test_from_lookup_overrides_and_falls_back() {
        let vars: HashMap<&str, String> = HashMap::from([
            ("JWT_SECRET", "s".repeat(40)),
            ("JWT_ISSUER", "auth.example.com".to_string()),
            ("JWT_ACCESS_TOKEN_EXPIRY", "5m".to_string()),
            ("JWT_MAX_PAYLOAD_SIZE", "not-a-number".to_string()),
            ("JWT_MAX_CLOCK_SKEW", "30".to_string()),
        ]);

        let config = JwtConfig::from_lookup(|key| vars.get(key).cloned());

        assert_eq!(config.secret.len(), 40);
        assert!(config.refresh_secret.is_empty());
        assert_eq!(config.issuer, "auth.example.com");
        assert_eq!(config.access_token_expiry, "5m");
        assert_eq!(config.refresh_token_expiry, "7d");
        assert_eq!(config.max_payload_size, 8192);
        assert_eq!(config.max_clock_skew_seconds, 30);
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let config: JwtConfig =
            serde_json::from_str(r#"{"secret":"abc","audience":"mobile"}"#).unwrap();
        assert_eq!(config.secret, "abc");
        assert_eq!(config.audience, "mobile");
        assert_eq!(config.issuer, "jwt-service");
        assert_eq!(config.rotation_lock_ttl_seconds, 5);
    }
}
