//! Validated configuration for the token service

use std::fmt;
use std::time::Duration;

use jwt_shared::config::{JwtConfig, MIN_SECRET_LENGTH};
use jwt_shared::duration::parse_duration;

use crate::domain::entities::ROTATION_LOCK_TTL_SECONDS;
use crate::errors::ConfigError;

/// Upper bound on any token lifetime (100 years)
const MAX_TOKEN_LIFETIME_SECS: u64 = 100 * 31_536_000;

/// Upper bound on the configurable clock skew tolerance
const MAX_CLOCK_SKEW_SECS: u64 = 3600;

/// Configuration for the token service.
///
/// Only obtainable through [`TokenServiceConfig::new`] or
/// [`TokenServiceConfig::from_jwt_config`] followed by [`validate`], which
/// [`TokenService::new`](super::TokenService::new) always runs.
///
/// [`validate`]: TokenServiceConfig::validate
#[derive(Clone)]
pub struct TokenServiceConfig {
    /// HS256 secret for access tokens
    pub secret: String,
    /// HS256 secret for refresh tokens
    pub refresh_secret: String,
    pub issuer: String,
    pub audience: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub blacklist_key_prefix: String,
    pub rotation_lock_prefix: String,
    /// Maximum serialized claims size in bytes
    pub max_payload_size: usize,
    pub rotation_lock_ttl: Duration,
    /// Default deadline for each revocation store call
    pub store_timeout: Duration,
    /// Cap on [`VerifyOptions::clock_skew`](super::VerifyOptions::clock_skew).
    /// Blacklist entries are kept this long past `exp`.
    pub max_clock_skew: Duration,
}

impl fmt::Debug for TokenServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenServiceConfig")
            .field("secret", &"[REDACTED]")
            .field("refresh_secret", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("blacklist_key_prefix", &self.blacklist_key_prefix)
            .field("rotation_lock_prefix", &self.rotation_lock_prefix)
            .field("max_payload_size", &self.max_payload_size)
            .field("rotation_lock_ttl", &self.rotation_lock_ttl)
            .field("store_timeout", &self.store_timeout)
            .field("max_clock_skew", &self.max_clock_skew)
            .finish()
    }
}

impl TokenServiceConfig {
    /// Build a configuration from the two secrets with every other value
    /// at its default
    pub fn new(secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        let defaults = JwtConfig::default();
        Self {
            secret: secret.into(),
            refresh_secret: refresh_secret.into(),
            issuer: defaults.issuer,
            audience: defaults.audience,
            access_token_ttl: Duration::from_secs(15 * 60),
            refresh_token_ttl: Duration::from_secs(7 * 86_400),
            blacklist_key_prefix: defaults.blacklist_key_prefix,
            rotation_lock_prefix: defaults.rotation_lock_prefix,
            max_payload_size: defaults.max_payload_size,
            rotation_lock_ttl: Duration::from_secs(ROTATION_LOCK_TTL_SECONDS),
            store_timeout: Duration::from_millis(defaults.store_timeout_ms),
            max_clock_skew: Duration::from_secs(defaults.max_clock_skew_seconds),
        }
    }

    /// Convert the raw environment configuration, parsing both expiry
    /// strings. The result still has to pass [`validate`](Self::validate).
    pub fn from_jwt_config(config: &JwtConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            secret: config.secret.clone(),
            refresh_secret: config.refresh_secret.clone(),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            access_token_ttl: parse_expiry("access_token_expiry", &config.access_token_expiry)?,
            refresh_token_ttl: parse_expiry("refresh_token_expiry", &config.refresh_token_expiry)?,
            blacklist_key_prefix: config.blacklist_key_prefix.clone(),
            rotation_lock_prefix: config.rotation_lock_prefix.clone(),
            max_payload_size: config.max_payload_size,
            rotation_lock_ttl: Duration::from_secs(config.rotation_lock_ttl_seconds),
            store_timeout: Duration::from_millis(config.store_timeout_ms),
            max_clock_skew: Duration::from_secs(config.max_clock_skew_seconds),
        })
    }

    /// Set both token lifetimes from duration strings such as `"15m"`
    pub fn with_expiry(mut self, access: &str, refresh: &str) -> Result<Self, ConfigError> {
        self.access_token_ttl = parse_expiry("access_token_expiry", access)?;
        self.refresh_token_ttl = parse_expiry("refresh_token_expiry", refresh)?;
        Ok(self)
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self.audience = audience.into();
        self
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub fn with_rotation_lock_ttl(mut self, ttl: Duration) -> Self {
        self.rotation_lock_ttl = ttl;
        self
    }

    pub fn with_max_payload_size(mut self, bytes: usize) -> Self {
        self.max_payload_size = bytes;
        self
    }

    pub fn with_max_clock_skew(mut self, skew: Duration) -> Self {
        self.max_clock_skew = skew;
        self
    }

    /// Check every value the service relies on.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Configuration is usable
    /// * `Err(ConfigError)` - First offending field
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_secret("secret", &self.secret)?;
        check_secret("refresh_secret", &self.refresh_secret)?;

        check_not_blank("issuer", &self.issuer)?;
        check_not_blank("audience", &self.audience)?;
        check_not_blank("blacklist_key_prefix", &self.blacklist_key_prefix)?;
        check_not_blank("rotation_lock_prefix", &self.rotation_lock_prefix)?;

        if self.blacklist_key_prefix == self.rotation_lock_prefix {
            return Err(ConfigError::InvalidValue {
                field: "rotation_lock_prefix",
                message: "must differ from blacklist_key_prefix".to_string(),
            });
        }

        check_lifetime("access_token_expiry", self.access_token_ttl)?;
        check_lifetime("refresh_token_expiry", self.refresh_token_ttl)?;

        if self.max_payload_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_payload_size",
                message: "must be greater than zero".to_string(),
            });
        }

        // Store TTLs have whole-second resolution
        if self.rotation_lock_ttl.as_secs() == 0 {
            return Err(ConfigError::InvalidValue {
                field: "rotation_lock_ttl",
                message: "must be at least one second".to_string(),
            });
        }

        if self.store_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "store_timeout",
                message: "must be greater than zero".to_string(),
            });
        }

        if self.max_clock_skew.as_secs() > MAX_CLOCK_SKEW_SECS {
            return Err(ConfigError::InvalidValue {
                field: "max_clock_skew",
                message: format!("must not exceed {}s", MAX_CLOCK_SKEW_SECS),
            });
        }

        Ok(())
    }

    pub(crate) fn access_ttl_secs(&self) -> i64 {
        self.access_token_ttl.as_secs() as i64
    }

    pub(crate) fn refresh_ttl_secs(&self) -> i64 {
        self.refresh_token_ttl.as_secs() as i64
    }

    pub(crate) fn max_skew_secs(&self) -> u64 {
        self.max_clock_skew.as_secs()
    }
}

fn parse_expiry(field: &'static str, value: &str) -> Result<Duration, ConfigError> {
    parse_duration(value).map_err(|e| ConfigError::InvalidDuration {
        field,
        value: value.to_string(),
        message: e.to_string(),
    })
}

fn check_secret(field: &'static str, secret: &str) -> Result<(), ConfigError> {
    let actual = secret.chars().count();
    if actual < MIN_SECRET_LENGTH {
        return Err(ConfigError::WeakSecret {
            field,
            min: MIN_SECRET_LENGTH,
            actual,
        });
    }
    Ok(())
}

fn check_not_blank(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field,
            message: "must not be empty".to_string(),
        });
    }
    Ok(())
}

fn check_lifetime(field: &'static str, ttl: Duration) -> Result<(), ConfigError> {
    let secs = ttl.as_secs();
    if secs == 0 || secs > MAX_TOKEN_LIFETIME_SECS {
        return Err(ConfigError::InvalidDuration {
            field,
            value: format!("{}s", secs),
            message: format!("must be between 1s and {}s", MAX_TOKEN_LIFETIME_SECS),
        });
    }
    Ok(())
}
