//! Token signing, verification and blacklist management

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use jwt_shared::config::JwtConfig;
use jwt_shared::validation::Validate;
use serde_json::Value;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::entities::{
    BlacklistEntry, RevocationReason, Role, TokenPair, TokenPayload, TokenRequest, TokenType,
};
use crate::errors::{ConfigError, StoreError, TokenError};
use crate::repositories::RevocationStore;

use super::config::TokenServiceConfig;

/// Per-call verification options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerifyOptions {
    /// Tolerance applied to `exp`; zero by default and capped at the
    /// configured `max_clock_skew`
    pub clock_skew: Duration,
    /// Overrides the configured store deadline for this call
    pub timeout: Option<Duration>,
}

impl VerifyOptions {
    pub fn with_clock_skew(mut self, skew: Duration) -> Self {
        self.clock_skew = skew;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// HMAC key material for one token kind
struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKeys {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Claims shared by both tokens of a pair
pub(crate) struct PairSubject<'a> {
    pub sub: &'a str,
    pub email: &'a str,
    pub role: Role,
    pub session_id: &'a str,
    pub metadata: Option<&'a Value>,
}

impl<'a> From<&'a TokenPayload> for PairSubject<'a> {
    fn from(claims: &'a TokenPayload) -> Self {
        Self {
            sub: &claims.sub,
            email: &claims.email,
            role: claims.role,
            session_id: &claims.session_id,
            metadata: claims.metadata.as_ref(),
        }
    }
}

/// Stateless signer and verifier over a shared revocation store.
///
/// Holds no mutable state of its own: every revocation fact lives in the
/// store, so any number of instances can serve the same tokens.
pub struct TokenService<S: RevocationStore> {
    store: S,
    config: TokenServiceConfig,
    access_keys: SigningKeys,
    refresh_keys: SigningKeys,
}

impl<S: RevocationStore> TokenService<S> {
    /// Creates a new token service instance
    ///
    /// # Arguments
    ///
    /// * `store` - Shared revocation store
    /// * `config` - Token service configuration
    ///
    /// # Returns
    ///
    /// A new `TokenService`, or the first configuration problem found.
    /// Nothing is issued by a service that failed to construct.
    pub fn new(store: S, config: TokenServiceConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        info!(
            issuer = %config.issuer,
            audience = %config.audience,
            access_ttl_secs = config.access_token_ttl.as_secs(),
            refresh_ttl_secs = config.refresh_token_ttl.as_secs(),
            "Token service initialized"
        );

        Ok(Self {
            access_keys: SigningKeys::from_secret(&config.secret),
            refresh_keys: SigningKeys::from_secret(&config.refresh_secret),
            store,
            config,
        })
    }

    /// Creates a token service from the raw environment configuration
    pub fn from_jwt_config(store: S, config: &JwtConfig) -> Result<Self, ConfigError> {
        Self::new(store, TokenServiceConfig::from_jwt_config(config)?)
    }

    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Signs a new access/refresh token pair
    ///
    /// # Arguments
    ///
    /// * `request` - Subject, email, role and optional session id/metadata
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - Freshly signed pair with distinct `jti`s
    /// * `Err(TokenError::Validation)` - Malformed or oversized payload
    pub fn sign(&self, request: TokenRequest) -> Result<TokenPair, TokenError> {
        request
            .validate()
            .map_err(|errors| TokenError::validation(errors.to_string()))?;
        let role = request.parsed_role()?;

        let session_id = request
            .session_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        self.issue_pair(PairSubject {
            sub: &request.sub,
            email: &request.email,
            role,
            session_id: &session_id,
            metadata: request.metadata.as_ref(),
        })
    }

    /// Verifies an access token and checks it against the blacklist
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPayload)` - Decoded claims
    /// * `Err(TokenError::Expired)` - Past `exp` beyond the allowed skew
    /// * `Err(TokenError::Blacklisted)` - Revoked
    /// * `Err(TokenError::Server)` - The store could not be consulted
    pub async fn verify(&self, token: &str, options: &VerifyOptions) -> Result<TokenPayload, TokenError> {
        self.verify_kind(token, TokenType::Access, options).await
    }

    /// Verifies a refresh token and checks it against the blacklist
    pub async fn verify_refresh(&self, token: &str, options: &VerifyOptions) -> Result<TokenPayload, TokenError> {
        self.verify_kind(token, TokenType::Refresh, options).await
    }

    async fn verify_kind(
        &self,
        token: &str,
        kind: TokenType,
        options: &VerifyOptions,
    ) -> Result<TokenPayload, TokenError> {
        let claims = self.decode_token(token, kind, self.leeway_secs(options), true)?;
        self.ensure_not_blacklisted(&claims.jti, self.store_timeout(options))
            .await?;
        Ok(claims)
    }

    /// Blacklists a token of either kind for the rest of its natural lifetime.
    ///
    /// The signature is still checked; expiry is not, so that an expired
    /// token is reported as `Expired` rather than `Invalid`.
    ///
    /// # Returns
    ///
    /// * `Ok(BlacklistEntry)` - Entry written
    /// * `Err(TokenError::Expired)` - Nothing left to revoke; no write made
    pub async fn blacklist(&self, token: &str, reason: RevocationReason) -> Result<BlacklistEntry, TokenError> {
        let claims = self.decode_any_kind(token)?;
        self.revoke_claims(&claims, reason, self.config.store_timeout)
            .await
    }

    /// Blacklists a `jti` directly, given the `exp` of the token it names
    pub async fn revoke_jti(
        &self,
        jti: &str,
        exp: i64,
        reason: RevocationReason,
    ) -> Result<BlacklistEntry, TokenError> {
        if jti.trim().is_empty() {
            return Err(TokenError::validation("jti must not be empty"));
        }

        let entry = BlacklistEntry::for_jti(jti, exp, reason, Utc::now(), self.config.max_skew_secs())
            .ok_or(TokenError::Expired)?;
        self.write_blacklist_entry(&entry, self.config.store_timeout)
            .await?;
        Ok(entry)
    }

    /// Blacklists both tokens of a pair, as on logout.
    ///
    /// Both tokens are decoded before anything is written. Tokens that have
    /// already expired are skipped.
    ///
    /// # Returns
    ///
    /// Number of blacklist entries written (0 to 2)
    pub async fn revoke_pair(
        &self,
        access_token: &str,
        refresh_token: &str,
        reason: RevocationReason,
    ) -> Result<usize, TokenError> {
        let access = self.decode_token(access_token, TokenType::Access, 0, false)?;
        let refresh = self.decode_token(refresh_token, TokenType::Refresh, 0, false)?;

        if access.session_id != refresh.session_id || access.sub != refresh.sub {
            return Err(TokenError::invalid("tokens do not belong to the same session"));
        }

        let mut written = 0;
        for claims in [&access, &refresh] {
            match self
                .revoke_claims(claims, reason, self.config.store_timeout)
                .await
            {
                Ok(_) => written += 1,
                Err(TokenError::Expired) => {
                    debug!(jti = %claims.jti, "Skipping expired token during pair revocation");
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            sub = %access.sub,
            session_id = %access.session_id,
            written,
            reason = %reason,
            "Token pair revoked"
        );
        Ok(written)
    }

    /// Whether `jti` currently has a blacklist entry
    pub async fn is_blacklisted(&self, jti: &str) -> Result<bool, TokenError> {
        let key = self.blacklist_key(jti);
        self.with_deadline(
            self.config.store_timeout,
            "blacklist_exists",
            self.store.exists(&key),
        )
        .await
    }

    /// Reads back the blacklist entry for `jti`, if any
    pub async fn blacklist_entry(&self, jti: &str) -> Result<Option<BlacklistEntry>, TokenError> {
        let key = self.blacklist_key(jti);
        let raw = self
            .with_deadline(self.config.store_timeout, "blacklist_get", self.store.get(&key))
            .await?;

        match raw {
            Some(value) => serde_json::from_str(&value).map(Some).map_err(|e| {
                let err = StoreError::Corrupt {
                    key,
                    message: e.to_string(),
                };
                error!(error = %err, "Unreadable blacklist entry");
                TokenError::from(err)
            }),
            None => Ok(None),
        }
    }

    pub fn blacklist_key(&self, jti: &str) -> String {
        format!("{}{}", self.config.blacklist_key_prefix, jti)
    }

    pub fn rotation_lock_key(&self, jti: &str) -> String {
        format!("{}{}", self.config.rotation_lock_prefix, jti)
    }

    /// Signs a pair for an already-validated subject
    pub(crate) fn issue_pair(&self, subject: PairSubject<'_>) -> Result<TokenPair, TokenError> {
        let now = Utc::now();
        let iat = now.timestamp();

        let access = self.build_claims(&subject, TokenType::Access, iat, iat + self.config.access_ttl_secs());
        let refresh = self.build_claims(&subject, TokenType::Refresh, iat, iat + self.config.refresh_ttl_secs());

        let access_token = self.encode_claims(&access, &self.access_keys)?;
        let refresh_token = self.encode_claims(&refresh, &self.refresh_keys)?;

        debug!(
            sub = %subject.sub,
            session_id = %subject.session_id,
            access_jti = %access.jti,
            refresh_jti = %refresh.jti,
            "Issued token pair"
        );

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.config.access_ttl_secs(),
            issued_at: timestamp(iat)?,
            expires_at: timestamp(access.exp)?,
            refresh_expires_at: timestamp(refresh.exp)?,
        })
    }

    fn build_claims(&self, subject: &PairSubject<'_>, kind: TokenType, iat: i64, exp: i64) -> TokenPayload {
        TokenPayload {
            sub: subject.sub.to_string(),
            email: subject.email.to_string(),
            role: subject.role,
            session_id: subject.session_id.to_string(),
            iat,
            exp,
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            jti: Uuid::new_v4().to_string(),
            token_type: kind,
            metadata: subject.metadata.cloned(),
        }
    }

    fn encode_claims(&self, claims: &TokenPayload, keys: &SigningKeys) -> Result<String, TokenError> {
        let serialized = serde_json::to_vec(claims)
            .map_err(|e| TokenError::server(format!("failed to serialize claims: {}", e)))?;

        if serialized.len() > self.config.max_payload_size {
            return Err(TokenError::validation(format!(
                "serialized payload is {} bytes, exceeding the {} byte limit",
                serialized.len(),
                self.config.max_payload_size
            )));
        }

        encode(&Header::new(Algorithm::HS256), claims, &keys.encoding)
            .map_err(|e| TokenError::server(format!("failed to sign token: {}", e)))
    }

    /// Decodes and validates `token` as a token of `kind`
    pub(crate) fn decode_token(
        &self,
        token: &str,
        kind: TokenType,
        leeway: u64,
        validate_exp: bool,
    ) -> Result<TokenPayload, TokenError> {
        let keys = match kind {
            TokenType::Access => &self.access_keys,
            TokenType::Refresh => &self.refresh_keys,
        };

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.leeway = leeway;
        validation.validate_exp = validate_exp;
        validation.validate_nbf = false;

        let claims = decode::<TokenPayload>(token, &keys.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| map_jwt_error(&e, kind))?;

        // jsonwebtoken still accepts `exp + leeway == now`; blacklist entries
        // are only guaranteed to last until that instant
        if validate_exp && claims.exp.saturating_add(leeway as i64) <= Utc::now().timestamp() {
            debug!(token_type = %kind, jti = %claims.jti, "Token rejected at expiry boundary");
            return Err(TokenError::Expired);
        }

        if claims.token_type != kind {
            debug!(expected = %kind, actual = %claims.token_type, "Token type mismatch");
            return Err(TokenError::invalid(format!(
                "expected {} token, got {} token",
                kind, claims.token_type
            )));
        }

        Ok(claims)
    }

    /// Decodes a token as access first, then as refresh, ignoring expiry
    fn decode_any_kind(&self, token: &str) -> Result<TokenPayload, TokenError> {
        match self.decode_token(token, TokenType::Access, 0, false) {
            Ok(claims) => Ok(claims),
            Err(TokenError::Invalid { .. }) => self.decode_token(token, TokenType::Refresh, 0, false),
            Err(e) => Err(e),
        }
    }

    pub(crate) async fn ensure_not_blacklisted(&self, jti: &str, timeout: Duration) -> Result<(), TokenError> {
        let key = self.blacklist_key(jti);
        let revoked = self
            .with_deadline(timeout, "blacklist_exists", self.store.exists(&key))
            .await?;

        if revoked {
            warn!(jti = %jti, "Rejected blacklisted token");
            return Err(TokenError::Blacklisted);
        }
        Ok(())
    }

    pub(crate) async fn revoke_claims(
        &self,
        claims: &TokenPayload,
        reason: RevocationReason,
        timeout: Duration,
    ) -> Result<BlacklistEntry, TokenError> {
        let entry = BlacklistEntry::for_token(claims, reason, Utc::now(), self.config.max_skew_secs())
            .ok_or(TokenError::Expired)?;
        self.write_blacklist_entry(&entry, timeout).await?;
        Ok(entry)
    }

    async fn write_blacklist_entry(&self, entry: &BlacklistEntry, timeout: Duration) -> Result<(), TokenError> {
        let key = self.blacklist_key(&entry.jti);
        let value = serde_json::to_string(entry)
            .map_err(|e| TokenError::server(format!("failed to serialize blacklist entry: {}", e)))?;

        self.with_deadline(
            timeout,
            "blacklist_set",
            self.store.set_with_ttl(&key, &value, entry.ttl_seconds),
        )
        .await?;

        info!(
            jti = %entry.jti,
            reason = %entry.reason,
            ttl_seconds = entry.ttl_seconds,
            "Token blacklisted"
        );
        Ok(())
    }

    /// Leeway in seconds for `options`, capped at the configured maximum
    pub(crate) fn leeway_secs(&self, options: &VerifyOptions) -> u64 {
        let requested = options.clock_skew.as_secs();
        let allowed = self.config.max_skew_secs();
        if requested > allowed {
            debug!(requested, allowed, "Clock skew capped");
        }
        requested.min(allowed)
    }

    pub(crate) fn store_timeout(&self, options: &VerifyOptions) -> Duration {
        options.timeout.unwrap_or(self.config.store_timeout)
    }

    /// Runs one store call under `timeout`; both failure and timeout become
    /// `TokenError::Server`
    pub(crate) async fn with_deadline<T, F>(
        &self,
        timeout: Duration,
        operation: &'static str,
        call: F,
    ) -> Result<T, TokenError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                error!(operation, error = %e, "Revocation store call failed");
                Err(e.into())
            }
            Err(_) => {
                error!(
                    operation,
                    timeout_ms = timeout.as_millis() as u64,
                    "Revocation store call timed out"
                );
                Err(StoreError::Timeout(timeout).into())
            }
        }
    }
}

fn map_jwt_error(err: &JwtError, kind: TokenType) -> TokenError {
    let mapped = match err.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidSignature => TokenError::invalid("signature verification failed"),
        ErrorKind::InvalidIssuer => TokenError::invalid("issuer mismatch"),
        ErrorKind::InvalidAudience => TokenError::invalid("audience mismatch"),
        ErrorKind::InvalidAlgorithm => TokenError::invalid("unexpected signing algorithm"),
        ErrorKind::MissingRequiredClaim(claim) => {
            TokenError::invalid(format!("missing required claim '{}'", claim))
        }
        ErrorKind::Json(_) => TokenError::invalid("claims do not match the token schema"),
        _ => TokenError::invalid("malformed token"),
    };

    debug!(token_type = %kind, code = mapped.code(), error = %err, "Token rejected");
    mapped
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, TokenError> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| TokenError::server(format!("timestamp {} out of range", secs)))
}
