//! Revocation records kept in the shared store.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::token::TokenPayload;

/// Default lifetime of a rotation lock
pub const ROTATION_LOCK_TTL_SECONDS: u64 = 5;

/// Why a token was blacklisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevocationReason {
    /// Refresh token consumed by a successful rotation
    Rotated,
    Logout,
    /// Explicit revocation by an operator or the owning user
    Revoked,
    /// Token believed stolen or leaked
    Compromised,
}

impl fmt::Display for RevocationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RevocationReason::Rotated => "rotated",
            RevocationReason::Logout => "logout",
            RevocationReason::Revoked => "revoked",
            RevocationReason::Compromised => "compromised",
        };
        f.write_str(name)
    }
}

/// Blacklist record keyed by `jti`.
///
/// Never outlives the token it revokes: `ttl_seconds` is the token's
/// residual lifetime at the moment of blacklisting, extended by the widest
/// clock skew verification will accept past `exp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlacklistEntry {
    pub jti: String,
    pub blacklisted_at: DateTime<Utc>,
    pub reason: RevocationReason,
    pub ttl_seconds: u64,
}

impl BlacklistEntry {
    /// Build the entry for `payload`, or `None` when the token can no
    /// longer pass verification and there is nothing left to revoke.
    ///
    /// `skew_secs` is the largest leeway verification applies to `exp`; a
    /// token stays verifiable while `exp + skew_secs > now`.
    pub fn for_token(
        payload: &TokenPayload,
        reason: RevocationReason,
        now: DateTime<Utc>,
        skew_secs: u64,
    ) -> Option<Self> {
        Self::for_jti(&payload.jti, payload.exp, reason, now, skew_secs)
    }

    pub fn for_jti(
        jti: &str,
        exp: i64,
        reason: RevocationReason,
        now: DateTime<Utc>,
        skew_secs: u64,
    ) -> Option<Self> {
        let skew = i64::try_from(skew_secs).ok()?;
        let ttl_seconds = exp
            .checked_add(skew)
            .and_then(|deadline| deadline.checked_sub(now.timestamp()))
            .and_then(|ttl| u64::try_from(ttl).ok())
            .filter(|ttl| *ttl > 0)?;

        Some(Self {
            jti: jti.to_string(),
            blacklisted_at: now,
            reason,
            ttl_seconds,
        })
    }
}

/// Value written under a rotation lock key while a rotation is running
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationLock {
    /// `jti` of the refresh token being rotated
    pub jti: String,
    /// Random identifier of the caller holding the lock
    pub holder: String,
    pub acquired_at: DateTime<Utc>,
}

impl RotationLock {
    pub fn new(jti: impl Into<String>) -> Self {
        Self {
            jti: jti.into(),
            holder: uuid::Uuid::new_v4().to_string(),
            acquired_at: Utc::now(),
        }
    }
}
