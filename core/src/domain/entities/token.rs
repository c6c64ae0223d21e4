//! Token entities for JWT-based authentication.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use jwt_shared::validation::{validators, Validate, ValidationErrors};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::TokenError;

/// Longest accepted `sub` or `sessionId`, in characters
pub const MAX_IDENTIFIER_LENGTH: usize = 255;

/// Longest accepted email address (RFC 5321 path limit)
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Role carried in every token; the set is closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    Moderator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Moderator => "moderator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "moderator" => Ok(Role::Moderator),
            other => Err(format!(
                "role '{}' is not one of user, admin, moderator",
                other
            )),
        }
    }
}

/// Discriminates access from refresh tokens.
///
/// Always present in the encoded claims so an access token can never be
/// accepted where a refresh token is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Access => f.write_str("access"),
            TokenType::Refresh => f.write_str("refresh"),
        }
    }
}

/// Claims structure for the JWT payload. Immutable once signed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPayload {
    /// Subject (user ID)
    pub sub: String,

    pub email: String,

    pub role: Role,

    /// Session this token was issued for
    pub session_id: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// JWT ID (unique identifier for the token)
    pub jti: String,

    #[serde(rename = "type")]
    pub token_type: TokenType,

    /// Opaque caller data carried across rotations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl TokenPayload {
    pub fn is_refresh(&self) -> bool {
        self.token_type == TokenType::Refresh
    }

    /// Seconds of natural lifetime left at `now`, clamped to zero
    pub fn remaining_ttl(&self, now: DateTime<Utc>) -> u64 {
        u64::try_from(self.exp - now.timestamp()).unwrap_or(0)
    }

    /// Checks if the claims have expired
    pub fn is_expired(&self) -> bool {
        self.remaining_ttl(Utc::now()) == 0
    }
}

/// Untrusted input to `sign`.
///
/// Role is kept as text here and checked against the closed [`Role`] set
/// when the request is validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    pub sub: String,
    pub email: String,
    pub role: String,
    /// Generated when absent
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

impl TokenRequest {
    pub fn new(sub: impl Into<String>, email: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            sub: sub.into(),
            email: email.into(),
            role: role.into(),
            session_id: None,
            metadata: None,
        }
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Build a request from untyped JSON input.
    ///
    /// Missing or non-string `sub`, `email` or `role` fail with
    /// `VALIDATION_ERROR`.
    pub fn from_value(value: Value) -> Result<Self, TokenError> {
        serde_json::from_value(value)
            .map_err(|e| TokenError::validation(format!("malformed token payload: {}", e)))
    }

    /// Parsed role, once validation has passed
    pub fn parsed_role(&self) -> Result<Role, TokenError> {
        self.role.parse().map_err(TokenError::validation)
    }
}

impl Validate for TokenRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !validators::not_empty(&self.sub) {
            errors.add_error("sub", "must not be empty", "REQUIRED");
        } else if !validators::length_between(&self.sub, 1, MAX_IDENTIFIER_LENGTH) {
            errors.add_error(
                "sub",
                format!("must be at most {} characters", MAX_IDENTIFIER_LENGTH),
                "TOO_LONG",
            );
        }

        if !validators::not_empty(&self.email) {
            errors.add_error("email", "must not be empty", "REQUIRED");
        } else if !validators::length_between(&self.email, 1, MAX_EMAIL_LENGTH) {
            errors.add_error(
                "email",
                format!("must be at most {} characters", MAX_EMAIL_LENGTH),
                "TOO_LONG",
            );
        } else if !validators::is_valid_email(&self.email) {
            errors.add_error("email", "is not a valid email address", "INVALID_FORMAT");
        }

        if let Err(message) = self.role.parse::<Role>() {
            errors.add_error("role", message, "INVALID_ROLE");
        }

        if let Some(session_id) = &self.session_id {
            if !validators::not_empty(session_id) {
                errors.add_error("sessionId", "must not be blank when provided", "INVALID_FORMAT");
            } else if !validators::length_between(session_id, 1, MAX_IDENTIFIER_LENGTH) {
                errors.add_error(
                    "sessionId",
                    format!("must be at most {} characters", MAX_IDENTIFIER_LENGTH),
                    "TOO_LONG",
                );
            }
        }

        errors.into_result()
    }
}

/// Token pair returned by `sign` and rotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// JWT access token
    pub access_token: String,

    /// JWT refresh token
    pub refresh_token: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,

    pub issued_at: DateTime<Utc>,

    /// When the access token expires
    pub expires_at: DateTime<Utc>,

    /// When the refresh token expires
    pub refresh_expires_at: DateTime<Utc>,
}
