//! Error types for token issuance, verification, rotation and the store
//! collaborators.

use std::time::Duration;

use jwt_shared::errors::{error_codes, ErrorResponse, IntoErrorResponse};
use thiserror::Error;

/// Failure of a public token operation.
///
/// Exactly one variant per error kind callers must handle; no other error
/// type crosses the service boundary after construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Bad signature, issuer, audience, encoding or wrong token type
    #[error("Invalid token: {reason}")]
    Invalid { reason: String },

    #[error("Token expired")]
    Expired,

    #[error("Token has been revoked")]
    Blacklisted,

    /// Another caller currently holds the rotation lock for this token
    #[error("Token rotation already in progress")]
    RotationInProgress,

    /// Payload shape or size rejected before signing
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Store or network failure, or an unexpected internal failure
    #[error("Server error: {message}")]
    Server { message: String },
}

impl TokenError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        TokenError::Invalid { reason: reason.into() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        TokenError::Validation { message: message.into() }
    }

    pub fn server(message: impl Into<String>) -> Self {
        TokenError::Server { message: message.into() }
    }

    /// Stable error code for programmatic handling
    pub fn code(&self) -> &'static str {
        match self {
            TokenError::Invalid { .. } => error_codes::TOKEN_INVALID,
            TokenError::Expired => error_codes::TOKEN_EXPIRED,
            TokenError::Blacklisted => error_codes::TOKEN_BLACKLISTED,
            TokenError::RotationInProgress => error_codes::TOKEN_ROTATION_IN_PROGRESS,
            TokenError::Validation { .. } => error_codes::VALIDATION_ERROR,
            TokenError::Server { .. } => error_codes::SERVER_ERROR,
        }
    }
}

impl From<StoreError> for TokenError {
    fn from(err: StoreError) -> Self {
        TokenError::server(err.to_string())
    }
}

impl IntoErrorResponse for TokenError {
    fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse::new(self.code(), self.to_string())
    }
}

/// Failure reported by a revocation or session store implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("corrupt value stored under '{key}': {message}")]
    Corrupt { key: String, message: String },
}

/// Invalid service configuration; fatal at construction time
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be at least {min} characters (got {actual})")]
    WeakSecret {
        field: &'static str,
        min: usize,
        actual: usize,
    },

    #[error("{field} has invalid duration '{value}': {message}")]
    InvalidDuration {
        field: &'static str,
        value: String,
        message: String,
    },

    #[error("{field} is invalid: {message}")]
    InvalidValue { field: &'static str, message: String },
}

/// Session cross-check failure at the collaborator boundary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("session '{session_id}' not found")]
    NotFound { session_id: String },

    #[error("session '{session_id}' has been invalidated")]
    Inactive { session_id: String },

    #[error("session '{session_id}' has expired")]
    Expired { session_id: String },

    #[error("session '{session_id}' does not belong to the token subject")]
    SubjectMismatch { session_id: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Overall authentication failure: either the token or its session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl AuthError {
    /// Stable error code; store failures surface as `SERVER_ERROR`
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::Token(err) => err.code(),
            AuthError::Session(SessionError::Store(_)) => error_codes::SERVER_ERROR,
            AuthError::Session(_) => error_codes::SESSION_INVALID,
        }
    }
}

impl IntoErrorResponse for AuthError {
    fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse::new(self.code(), self.to_string())
    }
}
