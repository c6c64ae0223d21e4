//! Shared error types and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Standard error response structure handed to callers that surface errors
/// over a wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for client identification
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Additional error details (field errors, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,

    /// Timestamp when the error occurred
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    /// Add a detail field to the error response
    pub fn add_detail(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let details = self.details.get_or_insert_with(HashMap::new);
        if let Ok(json_value) = serde_json::to_value(value) {
            details.insert(key.into(), json_value);
        }
        self
    }
}

/// Stable error codes of the token subsystem
pub mod error_codes {
    pub const TOKEN_INVALID: &str = "TOKEN_INVALID";
    pub const TOKEN_EXPIRED: &str = "TOKEN_EXPIRED";
    pub const TOKEN_BLACKLISTED: &str = "TOKEN_BLACKLISTED";
    pub const TOKEN_ROTATION_IN_PROGRESS: &str = "TOKEN_ROTATION_IN_PROGRESS";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const SERVER_ERROR: &str = "SERVER_ERROR";
    pub const SESSION_INVALID: &str = "SESSION_INVALID";
}

/// Trait for converting errors to ErrorResponse
pub trait IntoErrorResponse {
    fn to_error_response(&self) -> ErrorResponse;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_details() {
        let response = ErrorResponse::new(error_codes::VALIDATION_ERROR, "bad input")
            .add_detail("field", "email")
            .add_detail("max", 8192);

        assert_eq!(response.error, "VALIDATION_ERROR");
        let details = response.details.unwrap();
        assert_eq!(details["field"], "email");
        assert_eq!(details["max"], 8192);
    }

    #[test]
    fn test_details_are_omitted_when_empty() {
        let json = serde_json::to_value(ErrorResponse::new("TOKEN_EXPIRED", "expired")).unwrap();
        assert!(json.get("details").is_none());
        assert_eq!(json["error"], "TOKEN_EXPIRED");
    }
}
