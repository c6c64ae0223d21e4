//! Externally owned session record, as seen by the token subsystem.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub session_id: String,

    /// Owner of the session; must equal the token subject
    pub user_id: String,

    /// Cleared when the session is invalidated independently of its tokens
    pub active: bool,

    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionRecord {
    pub fn new(session_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            user_id: user_id.into(),
            active: true,
            expires_at: None,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| at <= now).unwrap_or(false)
    }
}
