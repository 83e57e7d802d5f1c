//! Login session record.
//!
//! # Invariants
//! - A session is valid iff `now <= expires_at`.
//! - `expires_at` only moves forward through `refresh`.

use serde::{Deserialize, Serialize};

/// Default sliding-window length: 20 minutes.
pub const SESSION_TTL_MS: i64 = 20 * 60 * 1000;

/// Singleton login record; timestamps are Unix epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub email: String,
    pub created_at: i64,
    pub expires_at: i64,
    #[serde(default)]
    pub remember: bool,
}

impl Session {
    pub fn start(email: impl Into<String>, now_ms: i64, ttl_ms: i64, remember: bool) -> Self {
        Self {
            email: email.into(),
            created_at: now_ms,
            expires_at: now_ms + ttl_ms,
            remember,
        }
    }

    pub fn is_valid_at(&self, now_ms: i64) -> bool {
        now_ms <= self.expires_at
    }

    /// Restarts the expiry window from `now_ms`.
    pub fn refresh(&mut self, now_ms: i64, ttl_ms: i64) {
        self.expires_at = now_ms + ttl_ms;
    }
}
