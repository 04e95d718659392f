//! Session token.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// True once the current time has reached `expires_at`.
pub fn is_token_expired(expires_at: DateTime<Utc>) -> bool {
    Utc::now() >= expires_at
}

/// A bearer credential together with the moment the app stops trusting it.
///
/// Serialized as `{"accessToken": "...", "expiresAt": "<RFC3339>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl SessionToken {
    /// Create a token that expires `lifetime` from now.
    pub fn issued_now(access_token: impl Into<String>, lifetime: Duration) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at: Utc::now() + lifetime,
        }
    }

    /// See [`is_token_expired`].
    pub fn is_expired(&self) -> bool {
        is_token_expired(self.expires_at)
    }

    /// Remaining lifetime, or zero when expired.
    pub fn remaining(&self) -> Duration {
        let left = self.expires_at - Utc::now();
        if left < Duration::zero() {
            Duration::zero()
        } else {
            left
        }
    }

    /// Remaining lifetime formatted as `"Xh Ym"`.
    pub fn expires_in_display(&self) -> String {
        if self.is_expired() {
            return "Expired".to_string();
        }
        let secs = self.remaining().num_seconds();
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}
