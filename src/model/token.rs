//! Session tokens.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A session token issued by the remote for a registered identity.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    pub token: String,
    pub user_id: u64,
    pub expires_at: DateTime<Utc>,
}

impl SessionToken {
    /// Whether the token expires within `margin` of `now` (or already has).
    ///
    /// A margin reaching past the representable date range covers every
    /// token.
    #[must_use]
    pub fn expires_within(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        match now.checked_add_signed(margin) {
            Some(limit) => self.expires_at <= limit,
            None => margin > Duration::zero(),
        }
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionToken")
            .field("token", &crate::identity::mask(&self.token))
            .field("user_id", &self.user_id)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
