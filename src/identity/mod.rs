//! Device identities and how to obtain them.
//!
//! An [`Identity`] is created once per credential file and never mutated;
//! re-creating it produces a new identity and invalidates the old one.
//!
//! * [`provisioner`]: Registers new identities or requests disposable ones.

pub mod provisioner;

pub use provisioner::IdentityProvisioner;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Allow-list entry that permits requests from any source address.
pub const PERMIT_ANY_IP: &str = "*";

/// A registered device identity tied to an API key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// The long-lived (or disposable) API key the device is bound to.
    pub api_key: String,
    /// Human-readable device description shown in the remote's app.
    pub description: String,
    /// Source addresses allowed to use this identity.
    pub permitted_ips: Vec<String>,
    /// Token returned by the installation step; authenticates device and
    /// session registration.
    pub installation_token: String,
    /// Remote id of the registered device.
    pub device_id: u64,
    /// When the identity was registered.
    pub created_at: DateTime<Utc>,
}

impl Identity {
    /// Whether every field needed for signed calls is present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.api_key.trim().is_empty()
            && !self.installation_token.trim().is_empty()
            && self.device_id != 0
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("api_key", &mask(&self.api_key))
            .field("description", &self.description)
            .field("permitted_ips", &self.permitted_ips)
            .field("installation_token", &mask(&self.installation_token))
            .field("device_id", &self.device_id)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Mask a secret for display, keeping only the last four characters.
#[must_use]
pub fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(8), tail)
}
