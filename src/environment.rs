//! Deployment environments and the policy table that governs them.
//!
//! Every environment-dependent decision in the session lifecycle (which
//! credential file to use, whether a rejected identity may be thrown away and
//! regenerated, whether a disposable identity may be requested) is answered by
//! looking up the [`EnvironmentPolicy`] for an [`EnvironmentType`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Deployment context the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EnvironmentType {
    /// Test environment with throwaway users and fake money.
    Sandbox,
    /// Live environment bound to a real, long-lived API key.
    Production,
}

/// Static policy entry for one environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvironmentPolicy {
    /// Credential file name, relative to the credential directory.
    pub file_name: &'static str,
    /// Delete and regenerate the identity when the remote rejects it.
    pub auto_regenerate_on_invalidation: bool,
    /// Request a disposable identity when no credential file exists.
    pub allow_disposable_identity: bool,
}

const SANDBOX_POLICY: EnvironmentPolicy = EnvironmentPolicy {
    file_name: "tinker-sandbox.conf",
    auto_regenerate_on_invalidation: true,
    allow_disposable_identity: true,
};

// Production identities are bound to a user's real key and must never be
// replaced behind their back.
const PRODUCTION_POLICY: EnvironmentPolicy = EnvironmentPolicy {
    file_name: "tinker-production.conf",
    auto_regenerate_on_invalidation: false,
    allow_disposable_identity: false,
};

impl EnvironmentType {
    /// All environments, in display order.
    pub const ALL: [EnvironmentType; 2] = [EnvironmentType::Sandbox, EnvironmentType::Production];

    /// Look up the policy entry for this environment.
    #[must_use]
    pub fn policy(self) -> &'static EnvironmentPolicy {
        match self {
            Self::Sandbox => &SANDBOX_POLICY,
            Self::Production => &PRODUCTION_POLICY,
        }
    }

    /// Lowercase name used on the command line and in log output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sandbox => "sandbox",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for EnvironmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown environment name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown environment '{0}' (expected 'sandbox' or 'production')")]
pub struct UnknownEnvironment(pub String);

impl FromStr for EnvironmentType {
    type Err = UnknownEnvironment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Self::Sandbox),
            "production" => Ok(Self::Production),
            _ => Err(UnknownEnvironment(s.to_string())),
        }
    }
}
