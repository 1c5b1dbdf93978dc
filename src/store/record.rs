//! Data structures for credential files.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::environment::EnvironmentType;
use crate::identity::Identity;
use crate::model::SessionToken;

/// Current version of the credential file format.
pub const CREDENTIAL_VERSION: u32 = 1;

/// Persisted identity plus (once validated) session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Format version.
    pub version: u32,
    /// Environment the identity was registered in.
    pub environment: EnvironmentType,
    /// The registered device identity.
    pub identity: Identity,
    /// Last known session, absent until the first successful validation.
    pub session: Option<SessionToken>,
    /// When the record was first written.
    pub created_at: DateTime<Utc>,
    /// When the record was last overwritten.
    pub updated_at: DateTime<Utc>,
}

impl CredentialRecord {
    /// Create a skeleton record for a freshly obtained identity.
    pub fn new(environment: EnvironmentType, identity: Identity) -> Self {
        let now = Utc::now();
        Self {
            version: CREDENTIAL_VERSION,
            environment,
            identity,
            session: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record a newly validated session.
    pub fn with_session(mut self, session: SessionToken) -> Self {
        self.session = Some(session);
        self.updated_at = Utc::now();
        self
    }

    /// Check the fields a usable record cannot do without.
    ///
    /// # Errors
    ///
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.version != CREDENTIAL_VERSION {
            return Err(format!(
                "unsupported credential version {} (expected {})",
                self.version, CREDENTIAL_VERSION
            ));
        }
        if !self.identity.is_complete() {
            return Err("identity is missing its API key, installation token or device id".into());
        }
        if let Some(session) = &self.session {
            if session.token.trim().is_empty() {
                return Err("session token is empty".into());
            }
        }
        Ok(())
    }
}
