//! Failures of the session lifecycle.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::provider::ProviderError;
use crate::store::StoreError;

/// Every way `initialize` or `refresh` can fail.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The local credential file is damaged. Never repaired automatically.
    #[error("credential file {path} is corrupt: {reason}")]
    CorruptCredential { path: PathBuf, reason: String },

    /// The remote no longer accepts the stored identity.
    #[error("session is no longer valid: {message}")]
    SessionInvalid { message: String },

    /// The remote refused to register a device for the secret key.
    #[error("identity registration failed: {message}")]
    Registration { message: String },

    /// The remote refused to hand out a disposable identity.
    #[error("could not obtain a sandbox identity: {message}")]
    Provisioning { message: String },

    /// The secret key needed to register a production identity is not set.
    #[error("environment variable {var} is not set; it must hold your API key")]
    MissingSecretKey { var: String },

    /// Any other remote failure while validating a session.
    #[error(transparent)]
    Remote(ProviderError),

    /// Filesystem failure on the credential store.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SessionError {
    /// Classify a failure from `validate_session`.
    pub(crate) fn from_validation(error: ProviderError) -> Self {
        match error {
            ProviderError::Unauthorized { message, .. } => Self::SessionInvalid { message },
            other => Self::Remote(other),
        }
    }

    /// Whether the sandbox recovery path may act on this error.
    #[must_use]
    pub fn is_session_invalid(&self) -> bool {
        matches!(self, Self::SessionInvalid { .. })
    }
}

impl From<StoreError> for SessionError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Corrupt { path, reason } => Self::CorruptCredential { path, reason },
            StoreError::Io { path, source } => Self::Io { path, source },
        }
    }
}
