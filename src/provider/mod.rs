//! Remote session provider.
//!
//! The session lifecycle depends on a handful of remote calls. They are
//! abstracted behind [`RemoteProvider`] so the manager can be driven by the
//! real HTTP client or by a scripted provider in tests.
//!
//! ```text
//! RemoteProvider (trait)
//!     |
//!     +-- HttpProvider (blocking reqwest client)
//!     |
//!     +-- scripted providers in tests
//! ```

pub mod http;

pub use http::HttpProvider;

use secrecy::SecretString;
use thiserror::Error;

use crate::identity::Identity;
use crate::model::{
    FundingRequest, MonetaryAccount, NotificationFilter, Payment, RequestInquiry, SessionToken,
    UserHolder,
};

/// Errors reported by a remote provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The remote rejected the credentials (HTTP 401 or 403).
    #[error("remote rejected credentials (HTTP {status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// Any other non-success HTTP status.
    #[error("remote returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response could not be understood.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ProviderError {
    /// Classify a non-success status and its body.
    #[must_use]
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => Self::Unauthorized { status, message },
            _ => Self::Status { status, message },
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

/// Everything the remote reports about a live session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionGrant {
    pub session: SessionToken,
    pub user: UserHolder,
    pub primary_account: MonetaryAccount,
}

/// Remote calls the session lifecycle depends on.
pub trait RemoteProvider {
    /// Register a new device identity for `api_key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is rejected or the remote fails.
    fn register_identity(
        &self,
        api_key: &SecretString,
        description: &str,
        permitted_ips: &[String],
    ) -> Result<Identity, ProviderError>;

    /// Obtain a throwaway API key without authentication. Sandbox only.
    ///
    /// # Errors
    ///
    /// Returns an error carrying the response body on any non-success status.
    fn provision_disposable_key(&self) -> Result<SecretString, ProviderError>;

    /// Confirm the identity can hold a live session.
    ///
    /// `current` is a stored token the caller believes is still fresh; the
    /// provider reuses it when the remote accepts it and opens a new session
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Unauthorized`] when the identity is no longer
    /// usable.
    fn validate_session(
        &self,
        identity: &Identity,
        current: Option<&SessionToken>,
    ) -> Result<SessionGrant, ProviderError>;

    /// Ask a counterparty for money on behalf of the session's user.
    /// Returns the remote id of the created request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be enqueued.
    fn request_funding(
        &self,
        session: &SessionToken,
        account_id: u64,
        request: &FundingRequest,
    ) -> Result<u64, ProviderError>;

    /// The most recent `count` payments on an account, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing fails.
    fn list_payments(
        &self,
        session: &SessionToken,
        account_id: u64,
        count: u32,
    ) -> Result<Vec<Payment>, ProviderError>;

    /// The most recent `count` requests sent from an account, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing fails.
    fn list_request_inquiries(
        &self,
        session: &SessionToken,
        account_id: u64,
        count: u32,
    ) -> Result<Vec<RequestInquiry>, ProviderError>;

    /// Callback URL filters registered for the session's user.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing fails.
    fn list_notification_filters(
        &self,
        session: &SessionToken,
    ) -> Result<Vec<NotificationFilter>, ProviderError>;

    /// Replace the user's callback URL filters with `filters`.
    /// Returns the filters the remote now holds.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote refuses the list.
    fn replace_notification_filters(
        &self,
        session: &SessionToken,
        filters: &[NotificationFilter],
    ) -> Result<Vec<NotificationFilter>, ProviderError>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}
