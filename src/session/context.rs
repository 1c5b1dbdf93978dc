//! The validated session bundle handed to callers.

use chrono::{DateTime, Utc};

use crate::environment::EnvironmentType;
use crate::identity::Identity;
use crate::model::{MonetaryAccount, SessionToken, UserHolder};
use crate::provider::SessionGrant;
use crate::store::{CredentialRecord, CREDENTIAL_VERSION};

/// A live, validated session.
///
/// Only the [`SessionManager`](super::SessionManager) can build one, and only
/// after the remote has accepted it, so holding a `SessionContext` means the
/// identity and session are usable. It is deliberately not `Clone`.
#[derive(Debug)]
pub struct SessionContext {
    environment: EnvironmentType,
    identity: Identity,
    session: SessionToken,
    user: UserHolder,
    primary_account: MonetaryAccount,
    established_at: DateTime<Utc>,
}

impl SessionContext {
    pub(crate) fn new(record: CredentialRecord, grant: SessionGrant) -> Self {
        Self {
            environment: record.environment,
            identity: record.identity,
            session: grant.session,
            user: grant.user,
            primary_account: grant.primary_account,
            established_at: record.created_at,
        }
    }

    pub(crate) fn apply(&mut self, grant: SessionGrant) {
        self.session = grant.session;
        self.user = grant.user;
        self.primary_account = grant.primary_account;
    }

    /// The record that persists this context.
    pub(crate) fn to_record(&self) -> CredentialRecord {
        CredentialRecord {
            version: CREDENTIAL_VERSION,
            environment: self.environment,
            identity: self.identity.clone(),
            session: Some(self.session.clone()),
            created_at: self.established_at,
            updated_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn environment(&self) -> EnvironmentType {
        self.environment
    }

    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    #[must_use]
    pub fn session(&self) -> &SessionToken {
        &self.session
    }

    #[must_use]
    pub fn user(&self) -> &UserHolder {
        &self.user
    }

    #[must_use]
    pub fn primary_account(&self) -> &MonetaryAccount {
        &self.primary_account
    }

    /// When the underlying identity was first persisted.
    #[must_use]
    pub fn established_at(&self) -> DateTime<Utc> {
        self.established_at
    }
}
