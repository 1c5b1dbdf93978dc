//! Session lifecycle orchestration.
//!
//! Per `initialize` call the manager walks this state machine:
//!
//! ```text
//! NoCredential -> IdentityObtained -> SessionValidated -> Persisted
//!       ^                                   |
//!       +------ InvalidationRecovery -------+   (sandbox policy, at most once)
//! ```
//!
//! Any other exit is a terminal failure.

use chrono::{Duration, Utc};
use secrecy::SecretString;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use super::context::SessionContext;
use super::error::SessionError;
use super::funding::{self, FundingOutcome, FundingSettings};
use crate::environment::{EnvironmentPolicy, EnvironmentType};
use crate::identity::{Identity, IdentityProvisioner, PERMIT_ANY_IP};
use crate::model::SessionToken;
use crate::provider::RemoteProvider;
use crate::store::{CredentialRecord, CredentialStore};

/// Knobs the manager needs besides its provider and store.
#[derive(Debug)]
pub struct ManagerSettings {
    /// Long-lived secret for production registration, if configured.
    pub secret_key: Option<SecretString>,
    /// Name of the variable `secret_key` is read from, for error messages.
    pub secret_key_var: String,
    /// Device description for production identities (usually the host name).
    pub host_label: String,
    /// Device description for disposable sandbox identities.
    pub device_description: String,
    /// Allow-list registered with every new identity.
    pub permitted_ips: Vec<String>,
    /// Stored sessions expiring within this margin are not reused.
    pub refresh_margin: Duration,
    /// Sandbox funding assist.
    pub funding: FundingSettings,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        Self {
            secret_key: None,
            secret_key_var: "TINKER_API_KEY".to_string(),
            host_label: "tinker".to_string(),
            device_description: "tinker rust".to_string(),
            permitted_ips: vec![PERMIT_ANY_IP.to_string()],
            refresh_margin: Duration::seconds(30),
            funding: FundingSettings::default(),
        }
    }
}

/// Owns the session lifecycle for one process.
pub struct SessionManager<P: RemoteProvider> {
    provider: P,
    store: CredentialStore,
    settings: ManagerSettings,
    interrupt: Option<Arc<AtomicBool>>,
}

impl<P: RemoteProvider> SessionManager<P> {
    pub fn new(provider: P, store: CredentialStore, settings: ManagerSettings) -> Self {
        Self {
            provider,
            store,
            settings,
            interrupt: None,
        }
    }

    /// Let a shutdown flag cut the funding settle wait short.
    #[must_use]
    pub fn with_interrupt_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = Some(flag);
        self
    }

    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    #[must_use]
    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Load or create the identity for `environment`, make sure its session
    /// is live, persist it and hand back the validated context.
    ///
    /// Under a policy that permits regeneration, a rejected identity is
    /// deleted and recreated once; a second rejection is returned as is.
    ///
    /// # Errors
    ///
    /// Any [`SessionError`]; no partial context is ever returned.
    pub fn initialize(&self, environment: EnvironmentType) -> Result<SessionContext, SessionError> {
        let policy = environment.policy();
        let mut reset_attempted = false;

        let context = loop {
            let record = self.load_or_create(environment, policy)?;

            match self.ensure_session_active(record) {
                Ok(context) => break context,
                Err(e)
                    if e.is_session_invalid()
                        && policy.auto_regenerate_on_invalidation
                        && !reset_attempted =>
                {
                    log::warn!(
                        "Stored {} identity was rejected ({}), regenerating it",
                        environment,
                        e
                    );
                    self.store.delete(policy.file_name)?;
                    reset_attempted = true;
                }
                Err(e) => return Err(e),
            }
        };

        self.store.save(policy.file_name, &context.to_record())?;
        log::info!(
            "Session active for {} user {} ({})",
            environment,
            context.user().id(),
            context.user().kind()
        );

        if policy.allow_disposable_identity {
            let outcome = funding::request_spending_money_if_needed(
                &self.provider,
                &context,
                &self.settings.funding,
                self.interrupt.as_deref(),
            );
            if let FundingOutcome::Requested { request_id, .. } = outcome {
                log::debug!("Funding request {} enqueued", request_id);
            }
        }

        Ok(context)
    }

    /// Re-validate the session and overwrite the credential file.
    ///
    /// Call after a unit of work to keep the stored session current. Never
    /// regenerates the identity.
    ///
    /// # Errors
    ///
    /// [`SessionError::SessionInvalid`] if the remote rejects the identity,
    /// or any store failure.
    pub fn refresh(&self, context: &mut SessionContext) -> Result<(), SessionError> {
        let current = self.reusable(context.session());
        let grant = self
            .provider
            .validate_session(context.identity(), current)
            .map_err(SessionError::from_validation)?;
        context.apply(grant);

        let policy = context.environment().policy();
        self.store.save(policy.file_name, &context.to_record())?;
        log::debug!("Refreshed {} session", context.environment());
        Ok(())
    }

    fn load_or_create(
        &self,
        environment: EnvironmentType,
        policy: &EnvironmentPolicy,
    ) -> Result<CredentialRecord, SessionError> {
        if self.store.exists(policy.file_name) {
            let record = self.store.load(policy.file_name)?;
            if record.environment != environment {
                return Err(SessionError::CorruptCredential {
                    path: self.store.path_for(policy.file_name),
                    reason: format!(
                        "file holds a {} identity, expected {}",
                        record.environment, environment
                    ),
                });
            }
            log::debug!("Restored {} identity from {}", environment, policy.file_name);
            return Ok(record);
        }

        log::info!(
            "No {} credentials found, creating new ones via {}",
            environment,
            self.provider.name()
        );
        let identity = self.obtain_identity(policy)?;
        let record = CredentialRecord::new(environment, identity);
        self.store.save(policy.file_name, &record)?;
        Ok(record)
    }

    fn obtain_identity(&self, policy: &EnvironmentPolicy) -> Result<Identity, SessionError> {
        let provisioner = IdentityProvisioner::new(
            &self.provider,
            &self.settings.device_description,
            &self.settings.permitted_ips,
        );

        if policy.allow_disposable_identity {
            return provisioner.request_disposable_identity();
        }

        let secret_key = self
            .settings
            .secret_key
            .as_ref()
            .ok_or_else(|| SessionError::MissingSecretKey {
                var: self.settings.secret_key_var.clone(),
            })?;
        provisioner.register_identity(secret_key, &self.settings.host_label)
    }

    fn ensure_session_active(&self, record: CredentialRecord) -> Result<SessionContext, SessionError> {
        let current = record.session.as_ref().and_then(|s| self.reusable(s));
        let grant = self
            .provider
            .validate_session(&record.identity, current)
            .map_err(SessionError::from_validation)?;
        Ok(SessionContext::new(record, grant))
    }

    fn reusable<'a>(&self, session: &'a SessionToken) -> Option<&'a SessionToken> {
        if session.expires_within(Utc::now(), self.settings.refresh_margin) {
            log::debug!("Stored session expires soon, requesting a new one");
            None
        } else {
            Some(session)
        }
    }
}
