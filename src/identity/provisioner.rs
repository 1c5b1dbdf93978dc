//! Obtaining fresh identities from the remote.

use secrecy::SecretString;

use super::Identity;
use crate::provider::RemoteProvider;
use crate::session::SessionError;

/// Registers new device identities through a [`RemoteProvider`].
pub struct IdentityProvisioner<'a, P: RemoteProvider + ?Sized> {
    provider: &'a P,
    device_description: &'a str,
    permitted_ips: &'a [String],
}

impl<'a, P: RemoteProvider + ?Sized> IdentityProvisioner<'a, P> {
    /// `device_description` labels disposable identities; `permitted_ips`
    /// is the allow-list every new identity is registered with.
    pub fn new(provider: &'a P, device_description: &'a str, permitted_ips: &'a [String]) -> Self {
        Self {
            provider,
            device_description,
            permitted_ips,
        }
    }

    /// Register a device for a long-lived secret key.
    ///
    /// A rejected key is a configuration problem and is not retried.
    ///
    /// # Errors
    ///
    /// [`SessionError::Registration`] with the remote's diagnostic text.
    pub fn register_identity(
        &self,
        secret_key: &SecretString,
        host_label: &str,
    ) -> Result<Identity, SessionError> {
        log::info!("Registering a new device identity '{}'", host_label);
        let identity = self
            .provider
            .register_identity(secret_key, host_label, self.permitted_ips)
            .map_err(|e| SessionError::Registration {
                message: e.to_string(),
            })?;
        log::debug!("Registered device {}", identity.device_id);
        Ok(identity)
    }

    /// Request a throwaway key and register a device for it.
    ///
    /// # Errors
    ///
    /// [`SessionError::Provisioning`] carrying the response body when the key
    /// request fails, [`SessionError::Registration`] when the new key cannot
    /// be registered.
    pub fn request_disposable_identity(&self) -> Result<Identity, SessionError> {
        log::info!("Requesting a disposable sandbox identity");
        let api_key = self
            .provider
            .provision_disposable_key()
            .map_err(|e| SessionError::Provisioning {
                message: e.to_string(),
            })?;
        self.register_identity(&api_key, self.device_description)
    }
}
