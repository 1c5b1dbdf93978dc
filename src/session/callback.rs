//! Registering a callback URL for account mutations.
//!
//! The remote holds one list of URL filters per user and replaces it wholesale
//! on every write. Adding a callback keeps the filters already pointing at the
//! same URL, drops the rest and appends a `MUTATION` filter for the URL unless
//! one exists.

use thiserror::Error;

use crate::model::{NotificationFilter, CATEGORY_MUTATION};
use crate::provider::{ProviderError, RemoteProvider};
use crate::session::SessionContext;

/// Failures of [`add_callback_url`].
#[derive(Debug, Error)]
pub enum CallbackError {
    /// The URL is not an absolute `https` URL.
    #[error("invalid callback URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Listing or replacing the filters failed.
    #[error(transparent)]
    Remote(#[from] ProviderError),
}

/// Check that `url` is an absolute `https` URL with a host.
///
/// # Errors
///
/// Returns [`CallbackError::InvalidUrl`] otherwise.
pub fn validate_callback_url(url: &str) -> Result<(), CallbackError> {
    let invalid = |reason: String| CallbackError::InvalidUrl {
        url: url.to_string(),
        reason,
    };
    let parsed = reqwest::Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    if parsed.scheme() != "https" {
        return Err(invalid(format!("scheme must be https, not {}", parsed.scheme())));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host".into()));
    }
    Ok(())
}

/// The filter list to post when adding `url` to `existing`.
#[must_use]
pub fn filters_with_callback(existing: &[NotificationFilter], url: &str) -> Vec<NotificationFilter> {
    let mut filters: Vec<NotificationFilter> = existing
        .iter()
        .filter(|filter| filter.targets(url))
        .cloned()
        .collect();
    if !filters.iter().any(|filter| filter.category == CATEGORY_MUTATION) {
        filters.push(NotificationFilter::mutation(url));
    }
    filters
}

/// Register `url` to receive mutation callbacks for the session's user.
/// Returns the filters the remote holds afterwards.
///
/// # Errors
///
/// Returns an error if the URL is invalid or a remote call fails.
pub fn add_callback_url<P: RemoteProvider + ?Sized>(
    provider: &P,
    context: &SessionContext,
    url: &str,
) -> Result<Vec<NotificationFilter>, CallbackError> {
    validate_callback_url(url)?;

    let existing = provider.list_notification_filters(context.session())?;
    let filters = filters_with_callback(&existing, url);
    let dropped = existing.iter().filter(|filter| !filter.targets(url)).count();
    if dropped > 0 {
        log::info!("Dropping {} filter(s) registered for other URLs", dropped);
    }

    let stored = provider.replace_notification_filters(context.session(), &filters)?;
    log::info!("Callback URL {} registered for user {}", url, context.user().id());
    Ok(stored)
}
