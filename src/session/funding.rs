//! Sandbox funding assist.
//!
//! A fresh sandbox user starts with an empty account, which makes the demo
//! commands uninteresting. When the primary account balance is zero or below,
//! one request for money is sent to a fixed sandbox counterparty, followed by
//! a short wait for the funds to settle. Nothing here is allowed to fail the
//! session: errors are logged and the caller carries on.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::model::{Amount, FundingRequest, Pointer};
use crate::provider::RemoteProvider;
use crate::session::SessionContext;

const SETTLE_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Funding assist configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FundingSettings {
    /// Master switch.
    pub enabled: bool,
    /// Amount requested, as a decimal string.
    pub amount: String,
    /// ISO 4217 currency of `amount`.
    pub currency: String,
    /// Email alias of the counterparty asked for money.
    pub recipient: String,
    /// Description attached to the request.
    pub description: String,
    /// How long to wait for the funds to settle, in milliseconds.
    pub settle_delay_ms: u64,
}

impl Default for FundingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            amount: "500.0".to_string(),
            currency: "EUR".to_string(),
            recipient: "sugardaddy@bunq.com".to_string(),
            description: "Requesting some spending money.".to_string(),
            settle_delay_ms: 1000,
        }
    }
}

impl FundingSettings {
    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    fn request(&self) -> FundingRequest {
        FundingRequest {
            amount_inquired: Amount::new(&self.amount, &self.currency),
            counterparty_alias: Pointer::email(&self.recipient),
            description: self.description.clone(),
            allow_bunqme: false,
        }
    }
}

/// What the funding assist did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FundingOutcome {
    /// Disabled, or the balance is positive or unreadable.
    Skipped,
    /// A request was enqueued; `settled` is false if the wait was interrupted.
    Requested { request_id: u64, settled: bool },
    /// The request could not be enqueued.
    Failed,
}

/// Whether a balance calls for funding: true at or below zero.
#[must_use]
pub fn needs_funding(balance: &Amount) -> bool {
    match balance.as_f64() {
        Some(value) => value <= 0.0,
        None => {
            log::warn!("Could not parse account balance '{}', skipping funding", balance);
            false
        }
    }
}

/// Request spending money for the context's primary account if it is empty.
pub fn request_spending_money_if_needed<P: RemoteProvider + ?Sized>(
    provider: &P,
    context: &SessionContext,
    settings: &FundingSettings,
    interrupt: Option<&AtomicBool>,
) -> FundingOutcome {
    let account = context.primary_account();
    if !settings.enabled || !needs_funding(&account.balance) {
        return FundingOutcome::Skipped;
    }

    log::info!(
        "Primary account balance is {}, requesting {} {} from {}",
        account.balance,
        settings.amount,
        settings.currency,
        settings.recipient
    );

    match provider.request_funding(context.session(), account.id, &settings.request()) {
        Ok(request_id) => {
            let settled = wait_for_settlement(settings.settle_delay(), interrupt);
            FundingOutcome::Requested {
                request_id,
                settled,
            }
        }
        Err(e) => {
            log::warn!("Funding request failed, continuing without it: {}", e);
            FundingOutcome::Failed
        }
    }
}

/// Sleep for `delay`, returning early if `interrupt` is raised.
///
/// Returns `true` when the full delay elapsed.
pub fn wait_for_settlement(delay: Duration, interrupt: Option<&AtomicBool>) -> bool {
    let deadline = Instant::now() + delay;
    loop {
        if interrupt.is_some_and(|flag| flag.load(Ordering::SeqCst)) {
            log::info!("Interrupted while waiting for funds to settle");
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep(SETTLE_POLL_INTERVAL.min(deadline - now));
    }
}
