//! Monetary accounts and money amounts.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::alias::{AliasHolder, Pointer, PointerKind};

/// Status the remote reports for usable accounts.
pub const ACCOUNT_STATUS_ACTIVE: &str = "ACTIVE";

/// An amount of money as the remote transmits it: a decimal string plus an
/// ISO 4217 currency code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    pub value: String,
    pub currency: String,
}

impl Amount {
    pub fn new(value: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            currency: currency.into(),
        }
    }

    /// Numeric value, or `None` when the remote sent something unparsable.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        self.value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.currency)
    }
}

/// A bank account owned by the session's user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonetaryAccount {
    pub id: u64,
    pub description: String,
    pub status: String,
    pub balance: Amount,
    #[serde(default)]
    pub alias: Vec<Pointer>,
}

impl MonetaryAccount {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == ACCOUNT_STATUS_ACTIVE
    }

    /// The account's IBAN alias, if it has one.
    #[must_use]
    pub fn iban(&self) -> Option<&Pointer> {
        self.alias_of_kind(PointerKind::Iban)
    }
}

impl AliasHolder for MonetaryAccount {
    fn aliases(&self) -> &[Pointer] {
        &self.alias
    }
}

/// A request for money sent to a counterparty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FundingRequest {
    pub amount_inquired: Amount,
    pub counterparty_alias: Pointer,
    pub description: String,
    pub allow_bunqme: bool,
}
