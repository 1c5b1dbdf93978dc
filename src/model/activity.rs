//! Payments and requests listed for an account.

use serde::{Deserialize, Serialize};

use super::account::Amount;

/// The other side of a payment or request, as the remote labels it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterpartyLabel {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub iban: Option<String>,
}

impl CounterpartyLabel {
    /// Best human-readable name: display name, then IBAN.
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or(self.iban.as_deref())
            .unwrap_or("unknown")
    }
}

/// A booked payment on a monetary account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: u64,
    pub amount: Amount,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub counterparty_alias: Option<CounterpartyLabel>,
}

/// A request for money sent from a monetary account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestInquiry {
    pub id: u64,
    pub amount_inquired: Amount,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub counterparty_alias: Option<CounterpartyLabel>,
}
