//! JSON output for session summaries.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "environment": "SANDBOX",
//!   "device_id": 1234,
//!   "device_description": "tinker rust",
//!   "session_expires_at": "2026-10-25T12:00:00Z",
//!   "user": {
//!     "id": 42,
//!     "kind": "UserPerson",
//!     "display_name": "Ada",
//!     "aliases": [{"type": "EMAIL", "value": "ada@example.com"}]
//!   },
//!   "primary_account": {
//!     "id": 7,
//!     "description": "Main",
//!     "balance": {"value": "500.00", "currency": "EUR"},
//!     "iban": "NL12BUNQ0123456789"
//!   },
//!   "recent_activity": {
//!     "payments": [{"id": 11, "amount": {"value": "-4.20", "currency": "EUR"},
//!                   "description": "Coffee", "counterparty_alias": {"display_name": "Cafe", "iban": null}}],
//!     "requests": []
//!   }
//! }
//! ```
//!
//! `recent_activity` is only present in `overview` output.

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::environment::EnvironmentType;
use crate::model::{AliasHolder, Amount, Pointer};
use crate::session::{AccountActivity, SessionContext};

/// The user section of a summary.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: u64,
    pub kind: &'static str,
    pub display_name: String,
    pub aliases: Vec<Pointer>,
}

/// The primary account section of a summary.
#[derive(Debug, Clone, Serialize)]
pub struct AccountSummary {
    pub id: u64,
    pub description: String,
    pub balance: Amount,
    pub iban: Option<String>,
}

/// Secret-free snapshot of a validated session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub environment: EnvironmentType,
    pub device_id: u64,
    pub device_description: String,
    pub session_expires_at: DateTime<Utc>,
    pub user: UserSummary,
    pub primary_account: AccountSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_activity: Option<AccountActivity>,
}

impl SessionSummary {
    #[must_use]
    pub fn from_context(context: &SessionContext) -> Self {
        let user = context.user();
        let account = context.primary_account();
        Self {
            environment: context.environment(),
            device_id: context.identity().device_id,
            device_description: context.identity().description.clone(),
            session_expires_at: context.session().expires_at,
            user: UserSummary {
                id: user.id(),
                kind: user.kind(),
                display_name: user.display_name().to_string(),
                aliases: user.aliases().to_vec(),
            },
            primary_account: AccountSummary {
                id: account.id,
                description: account.description.clone(),
                balance: account.balance.clone(),
                iban: account.iban().map(|pointer| pointer.value.clone()),
            },
            recent_activity: None,
        }
    }

    #[must_use]
    pub fn with_activity(mut self, activity: AccountActivity) -> Self {
        self.recent_activity = Some(activity);
        self
    }
}

/// JSON writer for a [`SessionSummary`].
#[derive(Debug, Clone)]
pub struct JsonOutput<'a> {
    summary: &'a SessionSummary,
}

impl<'a> JsonOutput<'a> {
    #[must_use]
    pub fn new(summary: &'a SessionSummary) -> Self {
        Self { summary }
    }

    /// Serialize to a pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self.summary)
    }

    /// Write pretty-printed JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(&mut writer, self.summary)?;
        writeln!(writer)?;
        Ok(())
    }
}
