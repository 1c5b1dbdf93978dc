//! Human-readable output.

use std::io::Write;
use std::path::Path;

use yansi::{Paint, Style};

use super::json::SessionSummary;
use crate::identity::mask;
use crate::model::{CounterpartyLabel, NotificationFilter};
use crate::store::CredentialRecord;

const HEADING: Style = Style::new().bold();
const LABEL: Style = Style::new().dim();
const GOOD: Style = Style::new().green();
const WARN: Style = Style::new().yellow();

/// Text renderer for session summaries and stored records.
#[derive(Debug, Clone, Copy)]
pub struct TextOutput {
    colored: bool,
}

impl TextOutput {
    #[must_use]
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if self.colored {
            text.paint(style).to_string()
        } else {
            text.to_string()
        }
    }

    fn field(&self, out: &mut String, label: &str, value: &str) {
        let label = format!("{:<12}", label);
        out.push_str(&format!("  {} {}\n", self.paint(&label, LABEL), value));
    }

    /// Short confirmation printed after `login`.
    #[must_use]
    pub fn render_login(&self, summary: &SessionSummary) -> String {
        format!(
            "{} {} session for {} ({}, user {})\n  {} {}\n",
            self.paint("Active", GOOD),
            summary.environment,
            self.paint(&summary.user.display_name, HEADING),
            summary.user.kind,
            summary.user.id,
            self.paint(&format!("{:<12}", "expires"), LABEL),
            summary.session_expires_at.to_rfc3339(),
        )
    }

    fn counterparty(label: Option<&CounterpartyLabel>) -> &str {
        label.map_or("unknown", CounterpartyLabel::label)
    }

    /// User, aliases, primary account and, when fetched, its latest activity.
    #[must_use]
    pub fn render_overview(&self, summary: &SessionSummary) -> String {
        let mut out = String::new();

        out.push_str(&self.paint("User", HEADING));
        out.push('\n');
        self.field(&mut out, "name", &summary.user.display_name);
        self.field(&mut out, "id", &summary.user.id.to_string());
        self.field(&mut out, "kind", summary.user.kind);
        if summary.user.aliases.is_empty() {
            self.field(&mut out, "aliases", "none");
        }
        for alias in &summary.user.aliases {
            self.field(&mut out, &alias.kind.to_string(), &alias.value);
        }

        out.push('\n');
        out.push_str(&self.paint("Primary account", HEADING));
        out.push('\n');
        let account = &summary.primary_account;
        self.field(&mut out, "description", &account.description);
        self.field(&mut out, "id", &account.id.to_string());
        self.field(
            &mut out,
            "iban",
            account.iban.as_deref().unwrap_or("unknown"),
        );
        let balance = account.balance.to_string();
        let style = match account.balance.as_f64() {
            Some(value) if value > 0.0 => GOOD,
            _ => WARN,
        };
        self.field(&mut out, "balance", &self.paint(&balance, style));

        if let Some(activity) = &summary.recent_activity {
            out.push('\n');
            out.push_str(&self.paint("Recent payments", HEADING));
            out.push('\n');
            if activity.payments.is_empty() {
                self.field(&mut out, "payments", "none");
            }
            for payment in &activity.payments {
                let line = format!(
                    "{} {}",
                    Self::counterparty(payment.counterparty_alias.as_ref()),
                    payment.description
                );
                self.field(&mut out, &payment.amount.to_string(), line.trim_end());
            }

            out.push('\n');
            out.push_str(&self.paint("Recent requests", HEADING));
            out.push('\n');
            if activity.requests.is_empty() {
                self.field(&mut out, "requests", "none");
            }
            for request in &activity.requests {
                let line = format!(
                    "{} {} {}",
                    request.status,
                    Self::counterparty(request.counterparty_alias.as_ref()),
                    request.description
                );
                self.field(&mut out, &request.amount_inquired.to_string(), line.trim_end());
            }
        }

        out.push('\n');
        out.push_str(&self.paint("Session", HEADING));
        out.push('\n');
        self.field(&mut out, "environment", summary.environment.as_str());
        self.field(&mut out, "device", &summary.device_id.to_string());
        self.field(&mut out, "expires", &summary.session_expires_at.to_rfc3339());

        out
    }

    /// Confirmation printed after `add-callback-url`.
    #[must_use]
    pub fn render_callback(&self, url: &str, filters: &[NotificationFilter]) -> String {
        let mut out = format!("{} {}\n", self.paint("Callback URL added", GOOD), url);
        for filter in filters {
            self.field(&mut out, &filter.category, &filter.notification_target);
        }
        out
    }

    /// Stored credential record with secrets masked.
    #[must_use]
    pub fn render_record(&self, record: &CredentialRecord, path: &Path) -> String {
        let mut out = String::new();
        out.push_str(&self.paint(&format!("{} credentials", record.environment), HEADING));
        out.push('\n');
        self.field(&mut out, "file", &path.display().to_string());
        self.field(&mut out, "version", &record.version.to_string());
        self.field(&mut out, "api key", &mask(&record.identity.api_key));
        self.field(&mut out, "device", &record.identity.device_id.to_string());
        self.field(&mut out, "description", &record.identity.description);
        self.field(&mut out, "ips", &record.identity.permitted_ips.join(", "));
        self.field(&mut out, "created", &record.created_at.to_rfc3339());
        self.field(&mut out, "updated", &record.updated_at.to_rfc3339());
        match &record.session {
            Some(session) => {
                self.field(&mut out, "session", &mask(&session.token));
                self.field(&mut out, "user", &session.user_id.to_string());
                self.field(&mut out, "expires", &session.expires_at.to_rfc3339());
            }
            None => self.field(&mut out, "session", &self.paint("none", WARN)),
        }
        out
    }

    /// Write rendered text to `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, mut writer: W, text: &str) -> std::io::Result<()> {
        writer.write_all(text.as_bytes())?;
        writer.flush()
    }
}
