//! URL notification filters.

use serde::{Deserialize, Serialize};

/// Category for account mutations (payments in and out).
pub const CATEGORY_MUTATION: &str = "MUTATION";

/// One callback registration: events of `category` are posted to
/// `notification_target`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationFilter {
    pub category: String,
    pub notification_target: String,
}

impl NotificationFilter {
    pub fn new(category: impl Into<String>, notification_target: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            notification_target: notification_target.into(),
        }
    }

    #[must_use]
    pub fn mutation(notification_target: impl Into<String>) -> Self {
        Self::new(CATEGORY_MUTATION, notification_target)
    }

    #[must_use]
    pub fn targets(&self, url: &str) -> bool {
        self.notification_target == url
    }
}
