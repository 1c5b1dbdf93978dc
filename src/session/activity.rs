//! Recent account activity shown by `overview`.

use serde::Serialize;

use crate::model::{Payment, RequestInquiry};
use crate::provider::{ProviderError, RemoteProvider};
use crate::session::SessionContext;

/// How many payments and requests `overview` lists.
pub const OVERVIEW_ACTIVITY_COUNT: u32 = 1;

/// The latest payments and requests on the primary account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccountActivity {
    pub payments: Vec<Payment>,
    pub requests: Vec<RequestInquiry>,
}

/// List up to `count` recent payments and requests on the context's primary
/// account.
///
/// # Errors
///
/// Returns the first listing failure.
pub fn fetch_recent_activity<P: RemoteProvider + ?Sized>(
    provider: &P,
    context: &SessionContext,
    count: u32,
) -> Result<AccountActivity, ProviderError> {
    let account_id = context.primary_account().id;
    let mut payments = provider.list_payments(context.session(), account_id, count)?;
    let mut requests = provider.list_request_inquiries(context.session(), account_id, count)?;

    // The remote may ignore the count.
    payments.truncate(count as usize);
    requests.truncate(count as usize);

    log::debug!(
        "Account {} has {} recent payment(s) and {} request(s)",
        account_id,
        payments.len(),
        requests.len()
    );
    Ok(AccountActivity { payments, requests })
}
