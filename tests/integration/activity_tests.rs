use tempfile::tempdir;
use tinker::environment::EnvironmentType;
use tinker::output::{SessionSummary, TextOutput};
use tinker::provider::ProviderError;
use tinker::session::{fetch_recent_activity, SessionManager, OVERVIEW_ACTIVITY_COUNT};
use tinker::store::CredentialStore;

use super::support::{self, payment, request_inquiry, FakeProvider, ACCOUNT_ID};

fn manager(dir: &std::path::Path, provider: FakeProvider) -> SessionManager<FakeProvider> {
    SessionManager::new(provider, CredentialStore::new(dir), support::settings())
}

#[test]
fn test_overview_lists_one_payment_and_one_request() {
    let dir = tempdir().unwrap();
    let provider = FakeProvider::new()
        .with_payments(vec![
            payment(3, "-2.50", "Lunch"),
            payment(2, "-1.00", "Coffee"),
        ])
        .with_requests(vec![
            request_inquiry(9, "500.0", "ACCEPTED"),
            request_inquiry(8, "10.0", "PENDING"),
        ]);
    let manager = manager(dir.path(), provider);
    let context = manager.initialize(EnvironmentType::Sandbox).unwrap();

    let activity =
        fetch_recent_activity(manager.provider(), &context, OVERVIEW_ACTIVITY_COUNT).unwrap();

    assert_eq!(OVERVIEW_ACTIVITY_COUNT, 1);
    assert_eq!(activity.payments, vec![payment(3, "-2.50", "Lunch")]);
    assert_eq!(activity.requests, vec![request_inquiry(9, "500.0", "ACCEPTED")]);
    assert_eq!(
        *manager.provider().activity_queries.borrow(),
        vec![(ACCOUNT_ID, 1), (ACCOUNT_ID, 1)]
    );

    let summary = SessionSummary::from_context(&context).with_activity(activity);
    let text = TextOutput::new(false).render_overview(&summary);
    assert!(text.contains("-2.50 EUR"));
    assert!(text.contains("Lunch"));
    assert!(!text.contains("Coffee"));
    assert!(text.contains("ACCEPTED"));
}

#[test]
fn test_overview_of_new_account_shows_no_activity() {
    let dir = tempdir().unwrap();
    let manager = manager(dir.path(), FakeProvider::new());
    let context = manager.initialize(EnvironmentType::Sandbox).unwrap();

    let activity =
        fetch_recent_activity(manager.provider(), &context, OVERVIEW_ACTIVITY_COUNT).unwrap();
    assert!(activity.payments.is_empty());
    assert!(activity.requests.is_empty());
}

#[test]
fn test_activity_failure_is_reported() {
    let dir = tempdir().unwrap();
    let provider = FakeProvider::new().with_activity_error(ProviderError::Status {
        status: 500,
        message: "maintenance".into(),
    });
    let manager = manager(dir.path(), provider);
    let context = manager.initialize(EnvironmentType::Sandbox).unwrap();

    let err = fetch_recent_activity(manager.provider(), &context, OVERVIEW_ACTIVITY_COUNT)
        .unwrap_err();
    assert_eq!(
        err,
        ProviderError::Status {
            status: 500,
            message: "maintenance".into()
        }
    );
    // Listing never touches the stored credentials.
    assert!(manager.store().exists("tinker-sandbox.conf"));
}
