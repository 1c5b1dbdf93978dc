use chrono::{Duration, Utc};
use std::fs;
use tempfile::tempdir;
use tinker::environment::EnvironmentType;
use tinker::identity::Identity;
use tinker::model::SessionToken;
use tinker::provider::ProviderError;
use tinker::session::{SessionError, SessionManager};
use tinker::store::{CredentialRecord, CredentialStore};

use super::support::{self, FakeProvider, USER_ID};

const SANDBOX_FILE: &str = "tinker-sandbox.conf";
const PRODUCTION_FILE: &str = "tinker-production.conf";

fn manager(dir: &std::path::Path, provider: FakeProvider) -> SessionManager<FakeProvider> {
    SessionManager::new(provider, CredentialStore::new(dir), support::settings())
}

fn production_manager(dir: &std::path::Path, provider: FakeProvider) -> SessionManager<FakeProvider> {
    SessionManager::new(
        provider,
        CredentialStore::new(dir),
        support::settings_with_key("production-secret-key-0001"),
    )
}

fn stored_identity(api_key: &str) -> Identity {
    Identity {
        api_key: api_key.into(),
        description: "stored".into(),
        permitted_ips: vec!["*".into()],
        installation_token: "stored-installation-token".into(),
        device_id: 77,
        created_at: Utc::now(),
    }
}

#[test]
fn test_fresh_sandbox_provisions_and_persists() {
    let dir = tempdir().unwrap();
    let manager = manager(dir.path(), FakeProvider::new());

    let context = manager.initialize(EnvironmentType::Sandbox).unwrap();

    let provider = manager.provider();
    assert_eq!(provider.provision_calls.get(), 1);
    assert_eq!(provider.register_calls.get(), 1);
    assert_eq!(provider.validate_calls.get(), 1);
    assert_eq!(context.user().id(), USER_ID);
    assert_eq!(context.environment(), EnvironmentType::Sandbox);
    assert_eq!(context.identity().description, "tinker rust");

    let record = manager.store().load(SANDBOX_FILE).unwrap();
    assert_eq!(record.environment, EnvironmentType::Sandbox);
    assert_eq!(&record.identity, context.identity());
    assert_eq!(record.session.as_ref(), Some(context.session()));
}

#[test]
fn test_existing_credentials_skip_provisioning() {
    let dir = tempdir().unwrap();
    let first = manager(dir.path(), FakeProvider::new());
    let original = first.initialize(EnvironmentType::Sandbox).unwrap();

    let second = manager(dir.path(), FakeProvider::new());
    let restored = second.initialize(EnvironmentType::Sandbox).unwrap();

    let provider = second.provider();
    assert_eq!(provider.provision_calls.get(), 0);
    assert_eq!(provider.register_calls.get(), 0);
    assert_eq!(restored.identity(), original.identity());
    // The stored session was still fresh, so it was offered for reuse
    assert_eq!(
        provider.offered_sessions.borrow().as_slice(),
        &[Some(original.session().token.clone())]
    );
    assert_eq!(restored.session(), original.session());
}

#[test]
fn test_sandbox_invalidation_regenerates_once() {
    let dir = tempdir().unwrap();
    let original = manager(dir.path(), FakeProvider::new())
        .initialize(EnvironmentType::Sandbox)
        .unwrap();

    let provider = FakeProvider::new();
    provider.reject_next_validation();
    let manager = manager(dir.path(), provider);

    let context = manager.initialize(EnvironmentType::Sandbox).unwrap();

    let provider = manager.provider();
    assert_eq!(provider.validate_calls.get(), 2);
    assert_eq!(provider.provision_calls.get(), 1);
    assert_ne!(context.identity().api_key, original.identity().api_key);

    let keys = provider.validated_keys.borrow();
    assert_eq!(keys[0], original.identity().api_key);
    assert_eq!(keys[1], context.identity().api_key);

    let record = manager.store().load(SANDBOX_FILE).unwrap();
    assert_eq!(&record.identity, context.identity());
}

#[test]
fn test_sandbox_second_invalidation_is_terminal() {
    let dir = tempdir().unwrap();
    manager(dir.path(), FakeProvider::new())
        .initialize(EnvironmentType::Sandbox)
        .unwrap();

    let provider = FakeProvider::new();
    provider.reject_next_validation();
    provider.reject_next_validation();
    let manager = manager(dir.path(), provider);

    let err = manager.initialize(EnvironmentType::Sandbox).unwrap_err();

    assert!(err.is_session_invalid(), "unexpected error: {:?}", err);
    let provider = manager.provider();
    assert_eq!(provider.validate_calls.get(), 2);
    assert_eq!(provider.provision_calls.get(), 1);
}

#[test]
fn test_production_invalidation_propagates_and_keeps_file() {
    let dir = tempdir().unwrap();
    production_manager(dir.path(), FakeProvider::new())
        .initialize(EnvironmentType::Production)
        .unwrap();
    let path = dir.path().join(PRODUCTION_FILE);
    let before = fs::read(&path).unwrap();

    let provider = FakeProvider::new();
    provider.reject_next_validation();
    let manager = production_manager(dir.path(), provider);

    let err = manager.initialize(EnvironmentType::Production).unwrap_err();

    assert!(matches!(err, SessionError::SessionInvalid { .. }));
    let provider = manager.provider();
    assert_eq!(provider.validate_calls.get(), 1);
    assert_eq!(provider.register_calls.get(), 0);
    assert_eq!(provider.provision_calls.get(), 0);
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn test_production_registers_with_secret_key_and_host_label() {
    let dir = tempdir().unwrap();
    let manager = production_manager(dir.path(), FakeProvider::new());

    let context = manager.initialize(EnvironmentType::Production).unwrap();

    let provider = manager.provider();
    assert_eq!(provider.provision_calls.get(), 0);
    assert_eq!(provider.register_calls.get(), 1);
    assert_eq!(context.identity().api_key, "production-secret-key-0001");
    assert_eq!(context.identity().description, "test-host");
    assert!(dir.path().join(PRODUCTION_FILE).is_file());
    assert!(!dir.path().join(SANDBOX_FILE).exists());
}

#[test]
fn test_production_never_requests_funding() {
    let dir = tempdir().unwrap();
    let manager = production_manager(dir.path(), FakeProvider::new().with_balance("0"));

    manager.initialize(EnvironmentType::Production).unwrap();

    assert!(manager.provider().funding_requests.borrow().is_empty());
}

#[test]
fn test_missing_secret_key_fails_without_writing() {
    let dir = tempdir().unwrap();
    let manager = manager(dir.path(), FakeProvider::new());

    let err = manager.initialize(EnvironmentType::Production).unwrap_err();

    match err {
        SessionError::MissingSecretKey { var } => assert_eq!(var, "TINKER_API_KEY"),
        other => panic!("Expected MissingSecretKey, got {:?}", other),
    }
    assert_eq!(manager.provider().register_calls.get(), 0);
    assert!(!dir.path().join(PRODUCTION_FILE).exists());
}

#[test]
fn test_rejected_secret_key_is_registration_error() {
    let dir = tempdir().unwrap();
    let provider =
        FakeProvider::new().with_register_error(ProviderError::from_status(400, "API key not valid"));
    let manager = production_manager(dir.path(), provider);

    let err = manager.initialize(EnvironmentType::Production).unwrap_err();

    match err {
        SessionError::Registration { message } => assert!(message.contains("API key not valid")),
        other => panic!("Expected Registration, got {:?}", other),
    }
    assert!(!dir.path().join(PRODUCTION_FILE).exists());
}

#[test]
fn test_provisioning_failure_carries_body() {
    let dir = tempdir().unwrap();
    let provider = FakeProvider::new()
        .with_provision_error(ProviderError::from_status(500, "sandbox is down for maintenance"));
    let manager = manager(dir.path(), provider);

    let err = manager.initialize(EnvironmentType::Sandbox).unwrap_err();

    match err {
        SessionError::Provisioning { message } => assert!(message.contains("maintenance")),
        other => panic!("Expected Provisioning, got {:?}", other),
    }
    assert!(!dir.path().join(SANDBOX_FILE).exists());
}

#[test]
fn test_corrupt_file_is_reported_not_deleted() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(SANDBOX_FILE);
    fs::write(&path, "{ this is not a credential file").unwrap();
    let manager = manager(dir.path(), FakeProvider::new());

    let err = manager.initialize(EnvironmentType::Sandbox).unwrap_err();

    assert!(matches!(err, SessionError::CorruptCredential { .. }));
    assert_eq!(manager.provider().provision_calls.get(), 0);
    assert_eq!(manager.provider().validate_calls.get(), 0);
    assert_eq!(fs::read_to_string(&path).unwrap(), "{ this is not a credential file");
}

#[test]
fn test_environment_mismatch_is_corrupt() {
    let dir = tempdir().unwrap();
    let store = CredentialStore::new(dir.path());
    let record = CredentialRecord::new(EnvironmentType::Production, stored_identity("some-key-1234"));
    store.save(SANDBOX_FILE, &record).unwrap();

    let manager = manager(dir.path(), FakeProvider::new());
    let err = manager.initialize(EnvironmentType::Sandbox).unwrap_err();

    match err {
        SessionError::CorruptCredential { reason, .. } => assert!(reason.contains("production")),
        other => panic!("Expected CorruptCredential, got {:?}", other),
    }
    assert!(dir.path().join(SANDBOX_FILE).exists());
}

#[test]
fn test_skeleton_record_is_completed_on_next_run() {
    let dir = tempdir().unwrap();
    let store = CredentialStore::new(dir.path());
    let identity = stored_identity("skeleton-key-5678");
    store
        .save(SANDBOX_FILE, &CredentialRecord::new(EnvironmentType::Sandbox, identity.clone()))
        .unwrap();

    let manager = manager(dir.path(), FakeProvider::new());
    let context = manager.initialize(EnvironmentType::Sandbox).unwrap();

    assert_eq!(context.identity(), &identity);
    assert_eq!(manager.provider().provision_calls.get(), 0);
    assert_eq!(manager.provider().offered_sessions.borrow()[0], None);
    let record = store.load(SANDBOX_FILE).unwrap();
    assert!(record.session.is_some());
}

#[test]
fn test_expiring_session_is_not_offered_for_reuse() {
    let dir = tempdir().unwrap();
    let store = CredentialStore::new(dir.path());
    let record = CredentialRecord::new(EnvironmentType::Sandbox, stored_identity("stale-key-0000"))
        .with_session(SessionToken {
            token: "almost-expired-token".into(),
            user_id: USER_ID,
            expires_at: Utc::now() + Duration::seconds(5),
        });
    store.save(SANDBOX_FILE, &record).unwrap();

    let manager = manager(dir.path(), FakeProvider::new());
    let context = manager.initialize(EnvironmentType::Sandbox).unwrap();

    assert_eq!(manager.provider().offered_sessions.borrow()[0], None);
    assert_ne!(context.session().token, "almost-expired-token");
}

#[test]
fn test_remote_failure_is_not_treated_as_invalidation() {
    let dir = tempdir().unwrap();
    manager(dir.path(), FakeProvider::new())
        .initialize(EnvironmentType::Sandbox)
        .unwrap();

    let provider = FakeProvider::new();
    provider.fail_next_validation(ProviderError::Transport("connection reset".into()));
    let manager = manager(dir.path(), provider);

    let err = manager.initialize(EnvironmentType::Sandbox).unwrap_err();

    assert!(matches!(err, SessionError::Remote(ProviderError::Transport(_))));
    assert_eq!(manager.provider().provision_calls.get(), 0);
    assert!(dir.path().join(SANDBOX_FILE).exists());
}

#[test]
fn test_refresh_overwrites_credential_file() {
    let dir = tempdir().unwrap();
    let manager = manager(dir.path(), FakeProvider::new());
    let mut context = manager.initialize(EnvironmentType::Sandbox).unwrap();
    let before = manager.store().load(SANDBOX_FILE).unwrap();

    std::thread::sleep(std::time::Duration::from_millis(5));
    manager.refresh(&mut context).unwrap();

    let after = manager.store().load(SANDBOX_FILE).unwrap();
    assert_eq!(manager.provider().validate_calls.get(), 2);
    assert!(after.updated_at > before.updated_at);
    assert_eq!(after.created_at, before.created_at);
    assert_eq!(after.identity, before.identity);
    assert_eq!(after.session.as_ref(), Some(context.session()));
}

#[test]
fn test_refresh_never_regenerates() {
    let dir = tempdir().unwrap();
    let manager = manager(dir.path(), FakeProvider::new());
    let mut context = manager.initialize(EnvironmentType::Sandbox).unwrap();
    let before = fs::read(dir.path().join(SANDBOX_FILE)).unwrap();

    manager.provider().reject_next_validation();
    let err = manager.refresh(&mut context).unwrap_err();

    assert!(err.is_session_invalid());
    assert_eq!(manager.provider().provision_calls.get(), 1);
    assert_eq!(fs::read(dir.path().join(SANDBOX_FILE)).unwrap(), before);
}

#[test]
fn test_environments_use_separate_files() {
    let dir = tempdir().unwrap();
    manager(dir.path(), FakeProvider::new())
        .initialize(EnvironmentType::Sandbox)
        .unwrap();
    production_manager(dir.path(), FakeProvider::new())
        .initialize(EnvironmentType::Production)
        .unwrap();

    let store = CredentialStore::new(dir.path());
    assert_eq!(store.load(SANDBOX_FILE).unwrap().environment, EnvironmentType::Sandbox);
    assert_eq!(
        store.load(PRODUCTION_FILE).unwrap().environment,
        EnvironmentType::Production
    );
}

#[test]
fn test_huge_refresh_margin_treats_stored_session_as_stale() {
    let dir = tempdir().unwrap();
    manager(dir.path(), FakeProvider::new())
        .initialize(EnvironmentType::Sandbox)
        .unwrap();

    let settings = tinker::session::ManagerSettings {
        refresh_margin: Duration::MAX,
        ..support::settings()
    };
    let manager = SessionManager::new(FakeProvider::new(), CredentialStore::new(dir.path()), settings);

    let context = manager.initialize(EnvironmentType::Sandbox).unwrap();

    assert_eq!(manager.provider().provision_calls.get(), 0);
    assert_eq!(manager.provider().offered_sessions.borrow()[0], None);
    assert_eq!(context.user().id(), USER_ID);
}
