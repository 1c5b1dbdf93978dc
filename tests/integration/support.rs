//! Scripted remote provider for driving the session manager offline.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use chrono::{Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use tinker::identity::Identity;
use tinker::model::{
    Amount, FundingRequest, MonetaryAccount, NotificationFilter, Payment, Pointer, RequestInquiry,
    SessionToken, UserHolder, UserPerson,
};
use tinker::provider::{ProviderError, RemoteProvider, SessionGrant};
use tinker::session::{FundingSettings, ManagerSettings};

pub const USER_ID: u64 = 42;
pub const ACCOUNT_ID: u64 = 7;

/// In-memory provider whose answers are queued by the test.
#[derive(Default)]
pub struct FakeProvider {
    pub register_calls: Cell<u32>,
    pub provision_calls: Cell<u32>,
    pub validate_calls: Cell<u32>,
    /// API keys of the identities `validate_session` was asked about.
    pub validated_keys: RefCell<Vec<String>>,
    /// Whether each validation was offered a stored session to reuse.
    pub offered_sessions: RefCell<Vec<Option<String>>>,
    pub funding_requests: RefCell<Vec<FundingRequest>>,
    /// `(account_id, count)` of every payment and request listing.
    pub activity_queries: RefCell<Vec<(u64, u32)>>,
    /// Every filter list posted through `replace_notification_filters`.
    pub posted_filters: RefCell<Vec<Vec<NotificationFilter>>>,
    payments: RefCell<Vec<Payment>>,
    requests: RefCell<Vec<RequestInquiry>>,
    filters: RefCell<Vec<NotificationFilter>>,
    activity_error: RefCell<Option<ProviderError>>,
    validate_script: RefCell<VecDeque<ProviderError>>,
    balance: RefCell<Option<String>>,
    register_error: RefCell<Option<ProviderError>>,
    provision_error: RefCell<Option<ProviderError>>,
    funding_error: RefCell<Option<ProviderError>>,
    next_id: Cell<u64>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `validate_session` call fails with `error`.
    pub fn fail_next_validation(&self, error: ProviderError) {
        self.validate_script.borrow_mut().push_back(error);
    }

    pub fn reject_next_validation(&self) {
        self.fail_next_validation(ProviderError::from_status(401, "Insufficient authorisation."));
    }

    pub fn with_balance(self, value: &str) -> Self {
        *self.balance.borrow_mut() = Some(value.to_string());
        self
    }

    pub fn with_register_error(self, error: ProviderError) -> Self {
        *self.register_error.borrow_mut() = Some(error);
        self
    }

    pub fn with_provision_error(self, error: ProviderError) -> Self {
        *self.provision_error.borrow_mut() = Some(error);
        self
    }

    pub fn with_funding_error(self, error: ProviderError) -> Self {
        *self.funding_error.borrow_mut() = Some(error);
        self
    }

    pub fn with_payments(self, payments: Vec<Payment>) -> Self {
        *self.payments.borrow_mut() = payments;
        self
    }

    pub fn with_requests(self, requests: Vec<RequestInquiry>) -> Self {
        *self.requests.borrow_mut() = requests;
        self
    }

    pub fn with_notification_filters(self, filters: Vec<NotificationFilter>) -> Self {
        *self.filters.borrow_mut() = filters;
        self
    }

    pub fn with_activity_error(self, error: ProviderError) -> Self {
        *self.activity_error.borrow_mut() = Some(error);
        self
    }

    /// Filters currently held by the fake remote.
    pub fn notification_filters(&self) -> Vec<NotificationFilter> {
        self.filters.borrow().clone()
    }

    fn next_id(&self) -> u64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    fn bump(counter: &Cell<u32>) {
        counter.set(counter.get() + 1);
    }
}

impl RemoteProvider for FakeProvider {
    fn register_identity(
        &self,
        api_key: &SecretString,
        description: &str,
        permitted_ips: &[String],
    ) -> Result<Identity, ProviderError> {
        Self::bump(&self.register_calls);
        if let Some(error) = self.register_error.borrow().clone() {
            return Err(error);
        }
        let id = self.next_id();
        Ok(Identity {
            api_key: api_key.expose_secret().to_string(),
            description: description.to_string(),
            permitted_ips: permitted_ips.to_vec(),
            installation_token: format!("installation-token-{}", id),
            device_id: 1000 + id,
            created_at: Utc::now(),
        })
    }

    fn provision_disposable_key(&self) -> Result<SecretString, ProviderError> {
        Self::bump(&self.provision_calls);
        if let Some(error) = self.provision_error.borrow().clone() {
            return Err(error);
        }
        Ok(SecretString::from(format!(
            "sandbox_{}",
            uuid::Uuid::new_v4().simple()
        )))
    }

    fn validate_session(
        &self,
        identity: &Identity,
        current: Option<&SessionToken>,
    ) -> Result<SessionGrant, ProviderError> {
        Self::bump(&self.validate_calls);
        self.validated_keys.borrow_mut().push(identity.api_key.clone());
        self.offered_sessions
            .borrow_mut()
            .push(current.map(|session| session.token.clone()));

        if let Some(error) = self.validate_script.borrow_mut().pop_front() {
            return Err(error);
        }

        let session = match current {
            Some(session) => session.clone(),
            None => SessionToken {
                token: format!("session-token-{}", self.next_id()),
                user_id: USER_ID,
                expires_at: Utc::now() + Duration::days(7),
            },
        };
        let balance = self
            .balance
            .borrow()
            .clone()
            .unwrap_or_else(|| "500.00".to_string());

        Ok(SessionGrant {
            session,
            user: UserHolder::Person(UserPerson {
                id: USER_ID,
                display_name: "Ada Tester".into(),
                alias: vec![Pointer::email("ada@example.com")],
            }),
            primary_account: MonetaryAccount {
                id: ACCOUNT_ID,
                description: "Main".into(),
                status: "ACTIVE".into(),
                balance: Amount::new(balance, "EUR"),
                alias: vec![Pointer::iban("NL12BUNQ0123456789")],
            },
        })
    }

    fn request_funding(
        &self,
        _session: &SessionToken,
        _account_id: u64,
        request: &FundingRequest,
    ) -> Result<u64, ProviderError> {
        self.funding_requests.borrow_mut().push(request.clone());
        if let Some(error) = self.funding_error.borrow().clone() {
            return Err(error);
        }
        Ok(self.next_id())
    }

    fn list_payments(
        &self,
        _session: &SessionToken,
        account_id: u64,
        count: u32,
    ) -> Result<Vec<Payment>, ProviderError> {
        self.activity_queries.borrow_mut().push((account_id, count));
        if let Some(error) = self.activity_error.borrow().clone() {
            return Err(error);
        }
        // Returns everything regardless of `count`.
        Ok(self.payments.borrow().clone())
    }

    fn list_request_inquiries(
        &self,
        _session: &SessionToken,
        account_id: u64,
        count: u32,
    ) -> Result<Vec<RequestInquiry>, ProviderError> {
        self.activity_queries.borrow_mut().push((account_id, count));
        Ok(self.requests.borrow().clone())
    }

    fn list_notification_filters(
        &self,
        _session: &SessionToken,
    ) -> Result<Vec<NotificationFilter>, ProviderError> {
        Ok(self.filters.borrow().clone())
    }

    fn replace_notification_filters(
        &self,
        _session: &SessionToken,
        filters: &[NotificationFilter],
    ) -> Result<Vec<NotificationFilter>, ProviderError> {
        self.posted_filters.borrow_mut().push(filters.to_vec());
        *self.filters.borrow_mut() = filters.to_vec();
        Ok(filters.to_vec())
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Manager settings with no settle delay so tests stay fast.
pub fn settings() -> ManagerSettings {
    ManagerSettings {
        funding: FundingSettings {
            settle_delay_ms: 0,
            ..FundingSettings::default()
        },
        ..ManagerSettings::default()
    }
}

/// Settings carrying a production secret key.
pub fn settings_with_key(key: &str) -> ManagerSettings {
    ManagerSettings {
        secret_key: Some(SecretString::from(key.to_string())),
        host_label: "test-host".into(),
        ..settings()
    }
}

pub fn payment(id: u64, value: &str, description: &str) -> Payment {
    Payment {
        id,
        amount: Amount::new(value, "EUR"),
        description: description.to_string(),
        counterparty_alias: None,
    }
}

pub fn request_inquiry(id: u64, value: &str, status: &str) -> RequestInquiry {
    RequestInquiry {
        id,
        amount_inquired: Amount::new(value, "EUR"),
        status: status.to_string(),
        description: "Requesting some spending money.".to_string(),
        counterparty_alias: None,
    }
}
