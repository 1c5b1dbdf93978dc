//! Blocking HTTP implementation of [`RemoteProvider`].
//!
//! Every response from the remote is wrapped in a `Response` array of
//! single-key objects, e.g. `{"Response": [{"Id": {"id": 1}}, {"Token": {...}}]}`.
//! The parsing helpers below pick objects out of that envelope by key.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::blocking::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::{ProviderError, RemoteProvider, SessionGrant};
use crate::identity::Identity;
use crate::model::{
    FundingRequest, MonetaryAccount, NotificationFilter, Payment, RequestInquiry, SessionToken,
    UserHolder,
};

const USER_AGENT: &str = concat!("tinker/", env!("CARGO_PKG_VERSION"));
const HEADER_REQUEST_ID: &str = "X-Bunq-Client-Request-Id";
const HEADER_AUTHENTICATION: &str = "X-Bunq-Client-Authentication";
const HEADER_GEOLOCATION: &str = "X-Bunq-Geolocation";
const HEADER_LANGUAGE: &str = "X-Bunq-Language";
const HEADER_REGION: &str = "X-Bunq-Region";

const FIELD_RESPONSE: &str = "Response";
const USER_VARIANTS: [&str; 3] = ["UserPerson", "UserCompany", "UserApiKey"];
const ITEM_PAYMENT: &str = "Payment";
const ITEM_REQUEST_INQUIRY: &str = "RequestInquiry";
const ITEM_NOTIFICATION_FILTER: &str = "NotificationFilterUrl";

/// Session lifetime assumed when the user object does not report one.
const DEFAULT_SESSION_TIMEOUT_SECS: i64 = 7 * 24 * 60 * 60;

/// HTTP provider for one environment's API base URL.
pub struct HttpProvider {
    base_url: String,
    client: Client,
}

impl HttpProvider {
    /// Build a provider for `base_url` with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is empty or the HTTP client cannot be
    /// initialized.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(ProviderError::Transport("base URL must not be empty".into()));
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(15).min(timeout))
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn post<B: Serialize + ?Sized>(&self, path: &str, auth: Option<&str>, body: &B) -> RequestBuilder {
        let request = self.client.post(self.url(path)).json(body);
        with_auth(request, auth)
    }

    fn get(&self, path: &str, auth: &str) -> RequestBuilder {
        with_auth(self.client.get(self.url(path)), Some(auth))
    }

    fn send(&self, request: RequestBuilder) -> Result<Value, ProviderError> {
        let request_id = Uuid::new_v4().to_string();
        let response = request
            .header(HEADER_REQUEST_ID, request_id.as_str())
            .header("Cache-Control", "no-cache")
            .header(HEADER_GEOLOCATION, "0 0 0 0 NL")
            .header(HEADER_LANGUAGE, "en_US")
            .header(HEADER_REGION, "en_US")
            .send()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        log::trace!("request {} -> HTTP {}", request_id, status.as_u16());

        if !status.is_success() {
            return Err(ProviderError::from_status(status.as_u16(), body));
        }

        serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

/// The three calls a session check is built from.
trait SessionEndpoints {
    fn open_session(&self, identity: &Identity) -> Result<(SessionToken, UserHolder), ProviderError>;
    fn fetch_user(&self, session: &SessionToken) -> Result<UserHolder, ProviderError>;
    fn fetch_primary_account(&self, session: &SessionToken) -> Result<MonetaryAccount, ProviderError>;
}

impl SessionEndpoints for HttpProvider {
    fn open_session(&self, identity: &Identity) -> Result<(SessionToken, UserHolder), ProviderError> {
        #[derive(Serialize)]
        struct SessionServerRequest<'a> {
            secret: &'a str,
        }

        let body = self.send(self.post(
            "session-server",
            Some(&identity.installation_token),
            &SessionServerRequest {
                secret: &identity.api_key,
            },
        ))?;
        parse_session(&body, Utc::now())
    }

    fn fetch_user(&self, session: &SessionToken) -> Result<UserHolder, ProviderError> {
        let body = self.send(self.get(&format!("user/{}", session.user_id), &session.token))?;
        parse_user(&body)
    }

    fn fetch_primary_account(&self, session: &SessionToken) -> Result<MonetaryAccount, ProviderError> {
        let body = self.send(self.get(
            &format!("user/{}/monetary-account-bank", session.user_id),
            &session.token,
        ))?;
        parse_primary_account(&body)
    }
}

/// Reuse `current` if the remote still accepts it, else open a new session.
///
/// A 401/403 on any call made with the stored token falls back to a fresh
/// session; only a rejection of the fresh session reaches the caller.
fn validate_with<E: SessionEndpoints + ?Sized>(
    endpoints: &E,
    identity: &Identity,
    current: Option<&SessionToken>,
) -> Result<SessionGrant, ProviderError> {
    if let Some(session) = current {
        match grant_for(endpoints, session, None) {
            Ok(grant) => return Ok(grant),
            Err(e) if e.is_unauthorized() => {
                log::debug!("Stored session was rejected, opening a new one");
            }
            Err(e) => return Err(e),
        }
    }

    let (session, user) = endpoints.open_session(identity)?;
    grant_for(endpoints, &session, Some(user))
}

fn grant_for<E: SessionEndpoints + ?Sized>(
    endpoints: &E,
    session: &SessionToken,
    user: Option<UserHolder>,
) -> Result<SessionGrant, ProviderError> {
    let user = match user {
        Some(user) => user,
        None => endpoints.fetch_user(session)?,
    };
    let primary_account = endpoints.fetch_primary_account(session)?;
    Ok(SessionGrant {
        session: session.clone(),
        user,
        primary_account,
    })
}

fn with_auth(request: RequestBuilder, auth: Option<&str>) -> RequestBuilder {
    match auth {
        Some(token) => request.header(HEADER_AUTHENTICATION, token),
        None => request,
    }
}

impl RemoteProvider for HttpProvider {
    fn register_identity(
        &self,
        api_key: &SecretString,
        description: &str,
        permitted_ips: &[String],
    ) -> Result<Identity, ProviderError> {
        #[derive(Serialize)]
        struct DeviceServerRequest<'a> {
            description: &'a str,
            secret: &'a str,
            permitted_ips: &'a [String],
        }

        // Key exchange for request signing is not performed by this client.
        let installation = self.send(self.post("installation", None, &serde_json::json!({})))?;
        let installation_token = parse_token(&installation)?;

        let device = self.send(self.post(
            "device-server",
            Some(&installation_token),
            &DeviceServerRequest {
                description,
                secret: api_key.expose_secret(),
                permitted_ips,
            },
        ))?;
        let device_id = parse_id(&device)?;

        Ok(Identity {
            api_key: api_key.expose_secret().to_string(),
            description: description.to_string(),
            permitted_ips: permitted_ips.to_vec(),
            installation_token,
            device_id,
            created_at: Utc::now(),
        })
    }

    fn provision_disposable_key(&self) -> Result<SecretString, ProviderError> {
        let body = self.send(self.client.post(self.url("sandbox-user-person")))?;
        parse_sandbox_api_key(&body).map(SecretString::from)
    }

    fn validate_session(
        &self,
        identity: &Identity,
        current: Option<&SessionToken>,
    ) -> Result<SessionGrant, ProviderError> {
        validate_with(self, identity, current)
    }

    fn request_funding(
        &self,
        session: &SessionToken,
        account_id: u64,
        request: &FundingRequest,
    ) -> Result<u64, ProviderError> {
        let path = format!(
            "user/{}/monetary-account/{}/request-inquiry",
            session.user_id, account_id
        );
        let body = self.send(self.post(&path, Some(&session.token), request))?;
        parse_id(&body)
    }

    fn list_payments(
        &self,
        session: &SessionToken,
        account_id: u64,
        count: u32,
    ) -> Result<Vec<Payment>, ProviderError> {
        let path = format!(
            "user/{}/monetary-account/{}/payment",
            session.user_id, account_id
        );
        let body = self.send(self.get(&path, &session.token).query(&[("count", count)]))?;
        parse_list(&body, ITEM_PAYMENT)
    }

    fn list_request_inquiries(
        &self,
        session: &SessionToken,
        account_id: u64,
        count: u32,
    ) -> Result<Vec<RequestInquiry>, ProviderError> {
        let path = format!(
            "user/{}/monetary-account/{}/request-inquiry",
            session.user_id, account_id
        );
        let body = self.send(self.get(&path, &session.token).query(&[("count", count)]))?;
        parse_list(&body, ITEM_REQUEST_INQUIRY)
    }

    fn list_notification_filters(
        &self,
        session: &SessionToken,
    ) -> Result<Vec<NotificationFilter>, ProviderError> {
        let path = format!("user/{}/notification-filter-url", session.user_id);
        let body = self.send(self.get(&path, &session.token))?;
        parse_list(&body, ITEM_NOTIFICATION_FILTER)
    }

    fn replace_notification_filters(
        &self,
        session: &SessionToken,
        filters: &[NotificationFilter],
    ) -> Result<Vec<NotificationFilter>, ProviderError> {
        #[derive(Serialize)]
        struct NotificationFilterRequest<'a> {
            notification_filters: &'a [NotificationFilter],
        }

        let path = format!("user/{}/notification-filter-url", session.user_id);
        let body = self.send(self.post(
            &path,
            Some(&session.token),
            &NotificationFilterRequest {
                notification_filters: filters,
            },
        ))?;
        parse_list(&body, ITEM_NOTIFICATION_FILTER)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

fn response_items(body: &Value) -> Result<&[Value], ProviderError> {
    body.get(FIELD_RESPONSE)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .ok_or_else(|| ProviderError::Decode(format!("missing '{}' array", FIELD_RESPONSE)))
}

fn find_item<'a>(items: &'a [Value], key: &str) -> Option<&'a Value> {
    items.iter().find_map(|item| item.get(key))
}

fn require_item<'a>(body: &'a Value, key: &str) -> Result<&'a Value, ProviderError> {
    find_item(response_items(body)?, key)
        .ok_or_else(|| ProviderError::Decode(format!("response has no '{}' object", key)))
}

fn require_str<'a>(object: &'a Value, field: &str) -> Result<&'a str, ProviderError> {
    object
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ProviderError::Decode(format!("missing string field '{}'", field)))
}

fn parse_id(body: &Value) -> Result<u64, ProviderError> {
    require_item(body, "Id")?
        .get("id")
        .and_then(Value::as_u64)
        .ok_or_else(|| ProviderError::Decode("missing numeric field 'id'".into()))
}

fn parse_token(body: &Value) -> Result<String, ProviderError> {
    require_str(require_item(body, "Token")?, "token").map(str::to_string)
}

fn parse_sandbox_api_key(body: &Value) -> Result<String, ProviderError> {
    require_str(require_item(body, "ApiKey")?, "api_key").map(str::to_string)
}

fn parse_user_from_items(items: &[Value]) -> Result<UserHolder, ProviderError> {
    for variant in USER_VARIANTS {
        if let Some(object) = find_item(items, variant) {
            let tagged = serde_json::json!({ variant: object });
            return serde_json::from_value(tagged).map_err(|e| ProviderError::Decode(e.to_string()));
        }
    }
    Err(ProviderError::Decode("response has no user object".into()))
}

fn parse_user(body: &Value) -> Result<UserHolder, ProviderError> {
    parse_user_from_items(response_items(body)?)
}

fn parse_session(body: &Value, now: DateTime<Utc>) -> Result<(SessionToken, UserHolder), ProviderError> {
    let items = response_items(body)?;
    let token = find_item(items, "Token")
        .ok_or_else(|| ProviderError::Decode("response has no 'Token' object".into()))?;
    let token = require_str(token, "token")?.to_string();
    let user = parse_user_from_items(items)?;

    let timeout = USER_VARIANTS
        .iter()
        .find_map(|variant| find_item(items, variant))
        .and_then(|object| object.get("session_timeout"))
        .and_then(Value::as_i64)
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_SESSION_TIMEOUT_SECS);

    let expires_at = chrono::Duration::try_seconds(timeout)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| ProviderError::Decode(format!("session_timeout {} is out of range", timeout)))?;

    let session = SessionToken {
        token,
        user_id: user.id(),
        expires_at,
    };
    Ok((session, user))
}

fn parse_primary_account(body: &Value) -> Result<MonetaryAccount, ProviderError> {
    response_items(body)?
        .iter()
        .filter_map(|item| item.get("MonetaryAccountBank"))
        .filter_map(|object| serde_json::from_value::<MonetaryAccount>(object.clone()).ok())
        .find(MonetaryAccount::is_active)
        .ok_or_else(|| ProviderError::Decode("user has no active monetary account".into()))
}

/// Every `key` object in the envelope, in response order.
fn parse_list<T: DeserializeOwned>(body: &Value, key: &str) -> Result<Vec<T>, ProviderError> {
    response_items(body)?
        .iter()
        .filter_map(|item| item.get(key))
        .map(|object| {
            serde_json::from_value(object.clone())
                .map_err(|e| ProviderError::Decode(format!("malformed '{}': {}", key, e)))
        })
        .collect()
}
