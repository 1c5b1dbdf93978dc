//! Remote-facing data model shared by the provider, the store and the
//! session manager.
//!
//! # Architecture
//!
//! * [`alias`]: Pointers (IBAN, email, phone) and the [`AliasHolder`] capability.
//! * [`user`]: The account-holder variants returned for a session.
//! * [`account`]: Monetary accounts, amounts and funding requests.
//! * [`token`]: Session tokens and their expiry bookkeeping.
//! * [`activity`]: Payments and requests listed for an account.
//! * [`notification`]: Callback URL notification filters.

pub mod account;
pub mod activity;
pub mod alias;
pub mod notification;
pub mod token;
pub mod user;

pub use account::{Amount, FundingRequest, MonetaryAccount};
pub use activity::{CounterpartyLabel, Payment, RequestInquiry};
pub use alias::{AliasHolder, Pointer, PointerKind};
pub use notification::{NotificationFilter, CATEGORY_MUTATION};
pub use token::SessionToken;
pub use user::{UserApiKey, UserCompany, UserHolder, UserPerson};
